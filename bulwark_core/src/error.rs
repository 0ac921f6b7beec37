//! Error types and result definitions for Bulwark.
//!
//! These errors describe misuse of the library itself (registry conflicts,
//! malformed hierarchies, invalid configuration). They are ordinary Rust
//! errors and never travel through the exception protocol.

use thiserror::Error;

/// The unified result type used throughout Bulwark.
pub type BulwarkResult<T> = Result<T, BulwarkError>;

/// Library-level error conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BulwarkError {
    /// A different type is already registered under this name.
    #[error("DuplicateType: exception type '{name}' is already registered")]
    DuplicateType {
        /// The conflicting type name.
        name: String,
    },

    /// The requested parent type is not registered.
    #[error("UnknownParent: parent type '{parent}' of '{name}' is not registered")]
    UnknownParent {
        /// The type being defined.
        name: String,
        /// The missing parent name.
        parent: String,
    },

    /// The parent chain of a type is deeper than the supported bound.
    ///
    /// A cyclic hierarchy is reported this way as well.
    #[error("HierarchyTooDeep: ancestry of '{name}' exceeds {limit} levels")]
    HierarchyTooDeep {
        /// The offending type name.
        name: String,
        /// The depth bound that was exceeded.
        limit: usize,
    },

    /// A configuration value is out of range.
    #[error("InvalidConfig: {message}")]
    InvalidConfig {
        /// Error description.
        message: String,
    },
}

impl BulwarkError {
    /// Create a duplicate type error.
    #[must_use]
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateType { name: name.into() }
    }

    /// Create an unknown parent error.
    #[must_use]
    pub fn unknown_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnknownParent {
            name: name.into(),
            parent: parent.into(),
        }
    }

    /// Create a hierarchy depth error.
    #[must_use]
    pub fn too_deep(name: impl Into<String>, limit: usize) -> Self {
        Self::HierarchyTooDeep {
            name: name.into(),
            limit,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if this error comes from the type registry.
    #[must_use]
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateType { .. } | Self::UnknownParent { .. } | Self::HierarchyTooDeep { .. }
        )
    }
}
