//! Exception values.
//!
//! An `ExceptionInstance` pairs a type with an optional message and an
//! optional throw-site origin. Instances are plain values: they are cloned
//! into frames as they propagate and are never mutated after construction.

use crate::types::{is_ancestor_or_self, ExceptionType};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Origin
// ============================================================================

/// Source location of a throw site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Origin {
    /// Source file.
    pub file: Arc<str>,

    /// Line number, when known.
    pub line: Option<u32>,
}

impl Origin {
    /// Creates an origin with a file and line.
    #[inline]
    pub fn new(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }

    /// Creates an origin that only knows its file.
    #[inline]
    pub fn file_only(file: impl Into<Arc<str>>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "(file \"{}\", line {})", self.file, line),
            None => write!(f, "(file \"{}\")", self.file),
        }
    }
}

// ============================================================================
// Exception Instance
// ============================================================================

/// A raised (or ready to be raised) exception.
#[derive(Clone, PartialEq, Eq)]
pub struct ExceptionInstance {
    ty: &'static ExceptionType,
    message: Option<Arc<str>>,
    origin: Option<Origin>,
}

impl ExceptionInstance {
    // ════════════════════════════════════════════════════════════════════════
    // Constructors
    // ════════════════════════════════════════════════════════════════════════

    /// Creates an exception with a message.
    #[inline]
    pub fn new(ty: &'static ExceptionType, message: impl Into<Arc<str>>) -> Self {
        Self {
            ty,
            message: Some(message.into()),
            origin: None,
        }
    }

    /// Creates an exception with no message.
    #[inline]
    #[must_use]
    pub const fn bare(ty: &'static ExceptionType) -> Self {
        Self {
            ty,
            message: None,
            origin: None,
        }
    }

    /// Returns a copy of this exception carrying the given throw site.
    #[must_use]
    pub fn with_origin(self, file: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            origin: Some(Origin::new(file, line)),
            ..self
        }
    }

    /// Returns a copy of this exception carrying only a source file.
    #[must_use]
    pub fn with_file(self, file: impl Into<Arc<str>>) -> Self {
        Self {
            origin: Some(Origin::file_only(file)),
            ..self
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    /// Returns the exception type.
    #[inline]
    #[must_use]
    pub const fn exception_type(&self) -> &'static ExceptionType {
        self.ty
    }

    /// Returns the exception type name.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    /// Returns the message, if any.
    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the throw site, if recorded.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// Returns true if a handler declared for `ty` would catch this exception.
    #[inline]
    #[must_use]
    pub fn is_instance_of(&self, ty: &ExceptionType) -> bool {
        is_ancestor_or_self(self.ty, ty)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Formatting
    // ════════════════════════════════════════════════════════════════════════

    /// Renders the one-line diagnostic description.
    ///
    /// `TypeName (file "f", line N): message`, with `(file "f")` or
    /// `(unknown source)` when less is known and no `: message` suffix when
    /// there is no message. Only for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExceptionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.name())?;
        match &self.origin {
            Some(origin) => write!(f, " {origin}")?,
            None => f.write_str(" (unknown source)")?,
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ExceptionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionInstance")
            .field("type", &self.ty.name())
            .field("message", &self.message)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Manual ancestry check outside the catch mechanism.
#[inline]
#[must_use]
pub fn ancestry_matches(instance: &ExceptionInstance, ty: &ExceptionType) -> bool {
    instance.is_instance_of(ty)
}

// ============================================================================
// Tests
// ============================================================================
