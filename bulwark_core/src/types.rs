//! Exception type hierarchy.
//!
//! Exception types are nodes of a parent-linked forest. Every type either
//! names a parent or starts its own tree, and the universal [`EXCEPTION`]
//! type sits above all of them for matching purposes: a handler declared for
//! it catches everything.
//!
//! # Identity
//!
//! Types are compared by address. Declare them as `static` items (see
//! [`define_exception!`](crate::define_exception)) or create them through the
//! [`TypeRegistry`](crate::TypeRegistry); a `const` copy of a type is a
//! different type.
//!
//! ```text
//! Exception (universal root)
//!  ├── IOFailure
//!  │    └── DiskFull
//!  └── ParseFailure
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length of a parent chain.
///
/// Ancestry walks stop here; a longer chain can only come from a cyclic
/// hierarchy, which is a construction-time contract violation.
pub const MAX_TYPE_DEPTH: usize = 64;

/// The universal root type. Its ancestry query always succeeds.
pub static EXCEPTION: ExceptionType = ExceptionType::root("Exception");

// ============================================================================
// Exception Type
// ============================================================================

/// A node in the exception type hierarchy.
///
/// Types are immutable and live for the whole process.
pub struct ExceptionType {
    /// Human-readable type name used in diagnostics.
    name: &'static str,

    /// Enclosing type, or `None` for the top of a tree.
    parent: Option<&'static ExceptionType>,
}

impl ExceptionType {
    /// Creates a type with the given parent.
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, parent: Option<&'static ExceptionType>) -> Self {
        Self { name, parent }
    }

    /// Creates a type that starts its own tree.
    #[inline]
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Returns the type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the parent type, if any.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<&'static ExceptionType> {
        self.parent
    }

    /// Returns true if this type has no parent.
    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns true if this is the universal [`EXCEPTION`] type.
    #[inline]
    #[must_use]
    pub fn is_universal(&self) -> bool {
        ptr::eq(self, &EXCEPTION)
    }

    /// Returns true if `base` is this type, one of its ancestors, or the
    /// universal root.
    #[inline]
    #[must_use]
    pub fn is_subclass_of(&self, base: &ExceptionType) -> bool {
        is_ancestor_or_self(self, base)
    }

    /// Returns the number of parent links above this type.
    ///
    /// Returns `None` if the chain is longer than [`MAX_TYPE_DEPTH`].
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(parent) = current {
            depth += 1;
            if depth > MAX_TYPE_DEPTH {
                return None;
            }
            current = parent.parent;
        }
        Some(depth)
    }

    /// Returns an iterator from this type up to the top of its tree.
    #[inline]
    #[must_use]
    pub fn ancestors(&'static self) -> Ancestors {
        Ancestors {
            next: Some(self),
            remaining: MAX_TYPE_DEPTH + 1,
        }
    }
}

impl PartialEq for ExceptionType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for ExceptionType {}

impl Hash for ExceptionType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self, state);
    }
}

impl fmt::Debug for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "ExceptionType({} < {})", self.name, parent.name),
            None => write!(f, "ExceptionType({})", self.name),
        }
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Ancestry
// ============================================================================

/// Returns true iff `candidate` is `target`, `target` is the universal root,
/// or `target` appears on `candidate`'s parent chain.
///
/// The walk is bounded by [`MAX_TYPE_DEPTH`]. A longer chain is reported and
/// answers `false`.
#[must_use]
pub fn is_ancestor_or_self(candidate: &ExceptionType, target: &ExceptionType) -> bool {
    if ptr::eq(candidate, target) || target.is_universal() {
        return true;
    }

    let mut current = candidate.parent;
    for _ in 0..MAX_TYPE_DEPTH {
        match current {
            Some(parent) if ptr::eq(parent, target) => return true,
            Some(parent) => current = parent.parent,
            None => return false,
        }
    }

    tracing::error!(
        candidate = candidate.name,
        target = target.name,
        limit = MAX_TYPE_DEPTH,
        "exception type ancestry exceeds depth bound; hierarchy is cyclic"
    );
    false
}

/// Iterator over a type and its ancestors, innermost first.
#[derive(Clone, Debug)]
pub struct Ancestors {
    next: Option<&'static ExceptionType>,
    remaining: usize,
}

impl Iterator for Ancestors {
    type Item = &'static ExceptionType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

// ============================================================================
// Declaration Macro
// ============================================================================

/// Declares one or more static exception types.
///
/// ```
/// use bulwark_core::{define_exception, EXCEPTION};
///
/// define_exception! {
///     /// Any I/O failure.
///     pub IO_FAILURE = "IOFailure": EXCEPTION;
///     pub DISK_FULL = "DiskFull": IO_FAILURE;
/// }
///
/// assert!(DISK_FULL.is_subclass_of(&IO_FAILURE));
/// ```
#[macro_export]
macro_rules! define_exception {
    ($($(#[$meta:meta])* $vis:vis $ident:ident = $name:literal : $parent:path);+ $(;)?) => {
        $(
            $(#[$meta])*
            $vis static $ident: $crate::ExceptionType =
                $crate::ExceptionType::new($name, ::core::option::Option::Some(&$parent));
        )+
    };
}

// ============================================================================
// Tests
// ============================================================================
