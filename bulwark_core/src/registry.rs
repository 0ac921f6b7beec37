//! Name-keyed registry of exception types.
//!
//! Static hierarchies are declared with [`define_exception!`](crate::define_exception).
//! Hierarchies that are only known at runtime (loaded from configuration,
//! defined by an embedded interpreter, ...) are built here instead. The
//! registry is append-only: types are never removed and live for the rest of
//! the process, so handing out `&'static` references is sound.
//!
//! A runtime type can only name a parent that is already registered, so a
//! registry-built hierarchy cannot contain a cycle.

use crate::error::{BulwarkError, BulwarkResult};
use crate::types::{ExceptionType, EXCEPTION, MAX_TYPE_DEPTH};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// Thread-safe, append-only table of exception types keyed by name.
pub struct TypeRegistry {
    types: RwLock<FxHashMap<&'static str, &'static ExceptionType>>,
}

impl TypeRegistry {
    /// Creates a registry that only knows the universal root.
    #[must_use]
    pub fn new() -> Self {
        let mut types = FxHashMap::default();
        types.insert(EXCEPTION.name(), &EXCEPTION);
        Self {
            types: RwLock::new(types),
        }
    }

    /// Registers a statically declared type.
    ///
    /// Registering the same type twice is a no-op. A different type under an
    /// existing name, or a parent chain longer than [`MAX_TYPE_DEPTH`], is
    /// rejected.
    pub fn register(&self, ty: &'static ExceptionType) -> BulwarkResult<()> {
        if ty.depth().is_none() {
            return Err(BulwarkError::too_deep(ty.name(), MAX_TYPE_DEPTH));
        }

        let mut types = self.types.write();
        match types.get(ty.name()) {
            Some(existing) if *existing == ty => Ok(()),
            Some(_) => Err(BulwarkError::duplicate(ty.name())),
            None => {
                types.insert(ty.name(), ty);
                tracing::debug!(name = ty.name(), "registered exception type");
                Ok(())
            }
        }
    }

    /// Creates and registers a type at runtime.
    ///
    /// `parent` names an already registered type; `None` makes the new type
    /// a direct child of the universal root.
    pub fn define(&self, name: &str, parent: Option<&str>) -> BulwarkResult<&'static ExceptionType> {
        let mut types = self.types.write();
        if types.contains_key(name) {
            return Err(BulwarkError::duplicate(name));
        }

        let parent = match parent {
            Some(parent_name) => *types
                .get(parent_name)
                .ok_or_else(|| BulwarkError::unknown_parent(name, parent_name))?,
            None => &EXCEPTION,
        };
        if parent.depth().map_or(true, |depth| depth + 1 > MAX_TYPE_DEPTH) {
            return Err(BulwarkError::too_deep(name, MAX_TYPE_DEPTH));
        }

        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let ty: &'static ExceptionType = Box::leak(Box::new(ExceptionType::new(name, Some(parent))));
        types.insert(name, ty);
        tracing::debug!(name, parent = parent.name(), "defined exception type");
        Ok(ty)
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static ExceptionType> {
        self.types.read().get(name).copied()
    }

    /// Returns true if a type with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns true if the registry is empty. Never true in practice, the
    /// root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("count", &self.types.read().len())
            .finish()
    }
}

/// The process-wide type registry.
pub static TYPE_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_exception;

    define_exception! {
        IO_FAILURE = "IOFailure": EXCEPTION;
    }

    static IMPOSTOR: ExceptionType = ExceptionType::new("IOFailure", Some(&EXCEPTION));
    static LOOP_A: ExceptionType = ExceptionType::new("LoopA", Some(&LOOP_B));
    static LOOP_B: ExceptionType = ExceptionType::new("LoopB", Some(&LOOP_A));

    #[test]
    fn test_new_contains_root() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("Exception"), Some(&EXCEPTION));
    }

    #[test]
    fn test_register_static_type() {
        let registry = TypeRegistry::new();
        registry.register(&IO_FAILURE).unwrap();
        assert_eq!(registry.lookup("IOFailure"), Some(&IO_FAILURE));
    }

    #[test]
    fn test_register_same_type_twice_is_noop() {
        let registry = TypeRegistry::new();
        registry.register(&IO_FAILURE).unwrap();
        registry.register(&IO_FAILURE).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_conflicting_name() {
        let registry = TypeRegistry::new();
        registry.register(&IO_FAILURE).unwrap();
        let err = registry.register(&IMPOSTOR).unwrap_err();
        assert_eq!(err, BulwarkError::duplicate("IOFailure"));
    }

    #[test]
    fn test_register_cyclic_type() {
        let registry = TypeRegistry::new();
        let err = registry.register(&LOOP_A).unwrap_err();
        assert!(matches!(err, BulwarkError::HierarchyTooDeep { .. }));
        assert!(!registry.contains("LoopA"));
    }

    #[test]
    fn test_define_under_root() {
        let registry = TypeRegistry::new();
        let ty = registry.define("Timeout", None).unwrap();
        assert_eq!(ty.name(), "Timeout");
        assert_eq!(ty.parent(), Some(&EXCEPTION));
        assert_eq!(registry.lookup("Timeout"), Some(ty));
    }

    #[test]
    fn test_define_chain() {
        let registry = TypeRegistry::new();
        registry.register(&IO_FAILURE).unwrap();
        let disk = registry.define("DiskFull", Some("IOFailure")).unwrap();
        let quota = registry.define("QuotaExceeded", Some("DiskFull")).unwrap();

        assert!(quota.is_subclass_of(disk));
        assert!(quota.is_subclass_of(&IO_FAILURE));
        assert!(!disk.is_subclass_of(quota));
    }

    #[test]
    fn test_define_unknown_parent() {
        let registry = TypeRegistry::new();
        let err = registry.define("DiskFull", Some("Missing")).unwrap_err();
        assert_eq!(err, BulwarkError::unknown_parent("DiskFull", "Missing"));
    }

    #[test]
    fn test_define_duplicate() {
        let registry = TypeRegistry::new();
        registry.define("Timeout", None).unwrap();
        let err = registry.define("Timeout", None).unwrap_err();
        assert_eq!(err, BulwarkError::duplicate("Timeout"));
    }

    #[test]
    fn test_define_depth_limit() {
        let registry = TypeRegistry::new();
        let mut parent = String::from("Exception");
        for level in 1..MAX_TYPE_DEPTH {
            let name = format!("Level{level}");
            registry.define(&name, Some(&parent)).unwrap();
            parent = name;
        }
        // The last level reaches the bound exactly.
        registry.define("Deepest", Some(&parent)).unwrap();
        let err = registry.define("TooDeep", Some("Deepest")).unwrap_err();
        assert!(matches!(err, BulwarkError::HierarchyTooDeep { .. }));
    }

    #[test]
    fn test_global_registry_has_root() {
        assert!(TYPE_REGISTRY.contains("Exception"));
    }
}
