//! Hierarchy tests through the public API.
//!
//! Covers the ancestry rules for statically declared chains, runtime types
//! defined through the global registry, and mixed hierarchies where runtime
//! types hang below static ones.

use bulwark_core::{
    ancestry_matches, define_exception, ExceptionInstance, ExceptionType, EXCEPTION, TYPE_REGISTRY,
};

define_exception! {
    /// Top of the test chain.
    pub CHAIN_A = "ChainA": EXCEPTION;
    pub CHAIN_B = "ChainB": CHAIN_A;
    pub CHAIN_C = "ChainC": CHAIN_B;
}

// =============================================================================
// Static Chains
// =============================================================================

#[test]
fn test_descendant_caught_by_every_ancestor() {
    let exc = ExceptionInstance::new(&CHAIN_C, "deep");
    for handler in [&CHAIN_C, &CHAIN_B, &CHAIN_A, &EXCEPTION] {
        assert!(ancestry_matches(&exc, handler), "{handler:?} should match");
    }
}

#[test]
fn test_ancestor_not_caught_by_descendant_handler() {
    let exc = ExceptionInstance::new(&CHAIN_A, "shallow");
    assert!(!ancestry_matches(&exc, &CHAIN_C));
    assert!(!ancestry_matches(&exc, &CHAIN_B));
}

#[test]
fn test_ancestors_walk_to_root() {
    let names: Vec<&str> = CHAIN_C.ancestors().map(ExceptionType::name).collect();
    assert_eq!(names, vec!["ChainC", "ChainB", "ChainA", "Exception"]);
}

// =============================================================================
// Runtime Types
// =============================================================================

#[test]
fn test_runtime_type_below_static_type() {
    TYPE_REGISTRY.register(&CHAIN_B).unwrap();
    let runtime = TYPE_REGISTRY
        .define("RuntimeBelowChainB", Some("ChainB"))
        .unwrap();

    let exc = ExceptionInstance::bare(runtime);
    assert!(ancestry_matches(&exc, &CHAIN_B));
    assert!(ancestry_matches(&exc, &CHAIN_A));
    assert!(!ancestry_matches(&exc, &CHAIN_C));
    assert_eq!(TYPE_REGISTRY.lookup("RuntimeBelowChainB"), Some(runtime));
}

#[test]
fn test_runtime_type_describe() {
    let ty = TYPE_REGISTRY.define("RuntimeDescribed", None).unwrap();
    let exc = ExceptionInstance::new(ty, "boom").with_origin("loader.rs", 7);
    assert_eq!(
        exc.to_string(),
        "RuntimeDescribed (file \"loader.rs\", line 7): boom"
    );
}
