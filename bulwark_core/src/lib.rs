//! # Bulwark Core
//!
//! Exception types and exception values shared by the Bulwark runtime.
//!
//! This crate provides the leaf building blocks of the exception system:
//!
//! - **Type Hierarchy**: `ExceptionType` nodes linked by parent pointers, rooted
//!   at the universal [`EXCEPTION`] type
//! - **Registry**: An append-only, name-keyed table of types for hierarchies
//!   built at runtime
//! - **Exception Values**: Immutable `ExceptionInstance` records with an optional
//!   message and throw-site origin
//! - **Error Handling**: Result types for misuse of the library itself

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod instance;
pub mod registry;
pub mod types;

pub use error::{BulwarkError, BulwarkResult};
pub use instance::{ancestry_matches, ExceptionInstance, Origin};
pub use registry::{TypeRegistry, TYPE_REGISTRY};
pub use types::{ExceptionType, EXCEPTION, MAX_TYPE_DEPTH};

/// Bulwark version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
