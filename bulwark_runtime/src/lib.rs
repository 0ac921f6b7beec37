//! # Bulwark Runtime
//!
//! Structured exception handling with protected regions, ordered catch
//! clauses, cleanup clauses and early returns that run every pending cleanup.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Context                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────┐   ┌──────────────────────────┐  │
//! │  │ ContextStack          │   │ ContextStats             │  │
//! │  │  Frame #2 (head)      │   │  raised / caught / ...   │  │
//! │  │  Frame #1 ◀── link    │   └──────────────────────────┘  │
//! │  │  Frame #0             │                                 │
//! │  └───────────────────────┘                                 │
//! └────────────────────────────────────────────────────────────┘
//!        ▲ push / pop                      │ empty stack
//!        │                                 ▼
//!  ┌──────────────┐                 ┌──────────────────┐
//!  │ Region::run  │ ◀── Jump ────── │ uncaught handler │
//!  └──────────────┘   (Flow, ?)     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use bulwark_runtime::{define_exception, Context, Flow, Region, EXCEPTION};
//!
//! define_exception! {
//!     IO_FAILURE = "IOFailure": EXCEPTION;
//! }
//!
//! fn read(cx: &mut Context) -> Flow {
//!     bulwark_runtime::raise!(cx, IO_FAILURE, "disk error");
//! }
//!
//! let mut cx = Context::new();
//! let mut message = None;
//! let flow: Flow = Region::new(read)
//!     .catch(&IO_FAILURE, |_, exc| {
//!         message = exc.message().map(str::to_owned);
//!         Ok(())
//!     })
//!     .run(&mut cx);
//!
//! assert_eq!(flow, Ok(()));
//! assert_eq!(message.as_deref(), Some("disk error"));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod context;
pub mod frame;
pub mod jump;
mod macros;
pub mod region;
pub mod stack;
pub mod state;
pub mod uncaught;

pub use bulwark_core::{
    ancestry_matches, define_exception, BulwarkError, BulwarkResult, ExceptionInstance,
    ExceptionType, Origin, TypeRegistry, EXCEPTION, TYPE_REGISTRY,
};
pub use config::{ContextConfig, DEFAULT_MAX_DEPTH};
pub use context::{Context, ContextStats, NESTING_OVERFLOW};
pub use frame::{Checkpoint, Frame};
pub use jump::{Flow, Jump};
pub use region::Region;
pub use stack::{ContextStack, ContextStackStats};
pub use state::FrameState;
pub use uncaught::{default_uncaught_handler, set_uncaught_handler, uncaught_handler, UncaughtHandler};
