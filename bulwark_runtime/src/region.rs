//! Protected regions: body, catch clauses, passed clause, cleanup.
//!
//! A region is assembled with a builder and executed once with
//! [`Region::run`]. The body and every clause receive the context and
//! return a [`Flow`], so jumps are forwarded with `?`.
//!
//! # Protocol
//!
//! ```text
//!                enter (push frame, Trying)
//!                          │
//!                        body
//!           ┌──────────────┼────────────────────┐
//!        Ok(())       Raised(cp)           Return(v)
//!           │              │                    │
//!      NoException  ExceptionOccurred      Interrupted
//!           │              │                    │
//!       passed?     first matching catch?       │
//!           │        yes ─▶ CaughtException     │
//!           │        no  ─▶ (stays Occurred)    │
//!           └──────────────┼────────────────────┘
//!                          │
//!                cleanup (exactly once)
//!                          │
//!                retire (pop frame) ──▶ Ok / re-raise outward / Return(v)
//! ```
//!
//! Catch clauses are tried in declaration order. The first clause whose type
//! is the exception's type or one of its ancestors wins; later clauses are
//! skipped even if they also match. An exception raised inside a catch,
//! passed or cleanup clause is a secondary exception: it replaces whatever
//! the frame held and leaves the region after cleanup.

use crate::context::Context;
use crate::frame::Checkpoint;
use crate::jump::Flow;
use crate::state::FrameState;
use bulwark_core::{ExceptionInstance, ExceptionType, EXCEPTION};
use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// Clause Types
// ============================================================================

/// Inline capacity for catch clauses.
const INLINE_CATCH_CAPACITY: usize = 4;

type Body<'a, R> = Box<dyn FnOnce(&mut Context) -> Flow<(), R> + 'a>;
type Handler<'a, R> = Box<dyn FnOnce(&mut Context, &ExceptionInstance) -> Flow<(), R> + 'a>;

/// A catch clause bound to an exception type.
struct CatchClause<'a, R> {
    ty: &'static ExceptionType,
    handler: Handler<'a, R>,
}

// ============================================================================
// Region
// ============================================================================

/// A protected region under construction.
///
/// `R` is the return type of the enclosing function, carried by early
/// returns out of the body or any clause.
#[must_use = "a region does nothing until it is run"]
pub struct Region<'a, R = ()> {
    body: Body<'a, R>,
    catches: SmallVec<[CatchClause<'a, R>; INLINE_CATCH_CAPACITY]>,
    passed: Option<Body<'a, R>>,
    finally: Option<Body<'a, R>>,
}

impl<'a, R> Region<'a, R> {
    /// Starts a region around `body`.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(&mut Context) -> Flow<(), R> + 'a,
    {
        Self {
            body: Box::new(body),
            catches: SmallVec::new(),
            passed: None,
            finally: None,
        }
    }

    /// Adds a catch clause for `ty` and all of its descendants.
    pub fn catch<F>(mut self, ty: &'static ExceptionType, handler: F) -> Self
    where
        F: FnOnce(&mut Context, &ExceptionInstance) -> Flow<(), R> + 'a,
    {
        self.catches.push(CatchClause {
            ty,
            handler: Box::new(handler),
        });
        self
    }

    /// Adds a catch clause matching any exception.
    pub fn catch_any<F>(self, handler: F) -> Self
    where
        F: FnOnce(&mut Context, &ExceptionInstance) -> Flow<(), R> + 'a,
    {
        self.catch(&EXCEPTION, handler)
    }

    /// Sets the clause run when the body completes without an exception.
    pub fn passed<F>(mut self, clause: F) -> Self
    where
        F: FnOnce(&mut Context) -> Flow<(), R> + 'a,
    {
        self.passed = Some(Box::new(clause));
        self
    }

    /// Sets the cleanup clause, run exactly once on every exit path.
    pub fn finally<F>(mut self, clause: F) -> Self
    where
        F: FnOnce(&mut Context) -> Flow<(), R> + 'a,
    {
        self.finally = Some(Box::new(clause));
        self
    }

    /// Returns the number of catch clauses.
    #[inline]
    #[must_use]
    pub fn catch_count(&self) -> usize {
        self.catches.len()
    }

    /// Runs the region to completion.
    ///
    /// Returns `Ok(())` if the region settled (no exception, or a caught
    /// one). Otherwise returns the jump the caller must forward: the
    /// uncaught or secondary exception re-raised in the enclosing region, or
    /// an early return heading for the function boundary. If no region
    /// encloses an escaping exception the uncaught handler runs instead.
    pub fn run(self, cx: &mut Context) -> Flow<(), R> {
        let Self {
            body,
            catches,
            passed,
            finally,
        } = self;

        let Some(checkpoint) = cx.enter() else {
            let overflow = cx.nesting_overflow();
            return cx.raise(overflow);
        };
        let mut pending = None;

        let outcome = body(cx);
        cx.land(checkpoint, outcome, &mut pending);

        match cx.state_of(checkpoint) {
            FrameState::ExceptionOccurred => {
                Self::dispatch(cx, checkpoint, catches, &mut pending);
            }
            FrameState::NoException => {
                if let Some(passed) = passed {
                    let outcome = passed(cx);
                    cx.land(checkpoint, outcome, &mut pending);
                }
            }
            _ => {}
        }

        if let Some(finally) = finally {
            if cx.begin_cleanup(checkpoint) {
                let outcome = finally(cx);
                cx.land(checkpoint, outcome, &mut pending);
            }
        }

        cx.retire(checkpoint, pending)
    }

    /// Hands the frame's exception to the first matching catch clause.
    fn dispatch(
        cx: &mut Context,
        checkpoint: Checkpoint,
        catches: SmallVec<[CatchClause<'a, R>; INLINE_CATCH_CAPACITY]>,
        pending: &mut Option<R>,
    ) {
        let Some(exception) = cx.exception_of(checkpoint) else {
            return;
        };

        let Some(clause) = catches
            .into_iter()
            .find(|clause| exception.is_instance_of(clause.ty))
        else {
            tracing::trace!(checkpoint = %checkpoint, exception = %exception, "no catch clause matched");
            return;
        };

        tracing::debug!(
            checkpoint = %checkpoint,
            exception = %exception,
            clause = clause.ty.name(),
            "caught"
        );
        cx.mark_caught(checkpoint);
        let outcome = (clause.handler)(cx, &exception);
        cx.land(checkpoint, outcome, pending);
    }
}

impl<R> fmt::Debug for Region<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catches: SmallVec<[&str; INLINE_CATCH_CAPACITY]> =
            self.catches.iter().map(|clause| clause.ty.name()).collect();
        f.debug_struct("Region")
            .field("catches", &catches.as_slice())
            .field("passed", &self.passed.is_some())
            .field("finally", &self.finally.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
