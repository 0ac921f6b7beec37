//! Execution context: the frame stack plus the signalling primitives.
//!
//! One `Context` belongs to one logical execution context (typically one
//! thread) and is threaded through calls as `&mut Context`. Contexts never
//! share frames, so no locking is involved.
//!
//! # Signals
//!
//! | Primitive | Empty stack | Live head frame |
//! |-----------|-------------|-----------------|
//! | `raise` | uncaught handler | store exception, `Jump::Raised(head)` |
//! | `return_from` | plain early return | `Jump::Return(v)`; each region it reaches is `Interrupted` |

use crate::config::ContextConfig;
use crate::frame::{Checkpoint, Frame};
use crate::jump::{Flow, Jump};
use crate::stack::ContextStack;
use crate::state::FrameState;
use crate::uncaught;
use bulwark_core::{define_exception, BulwarkResult, ExceptionInstance, ExceptionType, EXCEPTION};

define_exception! {
    /// Raised in the enclosing region when entering a region would exceed
    /// [`ContextConfig::max_depth`].
    pub NESTING_OVERFLOW = "NestingOverflow": EXCEPTION;
}

// ============================================================================
// Context Stats
// ============================================================================

/// Statistics for exception handling in one context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Protected regions entered.
    pub regions_entered: u64,

    /// Exceptions raised (including re-signals after cleanup).
    pub raised: u64,

    /// Exceptions caught by a catch clause.
    pub caught: u64,

    /// Exceptions raised from a catch, passed or cleanup clause.
    pub leaked: u64,

    /// Cleanup clauses executed.
    pub cleanups_run: u64,

    /// Early returns requested.
    pub early_returns: u64,

    /// Exceptions handed to the uncaught handler.
    pub uncaught: u64,
}

impl ContextStats {
    /// Returns the catch rate as a percentage.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn catch_rate(&self) -> f64 {
        if self.raised == 0 {
            0.0
        } else {
            (self.caught as f64 / self.raised as f64) * 100.0
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Per-execution-context exception state.
#[derive(Debug)]
pub struct Context {
    /// Live frames.
    stack: ContextStack,

    /// Next checkpoint id.
    next_checkpoint: u64,

    /// Statistics.
    stats: ContextStats,
}

impl Context {
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = ContextConfig::default();
        Self::build(&config)
    }

    /// Creates a context with a validated configuration.
    pub fn with_config(config: &ContextConfig) -> BulwarkResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &ContextConfig) -> Self {
        Self {
            stack: ContextStack::with_capacity(config.max_depth, config.frame_capacity),
            next_checkpoint: 0,
            stats: ContextStats::default(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════════

    /// Returns true if no protected region is active.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the number of active protected regions.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the frame stack.
    #[inline]
    #[must_use]
    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Returns the statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ContextStats {
        &self.stats
    }

    /// Manual ancestry check outside the catch mechanism.
    #[inline]
    #[must_use]
    pub fn ancestry_matches(&self, exception: &ExceptionInstance, ty: &ExceptionType) -> bool {
        exception.is_instance_of(ty)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Signalling
    // ════════════════════════════════════════════════════════════════════════

    /// Signals an exception.
    ///
    /// With no live frame the uncaught handler runs and this never returns.
    /// Otherwise the exception is stored in the head frame and the returned
    /// `Err` must be forwarded (`?` or `return`) to that frame's region.
    pub fn raise<T, R>(&mut self, exception: ExceptionInstance) -> Flow<T, R> {
        Err(self.signal(exception))
    }

    /// Requests an early return of `value` from the enclosing function.
    ///
    /// Every cleanup clause between here and the [`returnable`](Self::returnable)
    /// boundary runs before the value reaches the caller. Called from a
    /// cleanup clause, the current frame's cleanup is not run again.
    ///
    /// No frame is touched here: a region only learns of the return when
    /// the jump reaches it. A return consumed by a `returnable` nested inside
    /// a region body leaves that region undisturbed.
    pub fn return_from<T, R>(&mut self, value: R) -> Flow<T, R> {
        self.stats.early_returns += 1;
        tracing::trace!(depth = self.stack.len(), "return requested");
        Err(Jump::Return(value))
    }

    /// Runs `f` as a function body whose early returns land here.
    ///
    /// `Jump::Return(v)` becomes `Ok(v)`; raised exceptions keep travelling
    /// to their checkpoint.
    pub fn returnable<T, S, F>(&mut self, f: F) -> Flow<T, S>
    where
        F: FnOnce(&mut Self) -> Flow<T, T>,
    {
        match f(self) {
            Ok(value) => Ok(value),
            Err(jump) => match jump.retarget() {
                Ok(raised) => Err(raised),
                Err(value) => Ok(value),
            },
        }
    }

    /// Stores `exception` in the head frame and builds the jump to it.
    fn signal<R>(&mut self, exception: ExceptionInstance) -> Jump<R> {
        self.stats.raised += 1;
        let Some(frame) = self.stack.head_mut() else {
            self.stats.uncaught += 1;
            uncaught::invoke(&exception)
        };

        let state = if frame.in_finally || !frame.state.is_in_body() {
            self.stats.leaked += 1;
            FrameState::ExceptionLeaked
        } else {
            FrameState::ExceptionOccurred
        };

        if let Some(previous) = frame.exception.as_ref().filter(|_| frame.state.is_propagating()) {
            tracing::debug!(
                checkpoint = %frame.checkpoint,
                replaced = %previous,
                by = %exception,
                "in-flight exception replaced"
            );
        }

        tracing::trace!(
            checkpoint = %frame.checkpoint,
            from = %frame.state,
            to = %state,
            exception = %exception,
            "raise"
        );
        frame.state = state;
        frame.exception = Some(exception);
        Jump::Raised(frame.checkpoint)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Region Protocol
    // ════════════════════════════════════════════════════════════════════════

    /// Pushes a frame for a new region and arms it.
    ///
    /// Returns `None` if the depth limit refused the push.
    pub(crate) fn enter(&mut self) -> Option<Checkpoint> {
        let checkpoint = Checkpoint::from_raw(self.next_checkpoint);
        if !self.stack.push(Frame::new(checkpoint)) {
            tracing::debug!(depth = self.stack.len(), "region nesting limit reached");
            return None;
        }
        self.next_checkpoint += 1;
        self.stats.regions_entered += 1;

        if let Some(frame) = self.stack.head_mut() {
            frame.state = FrameState::Trying;
        }
        tracing::trace!(checkpoint = %checkpoint, depth = self.stack.len(), "enter region");
        Some(checkpoint)
    }

    /// Builds the overflow exception raised when [`enter`](Self::enter) fails.
    pub(crate) fn nesting_overflow(&self) -> ExceptionInstance {
        ExceptionInstance::new(
            &NESTING_OVERFLOW,
            format!("protected regions nested deeper than {}", self.stack.max_depth()),
        )
    }

    /// Returns the state of the region's frame.
    pub(crate) fn state_of(&self, checkpoint: Checkpoint) -> FrameState {
        match self.stack.head() {
            Some(frame) if frame.checkpoint == checkpoint => frame.state,
            _ => {
                self.contract_violation(checkpoint);
                FrameState::Entered
            }
        }
    }

    /// Returns the region's frame mutably.
    pub(crate) fn frame_mut(&mut self, checkpoint: Checkpoint) -> Option<&mut Frame> {
        let owned = self.stack.head().is_some_and(|frame| frame.checkpoint == checkpoint);
        if !owned {
            self.contract_violation(checkpoint);
            return None;
        }
        self.stack.head_mut()
    }

    /// Absorbs the outcome of a body or clause into the region's frame.
    ///
    /// Normal completion of the body settles the frame as `NoException`.
    /// A return records its value in `pending` and interrupts the frame, or
    /// goes straight to `ToReturn` when it comes out of cleanup. A raise
    /// already updated the frame when it was signalled.
    pub(crate) fn land<R>(&mut self, checkpoint: Checkpoint, outcome: Flow<(), R>, pending: &mut Option<R>) {
        let Some(frame) = self.frame_mut(checkpoint) else {
            return;
        };

        match outcome {
            Ok(()) => {
                if frame.state == FrameState::Trying {
                    frame.state = FrameState::NoException;
                }
            }
            Err(Jump::Raised(target)) => {
                debug_assert_eq!(target, checkpoint, "jump landed on the wrong checkpoint");
            }
            Err(Jump::Return(value)) => {
                let state = if frame.in_finally {
                    FrameState::ToReturn
                } else {
                    FrameState::Interrupted
                };
                tracing::trace!(checkpoint = %checkpoint, from = %frame.state, to = %state, "return reached region");
                frame.state = state;
                *pending = Some(value);
            }
        }
    }

    /// Marks the region's exception as caught.
    pub(crate) fn mark_caught(&mut self, checkpoint: Checkpoint) {
        if let Some(frame) = self.frame_mut(checkpoint) {
            frame.state = FrameState::CaughtException;
            self.stats.caught += 1;
        }
    }

    /// Flags the region as running its cleanup.
    ///
    /// Returns false if cleanup already started.
    pub(crate) fn begin_cleanup(&mut self, checkpoint: Checkpoint) -> bool {
        let Some(frame) = self.frame_mut(checkpoint) else {
            return false;
        };
        if frame.in_finally {
            return false;
        }
        frame.in_finally = true;
        self.stats.cleanups_run += 1;
        true
    }

    /// Returns the exception held by the region's frame.
    pub(crate) fn exception_of(&self, checkpoint: Checkpoint) -> Option<ExceptionInstance> {
        self.stack
            .head()
            .filter(|frame| frame.checkpoint == checkpoint)
            .and_then(|frame| frame.exception.clone())
    }

    /// Pops the region's frame and forwards whatever must leave it.
    pub(crate) fn retire<R>(&mut self, checkpoint: Checkpoint, pending: Option<R>) -> Flow<(), R> {
        if self.stack.head().map(|frame| frame.checkpoint) != Some(checkpoint) {
            self.contract_violation(checkpoint);
            return Ok(());
        }
        let Some(mut frame) = self.stack.pop() else {
            return Ok(());
        };

        if frame.state == FrameState::Interrupted {
            frame.state = FrameState::ToReturn;
        }
        tracing::trace!(checkpoint = %checkpoint, state = %frame.state, "retire region");

        match (frame.state, pending, frame.exception) {
            (FrameState::ToReturn, Some(value), _) => Err(Jump::Return(value)),
            (state, _, Some(exception)) if state.is_propagating() => Err(self.signal(exception)),
            (state, _, _) if state.is_settled() => Ok(()),
            (state, _, _) => {
                // A jump was swallowed between its signal and this region.
                tracing::error!(checkpoint = %checkpoint, state = %state, "region retired without its payload");
                Ok(())
            }
        }
    }

    fn contract_violation(&self, checkpoint: Checkpoint) {
        let head = self.stack.head().map(|frame| frame.checkpoint);
        tracing::error!(
            expected = %checkpoint,
            head = ?head,
            "context stack out of order; regions must retire in LIFO order"
        );
        debug_assert!(false, "context stack head {head:?} is not region {checkpoint}");
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    bulwark_core::define_exception! {
        IO_FAILURE = "IOFailure": EXCEPTION;
    }

    fn io(message: &str) -> ExceptionInstance {
        ExceptionInstance::new(&IO_FAILURE, message)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Raise Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_raise_in_body_marks_occurred() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();

        let flow: Flow<(), ()> = cx.raise(io("disk error"));
        assert_eq!(flow, Err(Jump::Raised(checkpoint)));

        let frame = cx.stack().head().unwrap();
        assert_eq!(frame.state, FrameState::ExceptionOccurred);
        assert_eq!(frame.exception.as_ref().unwrap().message(), Some("disk error"));
        assert_eq!(cx.stats().raised, 1);
        assert_eq!(cx.stats().leaked, 0);
    }

    #[test]
    fn test_raise_after_body_marks_leaked() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        let _: Flow<(), ()> = cx.raise(io("first"));
        cx.mark_caught(checkpoint);

        let _: Flow<(), ()> = cx.raise(io("second"));
        let frame = cx.stack().head().unwrap();
        assert_eq!(frame.state, FrameState::ExceptionLeaked);
        assert_eq!(frame.exception.as_ref().unwrap().message(), Some("second"));
        assert_eq!(cx.stats().leaked, 1);
    }

    #[test]
    fn test_raise_in_cleanup_marks_leaked() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        let mut pending = None;
        cx.land::<()>(checkpoint, Ok(()), &mut pending);
        assert!(cx.begin_cleanup(checkpoint));

        let _: Flow<(), ()> = cx.raise(io("cleanup"));
        assert_eq!(cx.state_of(checkpoint), FrameState::ExceptionLeaked);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Return Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_return_landing_interrupts_region() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();

        let flow: Flow<(), i32> = cx.return_from(42);
        assert_eq!(flow, Err(Jump::Return(42)));
        assert_eq!(cx.state_of(checkpoint), FrameState::Trying);

        let mut pending = None;
        cx.land(checkpoint, flow, &mut pending);
        assert_eq!(cx.state_of(checkpoint), FrameState::Interrupted);
        assert_eq!(pending, Some(42));
    }

    #[test]
    fn test_return_from_cleanup_goes_straight_to_return() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        cx.begin_cleanup(checkpoint);

        let flow: Flow<(), i32> = cx.return_from(1);
        let mut pending = None;
        cx.land(checkpoint, flow, &mut pending);
        assert_eq!(cx.state_of(checkpoint), FrameState::ToReturn);
    }

    #[test]
    fn test_return_consumed_inside_region_leaves_frame_alone() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();

        let value: Flow<i32, ()> = cx.returnable(|cx| {
            cx.return_from(5)?;
            Ok(0)
        });
        assert_eq!(value, Ok(5));
        assert_eq!(cx.state_of(checkpoint), FrameState::Trying);

        let _: Flow<(), ()> = cx.raise(io("later"));
        assert_eq!(cx.state_of(checkpoint), FrameState::ExceptionOccurred);
    }

    #[test]
    fn test_return_outside_region_is_plain_return() {
        let mut cx = Context::new();
        let value: Flow<i32, ()> = cx.returnable(|cx| cx.return_from(7));
        assert_eq!(value, Ok(7));
    }

    #[test]
    fn test_returnable_passes_normal_value() {
        let mut cx = Context::new();
        let value: Flow<&str, ()> = cx.returnable(|_| Ok("done"));
        assert_eq!(value, Ok("done"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Region Protocol Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_enter_arms_frame() {
        let mut cx = Context::new();
        let first = cx.enter().unwrap();
        let second = cx.enter().unwrap();

        assert_ne!(first, second);
        assert_eq!(cx.depth(), 2);
        let head = cx.stack().head().unwrap();
        assert_eq!(head.state, FrameState::Trying);
        assert_eq!(head.link, Some(first));
    }

    #[test]
    fn test_enter_refused_at_limit() {
        let config = ContextConfig {
            max_depth: 1,
            frame_capacity: 1,
        };
        let mut cx = Context::with_config(&config).unwrap();
        assert!(cx.enter().is_some());
        assert!(cx.enter().is_none());
        assert_eq!(cx.nesting_overflow().exception_type(), &NESTING_OVERFLOW);
    }

    #[test]
    fn test_land_ok_settles_body() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        let mut pending = None;
        cx.land::<()>(checkpoint, Ok(()), &mut pending);
        assert_eq!(cx.state_of(checkpoint), FrameState::NoException);
    }

    #[test]
    fn test_begin_cleanup_only_once() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        assert!(cx.begin_cleanup(checkpoint));
        assert!(!cx.begin_cleanup(checkpoint));
        assert_eq!(cx.stats().cleanups_run, 1);
    }

    #[test]
    fn test_retire_resignals_to_enclosing_frame() {
        let mut cx = Context::new();
        let outer = cx.enter().unwrap();
        let inner = cx.enter().unwrap();
        let _: Flow<(), ()> = cx.raise(io("escape"));

        let flow = cx.retire::<()>(inner, None);
        assert_eq!(flow, Err(Jump::Raised(outer)));
        assert_eq!(cx.depth(), 1);
        assert_eq!(cx.state_of(outer), FrameState::ExceptionOccurred);
        assert_eq!(cx.exception_of(outer).unwrap().message(), Some("escape"));
    }

    #[test]
    fn test_retire_interrupted_returns_value() {
        let mut cx = Context::new();
        let checkpoint = cx.enter().unwrap();
        let mut pending = None;
        let flow = cx.return_from(5);
        cx.land(checkpoint, flow, &mut pending);

        assert_eq!(cx.retire(checkpoint, pending), Err(Jump::Return(5)));
        assert!(cx.is_empty());
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = ContextConfig::default().with_max_depth(0);
        assert!(Context::with_config(&config).is_err());
    }

    #[test]
    fn test_catch_rate() {
        let stats = ContextStats {
            raised: 4,
            caught: 1,
            ..Default::default()
        };
        assert!((stats.catch_rate() - 25.0).abs() < f64::EPSILON);
        assert!(ContextStats::default().catch_rate().abs() < f64::EPSILON);
    }
}
