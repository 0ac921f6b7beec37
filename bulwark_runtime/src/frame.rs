//! Context stack frames and checkpoints.

use crate::state::FrameState;
use bulwark_core::ExceptionInstance;
use std::fmt;

// ============================================================================
// Checkpoint
// ============================================================================

/// Landing point of a protected region.
///
/// Checkpoints are unique within a [`Context`](crate::Context). A raised
/// [`Jump`](crate::Jump) names the checkpoint it must land on, and the region
/// owning that checkpoint is the only one allowed to consume it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checkpoint(u64);

impl Checkpoint {
    /// Creates a checkpoint from its raw id.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checkpoint({})", self.0)
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// Live state of one protected region.
#[derive(Clone)]
pub struct Frame {
    /// Lifecycle state.
    pub state: FrameState,

    /// Set once cleanup has started.
    pub in_finally: bool,

    /// Exception held by the frame, if any.
    pub exception: Option<ExceptionInstance>,

    /// Where jumps for this region land.
    pub checkpoint: Checkpoint,

    /// Checkpoint of the enclosing frame.
    pub link: Option<Checkpoint>,
}

impl Frame {
    /// Creates an unlinked frame for the given checkpoint.
    #[inline]
    #[must_use]
    pub const fn new(checkpoint: Checkpoint) -> Self {
        Self {
            state: FrameState::Entered,
            in_finally: false,
            exception: None,
            checkpoint,
            link: None,
        }
    }

    /// Returns true if this frame holds an exception that must propagate.
    #[inline]
    #[must_use]
    pub fn has_pending_exception(&self) -> bool {
        self.state.is_propagating() && self.exception.is_some()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("checkpoint", &self.checkpoint)
            .field("state", &self.state)
            .field("in_finally", &self.in_finally)
            .field("exception", &self.exception.as_ref().map(ExceptionInstance::type_name))
            .field("link", &self.link)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::EXCEPTION;

    #[test]
    fn test_new_frame() {
        let frame = Frame::new(Checkpoint::from_raw(3));
        assert_eq!(frame.state, FrameState::Entered);
        assert!(!frame.in_finally);
        assert!(frame.exception.is_none());
        assert_eq!(frame.checkpoint.as_raw(), 3);
        assert_eq!(frame.link, None);
    }

    #[test]
    fn test_pending_exception_requires_state() {
        let mut frame = Frame::new(Checkpoint::from_raw(0));
        frame.exception = Some(ExceptionInstance::bare(&EXCEPTION));
        frame.state = FrameState::CaughtException;
        assert!(!frame.has_pending_exception());

        frame.state = FrameState::ExceptionLeaked;
        assert!(frame.has_pending_exception());
    }

    #[test]
    fn test_checkpoint_formatting() {
        let cp = Checkpoint::from_raw(7);
        assert_eq!(cp.to_string(), "#7");
        assert_eq!(format!("{cp:?}"), "Checkpoint(7)");
    }
}
