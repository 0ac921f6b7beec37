//! Frame state machine.
//!
//! Every protected region owns one frame, and the frame's state records where
//! the region is in its lifecycle. The region driver reads the state after
//! every clause to decide what runs next.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                       Frame State Machine                            │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │   Entered ──▶ Trying ──┬── body completes ──▶ NoException            │
//! │                        │                         │                   │
//! │                        │                    passed clause raises     │
//! │                        │                         ▼                   │
//! │                        ├── body raises ──▶ ExceptionOccurred         │
//! │                        │                    │          │             │
//! │                        │              handler found  no handler      │
//! │                        │                    ▼          │             │
//! │                        │            CaughtException    │             │
//! │                        │                    │          │             │
//! │                        │              clause raises    │             │
//! │                        │                    ▼          ▼             │
//! │                        │            ExceptionLeaked ── re-signal     │
//! │                        │                                             │
//! │                        └── return_from ──▶ Interrupted               │
//! │                                                │                     │
//! │                                           cleanup ran                │
//! │                                                ▼                     │
//! │                                            ToReturn                  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

// ============================================================================
// Frame State
// ============================================================================

/// Lifecycle state of a protected region.
///
/// # Memory Layout (1 byte)
///
/// ```text
/// ┌──────────────────────────┐
/// │ discriminant 0..=7 (1b)  │
/// └──────────────────────────┘
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FrameState {
    /// Frame pushed, checkpoint not yet armed.
    #[default]
    Entered = 0,

    /// Body is executing.
    Trying = 1,

    /// Body completed without raising.
    NoException = 2,

    /// Body raised; the exception is held in the frame.
    ExceptionOccurred = 3,

    /// A catch clause matched and is running (or ran).
    CaughtException = 4,

    /// A clause past the body raised; never matched against this region's
    /// catch clauses.
    ExceptionLeaked = 5,

    /// An early return was requested; cleanup still has to run.
    Interrupted = 6,

    /// Cleanup is done (or the return came from cleanup itself); the return
    /// may leave the region.
    ToReturn = 7,
}

impl FrameState {
    /// Creates from a raw u8 value.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Entered),
            1 => Some(Self::Trying),
            2 => Some(Self::NoException),
            3 => Some(Self::ExceptionOccurred),
            4 => Some(Self::CaughtException),
            5 => Some(Self::ExceptionLeaked),
            6 => Some(Self::Interrupted),
            7 => Some(Self::ToReturn),
            _ => None,
        }
    }

    /// Returns the raw u8 value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true while the body (not a clause) owns the frame.
    ///
    /// A raise in this phase is primary and may be caught by this region.
    #[inline]
    #[must_use]
    pub const fn is_in_body(self) -> bool {
        matches!(self, Self::Entered | Self::Trying | Self::ExceptionOccurred)
    }

    /// Returns true if the frame holds an exception that must leave the
    /// region.
    #[inline]
    #[must_use]
    pub const fn is_propagating(self) -> bool {
        matches!(self, Self::ExceptionOccurred | Self::ExceptionLeaked)
    }

    /// Returns true if an early return is in progress.
    #[inline]
    #[must_use]
    pub const fn is_returning(self) -> bool {
        matches!(self, Self::Interrupted | Self::ToReturn)
    }

    /// Returns true if the region will complete normally.
    #[inline]
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::NoException | Self::CaughtException)
    }

    /// Returns a human-readable name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entered => "Entered",
            Self::Trying => "Trying",
            Self::NoException => "NoException",
            Self::ExceptionOccurred => "ExceptionOccurred",
            Self::CaughtException => "CaughtException",
            Self::ExceptionLeaked => "ExceptionLeaked",
            Self::Interrupted => "Interrupted",
            Self::ToReturn => "ToReturn",
        }
    }
}

impl fmt::Debug for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameState::{}", self.name())
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
