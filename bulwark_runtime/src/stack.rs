//! Per-context stack of live frames.
//!
//! The stack is a plain LIFO registry of in-flight protected regions and
//! their checkpoints. It knows nothing about exception semantics; the
//! protocol in [`region`](crate::region) and [`context`](crate::context)
//! drives it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Context Stack                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌─────────────────┐   push     ┌─────────────────────────────┐ │
//! │  │ region entry    │ ────────▶  │ Frame {                     │ │
//! │  └─────────────────┘            │   state, in_finally,        │ │
//! │                                 │   exception, checkpoint,    │ │
//! │  ┌─────────────────┐            │   link ──▶ enclosing frame  │ │
//! │  │ region retire   │ ────────▶  │ }                           │ │
//! │  └─────────────────┘   pop      └─────────────────────────────┘ │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | push | O(1) |
//! | pop | O(1) |
//! | head | O(1) |

use crate::frame::Frame;
use crate::state::FrameState;
use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Inline capacity for the frame stack.
/// Most code nests only a handful of protected regions.
const INLINE_FRAME_CAPACITY: usize = 8;

// ============================================================================
// Context Stack
// ============================================================================

/// LIFO stack of live frames, innermost at the head.
#[derive(Clone)]
pub struct ContextStack {
    /// Live frames (head last).
    frames: SmallVec<[Frame; INLINE_FRAME_CAPACITY]>,

    /// Push limit.
    max_depth: usize,

    /// Statistics.
    stats: ContextStackStats,
}

impl ContextStack {
    /// Creates an empty stack with the given push limit.
    #[inline]
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: SmallVec::new(),
            max_depth,
            stats: ContextStackStats::new(),
        }
    }

    /// Creates an empty stack with reserved capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(max_depth: usize, capacity: usize) -> Self {
        Self {
            frames: SmallVec::with_capacity(capacity),
            max_depth,
            stats: ContextStackStats::new(),
        }
    }

    /// Pushes a frame and makes it the head.
    ///
    /// The frame is reset: linked to the current head, state `Entered`, not
    /// in cleanup, no exception. Returns `false` (and drops the frame) if the
    /// stack is at its depth limit.
    pub fn push(&mut self, mut frame: Frame) -> bool {
        if self.frames.len() >= self.max_depth {
            self.stats.rejected += 1;
            return false;
        }

        frame.link = self.frames.last().map(|head| head.checkpoint);
        frame.state = FrameState::Entered;
        frame.in_finally = false;
        frame.exception = None;

        self.frames.push(frame);
        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.frames.len());
        true
    }

    /// Removes the head; the enclosing frame becomes the new head.
    ///
    /// Callers pop exactly once per successful push.
    #[inline]
    pub fn pop(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        self.stats.pops += 1;
        Some(frame)
    }

    /// Returns true if no region is active.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the number of live frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns the depth limit.
    #[inline]
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the innermost frame.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Returns the innermost frame mutably.
    #[inline]
    pub fn head_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Iterates frames from the head outward.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Frame> {
        self.frames.iter().rev()
    }

    /// Returns the statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ContextStackStats {
        &self.stats
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_DEPTH)
    }
}

impl fmt::Debug for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStack")
            .field("depth", &self.frames.len())
            .field("frames", &self.frames.as_slice())
            .finish()
    }
}

// ============================================================================
// Context Stack Stats
// ============================================================================

/// Statistics for stack operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContextStackStats {
    /// Successful pushes.
    pub pushes: u64,

    /// Pops.
    pub pops: u64,

    /// Pushes refused at the depth limit.
    pub rejected: u64,

    /// Deepest nesting observed.
    pub max_depth: usize,
}

impl ContextStackStats {
    /// Creates new empty stats.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pushes: 0,
            pops: 0,
            rejected: 0,
            max_depth: 0,
        }
    }

    /// Returns the number of frames pushed but not yet popped.
    #[inline]
    #[must_use]
    pub const fn live(&self) -> u64 {
        self.pushes.saturating_sub(self.pops)
    }
}

// ============================================================================
// Tests
// ============================================================================
