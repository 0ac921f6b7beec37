//! Non-local control transfer signals.
//!
//! A jump is carried back to its checkpoint through ordinary returns: every
//! function between the throw site and the protected region returns
//! `Flow<T, R>` and forwards the jump with `?`. The region owning the target
//! checkpoint consumes it.
//!
//! ```text
//! raise ──▶ Err(Jump::Raised(cp)) ──?──▶ ... ──?──▶ Region::run (owns cp)
//! return_from(v) ──▶ Err(Jump::Return(v)) ──?──▶ each region's cleanup ──▶ returnable
//! ```

use crate::frame::Checkpoint;

/// Discriminated signal travelling back to a checkpoint.
#[must_use = "a jump must be forwarded to the enclosing protected region"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Jump<R = ()> {
    /// An exception was stored in the frame owning this checkpoint.
    Raised(Checkpoint),

    /// An early return carrying the function's return value.
    Return(R),
}

impl<R> Jump<R> {
    /// Returns true for a raised exception.
    #[inline]
    pub const fn is_raised(&self) -> bool {
        matches!(self, Self::Raised(_))
    }

    /// Returns true for an early return.
    #[inline]
    pub const fn is_return(&self) -> bool {
        matches!(self, Self::Return(_))
    }

    /// Returns the target checkpoint of a raised exception.
    #[inline]
    pub const fn target(&self) -> Option<Checkpoint> {
        match self {
            Self::Raised(checkpoint) => Some(*checkpoint),
            Self::Return(_) => None,
        }
    }

    /// Re-types a raised signal for a caller with a different return type.
    ///
    /// Returns the value back as `Err` for an early return, which must be
    /// consumed at the function boundary instead.
    #[inline]
    pub fn retarget<S>(self) -> Result<Jump<S>, R> {
        match self {
            Self::Raised(checkpoint) => Ok(Jump::Raised(checkpoint)),
            Self::Return(value) => Err(value),
        }
    }
}

/// Result of protocol-aware code.
///
/// `T` is the normal completion value, `R` the enclosing function's return
/// type carried by early returns.
pub type Flow<T = (), R = ()> = Result<T, Jump<R>>;
