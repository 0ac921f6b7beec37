//! Context configuration.

use bulwark_core::{BulwarkError, BulwarkResult};

// =============================================================================
// Context Configuration
// =============================================================================

/// Default maximum nesting of protected regions per context.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Configuration for a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Maximum number of live frames. Entering a region beyond this raises
    /// `NestingOverflow` in the enclosing region.
    pub max_depth: usize,
    /// Frames reserved up front.
    pub frame_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            frame_capacity: 8,
        }
    }
}

impl ContextConfig {
    /// Create a configuration with no practical nesting limit.
    #[inline]
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
            ..Default::default()
        }
    }

    /// Create a configuration for testing (shallow limit).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_depth: 16,
            frame_capacity: 4,
        }
    }

    /// Set the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> BulwarkResult<()> {
        if self.max_depth == 0 {
            return Err(BulwarkError::invalid_config(
                "max_depth must allow at least one protected region",
            ));
        }
        if self.frame_capacity > self.max_depth {
            return Err(BulwarkError::invalid_config(format!(
                "frame_capacity ({}) exceeds max_depth ({})",
                self.frame_capacity, self.max_depth
            )));
        }
        Ok(())
    }
}
