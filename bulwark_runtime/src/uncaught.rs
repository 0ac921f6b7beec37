//! Process-wide fallback for exceptions nobody catches.
//!
//! The handler is a single global hook. It is read on every uncaught raise
//! and should only be replaced while no context is raising (typically at
//! startup).

use bulwark_core::ExceptionInstance;
use parking_lot::RwLock;

/// Hook invoked when an exception is raised with no live frame.
///
/// It must not return: control never goes back to the raiser.
pub type UncaughtHandler = fn(&ExceptionInstance) -> !;

static UNCAUGHT_HANDLER: RwLock<UncaughtHandler> =
    parking_lot::const_rwlock(default_uncaught_handler as UncaughtHandler);

/// Prints the exception description and aborts the process.
pub fn default_uncaught_handler(exception: &ExceptionInstance) -> ! {
    tracing::error!(exception = %exception, "uncaught exception, aborting");
    eprintln!("uncaught exception: {exception}");
    std::process::abort()
}

/// Installs a new handler and returns the previous one.
pub fn set_uncaught_handler(handler: UncaughtHandler) -> UncaughtHandler {
    std::mem::replace(&mut *UNCAUGHT_HANDLER.write(), handler)
}

/// Returns the currently installed handler.
#[must_use]
pub fn uncaught_handler() -> UncaughtHandler {
    *UNCAUGHT_HANDLER.read()
}

/// Hands the exception to the installed handler.
pub(crate) fn invoke(exception: &ExceptionInstance) -> ! {
    // Copy the pointer out so the lock is not held while the handler runs.
    let handler = uncaught_handler();
    tracing::debug!(exception = %exception, "no live frame, invoking uncaught handler");
    handler(exception)
}
