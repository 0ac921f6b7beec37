//! Throw-site macros.
//!
//! Both macros `return` from the enclosing body or clause, so they can only
//! be used where a [`Flow`](crate::Flow) is returned.

/// Raises an exception of the given type, recording the call site.
///
/// ```ignore
/// raise!(cx, IO_FAILURE);
/// raise!(cx, IO_FAILURE, "disk error on {}", device);
/// ```
#[macro_export]
macro_rules! raise {
    ($cx:expr, $ty:expr $(,)?) => {
        return $cx.raise($crate::ExceptionInstance::bare(&$ty).with_origin(file!(), line!()))
    };
    ($cx:expr, $ty:expr, $($arg:tt)+) => {
        return $cx.raise(
            $crate::ExceptionInstance::new(&$ty, ::std::format!($($arg)+))
                .with_origin(file!(), line!()),
        )
    };
}

/// Returns `value` from the enclosing function after all pending cleanups.
#[macro_export]
macro_rules! return_from {
    ($cx:expr, $value:expr $(,)?) => {
        return $cx.return_from($value)
    };
}
