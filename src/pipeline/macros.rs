//! Logging macros.
//!
//! Arguments are either all named or all positional:
//!
//! ```ignore
//! log_info!(logger, "Served {Count} items to {User}", Count = n, User = user);
//! log_info!(logger, "Served {Count} items to {User}", n, user);
//! ```

/// Log at an explicit level. The per-level macros forward here.
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $template:expr $(,)?) => {
        $logger.log($level, $template, $crate::pipeline::Args::new())
    };
    ($logger:expr, $level:expr, $template:expr, $($key:ident = $value:expr),+ $(,)?) => {
        $logger.log(
            $level,
            $template,
            $crate::pipeline::Args::new()$(.with(stringify!($key), &$value))+,
        )
    };
    ($logger:expr, $level:expr, $template:expr, $($value:expr),+ $(,)?) => {
        $logger.log(
            $level,
            $template,
            $crate::pipeline::Args::new()$(.push(&$value))+,
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::pipeline::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::pipeline::Level::Information, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::pipeline::Level::Warning, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::pipeline::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::pipeline::Level::Fatal, $($rest)+)
    };
}
