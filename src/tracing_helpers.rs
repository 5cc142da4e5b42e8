//! Logging helpers.
//!
//! With the `tracing` feature enabled these macros forward to the `tracing` crate; without it they
//! expand to nothing.
//!
//! ```bash
//! RUST_LOG=cordyceps_avl=trace cargo run --features tracing
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level logging. Used for individual rotations.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level logging. Used for rebalancing decisions.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
