//! Logging facade: the `log` crate's macros when the `log` feature is enabled,
//! otherwise macros that expand to nothing so call sites need no `cfg`s.

#![allow(unused_macros, unused_imports)]

#[cfg(feature = "log")]
pub(crate) use ::log::{debug, trace, warn};

#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "log"))]
pub(crate) use debug;

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "log"))]
pub(crate) use trace;

// Only `debug`, `trace` and `warn` have call sites in this crate. Failures are
// returned as errors rather than logged, so there is no `error` or `info`.
//
// `warn` is a builtin attribute name, so the macro needs a different
// definition-site name.
#[cfg(not(feature = "log"))]
macro_rules! warn_impl {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "log"))]
pub(crate) use warn_impl as warn;
