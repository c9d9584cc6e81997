//! Error and result types for the `cmphints` crate.
//!
//! Note that a hint which cannot be applied (a candidate of the wrong width,
//! a patch of the wrong length, a replacement equal to the current value) is
//! not an error: it is skipped. Errors are reserved for contract violations
//! by the caller and for exhaustion.

use crate::Width;
use alloc::boxed::Box;
use core::fmt;

/// A result that is either `Ok(T)` or `Err(cmphints::Error)`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An extension trait for [`cmphints::Result`][crate::Result] that provides
/// additional methods.
pub trait ResultExt {
    /// Ignores the error if it is [`Exhausted`][ErrorKind::Exhausted],
    /// returning `Ok(())` instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmphints::{Error, Result, ResultExt};
    ///
    /// let result: Result<()> = Err(Error::exhausted());
    /// let result = result.ignore_exhausted();
    /// assert!(result.is_ok());
    /// ```
    fn ignore_exhausted(self) -> Result<()>;
}

impl<T> ResultExt for Result<T> {
    #[inline]
    fn ignore_exhausted(self) -> Result<()> {
        match self {
            Ok(_) => Ok(()),
            Err(err) if err.is_exhausted() => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// An error that can occur when using the `cmphints` crate.
///
/// This type is a thin, boxed wrapper around [`ErrorKind`], which contains the
/// specific kind of error that occurred.
///
/// # Examples
///
/// ```
/// use cmphints::{CompMap, Error, ErrorKind, Program};
///
/// // One call, but no comparison maps at all.
/// let program = Program::new(vec![cmphints::Call::new("close", vec![])]);
/// let error: Error = cmphints::hints(&program, &[]).unwrap_err();
///
/// match error.kind() {
///     ErrorKind::CompsMismatch { calls, comps } => {
///         assert_eq!(*calls, 1);
///         assert_eq!(*comps, 0);
///     }
///
///     // The `ErrorKind` type is not exhaustive, so we always need a catch-all arm.
///     unknown => panic!("unexpected error: {unknown:?}"),
/// }
/// # let _ = CompMap::new();
/// ```
pub struct Error {
    kind: Box<ErrorKind>,
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            ErrorKind::Exhausted => write!(f, "there are no hints to apply"),
            ErrorKind::CompsMismatch { calls, comps } => write!(
                f,
                "got {comps} comparison maps for a program with {calls} calls"
            ),
            ErrorKind::ValueOutOfRange { value, width } => {
                write!(f, "value {value:#x} does not fit in {} bits", width.bits())
            }
            ErrorKind::InvalidWidth(bits) => write!(f, "unsupported bit width: {bits}"),
            ErrorKind::InvalidPath => write!(f, "argument path does not resolve to an argument"),
            ErrorKind::Other(msg) => write!(f, "an unknown error occurred: {msg}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl Error {
    /// Returns a new error indicating that there are no hints to apply.
    #[must_use]
    pub fn exhausted() -> Self {
        ErrorKind::Exhausted.into()
    }

    /// Returns a new error indicating that the number of comparison maps does
    /// not match the number of calls in the program.
    #[must_use]
    pub fn comps_mismatch(calls: usize, comps: usize) -> Self {
        ErrorKind::CompsMismatch { calls, comps }.into()
    }

    /// Returns a new error indicating that `value` does not fit in `width`.
    #[must_use]
    pub fn value_out_of_range(value: u64, width: Width) -> Self {
        ErrorKind::ValueOutOfRange { value, width }.into()
    }

    /// Returns a new error indicating that `bits` is not a supported width.
    #[must_use]
    pub fn invalid_width(bits: u32) -> Self {
        ErrorKind::InvalidWidth(bits).into()
    }

    /// Returns a new error indicating that an argument path is dangling.
    #[must_use]
    pub fn invalid_path() -> Self {
        ErrorKind::InvalidPath.into()
    }

    /// Returns a new error with the given message.
    #[must_use]
    pub fn other(msg: impl Into<ErrorMessage>) -> Self {
        ErrorKind::Other(msg.into()).into()
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` if the error's kind is
    /// [`Exhausted`][ErrorKind::Exhausted].
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind(), ErrorKind::Exhausted)
    }

    /// Returns `true` if the error's kind is
    /// [`CompsMismatch`][ErrorKind::CompsMismatch].
    #[must_use]
    pub fn is_comps_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::CompsMismatch { .. })
    }

    /// Returns `true` if the error's kind is
    /// [`ValueOutOfRange`][ErrorKind::ValueOutOfRange].
    #[must_use]
    pub fn is_value_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::ValueOutOfRange { .. })
    }

    /// Returns `true` if the error's kind is
    /// [`InvalidWidth`][ErrorKind::InvalidWidth].
    #[must_use]
    pub fn is_invalid_width(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidWidth(_))
    }

    /// Returns `true` if the error's kind is
    /// [`InvalidPath`][ErrorKind::InvalidPath].
    #[must_use]
    pub fn is_invalid_path(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidPath)
    }

    /// Returns `true` if the error's kind is [`Other`][ErrorKind::Other].
    #[must_use]
    pub fn is_other(&self) -> bool {
        matches!(self.kind(), ErrorKind::Other(_))
    }
}

/// The kind of an error that can occur when using the `cmphints` crate.
///
/// This enum is not exhaustive, and new variants may be added in the future.
/// When matching on this enum, a catch-all arm should be used to handle any
/// new variants that are added.
#[non_exhaustive]
#[derive(Debug)]
pub enum ErrorKind {
    /// There were no hints to choose from.
    Exhausted,

    /// The comparison maps are out of sync with the program they were
    /// recorded for: there must be exactly one map per call.
    CompsMismatch {
        /// The number of calls in the program.
        calls: usize,
        /// The number of comparison maps that were supplied.
        comps: usize,
    },

    /// A constant's value does not fit in its declared width.
    ValueOutOfRange {
        /// The offending value.
        value: u64,
        /// The declared width.
        width: Width,
    },

    /// A bit width other than 8, 16, 32, or 64.
    InvalidWidth(u32),

    /// An argument path that does not lead to an argument.
    InvalidPath,

    /// Some other error occurred.
    Other(ErrorMessage),
}

impl From<Error> for ErrorKind {
    #[inline]
    fn from(err: Error) -> Self {
        *err.kind
    }
}

/// A message that can be attached to an error.
///
/// This should only be used with `ErrorKind::Other` and in situations where
/// there is not a more-specific error kind to use.
///
/// # Examples
///
/// ```
/// use cmphints::ErrorMessage;
///
/// let msg = ErrorMessage::new("something went wrong");
/// assert_eq!(msg.as_str(), "something went wrong");
/// ```
#[derive(Debug)]
pub struct ErrorMessage {
    inner: alloc::borrow::Cow<'static, str>,
}

impl ErrorMessage {
    /// Returns a new error message with the given string.
    #[must_use]
    pub fn new(msg: impl Into<ErrorMessage>) -> Self {
        msg.into()
    }

    /// Returns the message as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for ErrorMessage {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self {
            inner: alloc::borrow::Cow::Borrowed(s),
        }
    }
}

impl From<alloc::string::String> for ErrorMessage {
    #[inline]
    fn from(s: alloc::string::String) -> Self {
        Self { inner: s.into() }
    }
}
