//! Result type definition and extension traits for Railway-Oriented Programming.
//!
//! Provides combinators so call sites never need unwrap/expect/panic.

use crate::error::Error;

/// The standard Result type for netmotif operations.
///
/// # Examples
///
/// ```
/// use netmotif_core::{Error, Result};
///
/// fn ratio(num: usize, den: usize) -> Result<f64> {
///     if den == 0 {
///         return Err(Error::computation("zero denominator"));
///     }
///     Ok(num as f64 / den as f64)
/// }
///
/// assert!(ratio(1, 0).is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait providing side-effect combinators for Results.
pub trait ResultExt<T> {
    /// Inspect the error without consuming the Result.
    #[must_use]
    fn inspect_error<F: FnOnce(&Error)>(self, f: F) -> Self;
}

impl<T> ResultExt<T> for Result<T> {
    fn inspect_error<F: FnOnce(&Error)>(self, f: F) -> Self {
        if let Err(ref e) = self {
            f(e);
        }
        self
    }
}

/// Extension trait for Option types.
pub trait OptionExt<T> {
    /// Convert `None` into a computation error with the given reason.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComputationFailed`] when the option is empty.
    fn ok_or_computation(self, reason: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_computation(self, reason: &str) -> Result<T> {
        self.ok_or_else(|| Error::computation(reason))
    }
}
