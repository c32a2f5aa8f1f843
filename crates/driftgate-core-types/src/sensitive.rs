//! Sensitive data marker for automatic redaction
//!
//! The `Sensitive<T>` wrapper ensures that sensitive data (the approval PIN,
//! resolved API secrets) is never accidentally logged or displayed.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use driftgate_core_types::Sensitive;
///
/// let pin = Sensitive::new("1234");
/// println!("{:?}", pin); // Prints: ***REDACTED***
/// println!("{}", pin);   // Prints: ***REDACTED***
///
/// // Access the actual value when needed
/// assert_eq!(pin.expose(), &"1234");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Use this method sparingly and only when the sensitive data
    /// must be accessed (e.g., for PIN verification).
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
