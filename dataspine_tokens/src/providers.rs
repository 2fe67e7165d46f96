//! Token providers

use crate::AuthenticationStatus;

#[cfg(feature = "aws")]
pub mod aws;
pub mod exchange;
pub mod in_memory;

/// A source of the current authentication status
///
/// This is the only capability downstream clients need; how the token was
/// obtained is left to the implementation.
///
/// Reading the status performs no I/O and cannot fail. Operations that change
/// the status take `&mut self`, so a provider shared between threads must be
/// wrapped in the caller's own synchronization. A reader holding a stale
/// status will not observe later updates.
pub trait TokenProvider {
    /// Gets the current authentication status
    fn authentication_status(&self) -> AuthenticationStatus;
}

impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    fn authentication_status(&self) -> AuthenticationStatus {
        (**self).authentication_status()
    }
}
