use std::sync::Arc;

use crate::{AccessToken, AccessTokenRef, AuthenticationError};

/// The authentication state reported by a token provider
///
/// A provider starts out [`Unauthorized`][AuthenticationStatus::Unauthorized]
/// and reports a [`Token`][AuthenticationStatus::Token] once it has obtained
/// one. It never returns to `Unauthorized` on its own.
#[derive(Clone, Debug, Default)]
pub enum AuthenticationStatus {
    /// A token is available
    Token {
        /// The most recent token obtained
        last_valid_token: AccessToken,
        /// Whether the token may be rotated by its provider
        is_refreshing: bool,
        /// The error from the last attempt to obtain a token, if any
        last_error: Option<Arc<AuthenticationError>>,
    },
    /// No token has been obtained
    #[default]
    Unauthorized,
}

impl AuthenticationStatus {
    pub(crate) fn token(last_valid_token: AccessToken, is_refreshing: bool) -> Self {
        Self::Token {
            last_valid_token,
            is_refreshing,
            last_error: None,
        }
    }

    /// Whether a token is available
    #[inline]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Token { .. })
    }

    /// Gets the current access token, if available
    #[inline]
    pub fn access_token(&self) -> Option<&AccessTokenRef> {
        match self {
            Self::Token {
                last_valid_token, ..
            } => Some(&**last_valid_token),
            Self::Unauthorized => None,
        }
    }
}
