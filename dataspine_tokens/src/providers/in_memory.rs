//! A static, in-memory token provider

use super::TokenProvider;
use crate::{AccessToken, AuthenticationStatus};

/// A token provider holding a single, pre-issued token
///
/// The token is never rotated. An empty token counts as no token at all.
#[derive(Default, Debug)]
pub struct InMemoryTokenProvider {
    token: Option<AccessToken>,
}

impl InMemoryTokenProvider {
    /// Constructs a new in-memory token provider
    pub const fn new(token: Option<AccessToken>) -> Self {
        Self { token }
    }

    /// Replaces the current token
    pub fn set_token(&mut self, token: AccessToken) {
        self.token = Some(token);
    }
}

impl From<AccessToken> for InMemoryTokenProvider {
    fn from(token: AccessToken) -> Self {
        Self::new(Some(token))
    }
}

impl TokenProvider for InMemoryTokenProvider {
    fn authentication_status(&self) -> AuthenticationStatus {
        match &self.token {
            Some(token) if !token.as_str().is_empty() => {
                AuthenticationStatus::token(token.clone(), false)
            }
            _ => AuthenticationStatus::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_unauthorized_without_a_token() {
        let provider = InMemoryTokenProvider::default();

        assert!(matches!(
            provider.authentication_status(),
            AuthenticationStatus::Unauthorized
        ));
    }

    #[test]
    fn reports_the_token_once_set() {
        let mut provider = InMemoryTokenProvider::new(None);
        provider.set_token(AccessToken::from_static("abc"));

        match provider.authentication_status() {
            AuthenticationStatus::Token {
                last_valid_token,
                is_refreshing,
                last_error,
            } => {
                assert_eq!(last_valid_token.as_str(), "abc");
                assert!(!is_refreshing);
                assert!(last_error.is_none());
            }
            AuthenticationStatus::Unauthorized => panic!("expected a token"),
        }
    }

    #[test]
    fn set_token_overwrites_the_seeded_token() {
        let mut provider = InMemoryTokenProvider::from(AccessToken::from_static("first"));
        provider.set_token(AccessToken::from_static("second"));

        let status = provider.authentication_status();
        assert_eq!(status.access_token().map(|t| t.as_str()), Some("second"));
    }

    #[test]
    fn empty_tokens_are_unauthorized() {
        let mut provider = InMemoryTokenProvider::new(Some(AccessToken::new(String::new())));
        assert!(!provider.authentication_status().is_authorized());

        provider.set_token(AccessToken::from_static(""));
        assert!(matches!(
            provider.authentication_status(),
            AuthenticationStatus::Unauthorized
        ));
    }
}
