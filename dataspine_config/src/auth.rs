use std::{fmt, str::FromStr};

use crate::ConfigError;

const STATIC_TOKEN_PREFIX: &str = "static:";

/// The trust model used to authenticate against Dataspine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// A pre-issued token, used as is
    StaticToken,
    /// An OAuth2 identity token, exchanged for a Dataspine token
    TokenExchange,
    /// An AWS IAM identity, proven to and exchanged with the token exchange
    AwsTokenExchange,
}

impl AuthType {
    /// The configuration name of the auth type
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StaticToken => "static-token",
            Self::TokenExchange => "token-exchange",
            Self::AwsTokenExchange => "aws-token-exchange",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static-token" => Ok(Self::StaticToken),
            "token-exchange" => Ok(Self::TokenExchange),
            "aws-token-exchange" => Ok(Self::AwsTokenExchange),
            other => Err(ConfigError::UnknownAuthType(other.to_owned())),
        }
    }
}

/// Extracts the token from a `static:<token>` auth token source
///
/// An empty token counts as absent.
pub(crate) fn parse_static_token(source: &str) -> Result<Option<&str>, ConfigError> {
    let token = source
        .strip_prefix(STATIC_TOKEN_PREFIX)
        .ok_or(ConfigError::UnsupportedAuthTokenFormat)?;

    Ok(Some(token).filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_auth_types() {
        for auth_type in [
            AuthType::StaticToken,
            AuthType::TokenExchange,
            AuthType::AwsTokenExchange,
        ] {
            assert_eq!(auth_type.as_str().parse::<AuthType>().unwrap(), auth_type);
        }
    }

    #[test]
    fn rejects_unknown_auth_types() {
        let error = "kerberos".parse::<AuthType>().unwrap_err();

        assert!(matches!(error, ConfigError::UnknownAuthType(ref t) if t == "kerberos"));
    }

    #[test]
    fn static_tokens_keep_everything_after_the_prefix() {
        assert_eq!(parse_static_token("static:abc:def").unwrap(), Some("abc:def"));
        assert_eq!(parse_static_token("static:").unwrap(), None);
    }

    #[test]
    fn other_token_sources_are_unsupported() {
        assert!(matches!(
            parse_static_token("file:/run/secrets/token"),
            Err(ConfigError::UnsupportedAuthTokenFormat)
        ));
    }
}
