use thiserror::Error;

use crate::AuthType;

/// An error in the configuration supplied to the loader
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The auth type requires a token, but none was configured
    #[error("an auth token is required for auth type `{0}`")]
    MissingAuthToken(AuthType),
    /// The auth token source is not in a supported format
    #[error("only static auth tokens (`static:<token>`) are supported")]
    UnsupportedAuthTokenFormat,
    /// The auth type is not recognized
    #[error("unknown auth type `{0}`")]
    UnknownAuthType(String),
    /// The auth type is not available in this build
    #[error("auth type `{0}` is not supported by this build")]
    UnsupportedAuthType(AuthType),
    /// A setting could not be parsed
    #[error("invalid value for `{name}`: {reason}")]
    InvalidSetting {
        /// The name of the setting
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
    /// A setting in the environment is not valid unicode
    #[error("value of `{0}` is not valid unicode")]
    NonUnicodeSetting(String),
    /// The environment file could not be read
    #[error("unable to read environment file")]
    EnvFile(#[from] dotenvy::Error),
}
