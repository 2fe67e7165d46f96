//! Errors raised while constructing token providers and obtaining tokens

use std::error;

use thiserror::Error;

/// A required input was missing or malformed
///
/// These errors are raised while building a provider, before any token is
/// requested.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The token exchange endpoint is not a valid URL
    #[error("invalid token exchange endpoint `{endpoint}`")]
    InvalidEndpoint {
        /// The offending endpoint, after interpolation
        endpoint: String,
        /// The underlying parse error
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed
    #[error("unable to construct HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// The token exchange failed or rejected the presented proof of identity
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Unable to send the exchange request
    #[error("error sending request to token exchange")]
    RequestSend(#[source] reqwest::Error),
    /// The token exchange responded with a non-success status
    #[error("token exchange responded with status {status}: {body}")]
    ErrorWithBody {
        /// The HTTP status code
        status: u16,
        /// The underlying request error
        source: reqwest::Error,
        /// The body of the error
        body: String,
    },
    /// Unable to read the response
    #[error("error reading token exchange response body")]
    BodyRead(#[source] reqwest::Error),
    /// The response was not JSON or lacked an access token
    #[error("error deserializing token exchange response")]
    TokenBody(#[from] serde_json::Error),
}

/// AWS credentials could not be resolved
#[derive(Debug, Error)]
pub enum CredentialResolutionError {
    /// A required environment variable is not set
    #[error("AWS credentials unavailable: `{0}` is not set")]
    MissingVariable(&'static str),
    /// No provider in the credential chain is configured
    #[error("no AWS credential provider is configured")]
    NoProvider,
    /// A credential provider failed to produce credentials
    #[error("AWS credential provider failed")]
    Provider(#[source] Box<dyn error::Error + Send + Sync + 'static>),
    /// The runtime driving credential resolution could not be started
    #[error("unable to start runtime for credential resolution")]
    Runtime(#[source] std::io::Error),
}

/// An AWS identity proof could not be produced
#[derive(Debug, Error)]
pub enum IdentityProofError {
    /// The request could not be signed
    #[error("unable to sign identity request")]
    Signing(#[source] Box<dyn error::Error + Send + Sync + 'static>),
    /// The signed headers could not be serialized
    #[error("unable to serialize identity proof")]
    Envelope(#[from] serde_json::Error),
}

/// An error while creating a token provider through a factory
#[derive(Debug, Error)]
pub enum TokenProviderError {
    /// The provider could not be configured
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The initial token exchange failed
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    /// AWS credentials were unavailable
    #[error(transparent)]
    CredentialResolution(#[from] CredentialResolutionError),
    /// The AWS identity proof could not be built
    #[error(transparent)]
    IdentityProof(#[from] IdentityProofError),
}
