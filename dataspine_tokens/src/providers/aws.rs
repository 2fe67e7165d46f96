//! Token exchange using an AWS IAM identity as proof
//!
//! Requires the `aws` feature.

use aws_credential_types::Credentials;
use reqwest::blocking::Client;

use super::{
    exchange::{parse_endpoint, ExchangingTokenProvider, SubjectTokenType},
    TokenProvider,
};
use crate::{AuthenticationStatus, ConfigurationError, TokenProviderError};

mod credentials;
mod proof;

pub use credentials::{
    AwsCredentialsSource, CredentialsChain, EnvironmentCredentials, ProfileCredentials,
};
pub use proof::{
    build_identity_proof, build_identity_proof_at, DATASPINE_STS_HEADER,
    GET_CALLER_IDENTITY_BODY, STS_URL,
};

/// A token provider that exchanges a SigV4 identity proof for a token
#[derive(Debug)]
pub struct AwsTokenProvider {
    endpoint: String,
    exchanging: ExchangingTokenProvider,
}

impl AwsTokenProvider {
    /// Constructs a new provider for the given token exchange endpoint
    ///
    /// The endpoint is embedded in every proof exactly as given.
    pub fn new(client: Client, token_exchange_endpoint: &str) -> Result<Self, ConfigurationError> {
        let url = parse_endpoint(token_exchange_endpoint)?;

        Ok(Self {
            endpoint: token_exchange_endpoint.to_owned(),
            exchanging: ExchangingTokenProvider::new(
                client,
                url,
                SubjectTokenType::AwsIamRoleSigV4,
            ),
        })
    }

    /// Sets the span under which exchanges are logged
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.exchanging = self.exchanging.with_span(span);
        self
    }

    /// The span under which exchanges are logged
    #[inline]
    pub fn span(&self) -> &tracing::Span {
        self.exchanging.span()
    }

    /// The token exchange endpoint the proofs are bound to
    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Proves the identity behind `credentials` and exchanges it for a token
    ///
    /// The proof is signed for `aws_region`.
    pub fn exchange_token(
        &mut self,
        credentials: &Credentials,
        aws_region: &str,
    ) -> Result<(), TokenProviderError> {
        let proof = build_identity_proof(&self.endpoint, credentials, aws_region)?;
        self.exchanging.exchange_token(&proof)?;
        Ok(())
    }

    /// Resolves credentials from `source` and exchanges them for a token
    ///
    /// Credentials are resolved before any request is made.
    pub fn exchange_token_from_env<S>(
        &mut self,
        source: &S,
        aws_region: &str,
    ) -> Result<(), TokenProviderError>
    where
        S: AwsCredentialsSource + ?Sized,
    {
        let credentials = source.resolve_credentials()?;
        self.exchange_token(&credentials, aws_region)
    }
}

impl TokenProvider for AwsTokenProvider {
    fn authentication_status(&self) -> AuthenticationStatus {
        self.exchanging.authentication_status()
    }
}
