//! A token provider that obtains its token from an OAuth2 token exchange
//!
//! The exchange follows RFC 8693: a subject token proving the caller's
//! identity is posted to `{endpoint}/token` and swapped for a Dataspine
//! access token.

use std::{error, time::Duration};

use reqwest::{blocking::Client, Url};
use serde::{Serialize, Serializer};

use super::TokenProvider;
use crate::{
    AccessToken, AuthenticationError, AuthenticationStatus, ConfigurationError, SubjectTokenRef,
};

mod dto;

/// The OAuth2 grant type for token exchanges
pub const GRANT_TYPE_TOKEN_EXCHANGE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// The default timeout applied to token exchange requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The kind of subject token presented to the token exchange
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubjectTokenType {
    /// An OpenID Connect ID token
    #[default]
    IdToken,
    /// A SigV4-signed AWS `GetCallerIdentity` request
    AwsIamRoleSigV4,
}

impl SubjectTokenType {
    /// The URN identifying the subject token type
    pub const fn as_urn(self) -> &'static str {
        match self {
            Self::IdToken => "urn:ietf:params:oauth:token-type:id_token",
            Self::AwsIamRoleSigV4 => {
                "urn:dataspine:params:oauth:grant-type:aws-iam-role-sigv4-token-exchange"
            }
        }
    }
}

impl Serialize for SubjectTokenType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_urn())
    }
}

/// Constructs a blocking HTTP client for talking to the token exchange
///
/// Passing `verify_tls = false` disables certificate verification. This is
/// dangerous and must not be used in production.
pub fn http_client(verify_tls: bool, timeout: Duration) -> Result<Client, ConfigurationError> {
    if !verify_tls {
        tracing::warn!("TLS certificate verification is disabled; do not use in production");
    }

    Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .timeout(timeout)
        .build()
        .map_err(ConfigurationError::HttpClient)
}

/// A token provider backed by an OAuth2 token exchange
///
/// The provider is `Unauthorized` until [`exchange_token`][Self::exchange_token]
/// succeeds. A failed exchange leaves any previously obtained token in place.
#[derive(Debug)]
pub struct ExchangingTokenProvider {
    client: Client,
    endpoint: Url,
    token_url: Url,
    subject_token_type: SubjectTokenType,
    status: AuthenticationStatus,
    span: tracing::Span,
}

impl ExchangingTokenProvider {
    /// Constructs a new exchanging token provider for the given endpoint
    pub fn new(client: Client, endpoint: Url, subject_token_type: SubjectTokenType) -> Self {
        let token_url = token_url(&endpoint);
        let span = tracing::info_span!(
            "token_exchange",
            endpoint = %endpoint,
            subject_token_type = subject_token_type.as_urn(),
        );

        Self {
            client,
            endpoint,
            token_url,
            subject_token_type,
            status: AuthenticationStatus::Unauthorized,
            span,
        }
    }

    /// Sets the span under which exchanges are logged
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// The span under which exchanges are logged
    #[inline]
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// The token exchange endpoint
    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The URL that exchange requests are posted to
    #[inline]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// The type of subject token this provider presents
    #[inline]
    pub fn subject_token_type(&self) -> SubjectTokenType {
        self.subject_token_type
    }

    /// Exchanges `subject_token` for a Dataspine access token
    ///
    /// Performs exactly one request. On failure the error is logged and
    /// returned, and the current status is left untouched.
    pub fn exchange_token(
        &mut self,
        subject_token: &SubjectTokenRef,
    ) -> Result<(), AuthenticationError> {
        let _entered = self.span.enter();

        let token = request_token(
            &self.client,
            self.token_url.clone(),
            subject_token,
            self.subject_token_type,
        )
        .map_err(|error| {
            tracing::error!(
                error = (&error as &dyn error::Error),
                "error exchanging token"
            );
            error
        })?;

        self.status = AuthenticationStatus::token(token, true);
        Ok(())
    }
}

impl TokenProvider for ExchangingTokenProvider {
    fn authentication_status(&self) -> AuthenticationStatus {
        self.status.clone()
    }
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    Url::parse(endpoint).map_err(|source| ConfigurationError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })
}

fn token_url(endpoint: &Url) -> Url {
    let mut token_url = endpoint.clone();
    if let Ok(mut segments) = token_url.path_segments_mut() {
        segments.pop_if_empty().push("token");
    }
    token_url
}

fn maybe_value<'a, T: tracing::Value + 'a>(v: &'a Option<T>) -> &'a dyn tracing::Value {
    if let Some(v) = v {
        v
    } else {
        &tracing::field::Empty
    }
}

#[tracing::instrument(
    skip_all,
    fields(
        token_url = %token_url,
        subject_token_type = subject_token_type.as_urn(),
    ),
)]
fn request_token(
    client: &Client,
    token_url: Url,
    subject_token: &SubjectTokenRef,
    subject_token_type: SubjectTokenType,
) -> Result<AccessToken, AuthenticationError> {
    tracing::trace!("requesting token from token exchange");

    let params = dto::TokenExchangeRequest {
        subject_token,
        grant_type: GRANT_TYPE_TOKEN_EXCHANGE,
        subject_token_type,
    };

    let resp = client
        .post(token_url)
        .query(&params)
        .send()
        .map_err(AuthenticationError::RequestSend)?;

    tracing::debug!(
        response.status = resp.status().as_u16(),
        "received token exchange response"
    );

    if let Err(error) = resp.error_for_status_ref() {
        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_else(|read_error| {
            tracing::warn!(
                error = (&read_error as &dyn error::Error),
                "unable to read token exchange error body"
            );
            String::new()
        });
        return Err(AuthenticationError::ErrorWithBody {
            status,
            source: error,
            body,
        });
    }

    let body = resp.bytes().map_err(AuthenticationError::BodyRead)?;
    let resp: dto::TokenExchangeResponse = serde_json::from_slice(&body)?;

    tracing::info!(
        issued_token_type = maybe_value(&resp.issued_token_type.as_deref()),
        token_type = maybe_value(&resp.token_type.as_deref()),
        expires_in = maybe_value(&resp.expires_in),
        "received new access token"
    );

    Ok(resp.access_token)
}
