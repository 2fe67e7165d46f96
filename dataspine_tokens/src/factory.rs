//! Per-tenant construction of token providers
//!
//! A factory captures the configuration of one trust model and produces a
//! ready-to-use [`TokenProvider`] for a given region, data product and
//! application. Factories that exchange tokens do so while creating the
//! provider, so a provider that could not authenticate is never handed out.

use std::time::Duration;

use dataspine_endpoint::interpolate_endpoint_url;
use uuid::Uuid;

#[cfg(feature = "aws")]
use crate::providers::aws::{AwsCredentialsSource, AwsTokenProvider, CredentialsChain};
use crate::{
    providers::{
        exchange::{
            http_client, parse_endpoint, ExchangingTokenProvider, SubjectTokenType,
            DEFAULT_TIMEOUT,
        },
        in_memory::InMemoryTokenProvider,
        TokenProvider,
    },
    AccessToken, SubjectToken, TokenProviderError,
};

/// A constructor of token providers for a specific tenant
pub trait TokenProviderFactory {
    /// The provider produced by this factory
    type Provider: TokenProvider;

    /// Creates a token provider for the given tenant
    fn create_token_provider(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Self::Provider, TokenProviderError>;
}

/// Produces in-memory providers seeded with a static token
#[derive(Clone, Debug, Default)]
pub struct InMemoryTokenProviderFactory {
    initial_token: Option<AccessToken>,
}

impl InMemoryTokenProviderFactory {
    /// Constructs a new factory
    ///
    /// Without an initial token, every provider starts out unauthorized.
    pub const fn new(initial_token: Option<AccessToken>) -> Self {
        Self { initial_token }
    }
}

impl TokenProviderFactory for InMemoryTokenProviderFactory {
    type Provider = InMemoryTokenProvider;

    fn create_token_provider(
        &self,
        _region: &str,
        _data_product_id: Option<Uuid>,
        _application_id: Option<Uuid>,
    ) -> Result<Self::Provider, TokenProviderError> {
        Ok(InMemoryTokenProvider::new(self.initial_token.clone()))
    }
}

/// Produces providers that exchange an OAuth2 identity token for a token
#[derive(Clone, Debug)]
pub struct ExchangingTokenProviderFactory {
    endpoint_template: String,
    verify_tls: bool,
    timeout: Duration,
    initial_token: Option<SubjectToken>,
    span: Option<tracing::Span>,
}

impl ExchangingTokenProviderFactory {
    /// Constructs a new factory
    ///
    /// `initial_token` is exchanged as soon as a provider is created. Without
    /// one, providers start out unauthorized and must be exchanged manually.
    ///
    /// Passing `verify_tls = false` is dangerous and must not be used in
    /// production.
    pub fn new(
        endpoint_template: impl Into<String>,
        verify_tls: bool,
        initial_token: Option<SubjectToken>,
    ) -> Self {
        Self {
            endpoint_template: endpoint_template.into(),
            verify_tls,
            timeout: DEFAULT_TIMEOUT,
            initial_token,
            span: None,
        }
    }

    /// Sets the timeout for token exchange requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the span under which created providers log their exchanges
    ///
    /// Without one, each provider opens its own span.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    /// The token exchange endpoint for the given tenant
    pub fn token_exchange_endpoint(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> String {
        interpolate_endpoint_url(
            &self.endpoint_template,
            region,
            data_product_id,
            application_id,
        )
    }
}

impl TokenProviderFactory for ExchangingTokenProviderFactory {
    type Provider = ExchangingTokenProvider;

    fn create_token_provider(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Self::Provider, TokenProviderError> {
        let endpoint = self.token_exchange_endpoint(region, data_product_id, application_id);
        let url = parse_endpoint(&endpoint)?;
        let client = http_client(self.verify_tls, self.timeout)?;

        let mut provider = ExchangingTokenProvider::new(client, url, SubjectTokenType::IdToken);
        if let Some(span) = &self.span {
            provider = provider.with_span(span.clone());
        }
        let _entered = provider.span().clone().entered();

        match &self.initial_token {
            Some(token) => provider.exchange_token(token)?,
            None => tracing::warn!(
                %endpoint,
                "no initial subject token configured; token must be exchanged manually"
            ),
        }

        Ok(provider)
    }
}

/// Produces providers that exchange an AWS identity proof for a token
///
/// Credentials come from the default AWS provider chain unless another
/// source is set. Requires the `aws` feature.
#[cfg(feature = "aws")]
#[derive(Clone, Debug)]
pub struct AwsExchangingTokenProviderFactory<S = CredentialsChain> {
    endpoint_template: String,
    verify_tls: bool,
    timeout: Duration,
    signing_region: Option<String>,
    credentials: S,
    span: Option<tracing::Span>,
}

#[cfg(feature = "aws")]
impl AwsExchangingTokenProviderFactory<CredentialsChain> {
    /// Constructs a new factory resolving credentials through the default
    /// AWS provider chain
    ///
    /// Passing `verify_tls = false` is dangerous and must not be used in
    /// production.
    pub fn new(endpoint_template: impl Into<String>, verify_tls: bool) -> Self {
        Self {
            endpoint_template: endpoint_template.into(),
            verify_tls,
            timeout: DEFAULT_TIMEOUT,
            signing_region: None,
            credentials: CredentialsChain::default(),
            span: None,
        }
    }
}

#[cfg(feature = "aws")]
impl<S> AwsExchangingTokenProviderFactory<S> {
    /// Sets the source of the AWS credentials used to sign proofs
    pub fn with_credentials_source<T>(self, credentials: T) -> AwsExchangingTokenProviderFactory<T> {
        AwsExchangingTokenProviderFactory {
            endpoint_template: self.endpoint_template,
            verify_tls: self.verify_tls,
            timeout: self.timeout,
            signing_region: self.signing_region,
            credentials,
            span: self.span,
        }
    }

    /// Signs proofs for `region` instead of the tenant's region
    pub fn with_signing_region(mut self, region: impl Into<String>) -> Self {
        self.signing_region = Some(region.into());
        self
    }

    /// Sets the timeout for token exchange requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the span under which created providers log their exchanges
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }
}

#[cfg(feature = "aws")]
impl<S: AwsCredentialsSource> TokenProviderFactory for AwsExchangingTokenProviderFactory<S> {
    type Provider = AwsTokenProvider;

    fn create_token_provider(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Self::Provider, TokenProviderError> {
        let _entered = self.span.as_ref().map(|span| span.enter());
        let credentials = self.credentials.resolve_credentials()?;

        let endpoint = interpolate_endpoint_url(
            &self.endpoint_template,
            region,
            data_product_id,
            application_id,
        );
        let client = http_client(self.verify_tls, self.timeout)?;
        let mut provider = AwsTokenProvider::new(client, &endpoint)?;
        if let Some(span) = &self.span {
            provider = provider.with_span(span.clone());
        }

        let signing_region = self.signing_region.as_deref().unwrap_or(region);
        provider.exchange_token(&credentials, signing_region)?;

        Ok(provider)
    }
}
