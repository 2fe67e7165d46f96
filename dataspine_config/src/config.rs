use dataspine_endpoint::interpolate_endpoint_url;
#[cfg(feature = "aws")]
use dataspine_tokens::factory::AwsExchangingTokenProviderFactory;
use dataspine_tokens::{
    factory::{ExchangingTokenProviderFactory, InMemoryTokenProviderFactory},
    TokenProvider, TokenProviderError, TokenProviderFactory,
};
use uuid::Uuid;

use crate::BehaviorVersion;

/// A token provider of whichever trust model was configured
pub type BoxedTokenProvider = Box<dyn TokenProvider + Send + Sync>;

/// The endpoint of one Dataspine service
///
/// The template has its component already fixed; the region, data product
/// and application remain to be filled in per tenant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    endpoint_url: String,
}

impl EndpointConfig {
    pub(crate) fn new(endpoint_url: String) -> Self {
        Self { endpoint_url }
    }

    /// The endpoint template
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Builds the concrete endpoint for a tenant
    pub fn build_endpoint_url(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> String {
        interpolate_endpoint_url(&self.endpoint_url, region, data_product_id, application_id)
    }
}

/// The token provider factory selected by the configured auth type
#[derive(Clone, Debug)]
pub enum ConfiguredTokenProviderFactory {
    /// Static tokens, or no authentication at all
    InMemory(InMemoryTokenProviderFactory),
    /// OAuth2 token exchange of an identity token
    Exchanging(ExchangingTokenProviderFactory),
    /// OAuth2 token exchange of an AWS identity proof
    #[cfg(feature = "aws")]
    AwsExchanging(AwsExchangingTokenProviderFactory),
}

impl TokenProviderFactory for ConfiguredTokenProviderFactory {
    type Provider = BoxedTokenProvider;

    fn create_token_provider(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
        application_id: Option<Uuid>,
    ) -> Result<Self::Provider, TokenProviderError> {
        Ok(match self {
            Self::InMemory(factory) => Box::new(factory.create_token_provider(
                region,
                data_product_id,
                application_id,
            )?),
            Self::Exchanging(factory) => Box::new(factory.create_token_provider(
                region,
                data_product_id,
                application_id,
            )?),
            #[cfg(feature = "aws")]
            Self::AwsExchanging(factory) => Box::new(factory.create_token_provider(
                region,
                data_product_id,
                application_id,
            )?),
        })
    }
}

/// Resolved configuration of a Dataspine client
///
/// Built by [`ConfigLoader::build`][crate::ConfigLoader::build].
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) behavior_version: BehaviorVersion,
    pub(crate) client_name: Option<String>,
    pub(crate) application_id: Option<Uuid>,
    pub(crate) ingest: EndpointConfig,
    pub(crate) outlet: EndpointConfig,
    pub(crate) api: EndpointConfig,
    pub(crate) token_provider_factory: ConfiguredTokenProviderFactory,
}

impl Config {
    /// The behavior version the client adheres to
    pub fn behavior_version(&self) -> BehaviorVersion {
        self.behavior_version
    }

    /// The name the client identifies itself by
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// The application the client acts on behalf of
    pub fn application_id(&self) -> Option<Uuid> {
        self.application_id
    }

    /// The ingest service endpoint
    pub fn ingest(&self) -> &EndpointConfig {
        &self.ingest
    }

    /// The outlet service endpoint
    pub fn outlet(&self) -> &EndpointConfig {
        &self.outlet
    }

    /// The API service endpoint
    pub fn api(&self) -> &EndpointConfig {
        &self.api
    }

    /// The factory producing token providers
    pub fn token_provider_factory(&self) -> &ConfiguredTokenProviderFactory {
        &self.token_provider_factory
    }

    /// Creates a token provider for a data product in a region
    ///
    /// The provider is scoped to the configured application. Exchanging
    /// providers authenticate before they are returned.
    pub fn create_token_provider(
        &self,
        region: &str,
        data_product_id: Option<Uuid>,
    ) -> Result<BoxedTokenProvider, TokenProviderError> {
        self.token_provider_factory
            .create_token_provider(region, data_product_id, self.application_id)
    }
}
