//! Assembly of a [`Config`] from settings and explicit overrides

use dataspine_endpoint::{interpolate_component, Component, DEFAULT_ENDPOINT_URL};
#[cfg(feature = "aws")]
use dataspine_tokens::factory::AwsExchangingTokenProviderFactory;
use dataspine_tokens::{
    factory::{ExchangingTokenProviderFactory, InMemoryTokenProviderFactory},
    AccessToken, SubjectToken,
};
use uuid::Uuid;

use crate::{
    auth::parse_static_token,
    config::{ConfiguredTokenProviderFactory, EndpointConfig},
    AuthType, BehaviorVersion, Config, ConfigError, Settings,
};

/// Collects client configuration and builds a [`Config`]
///
/// Every endpoint defaults to the public Dataspine endpoint template. Values
/// from the environment are applied by [`load`][Self::load]; the `with_*`
/// setters override them afterwards.
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    behavior_version: BehaviorVersion,
    client_name: Option<String>,
    application_id: Option<Uuid>,
    ingest_endpoint_url: String,
    outlet_endpoint_url: String,
    api_endpoint_url: String,
    token_exchange_endpoint_url: String,
    verify_tls: bool,
    auth_token: Option<String>,
    auth_type: Option<AuthType>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(BehaviorVersion::latest())
    }
}

impl ConfigLoader {
    /// Constructs a loader with default settings
    pub fn new(behavior_version: BehaviorVersion) -> Self {
        Self {
            behavior_version,
            client_name: None,
            application_id: None,
            ingest_endpoint_url: DEFAULT_ENDPOINT_URL.to_owned(),
            outlet_endpoint_url: DEFAULT_ENDPOINT_URL.to_owned(),
            api_endpoint_url: DEFAULT_ENDPOINT_URL.to_owned(),
            token_exchange_endpoint_url: DEFAULT_ENDPOINT_URL.to_owned(),
            verify_tls: true,
            auth_token: None,
            auth_type: None,
        }
    }

    /// Constructs a loader from the process environment
    ///
    /// See [`Settings::from_env`].
    pub fn load(behavior_version: BehaviorVersion) -> Result<Self, ConfigError> {
        Self::from_settings(behavior_version, Settings::from_env()?)
    }

    /// Constructs a loader from previously read settings
    ///
    /// A general endpoint URL applies to the ingest, outlet and API services.
    /// Service-specific URLs take precedence over it.
    pub fn from_settings(
        behavior_version: BehaviorVersion,
        settings: Settings,
    ) -> Result<Self, ConfigError> {
        let mut loader = Self::new(behavior_version);

        if let Some(endpoint_url) = settings.endpoint_url {
            loader = loader.with_endpoint_url(endpoint_url);
        }
        if let Some(url) = settings.ingest_endpoint_url {
            loader.ingest_endpoint_url = url;
        }
        if let Some(url) = settings.outlet_endpoint_url {
            loader.outlet_endpoint_url = url;
        }
        if let Some(url) = settings.api_endpoint_url {
            loader.api_endpoint_url = url;
        }
        if let Some(url) = settings.token_exchange_endpoint {
            loader.token_exchange_endpoint_url = url;
        }
        if let Some(auth_type) = settings.auth_type {
            loader.auth_type = Some(auth_type.parse()?);
        }

        loader.client_name = settings.client_name;
        loader.application_id = settings.application_id;
        loader.auth_token = settings.auth_token_source;
        loader.verify_tls = settings.verify_tls.unwrap_or(true);

        Ok(loader)
    }

    /// Sets the endpoint template of the ingest, outlet and API services
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        let endpoint_url = endpoint_url.into();
        self.ingest_endpoint_url = endpoint_url.clone();
        self.outlet_endpoint_url = endpoint_url.clone();
        self.api_endpoint_url = endpoint_url;
        self
    }

    /// Sets the endpoint template of the ingest service
    pub fn with_ingest_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.ingest_endpoint_url = endpoint_url.into();
        self
    }

    /// Sets the endpoint template of the outlet service
    pub fn with_outlet_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.outlet_endpoint_url = endpoint_url.into();
        self
    }

    /// Sets the endpoint template of the API service
    pub fn with_api_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.api_endpoint_url = endpoint_url.into();
        self
    }

    /// Sets the endpoint template of the token exchange
    pub fn with_token_exchange_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.token_exchange_endpoint_url = endpoint_url.into();
        self
    }

    /// Enables or disables TLS certificate verification
    ///
    /// Disabling verification is dangerous and must not be done in production.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Sets the auth token source, e.g. `static:<token>`
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Sets the trust model used to authenticate
    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = Some(auth_type);
        self
    }

    /// Sets the name the client identifies itself by
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    /// Sets the application the client acts on behalf of
    pub fn with_application_id(mut self, application_id: Uuid) -> Self {
        self.application_id = Some(application_id);
        self
    }

    /// Builds the configuration
    ///
    /// Each endpoint template has its component fixed. No requests are made;
    /// tokens are exchanged when providers are created from the result.
    pub fn build(&self) -> Result<Config, ConfigError> {
        let token_exchange_endpoint =
            interpolate_component(&self.token_exchange_endpoint_url, Component::TokenExchange);

        let token_provider_factory = match self.auth_type {
            None => ConfiguredTokenProviderFactory::InMemory(InMemoryTokenProviderFactory::new(None)),
            Some(AuthType::StaticToken) => {
                let token = self
                    .static_token()?
                    .ok_or(ConfigError::MissingAuthToken(AuthType::StaticToken))?;

                ConfiguredTokenProviderFactory::InMemory(InMemoryTokenProviderFactory::new(Some(
                    AccessToken::new(token.to_owned()),
                )))
            }
            Some(AuthType::TokenExchange) => {
                let token = self.static_token()?;
                if token.is_none() {
                    tracing::warn!(
                        "no auth token configured for token exchange; tokens must be exchanged manually"
                    );
                }

                ConfiguredTokenProviderFactory::Exchanging(ExchangingTokenProviderFactory::new(
                    token_exchange_endpoint,
                    self.verify_tls,
                    token.map(|t| SubjectToken::new(t.to_owned())),
                ))
            }
            #[cfg(feature = "aws")]
            Some(AuthType::AwsTokenExchange) => ConfiguredTokenProviderFactory::AwsExchanging(
                AwsExchangingTokenProviderFactory::new(token_exchange_endpoint, self.verify_tls),
            ),
            #[cfg(not(feature = "aws"))]
            Some(auth_type @ AuthType::AwsTokenExchange) => {
                return Err(ConfigError::UnsupportedAuthType(auth_type))
            }
        };

        if !self.verify_tls {
            tracing::warn!("TLS certificate verification is disabled");
        }

        tracing::debug!(
            behavior_version = %self.behavior_version,
            auth_type = self.auth_type.map(AuthType::as_str),
            "built client configuration"
        );

        Ok(Config {
            behavior_version: self.behavior_version,
            client_name: self.client_name.clone(),
            application_id: self.application_id,
            ingest: EndpointConfig::new(interpolate_component(
                &self.ingest_endpoint_url,
                Component::Ingest,
            )),
            outlet: EndpointConfig::new(interpolate_component(
                &self.outlet_endpoint_url,
                Component::Outlet,
            )),
            api: EndpointConfig::new(interpolate_component(&self.api_endpoint_url, Component::Api)),
            token_provider_factory,
        })
    }

    fn static_token(&self) -> Result<Option<&str>, ConfigError> {
        self.auth_token
            .as_deref()
            .map(parse_static_token)
            .transpose()
            .map(Option::flatten)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use dataspine_tokens::{AuthenticationStatus, TokenProvider};
    use mockito::{Matcher, Server};

    use super::*;

    const APPLICATION: Uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
    const DATA_PRODUCT: Uuid = Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8);

    #[test]
    fn defaults_target_public_endpoints() -> Result<()> {
        let config = ConfigLoader::default().build()?;

        assert_eq!(config.behavior_version(), BehaviorVersion::latest());
        assert_eq!(
            config.ingest().build_endpoint_url("eu-central-1", None, None),
            "https://ing.eu-central-1.cloud.dataspine.tech"
        );
        assert_eq!(
            config
                .outlet()
                .build_endpoint_url("eu-central-1", Some(DATA_PRODUCT), None),
            "https://out-m7svaraqwfbg7eshxnua4x7aza.eu-central-1.cloud.dataspine.tech"
        );
        assert_eq!(
            config
                .api()
                .build_endpoint_url("us-east-1", None, Some(APPLICATION)),
            "https://api-aaisem2ekvthpcezvk54zxpo74.us-east-1.cloud.dataspine.tech"
        );
        Ok(())
    }

    #[test]
    fn without_auth_type_providers_are_unauthorized() -> Result<()> {
        let config = ConfigLoader::default().build()?;

        let provider = config.create_token_provider("eu-central-1", None)?;

        assert!(matches!(
            provider.authentication_status(),
            AuthenticationStatus::Unauthorized
        ));
        Ok(())
    }

    #[test]
    fn general_endpoint_does_not_override_token_exchange() -> Result<()> {
        let settings = Settings {
            endpoint_url: Some("https://{{component}}.{{region}}.example.com".into()),
            api_endpoint_url: Some("https://api.{{region}}.example.org".into()),
            ..Settings::default()
        };

        let loader = ConfigLoader::from_settings(BehaviorVersion::latest(), settings)?;
        let config = loader.build()?;

        assert_eq!(config.ingest().endpoint_url(), "https://ing.{{region}}.example.com");
        assert_eq!(config.outlet().endpoint_url(), "https://out.{{region}}.example.com");
        assert_eq!(config.api().endpoint_url(), "https://api.{{region}}.example.org");
        assert_eq!(loader.token_exchange_endpoint_url, DEFAULT_ENDPOINT_URL);
        Ok(())
    }

    #[test]
    fn settings_populate_the_loader() -> Result<()> {
        let settings = Settings::from_vars([
            ("DATASPINE_CLIENT_NAME", "ingestor"),
            ("DATASPINE_APPLICATION_ID", "00112233-4455-6677-8899-aabbccddeeff"),
            ("DATASPINE_AUTH_TYPE", "static-token"),
            ("DATASPINE_AUTH_TOKEN_SOURCE", "static:abc"),
        ])?;

        let config = ConfigLoader::from_settings(BehaviorVersion::latest(), settings)?.build()?;

        assert_eq!(config.client_name(), Some("ingestor"));
        assert_eq!(config.application_id(), Some(APPLICATION));
        let provider = config.create_token_provider("eu-central-1", None)?;
        let status = provider.authentication_status();
        assert_eq!(status.access_token().map(|t| t.as_str()), Some("abc"));
        Ok(())
    }

    #[test]
    fn tls_verification_defaults_to_enabled() -> Result<()> {
        let loader = ConfigLoader::from_settings(BehaviorVersion::latest(), Settings::default())?;

        assert!(loader.verify_tls);
        Ok(())
    }

    #[test]
    fn unknown_auth_types_are_rejected() {
        let settings = Settings {
            auth_type: Some("kerberos".into()),
            ..Settings::default()
        };

        let result = ConfigLoader::from_settings(BehaviorVersion::latest(), settings);

        assert!(matches!(result, Err(ConfigError::UnknownAuthType(_))));
    }

    #[test]
    fn static_token_auth_requires_a_token() {
        let result = ConfigLoader::default()
            .with_auth_type(AuthType::StaticToken)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingAuthToken(AuthType::StaticToken))
        ));
    }

    #[test]
    fn non_static_token_sources_are_rejected() {
        let result = ConfigLoader::default()
            .with_auth_type(AuthType::TokenExchange)
            .with_auth_token("file:/run/secrets/token")
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedAuthTokenFormat)
        ));
    }

    #[test]
    fn token_exchange_happens_when_providers_are_created() -> Result<()> {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/sts-m7svaraqwfbg7eshxnua4x7aza/token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("subject_token".into(), "id-token".into()),
                Matcher::UrlEncoded(
                    "grant_type".into(),
                    "urn:ietf:params:oauth:grant-type:token-exchange".into(),
                ),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"exchanged"}"#)
            .create();

        let config = ConfigLoader::default()
            .with_token_exchange_endpoint_url(format!(
                "{}/{{{{component}}}}{{{{data_product_id}}}}",
                server.url()
            ))
            .with_auth_type(AuthType::TokenExchange)
            .with_auth_token("static:id-token")
            .build()?;

        assert!(!mock.matched());
        let provider = config.create_token_provider("eu-central-1", Some(DATA_PRODUCT))?;

        mock.assert();
        let status = provider.authentication_status();
        assert_eq!(status.access_token().map(|t| t.as_str()), Some("exchanged"));
        Ok(())
    }

    #[cfg(feature = "aws")]
    #[test]
    fn aws_token_exchange_defers_credential_resolution() -> Result<()> {
        let config = ConfigLoader::default()
            .with_auth_type(AuthType::AwsTokenExchange)
            .build()?;

        assert!(matches!(
            config.token_provider_factory(),
            ConfiguredTokenProviderFactory::AwsExchanging(_)
        ));
        Ok(())
    }
}
