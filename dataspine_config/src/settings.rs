//! Raw settings read from the environment

use std::{env, ffi::OsString};

use uuid::Uuid;

use crate::ConfigError;

/// The prefix of every Dataspine environment variable
pub const ENV_PREFIX: &str = "DATASPINE_";

/// Settings as supplied by the environment
///
/// Every setting is optional; defaults are applied by
/// [`ConfigLoader`][crate::ConfigLoader]. Variable names are matched without
/// regard to case and empty values are treated as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// `DATASPINE_REGION`: the region to address, for callers to pass on
    /// when creating token providers
    pub region: Option<String>,
    /// `DATASPINE_ENDPOINT_URL`: template for the ingest, outlet and API endpoints
    pub endpoint_url: Option<String>,
    /// `DATASPINE_TOKEN_EXCHANGE_ENDPOINT`: template for the token exchange endpoint
    pub token_exchange_endpoint: Option<String>,
    /// `DATASPINE_INGEST_ENDPOINT_URL`
    pub ingest_endpoint_url: Option<String>,
    /// `DATASPINE_OUTLET_ENDPOINT_URL`
    pub outlet_endpoint_url: Option<String>,
    /// `DATASPINE_API_ENDPOINT_URL`
    pub api_endpoint_url: Option<String>,
    /// `DATASPINE_CLIENT_NAME`
    pub client_name: Option<String>,
    /// `DATASPINE_APPLICATION_ID`
    pub application_id: Option<Uuid>,
    /// `DATASPINE_AUTH_TOKEN_SOURCE`, e.g. `static:<token>`
    pub auth_token_source: Option<String>,
    /// `DATASPINE_AUTH_TYPE`: `static-token`, `token-exchange` or `aws-token-exchange`
    pub auth_type: Option<String>,
    /// `DATASPINE_VERIFY_TLS`: disabling verification is dangerous and must
    /// not be done in production
    pub verify_tls: Option<bool>,
}

impl Settings {
    /// Reads settings from the process environment
    ///
    /// Variables from a `.env` file in the current directory or its parents
    /// are read first; the process environment takes precedence over them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut vars = Vec::new();

        match dotenvy::dotenv_iter() {
            Ok(iter) => {
                for item in iter {
                    vars.push(item?);
                }
                tracing::debug!(count = vars.len(), "read variables from environment file");
            }
            Err(error) if error.not_found() => {}
            Err(error) => return Err(error.into()),
        }

        vars.extend(prefixed_vars(env::vars_os())?);
        Self::from_vars(vars)
    }

    /// Reads settings from a set of variables
    ///
    /// Later variables override earlier ones.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Self::default();

        for (key, value) in vars {
            let key = key.as_ref().to_ascii_uppercase();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            let value = value.into();
            if value.is_empty() {
                continue;
            }

            match name {
                "REGION" => settings.region = Some(value),
                "ENDPOINT_URL" => settings.endpoint_url = Some(value),
                "TOKEN_EXCHANGE_ENDPOINT" => settings.token_exchange_endpoint = Some(value),
                "INGEST_ENDPOINT_URL" => settings.ingest_endpoint_url = Some(value),
                "OUTLET_ENDPOINT_URL" => settings.outlet_endpoint_url = Some(value),
                "API_ENDPOINT_URL" => settings.api_endpoint_url = Some(value),
                "CLIENT_NAME" => settings.client_name = Some(value),
                "APPLICATION_ID" => {
                    let id = Uuid::parse_str(&value).map_err(|e| ConfigError::InvalidSetting {
                        name: "DATASPINE_APPLICATION_ID",
                        reason: e.to_string(),
                    })?;
                    settings.application_id = Some(id);
                }
                "AUTH_TOKEN_SOURCE" => settings.auth_token_source = Some(value),
                "AUTH_TYPE" => settings.auth_type = Some(value),
                "VERIFY_TLS" => settings.verify_tls = Some(parse_bool("DATASPINE_VERIFY_TLS", &value)?),
                _ => tracing::trace!(variable = %key, "ignoring unrecognized variable"),
            }
        }

        Ok(settings)
    }
}

/// Keeps the Dataspine variables of an OS environment
///
/// Unrelated variables are skipped whatever their encoding.
fn prefixed_vars<I>(vars: I) -> Result<Vec<(String, String)>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut prefixed = Vec::new();

    for (key, value) in vars {
        let Some(key) = key.to_str() else {
            continue;
        };
        if !key.to_ascii_uppercase().starts_with(ENV_PREFIX) {
            continue;
        }

        let value = value
            .into_string()
            .map_err(|_| ConfigError::NonUnicodeSetting(key.to_owned()))?;
        prefixed.push((key.to_owned(), value));
    }

    Ok(prefixed)
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSetting {
            name,
            reason: format!("`{}` is not a boolean", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_prefixed_variables() {
        let settings = Settings::from_vars([
            ("DATASPINE_REGION", "eu-central-1"),
            ("dataspine_client_name", "ingestor"),
            ("DATASPINE_APPLICATION_ID", "67e55044-10b1-426f-9247-bb680e5fe0c8"),
            ("DATASPINE_AUTH_TYPE", "token-exchange"),
            ("DATASPINE_VERIFY_TLS", "False"),
            ("HOME", "/root"),
        ])
        .unwrap();

        assert_eq!(settings.region.as_deref(), Some("eu-central-1"));
        assert_eq!(settings.client_name.as_deref(), Some("ingestor"));
        assert_eq!(
            settings.application_id,
            Some(Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8))
        );
        assert_eq!(settings.auth_type.as_deref(), Some("token-exchange"));
        assert_eq!(settings.verify_tls, Some(false));
    }

    #[test]
    fn empty_values_are_unset() {
        let settings = Settings::from_vars([("DATASPINE_REGION", "")]).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn later_variables_take_precedence() {
        let settings = Settings::from_vars([
            ("DATASPINE_REGION", "from-file"),
            ("DATASPINE_REGION", "from-env"),
        ])
        .unwrap();

        assert_eq!(settings.region.as_deref(), Some("from-env"));
    }

    #[test]
    fn rejects_malformed_application_ids() {
        let error = Settings::from_vars([("DATASPINE_APPLICATION_ID", "not-a-uuid")]).unwrap_err();

        assert!(matches!(
            error,
            ConfigError::InvalidSetting {
                name: "DATASPINE_APPLICATION_ID",
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_booleans() {
        let error = Settings::from_vars([("DATASPINE_VERIFY_TLS", "maybe")]).unwrap_err();

        assert!(matches!(error, ConfigError::InvalidSetting { .. }));
    }

    #[cfg(unix)]
    mod os_vars {
        use std::os::unix::ffi::OsStringExt;

        use super::*;

        fn os(bytes: &[u8]) -> OsString {
            OsString::from_vec(bytes.to_vec())
        }

        #[test]
        fn unrelated_non_unicode_variables_are_skipped() {
            let vars = prefixed_vars([
                (os(b"UNRELATED"), os(b"f\xffo")),
                (os(b"UNRELATED_\xff"), os(b"value")),
                (os(b"DATASPINE_REGION"), os(b"eu-central-1")),
            ])
            .unwrap();

            let settings = Settings::from_vars(vars).unwrap();

            assert_eq!(settings.region.as_deref(), Some("eu-central-1"));
        }

        #[test]
        fn non_unicode_dataspine_values_are_rejected() {
            let error = prefixed_vars([(os(b"DATASPINE_REGION"), os(b"eu-\xff"))]).unwrap_err();

            assert!(matches!(
                error,
                ConfigError::NonUnicodeSetting(ref name) if name == "DATASPINE_REGION"
            ));
        }
    }
}
