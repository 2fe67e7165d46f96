//! Sources of AWS credentials

use std::{env, future::Future, path::PathBuf};

use aws_config::{
    profile::{
        profile_file::{ProfileFileKind, ProfileFiles},
        ProfileFileCredentialsProvider,
    },
    BehaviorVersion, Region,
};
use aws_credential_types::{
    provider::{error::CredentialsError, ProvideCredentials},
    Credentials,
};

use crate::CredentialResolutionError;

const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// A source of AWS credentials
pub trait AwsCredentialsSource {
    /// Resolves the credentials to sign with
    fn resolve_credentials(&self) -> Result<Credentials, CredentialResolutionError>;
}

impl AwsCredentialsSource for Credentials {
    fn resolve_credentials(&self) -> Result<Credentials, CredentialResolutionError> {
        Ok(self.clone())
    }
}

/// Credentials read from the standard AWS environment variables
///
/// `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` are required;
/// `AWS_SESSION_TOKEN` is used when present. Empty values count as unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvironmentCredentials;

impl EnvironmentCredentials {
    fn resolve_with<F>(lookup: F) -> Result<Credentials, CredentialResolutionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let access_key_id =
            var(ACCESS_KEY_ID).ok_or(CredentialResolutionError::MissingVariable(ACCESS_KEY_ID))?;
        let secret_access_key = var(SECRET_ACCESS_KEY)
            .ok_or(CredentialResolutionError::MissingVariable(SECRET_ACCESS_KEY))?;
        let session_token = var(SESSION_TOKEN);

        tracing::debug!(
            has_session_token = session_token.is_some(),
            "resolved AWS credentials from environment"
        );

        Ok(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            "Environment",
        ))
    }
}

impl AwsCredentialsSource for EnvironmentCredentials {
    fn resolve_credentials(&self) -> Result<Credentials, CredentialResolutionError> {
        Self::resolve_with(|name| env::var(name).ok())
    }
}

/// Credentials resolved through the default AWS provider chain
///
/// The chain consults the environment, shared profiles, web identity tokens,
/// container credentials and the EC2 instance metadata service, in that
/// order.
///
/// Resolution blocks the current thread on a private runtime, so it must not
/// be attempted from within an async runtime.
#[derive(Clone, Debug, Default)]
pub struct CredentialsChain {
    profile_name: Option<String>,
    region: Option<String>,
}

impl CredentialsChain {
    /// Constructs a chain with the default lookup order
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a shared profile instead of `AWS_PROFILE` or `default`
    pub fn with_profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Fixes the region used by providers that call AWS, such as STS for
    /// web identity tokens
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl AwsCredentialsSource for CredentialsChain {
    fn resolve_credentials(&self) -> Result<Credentials, CredentialResolutionError> {
        block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(profile_name) = &self.profile_name {
                loader = loader.profile_name(profile_name.as_str());
            }
            if let Some(region) = &self.region {
                loader = loader.region(Region::new(region.clone()));
            }

            let config = loader.load().await;
            let provider = config
                .credentials_provider()
                .ok_or(CredentialResolutionError::NoProvider)?;

            let credentials = provider
                .provide_credentials()
                .await
                .map_err(provider_error)?;

            tracing::debug!(
                has_session_token = credentials.session_token().is_some(),
                "resolved AWS credentials from provider chain"
            );
            Ok::<_, CredentialResolutionError>(credentials)
        })
    }
}

/// Credentials read from a single shared profile
///
/// Reads the standard shared config and credentials files unless a specific
/// credentials file is given.
#[derive(Clone, Debug)]
pub struct ProfileCredentials {
    profile_name: String,
    credentials_file: Option<PathBuf>,
}

impl ProfileCredentials {
    /// Reads the named profile
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            credentials_file: None,
        }
    }

    /// Reads profiles from `path` only
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }
}

impl AwsCredentialsSource for ProfileCredentials {
    fn resolve_credentials(&self) -> Result<Credentials, CredentialResolutionError> {
        block_on(async {
            let mut builder =
                ProfileFileCredentialsProvider::builder().profile_name(self.profile_name.as_str());
            if let Some(path) = &self.credentials_file {
                builder = builder.profile_files(
                    ProfileFiles::builder()
                        .with_file(ProfileFileKind::Credentials, path.clone())
                        .build(),
                );
            }

            builder
                .build()
                .provide_credentials()
                .await
                .map_err(provider_error)
        })
    }
}

fn provider_error(error: CredentialsError) -> CredentialResolutionError {
    CredentialResolutionError::Provider(Box::new(error))
}

fn block_on<F>(future: F) -> Result<Credentials, CredentialResolutionError>
where
    F: Future<Output = Result<Credentials, CredentialResolutionError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CredentialResolutionError::Runtime)?;

    runtime.block_on(future)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use color_eyre::Result;

    use super::*;

    fn lookup<'a>(
        vars: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| (*v).to_owned())
    }

    #[test]
    fn resolves_keys_and_session_token() {
        let vars = HashMap::from([
            (ACCESS_KEY_ID, "AKIDEXAMPLE"),
            (SECRET_ACCESS_KEY, "secret"),
            (SESSION_TOKEN, "session"),
        ]);

        let credentials = EnvironmentCredentials::resolve_with(lookup(&vars)).unwrap();

        assert_eq!(credentials.access_key_id(), "AKIDEXAMPLE");
        assert_eq!(credentials.secret_access_key(), "secret");
        assert_eq!(credentials.session_token(), Some("session"));
    }

    #[test]
    fn session_token_is_optional() {
        let vars = HashMap::from([(ACCESS_KEY_ID, "AKIDEXAMPLE"), (SECRET_ACCESS_KEY, "secret")]);

        let credentials = EnvironmentCredentials::resolve_with(lookup(&vars)).unwrap();

        assert_eq!(credentials.session_token(), None);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let vars = HashMap::from([(ACCESS_KEY_ID, "AKIDEXAMPLE"), (SECRET_ACCESS_KEY, "")]);

        let error = EnvironmentCredentials::resolve_with(lookup(&vars)).unwrap_err();

        assert!(matches!(
            error,
            CredentialResolutionError::MissingVariable(SECRET_ACCESS_KEY)
        ));
    }

    fn credentials_file(contents: &str) -> Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn resolves_keys_from_a_shared_profile() -> Result<()> {
        let file = credentials_file(
            "[default]\n\
             aws_access_key_id = AKIDDEFAULT\n\
             aws_secret_access_key = default-secret\n\
             \n\
             [dataspine]\n\
             aws_access_key_id = AKIDPROFILE\n\
             aws_secret_access_key = profile-secret\n\
             aws_session_token = profile-session\n",
        )?;

        let credentials = ProfileCredentials::new("dataspine")
            .with_credentials_file(file.path())
            .resolve_credentials()?;

        assert_eq!(credentials.access_key_id(), "AKIDPROFILE");
        assert_eq!(credentials.secret_access_key(), "profile-secret");
        assert_eq!(credentials.session_token(), Some("profile-session"));
        Ok(())
    }

    #[test]
    fn unknown_profiles_are_a_provider_error() -> Result<()> {
        let file = credentials_file(
            "[default]\n\
             aws_access_key_id = AKIDDEFAULT\n\
             aws_secret_access_key = default-secret\n",
        )?;

        let error = ProfileCredentials::new("missing")
            .with_credentials_file(file.path())
            .resolve_credentials()
            .unwrap_err();

        assert!(matches!(error, CredentialResolutionError::Provider(_)));
        Ok(())
    }
}
