//! Authentication for Dataspine clients
//!
//! Clients of the Dataspine service authenticate with an access token. This
//! crate obtains that token under one of three trust models and exposes the
//! result through a single capability, [`TokenProvider`], so that consumers
//! never need to know which trust model is in effect:
//!
//! * a static, pre-issued token ([`InMemoryTokenProvider`]),
//! * an OAuth2 token exchange presenting an identity token
//!   ([`ExchangingTokenProvider`]),
//! * an OAuth2 token exchange presenting a SigV4-signed AWS identity proof
//!   ([`AwsTokenProvider`][providers::aws::AwsTokenProvider]).
//!
//! Providers are usually built per tenant through a [`TokenProviderFactory`].
//! Exchanges happen synchronously while the provider is created; a provider
//! that failed to authenticate is never returned.
//!
//! ```no_run
//! use dataspine_tokens::{
//!     factory::{ExchangingTokenProviderFactory, TokenProviderFactory},
//!     AuthenticationStatus, SubjectToken, TokenProvider,
//! };
//!
//! # fn main() -> Result<(), dataspine_tokens::TokenProviderError> {
//! let factory = ExchangingTokenProviderFactory::new(
//!     "https://sts{{application}}.{{region}}.cloud.dataspine.tech",
//!     true,
//!     Some(SubjectToken::from_static("eyJhbGciOi...")),
//! );
//!
//! let provider = factory.create_token_provider("eu-central-1", None, None)?;
//!
//! match provider.authentication_status() {
//!     AuthenticationStatus::Token { last_valid_token, .. } => {
//!         tracing::info!(token = format_args!("{:#?}", last_valid_token), "authenticated");
//!     }
//!     AuthenticationStatus::Unauthorized => tracing::warn!("not authenticated"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! * `aws` (enabled by default): Provides the AWS identity proof, the
//!   [`AwsTokenProvider`][providers::aws::AwsTokenProvider], the matching
//!   factory and credential resolution through the AWS provider chain.
//!   Disabling it drops the AWS SDK dependencies.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
mod error;
pub mod factory;
pub mod providers;
mod status;

pub use braids::*;
pub use error::{
    AuthenticationError, ConfigurationError, CredentialResolutionError, IdentityProofError,
    TokenProviderError,
};
pub use factory::TokenProviderFactory;
pub use providers::{
    exchange::{ExchangingTokenProvider, SubjectTokenType},
    in_memory::InMemoryTokenProvider,
    TokenProvider,
};
pub use status::AuthenticationStatus;
