//! Configuration for Dataspine clients
//!
//! A [`ConfigLoader`] collects the endpoints, client identity and trust model
//! of a client, either from `DATASPINE_*` environment variables or through
//! explicit setters, and builds a [`Config`]. The config hands out token
//! providers per data product and region.
//!
//! ```no_run
//! use dataspine_config::{BehaviorVersion, ConfigLoader};
//! use dataspine_tokens::TokenProvider;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(BehaviorVersion::latest())?
//!     .with_client_name("ingestor")
//!     .build()?;
//!
//! let provider = config.create_token_provider("eu-central-1", None)?;
//! let endpoint = config.ingest().build_endpoint_url("eu-central-1", None, None);
//!
//! if provider.authentication_status().is_authorized() {
//!     tracing::info!(%endpoint, "ready to ingest");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Environment
//!
//! Variables are read from the process environment and from a `.env` file,
//! see [`Settings`] for the recognized names. Auth tokens are given as
//! `static:<token>`.

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

mod auth;
mod behavior_version;
mod config;
mod error;
pub mod loader;
pub mod settings;

pub use auth::AuthType;
pub use behavior_version::BehaviorVersion;
pub use config::{BoxedTokenProvider, Config, ConfiguredTokenProviderFactory, EndpointConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::Settings;
