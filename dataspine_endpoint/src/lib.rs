//! Endpoint URL templating for Dataspine services
//!
//! Dataspine endpoints are addressed per tenant. A template such as
//! [`DEFAULT_ENDPOINT_URL`] carries placeholders for the service component,
//! the application and data product segments, and the region. The functions
//! here substitute those placeholders; they perform no validation of the
//! resulting URL.
//!
//! ```
//! use dataspine_endpoint::{interpolate_component, interpolate_endpoint_url, Component, DEFAULT_ENDPOINT_URL};
//!
//! let template = interpolate_component(DEFAULT_ENDPOINT_URL, Component::TokenExchange);
//! let url = interpolate_endpoint_url(&template, "eu-central-1", None, None);
//!
//! assert_eq!(url, "https://sts.eu-central-1.cloud.dataspine.tech");
//! ```

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]

use std::fmt;

use uuid::Uuid;

/// The endpoint template used when no other endpoint has been configured
pub const DEFAULT_ENDPOINT_URL: &str =
    "https://{{component}}{{application}}{{data_product_id}}.{{region}}.cloud.dataspine.tech";

const COMPONENT: &str = "{{component}}";
const REGION: &str = "{{region}}";
const DATA_PRODUCT_ID: &str = "{{data_product_id}}";
const APPLICATION: &str = "{{application}}";
const APPLICATION_ID: &str = "{{application_id}}";

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// A Dataspine service component, as addressed in an endpoint's host name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// The ingest service
    Ingest,
    /// The outlet service
    Outlet,
    /// The management API
    Api,
    /// The security token service performing token exchanges
    TokenExchange,
}

impl Component {
    /// The host name prefix for the component
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingest => "ing",
            Self::Outlet => "out",
            Self::Api => "api",
            Self::TokenExchange => "sts",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes a UUID as unpadded, lowercase RFC 4648 base32
pub fn uuid_to_base32(id: Uuid) -> String {
    let mut encoded = String::with_capacity(26);
    let mut buffer: u16 = 0;
    let mut bits = 0u32;

    for &byte in id.as_bytes() {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            let idx = (buffer >> (bits - 5)) & 0x1f;
            encoded.push(char::from(BASE32_ALPHABET[usize::from(idx)]));
            bits -= 5;
        }
        buffer &= (1u16 << bits) - 1;
    }

    if bits > 0 {
        let idx = (buffer << (5 - bits)) & 0x1f;
        encoded.push(char::from(BASE32_ALPHABET[usize::from(idx)]));
    }

    encoded
}

/// The host name segment for an optional identifier
///
/// An absent identifier yields an empty segment.
pub fn segment(id: Option<Uuid>) -> String {
    match id {
        Some(id) => format!("-{}", uuid_to_base32(id)),
        None => String::new(),
    }
}

/// Substitutes the component placeholder
pub fn interpolate_component(endpoint_url: &str, component: Component) -> String {
    endpoint_url.replace(COMPONENT, component.as_str())
}

/// Substitutes the region placeholder
pub fn interpolate_region(endpoint_url: &str, region: &str) -> String {
    endpoint_url.replace(REGION, region)
}

/// Removes the data product placeholder
pub fn strip_data_product_id(endpoint_url: &str) -> String {
    endpoint_url.replace(DATA_PRODUCT_ID, "")
}

/// Substitutes the tenant placeholders of an endpoint template
///
/// Both `{{application}}` and `{{application_id}}` are accepted as the
/// application placeholder. Any `{{component}}` placeholder is left untouched.
pub fn interpolate_endpoint_url(
    endpoint_url: &str,
    region: &str,
    data_product_id: Option<Uuid>,
    application_id: Option<Uuid>,
) -> String {
    let application = segment(application_id);

    interpolate_region(
        &endpoint_url
            .replace(DATA_PRODUCT_ID, &segment(data_product_id))
            .replace(APPLICATION_ID, &application)
            .replace(APPLICATION, &application),
        region,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_DATA_PRODUCT: Uuid = Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8);
    const TEST_APPLICATION: Uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);

    #[test]
    fn encodes_uuids_as_lowercase_base32() {
        assert_eq!(uuid_to_base32(TEST_DATA_PRODUCT), "m7svaraqwfbg7eshxnua4x7aza");
        assert_eq!(uuid_to_base32(TEST_APPLICATION), "aaisem2ekvthpcezvk54zxpo74");
        assert_eq!(uuid_to_base32(Uuid::nil()), "a".repeat(26));
        assert_eq!(uuid_to_base32(Uuid::max()), format!("{}4", "7".repeat(25)));
    }

    #[test]
    fn absent_segments_are_empty() {
        assert_eq!(segment(None), "");
        assert_eq!(segment(Some(TEST_DATA_PRODUCT)), "-m7svaraqwfbg7eshxnua4x7aza");
    }

    #[test]
    fn interpolates_every_tenant_placeholder() {
        let template = interpolate_component(DEFAULT_ENDPOINT_URL, Component::Ingest);
        let url = interpolate_endpoint_url(
            &template,
            "eu-central-1",
            Some(TEST_DATA_PRODUCT),
            Some(TEST_APPLICATION),
        );

        assert_eq!(
            url,
            "https://ing-aaisem2ekvthpcezvk54zxpo74-m7svaraqwfbg7eshxnua4x7aza.eu-central-1.cloud.dataspine.tech"
        );
    }

    #[test]
    fn accepts_application_id_placeholder() {
        let url = interpolate_endpoint_url(
            "https://sts{{application_id}}.{{region}}.example.com",
            "us-east-1",
            None,
            Some(TEST_APPLICATION),
        );

        assert_eq!(url, "https://sts-aaisem2ekvthpcezvk54zxpo74.us-east-1.example.com");
    }

    #[test]
    fn leaves_component_placeholder_alone() {
        let url = interpolate_endpoint_url(DEFAULT_ENDPOINT_URL, "r", None, None);
        assert_eq!(url, "https://{{component}}.r.cloud.dataspine.tech");
    }

    #[test]
    fn strips_data_product_placeholder() {
        assert_eq!(
            strip_data_product_id("https://sts{{data_product_id}}.example.com"),
            "https://sts.example.com"
        );
    }
}
