//! SigV4-signed identity proofs
//!
//! A proof is a `GetCallerIdentity` request against AWS STS, signed but never
//! sent. The token exchange replays it to learn the caller's IAM identity. The
//! signed request carries the target exchange endpoint in a custom header, so
//! a captured proof is useless against any other endpoint.

use std::{collections::BTreeMap, error, time::SystemTime};

use aws_credential_types::Credentials;
use aws_sigv4::{
    http_request::{sign, SignableBody, SignableRequest, SigningSettings},
    sign::v4,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::{IdentityProofError, SubjectToken};

/// The STS endpoint the identity request is signed for
pub const STS_URL: &str = "https://sts.amazonaws.com/";

/// The body of the identity request
pub const GET_CALLER_IDENTITY_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";

/// The header binding a proof to its token exchange endpoint
pub const DATASPINE_STS_HEADER: &str = "X-Dataspine-STS";

const SIGNING_SERVICE: &str = "sts";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    headers: &'a BTreeMap<String, String>,
}

/// Builds an identity proof for `token_exchange_endpoint`, signed now
pub fn build_identity_proof(
    token_exchange_endpoint: &str,
    credentials: &Credentials,
    region: &str,
) -> Result<SubjectToken, IdentityProofError> {
    build_identity_proof_at(
        token_exchange_endpoint,
        credentials,
        region,
        SystemTime::now(),
    )
}

/// Builds an identity proof for `token_exchange_endpoint`, signed as of `time`
///
/// The output is deterministic for a given set of inputs.
#[tracing::instrument(skip(credentials, time))]
pub fn build_identity_proof_at(
    token_exchange_endpoint: &str,
    credentials: &Credentials,
    region: &str,
    time: SystemTime,
) -> Result<SubjectToken, IdentityProofError> {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned());
    headers.insert(
        DATASPINE_STS_HEADER.to_owned(),
        token_exchange_endpoint.to_owned(),
    );

    let identity = credentials.clone().into();
    let signing_params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_SERVICE)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(signing_error)?
        .into();

    let signable_request = SignableRequest::new(
        "POST",
        STS_URL,
        headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        SignableBody::Bytes(GET_CALLER_IDENTITY_BODY.as_bytes()),
    )
    .map_err(signing_error)?;

    let (instructions, _signature) = sign(signable_request, &signing_params)
        .map_err(signing_error)?
        .into_parts();

    for (name, value) in instructions.headers() {
        headers.insert(canonical_header_name(name), value.to_owned());
    }

    tracing::debug!(signed_headers = headers.len(), "signed identity request");

    let envelope = serde_json::to_vec(&Envelope { headers: &headers })?;
    Ok(SubjectToken::new(STANDARD.encode(envelope)))
}

fn signing_error<E>(error: E) -> IdentityProofError
where
    E: error::Error + Send + Sync + 'static,
{
    IdentityProofError::Signing(Box::new(error))
}

/// Converts a lowercase header name to its conventional casing,
/// e.g. `x-amz-date` to `X-Amz-Date`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut word = first.to_ascii_uppercase().to_string();
                    word.push_str(&chars.as_str().to_ascii_lowercase());
                    word
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
