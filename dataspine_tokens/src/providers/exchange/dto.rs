//! DTOs for interacting with the token exchange

use serde::{Deserialize, Serialize};

use super::SubjectTokenType;
use crate::{AccessToken, SubjectTokenRef};

#[derive(Debug, Serialize)]
pub(super) struct TokenExchangeRequest<'a> {
    pub subject_token: &'a SubjectTokenRef,
    pub grant_type: &'static str,
    pub subject_token_type: SubjectTokenType,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenExchangeResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub issued_token_type: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
