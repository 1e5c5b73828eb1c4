//! Identity Toolkit request and response bodies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteRequestDto<'a> {
    pub(super) local_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponseDto {
    pub(super) local_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
}

impl ErrorBodyDto {
    /// Leading reason code, e.g. `WEAK_PASSWORD` from
    /// `"WEAK_PASSWORD : Password should be at least 6 characters"`.
    pub(super) fn reason(&self) -> &str {
        self.message
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }
}
