//! Reqwest-backed identity provider speaking the Identity Toolkit REST API.
//!
//! The adapter owns transport details only: endpoint construction, the API
//! key query parameter, status mapping and JSON decoding of account ids.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use super::dto::{
    AccountResponseDto, DeleteRequestDto, ErrorEnvelopeDto, PasswordRequestDto,
};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Credentials, UserId};

const SIGN_UP_PATH: &str = "v1/accounts:signUp";
const SIGN_IN_PATH: &str = "v1/accounts:signInWithPassword";
const DELETE_PATH: &str = "v1/accounts:delete";

/// Connection settings for [`HttpIdentityProvider`].
#[derive(Debug, Clone)]
pub struct HttpIdentitySettings {
    /// Base URL, e.g. `https://identitytoolkit.googleapis.com/`.
    pub base_url: Url,
    /// Web API key appended as `?key=`.
    pub api_key: String,
    /// Bearer token for privileged calls such as account deletion.
    pub service_token: Option<String>,
    pub timeout: Duration,
}

/// Identity provider adapter issuing HTTP POST requests.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    service_token: Option<String>,
}

impl HttpIdentityProvider {
    /// Build an adapter with a reqwest client bound to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: HttpIdentitySettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let mut base_url = settings.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key,
            service_token: settings.service_token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityProviderError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| IdentityProviderError::rejected(format!("invalid endpoint: {err}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, IdentityProviderError> {
        let mut request = self.client.post(self.endpoint(path)?).json(body);
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        Ok(bytes.to_vec())
    }

    async fn password_call(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<UserId, IdentityProviderError> {
        let body = self
            .post(
                path,
                &PasswordRequestDto {
                    email: credentials.email(),
                    password: credentials.password(),
                    return_secure_token: true,
                },
            )
            .await
            .map_err(|error| match error {
                IdentityProviderError::Rejected { message } if message == "EMAIL_EXISTS" => {
                    IdentityProviderError::email_taken(credentials.email())
                }
                other => other,
            })?;
        parse_account_id(&body)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<UserId, IdentityProviderError> {
        self.password_call(SIGN_UP_PATH, credentials).await
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, IdentityProviderError> {
        self.password_call(SIGN_IN_PATH, credentials).await
    }

    async fn delete_account(&self, id: &UserId) -> Result<(), IdentityProviderError> {
        self.post(DELETE_PATH, &DeleteRequestDto {
            local_id: id.as_ref(),
        })
        .await
        .map_err(|error| match error {
            IdentityProviderError::Rejected { message } if message == "USER_NOT_FOUND" => {
                IdentityProviderError::account_not_found(id.as_ref())
            }
            other => other,
        })?;
        Ok(())
    }
}

fn parse_account_id(body: &[u8]) -> Result<UserId, IdentityProviderError> {
    let decoded: AccountResponseDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::rejected(format!("invalid account payload: {error}"))
    })?;
    UserId::new(decoded.local_id)
        .map_err(|error| IdentityProviderError::rejected(format!("invalid account id: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::connection(error.to_string())
}

/// Map a failed response onto the port error.
///
/// Client errors carry a reason code in `error.message`; the password
/// failures collapse into `InvalidCredentials` so callers cannot tell a
/// wrong password from an unknown email. Other reasons are passed through
/// verbatim for the caller to refine.
fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityProviderError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return IdentityProviderError::connection(format!("status {}", status.as_u16()));
    }
    let reason = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.reason().to_owned())
        .unwrap_or_default();
    match reason.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityProviderError::InvalidCredentials
        }
        "" => IdentityProviderError::rejected(format!("status {}", status.as_u16())),
        other => IdentityProviderError::rejected(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn provider(base: &str) -> HttpIdentityProvider {
        HttpIdentityProvider::new(HttpIdentitySettings {
            base_url: Url::parse(base).expect("base url"),
            api_key: "k3y".to_owned(),
            service_token: None,
            timeout: Duration::from_secs(1),
        })
        .expect("client")
    }

    #[rstest]
    #[case::bare_host("https://identity.test", "https://identity.test/v1/accounts:signUp?key=k3y")]
    #[case::emulator_prefix(
        "http://localhost:9099/identitytoolkit.googleapis.com",
        "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp?key=k3y"
    )]
    fn endpoints_keep_base_path(#[case] base: &str, #[case] expected: &str) {
        let url = provider(base).endpoint(SIGN_UP_PATH).expect("endpoint");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case::wrong_password(r#"{"error":{"code":400,"message":"INVALID_PASSWORD"}}"#)]
    #[case::unknown_email(r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}"#)]
    #[case::combined(r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS"}}"#)]
    fn password_failures_are_invalid_credentials(#[case] body: &str) {
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, body.as_bytes()),
            IdentityProviderError::InvalidCredentials
        );
    }

    #[test]
    fn reason_drops_the_human_suffix() {
        let body = r#"{"error":{"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, body.as_bytes()),
            IdentityProviderError::rejected("WEAK_PASSWORD")
        );
    }

    #[rstest]
    #[case(StatusCode::SERVICE_UNAVAILABLE)]
    #[case(StatusCode::TOO_MANY_REQUESTS)]
    fn outages_are_connection_errors(#[case] status: StatusCode) {
        assert!(matches!(
            map_status_error(status, b"<html>"),
            IdentityProviderError::Connection { .. }
        ));
    }

    #[test]
    fn account_id_is_read_from_local_id() {
        let id = parse_account_id(br#"{"localId":"Zx81","idToken":"t"}"#).expect("decoded");
        assert_eq!(id.as_ref(), "Zx81");
        assert!(parse_account_id(br#"{"idToken":"t"}"#).is_err());
    }
}
