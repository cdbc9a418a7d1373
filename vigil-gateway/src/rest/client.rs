//! Relay REST client.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};
use vigil_core::Credential;
use vigil_core::account::AccountInfo;
use vigil_core::config::ApiConfig;
use vigil_core::error::{AuthError, NetworkError, VigilError};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Checks whether a credential is still accepted by the relay.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns `Ok(true)` if the credential is valid, `Ok(false)` if it was
    /// rejected, and an error if the answer could not be obtained.
    async fn verify(&self, credential: &Credential) -> Result<bool, NetworkError>;
}

/// Successful response of the code exchange.
///
/// Both tokens are wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct TokenResponse {
    /// Bearer token for the relay.
    pub access_token: String,
    /// Token type, normally `bearer`.
    #[serde(default = "default_token_type")]
    #[zeroize(skip)]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    #[zeroize(skip)]
    pub expires_in: Option<u64>,
    /// Platform refresh token, when issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Returns the access token as a credential.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::new(self.access_token.clone())
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Client for the relay's REST endpoints.
///
/// Positive verification results are cached per credential for
/// [`ApiConfig::verify_cache_ttl`]; a rejection or a logout evicts the entry.
///
/// ```ignore
/// use vigil_core::config::ApiConfig;
/// use vigil_gateway::rest::{RelayApiClient, TokenVerifier};
///
/// let client = RelayApiClient::new(ApiConfig::default())?;
/// let tokens = client.exchange_code("code-from-callback").await?;
/// assert!(client.verify(&tokens.credential()).await?);
/// ```
pub struct RelayApiClient {
    config: ApiConfig,
    http_client: Client,
    verified: Mutex<HashMap<Credential, Instant>>,
}

impl fmt::Debug for RelayApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayApiClient")
            .field("config", &self.config)
            .field("cached_verifications", &self.verified.lock().len())
            .finish_non_exhaustive()
    }
}

impl RelayApiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if the HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> Result<Self, NetworkError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            concat!("vigil/", env!("CARGO_PKG_VERSION"))
                .parse()
                .map_err(|_| NetworkError::ConnectionFailed {
                    reason: "Invalid user agent".to_string(),
                })?,
        );

        let http_client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| NetworkError::ConnectionFailed {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            config,
            http_client,
            verified: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the full URL for a path.
    #[must_use]
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Exchanges an OAuth authorization code for a relay token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, VigilError> {
        if code.trim().is_empty() {
            return Err(AuthError::MissingCode.into());
        }

        let request = self
            .http_client
            .post(self.build_url("/oauth/token"))
            .json(&json!({ "code": code }));
        let response = self.send(request).await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if let Some(error) = body.as_ref().and_then(oauth_error) {
            warn!(error = %error, "Token exchange rejected");
            return Err(error.into());
        }

        if !status.is_success() {
            return Err(http_error(status, body.as_ref(), &text).into());
        }

        let body = body.ok_or_else(|| AuthError::InvalidResponse {
            reason: "token response is not JSON".to_string(),
        })?;

        let has_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .is_some_and(|token| !token.is_empty());
        if !has_token {
            return Err(AuthError::MissingAccessToken.into());
        }

        let tokens: TokenResponse =
            serde_json::from_value(body).map_err(|e| AuthError::InvalidResponse {
                reason: e.to_string(),
            })?;

        info!(expires_in = ?tokens.expires_in, "Exchanged authorization code");
        Ok(tokens)
    }

    /// Fetches the account summary for `credential`.
    pub async fn account_info(&self, credential: &Credential) -> Result<AccountInfo, VigilError> {
        let request = self
            .http_client
            .get(self.build_url("/account-info"))
            .bearer_auth(credential.expose());
        let response = self.send(request).await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let body: Option<Value> = serde_json::from_str(&text).ok();
            return Err(http_error(status, body.as_ref(), &text).into());
        }

        serde_json::from_str(&text).map_err(|e| {
            AuthError::InvalidResponse {
                reason: format!("account info: {e}"),
            }
            .into()
        })
    }

    /// Logs `credential` out and forgets any cached verification for it.
    pub async fn logout(&self, credential: &Credential) -> Result<(), NetworkError> {
        self.verified.lock().remove(credential);

        let request = self
            .http_client
            .post(self.build_url("/logout"))
            .bearer_auth(credential.expose());
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            info!("Logged out");
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            let body: Option<Value> = serde_json::from_str(&text).ok();
            Err(http_error(status, body.as_ref(), &text))
        }
    }

    /// Drops every cached verification.
    pub fn clear_verification_cache(&self) {
        self.verified.lock().clear();
    }

    /// Returns true for an unexpired positive answer. An expired entry is
    /// removed.
    fn cached_verification(&self, credential: &Credential) -> bool {
        let ttl = self.config.verify_cache_ttl();
        let mut verified = self.verified.lock();
        match verified.get(credential) {
            Some(at) if at.elapsed() < ttl => true,
            Some(_) => {
                verified.remove(credential);
                false
            }
            None => false,
        }
    }

    fn remember_verified(&self, credential: &Credential) {
        let ttl = self.config.verify_cache_ttl();
        let mut verified = self.verified.lock();
        verified.retain(|_, at| at.elapsed() < ttl);
        verified.insert(credential.clone(), Instant::now());
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, NetworkError> {
        let request = request.build().map_err(|e| NetworkError::InvalidUrl {
            url: self.config.url.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            method = %request.method(),
            url = %request.url(),
            "Sending request"
        );

        self.http_client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(&e))
    }

    fn transport_error(&self, e: &reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else if e.is_connect() {
            NetworkError::ConnectionFailed {
                reason: e.to_string(),
            }
        } else {
            NetworkError::Http {
                status_code: e.status().map_or(0, |s| s.as_u16()),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl TokenVerifier for RelayApiClient {
    async fn verify(&self, credential: &Credential) -> Result<bool, NetworkError> {
        if self.cached_verification(credential) {
            debug!("Using cached token verification");
            return Ok(true);
        }

        let request = self
            .http_client
            .get(self.build_url("/verify-token"))
            .bearer_auth(credential.expose());
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            self.remember_verified(credential);
            Ok(true)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.verified.lock().remove(credential);
            debug!(status = status.as_u16(), "Token rejected");
            Ok(false)
        } else {
            let text = response.text().await.unwrap_or_default();
            let body: Option<Value> = serde_json::from_str(&text).ok();
            Err(http_error(status, body.as_ref(), &text))
        }
    }
}

/// Extracts an OAuth error (`error` / `error_description`) from a body.
fn oauth_error(body: &Value) -> Option<AuthError> {
    let code = body.get("error").and_then(Value::as_str)?;
    Some(AuthError::OAuth {
        code: code.to_string(),
        description: body
            .get("error_description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Builds an HTTP error, preferring the relay's `detail` message.
fn http_error(status: StatusCode, body: Option<&Value>, text: &str) -> NetworkError {
    let reason = body
        .and_then(|b| b.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| (!text.is_empty()).then(|| text.to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    NetworkError::Http {
        status_code: status.as_u16(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RelayApiClient {
        RelayApiClient::new(ApiConfig {
            url: format!("{}/api", server.uri()),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = RelayApiClient::new(ApiConfig {
            url: "http://localhost:8000/api/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.build_url("/verify-token"),
            "http://localhost:8000/api/verify-token"
        );
    }

    #[test]
    fn test_token_response_debug_is_redacted() {
        let tokens = TokenResponse {
            access_token: "secret-access".to_string(),
            token_type: "bearer".to_string(),
            expires_in: Some(1800),
            refresh_token: Some("secret-refresh".to_string()),
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("1800"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/token"))
            .and(body_json(json!({"code": "auth-code"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "relay-token",
                "token_type": "bearer",
                "expires_in": 1800,
                "refresh_token": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client_for(&server).exchange_code("auth-code").await.unwrap();

        assert_eq!(tokens.credential(), Credential::new("relay-token"));
        assert_eq!(tokens.expires_in, Some(1800));
        assert_eq!(tokens.refresh_token, None);
    }

    #[tokio::test]
    async fn test_exchange_code_oauth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "code expired"
            })))
            .mount(&server)
            .await;

        let error = client_for(&server).exchange_code("stale").await.unwrap_err();

        assert_eq!(
            error,
            VigilError::Auth(AuthError::OAuth {
                code: "invalid_grant".to_string(),
                description: Some("code expired".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_exchange_code_missing_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})),
            )
            .mount(&server)
            .await;

        let error = client_for(&server).exchange_code("code").await.unwrap_err();

        assert_eq!(error, VigilError::Auth(AuthError::MissingAccessToken));
    }

    #[tokio::test]
    async fn test_exchange_code_server_error_uses_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/oauth/token"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "detail": "Error processing token"
            })))
            .mount(&server)
            .await;

        let error = client_for(&server).exchange_code("code").await.unwrap_err();

        assert_eq!(
            error,
            VigilError::Network(NetworkError::Http {
                status_code: 500,
                reason: "Error processing token".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_exchange_empty_code_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let error = client_for(&server).exchange_code("  ").await.unwrap_err();

        assert_eq!(error, VigilError::Auth(AuthError::MissingCode));
    }

    #[tokio::test]
    async fn test_verify_valid_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "valid"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::new("abc123");

        assert!(client.verify(&credential).await.unwrap());
        assert!(client.verify(&credential).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejected_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::new("expired");

        assert!(!client.verify(&credential).await.unwrap());
        assert!(!client.verify(&credential).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .verify(&Credential::new("abc123"))
            .await
            .unwrap_err();

        assert!(matches!(error, NetworkError::Http { status_code: 503, .. }));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_token_response_zeroize_wipes_secrets() {
        let mut tokens = TokenResponse {
            access_token: "secret-access".to_string(),
            token_type: "bearer".to_string(),
            expires_in: Some(1800),
            refresh_token: Some("secret-refresh".to_string()),
        };
        tokens.zeroize();

        assert!(tokens.access_token.is_empty());
        assert_eq!(tokens.refresh_token, None);
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, Some(1800));
    }

    #[tokio::test]
    async fn test_expired_verifications_are_evicted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let client = RelayApiClient::new(ApiConfig {
            url: format!("{}/api", server.uri()),
            verify_cache_ttl_secs: 0,
            ..ApiConfig::default()
        })
        .unwrap();
        let first = Credential::new("first");
        let second = Credential::new("second");

        assert!(client.verify(&first).await.unwrap());
        assert_eq!(client.verified.lock().len(), 1);

        // Inserting a fresh answer sweeps the expired one.
        assert!(client.verify(&second).await.unwrap());
        assert_eq!(client.verified.lock().len(), 1);
        assert!(client.verified.lock().contains_key(&second));

        // A lookup removes its own expired entry.
        assert!(!client.cached_verification(&second));
        assert!(client.verified.lock().is_empty());

        assert!(client.verify(&first).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_zero_ttl_never_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let client = RelayApiClient::new(ApiConfig {
            url: format!("{}/api", server.uri()),
            verify_cache_ttl_secs: 0,
            ..ApiConfig::default()
        })
        .unwrap();
        let credential = Credential::new("abc123");

        assert!(client.verify(&credential).await.unwrap());
        assert!(client.verify(&credential).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_evicts_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/verify-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::new("abc123");

        assert!(client.verify(&credential).await.unwrap());
        client.logout(&credential).await.unwrap();
        assert!(client.verify(&credential).await.unwrap());
    }

    #[tokio::test]
    async fn test_account_info() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/account-info"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "name": "DEMO1234",
                "userId": 7,
                "accountType": "Customer",
                "active": true,
                "tradingEnabled": true,
                "marginEnabled": false,
                "cashBalance": 50000.5,
                "status": true
            })))
            .mount(&server)
            .await;

        let info = client_for(&server)
            .account_info(&Credential::new("abc123"))
            .await
            .unwrap();

        assert_eq!(info.name, "DEMO1234");
        assert!(info.status);
        assert_eq!(info.user_id, Some(7));
        assert_eq!(info.account_type.as_deref(), Some("Customer"));
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let client = RelayApiClient::new(ApiConfig {
            url: "http://127.0.0.1:9/api".to_string(),
            timeout_ms: 2_000,
            ..ApiConfig::default()
        })
        .unwrap();

        let error = client.verify(&Credential::new("abc123")).await.unwrap_err();

        assert!(matches!(
            error,
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. }
        ));
    }
}
