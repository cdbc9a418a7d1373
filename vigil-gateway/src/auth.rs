//! OAuth redirect helpers for the trading platform.
//!
//! The platform issues an authorization code through a browser redirect. These
//! helpers build the authorize URL and pull the code back out of the callback;
//! exchanging the code for a relay token is done by
//! [`RelayApiClient::exchange_code`](crate::rest::RelayApiClient::exchange_code).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use url::Url;
use vigil_core::config::OAuthConfig;
use vigil_core::error::{AuthError, NetworkError, VigilError};

const STATE_BYTES: usize = 32;

/// Builds the authorize URL the user is sent to.
///
/// ```
/// use vigil_core::config::OAuthConfig;
/// use vigil_gateway::auth::authorization_url;
///
/// let url = authorization_url(&OAuthConfig::default(), Some("xyz")).unwrap();
/// assert!(url.as_str().contains("response_type=code"));
/// assert!(url.as_str().ends_with("state=xyz"));
/// ```
pub fn authorization_url(config: &OAuthConfig, state: Option<&str>) -> Result<Url, NetworkError> {
    let mut url = Url::parse(&config.auth_url).map_err(|e| NetworkError::InvalidUrl {
        url: config.auth_url.clone(),
        reason: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri);
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }

    Ok(url)
}

/// Generates a random URL-safe `state` value.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Extracts the authorization code from the redirect callback URL.
///
/// An `error` parameter wins over everything else. When `expected_state` is
/// given, the callback must carry the same value.
pub fn parse_callback(callback: &str, expected_state: Option<&str>) -> Result<String, VigilError> {
    let url = Url::parse(callback).map_err(|e| NetworkError::InvalidUrl {
        url: callback.to_string(),
        reason: e.to_string(),
    })?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(code) = error {
        return Err(AuthError::OAuth { code, description }.into());
    }

    if let Some(expected) = expected_state
        && state.as_deref() != Some(expected)
    {
        return Err(AuthError::StateMismatch.into());
    }

    code.filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::MissingCode.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_parameters() {
        let config = OAuthConfig::default();
        let url = authorization_url(&config, None).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("live.tradovateapi.com"));
        assert_eq!(
            pairs,
            vec![
                ("response_type".to_string(), "code".to_string()),
                ("client_id".to_string(), config.client_id.clone()),
                ("redirect_uri".to_string(), config.redirect_uri.clone()),
            ]
        );
        assert!(url.as_str().contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
    }

    #[test]
    fn test_authorization_url_invalid_base() {
        let config = OAuthConfig {
            auth_url: "not a url".to_string(),
            ..OAuthConfig::default()
        };
        assert!(matches!(
            authorization_url(&config, None),
            Err(NetworkError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_generate_state() {
        let first = generate_state();
        let second = generate_state();

        assert_eq!(first.len(), 43);
        assert_ne!(first, second);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_parse_callback_code() {
        let code = parse_callback("http://localhost:3000/callback?code=abc%2F123&state=s1", Some("s1"))
            .unwrap();
        assert_eq!(code, "abc/123");
    }

    #[test]
    fn test_parse_callback_error() {
        let error = parse_callback(
            "http://localhost:3000/callback?error=access_denied&error_description=User+cancelled",
            None,
        )
        .unwrap_err();

        assert_eq!(
            error,
            VigilError::Auth(AuthError::OAuth {
                code: "access_denied".to_string(),
                description: Some("User cancelled".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_callback_state_mismatch() {
        let error =
            parse_callback("http://localhost:3000/callback?code=abc&state=other", Some("s1"))
                .unwrap_err();
        assert_eq!(error, VigilError::Auth(AuthError::StateMismatch));

        let error = parse_callback("http://localhost:3000/callback?code=abc", Some("s1")).unwrap_err();
        assert_eq!(error, VigilError::Auth(AuthError::StateMismatch));
    }

    #[test]
    fn test_parse_callback_missing_code() {
        assert_eq!(
            parse_callback("http://localhost:3000/callback", None),
            Err(VigilError::Auth(AuthError::MissingCode))
        );
        assert_eq!(
            parse_callback("http://localhost:3000/callback?code=", None),
            Err(VigilError::Auth(AuthError::MissingCode))
        );
    }

    #[test]
    fn test_parse_callback_invalid_url() {
        assert!(matches!(
            parse_callback("/callback?code=abc", None),
            Err(VigilError::Network(NetworkError::InvalidUrl { .. }))
        ));
    }
}
