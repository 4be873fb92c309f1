//! Connection configuration and the document security token.

use url::Url;

use crate::error::BridgeError;
use crate::hooks::HookRegistry;

/// Protocol version pinned into every handshake.
pub const PROTOCOL_VSN: &str = "2.0.0";

/// Handshake query parameter carrying the security token.
pub const TOKEN_PARAM: &str = "_csrf_token";

/// Attribute selector for the token the server renders into the page head.
#[cfg(target_arch = "wasm32")]
const TOKEN_SELECTOR: &str = "meta[name='csrf-token']";

/// Options for establishing the single page connection.
///
/// Mirrors what a caller hands to `ViewSocket::connect`: where to connect,
/// how long the primary transport may stall before the long-poll fallback
/// kicks in, extra handshake parameters, and the hook table.
pub struct ConnectOptions {
    /// Endpoint path on the current origin.
    pub endpoint: String,
    /// Fallback long-poll timeout in milliseconds, passed through to the
    /// transport.
    pub fallback_ms: u32,
    /// Caller-supplied handshake parameters, appended in insertion order.
    pub params: Vec<(String, String)>,
    /// Hook table consulted when marked elements enter the document.
    pub hooks: HookRegistry,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            endpoint: "/live".to_string(),
            fallback_ms: 2500,
            params: Vec::new(),
            hooks: HookRegistry::with_defaults(),
        }
    }
}

impl ConnectOptions {
    /// Add a handshake parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// The request-forgery token carried on every request.
///
/// The server renders it into the document head; the bridge reads it once
/// at startup and refuses to connect without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken(String);

impl SecurityToken {
    /// Validate raw meta-tag content into a token.
    ///
    /// `None` or blank content is fatal: the bridge must fail loudly
    /// rather than open an unauthenticated connection.
    pub fn parse(content: Option<&str>) -> Result<Self, BridgeError> {
        match content {
            Some(raw) if !raw.trim().is_empty() => Ok(Self(raw.to_string())),
            _ => Err(BridgeError::MissingSecurityToken),
        }
    }

    /// Read the token from the rendered document.
    #[cfg(target_arch = "wasm32")]
    pub fn from_document() -> Result<Self, BridgeError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| BridgeError::Dom("no document".to_string()))?;
        let meta = document
            .query_selector(TOKEN_SELECTOR)
            .map_err(|_| BridgeError::Dom(format!("bad selector {TOKEN_SELECTOR}")))?;
        let content = meta.as_ref().and_then(|el| el.get_attribute("content"));
        Self::parse(content.as_deref())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Current page origin, the base every relative endpoint resolves against.
#[cfg(target_arch = "wasm32")]
pub fn page_origin() -> Result<String, BridgeError> {
    web_sys::window()
        .map(|w| w.location().origin())
        .transpose()
        .ok()
        .flatten()
        .ok_or_else(|| BridgeError::Dom("no window.location".to_string()))
}

/// Build the handshake URL: endpoint joined onto the origin, with the
/// security token, protocol version, and caller params in the query.
pub fn handshake_url(
    base: &str,
    endpoint: &str,
    token: &SecurityToken,
    params: &[(String, String)],
) -> Result<Url, BridgeError> {
    let base = Url::parse(base).map_err(|e| BridgeError::InvalidEndpoint(e.to_string()))?;
    let mut url = base
        .join(endpoint)
        .map_err(|e| BridgeError::InvalidEndpoint(e.to_string()))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair(TOKEN_PARAM, token.as_str());
        query.append_pair("vsn", PROTOCOL_VSN);
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_requires_content() {
        assert_eq!(
            SecurityToken::parse(None),
            Err(BridgeError::MissingSecurityToken)
        );
        assert_eq!(
            SecurityToken::parse(Some("   ")),
            Err(BridgeError::MissingSecurityToken)
        );
        let token = SecurityToken::parse(Some("abc123")).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn handshake_url_carries_token_version_and_params() {
        let token = SecurityToken::parse(Some("tok")).unwrap();
        let params = vec![
            ("locale".to_string(), "en".to_string()),
            ("theme".to_string(), "dark".to_string()),
        ];
        let url = handshake_url("https://example.com", "/live", &token, &params).unwrap();

        assert_eq!(url.path(), "/live");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], (TOKEN_PARAM.to_string(), "tok".to_string()));
        assert_eq!(pairs[1], ("vsn".to_string(), PROTOCOL_VSN.to_string()));
        assert_eq!(pairs[2], ("locale".to_string(), "en".to_string()));
        assert_eq!(pairs[3], ("theme".to_string(), "dark".to_string()));
    }

    #[test]
    fn handshake_url_rejects_garbage_base() {
        let token = SecurityToken::parse(Some("tok")).unwrap();
        let err = handshake_url("not a url", "/live", &token, &[]).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidEndpoint(_)));
    }

    #[test]
    fn default_options_match_the_stock_setup() {
        let opts = ConnectOptions::default();
        assert_eq!(opts.endpoint, "/live");
        assert_eq!(opts.fallback_ms, 2500);
        assert!(opts.params.is_empty());
    }
}
