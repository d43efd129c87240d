//! Utility functions for the redirect flow.
//!
//! URL handling for redirect responses, PKCE, and reading claims out of an
//! ID token.

use crate::constants::redirect_params;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Parameters the provider put on the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    /// Authorization code.
    pub code: Option<String>,
    /// Echoed state.
    pub state: Option<String>,
    /// Provider error code.
    pub error: Option<String>,
    /// Provider error text.
    pub error_description: Option<String>,
}

/// Where in the URL the redirect response was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLocation {
    /// After `#`.
    Fragment,
    /// After `?`.
    Query,
}

fn split_location(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match before_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (before_fragment, None),
    };
    (base, query, fragment)
}

fn decode_pairs(encoded: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(encoded).unwrap_or_default()
}

fn params_from(pairs: Vec<(String, String)>) -> Option<RedirectParams> {
    let mut params = RedirectParams::default();
    for (key, value) in pairs {
        match key.as_str() {
            redirect_params::CODE => params.code = Some(value),
            redirect_params::STATE => params.state = Some(value),
            redirect_params::ERROR => params.error = Some(value),
            redirect_params::ERROR_DESCRIPTION => params.error_description = Some(value),
            _ => {},
        }
    }

    (params.code.is_some() || params.error.is_some()).then_some(params)
}

/// Find a redirect response in `url`, preferring the fragment.
///
/// A URL counts as a redirect response only if it carries a `code` or an
/// `error` parameter.
///
/// # Examples
///
/// ```
/// use authgate::utils::{parse_redirect, ResponseLocation};
///
/// let (params, at) = parse_redirect("http://app/#code=abc&state=xyz").unwrap();
/// assert_eq!(params.code.as_deref(), Some("abc"));
/// assert_eq!(at, ResponseLocation::Fragment);
///
/// assert!(parse_redirect("http://app/dashboard?tab=2").is_none());
/// ```
#[must_use]
pub fn parse_redirect(url: &str) -> Option<(RedirectParams, ResponseLocation)> {
    let (_, query, fragment) = split_location(url);

    fragment
        .and_then(|fragment| params_from(decode_pairs(fragment)))
        .map(|params| (params, ResponseLocation::Fragment))
        .or_else(|| {
            query
                .and_then(|query| params_from(decode_pairs(query)))
                .map(|params| (params, ResponseLocation::Query))
        })
}

/// Remove the redirect response from `url`, keeping unrelated query
/// parameters.
///
/// # Examples
///
/// ```
/// use authgate::utils::{strip_redirect, ResponseLocation};
///
/// assert_eq!(
///     strip_redirect("http://app/page?tab=2#code=abc&state=xyz", ResponseLocation::Fragment),
///     "http://app/page?tab=2"
/// );
/// assert_eq!(
///     strip_redirect("http://app/page?tab=2&code=abc", ResponseLocation::Query),
///     "http://app/page?tab=2"
/// );
/// ```
#[must_use]
pub fn strip_redirect(url: &str, at: ResponseLocation) -> String {
    let (base, query, fragment) = split_location(url);

    let query = match (at, query) {
        (ResponseLocation::Query, Some(query)) => {
            let kept: Vec<(String, String)> = decode_pairs(query)
                .into_iter()
                .filter(|(key, _)| !redirect_params::ALL.contains(&key.as_str()))
                .collect();
            serde_urlencoded::to_string(&kept).unwrap_or_default()
        },
        (_, query) => query.unwrap_or_default().to_string(),
    };
    let fragment = match at {
        ResponseLocation::Fragment => None,
        ResponseLocation::Query => fragment,
    };

    let mut stripped = base.to_string();
    if !query.is_empty() {
        stripped.push('?');
        stripped.push_str(&query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        stripped.push('#');
        stripped.push_str(fragment);
    }
    stripped
}

/// Generate a URL-safe random token from 32 bytes (256 bits) of randomness.
#[must_use]
pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// PKCE S256 challenge for `verifier`.
///
/// # Examples
///
/// ```
/// use authgate::utils::pkce_challenge;
///
/// // RFC 7636, appendix B
/// assert_eq!(
///     pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
///     "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
/// );
/// ```
#[must_use]
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Claims read from an ID token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    /// Object id of the account.
    #[serde(default)]
    pub oid: Option<String>,
    /// Tenant id of the account.
    #[serde(default)]
    pub tid: Option<String>,
    /// Subject.
    #[serde(default)]
    pub sub: Option<String>,
    /// Sign-in name.
    #[serde(default)]
    pub preferred_username: Option<String>,
}

impl IdTokenClaims {
    /// Account identifier: `"{oid}.{tid}"`, falling back to `sub`.
    #[must_use]
    pub fn account_identifier(&self) -> Option<String> {
        match (&self.oid, &self.tid, &self.sub) {
            (Some(oid), Some(tid), _) => Some(format!("{oid}.{tid}")),
            (_, _, Some(sub)) => Some(sub.clone()),
            _ => None,
        }
    }
}

/// Read the claims of a JWT without verifying its signature.
///
/// Only for tokens received directly from the token endpoint.
///
/// # Errors
///
/// Returns a description of the problem if the token is not a JWT or its
/// payload is not JSON.
pub fn decode_id_token_claims(token: &str) -> Result<IdTokenClaims, String> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err("id token is not a JWT".to_string()),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| format!("id token payload is not base64url: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("id token payload is not JSON: {e}"))
}
