//! OAuth 1.0a two-legged request signing (HMAC-SHA1, consumer credentials only).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;
use url::Url;

use crate::domain::{ApiKey, ApiSecret};

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is; everything else is encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
#[error("cannot derive HMAC-SHA1 signing key from the consumer secret")]
pub struct SignerError;

/// Signs requests with a consumer key/secret pair and an empty access token.
///
/// The HMAC key (`enc(secret)&`) is derived once; each request clones it.
#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    mac: HmacSha1,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}

impl OAuthSigner {
    pub fn new(key: &ApiKey, secret: &ApiSecret) -> Result<Self, SignerError> {
        let signing_key = format!("{}&", encode(secret.expose()));
        let mac = HmacSha1::new_from_slice(signing_key.as_bytes()).map_err(|_| SignerError)?;
        Ok(Self {
            consumer_key: key.as_str().to_owned(),
            mac,
        })
    }

    /// `Authorization` header value for one request, with a fresh nonce and timestamp.
    pub fn authorization_header(&self, method: &str, url: &Url) -> String {
        self.authorization_header_with(method, url, &nonce(), timestamp())
    }

    fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let signature = self.signature(method, url, &oauth_params);
        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort_unstable_by_key(|(name, _)| *name);

        let fields = oauth_params
            .iter()
            .map(|(name, value)| format!("{name}=\"{}\"", encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }

    fn signature(&self, method: &str, url: &Url, oauth_params: &[(&str, &str)]) -> String {
        let base = signature_base_string(method, url, oauth_params);
        let mut mac = self.mac.clone();
        mac.update(base.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

fn signature_base_string(method: &str, url: &Url, oauth_params: &[(&str, &str)]) -> String {
    let mut params = oauth_params
        .iter()
        .map(|(name, value)| (encode(name), encode(value)))
        .chain(
            url.query_pairs()
                .map(|(name, value)| (encode(&name), encode(&value))),
        )
        .collect::<Vec<_>>();
    params.sort();

    let normalized = params
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_uri(url)),
        encode(&normalized)
    )
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(key: &str, secret: &str) -> OAuthSigner {
        OAuthSigner::new(&ApiKey::new(key).unwrap(), &ApiSecret::new(secret).unwrap()).unwrap()
    }

    #[test]
    fn base_string_follows_rfc5849() {
        let url = Url::parse("https://gatewayapi.com/rest/mtsms").unwrap();
        let params = [
            ("oauth_consumer_key", "test-key"),
            ("oauth_nonce", "abcdef0123456789"),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", "1700000000"),
            ("oauth_version", OAUTH_VERSION),
        ];
        assert_eq!(
            signature_base_string("post", &url, &params),
            "POST&https%3A%2F%2Fgatewayapi.com%2Frest%2Fmtsms&oauth_consumer_key%3Dtest-key\
             %26oauth_nonce%3Dabcdef0123456789%26oauth_signature_method%3DHMAC-SHA1\
             %26oauth_timestamp%3D1700000000%26oauth_version%3D1.0"
        );
    }

    #[test]
    fn authorization_header_known_answer() {
        let url = Url::parse("https://gatewayapi.com/rest/mtsms").unwrap();
        let header = signer("test-key", "test-secret").authorization_header_with(
            "POST",
            &url,
            "abcdef0123456789",
            1_700_000_000,
        );
        assert_eq!(
            header,
            "OAuth oauth_consumer_key=\"test-key\", oauth_nonce=\"abcdef0123456789\", \
             oauth_signature=\"UDbI1l5Lw2qPMJWKgwdaN%2BYtk%2Bs%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1700000000\", \
             oauth_version=\"1.0\""
        );
    }

    #[test]
    fn query_pairs_port_and_reserved_secret_are_signed() {
        let url = Url::parse("http://127.0.0.1:8080/rest/mtsms?b=x%20y&a=2&a=1").unwrap();
        assert_eq!(base_uri(&url), "http://127.0.0.1:8080/rest/mtsms");

        let header = signer("test-key", "s3cr&t").authorization_header_with(
            "POST",
            &url,
            "abcdef0123456789",
            1_700_000_000,
        );
        assert!(
            header.contains("oauth_signature=\"TtFd40an7Tuv65u1t1YReiozuUA%3D\""),
            "unexpected header: {header}"
        );
    }

    #[test]
    fn default_port_is_dropped_from_base_uri() {
        let url = Url::parse("HTTPS://GatewayAPI.com:443/rest/mtsms").unwrap();
        assert_eq!(base_uri(&url), "https://gatewayapi.com/rest/mtsms");
    }

    #[test]
    fn fresh_nonce_per_request() {
        let url = Url::parse("https://gatewayapi.com/rest/mtsms").unwrap();
        let signer = signer("test-key", "test-secret");
        assert_ne!(
            signer.authorization_header("POST", &url),
            signer.authorization_header("POST", &url)
        );
        assert_eq!(nonce().len(), NONCE_LEN);
    }
}
