//! OAuth 1.0a request signing (HMAC-SHA1, user context)
//!
//! JSON bodies are not part of the signature; only query parameters and any
//! explicitly supplied form parameters are.

use crate::config::XCredentials;
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding; only unreserved characters pass through
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signs requests with a fixed set of user-context credentials
#[derive(Debug, Clone)]
pub struct OAuth1Signer {
    credentials: XCredentials,
}

impl OAuth1Signer {
    pub fn new(credentials: XCredentials) -> Self {
        Self { credentials }
    }

    /// `Authorization` header value with a fresh nonce and the current time
    pub fn authorization(&self, method: &str, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Signature(format!("System clock error: {}", e)))?
            .as_secs();
        self.authorization_with(method, url, form, &nonce, timestamp)
    }

    /// `Authorization` header value for a fixed nonce and timestamp
    pub fn authorization_with(
        &self,
        method: &str,
        url: &str,
        form: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String> {
        let timestamp = timestamp.to_string();
        let mut oauth = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.expose_secret().to_string()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.access_token.expose_secret().to_string()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];

        let signature = self.signature(method, url, form, &oauth)?;
        oauth.push(("oauth_signature", signature));
        oauth.sort_by(|a, b| a.0.cmp(b.0));

        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {}", fields))
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        form: &[(&str, &str)],
        oauth: &[(&str, String)],
    ) -> Result<String> {
        let base = signature_base_string(method, url, form, oauth)?;
        let key = format!(
            "{}&{}",
            encode(self.credentials.consumer_secret.expose_secret()),
            encode(self.credentials.access_token_secret.expose_secret())
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| Error::Signature(format!("HMAC init failed: {}", e)))?;
        mac.update(base.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&base-url&normalized-params`, each part percent-encoded
fn signature_base_string(
    method: &str,
    url: &str,
    form: &[(&str, &str)],
    oauth: &[(&str, String)],
) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| Error::InvalidArgument(format!("Invalid URL {}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("URL has no host: {}", url)))?;
    let base_url = match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, parsed.path()),
        None => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
    };

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .collect();
    params.extend(form.iter().map(|(k, v)| (encode(k), encode(v))));
    params.extend(oauth.iter().map(|(k, v)| (encode(k), encode(v))));
    params.sort();

    let normalized = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url),
        encode(&normalized)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn signer() -> OAuth1Signer {
        OAuth1Signer::new(XCredentials {
            consumer_key: SecretString::from("xvz1evFS4wEEPTGEFPHBog".to_string()),
            consumer_secret: SecretString::from("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string()),
            access_token: SecretString::from("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string()),
            access_token_secret: SecretString::from("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string()),
        })
    }

    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json?include_entities=true";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

    #[test]
    fn test_documented_signature_vector() {
        let header = signer()
            .authorization_with("POST", URL, &[("status", STATUS)], NONCE, 1318622958)
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn test_base_string_layout() {
        let base = signature_base_string(
            "post",
            "https://api.twitter.com/2/tweets",
            &[],
            &[("oauth_nonce", "n n".to_string())],
        )
        .unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F2%2Ftweets&oauth_nonce%3Dn%2520n"
        );
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let s = signer();
        let a = s.authorization("POST", "https://api.twitter.com/2/tweets", &[]).unwrap();
        let b = s.authorization("POST", "https://api.twitter.com/2/tweets", &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = signer().authorization("POST", "not a url", &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
