//! Shared access signature tokens.
//!
//! ```text
//! SharedAccessSignature sr={enc(resource)}&sig={enc(base64(HMAC-SHA256(key, enc(resource) + "\n" + expiry)))}&se={expiry}&skn={key_name}
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build a token for `resource` valid until the unix time `expiry`.
pub(crate) fn token(resource: &str, key_name: &str, key: &str, expiry: i64) -> String {
    let encoded_resource = urlencoding::encode(resource);
    let string_to_sign = format!("{encoded_resource}\n{expiry}");
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key.as_bytes());
    let tag = ring::hmac::sign(&key, string_to_sign.as_bytes());
    let signature = STANDARD.encode(tag.as_ref());
    format!(
        "SharedAccessSignature sr={encoded_resource}&sig={}&se={expiry}&skn={key_name}",
        urlencoding::encode(&signature),
    )
}
