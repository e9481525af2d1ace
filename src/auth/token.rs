use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::SESSION_TTL_SECONDS;

type HmacSha256 = Hmac<Sha256>;

/// Sign a session id for the session cookie
///
/// # Arguments
///
/// * `session_id` - Server-side session key
/// * `secret_key` - Secret key for signing
///
/// # Returns
///
/// Signed token string in format: `session_id:expiry.signature`
///
/// # Errors
///
/// Returns an error if HMAC initialization fails or time is invalid
pub fn generate_session_token(session_id: &str, secret_key: &str) -> Result<String, String> {
    let expiry = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("System time error: {}", e))?
        .as_secs()
        + SESSION_TTL_SECONDS;

    let payload = format!("{}:{}", session_id, expiry);

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| format!("HMAC initialization error: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload, signature))
}

/// Verify a session token and extract the session id
///
/// # Returns
///
/// Tuple of (session_id, expiry) if valid and unexpired, None otherwise
///
/// Uses constant-time comparison to prevent timing attacks
pub fn verify_session_token(token: Option<&str>, secret_key: &str) -> Option<(String, u64)> {
    let (payload, signature_b64) = token?.split_once('.')?;
    let (session_id, expiry_str) = payload.split_once(':')?;

    if session_id.is_empty() || signature_b64.contains('.') {
        return None;
    }

    let expiry: u64 = expiry_str.parse().ok()?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    if now > expiry {
        return None;
    }

    let provided_signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&provided_signature).ok()?;

    Some((session_id.to_string(), expiry))
}
