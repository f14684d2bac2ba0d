//! Unverified JWT inspection
//!
//! The client never trusts a token for security decisions; it only reads the
//! claims to learn who is logged in and when the session lapses. Signatures
//! are carried through opaquely and never checked.
//!
//! Every function in this module degrades instead of failing: a malformed
//! token decodes to `None` and is reported as expired, so that a corrupt
//! persisted session simply looks like an anonymous one.
//!
//! # Examples
//!
//! ```
//! use taskdeck::token;
//!
//! assert!(token::decode("not-a-jwt").is_none());
//! assert!(token::is_token_expired("not-a-jwt"));
//! ```

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// URL-safe base64 that accepts segments with or without `=` padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in a token payload.
///
/// Registered claims used by the client are typed; every other field is kept
/// in `extra` so the payload survives decoding unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Application user identifier.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub user_id: Option<String>,

    /// Standard subject claim, used when `user_id` is absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub sub: Option<String>,

    /// Email address of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiry, seconds since the Unix epoch.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "seconds"
    )]
    pub exp: Option<i64>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "seconds"
    )]
    pub iat: Option<i64>,

    /// Not-before, seconds since the Unix epoch.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "seconds"
    )]
    pub nbf: Option<i64>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Any claim not listed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Returns `true` when `exp` is present and already in the past.
    ///
    /// Tokens without `exp` never expire.
    pub fn is_expired(&self) -> bool {
        match self.exp {
            None => false,
            Some(exp) => exp.saturating_mul(1000) < Utc::now().timestamp_millis(),
        }
    }

    /// The user identifier, preferring `user_id` over `sub`.
    pub fn subject(&self) -> Option<&str> {
        non_empty(self.user_id.as_deref()).or_else(|| non_empty(self.sub.as_deref()))
    }
}

/// A token split into its three parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// The JOSE header.
    pub header: Map<String, Value>,
    /// The payload claims.
    pub payload: Claims,
    /// The raw signature segment, never verified.
    pub signature: String,
}

/// Identity read from a token's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// `user_id` claim, or `sub` when `user_id` is missing.
    pub user_id: String,
    /// `email` claim.
    pub email: String,
}

/// Decodes a token without verifying its signature.
///
/// Returns `None` when the token does not have exactly three dot-separated
/// segments, or when the header or payload is not base64url-encoded JSON.
///
/// # Examples
///
/// ```
/// use taskdeck::token;
///
/// // {"alg":"none"} . {"sub":"u1","email":"a@b.com"} . sig
/// let raw = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1MSIsImVtYWlsIjoiYUBiLmNvbSJ9.sig";
/// let decoded = token::decode(raw).unwrap();
/// assert_eq!(decoded.payload.sub.as_deref(), Some("u1"));
/// assert_eq!(decoded.signature, "sig");
/// ```
pub fn decode(token: &str) -> Option<DecodedToken> {
    match try_decode(token) {
        Ok(decoded) => Some(decoded),
        Err(reason) => {
            tracing::warn!("Failed to decode token: {}", reason);
            None
        }
    }
}

fn try_decode(token: &str) -> std::result::Result<DecodedToken, String> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature] = parts.as_slice() else {
        return Err(format!("expected 3 segments, found {}", parts.len()));
    };

    let header: Map<String, Value> =
        decode_segment(header_b64).map_err(|e| format!("invalid header: {}", e))?;
    let payload: Claims =
        decode_segment(payload_b64).map_err(|e| format!("invalid payload: {}", e))?;

    Ok(DecodedToken {
        header,
        payload,
        signature: (*signature).to_string(),
    })
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
) -> std::result::Result<T, String> {
    // Tolerate the standard alphabet as well as the URL-safe one.
    let normalized = segment.replace('+', "-").replace('/', "_");
    let bytes = SEGMENT_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

/// Extracts the user identity from a token.
///
/// Returns `None` if the token cannot be decoded, has expired, or is missing
/// either a user identifier (`user_id`/`sub`) or an `email`.
pub fn extract_user_info(token: &str) -> Option<UserInfo> {
    let decoded = decode(token)?;
    let claims = decoded.payload;

    if claims.is_expired() {
        tracing::warn!("Token is expired");
        return None;
    }

    let (Some(user_id), Some(email)) = (claims.subject(), non_empty(claims.email.as_deref()))
    else {
        tracing::warn!("Token payload is missing user_id or email");
        return None;
    };

    Some(UserInfo {
        user_id: user_id.to_string(),
        email: email.to_string(),
    })
}

/// Returns `true` if the token cannot be decoded or its `exp` is in the
/// past. Tokens without `exp` are treated as permanently valid.
pub fn is_token_expired(token: &str) -> bool {
    decode(token).map_or(true, |decoded| decoded.payload.is_expired())
}

/// The instant the token expires, if it decodes and carries `exp`.
pub fn token_expiration(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode(token)?.payload.exp?;
    DateTime::from_timestamp(exp, 0)
}

/// Milliseconds until the token expires; negative once it has expired.
pub fn time_until_expiration(token: &str) -> Option<i64> {
    let expiration = token_expiration(token)?;
    Some(expiration.timestamp_millis() - Utc::now().timestamp_millis())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Accepts identifiers issued either as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts timestamps as integers or floats, truncating fractions.
fn seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    })
}
