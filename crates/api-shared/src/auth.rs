//! Authorization header handling.
//!
//! The EHR signs each hook call with a JWT in `Authorization: Bearer <jwt>`. The token is decoded
//! for diagnostics only; its signature and claims are not verified.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not valid text")]
    InvalidHeader,
    #[error("Authorization header has no credential")]
    MissingCredential,
    #[error("credential is not a decodable JWT: {0}")]
    UndecodableToken(String),
}

/// Claims logged from the EHR's token. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    /// A string or an array of strings.
    pub aud: Option<serde_json::Value>,
    pub exp: Option<i64>,
    pub jti: Option<String>,
}

/// Extract the credential from an `Authorization` header value.
///
/// The value is split on whitespace and the second token is returned, so `Bearer abc` yields
/// `abc`. The scheme itself is not checked.
///
/// # Errors
///
/// Returns `MissingHeader` if no value is given and `MissingCredential` if the value has fewer
/// than two tokens.
pub fn credential_from_header(value: Option<&str>) -> Result<&str, AuthError> {
    let value = value.ok_or(AuthError::MissingHeader)?;
    value
        .split_whitespace()
        .nth(1)
        .ok_or(AuthError::MissingCredential)
}

/// Decode a JWT's payload without verifying it.
///
/// # Errors
///
/// Returns `UndecodableToken` when the token does not have three dot-separated segments, or the
/// payload is not base64url-encoded JSON.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::UndecodableToken(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::UndecodableToken(format!("payload encoding: {e}")))?;

    serde_json::from_slice(&payload)
        .map_err(|e| AuthError::UndecodableToken(format!("payload JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    #[test]
    fn takes_second_whitespace_token() {
        assert_eq!(credential_from_header(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(credential_from_header(Some("Bearer   spaced")), Ok("spaced"));
    }

    #[test]
    fn missing_header_and_credential_are_distinct() {
        assert_eq!(credential_from_header(None), Err(AuthError::MissingHeader));
        assert_eq!(
            credential_from_header(Some("Bearer")),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(credential_from_header(Some("")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn decodes_claims_without_verifying_signature() {
        let token = format!(
            "{}.{}.not-a-real-signature",
            encode(r#"{"alg":"RS384","typ":"JWT"}"#),
            encode(r#"{"iss":"https://ehr.example","sub":"client-1","aud":"https://cds.example","exp":1700000000,"jti":"abc"}"#)
        );

        let claims = decode_unverified(&token).expect("decode claims");
        assert_eq!(claims.iss.as_deref(), Some("https://ehr.example"));
        assert_eq!(claims.sub.as_deref(), Some("client-1"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.jti.as_deref(), Some("abc"));
    }

    #[test]
    fn tolerates_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"iss":"x"}"#);
        let token = format!("h.{payload}.s");
        let claims = decode_unverified(&token).expect("decode padded payload");
        assert_eq!(claims.iss.as_deref(), Some("x"));
    }

    #[test]
    fn rejects_opaque_tokens() {
        assert!(matches!(
            decode_unverified("opaque-token"),
            Err(AuthError::UndecodableToken(_))
        ));
        assert!(matches!(
            decode_unverified("a.!!!.c"),
            Err(AuthError::UndecodableToken(_))
        ));
        let not_json = format!("a.{}.c", encode("plain text"));
        assert!(matches!(
            decode_unverified(&not_json),
            Err(AuthError::UndecodableToken(_))
        ));
    }
}
