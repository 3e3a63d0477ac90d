use super::*;
use crate::secret::{AzureToken, AzureTokenKind};
use serde_json::json;

pub(crate) fn encode_jwt(header: &Value, payload: &Value) -> String {
    let h = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap());
    let p = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{}.{}.c2lnbmF0dXJl", h, p)
}

#[test]
fn parses_well_formed_token() {
    let raw = encode_jwt(
        &json!({"alg": "RS256", "typ": "JWT"}),
        &json!({"iss": "https://example.com", "sub": "u1"}),
    );
    let token = Token::parse(raw.as_bytes()).unwrap();
    assert_eq!(token.header()["alg"], "RS256");
    assert_eq!(token.claim_str("iss"), Some("https://example.com"));
    assert_eq!(token.signature(), "c2lnbmF0dXJl");
    assert_eq!(token.raw(), raw);
}

#[test]
fn rejects_non_object_sections() {
    // payload decodes to a JSON string, not an object
    let h = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let p = URL_SAFE_NO_PAD.encode(br#""just a string""#);
    let raw = format!("{}.{}.sig0", h, p);
    assert!(Token::parse(raw.as_bytes()).is_none());
}

#[test]
fn rejects_bad_base64() {
    assert!(Token::parse(b"eyJ%%%.eyJxx.sig").is_none());
}

#[test]
fn rejects_oversized_token() {
    let raw = encode_jwt(
        &json!({"alg": "none"}),
        &json!({"filler": "x".repeat(MAX_TOKEN_LEN)}),
    );
    assert!(raw.len() > MAX_TOKEN_LEN);
    assert!(Token::parse(raw.as_bytes()).is_none());
}

fn classify_any(token: &Token) -> Option<Secret> {
    let kind = if token.has_claim("scp") {
        AzureTokenKind::Access
    } else {
        AzureTokenKind::Identity
    };
    Some(Secret::AzureJwt(AzureToken {
        kind,
        raw: token.raw().to_string(),
    }))
}

#[test]
fn detector_reports_offset_of_token_start() {
    let raw = encode_jwt(&json!({"alg": "none"}), &json!({"sub": "u"}));
    let window = format!("Authorization: Bearer {}", raw);
    let det = JwtDetector::new("jwt", classify_any);
    let findings = det.detect(window.as_bytes());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].offset, 22);
}

#[test]
fn detector_skips_unparseable_candidates() {
    // shape matches but the sections are not JSON objects
    let det = JwtDetector::new("jwt", classify_any);
    assert!(det.detect(b"eyJaaaa.eyJbbbb.cccc").is_empty());
}

#[test]
fn classifier_decline_emits_nothing() {
    let raw = encode_jwt(&json!({"alg": "none"}), &json!({"sub": "u"}));
    let det = JwtDetector::new("jwt", |_| None);
    assert!(det.detect(raw.as_bytes()).is_empty());
}
