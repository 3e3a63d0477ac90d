use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use regex::bytes::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::detect::{Detector, RawFinding};
use crate::secret::Secret;

/// Compact-serialization JWTs are bounded by HTTP header budgets; candidates
/// longer than this are rejected without decoding.
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

/// Candidate shape: three dot-separated base64url sections where the first
/// two begin with `eyJ` (the encoding of `{"`). Structural validation of the
/// decoded JSON happens in [`Token::parse`].
static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"eyJ[A-Za-z0-9_-]+\.eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+")
        .expect("JWT candidate pattern is valid")
});

/// A structurally-valid JWT: decoded header and payload objects, the opaque
/// signature section, and the original raw span. Claim access exposes read
/// copies only; no semantic interpretation happens here.
#[derive(Debug, Clone)]
pub struct Token {
    header: Map<String, Value>,
    payload: Map<String, Value>,
    signature: String,
    raw: String,
}

impl Token {
    /// Parse a candidate span. Both the header and payload sections must
    /// base64url-decode (unpadded) into JSON objects.
    pub fn parse(raw: &[u8]) -> Option<Token> {
        if raw.len() > MAX_TOKEN_LEN {
            return None;
        }
        let raw = std::str::from_utf8(raw).ok()?;
        let mut sections = raw.splitn(3, '.');
        let header = decode_json_object(sections.next()?)?;
        let payload = decode_json_object(sections.next()?)?;
        let signature = sections.next()?.to_string();
        Some(Token {
            header,
            payload,
            signature,
            raw: raw.to_string(),
        })
    }

    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Payload claim as a string, if present and a string.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    pub fn has_claim(&self, name: &str) -> bool {
        self.payload.contains_key(name)
    }
}

fn decode_json_object(section: &str) -> Option<Map<String, Value>> {
    let bytes = URL_SAFE_NO_PAD.decode(section).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Locates structurally-valid JWTs and hands each to a classifier that turns
/// interesting tokens into typed secrets. Tokens the classifier declines are
/// silently skipped.
pub struct JwtDetector {
    name: &'static str,
    classify: fn(&Token) -> Option<Secret>,
}

impl JwtDetector {
    pub fn new(name: &'static str, classify: fn(&Token) -> Option<Secret>) -> Self {
        Self { name, classify }
    }
}

impl Detector for JwtDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn max_len(&self) -> usize {
        MAX_TOKEN_LEN
    }

    fn prefixes(&self) -> &[&'static [u8]] {
        const PREFIXES: &[&[u8]] = &[b"eyJ"];
        PREFIXES
    }

    fn detect(&self, window: &[u8]) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        for m in CANDIDATE_RE.find_iter(window) {
            if m.len() > MAX_TOKEN_LEN {
                continue;
            }
            let Some(token) = Token::parse(m.as_bytes()) else {
                continue;
            };
            if let Some(secret) = (self.classify)(&token) {
                findings.push(RawFinding {
                    secret,
                    offset: m.start(),
                });
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests;
