use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::bytes::Regex;
use std::sync::LazyLock;

use crate::detect::{Detector, RawFinding};
use crate::secret::{PrivateKeyMaterial, Secret};

/// Upper bound on a single key, PEM armor included.
pub const MAX_KEY_BYTES: usize = 1_310_720; // 1.25 MiB

/// BEGIN markers for the labels we recognize. Encrypted keys are excluded:
/// we never decrypt, and an encrypted block proves nothing structurally.
static BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-----BEGIN ((?:RSA|EC|DSA|ED25519|OPENSSH) )?PRIVATE KEY-----")
        .expect("PEM begin pattern is valid")
});

/// How the captured block must be checked before it may be emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BodyCheck {
    Pkcs1,
    Pkcs8,
    Sec1,
    /// Framing alone suffices; the body is not decoded.
    FramingOnly,
}

fn body_check(label: &str) -> BodyCheck {
    match label {
        "RSA PRIVATE KEY" => BodyCheck::Pkcs1,
        "PRIVATE KEY" => BodyCheck::Pkcs8,
        "EC PRIVATE KEY" => BodyCheck::Sec1,
        _ => BodyCheck::FramingOnly, // DSA, ED25519, OPENSSH
    }
}

/// Detects private keys in PEM armor and in raw DER.
///
/// PEM blocks are located by their BEGIN/END framing; for PKCS#1, PKCS#8 and
/// SEC1 labels the base64 body must additionally survive an ASN.1 decode.
/// A window whose first byte opens an ASN.1 SEQUENCE is also tried as bare
/// DER (PKCS#8, then PKCS#1, then SEC1).
pub struct PrivateKeyDetector;

impl PrivateKeyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrivateKeyDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < from + needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Length of the outermost ASN.1 TLV starting at `bytes[0]`, header
/// included, if the definite-length header is well-formed and the content
/// fits in the buffer.
fn der_tlv_len(bytes: &[u8]) -> Option<usize> {
    let first_len_byte = *bytes.get(1)?;
    let (header, content) = match first_len_byte {
        n @ 0x00..=0x7f => (2, n as usize),
        0x81 => (3, *bytes.get(2)? as usize),
        0x82 => (4, u16::from_be_bytes([*bytes.get(2)?, *bytes.get(3)?]) as usize),
        0x83 => (
            5,
            u32::from_be_bytes([0, *bytes.get(2)?, *bytes.get(3)?, *bytes.get(4)?]) as usize,
        ),
        _ => return None, // indefinite or implausibly large
    };
    let total = header + content;
    (total <= bytes.len()).then_some(total)
}

fn parses_as_private_key_der(der: &[u8]) -> bool {
    pkcs8::PrivateKeyInfo::try_from(der).is_ok()
        || pkcs1::RsaPrivateKey::try_from(der).is_ok()
        || sec1::EcPrivateKey::try_from(der).is_ok()
}

fn decode_pem_body(body: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(&compact).ok()
}

impl Detector for PrivateKeyDetector {
    fn name(&self) -> &'static str {
        "private_key"
    }

    fn max_len(&self) -> usize {
        MAX_KEY_BYTES
    }

    fn prefixes(&self) -> &[&'static [u8]] {
        // DER has no literal prefix worth filtering on (0x30 is ubiquitous),
        // so this detector runs on every window.
        &[]
    }

    fn detect(&self, window: &[u8]) -> Vec<RawFinding> {
        let mut findings = Vec::new();

        // Bare DER at the window start.
        if window.first() == Some(&0x30) {
            if let Some(len) = der_tlv_len(&window[..window.len().min(MAX_KEY_BYTES)]) {
                let der = &window[..len];
                if parses_as_private_key_der(der) {
                    findings.push(RawFinding {
                        secret: Secret::PrivateKey(PrivateKeyMaterial::Der(der.to_vec())),
                        offset: 0,
                    });
                }
            }
        }

        for begin in BEGIN_RE.find_iter(window) {
            let label_prefix = begin
                .as_bytes()
                .strip_prefix(b"-----BEGIN ")
                .and_then(|rest| rest.strip_suffix(b"-----"))
                .unwrap_or_default();
            let label = String::from_utf8_lossy(label_prefix).into_owned();
            let end_marker = format!("-----END {}-----", label);

            let search_to = window.len().min(begin.start() + MAX_KEY_BYTES);
            let Some(end_at) =
                find_subslice(&window[..search_to], end_marker.as_bytes(), begin.end())
            else {
                continue;
            };
            let block_end = end_at + end_marker.len();

            let accepted = match body_check(&label) {
                BodyCheck::FramingOnly => true,
                check => {
                    let body = &window[begin.end()..end_at];
                    match decode_pem_body(body) {
                        Some(der) => match check {
                            BodyCheck::Pkcs1 => pkcs1::RsaPrivateKey::try_from(&der[..]).is_ok(),
                            BodyCheck::Pkcs8 => pkcs8::PrivateKeyInfo::try_from(&der[..]).is_ok(),
                            BodyCheck::Sec1 => sec1::EcPrivateKey::try_from(&der[..]).is_ok(),
                            BodyCheck::FramingOnly => true,
                        },
                        None => false,
                    }
                }
            };
            if !accepted {
                continue;
            }

            let block = String::from_utf8_lossy(&window[begin.start()..block_end]).into_owned();
            findings.push(RawFinding {
                secret: Secret::PrivateKey(PrivateKeyMaterial::Pem { label, block }),
                offset: begin.start(),
            });
        }

        findings
    }
}

#[cfg(test)]
mod tests;
