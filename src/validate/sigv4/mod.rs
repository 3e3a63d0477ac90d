//! AWS Signature Version 4: canonical request, string-to-sign, signing-key
//! derivation, and the final `Authorization` header. Pure over its inputs —
//! the clock is the caller's, never read implicitly.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The request parts that participate in signing. Header values must be the
/// ones actually sent; query strings are expected pre-encoded.
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    /// `(name, value)` pairs for every signed header (host included).
    pub headers: &'a [(&'a str, String)],
    pub payload: &'a [u8],
}

pub struct Credentials<'a> {
    pub access_id: &'a str,
    pub secret_key: &'a str,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercased, trimmed, name-sorted canonical headers plus the signed-header
/// list derived from them.
fn canonical_headers(headers: &[(&str, String)]) -> (String, String) {
    let mut entries: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    entries.sort();
    let canonical = entries
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect::<String>();
    let signed = entries
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");
    (canonical, signed)
}

/// Query parameters sorted by name then value. Parameters are assumed to be
/// URI-encoded already (the STS call sends none; the reference vectors are
/// pre-encoded).
fn canonical_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let mut params: Vec<&str> = query.split('&').collect();
    params.sort();
    params.join("&")
}

/// Produce the `Authorization` header value for a SigV4-signed request.
pub fn sign(
    request: &SigningRequest<'_>,
    credentials: &Credentials<'_>,
    service: &str,
    region: &str,
    when: DateTime<Utc>,
) -> String {
    let amz_date = when.format("%Y%m%dT%H%M%SZ").to_string();
    let datestamp = when.format("%Y%m%d").to_string();

    let (canonical_hdrs, signed_headers) = canonical_headers(request.headers);
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        request.path,
        canonical_query(request.query),
        canonical_hdrs,
        signed_headers,
        sha256_hex(request.payload),
    );

    let scope = format!("{}/{}/{}/aws4_request", datestamp, region, service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes()),
    );

    let k_date = hmac_sha256(
        format!("AWS4{}", credentials.secret_key).as_bytes(),
        datestamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_id, scope, signed_headers, signature
    )
}

/// The `x-amz-date` value for a signing instant, for callers that must send
/// the same timestamp they sign with.
pub fn amz_date(when: DateTime<Utc>) -> String {
    when.format("%Y%m%dT%H%M%SZ").to_string()
}
