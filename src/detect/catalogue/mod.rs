//! The default detector registry: one entry per secret family, each an
//! instance of one of the primitives. Regexes are anchored by content (a
//! literal prefix plus a bounded character class) and every entry advertises
//! the `max_len` the engine sizes its overlap from.

use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use url::Url;

use crate::detect::jwt::{JwtDetector, Token};
use crate::detect::pair::PairDetector;
use crate::detect::private_key::PrivateKeyDetector;
use crate::detect::simple::{SimpleTokenDetector, utf8_key_ctor};
use crate::detect::Detector;
use crate::secret::{
    AwsCredentials, AzureToken, AzureTokenKind, BasicAuthUrl, Secret, SecretFamily,
};

/// Permitted Azure AD issuer forms: v2.0 tenant endpoint or the legacy
/// sts.windows.net form, each carrying a tenant GUID.
static AZURE_ISSUER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://(login\.microsoftonline\.com/[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}/v2\.0|sts\.windows\.net/[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}/?)$",
    )
    .expect("Azure issuer pattern is valid")
});

static HEX40_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-f]{40}").expect("hex pattern is valid"));

fn simple(
    family: SecretFamily,
    pattern: &str,
    max_len: usize,
    prefixes: Vec<&'static [u8]>,
) -> Result<Arc<dyn Detector>> {
    Ok(Arc::new(SimpleTokenDetector::new(
        family.as_str(),
        pattern,
        max_len,
        prefixes,
        utf8_key_ctor(family),
    )?))
}

/// Azure token classification: a permitted issuer is required, then the
/// presence of `scp` separates delegated access tokens from identity tokens.
fn classify_azure(token: &Token) -> Option<Secret> {
    let iss = token.claim_str("iss")?;
    if !AZURE_ISSUER_RE.is_match(iss) {
        return None;
    }
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

fn aws_pair_ctor(a: &[u8], b: &[u8]) -> Option<Secret> {
    Some(Secret::Aws(AwsCredentials {
        access_id: String::from_utf8(a.to_vec()).ok()?,
        secret: String::from_utf8(b.to_vec()).ok()?,
    }))
}

/// The pair ctor receives (keyword, key material); only the key survives.
fn azure_storage_ctor(_a: &[u8], b: &[u8]) -> Option<Secret> {
    let key = String::from_utf8(b.to_vec()).ok()?;
    Some(Secret::simple(SecretFamily::AzureStorageAccountKey, key))
}

/// GCP service-account JSON: the match is the `private_key_id` member; the
/// 40-hex id becomes the key.
fn gcp_sak_ctor(raw: &[u8]) -> Option<Secret> {
    let text = std::str::from_utf8(raw).ok()?;
    let id = HEX40_RE.find(text)?.as_str();
    Some(Secret::simple(SecretFamily::GcpServiceAccountKey, id))
}

fn basic_auth_ctor(raw: &[u8]) -> Option<Secret> {
    let text = std::str::from_utf8(raw).ok()?;
    let url = Url::parse(text).ok()?;
    if url.username().is_empty() || url.password().unwrap_or_default().is_empty() {
        return None;
    }
    if !matches!(url.scheme(), "http" | "https" | "ftp" | "sftp") {
        return None;
    }
    Some(Secret::BasicAuth(BasicAuthUrl { url }))
}

/// Build the full default detector list in registration order. Order is the
/// tie-break for findings at equal offsets, so simple token families come
/// first, then compound detectors.
pub fn default_detectors() -> Result<Vec<Arc<dyn Detector>>> {
    let mut detectors: Vec<Arc<dyn Detector>> = vec![
        simple(
            SecretFamily::AnthropicModel,
            r"sk-ant-api03-[A-Za-z0-9_\-]{16,150}",
            164,
            vec![b"sk-ant-api03-"],
        )?,
        simple(
            SecretFamily::AnthropicWorkspace,
            r"sk-ant-admin01-[A-Za-z0-9_\-]{16,150}",
            166,
            vec![b"sk-ant-admin01-"],
        )?,
        simple(
            SecretFamily::OpenAi,
            r"sk-(?:proj-|svcacct-|admin-)?[A-Za-z0-9_\-]{20,74}T3BlbkFJ[A-Za-z0-9_\-]{20,74}",
            170,
            vec![b"sk-"],
        )?,
        simple(
            SecretFamily::GrokXaiApi,
            r"xai-[A-Za-z0-9]{60,120}",
            124,
            vec![b"xai-"],
        )?,
        simple(
            SecretFamily::GrokXaiManagement,
            r"xai-token-[A-Za-z0-9]{60,96}",
            106,
            vec![b"xai-token-"],
        )?,
        simple(
            SecretFamily::PostmanApiKey,
            r"PMAK-[0-9a-f]{24}-[0-9a-f]{34}",
            64,
            vec![b"PMAK-"],
        )?,
        simple(
            SecretFamily::PostmanCollectionToken,
            r"PMAT-[0-9a-zA-Z]{26}",
            31,
            vec![b"PMAT-"],
        )?,
        simple(
            SecretFamily::HuggingFace,
            r"hf_[A-Za-z0-9]{34}",
            37,
            vec![b"hf_"],
        )?,
        simple(
            SecretFamily::Perplexity,
            r"pplx-[A-Za-z0-9]{48}",
            53,
            vec![b"pplx-"],
        )?,
        simple(
            SecretFamily::RubyGems,
            r"rubygems_[0-9a-f]{48}",
            57,
            vec![b"rubygems_"],
        )?,
        simple(
            SecretFamily::DigitalOcean,
            r"do[por]_v1_[0-9a-f]{64}",
            71,
            vec![b"dop_v1_", b"dor_v1_", b"doo_v1_"],
        )?,
        simple(
            SecretFamily::DockerHubPat,
            r"dckr_pat_[A-Za-z0-9_\-]{27}",
            36,
            vec![b"dckr_pat_"],
        )?,
        simple(
            SecretFamily::StripeSecret,
            r"sk_live_[0-9a-zA-Z]{24,99}",
            107,
            vec![b"sk_live_"],
        )?,
        simple(
            SecretFamily::StripeRestricted,
            r"rk_live_[0-9a-zA-Z]{24,99}",
            107,
            vec![b"rk_live_"],
        )?,
        simple(
            SecretFamily::TinkKeyset,
            r#""primaryKeyId"\s*:\s*[0-9]{1,20}"#,
            40,
            vec![br#""primaryKeyId""#],
        )?,
        simple(
            SecretFamily::DenoUser,
            r"ddp_[A-Za-z0-9]{36}",
            40,
            vec![b"ddp_"],
        )?,
        simple(
            SecretFamily::DenoOrg,
            r"ddo_[A-Za-z0-9]{36}",
            40,
            vec![b"ddo_"],
        )?,
    ];

    detectors.push(Arc::new(SimpleTokenDetector::new(
        SecretFamily::GcpServiceAccountKey.as_str(),
        r#""private_key_id"\s*:\s*"[0-9a-f]{40}""#,
        64,
        vec![br#""private_key_id""#],
        Box::new(gcp_sak_ctor),
    )?));

    detectors.push(Arc::new(SimpleTokenDetector::new(
        "basic_auth_url",
        r"(?i)\b(?:https?|ftp|sftp)://[^\s:/@]{1,64}:[^\s@]{1,128}@[a-z0-9][a-z0-9.\-]{0,252}(?::[0-9]{1,5})?",
        464,
        vec![],
        Box::new(basic_auth_ctor),
    )?));

    detectors.push(Arc::new(PairDetector::new(
        "aws_credentials",
        r"(AKIA|ASIA)[A-Z0-9]{16}",
        r"[A-Za-z0-9/+]{40}",
        40,
        10 * 1024,
        vec![b"AKIA", b"ASIA"],
        Box::new(aws_pair_ctor),
    )?));

    detectors.push(Arc::new(PairDetector::new(
        SecretFamily::AzureStorageAccountKey.as_str(),
        r"(?i)azure[a-z0-9_]*key|az storage|AccountKey",
        r"[A-Za-z0-9+/]{86}==",
        88,
        200,
        vec![],
        Box::new(azure_storage_ctor),
    )?));

    detectors.push(Arc::new(JwtDetector::new("azure_jwt", classify_azure)));
    detectors.push(Arc::new(PrivateKeyDetector::new()));

    Ok(detectors)
}

#[cfg(test)]
mod tests;
