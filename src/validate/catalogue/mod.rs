//! Default validator registry: the per-family HTTP descriptors (endpoints,
//! methods, secret-carrying headers, code sets, body refinements) plus the
//! compound validators for AWS credentials and basic-auth URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::secret::{Secret, SecretFamily};
use crate::validate::http::{HttpValidator, HttpValidatorSpec};
use crate::validate::{BasicAuthValidator, StsValidator, Validation, Validator};

/// Placeholder ids used to elicit a predictable authorization error that
/// proves authentication succeeded without touching a real resource.
#[cfg(feature = "postman-collection")]
pub const DUMMY_COLLECTION_ID: &str = "ffffffff-dead-beef-0000-000000000000";
pub const DUMMY_TEAM_ID: &str = "ffffffff-dead-beef-0000-000000000000";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn anthropic_headers(key: &str) -> Vec<(&'static str, String)> {
    vec![
        ("x-api-key", key.to_string()),
        ("anthropic-version", "2023-06-01".to_string()),
    ]
}

fn x_api_key_header(key: &str) -> Vec<(&'static str, String)> {
    vec![("x-api-key", key.to_string())]
}

fn bearer_header(key: &str) -> Vec<(&'static str, String)> {
    vec![("authorization", format!("Bearer {}", key))]
}

/// Stripe authenticates with the key as the basic-auth username and an
/// empty password.
fn stripe_basic_header(key: &str) -> Vec<(&'static str, String)> {
    let encoded = STANDARD.encode(format!("{}:", key));
    vec![("authorization", format!("Basic {}", encoded))]
}

#[cfg(feature = "postman-collection")]
fn no_headers(_key: &str) -> Vec<(&'static str, String)> {
    Vec::new()
}

/// Postman collection access: a 403 against the dummy collection proves the
/// token authenticated iff the error is named `forbiddenError`.
#[cfg(feature = "postman-collection")]
fn postman_collection_classifier(status: StatusCode, body: &str) -> Option<Validation> {
    if status != StatusCode::FORBIDDEN {
        return None;
    }
    let name = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["name"].as_str().map(str::to_string));
    match name.as_deref() {
        Some("forbiddenError") => Some(Validation::Valid),
        _ => Some(Validation::Invalid),
    }
}

/// Grok API keys answer 200 for any well-formed key; the key state flags in
/// the body decide.
fn grok_api_classifier(status: StatusCode, body: &str) -> Option<Validation> {
    if status != StatusCode::OK {
        return None;
    }
    let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
        return Some(Validation::failed(anyhow::anyhow!(
            "unparseable xAI api-key response"
        )));
    };
    let blocked = v["api_key_blocked"].as_bool().unwrap_or(true);
    let disabled = v["api_key_disabled"].as_bool().unwrap_or(true);
    if !blocked && !disabled {
        Some(Validation::Valid)
    } else {
        Some(Validation::Invalid)
    }
}

/// Grok management keys return 403 code 7 when the key is live but the dummy
/// team is not accessible; any other 403 means a dead key.
fn grok_management_classifier(status: StatusCode, body: &str) -> Option<Validation> {
    if status != StatusCode::FORBIDDEN {
        return None;
    }
    let code = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["code"].as_i64());
    if code == Some(7) {
        Some(Validation::Valid)
    } else {
        Some(Validation::Invalid)
    }
}

fn specs() -> Vec<HttpValidatorSpec> {
    #[cfg_attr(not(feature = "postman-collection"), allow(unused_mut))]
    let mut specs = vec![
        HttpValidatorSpec {
            family: SecretFamily::AnthropicModel,
            method: Method::GET,
            base: "https://api.anthropic.com",
            endpoint: |base, _| format!("{}/v1/models", base),
            headers: anthropic_headers,
            valid_codes: &[200, 429],
            invalid_codes: &[401],
            body_classifier: None,
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::AnthropicWorkspace,
            method: Method::GET,
            base: "https://api.anthropic.com",
            endpoint: |base, _| format!("{}/v1/organizations/workspaces", base),
            headers: anthropic_headers,
            valid_codes: &[200, 429],
            invalid_codes: &[401],
            body_classifier: None,
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::PostmanApiKey,
            method: Method::GET,
            base: "https://api.getpostman.com",
            endpoint: |base, _| format!("{}/me", base),
            headers: x_api_key_header,
            valid_codes: &[200],
            invalid_codes: &[401],
            body_classifier: None,
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::GrokXaiApi,
            method: Method::GET,
            base: "https://api.x.ai",
            endpoint: |base, _| format!("{}/v1/api-key", base),
            headers: bearer_header,
            valid_codes: &[],
            invalid_codes: &[401],
            body_classifier: Some(grok_api_classifier),
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::GrokXaiManagement,
            method: Method::GET,
            base: "https://management-api.x.ai",
            endpoint: |base, _| format!("{}/auth/teams/{}/api-keys", base, DUMMY_TEAM_ID),
            headers: bearer_header,
            valid_codes: &[200],
            invalid_codes: &[401],
            body_classifier: Some(grok_management_classifier),
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::DenoUser,
            method: Method::GET,
            base: "https://api.deno.com",
            endpoint: |base, _| format!("{}/user", base),
            headers: bearer_header,
            valid_codes: &[200],
            invalid_codes: &[401],
            body_classifier: None,
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::DenoOrg,
            method: Method::GET,
            base: "https://api.deno.com",
            endpoint: |base, _| format!("{}/organization", base),
            headers: bearer_header,
            valid_codes: &[200],
            invalid_codes: &[401],
            body_classifier: None,
            otherwise_invalid: false,
        },
        HttpValidatorSpec {
            family: SecretFamily::StripeSecret,
            method: Method::GET,
            base: "https://api.stripe.com",
            endpoint: |base, _| format!("{}/v1/accounts", base),
            headers: stripe_basic_header,
            valid_codes: &[200],
            invalid_codes: &[],
            body_classifier: None,
            otherwise_invalid: true,
        },
        HttpValidatorSpec {
            family: SecretFamily::StripeRestricted,
            method: Method::GET,
            base: "https://api.stripe.com",
            endpoint: |base, _| format!("{}/v1/accounts", base),
            headers: stripe_basic_header,
            valid_codes: &[200, 403],
            invalid_codes: &[],
            body_classifier: None,
            otherwise_invalid: true,
        },
    ];

    #[cfg(feature = "postman-collection")]
    specs.push(HttpValidatorSpec {
        family: SecretFamily::PostmanCollectionToken,
        method: Method::GET,
        base: "https://api.postman.com",
        endpoint: |base, key| {
            format!(
                "{}/collections/{}?access_key={}",
                base, DUMMY_COLLECTION_ID, key
            )
        },
        headers: no_headers,
        valid_codes: &[200],
        invalid_codes: &[401],
        body_classifier: Some(postman_collection_classifier),
        otherwise_invalid: false,
    });

    specs
}

/// The default validator registry. Families without a registered validator
/// (Azure JWTs, private keys, and the detectors that exist only to surface
/// findings) report `None` from [`ValidatorSet::validate`].
pub struct ValidatorSet {
    http: HashMap<SecretFamily, HttpValidator>,
    aws: StsValidator,
    basic_auth: BasicAuthValidator,
}

impl ValidatorSet {
    pub fn with_defaults(client: Client) -> Self {
        Self::with_timeout(client, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(client: Client, timeout: Duration) -> Self {
        let http = specs()
            .into_iter()
            .map(|spec| {
                let family = spec.family;
                (family, HttpValidator::new(client.clone(), spec, timeout))
            })
            .collect();
        Self {
            http,
            aws: StsValidator::new(client.clone(), timeout),
            basic_auth: BasicAuthValidator::new(client, timeout),
        }
    }

    /// Route a secret to its family validator. `None` means no validator is
    /// registered for this variant.
    pub async fn validate(
        &self,
        cancel: &CancellationToken,
        secret: &Secret,
    ) -> Option<Validation> {
        match secret {
            Secret::Simple(k) => {
                let validator = self.http.get(&k.family)?;
                Some(validator.validate(cancel, secret).await)
            }
            Secret::Aws(_) => Some(self.aws.validate(cancel, secret).await),
            Secret::BasicAuth(_) => Some(self.basic_auth.validate(cancel, secret).await),
            Secret::AzureJwt(_) | Secret::PrivateKey(_) => None,
        }
    }

    pub fn http_validator(&self, family: SecretFamily) -> Option<&HttpValidator> {
        self.http.get(&family)
    }
}
