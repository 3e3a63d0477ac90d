use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::secret::{Secret, SecretFamily};
use crate::validate::{Validation, Validator};

/// Builds the request URL from `(base, key)`. Fixed endpoints ignore the key;
/// derived endpoints (e.g. a token in a query parameter) embed it.
pub type EndpointFn = fn(&str, &str) -> String;

/// Header set carrying the secret, e.g. `x-api-key` or a bearer token.
pub type HeaderFn = fn(&str) -> Vec<(&'static str, String)>;

/// Consulted before the code sets; `Some` short-circuits classification.
/// Used to refine statuses whose meaning depends on the response body
/// (Postman's 403 error name, Grok's key-state flags).
pub type BodyClassifier = fn(StatusCode, &str) -> Option<Validation>;

/// Everything that distinguishes one simple HTTP validator from another.
/// One `HttpValidator` type driven by a descriptor replaces a type per
/// family.
#[derive(Clone)]
pub struct HttpValidatorSpec {
    pub family: SecretFamily,
    pub method: Method,
    pub base: &'static str,
    pub endpoint: EndpointFn,
    pub headers: HeaderFn,
    pub valid_codes: &'static [u16],
    pub invalid_codes: &'static [u16],
    pub body_classifier: Option<BodyClassifier>,
    /// When set, a status matching neither code set is `Invalid` instead of
    /// `Failed` (Stripe documents every non-success as a key problem).
    pub otherwise_invalid: bool,
}

/// Validates one secret family against its provider endpoint.
///
/// Classification: the body classifier (if any) is consulted first, then the
/// valid/invalid code sets, then the `otherwise_invalid` fallback; anything
/// left is `Failed` with a diagnostic.
pub struct HttpValidator {
    client: Client,
    spec: HttpValidatorSpec,
    base: String,
    timeout: Duration,
}

impl HttpValidator {
    pub fn new(client: Client, spec: HttpValidatorSpec, timeout: Duration) -> Self {
        let base = spec.base.to_string();
        Self {
            client,
            spec,
            base,
            timeout,
        }
    }

    /// Point the validator at a different host. Intended for tests driving a
    /// mock transport.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// A copy of this validator aimed at another host, for driving a shared
    /// registry entry against a mock transport.
    pub fn clone_for_base(&self, base: &str) -> HttpValidator {
        HttpValidator {
            client: self.client.clone(),
            spec: self.spec.clone(),
            base: base.to_string(),
            timeout: self.timeout,
        }
    }

    pub fn family(&self) -> SecretFamily {
        self.spec.family
    }

    /// One provider round-trip for a bare key string.
    pub async fn check_key(&self, cancel: &CancellationToken, key: &str) -> Validation {
        let url = (self.spec.endpoint)(&self.base, key);
        let mut request = self
            .client
            .request(self.spec.method.clone(), &url)
            .timeout(self.timeout);
        for (name, value) in (self.spec.headers)(key) {
            request = request.header(name, value);
        }

        let round_trip = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            () = cancel.cancelled() => {
                return Validation::failed(anyhow!("validation cancelled"));
            }
            result = round_trip => match result {
                Ok(pair) => pair,
                Err(e) => return Validation::failed(e),
            },
        };

        debug!(family = %self.spec.family, status = status.as_u16(), "validator response");
        self.classify(status, &body)
    }

    fn classify(&self, status: StatusCode, body: &str) -> Validation {
        if let Some(classifier) = self.spec.body_classifier {
            if let Some(outcome) = classifier(status, body) {
                return outcome;
            }
        }
        let code = status.as_u16();
        if self.spec.valid_codes.contains(&code) {
            return Validation::Valid;
        }
        if self.spec.invalid_codes.contains(&code) {
            return Validation::Invalid;
        }
        if self.spec.otherwise_invalid {
            return Validation::Invalid;
        }
        Validation::Failed(anyhow!(
            "unexpected status {} validating {} key",
            status,
            self.spec.family
        ))
    }
}

#[async_trait]
impl Validator for HttpValidator {
    async fn validate(&self, cancel: &CancellationToken, secret: &Secret) -> Validation {
        match secret {
            Secret::Simple(k) if k.family == self.spec.family => {
                self.check_key(cancel, &k.key).await
            }
            other => Validation::Failed(anyhow!(
                "{} validator cannot handle {}",
                self.spec.family,
                other.label()
            )),
        }
    }
}
