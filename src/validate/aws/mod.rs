use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::secret::Secret;
use crate::validate::sigv4::{self, Credentials, SigningRequest};
use crate::validate::{Validation, Validator};

const STS_BASE: &str = "https://sts.us-east-1.amazonaws.com";
const STS_REGION: &str = "us-east-1";
const STS_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";

/// Error code inside the STS XML error envelope.
static XML_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Code>([A-Za-z0-9.]+)</Code>").expect("code pattern is valid"));

/// Checks an access-id/secret pair by calling STS `GetCallerIdentity`.
///
/// 200 proves the pair signs correctly. `AccessDenied` also proves it — the
/// signature was verified before policy evaluation rejected the call.
/// `SignatureDoesNotMatch` proves the secret is wrong for the id.
pub struct StsValidator {
    client: Client,
    base: String,
    timeout: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl StsValidator {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            base: STS_BASE.to_string(),
            timeout,
            clock: Utc::now,
        }
    }

    /// Point at a different endpoint (mock transport) and/or freeze the
    /// signing clock.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    async fn check(&self, cancel: &CancellationToken, access_id: &str, secret: &str) -> Validation {
        let host = match reqwest::Url::parse(&self.base) {
            Ok(url) => match (url.host_str(), url.port()) {
                (Some(h), Some(p)) => format!("{}:{}", h, p),
                (Some(h), None) => h.to_string(),
                (None, _) => return Validation::failed(anyhow!("STS endpoint has no host")),
            },
            Err(e) => return Validation::failed(e),
        };

        let when = (self.clock)();
        let amz_date = sigv4::amz_date(when);
        let headers = vec![
            (
                "content-type",
                "application/x-www-form-urlencoded; charset=utf-8".to_string(),
            ),
            ("host", host.clone()),
            ("x-amz-date", amz_date.clone()),
        ];
        let authorization = sigv4::sign(
            &SigningRequest {
                method: "POST",
                path: "/",
                query: "",
                headers: &headers,
                payload: STS_BODY.as_bytes(),
            },
            &Credentials {
                access_id,
                secret_key: secret,
            },
            "sts",
            STS_REGION,
            when,
        );

        let round_trip = async {
            let response = self
                .client
                .post(format!("{}/", self.base))
                .header(
                    "content-type",
                    "application/x-www-form-urlencoded; charset=utf-8",
                )
                .header("x-amz-date", amz_date)
                .header("authorization", authorization)
                .body(STS_BODY)
                .timeout(self.timeout)
                .send()
                .await?;
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

        debug!(status = status.as_u16(), "sts response");
        if status.is_success() {
            return Validation::Valid;
        }
        match XML_CODE_RE
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        {
            Some("SignatureDoesNotMatch") => Validation::Invalid,
            Some("AccessDenied") => Validation::Valid,
            Some(code) => Validation::Failed(anyhow!(
                "unexpected STS error code '{}' (status {})",
                code,
                status
            )),
            None => Validation::Failed(anyhow!("unclassifiable STS response, status {}", status)),
        }
    }
}

#[async_trait]
impl Validator for StsValidator {
    async fn validate(&self, cancel: &CancellationToken, secret: &Secret) -> Validation {
        match secret {
            Secret::Aws(c) => self.check(cancel, &c.access_id, &c.secret).await,
            other => Validation::Failed(anyhow!(
                "sts validator cannot handle {}",
                other.label()
            )),
        }
    }
}

#[cfg(test)]
mod tests;
