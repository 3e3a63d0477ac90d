use serde::Serialize;
use url::Url;

/// The closed set of secret families produced by the simple-token and pair
/// detectors. Families map 1:1 onto catalogue entries; validators are keyed
/// by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretFamily {
    AnthropicModel,
    AnthropicWorkspace,
    OpenAi,
    GrokXaiApi,
    GrokXaiManagement,
    PostmanApiKey,
    PostmanCollectionToken,
    #[serde(rename = "huggingface")]
    HuggingFace,
    Perplexity,
    RubyGems,
    DigitalOcean,
    DockerHubPat,
    StripeSecret,
    StripeRestricted,
    AzureStorageAccountKey,
    TinkKeyset,
    GcpServiceAccountKey,
    DenoUser,
    DenoOrg,
}

impl SecretFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretFamily::AnthropicModel => "anthropic_model",
            SecretFamily::AnthropicWorkspace => "anthropic_workspace",
            SecretFamily::OpenAi => "openai",
            SecretFamily::GrokXaiApi => "grok_xai_api",
            SecretFamily::GrokXaiManagement => "grok_xai_management",
            SecretFamily::PostmanApiKey => "postman_api_key",
            SecretFamily::PostmanCollectionToken => "postman_collection_token",
            SecretFamily::HuggingFace => "huggingface",
            SecretFamily::Perplexity => "perplexity",
            SecretFamily::RubyGems => "rubygems",
            SecretFamily::DigitalOcean => "digitalocean",
            SecretFamily::DockerHubPat => "dockerhub_pat",
            SecretFamily::StripeSecret => "stripe_secret",
            SecretFamily::StripeRestricted => "stripe_restricted",
            SecretFamily::AzureStorageAccountKey => "azure_storage_account_key",
            SecretFamily::TinkKeyset => "tink_keyset",
            SecretFamily::GcpServiceAccountKey => "gcp_service_account_key",
            SecretFamily::DenoUser => "deno_user",
            SecretFamily::DenoOrg => "deno_org",
        }
    }
}

impl std::fmt::Display for SecretFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque single-string credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleKey {
    pub family: SecretFamily,
    pub key: String,
}

/// An access-key-id / secret-access-key pair correlated by proximity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsCredentials {
    pub access_id: String,
    pub secret: String,
}

/// Which Azure token shape a JWT was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AzureTokenKind {
    /// Delegated access token: the payload carries an `scp` claim.
    Access,
    /// Identity token: Azure issuer, no `scp` claim.
    Identity,
}

/// A JWT issued by an Azure AD tenant, kept as the raw compact serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AzureToken {
    pub kind: AzureTokenKind,
    pub raw: String,
}

/// Private-key material, either a located PEM block or raw DER bytes.
/// Structural validity was established at detection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateKeyMaterial {
    Pem { label: String, block: String },
    Der(Vec<u8>),
}

/// A URL embedding `user:pass` credentials. The scheme (http/https/ftp/sftp)
/// selects the validator transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicAuthUrl {
    pub url: Url,
}

/// A typed secret finding. Variants carry only the fields needed to validate
/// the credential and report it downstream; values are immutable and never
/// redacted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Secret {
    Simple(SimpleKey),
    Aws(AwsCredentials),
    AzureJwt(AzureToken),
    PrivateKey(PrivateKeyMaterial),
    BasicAuth(BasicAuthUrl),
}

impl Secret {
    pub fn simple(family: SecretFamily, key: impl Into<String>) -> Self {
        Secret::Simple(SimpleKey {
            family,
            key: key.into(),
        })
    }

    /// Stable label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Secret::Simple(k) => k.family.as_str(),
            Secret::Aws(_) => "aws_credentials",
            Secret::AzureJwt(t) => match t.kind {
                AzureTokenKind::Access => "azure_access_token",
                AzureTokenKind::Identity => "azure_identity_token",
            },
            Secret::PrivateKey(_) => "private_key",
            Secret::BasicAuth(_) => "basic_auth_url",
        }
    }
}

/// One engine emission: a typed secret plus its absolute stream offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub secret: Secret,
    pub offset: u64,
}
