use super::*;
use crate::secret::AwsCredentials;
use chrono::TimeZone;
use wiremock::matchers::{body_string, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn frozen_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
}

fn credentials() -> Secret {
    Secret::Aws(AwsCredentials {
        access_id: "AKIA1984R439T439HTH4".into(),
        secret: "32r923jr023rk320rk2a3rkB34tj340r32Ckt433".into(),
    })
}

fn validator(base: &str) -> StsValidator {
    StsValidator::new(Client::new(), Duration::from_secs(5))
        .with_base_url(base)
        .with_clock(frozen_clock)
}

fn xml_error(code: &str) -> String {
    format!(
        "<ErrorResponse><Error><Type>Sender</Type><Code>{}</Code>\
         <Message>denied</Message></Error></ErrorResponse>",
        code
    )
}

#[tokio::test]
async fn success_is_valid_and_request_is_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string(STS_BODY))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<GetCallerIdentityResponse><Arn>arn:aws:iam::123:user/x</Arn></GetCallerIdentityResponse>",
        ))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let outcome = validator(&server.uri())
        .validate(&cancel, &credentials())
        .await;
    assert!(outcome.is_valid());
}

#[tokio::test]
async fn signature_mismatch_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(xml_error("SignatureDoesNotMatch")),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    assert!(validator(&server.uri())
        .validate(&cancel, &credentials())
        .await
        .is_invalid());
}

#[tokio::test]
async fn access_denied_proves_the_signature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string(xml_error("AccessDenied")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    assert!(validator(&server.uri())
        .validate(&cancel, &credentials())
        .await
        .is_valid());
}

#[tokio::test]
async fn other_error_codes_are_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(xml_error("InvalidAction")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    match validator(&server.uri())
        .validate(&cancel, &credentials())
        .await
    {
        Validation::Failed(cause) => assert!(cause.to_string().contains("InvalidAction")),
        other => panic!("expected failed, got {:?}", other),
    }
}

#[tokio::test]
async fn unclassifiable_body_is_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    assert!(validator(&server.uri())
        .validate(&cancel, &credentials())
        .await
        .is_failed());
}

#[tokio::test]
async fn cancellation_is_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(validator(&server.uri())
        .validate(&cancel, &credentials())
        .await
        .is_failed());
}

#[tokio::test]
async fn foreign_variant_is_failed() {
    let cancel = CancellationToken::new();
    let v = validator("http://127.0.0.1:1");
    let foreign = Secret::simple(crate::secret::SecretFamily::OpenAi, "sk-x");
    assert!(v.validate(&cancel, &foreign).await.is_failed());
}
