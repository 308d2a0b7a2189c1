#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use http::request::Parts;
use http::{Method, Request};
use login_resolver_sdk::testutil::InMemoryKeyStore;
use login_resolver_sdk::{AttributeKey, FailureCause};
use modkit_crypto::signature::{
    AuthorizationHeader, SignatureError, SigningKey, canonical_prefix, sign_request,
};
use modkit_security::ContextError;
use signature_login_plugin::{
    KeySource, SignatureLoginConfig, SignatureLoginPlugin, SignedRequestError, SignedRequestFilter,
};

const PATH: &str = "/v1/devices/report";
const BODY: &[u8] = br#"{"temperature":21.5,"unit":"C"}"#;

#[derive(Debug, Clone, PartialEq)]
struct Report(String);

fn signer(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn signed_parts(key: &SigningKey, identifier: &str, body: &[u8]) -> Parts {
    let (mut parts, ()) = Request::builder()
        .method(Method::POST)
        .uri(PATH)
        .header("Host", "api.example.com")
        .header("Date", "Mon, 19 Oct 2026 10:00:00 GMT")
        .body(())
        .unwrap()
        .into_parts();

    let prefix = canonical_prefix(&Method::POST, PATH, &parts.headers, &["date", "host"]).unwrap();
    let signature = sign_request(key, &prefix, body).unwrap();
    parts.headers.insert(
        http::header::AUTHORIZATION,
        AuthorizationHeader::render("Signed", identifier, &signature)
            .parse()
            .unwrap(),
    );
    parts
}

fn registered(key: &SigningKey, identifier: &str) -> SignedRequestFilter<Report> {
    let keys = InMemoryKeyStore::new();
    keys.insert(identifier, key.verifying_key());
    SignedRequestFilter::new(SignatureLoginPlugin::new(
        SignatureLoginConfig::default(),
        Arc::new(keys),
    ))
}

fn self_disclosed(max_buffered_body: usize) -> SignedRequestFilter<Report> {
    SignedRequestFilter::new(SignatureLoginPlugin::new(
        SignatureLoginConfig {
            key_source: KeySource::SelfDisclosed,
            max_buffered_body,
            ..SignatureLoginConfig::default()
        },
        Arc::new(InMemoryKeyStore::new()),
    ))
}

#[tokio::test]
async fn registered_key_streams_body_and_verifies() {
    let key = signer(7);
    let filter = registered(&key, "device-7");
    let mut parts = signed_parts(&key, "device-7", BODY);

    filter.on_request(&mut parts).await.unwrap();
    let (head, tail) = BODY.split_at(10);
    filter.on_body_chunk(&mut parts.extensions, head).unwrap();
    filter.on_body_chunk(&mut parts.extensions, tail).unwrap();
    filter
        .on_payload(&mut parts.extensions, Report("21.5C".to_owned()), None)
        .unwrap();

    let (provider, payload) = filter.finish(&mut parts.extensions).unwrap();
    assert_eq!(payload, Some(Report("21.5C".to_owned())));
    assert_eq!(provider.provider_id(), "signature");

    let result = provider.login().await.unwrap();
    assert_eq!(result.user_id(), "device-7");
}

#[tokio::test]
async fn altered_body_fails_at_check_time() {
    let key = signer(8);
    let filter = registered(&key, "device-8");
    let mut parts = signed_parts(&key, "device-8", BODY);

    filter.on_request(&mut parts).await.unwrap();
    filter
        .on_body_chunk(&mut parts.extensions, br#"{"temperature":99.9,"unit":"C"}"#)
        .unwrap();

    let (provider, _) = filter.finish(&mut parts.extensions).unwrap();
    let err = provider.login().await.unwrap_err();
    assert_eq!(err.cause, FailureCause::Signature(SignatureError::Invalid));
    assert_eq!(err.identity, "device-8");
}

#[tokio::test]
async fn unknown_identifier_is_rejected_before_the_body() {
    let key = signer(9);
    let filter = registered(&key, "device-9");
    let mut parts = signed_parts(&key, "device-10", BODY);

    let err = filter.on_request(&mut parts).await.unwrap_err();
    assert_eq!(err.cause, FailureCause::AccountNotFound);
}

#[tokio::test]
async fn missing_required_header_is_rejected() {
    let key = signer(11);
    let filter = registered(&key, "device-11");
    let mut parts = signed_parts(&key, "device-11", BODY);
    parts.headers.remove("date");

    let err = filter.on_request(&mut parts).await.unwrap_err();
    assert!(matches!(
        err.cause,
        FailureCause::Signature(SignatureError::MissingHeader(_))
    ));
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let filter = registered(&signer(12), "device-12");
    let (mut parts, ()) = Request::builder()
        .uri(PATH)
        .body(())
        .unwrap()
        .into_parts();

    let err = filter.on_request(&mut parts).await.unwrap_err();
    assert!(matches!(
        err.cause,
        FailureCause::Signature(SignatureError::MissingHeader(_))
    ));
}

#[tokio::test]
async fn self_disclosed_key_becomes_the_identity() {
    let key = signer(13);
    let filter = self_disclosed(4096);
    let mut parts = signed_parts(&key, "sensor-a", BODY);

    filter.on_request(&mut parts).await.unwrap();
    filter.on_body_chunk(&mut parts.extensions, BODY).unwrap();
    filter
        .on_payload(
            &mut parts.extensions,
            Report("21.5C".to_owned()),
            Some(key.verifying_key()),
        )
        .unwrap();

    let (provider, _) = filter.finish(&mut parts.extensions).unwrap();
    let result = provider.login().await.unwrap();

    assert_eq!(result.user_id(), hex::encode(key.verifying_key().as_bytes()));
    assert_eq!(
        result.attributes().text(AttributeKey::Principal),
        Some("sensor-a")
    );
}

#[tokio::test]
async fn self_disclosed_key_from_another_signer_is_rejected() {
    let key = signer(14);
    let filter = self_disclosed(4096);
    let mut parts = signed_parts(&key, "sensor-b", BODY);

    filter.on_request(&mut parts).await.unwrap();
    filter.on_body_chunk(&mut parts.extensions, BODY).unwrap();
    filter
        .on_payload(
            &mut parts.extensions,
            Report("x".to_owned()),
            Some(signer(15).verifying_key()),
        )
        .unwrap();

    let (provider, _) = filter.finish(&mut parts.extensions).unwrap();
    let err = provider.login().await.unwrap_err();
    assert_eq!(err.cause, FailureCause::Signature(SignatureError::Invalid));
}

#[tokio::test]
async fn self_disclosed_without_key_is_missing_key() {
    let key = signer(16);
    let filter = self_disclosed(4096);
    let mut parts = signed_parts(&key, "sensor-c", BODY);

    filter.on_request(&mut parts).await.unwrap();
    filter.on_body_chunk(&mut parts.extensions, BODY).unwrap();

    let (provider, payload) = filter.finish(&mut parts.extensions).unwrap();
    assert_eq!(payload, None);
    let err = provider.login().await.unwrap_err();
    assert_eq!(err.cause, FailureCause::Signature(SignatureError::MissingKey));
}

#[tokio::test]
async fn oversized_self_disclosed_body_is_rejected() {
    let key = signer(17);
    let filter = self_disclosed(256);
    let big = vec![b'x'; 256];
    let mut parts = signed_parts(&key, "sensor-d", &big);

    filter.on_request(&mut parts).await.unwrap();
    let err = filter.on_body_chunk(&mut parts.extensions, &big).unwrap_err();
    assert!(matches!(
        err,
        SignedRequestError::Authentication(e)
            if e.cause == FailureCause::Signature(SignatureError::BodyTooLarge { limit: 256 })
    ));
}

#[test]
fn phases_without_header_phase_are_a_context_error() {
    let filter = registered(&signer(18), "device-18");
    let mut extensions = http::Extensions::new();

    assert!(matches!(
        filter.on_body_chunk(&mut extensions, BODY),
        Err(SignedRequestError::Context(ContextError::NotInstalled { .. }))
    ));
    assert!(filter.finish(&mut extensions).is_err());
}

#[tokio::test]
async fn finish_twice_is_a_context_error() {
    let key = signer(19);
    let filter = registered(&key, "device-19");
    let mut parts = signed_parts(&key, "device-19", BODY);

    filter.on_request(&mut parts).await.unwrap();
    filter.on_body_chunk(&mut parts.extensions, BODY).unwrap();
    assert!(filter.finish(&mut parts.extensions).is_ok());
    assert!(matches!(
        filter.finish(&mut parts.extensions),
        Err(ContextError::NotInstalled { .. })
    ));
}
