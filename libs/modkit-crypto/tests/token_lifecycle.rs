#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use modkit_crypto::token::{HmacSealer, TokenCodec, TokenError, TokenService, UuidTokenService};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

fn service() -> UuidTokenService {
    let sealer = HmacSealer::new(b"0123456789abcdef0123456789abcdef").unwrap();
    UuidTokenService::uuid(TokenCodec::new(Arc::new(sealer)))
}

const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

#[test]
fn fresh_token_round_trips() {
    let service = service();
    for _ in 0..16 {
        let id = Uuid::new_v4();
        let token = service.create_token(&id, OffsetDateTime::now_utc() + Duration::seconds(30));
        assert_eq!(*service.unpack_token(&token).unwrap().payload(), id);
    }
}

#[test]
fn token_minted_in_the_past_is_expired() {
    let service = service();
    let token = service.create_token(
        &Uuid::new_v4(),
        OffsetDateTime::now_utc() - Duration::seconds(1),
    );
    assert_eq!(service.unpack_token(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn token_expires_while_waiting() {
    let service = service();
    let id = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
    let token = service.create_token(&id, OffsetDateTime::now_utc() + Duration::seconds(1));

    std::thread::sleep(StdDuration::from_millis(1_100));

    assert_eq!(service.unpack_token(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn any_single_character_change_is_detected() {
    let service = service();
    let id = Uuid::new_v4();
    let token = service.create_token(&id, OffsetDateTime::now_utc() + Duration::minutes(5));
    let bytes = token.as_bytes();

    for position in 0..bytes.len() {
        for &replacement in BASE64URL {
            if replacement == bytes[position] {
                continue;
            }
            let mut tampered = bytes.to_vec();
            tampered[position] = replacement;
            let tampered = String::from_utf8(tampered).unwrap();

            match service.unpack_token(&tampered) {
                Err(TokenError::Invalid(_)) => {}
                other => panic!("position {position}: expected Invalid, got {other:?}"),
            }
        }
    }
}

#[test]
fn truncated_and_garbage_tokens_are_invalid() {
    let service = service();
    let token = service.create_token(
        &Uuid::new_v4(),
        OffsetDateTime::now_utc() + Duration::minutes(5),
    );

    for candidate in [&token[..token.len() - 1], "", "not a token", "AAAA"] {
        assert!(
            matches!(service.unpack_token(candidate), Err(TokenError::Invalid(_))),
            "accepted {candidate:?}"
        );
    }
}

#[test]
fn public_message_is_generic() {
    assert_eq!(TokenError::PUBLIC_MESSAGE, "invalid token");
}
