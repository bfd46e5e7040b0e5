// SPDX-License-Identifier: MIT

//! JWT session token tests.
//!
//! These tests verify that tokens created by the auth routes can be decoded
//! by the auth middleware, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use pinspire::middleware::auth::create_jwt;
use serde::{Deserialize, Serialize};

/// Claims structure that must match what the middleware expects.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let user_id = "0c9f5c1e-1111-4222-8333-444455556666";

    let token = create_jwt(user_id, signing_key).expect("Failed to create JWT");

    // Decode token (like middleware does)
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id);
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_rejected_with_wrong_key() {
    let token = create_jwt("some-user", b"signing_key_a_32_bytes_long!!!!!").unwrap();

    let key = DecodingKey::from_secret(b"signing_key_b_32_bytes_long!!!!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}

#[test]
fn test_jwt_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = create_jwt("some-user", signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Sessions last 24 hours
    assert!(
        token_data.claims.exp > now + 23 * 60 * 60,
        "Token expiration should be ~24 hours in the future"
    );
}
