// SPDX-License-Identifier: MIT

//! JWT authentication tests.
//!
//! These verify that tokens minted with the shared signing key decode to
//! the claims shape the auth middleware expects, catching compatibility
//! drift with the identity service early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use satquest_api::middleware::auth::{create_jwt, Claims};

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("user-abc123", signing_key).expect("Failed to create JWT");

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let decoded = decode::<Claims>(&token, &key, &validation).expect("Failed to decode JWT");

    assert_eq!(decoded.claims.sub, "user-abc123");
    assert!(decoded.claims.exp > decoded.claims.iat);
}

#[test]
fn test_jwt_wrong_key_rejected() {
    let token = create_jwt("user-abc123", b"test_signing_key_32_bytes_long!!")
        .expect("Failed to create JWT");

    let key = DecodingKey::from_secret(b"a_completely_different_key_here!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
