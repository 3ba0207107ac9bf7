//! JWT validation tests. Tokens are minted locally with the same HS256
//! secret the server would use; no server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use marketplace_core::auth::jwt::{Claims, validate_token};
use marketplace_core::models::users::Roles;

const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn claims(sub: &str, exp_offset: i64, role: Option<&str>) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: sub.to_string(),
        exp: (now + exp_offset) as usize,
        iat: Some(now as usize),
        email: Some("alice@example.com".to_string()),
        name: Some("Alice Smith".to_string()),
        role: role.map(str::to_string),
    }
}

fn mint(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint(&claims(&user_id.to_string(), 3600, Some("freelancer")), TEST_SECRET);

    let decoded = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(decoded.user_id().unwrap(), user_id);
    assert_eq!(decoded.email.as_deref(), Some("alice@example.com"));
    assert_eq!(decoded.name.as_deref(), Some("Alice Smith"));
    assert_eq!(decoded.role(), Roles::Freelancer);
}

#[test]
fn test_expired_token_is_rejected() {
    // Well past the 60s default leeway.
    let token = mint(&claims(&Uuid::new_v4().to_string(), -300, None), TEST_SECRET);

    let result = validate_token(&token, TEST_SECRET);
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint(&claims(&Uuid::new_v4().to_string(), 3600, None), TEST_SECRET);

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(validate_token("not.a.valid.jwt", TEST_SECRET).is_err());
}

#[test]
fn test_non_uuid_subject_is_rejected() {
    let token = mint(&claims("not-a-uuid", 3600, None), TEST_SECRET);
    let decoded = validate_token(&token, TEST_SECRET).unwrap();
    assert!(decoded.user_id().is_err());
}

#[test]
fn test_missing_or_unknown_role_defaults_to_client() {
    let sub = Uuid::new_v4().to_string();
    assert_eq!(claims(&sub, 60, None).role(), Roles::Client);
    assert_eq!(claims(&sub, 60, Some("superuser")).role(), Roles::Client);
    assert_eq!(claims(&sub, 60, Some("admin")).role(), Roles::Admin);
}
