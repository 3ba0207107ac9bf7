use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::users::Roles;

/// Claims carried by the marketplace's HS256 access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's UUID.
    pub sub: String,
    /// Expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// `client`, `freelancer` or `admin`. Absent means client.
    pub role: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }

    /// Role granted to a user created from this token.
    pub fn role(&self) -> Roles {
        match self.role.as_deref() {
            Some("admin") => Roles::Admin,
            Some("freelancer") => Roles::Freelancer,
            _ => Roles::Client,
        }
    }
}

/// Validate an HS256 token and return its claims. Errors carry the
/// `jsonwebtoken` error kind, e.g. `ExpiredSignature`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| format!("{:?}", e.kind()))
}
