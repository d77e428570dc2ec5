//! Bearer token verification for back-office sessions.
//!
//! Admin sessions are HS256 JWTs minted by the marketplace identity
//! service. This server verifies the signature, the expiry and, when
//! `JWT_ISSUER` is set, the issuer. [`issue_token`] mints tokens for local
//! tooling and the integration tests.

use coachdesk_core::roles::ROLE_ADMIN;
use coachdesk_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime used when minting tokens locally.
const DEFAULT_TOKEN_TTL_MINS: i64 = 60;

/// Payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Marketplace user id.
    pub sub: DbId,
    /// `admin`, `coach` or `client`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub jti: String,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Token signing and verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// Lifetime of locally minted tokens.
    pub token_ttl_mins: i64,
    /// Expected `iss` claim; not checked when `None`.
    pub issuer: Option<String>,
}

impl JwtConfig {
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    /// | `JWT_ISSUER`             | no       | unset   |
    ///
    /// # Panics
    ///
    /// Panics on a missing or empty secret or a non-numeric expiry, so a
    /// misconfigured server never starts.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        let token_ttl_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number of minutes"),
            Err(_) => DEFAULT_TOKEN_TTL_MINS,
        };

        let issuer = std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty());

        Self {
            secret,
            token_ttl_mins,
            issuer,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Mint a session token for `user_id` with `role`.
pub fn issue_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.token_ttl_mins * 60,
        iat,
        iss: config.issuer.clone(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a session token and return its claims.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<Claims>(token, &key, &config.validation()).map(|data| data.claims)
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
