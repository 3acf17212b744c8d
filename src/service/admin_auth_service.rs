use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const JWT_ISSUER: &str = "resident-registry";
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub role: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

// One-way compare: both sides are digested before comparison, so the
// configured secret never participates in the comparison as plaintext.
pub fn verify_password(supplied: &str, configured: &str) -> bool {
    let supplied_digest = Sha256::digest(supplied.as_bytes());
    let configured_digest = Sha256::digest(configured.as_bytes());
    supplied_digest == configured_digest
}

pub fn issue_admin_token(
    admin_email: &str,
    jwt_secret: &str,
    ttl_seconds: i64,
) -> Result<(String, i64), String> {
    if ttl_seconds <= 0 {
        return Err("ADMIN_TOKEN_TTL_SECONDS must be positive".to_string());
    }
    let iat = Utc::now().timestamp();
    let exp = iat
        .checked_add(ttl_seconds)
        .ok_or_else(|| "invalid token expiration".to_string())?;
    let claims = AdminClaims {
        role: ADMIN_ROLE.to_string(),
        email: admin_email.to_string(),
        iat,
        exp,
        iss: JWT_ISSUER.to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("jwt issue failed: {e}"))?;
    Ok((token, exp))
}

pub fn verify_admin_token(token: &str, jwt_secret: &str) -> Result<AdminClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[JWT_ISSUER]);
    // A token with expiry E must be rejected at and after E.
    validation.leeway = 0;
    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("jwt verify failed: {e}"))?;
    // The library check is strict-less-than, which still accepts a token at
    // the exact expiry instant.
    if data.claims.exp <= Utc::now().timestamp() {
        return Err("jwt verify failed: token expired".to_string());
    }
    Ok(data.claims)
}
