// utils/security.rs
use crate::utils::error::{AppError, Result};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

/// Claims des tokens émis par le fournisseur d'identité
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: Uuid,                 // User ID
    #[serde(default)]
    pub email: Option<String>,     // User email
    pub aud: String,               // Audience
    pub exp: usize,                // Expiration timestamp
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Claims du token de session admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,     // Email admin
    pub role: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

fn validation(audience: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AppError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    }
}

/// Vérifier un token du fournisseur d'identité
pub fn verify_identity_token(token: &str, secret: &str, audience: &str) -> Result<IdentityClaims> {
    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(audience),
    )
    .map(|data| data.claims)
    .map_err(map_jwt_error)
}

/// Signer des claims d'identité (tests et outils de développement)
pub fn sign_identity_token(claims: &IdentityClaims, secret: &str) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Configuration(format!("Signature du token impossible: {}", e)))
}

/// Générer un token de session admin
pub fn generate_admin_token(
    email: &str,
    secret: &str,
    audience: &str,
    ttl_hours: i64,
) -> Result<String> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::hours(ttl_hours);

    let claims = AdminClaims {
        sub: email.to_string(),
        role: ADMIN_ROLE.to_string(),
        aud: audience.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Configuration(format!("Signature du token impossible: {}", e)))
}

/// Vérifier un token de session admin
pub fn verify_admin_token(token: &str, secret: &str, audience: &str) -> Result<AdminClaims> {
    let claims = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(audience),
    )
    .map(|data| data.claims)
    .map_err(map_jwt_error)?;

    if claims.role != ADMIN_ROLE {
        return Err(AppError::Forbidden("Privilèges admin requis".to_string()));
    }

    Ok(claims)
}

/// Générer un hash de mot de passe avec Argon2
pub fn hash_password(password: &str) -> Result<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
        Argon2,
    };

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Configuration(e.to_string()))
}

/// Vérifier un mot de passe contre un hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    let argon2 = Argon2::default();
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Configuration(e.to_string()))?;

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Calculer un hash SHA256
pub fn sha256_hash(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Extraire le token d'un en-tête `Authorization: Bearer ...`
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-entropy-123456";
    const AUD: &str = "authenticated";

    fn claims(exp_offset: i64) -> IdentityClaims {
        IdentityClaims {
            sub: Uuid::new_v4(),
            email: Some("jean@example.com".into()),
            aud: AUD.into(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iat: None,
            role: Some("authenticated".into()),
        }
    }

    #[test]
    fn test_identity_token_roundtrip() {
        let original = claims(3600);
        let token = sign_identity_token(&original, SECRET).unwrap();
        let verified = verify_identity_token(&token, SECRET, AUD).unwrap();
        assert_eq!(verified.sub, original.sub);
        assert_eq!(verified.email.as_deref(), Some("jean@example.com"));
    }

    #[test]
    fn test_identity_token_wrong_secret() {
        let token = sign_identity_token(&claims(3600), SECRET).unwrap();
        assert!(matches!(
            verify_identity_token(&token, "another-secret", AUD),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_identity_token_expired() {
        let token = sign_identity_token(&claims(-3600), SECRET).unwrap();
        assert!(matches!(
            verify_identity_token(&token, SECRET, AUD),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_identity_token_is_not_an_admin_token() {
        let token = sign_identity_token(&claims(3600), SECRET).unwrap();
        assert!(verify_admin_token(&token, SECRET, AUD).is_err());
    }

    #[test]
    fn test_admin_token_roundtrip() {
        let token = generate_admin_token("admin@example.com", SECRET, AUD, 24).unwrap();
        let claims = verify_admin_token(&token, SECRET, AUD).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("motdepasse-solide").unwrap();
        assert!(verify_password("motdepasse-solide", &hash).unwrap());
        assert!(!verify_password("mauvais", &hash).unwrap());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            sha256_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
