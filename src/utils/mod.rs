// utils/mod.rs
pub mod config;
pub mod error;
pub mod security;
pub mod validation;

// Ré-exports pour faciliter l'import
pub use config::Config;
pub use error::{AppError, Result};
pub use security::{
    bearer_token, generate_admin_token, hash_password, sha256_hash, sign_identity_token,
    verify_admin_token, verify_identity_token, verify_password, AdminClaims, IdentityClaims,
};
pub use validation::{
    validate_document_type, validate_file_size, validate_filename, validate_image_urls,
    validate_postal_code, validate_siret,
};
