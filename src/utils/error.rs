// utils/error.rs
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Erreurs d'authentification
    #[error("Authentication failed")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    // Erreurs de ressources
    #[error("User not found")]
    UserNotFound,

    #[error("Vehicle not found")]
    VehicleNotFound,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Erreurs de données
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    // Erreurs de fichiers
    #[error("File too large")]
    FileTooLarge,

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    // Erreurs de base de données
    #[error("Database error: {0}")]
    Database(String),

    // Erreurs de stockage
    #[error("Storage error: {0}")]
    StorageError(String),

    // Erreurs Redis
    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Code machine renvoyé au client avec le message
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::ParseError(_) => "BAD_REQUEST",
            AppError::Unauthorized
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::InvalidCredentials => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) | AppError::UserNotFound | AppError::VehicleNotFound => {
                "NOT_FOUND"
            }
            AppError::Conflict(_) => "CONFLICT",
            AppError::FileTooLarge => "PAYLOAD_TOO_LARGE",
            AppError::InvalidFileFormat(_) => "UNPROCESSABLE_ENTITY",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            // 400 - Bad Request
            AppError::Validation(_) | AppError::ParseError(_) => {
                HttpResponse::BadRequest().json(json!({
                    "error": self.to_string(),
                    "code": self.code()
                }))
            }

            // 401 - Unauthorized
            AppError::Unauthorized
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::InvalidCredentials => HttpResponse::Unauthorized().json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),

            // 403 - Forbidden
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),

            // 404 - Not Found
            AppError::NotFound(_) | AppError::UserNotFound | AppError::VehicleNotFound => {
                HttpResponse::NotFound().json(json!({
                    "error": self.to_string(),
                    "code": self.code()
                }))
            }

            // 409 - Conflict
            AppError::Conflict(_) => HttpResponse::Conflict().json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),

            // 413 - Payload Too Large
            AppError::FileTooLarge => HttpResponse::PayloadTooLarge().json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),

            // 422 - Unprocessable Entity
            AppError::InvalidFileFormat(_) => HttpResponse::UnprocessableEntity().json(json!({
                "error": self.to_string(),
                "code": self.code()
            })),

            // 500 - Internal Server Error
            _ => {
                tracing::error!("Internal server error: {}", self);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error",
                    "code": self.code()
                }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializeError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::RedisError(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::Validation(format!("Multipart invalide: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let error_messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect();
        messages.sort();

        AppError::Validation(messages.join("; "))
    }
}

// Type de résultat standard
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidToken.error_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::VehicleNotFound.error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).error_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::FileTooLarge.error_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Database("boom".into()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_is_404() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
