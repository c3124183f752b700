// utils/config.rs
use crate::utils::error::{AppError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Backend de persistance des entités
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Configuration(format!(
                "STORAGE_BACKEND inconnu: {} (postgres|memory)",
                other
            ))),
        }
    }
}

/// Emplacement des documents de vérification des comptes professionnels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStorageConfig {
    Local {
        root: PathBuf,
    },
    S3 {
        endpoint: String,
        access_key: String,
        secret_key: String,
        bucket: String,
        region: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environnement et serveur
    pub run_mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,
    pub log_level: String,
    pub log_format: String,
    pub frontend_url: Option<String>,

    // Base de données
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Sécurité
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_session_hours: i64,

    // Cache
    pub redis_url: Option<String>,
    pub listing_cache_ttl_seconds: u64,

    // Documents
    pub document_storage: DocumentStorageConfig,
    pub max_document_size_mb: u64,
}

impl Config {
    /// Charger la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self> {
        // Charger le fichier .env si présent
        let _ = dotenv().ok();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Charger la configuration depuis une source clé/valeur arbitraire
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| {
            AppError::Configuration("Variable d'environnement requise manquante: JWT_SECRET".into())
        })?;

        let storage_backend: StorageBackend = get("STORAGE_BACKEND", "postgres").parse()?;
        let database_url = lookup("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(AppError::Configuration(
                "Variable d'environnement requise manquante: DATABASE_URL".into(),
            ));
        }

        let document_storage = match get("DOCUMENT_STORAGE", "local").to_lowercase().as_str() {
            "local" => DocumentStorageConfig::Local {
                root: PathBuf::from(get("DOCUMENT_DIR", "./data/documents")),
            },
            "s3" => DocumentStorageConfig::S3 {
                endpoint: required(&lookup, "S3_ENDPOINT")?,
                access_key: required(&lookup, "S3_ACCESS_KEY")?,
                secret_key: required(&lookup, "S3_SECRET_KEY")?,
                bucket: required(&lookup, "S3_BUCKET")?,
                region: get("S3_REGION", "eu-west-3"),
            },
            other => {
                return Err(AppError::Configuration(format!(
                    "DOCUMENT_STORAGE inconnu: {} (local|s3)",
                    other
                )))
            }
        };

        Ok(Config {
            run_mode: get("RUN_MODE", "development"),
            server_host: get("SERVER_HOST", "0.0.0.0"),
            server_port: parse_var("SERVER_PORT", &get("SERVER_PORT", "8080"))?,
            workers: parse_var("WORKERS", &get("WORKERS", "4"))?,
            log_level: get("LOG_LEVEL", "info"),
            log_format: get("LOG_FORMAT", "json"),
            frontend_url: lookup("FRONTEND_URL"),

            storage_backend,
            database_url,
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                &get("DATABASE_MAX_CONNECTIONS", "20"),
            )?,

            jwt_secret,
            jwt_audience: get("JWT_AUDIENCE", "authenticated"),
            admin_email: get("ADMIN_EMAIL", "admin@passionauto2roues.com"),
            admin_password: get("ADMIN_PASSWORD", "change-me-admin"),
            admin_session_hours: parse_var(
                "ADMIN_SESSION_HOURS",
                &get("ADMIN_SESSION_HOURS", "24"),
            )?,

            redis_url: lookup("REDIS_URL"),
            listing_cache_ttl_seconds: parse_var(
                "LISTING_CACHE_TTL_SECONDS",
                &get("LISTING_CACHE_TTL_SECONDS", "120"),
            )?,

            document_storage,
            max_document_size_mb: parse_var(
                "MAX_DOCUMENT_SIZE_MB",
                &get("MAX_DOCUMENT_SIZE_MB", "10"),
            )?,
        })
    }

    /// Taille maximale d'un document en octets
    pub fn max_document_size_bytes(&self) -> u64 {
        self.max_document_size_mb * 1024 * 1024
    }

    pub fn is_production(&self) -> bool {
        self.run_mode == "production"
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| {
        AppError::Configuration(format!("Variable d'environnement requise manquante: {}", key))
    })
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Configuration(format!("{} invalide ({}): {}", key, raw, e)))
}
