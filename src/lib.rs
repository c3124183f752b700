// src/lib.rs
// Modules principaux
pub mod api;
pub mod client;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::{
    AdminService, ConversionService, FavoriteService, MessageService, SavedSearchService,
    UserService, VehicleService,
};
use crate::infrastructure::{Database, DocumentStorage, ListingCache, Repositories};
use crate::utils::config::StorageBackend;

// Ré-exports pour faciliter l'utilisation
pub use utils::{AppError, Config, Result};

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "PassionAuto2Roues";

/// État partagé par tous les handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<UserService>,
    pub vehicles: Arc<VehicleService>,
    pub favorites: Arc<FavoriteService>,
    pub saved_searches: Arc<SavedSearchService>,
    pub messages: Arc<MessageService>,
    pub conversion: Arc<ConversionService>,
    pub admin: Arc<AdminService>,
}

impl AppState {
    /// Construit l'état à partir de la configuration (base, cache, stockage)
    pub async fn build(config: Config) -> Result<Self> {
        let repositories = match config.storage_backend {
            StorageBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Configuration("DATABASE_URL manquante".to_string())
                })?;
                let db = Database::new(url, config.database_max_connections).await?;
                db.migrate().await?;
                Repositories::postgres(&db)
            }
            StorageBackend::Memory => {
                warn!("⚠️  Stockage en mémoire : les données seront perdues à l'arrêt");
                Repositories::in_memory()
            }
        };

        let ttl = Duration::from_secs(config.listing_cache_ttl_seconds);
        let cache = match &config.redis_url {
            Some(url) => match ListingCache::redis(url, ttl).await {
                Ok(cache) => cache,
                Err(e) => {
                    warn!("⚠️  Redis indisponible ({}), cache en mémoire", e);
                    ListingCache::memory(ttl)
                }
            },
            None => ListingCache::memory(ttl),
        };

        Self::with_repositories(config, repositories, cache)
    }

    /// Assemble les services autour de repositories déjà construits
    pub fn with_repositories(
        config: Config,
        repositories: Repositories,
        cache: ListingCache,
    ) -> Result<Self> {
        let storage = DocumentStorage::from_config(&config.document_storage);

        let vehicles = Arc::new(VehicleService::new(repositories.vehicles.clone(), cache));
        let saved_searches = Arc::new(SavedSearchService::new(
            repositories.saved_searches.clone(),
            vehicles.clone(),
        ));
        let admin = Arc::new(AdminService::new(
            repositories.users.clone(),
            repositories.vehicles.clone(),
            repositories.professionals.clone(),
            vehicles.clone(),
            saved_searches.clone(),
            storage.clone(),
            &config.admin_email,
            &config.admin_password,
            &config.jwt_secret,
            &config.jwt_audience,
            config.admin_session_hours,
        )?);

        let state = Self {
            users: Arc::new(UserService::new(
                repositories.users.clone(),
                repositories.professionals.clone(),
                repositories.vehicles.clone(),
            )),
            favorites: Arc::new(FavoriteService::new(
                repositories.favorites.clone(),
                repositories.vehicles.clone(),
            )),
            messages: Arc::new(MessageService::new(
                repositories.messages.clone(),
                repositories.users.clone(),
                repositories.vehicles.clone(),
            )),
            conversion: Arc::new(ConversionService::new(
                repositories.professionals.clone(),
                storage,
                config.max_document_size_bytes(),
            )),
            vehicles,
            saved_searches,
            admin,
            config: Arc::new(config),
        };
        info!("✅ Services initialisés");

        Ok(state)
    }

    /// État entièrement en mémoire (tests, démonstrations)
    pub fn in_memory(config: Config) -> Result<Self> {
        let ttl = Duration::from_secs(config.listing_cache_ttl_seconds);
        Self::with_repositories(config, Repositories::in_memory(), ListingCache::memory(ttl))
    }
}
