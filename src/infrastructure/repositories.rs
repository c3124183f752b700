//! Contrats de persistance.
//!
//! Chaque entité a son repository ; les implémentations Postgres vivent dans
//! `database`, l'implémentation mémoire dans `memory`. Les écritures sont des
//! remplacements complets (dernier écrit gagnant).

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    ListingStatus, Message, ProfessionalAccount, SavedSearch, User, Vehicle,
    VerificationDocument, VerificationStatus,
};
use crate::utils::error::Result;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Annonces approuvées, actives et non supprimées
    async fn list_public(&self) -> Result<Vec<Vehicle>>;
    /// Annonces non supprimées d'un propriétaire
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Vehicle>>;
    /// Annonces non supprimées, filtrées par statut de modération
    async fn list_all(&self, status: Option<ListingStatus>) -> Result<Vec<Vehicle>>;
    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>>;
    async fn get(&self, id: Uuid) -> Result<Option<Vehicle>>;
    async fn insert(&self, vehicle: &Vehicle) -> Result<()>;
    async fn update(&self, vehicle: &Vehicle) -> Result<()>;
    async fn increment_views(&self, id: Uuid) -> Result<()>;
    async fn adjust_favorites(&self, id: Uuid, delta: i32) -> Result<()>;
    /// Désactive toutes les annonces d'un utilisateur, renvoie le nombre touché
    async fn deactivate_owner_listings(&self, user_id: Uuid) -> Result<u64>;
    async fn count_deleted(&self) -> Result<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>>;
    /// Insertion ou remplacement
    async fn save(&self, user: &User) -> Result<()>;
    /// Recherche par email ou nom (sous-chaîne, insensible à la casse)
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Identifiants des annonces favorites, les plus récentes d'abord
    async fn list_vehicle_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
    /// Vrai si la relation a été créée
    async fn add(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool>;
    /// Vrai si la relation existait
    async fn remove(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SavedSearchRepository: Send + Sync {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SavedSearch>>;
    async fn list_alerting(&self) -> Result<Vec<SavedSearch>>;
    async fn get(&self, id: Uuid) -> Result<Option<SavedSearch>>;
    async fn save(&self, search: &SavedSearch) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<()>;
    /// Messages envoyés ou reçus par l'utilisateur, du plus ancien au plus récent
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>>;
    async fn mark_thread_read(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<u64>;
    async fn count_unread(&self, user_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ProfessionalAccount>>;
    async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalAccount>>;
    async fn save(&self, account: &ProfessionalAccount) -> Result<()>;
    async fn list(&self, status: Option<VerificationStatus>) -> Result<Vec<ProfessionalAccount>>;
    async fn add_document(&self, document: &VerificationDocument) -> Result<()>;
    async fn list_documents(&self, account_id: Uuid) -> Result<Vec<VerificationDocument>>;
    async fn get_document(&self, id: Uuid) -> Result<Option<VerificationDocument>>;
}

/// Ensemble des repositories injectés dans les services
#[derive(Clone)]
pub struct Repositories {
    pub vehicles: Arc<dyn VehicleRepository>,
    pub users: Arc<dyn UserRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub saved_searches: Arc<dyn SavedSearchRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub professionals: Arc<dyn ProfessionalRepository>,
}

impl Repositories {
    /// Repositories adossés à Postgres
    pub fn postgres(db: &super::database::Database) -> Self {
        use super::database::{
            PgFavoriteRepository, PgMessageRepository, PgProfessionalRepository,
            PgSavedSearchRepository, PgUserRepository, PgVehicleRepository,
        };

        Self {
            vehicles: Arc::new(PgVehicleRepository::new(db.pool.clone())),
            users: Arc::new(PgUserRepository::new(db.pool.clone())),
            favorites: Arc::new(PgFavoriteRepository::new(db.pool.clone())),
            saved_searches: Arc::new(PgSavedSearchRepository::new(db.pool.clone())),
            messages: Arc::new(PgMessageRepository::new(db.pool.clone())),
            professionals: Arc::new(PgProfessionalRepository::new(db.pool.clone())),
        }
    }

    /// Repositories en mémoire, partagés par un même magasin
    pub fn in_memory() -> Self {
        let store = Arc::new(super::memory::MemoryStore::default());

        Self {
            vehicles: store.clone(),
            users: store.clone(),
            favorites: store.clone(),
            saved_searches: store.clone(),
            messages: store.clone(),
            professionals: store,
        }
    }
}
