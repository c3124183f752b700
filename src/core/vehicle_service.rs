// core/vehicle_service.rs
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    search, DeletionReason, DeletionRequest, PremiumPack, SearchFilters, User, Vehicle,
    VehicleContent,
};
use crate::infrastructure::cache::ListingCache;
use crate::infrastructure::repositories::VehicleRepository;
use crate::utils::error::{AppError, Result};

const CATALOG_KEY: &str = "vehicles:public";

/// Annonces : catalogue public et cycle de vie côté propriétaire
pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
    cache: ListingCache,
}

impl VehicleService {
    pub fn new(vehicles: Arc<dyn VehicleRepository>, cache: ListingCache) -> Self {
        Self { vehicles, cache }
    }

    /// Catalogue public complet, servi depuis le cache quand il est frais
    pub async fn catalog(&self) -> Result<Vec<Vehicle>> {
        match self.cache.get::<Vec<Vehicle>>(CATALOG_KEY).await {
            Ok(Some(vehicles)) => return Ok(vehicles),
            Ok(None) => {}
            Err(e) => warn!("⚠️  Cache catalogue indisponible: {}", e),
        }

        let vehicles = self.vehicles.list_public().await?;
        if let Err(e) = self.cache.set(CATALOG_KEY, &vehicles).await {
            warn!("⚠️  Écriture du cache catalogue impossible: {}", e);
        }
        Ok(vehicles)
    }

    /// À appeler après toute écriture sur une annonce
    pub async fn invalidate_catalog(&self) {
        if let Err(e) = self.cache.invalidate(CATALOG_KEY).await {
            warn!("⚠️  Invalidation du cache catalogue impossible: {}", e);
        }
    }

    /// Recherche dans le catalogue public
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Vehicle>> {
        let catalog = self.catalog().await?;
        Ok(search::apply(filters, catalog, Utc::now()))
    }

    /// Détail d'une annonce publique, compte une vue
    pub async fn get_public(&self, id: Uuid) -> Result<Vehicle> {
        let mut vehicle = self
            .vehicles
            .get(id)
            .await?
            .filter(Vehicle::is_public)
            .ok_or(AppError::VehicleNotFound)?;

        self.vehicles.increment_views(id).await?;
        vehicle.views += 1;
        Ok(vehicle)
    }

    /// Annonce non supprimée, quel que soit son statut
    pub async fn get(&self, id: Uuid) -> Result<Vehicle> {
        self.vehicles
            .get(id)
            .await?
            .filter(|v| !v.is_deleted())
            .ok_or(AppError::VehicleNotFound)
    }

    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<Vehicle>> {
        self.vehicles.list_by_owner(user_id).await
    }

    /// Crée une annonce en attente de modération
    pub async fn create(&self, owner: &User, content: VehicleContent) -> Result<Vehicle> {
        let content = content.normalized();
        content.validate()?;

        let vehicle = Vehicle::new(owner.id, content, Utc::now());
        self.vehicles.insert(&vehicle).await?;
        info!(vehicle_id = %vehicle.id, user_id = %owner.id, "🚗 Annonce créée, en attente de modération");

        Ok(vehicle)
    }

    pub async fn update(&self, owner: &User, id: Uuid, content: VehicleContent) -> Result<Vehicle> {
        let content = content.normalized();
        content.validate()?;

        let mut vehicle = self.owned(owner, id).await?;
        vehicle.apply_content(content, Utc::now());
        self.vehicles.update(&vehicle).await?;
        self.invalidate_catalog().await;

        Ok(vehicle)
    }

    pub async fn set_active(&self, owner: &User, id: Uuid, is_active: bool) -> Result<Vehicle> {
        let mut vehicle = self.owned(owner, id).await?;
        vehicle.is_active = is_active;
        vehicle.updated_at = Utc::now();
        self.vehicles.update(&vehicle).await?;
        self.invalidate_catalog().await;

        Ok(vehicle)
    }

    /// Suppression logique par le propriétaire
    pub async fn delete(&self, owner: &User, id: Uuid, request: DeletionRequest) -> Result<Vehicle> {
        request.validate()?;
        if request.reason == DeletionReason::Moderation {
            return Err(AppError::Validation(
                "Motif réservé à la modération".to_string(),
            ));
        }

        let mut vehicle = self.owned(owner, id).await?;
        vehicle.mark_deleted(request.reason, request.comment, Utc::now());
        self.vehicles.update(&vehicle).await?;
        self.invalidate_catalog().await;
        info!(vehicle_id = %id, reason = %request.reason, "🗑️  Annonce supprimée");

        Ok(vehicle)
    }

    /// Active ou prolonge un pack premium (paiement traité en amont)
    pub async fn activate_premium(&self, owner: &User, id: Uuid, pack: PremiumPack) -> Result<Vehicle> {
        let mut vehicle = self.owned(owner, id).await?;
        vehicle.activate_premium(pack, Utc::now());
        self.vehicles.update(&vehicle).await?;
        self.invalidate_catalog().await;
        info!(vehicle_id = %id, pack = %pack, "⭐ Pack premium activé");

        Ok(vehicle)
    }

    async fn owned(&self, owner: &User, id: Uuid) -> Result<Vehicle> {
        let vehicle = self.get(id).await?;
        if vehicle.user_id != owner.id {
            return Err(AppError::Forbidden(
                "Cette annonce ne vous appartient pas".to_string(),
            ));
        }
        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::fixtures::content;
    use crate::infrastructure::Repositories;
    use std::time::Duration;

    fn setup() -> (Repositories, VehicleService, User) {
        let repos = Repositories::in_memory();
        let service = VehicleService::new(
            repos.vehicles.clone(),
            ListingCache::memory(Duration::from_secs(120)),
        );
        let owner = User::from_identity(Uuid::new_v4(), "vendeur@example.com".into(), Utc::now());
        (repos, service, owner)
    }

    #[tokio::test]
    async fn test_new_listing_not_in_catalog_until_approved() {
        let (repos, service, owner) = setup();
        let mut vehicle = service.create(&owner, content("Honda CB500", 5200.0)).await.unwrap();
        assert!(service.catalog().await.unwrap().is_empty());

        vehicle.approve(Utc::now());
        repos.vehicles.update(&vehicle).await.unwrap();
        service.invalidate_catalog().await;
        assert_eq!(service.catalog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_is_cached_until_invalidated() {
        let (repos, service, owner) = setup();
        assert!(service.catalog().await.unwrap().is_empty());

        let mut vehicle = Vehicle::new(owner.id, content("BMW R1250GS", 17000.0), Utc::now());
        vehicle.approve(Utc::now());
        repos.vehicles.insert(&vehicle).await.unwrap();

        assert!(service.catalog().await.unwrap().is_empty());
        service.invalidate_catalog().await;
        assert_eq!(service.catalog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_only_owner_can_edit() {
        let (_, service, owner) = setup();
        let vehicle = service.create(&owner, content("Audi A3", 14000.0)).await.unwrap();
        let intruder = User::from_identity(Uuid::new_v4(), "x@example.com".into(), Utc::now());

        let result = service.update(&intruder, vehicle.id, content("Audi A3 S-line", 1.0)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_public_detail_counts_views() {
        let (repos, service, owner) = setup();
        let mut vehicle = Vehicle::new(owner.id, content("Ducati Monster", 9000.0), Utc::now());
        assert!(matches!(service.get_public(vehicle.id).await, Err(AppError::VehicleNotFound)));

        vehicle.approve(Utc::now());
        repos.vehicles.insert(&vehicle).await.unwrap();
        assert_eq!(service.get_public(vehicle.id).await.unwrap().views, 1);
        assert_eq!(service.get_public(vehicle.id).await.unwrap().views, 2);
    }

    #[tokio::test]
    async fn test_owner_cannot_use_moderation_reason() {
        let (_, service, owner) = setup();
        let vehicle = service.create(&owner, content("Scooter 50cc", 900.0)).await.unwrap();
        let request = DeletionRequest {
            reason: DeletionReason::Moderation,
            comment: None,
        };
        assert!(matches!(
            service.delete(&owner, vehicle.id, request).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_listing_disappears_from_owner_list() {
        let (_, service, owner) = setup();
        let vehicle = service.create(&owner, content("Remorque", 600.0)).await.unwrap();
        service
            .delete(
                &owner,
                vehicle.id,
                DeletionRequest {
                    reason: DeletionReason::SoldElsewhere,
                    comment: None,
                },
            )
            .await
            .unwrap();

        assert!(service.list_own(owner.id).await.unwrap().is_empty());
        assert!(matches!(service.get(vehicle.id).await, Err(AppError::VehicleNotFound)));
    }
}
