// core/saved_search_service.rs
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{NewSavedSearch, SavedSearch, SavedSearchUpdate, Vehicle};
use crate::infrastructure::repositories::SavedSearchRepository;
use crate::utils::error::{AppError, Result};

use super::vehicle_service::VehicleService;

pub struct SavedSearchService {
    searches: Arc<dyn SavedSearchRepository>,
    vehicles: Arc<VehicleService>,
}

impl SavedSearchService {
    pub fn new(searches: Arc<dyn SavedSearchRepository>, vehicles: Arc<VehicleService>) -> Self {
        Self { searches, vehicles }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<SavedSearch>> {
        self.searches.list_by_user(user_id).await
    }

    pub async fn create(&self, user_id: Uuid, request: NewSavedSearch) -> Result<SavedSearch> {
        let request = request.normalized();
        request.validate()?;

        let search = SavedSearch::new(user_id, request, Utc::now());
        self.searches.save(&search).await?;
        Ok(search)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, update: SavedSearchUpdate) -> Result<SavedSearch> {
        let update = update.normalized();
        update.validate()?;

        let mut search = self.owned(user_id, id).await?;
        search.apply(update, Utc::now());
        self.searches.save(&search).await?;
        Ok(search)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.owned(user_id, id).await?;
        self.searches.delete(id).await?;
        Ok(())
    }

    /// Exécute les filtres enregistrés sur le catalogue courant
    pub async fn results(&self, user_id: Uuid, id: Uuid) -> Result<Vec<Vehicle>> {
        let search = self.owned(user_id, id).await?;
        self.vehicles.search(&search.filters).await
    }

    /// Recherches avec alertes dont les filtres retiennent l'annonce
    pub async fn matching_alerts(&self, vehicle: &Vehicle) -> Result<Vec<SavedSearch>> {
        Ok(self
            .searches
            .list_alerting()
            .await?
            .into_iter()
            .filter(|s| s.user_id != vehicle.user_id && s.filters.matches(vehicle))
            .collect())
    }

    async fn owned(&self, user_id: Uuid, id: Uuid) -> Result<SavedSearch> {
        let search = self
            .searches
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recherche sauvegardée".to_string()))?;

        if search.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cette recherche ne vous appartient pas".to_string(),
            ));
        }
        Ok(search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::fixtures::content;
    use crate::domain::SearchFilters;
    use crate::infrastructure::{ListingCache, Repositories};
    use std::time::Duration;

    fn setup() -> (Repositories, SavedSearchService) {
        let repos = Repositories::in_memory();
        let vehicles = Arc::new(VehicleService::new(
            repos.vehicles.clone(),
            ListingCache::memory(Duration::from_secs(1)),
        ));
        let service = SavedSearchService::new(repos.saved_searches.clone(), vehicles);
        (repos, service)
    }

    fn request(name: &str, brand: &str, alerts: bool) -> NewSavedSearch {
        NewSavedSearch {
            name: name.into(),
            filters: SearchFilters {
                brand: Some(brand.into()),
                ..Default::default()
            },
            alerts_enabled: alerts,
        }
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let (_, service) = setup();
        let owner = Uuid::new_v4();

        assert!(matches!(
            service.create(owner, request("   ", "yamaha", true)).await,
            Err(AppError::Validation(_))
        ));

        let search = service.create(owner, request(" Trails ", "ktm", true)).await.unwrap();
        assert_eq!(search.name, "Trails");
        let blank = SavedSearchUpdate {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(owner, search.id, blank).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_owner_only() {
        let (_, service) = setup();
        let owner = Uuid::new_v4();
        let search = service.create(owner, request("Yamaha", "yamaha", true)).await.unwrap();

        assert!(matches!(
            service.delete(Uuid::new_v4(), search.id).await,
            Err(AppError::Forbidden(_))
        ));
        service.delete(owner, search.id).await.unwrap();
        assert!(service.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (_, service) = setup();
        assert!(matches!(
            service.create(Uuid::new_v4(), request("", "bmw", true)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_matching_alerts() {
        let (_, service) = setup();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        service.create(buyer, request("Yamaha", "Yamaha", true)).await.unwrap();
        service.create(buyer, request("Yamaha muette", "Yamaha", false)).await.unwrap();
        service.create(buyer, request("Honda", "Honda", true)).await.unwrap();
        service.create(seller, request("Mes Yamaha", "Yamaha", true)).await.unwrap();

        let mut c = content("Yamaha Tracer 9", 11000.0);
        c.brand = Some("YAMAHA".into());
        let vehicle = Vehicle::new(seller, c, Utc::now());

        let alerts = service.matching_alerts(&vehicle).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "Yamaha");
    }
}
