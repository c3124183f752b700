// core/favorite_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Vehicle;
use crate::infrastructure::repositories::{FavoriteRepository, VehicleRepository};
use crate::utils::error::{AppError, Result};

pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl FavoriteService {
    pub fn new(favorites: Arc<dyn FavoriteRepository>, vehicles: Arc<dyn VehicleRepository>) -> Self {
        Self { favorites, vehicles }
    }

    pub async fn ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.favorites.list_vehicle_ids(user_id).await
    }

    /// Annonces favorites encore visibles, dans l'ordre d'ajout le plus récent
    pub async fn vehicles(&self, user_id: Uuid) -> Result<Vec<Vehicle>> {
        let ids = self.favorites.list_vehicle_ids(user_id).await?;
        let found = self.vehicles.list_by_ids(&ids).await?;

        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|v| v.id == *id))
            .filter(|v| !v.is_deleted())
            .cloned()
            .collect())
    }

    /// Ajout idempotent ; le compteur ne bouge que si la relation est créée
    pub async fn add(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let vehicle = self
            .vehicles
            .get(vehicle_id)
            .await?
            .filter(|v| v.is_public() || (v.user_id == user_id && !v.is_deleted()))
            .ok_or(AppError::VehicleNotFound)?;

        let created = self.favorites.add(user_id, vehicle.id).await?;
        if created {
            self.vehicles.adjust_favorites(vehicle.id, 1).await?;
        }
        Ok(created)
    }

    /// Retrait idempotent
    pub async fn remove(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let removed = self.favorites.remove(user_id, vehicle_id).await?;
        if removed {
            self.vehicles.adjust_favorites(vehicle_id, -1).await?;
        }
        Ok(removed)
    }
}
