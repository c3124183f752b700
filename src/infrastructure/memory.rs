//! Magasin en mémoire implémentant tous les repositories.
//!
//! Utilisé en développement (`STORAGE_BACKEND=memory`) et dans les tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ListingStatus, Message, ProfessionalAccount, SavedSearch, User, Vehicle,
    VerificationDocument, VerificationStatus,
};
use crate::infrastructure::repositories::{
    FavoriteRepository, MessageRepository, ProfessionalRepository, SavedSearchRepository,
    UserRepository, VehicleRepository,
};
use crate::utils::error::Result;

#[derive(Default)]
pub struct MemoryStore {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    users: RwLock<HashMap<Uuid, User>>,
    favorites: RwLock<Vec<(Uuid, Uuid, DateTime<Utc>)>>,
    saved_searches: RwLock<HashMap<Uuid, SavedSearch>>,
    messages: RwLock<Vec<Message>>,
    professionals: RwLock<HashMap<Uuid, ProfessionalAccount>>,
    documents: RwLock<Vec<VerificationDocument>>,
}

fn newest_first(mut vehicles: Vec<Vehicle>) -> Vec<Vehicle> {
    vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    vehicles
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn list_public(&self) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(newest_first(vehicles.values().filter(|v| v.is_public()).cloned().collect()))
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(newest_first(
            vehicles
                .values()
                .filter(|v| v.user_id == user_id && !v.is_deleted())
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self, status: Option<ListingStatus>) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(newest_first(
            vehicles
                .values()
                .filter(|v| !v.is_deleted() && status.map_or(true, |s| v.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(ids.iter().filter_map(|id| vehicles.get(id).cloned()).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn insert(&self, vehicle: &Vehicle) -> Result<()> {
        self.vehicles.write().await.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<()> {
        let mut vehicles = self.vehicles.write().await;
        // Les compteurs ne sont modifiés que par leurs opérations dédiées
        let (favorites, views) = vehicles
            .get(&vehicle.id)
            .map_or((vehicle.favorites, vehicle.views), |v| (v.favorites, v.views));
        let mut stored = vehicle.clone();
        stored.favorites = favorites;
        stored.views = views;
        vehicles.insert(vehicle.id, stored);
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        if let Some(vehicle) = self.vehicles.write().await.get_mut(&id) {
            vehicle.views += 1;
        }
        Ok(())
    }

    async fn adjust_favorites(&self, id: Uuid, delta: i32) -> Result<()> {
        if let Some(vehicle) = self.vehicles.write().await.get_mut(&id) {
            vehicle.favorites = (vehicle.favorites + delta).max(0);
        }
        Ok(())
    }

    async fn deactivate_owner_listings(&self, user_id: Uuid) -> Result<u64> {
        let mut vehicles = self.vehicles.write().await;
        let now = Utc::now();
        let mut count = 0;
        for vehicle in vehicles
            .values_mut()
            .filter(|v| v.user_id == user_id && v.is_active)
        {
            vehicle.is_active = false;
            vehicle.updated_at = now;
            count += 1;
        }
        Ok(count)
    }

    async fn count_deleted(&self) -> Result<i64> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.values().filter(|v| v.is_deleted()).count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<User>> {
        let needle = search.map(|s| s.trim().to_lowercase());
        let users = self.users.read().await;
        let mut found: Vec<User> = users
            .values()
            .filter(|u| match &needle {
                None => true,
                Some(n) => {
                    u.email.to_lowercase().contains(n)
                        || u.name.as_deref().map_or(false, |name| name.to_lowercase().contains(n))
                }
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn list_vehicle_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let favorites = self.favorites.read().await;
        let mut mine: Vec<&(Uuid, Uuid, DateTime<Utc>)> =
            favorites.iter().filter(|(u, _, _)| *u == user_id).collect();
        mine.sort_by(|a, b| b.2.cmp(&a.2));
        Ok(mine.into_iter().map(|(_, v, _)| *v).collect())
    }

    async fn add(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let mut favorites = self.favorites.write().await;
        if favorites.iter().any(|(u, v, _)| *u == user_id && *v == vehicle_id) {
            return Ok(false);
        }
        favorites.push((user_id, vehicle_id, Utc::now()));
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let mut favorites = self.favorites.write().await;
        let before = favorites.len();
        favorites.retain(|(u, v, _)| !(*u == user_id && *v == vehicle_id));
        Ok(favorites.len() != before)
    }
}

#[async_trait]
impl SavedSearchRepository for MemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SavedSearch>> {
        let searches = self.saved_searches.read().await;
        let mut mine: Vec<SavedSearch> =
            searches.values().filter(|s| s.user_id == user_id).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn list_alerting(&self) -> Result<Vec<SavedSearch>> {
        let searches = self.saved_searches.read().await;
        Ok(searches.values().filter(|s| s.alerts_enabled).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SavedSearch>> {
        Ok(self.saved_searches.read().await.get(&id).cloned())
    }

    async fn save(&self, search: &SavedSearch) -> Result<()> {
        self.saved_searches.write().await.insert(search.id, search.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.saved_searches.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn insert(&self, message: &Message) -> Result<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut mine: Vec<Message> = messages.iter().filter(|m| m.involves(user_id)).cloned().collect();
        mine.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(mine)
    }

    async fn mark_thread_read(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<u64> {
        let mut messages = self.messages.write().await;
        let mut count = 0;
        for message in messages.iter_mut().filter(|m| {
            m.receiver_id == user_id
                && m.sender_id == counterpart_id
                && m.vehicle_id == vehicle_id
                && !m.is_read
        }) {
            message.is_read = true;
            count += 1;
        }
        Ok(count)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<i64> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| m.receiver_id == user_id && !m.is_read)
            .count() as i64)
    }
}

#[async_trait]
impl ProfessionalRepository for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<ProfessionalAccount>> {
        Ok(self.professionals.read().await.get(&id).cloned())
    }

    async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalAccount>> {
        let accounts = self.professionals.read().await;
        Ok(accounts.values().find(|a| a.user_id == user_id).cloned())
    }

    async fn save(&self, account: &ProfessionalAccount) -> Result<()> {
        self.professionals.write().await.insert(account.id, account.clone());
        Ok(())
    }

    async fn list(&self, status: Option<VerificationStatus>) -> Result<Vec<ProfessionalAccount>> {
        let accounts = self.professionals.read().await;
        let mut found: Vec<ProfessionalAccount> = accounts
            .values()
            .filter(|a| status.map_or(true, |s| a.verification_status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.created_at.cmp(&a.created_at)));
        Ok(found)
    }

    async fn add_document(&self, document: &VerificationDocument) -> Result<()> {
        self.documents.write().await.push(document.clone());
        Ok(())
    }

    async fn list_documents(&self, account_id: Uuid) -> Result<Vec<VerificationDocument>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.professional_account_id == account_id)
            .cloned()
            .collect())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<VerificationDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::fixtures::content;

    #[tokio::test]
    async fn test_favorites_are_idempotent() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let vehicle = Uuid::new_v4();

        assert!(store.add(user, vehicle).await.unwrap());
        assert!(!store.add(user, vehicle).await.unwrap());
        assert_eq!(store.list_vehicle_ids(user).await.unwrap(), vec![vehicle]);
        assert!(FavoriteRepository::remove(&store, user, vehicle).await.unwrap());
        assert!(!FavoriteRepository::remove(&store, user, vehicle).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_preserves_counters() {
        let store = MemoryStore::default();
        let vehicle = Vehicle::new(Uuid::new_v4(), content("Vespa GTS", 4200.0), Utc::now());
        VehicleRepository::insert(&store, &vehicle).await.unwrap();
        store.increment_views(vehicle.id).await.unwrap();
        store.adjust_favorites(vehicle.id, 1).await.unwrap();

        VehicleRepository::update(&store, &vehicle).await.unwrap();
        let stored = VehicleRepository::get(&store, vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 1);
        assert_eq!(stored.favorites, 1);
    }

    #[tokio::test]
    async fn test_favorite_counter_never_negative() {
        let store = MemoryStore::default();
        let vehicle = Vehicle::new(Uuid::new_v4(), content("Jet-ski", 8000.0), Utc::now());
        VehicleRepository::insert(&store, &vehicle).await.unwrap();
        store.adjust_favorites(vehicle.id, -1).await.unwrap();
        let stored = VehicleRepository::get(&store, vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.favorites, 0);
    }

    #[tokio::test]
    async fn test_mark_thread_read_only_touches_received() {
        let store = MemoryStore::default();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let incoming = Message::new(
            other,
            crate::domain::NewMessage { receiver_id: me, vehicle_id: None, content: "Salut".into() },
            Utc::now(),
        );
        let outgoing = Message::new(
            me,
            crate::domain::NewMessage { receiver_id: other, vehicle_id: None, content: "Bonjour".into() },
            Utc::now(),
        );
        MessageRepository::insert(&store, &incoming).await.unwrap();
        MessageRepository::insert(&store, &outgoing).await.unwrap();

        assert_eq!(store.count_unread(me).await.unwrap(), 1);
        assert_eq!(store.mark_thread_read(me, other, None).await.unwrap(), 1);
        assert_eq!(store.count_unread(me).await.unwrap(), 0);
        assert_eq!(store.count_unread(other).await.unwrap(), 1);
    }
}
