use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::search::SearchFilters;

/// Recherche sauvegardée par un utilisateur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filters: SearchFilters,
    pub alerts_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_alerts() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSavedSearch {
    #[validate(length(min = 1, max = 100, message = "Le nom doit contenir entre 1 et 100 caractères"))]
    pub name: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default = "default_alerts")]
    pub alerts_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SavedSearchUpdate {
    #[validate(length(min = 1, max = 100, message = "Le nom doit contenir entre 1 et 100 caractères"))]
    pub name: Option<String>,
    pub filters: Option<SearchFilters>,
    pub alerts_enabled: Option<bool>,
}

impl NewSavedSearch {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

impl SavedSearchUpdate {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self
    }
}

impl SavedSearch {
    pub fn new(user_id: Uuid, request: NewSavedSearch, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: request.name.trim().to_string(),
            filters: request.filters,
            alerts_enabled: request.alerts_enabled,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: SavedSearchUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(filters) = update.filters {
            self.filters = filters;
        }
        if let Some(alerts_enabled) = update.alerts_enabled {
            self.alerts_enabled = alerts_enabled;
        }
        self.updated_at = now;
    }
}
