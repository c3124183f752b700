//! Client HTTP typé de l'API marketplace.
//!
//! Garde en cache local les identifiants de favoris (5 min), les recherches
//! sauvegardées (5 min) et le compteur de messages non lus (2 min). Chaque
//! écriture faite par le client invalide le cache concerné.

pub mod error;
pub mod session;

use chrono::Utc;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{AdminStats, AdminToken};
use crate::domain::{
    CompanyDetails, NewSavedSearch, ProfessionalAccount, SavedSearch, SavedSearchUpdate,
    SearchFilters, Vehicle,
};
use crate::infrastructure::TtlCache;

pub use error::{ClientError, ClientResult};
pub use session::AdminSession;

pub const FAVORITES_TTL: Duration = Duration::from_secs(5 * 60);
pub const SAVED_SEARCHES_TTL: Duration = Duration::from_secs(5 * 60);
pub const UNREAD_COUNT_TTL: Duration = Duration::from_secs(2 * 60);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnreadCount {
    count: i64,
}

/// Client de l'API PassionAuto2Roues
pub struct MarketplaceClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    favorites: TtlCache<(), HashSet<Uuid>>,
    saved_searches: TtlCache<(), Vec<SavedSearch>>,
    unread: TtlCache<(), i64>,
}

impl MarketplaceClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            favorites: TtlCache::new(FAVORITES_TTL),
            saved_searches: TtlCache::new(SAVED_SEARCHES_TTL),
            unread: TtlCache::new(UNREAD_COUNT_TTL),
        })
    }

    /// Attacher le jeton du fournisseur d'identité
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    /// Changer d'identité vide tous les caches
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
        self.favorites.clear();
        self.saved_searches.clear();
        self.unread.clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Convertit une réponse non-2xx en `ClientError::Api`
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (message, code) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.error, parsed.code),
            Err(_) => (body, None),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    // Catalogue

    pub async fn search(&self, filters: &SearchFilters) -> ClientResult<Vec<Vehicle>> {
        Self::send_json(self.http.get(self.url("/vehicles")).query(filters)).await
    }

    pub async fn vehicle(&self, id: Uuid) -> ClientResult<Vehicle> {
        Self::send_json(self.http.get(self.url(&format!("/vehicles/{}", id)))).await
    }

    // Favoris

    pub async fn favorite_ids(&self, force: bool) -> ClientResult<HashSet<Uuid>> {
        if !force {
            if let Some(ids) = self.favorites.get(&()) {
                return Ok(ids);
            }
        }

        let ids: Vec<Uuid> =
            Self::send_json(self.authed(self.http.get(self.url("/favorites/ids")))?).await?;
        let ids: HashSet<Uuid> = ids.into_iter().collect();
        self.favorites.insert((), ids.clone());
        Ok(ids)
    }

    /// État connu localement, sans appel réseau
    pub fn is_favorite(&self, vehicle_id: Uuid) -> bool {
        self.favorites
            .get(&())
            .map(|ids| ids.contains(&vehicle_id))
            .unwrap_or(false)
    }

    pub async fn favorite_vehicles(&self) -> ClientResult<Vec<Vehicle>> {
        Self::send_json(self.authed(self.http.get(self.url("/favorites")))?).await
    }

    /// Bascule optimiste : l'état local change avant la requête et revient
    /// en arrière si celle-ci échoue. Renvoie le nouvel état.
    pub async fn toggle_favorite(&self, vehicle_id: Uuid) -> ClientResult<bool> {
        let mut ids = self.favorite_ids(false).await?;
        let now_favorite = !ids.contains(&vehicle_id);
        flip(&mut ids, vehicle_id, now_favorite);
        self.favorites.insert((), ids.clone());

        let path = self.url(&format!("/favorites/{}", vehicle_id));
        let request = if now_favorite {
            self.http.post(path)
        } else {
            self.http.delete(path)
        };

        let outcome = match self.authed(request) {
            Ok(request) => match request.send().await {
                Ok(response) => Self::check(response).await.map(|_| ()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            warn!("⚠️ Favori {} non synchronisé, retour arrière: {}", vehicle_id, e);
            let mut ids = self.favorites.get(&()).unwrap_or(ids);
            flip(&mut ids, vehicle_id, !now_favorite);
            self.favorites.insert((), ids);
            return Err(e);
        }

        debug!("Favori {} -> {}", vehicle_id, now_favorite);
        Ok(now_favorite)
    }

    // Recherches sauvegardées

    pub async fn saved_searches(&self, force: bool) -> ClientResult<Vec<SavedSearch>> {
        if !force {
            if let Some(searches) = self.saved_searches.get(&()) {
                return Ok(searches);
            }
        }

        let searches: Vec<SavedSearch> =
            Self::send_json(self.authed(self.http.get(self.url("/saved-searches")))?).await?;
        self.saved_searches.insert((), searches.clone());
        Ok(searches)
    }

    pub async fn create_saved_search(&self, request: &NewSavedSearch) -> ClientResult<SavedSearch> {
        let search = Self::send_json(
            self.authed(self.http.post(self.url("/saved-searches")))?
                .json(request),
        )
        .await?;
        self.saved_searches.invalidate(&());
        Ok(search)
    }

    pub async fn update_saved_search(
        &self,
        id: Uuid,
        update: &SavedSearchUpdate,
    ) -> ClientResult<SavedSearch> {
        let search = Self::send_json(
            self.authed(self.http.patch(self.url(&format!("/saved-searches/{}", id))))?
                .json(update),
        )
        .await?;
        self.saved_searches.invalidate(&());
        Ok(search)
    }

    pub async fn delete_saved_search(&self, id: Uuid) -> ClientResult<()> {
        let request = self.authed(self.http.delete(self.url(&format!("/saved-searches/{}", id))))?;
        Self::check(request.send().await?).await?;
        self.saved_searches.invalidate(&());
        Ok(())
    }

    // Messagerie

    pub async fn unread_count(&self, force: bool) -> ClientResult<i64> {
        if !force {
            if let Some(count) = self.unread.get(&()) {
                return Ok(count);
            }
        }

        let body: UnreadCount = Self::send_json(
            self.authed(self.http.get(self.url("/messages-simple/unread-count")))?,
        )
        .await?;
        self.unread.insert((), body.count);
        Ok(body.count)
    }

    pub async fn mark_read(&self, with: Uuid, vehicle_id: Option<Uuid>) -> ClientResult<u64> {
        #[derive(Deserialize)]
        struct Updated {
            updated: u64,
        }

        let body: Updated = Self::send_json(
            self.authed(self.http.post(self.url("/messages-simple/read")))?
                .json(&json!({ "with": with, "vehicle_id": vehicle_id })),
        )
        .await?;
        self.unread.invalidate(&());
        Ok(body.updated)
    }

    // Passage en compte professionnel

    /// Ouvre le dossier puis transmet l'identité de l'entreprise
    pub async fn request_conversion(
        &self,
        details: &CompanyDetails,
    ) -> ClientResult<ProfessionalAccount> {
        let _: ProfessionalAccount = Self::send_json(
            self.authed(self.http.post(self.url("/account/conversion/start")))?,
        )
        .await?;

        Self::send_json(
            self.authed(self.http.post(self.url("/account/conversion/submit")))?
                .json(details),
        )
        .await
    }

    // Back-office

    /// Connexion admin ; la session renvoyée est prête à être persistée
    pub async fn admin_login(&self, email: &str, password: &str) -> ClientResult<AdminSession> {
        let token: AdminToken = Self::send_json(
            self.http
                .post(self.url("/admin/login"))
                .json(&json!({ "email": email, "password": password })),
        )
        .await?;
        Ok(AdminSession::new(token.email, token.token, Utc::now()))
    }

    pub async fn admin_stats(&self, session: &AdminSession) -> ClientResult<AdminStats> {
        if session.is_expired(Utc::now()) {
            return Err(ClientError::SessionExpired);
        }
        Self::send_json(
            self.http
                .get(self.url("/admin/stats"))
                .bearer_auth(&session.token),
        )
        .await
    }
}

fn flip(ids: &mut HashSet<Uuid>, vehicle_id: Uuid, favorite: bool) {
    if favorite {
        ids.insert(vehicle_id);
    } else {
        ids.remove(&vehicle_id);
    }
}
