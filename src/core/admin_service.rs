// core/admin_service.rs
//! Back-office : connexion admin, statistiques et modération.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    AccountType, DeletionRequest, ListingStatus, ProfessionalAccount, ReviewDecision, User,
    Vehicle, VerificationDocument, VerificationStatus,
};
use crate::infrastructure::repositories::{ProfessionalRepository, UserRepository, VehicleRepository};
use crate::infrastructure::storage::DocumentStorage;
use crate::utils::error::{AppError, Result};
use crate::utils::security::{
    generate_admin_token, hash_password, verify_admin_token, verify_password, AdminClaims,
};

use super::saved_search_service::SavedSearchService;
use super::vehicle_service::VehicleService;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLogin {
    pub email: String,
    pub password: String,
}

/// Session admin renvoyée à la connexion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminStats {
    pub users_total: i64,
    pub users_professional: i64,
    pub users_suspended: i64,
    pub vehicles_total: i64,
    pub vehicles_pending: i64,
    pub vehicles_approved: i64,
    pub vehicles_rejected: i64,
    pub vehicles_premium: i64,
    pub vehicles_deleted: i64,
    pub professional_accounts_pending: i64,
}

/// Action de modération sur un utilisateur
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    Suspend { reason: String },
    Unsuspend,
}

/// Décision sur une annonce ou un dossier professionnel
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject { reason: String },
}

fn required_reason(reason: String) -> Result<String> {
    let reason = reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::Validation("Un motif est requis".to_string()));
    }
    Ok(reason)
}

pub struct AdminService {
    users: Arc<dyn UserRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    professionals: Arc<dyn ProfessionalRepository>,
    listings: Arc<VehicleService>,
    saved_searches: Arc<SavedSearchService>,
    storage: DocumentStorage,
    admin_email: String,
    admin_password_hash: String,
    jwt_secret: String,
    jwt_audience: String,
    session_hours: i64,
}

impl AdminService {
    /// Le mot de passe admin est haché une seule fois au démarrage
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        professionals: Arc<dyn ProfessionalRepository>,
        listings: Arc<VehicleService>,
        saved_searches: Arc<SavedSearchService>,
        storage: DocumentStorage,
        admin_email: &str,
        admin_password: &str,
        jwt_secret: &str,
        jwt_audience: &str,
        session_hours: i64,
    ) -> Result<Self> {
        Ok(Self {
            users,
            vehicles,
            professionals,
            listings,
            saved_searches,
            storage,
            admin_email: admin_email.trim().to_lowercase(),
            admin_password_hash: hash_password(admin_password)?,
            jwt_secret: jwt_secret.to_string(),
            jwt_audience: jwt_audience.to_string(),
            session_hours,
        })
    }

    /// Connexion admin, token valable `session_hours`
    pub async fn login(&self, request: AdminLogin) -> Result<AdminToken> {
        let email = request.email.trim().to_lowercase();
        if email != self.admin_email || !verify_password(&request.password, &self.admin_password_hash)? {
            warn!("🚫 Tentative de connexion admin refusée");
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_admin_token(
            &email,
            &self.jwt_secret,
            &self.jwt_audience,
            self.session_hours,
        )?;
        info!("🔐 Connexion admin");

        Ok(AdminToken {
            token,
            email,
            expires_at: Utc::now() + Duration::hours(self.session_hours),
        })
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims> {
        verify_admin_token(token, &self.jwt_secret, &self.jwt_audience)
    }

    /// Statistiques globales du tableau de bord
    pub async fn stats(&self) -> Result<AdminStats> {
        let now = Utc::now();
        let users = self.users.list(None).await?;
        let vehicles = self.vehicles.list_all(None).await?;
        let pending_accounts = self
            .professionals
            .list(Some(VerificationStatus::Pending))
            .await?;

        let vehicles_deleted = self.vehicles.count_deleted().await?;

        let count_users = |pred: fn(&User) -> bool| users.iter().filter(|u| pred(u)).count() as i64;
        let count_vehicles = |pred: &dyn Fn(&Vehicle) -> bool| {
            vehicles.iter().filter(|v| pred(v)).count() as i64
        };

        Ok(AdminStats {
            users_total: users.len() as i64,
            users_professional: count_users(|u| u.account_type == AccountType::Professional),
            users_suspended: count_users(|u| u.is_suspended),
            vehicles_total: vehicles.len() as i64,
            vehicles_pending: count_vehicles(&|v| v.status == ListingStatus::Pending),
            vehicles_approved: count_vehicles(&|v| v.status == ListingStatus::Approved),
            vehicles_rejected: count_vehicles(&|v| v.status == ListingStatus::Rejected),
            vehicles_premium: count_vehicles(&|v| v.premium_active(now)),
            vehicles_deleted,
            professional_accounts_pending: pending_accounts.len() as i64,
        })
    }

    // Utilisateurs

    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
        self.users.list(search.filter(|s| !s.trim().is_empty())).await
    }

    /// Suspension (désactive les annonces) ou levée de suspension
    pub async fn moderate_user(&self, id: Uuid, action: UserAction) -> Result<User> {
        let mut user = self.users.get(id).await?.ok_or(AppError::UserNotFound)?;
        let now = Utc::now();

        match action {
            UserAction::Suspend { reason } => {
                user.suspend(required_reason(reason)?, now);
                self.users.save(&user).await?;
                let deactivated = self.vehicles.deactivate_owner_listings(id).await?;
                self.listings.invalidate_catalog().await;
                info!(user_id = %id, deactivated, "⛔ Utilisateur suspendu");
            }
            UserAction::Unsuspend => {
                user.unsuspend(now);
                self.users.save(&user).await?;
                info!(user_id = %id, "✅ Suspension levée");
            }
        }

        Ok(user)
    }

    // Annonces

    pub async fn list_vehicles(&self, status: Option<ListingStatus>) -> Result<Vec<Vehicle>> {
        self.vehicles.list_all(status).await
    }

    /// Approbation ou refus d'une annonce ; l'approbation déclenche les alertes
    pub async fn moderate_vehicle(&self, id: Uuid, action: ModerationAction) -> Result<Vehicle> {
        let mut vehicle = self.listings.get(id).await?;
        let now = Utc::now();

        match action {
            ModerationAction::Approve => vehicle.approve(now),
            ModerationAction::Reject { reason } => vehicle.reject(required_reason(reason)?, now),
        }
        self.vehicles.update(&vehicle).await?;
        self.listings.invalidate_catalog().await;
        info!(vehicle_id = %id, status = %vehicle.status, "🛡️  Annonce modérée");

        if vehicle.is_public() {
            self.notify_alerts(&vehicle).await;
        }

        Ok(vehicle)
    }

    /// Suppression logique par la modération
    pub async fn delete_vehicle(&self, id: Uuid, request: DeletionRequest) -> Result<Vehicle> {
        request.validate()?;

        let mut vehicle = self.listings.get(id).await?;
        vehicle.mark_deleted(request.reason, request.comment, Utc::now());
        self.vehicles.update(&vehicle).await?;
        self.listings.invalidate_catalog().await;
        info!(vehicle_id = %id, "🗑️  Annonce supprimée par la modération");

        Ok(vehicle)
    }

    async fn notify_alerts(&self, vehicle: &Vehicle) {
        match self.saved_searches.matching_alerts(vehicle).await {
            Ok(matches) => {
                for search in matches {
                    info!(
                        saved_search_id = %search.id,
                        user_id = %search.user_id,
                        vehicle_id = %vehicle.id,
                        "🔔 Alerte recherche sauvegardée"
                    );
                }
            }
            Err(e) => warn!("⚠️  Calcul des alertes impossible: {}", e),
        }
    }

    // Comptes professionnels

    pub async fn list_professionals(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<ProfessionalAccount>> {
        self.professionals.list(status).await
    }

    /// Revue d'un dossier en attente ; l'approbation promeut l'utilisateur
    pub async fn review_professional(&self, id: Uuid, action: ModerationAction) -> Result<ProfessionalAccount> {
        let mut account = self
            .professionals
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dossier professionnel".to_string()))?;
        let now = Utc::now();

        let decision = match action {
            ModerationAction::Approve => ReviewDecision::Approve,
            ModerationAction::Reject { reason } => ReviewDecision::Reject {
                reason: required_reason(reason)?,
            },
        };
        // Titulaire chargé avant toute écriture
        let mut user = self
            .users
            .get(account.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let approved = decision == ReviewDecision::Approve;
        account.review(decision, now)?;

        self.professionals.save(&account).await?;
        if approved {
            user.promote_to_professional(now);
            self.users.save(&user).await?;
        }
        info!(account_id = %id, status = %account.verification_status, "🏢 Dossier professionnel revu");

        Ok(account)
    }

    pub async fn list_documents(&self, account_id: Uuid) -> Result<Vec<VerificationDocument>> {
        self.professionals
            .get(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dossier professionnel".to_string()))?;
        self.professionals.list_documents(account_id).await
    }

    /// Métadonnées et contenu d'un justificatif
    pub async fn download_document(&self, id: Uuid) -> Result<(VerificationDocument, Vec<u8>)> {
        let document = self
            .professionals
            .get_document(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Justificatif".to_string()))?;
        let data = self.storage.get(&document.storage_key).await?;
        Ok((document, data))
    }
}
