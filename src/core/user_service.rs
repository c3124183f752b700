// core/user_service.rs
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ProfessionalAccount, ProfileUpdate, User, Vehicle, VerificationStatus};
use crate::infrastructure::repositories::{
    ProfessionalRepository, UserRepository, VehicleRepository,
};
use crate::utils::error::{AppError, Result};
use crate::utils::security::IdentityClaims;

/// Vitrine publique d'un professionnel vérifié
#[derive(Debug, Clone, Serialize)]
pub struct Storefront {
    pub user_id: Uuid,
    pub company: ProfessionalAccount,
    pub vehicles: Vec<Vehicle>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    professionals: Arc<dyn ProfessionalRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        professionals: Arc<dyn ProfessionalRepository>,
        vehicles: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self {
            users,
            professionals,
            vehicles,
        }
    }

    /// Utilisateur miroir du token, créé au premier passage
    pub async fn ensure_user(&self, claims: &IdentityClaims) -> Result<User> {
        if let Some(user) = self.users.get(claims.sub).await? {
            return Ok(user);
        }

        let email = claims.email.clone().unwrap_or_default();
        let user = User::from_identity(claims.sub, email, Utc::now());
        self.users.save(&user).await?;
        info!(user_id = %user.id, "👤 Nouvel utilisateur enregistré");

        Ok(user)
    }

    /// Utilisateur autorisé à écrire (non suspendu)
    pub async fn require_active(&self, claims: &IdentityClaims) -> Result<User> {
        let user = self.ensure_user(claims).await?;
        if user.is_suspended {
            return Err(AppError::Forbidden("Compte suspendu".to_string()));
        }
        Ok(user)
    }

    /// Profil courant, met à jour la dernière connexion
    pub async fn me(&self, claims: &IdentityClaims) -> Result<User> {
        let mut user = self.ensure_user(claims).await?;
        user.last_login_at = Some(Utc::now());
        self.users.save(&user).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, claims: &IdentityClaims, update: ProfileUpdate) -> Result<User> {
        update.validate()?;

        let mut user = self.ensure_user(claims).await?;
        user.apply_profile(update, Utc::now());
        self.users.save(&user).await?;

        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.users.get(id).await?.ok_or(AppError::UserNotFound)
    }

    /// Vitrine d'un professionnel approuvé, 404 sinon
    pub async fn storefront(&self, user_id: Uuid) -> Result<Storefront> {
        let user = self.get(user_id).await?;
        if !user.is_professional() || user.is_suspended {
            return Err(AppError::NotFound("Vitrine".to_string()));
        }

        let company = self
            .professionals
            .get_by_user(user_id)
            .await?
            .filter(|account| account.verification_status == VerificationStatus::Approved)
            .ok_or_else(|| AppError::NotFound("Vitrine".to_string()))?;

        let vehicles = self
            .vehicles
            .list_by_owner(user_id)
            .await?
            .into_iter()
            .filter(Vehicle::is_public)
            .collect();

        Ok(Storefront {
            user_id,
            company,
            vehicles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::fixtures::content;
    use crate::infrastructure::Repositories;

    fn claims(id: Uuid) -> IdentityClaims {
        IdentityClaims {
            sub: id,
            email: Some("lea@example.com".into()),
            aud: "authenticated".into(),
            exp: usize::MAX,
            iat: None,
            role: None,
        }
    }

    fn service(repos: &Repositories) -> UserService {
        UserService::new(
            repos.users.clone(),
            repos.professionals.clone(),
            repos.vehicles.clone(),
        )
    }

    #[tokio::test]
    async fn test_first_sight_creates_user() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let id = Uuid::new_v4();

        let user = service.me(&claims(id)).await.unwrap();
        assert_eq!(user.email, "lea@example.com");
        assert!(user.last_login_at.is_some());
        assert!(repos.users.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_suspended_user_is_forbidden() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let id = Uuid::new_v4();

        let mut user = service.ensure_user(&claims(id)).await.unwrap();
        user.suspend("Fraude".into(), Utc::now());
        repos.users.save(&user).await.unwrap();

        assert!(matches!(
            service.require_active(&claims(id)).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_storefront_requires_approved_professional() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut user = service.ensure_user(&claims(id)).await.unwrap();
        assert!(service.storefront(id).await.is_err());

        let mut account = ProfessionalAccount::open(id, now);
        account
            .submit(crate::domain::professional::fixtures::company(), now)
            .unwrap();
        account
            .review(crate::domain::ReviewDecision::Approve, now)
            .unwrap();
        repos.professionals.save(&account).await.unwrap();
        user.promote_to_professional(now);
        repos.users.save(&user).await.unwrap();

        let mut listed = Vehicle::new(id, content("Peugeot 208", 12000.0), now);
        listed.approve(now);
        repos.vehicles.insert(&listed).await.unwrap();
        let pending = Vehicle::new(id, content("Peugeot 308", 15000.0), now);
        repos.vehicles.insert(&pending).await.unwrap();

        let storefront = service.storefront(id).await.unwrap();
        assert_eq!(storefront.company.company_name.as_deref(), Some("Garage du Centre"));
        assert_eq!(storefront.vehicles.len(), 1);
        assert_eq!(storefront.vehicles[0].id, listed.id);
    }
}
