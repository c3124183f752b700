use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::text_enum;
use crate::utils::validation::validate_postal_code;

/// Type de compte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Individual,
    Professional,
}

text_enum!(AccountType {
    Individual => "individual",
    Professional => "professional",
});

/// Utilisateur miroir du fournisseur d'identité
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifiant du fournisseur d'identité (claim `sub`)
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub account_type: AccountType,
    pub email_verified: bool,
    /// Compte professionnel vérifié par l'équipe de modération
    pub is_verified: bool,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Mise à jour du profil par l'utilisateur
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 100, message = "Le nom doit contenir entre 2 et 100 caractères"))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Numéro de téléphone invalide"))]
    pub phone: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Numéro WhatsApp invalide"))]
    pub whatsapp: Option<String>,
    #[validate(length(max = 100, message = "Nom de ville trop long"))]
    pub city: Option<String>,
    #[validate(custom = "validate_postal_code")]
    pub postal_code: Option<String>,
}

impl User {
    /// Premier passage d'un utilisateur authentifié
    pub fn from_identity(id: Uuid, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name: None,
            phone: None,
            whatsapp: None,
            city: None,
            postal_code: None,
            account_type: AccountType::Individual,
            email_verified: true,
            is_verified: false,
            is_suspended: false,
            suspension_reason: None,
            created_at: now,
            updated_at: now,
            last_login_at: Some(now),
        }
    }

    pub fn apply_profile(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = Some(name.trim().to_string());
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(whatsapp) = update.whatsapp {
            self.whatsapp = Some(whatsapp);
        }
        if let Some(city) = update.city {
            self.city = Some(city);
        }
        if let Some(postal_code) = update.postal_code {
            self.postal_code = Some(postal_code);
        }
        self.updated_at = now;
    }

    pub fn is_professional(&self) -> bool {
        self.account_type == AccountType::Professional
    }

    pub fn suspend(&mut self, reason: String, now: DateTime<Utc>) {
        self.is_suspended = true;
        self.suspension_reason = Some(reason);
        self.updated_at = now;
    }

    pub fn unsuspend(&mut self, now: DateTime<Utc>) {
        self.is_suspended = false;
        self.suspension_reason = None;
        self.updated_at = now;
    }

    /// Passage en compte professionnel vérifié
    pub fn promote_to_professional(&mut self, now: DateTime<Utc>) {
        self.account_type = AccountType::Professional;
        self.is_verified = true;
        self.updated_at = now;
    }
}
