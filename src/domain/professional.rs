//! Conversion d'un compte particulier en compte professionnel.
//!
//! Parcours linéaire en trois étapes : ouverture du dossier, saisie de
//! l'identité de l'entreprise, dépôt des justificatifs. La revue est faite
//! par un admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::vehicle::text_enum;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_postal_code, validate_siret};

/// Statut de vérification du dossier professionnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Dossier ouvert, informations en cours de saisie
    InProgress,
    /// Soumis, en attente de revue
    Pending,
    Approved,
    Rejected,
}

text_enum!(VerificationStatus {
    InProgress => "in_progress",
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Nature d'un justificatif
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Kbis,
    Identity,
    Other,
}

text_enum!(DocumentType {
    Kbis => "kbis",
    Identity => "identity",
    Other => "other",
});

/// Décision d'un admin sur un dossier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub siret: Option<String>,
    pub company_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub verification_status: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identité de l'entreprise saisie à l'étape 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompanyDetails {
    #[validate(length(min = 2, max = 150, message = "Raison sociale invalide"))]
    pub company_name: String,
    #[validate(custom = "validate_siret")]
    pub siret: String,
    #[validate(length(min = 5, max = 255, message = "Adresse invalide"))]
    pub company_address: String,
    #[validate(length(min = 1, max = 100, message = "Ville requise"))]
    pub city: String,
    #[validate(custom = "validate_postal_code")]
    pub postal_code: String,
    #[validate(length(min = 6, max = 20, message = "Numéro de téléphone invalide"))]
    pub phone: String,
    #[validate(url(message = "URL du site invalide"))]
    pub website: Option<String>,
    #[validate(length(max = 2000, message = "Description trop longue"))]
    pub description: Option<String>,
}

/// Justificatif déposé pour un dossier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDocument {
    pub id: Uuid,
    pub professional_account_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

impl ProfessionalAccount {
    /// Étape 1 : ouverture du dossier
    pub fn open(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company_name: None,
            siret: None,
            company_address: None,
            city: None,
            postal_code: None,
            phone: None,
            website: None,
            description: None,
            verification_status: VerificationStatus::InProgress,
            rejection_reason: None,
            submitted_at: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Réouverture d'un dossier refusé
    pub fn reopen(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.verification_status {
            VerificationStatus::Rejected => {
                self.verification_status = VerificationStatus::InProgress;
                self.rejection_reason = None;
                self.updated_at = now;
                Ok(())
            }
            VerificationStatus::InProgress => Ok(()),
            status => Err(AppError::Conflict(format!(
                "Dossier professionnel déjà {}",
                status
            ))),
        }
    }

    /// Étape 2 : saisie de l'entreprise et soumission
    pub fn submit(&mut self, details: CompanyDetails, now: DateTime<Utc>) -> Result<()> {
        if self.verification_status != VerificationStatus::InProgress {
            return Err(AppError::Conflict(format!(
                "Soumission impossible: dossier {}",
                self.verification_status
            )));
        }

        self.company_name = Some(details.company_name.trim().to_string());
        self.siret = Some(details.siret.chars().filter(|c| !c.is_whitespace()).collect());
        self.company_address = Some(details.company_address);
        self.city = Some(details.city);
        self.postal_code = Some(details.postal_code);
        self.phone = Some(details.phone);
        self.website = details.website;
        self.description = details.description;
        self.verification_status = VerificationStatus::Pending;
        self.submitted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Étape 3 : les justificatifs sont acceptés tant que la revue n'est pas faite
    pub fn accepts_documents(&self) -> bool {
        matches!(
            self.verification_status,
            VerificationStatus::InProgress | VerificationStatus::Pending
        )
    }

    /// Revue admin d'un dossier soumis
    pub fn review(&mut self, decision: ReviewDecision, now: DateTime<Utc>) -> Result<()> {
        if self.verification_status != VerificationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Seuls les dossiers en attente peuvent être revus (statut: {})",
                self.verification_status
            )));
        }

        match decision {
            ReviewDecision::Approve => {
                self.verification_status = VerificationStatus::Approved;
                self.rejection_reason = None;
                self.verified_at = Some(now);
            }
            ReviewDecision::Reject { reason } => {
                self.verification_status = VerificationStatus::Rejected;
                self.rejection_reason = Some(reason);
            }
        }
        self.updated_at = now;
        Ok(())
    }
}
