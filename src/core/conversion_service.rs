// core/conversion_service.rs
//! Passage d'un compte particulier à un compte professionnel.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    CompanyDetails, DocumentType, ProfessionalAccount, User, VerificationDocument,
};
use crate::infrastructure::repositories::ProfessionalRepository;
use crate::infrastructure::storage::DocumentStorage;
use crate::utils::error::{AppError, Result};
use crate::utils::security::sha256_hash;
use crate::utils::validation::{validate_document_type, validate_file_size, validate_filename};

/// État du dossier vu par son titulaire
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStatus {
    pub account: Option<ProfessionalAccount>,
    pub documents: Vec<VerificationDocument>,
}

/// Fichier reçu à l'étape 3
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub document_type: DocumentType,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct ConversionService {
    professionals: Arc<dyn ProfessionalRepository>,
    storage: DocumentStorage,
    max_document_size_bytes: u64,
}

impl ConversionService {
    pub fn new(
        professionals: Arc<dyn ProfessionalRepository>,
        storage: DocumentStorage,
        max_document_size_bytes: u64,
    ) -> Self {
        Self {
            professionals,
            storage,
            max_document_size_bytes,
        }
    }

    /// Étape 1 : ouvre le dossier, ou rouvre un dossier refusé
    pub async fn start(&self, user: &User) -> Result<ProfessionalAccount> {
        if user.is_professional() {
            return Err(AppError::Conflict("Compte déjà professionnel".to_string()));
        }

        let now = Utc::now();
        let account = match self.professionals.get_by_user(user.id).await? {
            Some(mut account) => {
                account.reopen(now)?;
                account
            }
            None => ProfessionalAccount::open(user.id, now),
        };

        self.professionals.save(&account).await?;
        info!(user_id = %user.id, account_id = %account.id, "🏢 Dossier professionnel ouvert");
        Ok(account)
    }

    /// Étape 2 : identité de l'entreprise, le dossier passe en attente de revue
    pub async fn submit(&self, user: &User, details: CompanyDetails) -> Result<ProfessionalAccount> {
        details.validate()?;

        let mut account = self.account_of(user).await?;
        account.submit(details, Utc::now())?;
        self.professionals.save(&account).await?;
        info!(account_id = %account.id, "📨 Dossier professionnel soumis");

        Ok(account)
    }

    /// Étape 3 : dépôt d'un justificatif
    pub async fn upload_document(&self, user: &User, upload: DocumentUpload) -> Result<VerificationDocument> {
        validate_filename(&upload.file_name)?;
        validate_document_type(&upload.content_type)?;
        validate_file_size(upload.data.len() as u64, self.max_document_size_bytes)?;

        let account = self.account_of(user).await?;
        if !account.accepts_documents() {
            return Err(AppError::Conflict(format!(
                "Dossier {}: dépôt de justificatif impossible",
                account.verification_status
            )));
        }

        let id = Uuid::new_v4();
        let storage_key = format!("professional/{}/{}-{}", account.id, id, upload.file_name);
        self.storage
            .put(&storage_key, &upload.data, &upload.content_type)
            .await?;

        let document = VerificationDocument {
            id,
            professional_account_id: account.id,
            document_type: upload.document_type,
            file_name: upload.file_name,
            content_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            sha256: sha256_hash(&upload.data),
            storage_key,
            uploaded_at: Utc::now(),
        };
        self.professionals.add_document(&document).await?;
        info!(account_id = %account.id, document_id = %document.id, "📎 Justificatif déposé");

        Ok(document)
    }

    pub async fn status(&self, user: &User) -> Result<ConversionStatus> {
        let account = self.professionals.get_by_user(user.id).await?;
        let documents = match &account {
            Some(account) => self.professionals.list_documents(account.id).await?,
            None => Vec::new(),
        };

        Ok(ConversionStatus { account, documents })
    }

    async fn account_of(&self, user: &User) -> Result<ProfessionalAccount> {
        self.professionals
            .get_by_user(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Dossier professionnel".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::professional::fixtures::company;
    use crate::domain::VerificationStatus;
    use crate::infrastructure::Repositories;

    fn setup(dir: &tempfile::TempDir) -> (ConversionService, User) {
        let repos = Repositories::in_memory();
        let service = ConversionService::new(
            repos.professionals.clone(),
            DocumentStorage::Local {
                root: dir.path().to_path_buf(),
            },
            1024,
        );
        let user = User::from_identity(Uuid::new_v4(), "garage@example.com".into(), Utc::now());
        (service, user)
    }

    fn pdf(size: usize) -> DocumentUpload {
        DocumentUpload {
            document_type: DocumentType::Kbis,
            file_name: "kbis.pdf".into(),
            content_type: "application/pdf".into(),
            data: vec![b'%'; size],
        }
    }

    #[tokio::test]
    async fn test_full_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let (service, user) = setup(&dir);

        assert!(service.status(&user).await.unwrap().account.is_none());
        service.start(&user).await.unwrap();
        let account = service.submit(&user, company()).await.unwrap();
        assert_eq!(account.verification_status, VerificationStatus::Pending);

        let document = service.upload_document(&user, pdf(100)).await.unwrap();
        assert_eq!(document.size_bytes, 100);
        assert_eq!(document.sha256.len(), 64);

        let status = service.status(&user).await.unwrap();
        assert_eq!(status.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_start_twice_while_pending_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let (service, user) = setup(&dir);
        service.start(&user).await.unwrap();
        service.start(&user).await.unwrap();
        service.submit(&user, company()).await.unwrap();
        assert!(matches!(service.start(&user).await, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submit_without_start() {
        let dir = tempfile::tempdir().unwrap();
        let (service, user) = setup(&dir);
        assert!(matches!(
            service.submit(&user, company()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_document_checks() {
        let dir = tempfile::tempdir().unwrap();
        let (service, user) = setup(&dir);
        service.start(&user).await.unwrap();

        assert!(matches!(
            service.upload_document(&user, pdf(2048)).await,
            Err(AppError::FileTooLarge)
        ));

        let mut exe = pdf(10);
        exe.content_type = "application/x-msdownload".into();
        assert!(matches!(
            service.upload_document(&user, exe).await,
            Err(AppError::InvalidFileFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_professional_cannot_restart() {
        let dir = tempfile::tempdir().unwrap();
        let (service, mut user) = setup(&dir);
        user.promote_to_professional(Utc::now());
        assert!(matches!(service.start(&user).await, Err(AppError::Conflict(_))));
    }
}
