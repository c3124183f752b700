use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{ProfessionalAccount, VerificationDocument, VerificationStatus};
use crate::infrastructure::repositories::ProfessionalRepository;
use crate::utils::error::{AppError, Result};

const ACCOUNT_COLUMNS: &str = "id, user_id, company_name, siret, company_address, city, \
    postal_code, phone, website, description, verification_status, rejection_reason, \
    submitted_at, verified_at, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, professional_account_id, document_type, file_name, \
    content_type, size_bytes, sha256, storage_key, uploaded_at";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    user_id: Uuid,
    company_name: Option<String>,
    siret: Option<String>,
    company_address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    description: Option<String>,
    verification_status: String,
    rejection_reason: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for ProfessionalAccount {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(ProfessionalAccount {
            id: row.id,
            user_id: row.user_id,
            company_name: row.company_name,
            siret: row.siret,
            company_address: row.company_address,
            city: row.city,
            postal_code: row.postal_code,
            phone: row.phone,
            website: row.website,
            description: row.description,
            verification_status: row.verification_status.parse()?,
            rejection_reason: row.rejection_reason,
            submitted_at: row.submitted_at,
            verified_at: row.verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    professional_account_id: Uuid,
    document_type: String,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    sha256: String,
    storage_key: String,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for VerificationDocument {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        Ok(VerificationDocument {
            id: row.id,
            professional_account_id: row.professional_account_id,
            document_type: row.document_type.parse()?,
            file_name: row.file_name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            sha256: row.sha256,
            storage_key: row.storage_key,
            uploaded_at: row.uploaded_at,
        })
    }
}

/// Dossiers professionnels et justificatifs
#[derive(Clone)]
pub struct PgProfessionalRepository {
    pool: Pool<Postgres>,
}

impl PgProfessionalRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfessionalRepository for PgProfessionalRepository {
    async fn get(&self, id: Uuid) -> Result<Option<ProfessionalAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM professional_accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfessionalAccount::try_from).transpose()
    }

    async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM professional_accounts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProfessionalAccount::try_from).transpose()
    }

    async fn save(&self, account: &ProfessionalAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO professional_accounts (
                id, user_id, company_name, siret, company_address, city, postal_code,
                phone, website, description, verification_status, rejection_reason,
                submitted_at, verified_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                siret = EXCLUDED.siret,
                company_address = EXCLUDED.company_address,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                phone = EXCLUDED.phone,
                website = EXCLUDED.website,
                description = EXCLUDED.description,
                verification_status = EXCLUDED.verification_status,
                rejection_reason = EXCLUDED.rejection_reason,
                submitted_at = EXCLUDED.submitted_at,
                verified_at = EXCLUDED.verified_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(account.id)
        .bind(account.user_id)
        .bind(&account.company_name)
        .bind(&account.siret)
        .bind(&account.company_address)
        .bind(&account.city)
        .bind(&account.postal_code)
        .bind(&account.phone)
        .bind(&account.website)
        .bind(&account.description)
        .bind(account.verification_status.as_str())
        .bind(&account.rejection_reason)
        .bind(account.submitted_at)
        .bind(account.verified_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, status: Option<VerificationStatus>) -> Result<Vec<ProfessionalAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM professional_accounts \
             WHERE $1::TEXT IS NULL OR verification_status = $1 \
             ORDER BY submitted_at DESC NULLS LAST, created_at DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProfessionalAccount::try_from).collect()
    }

    async fn add_document(&self, document: &VerificationDocument) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO verification_documents ({DOCUMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(document.id)
        .bind(document.professional_account_id)
        .bind(document.document_type.as_str())
        .bind(&document.file_name)
        .bind(&document.content_type)
        .bind(document.size_bytes)
        .bind(&document.sha256)
        .bind(&document.storage_key)
        .bind(document.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_documents(&self, account_id: Uuid) -> Result<Vec<VerificationDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM verification_documents \
             WHERE professional_account_id = $1 ORDER BY uploaded_at ASC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VerificationDocument::try_from).collect()
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<VerificationDocument>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM verification_documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VerificationDocument::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::professional::fixtures::company;
    use crate::domain::{DocumentType, ReviewDecision};
    use crate::infrastructure::database::test_support::{now, user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_account_lifecycle_roundtrip(pool: PgPool) {
        let owner = user(&pool, "garage@example.com").await;
        let repo = PgProfessionalRepository::new(pool.clone());

        let mut account = ProfessionalAccount::open(owner.id, now());
        repo.save(&account).await.unwrap();
        assert_eq!(repo.get_by_user(owner.id).await.unwrap(), Some(account.clone()));

        account.submit(company(), now()).unwrap();
        repo.save(&account).await.unwrap();
        assert_eq!(repo.get(account.id).await.unwrap(), Some(account.clone()));

        account.review(ReviewDecision::Approve, now()).unwrap();
        repo.save(&account).await.unwrap();
        assert_eq!(repo.get(account.id).await.unwrap(), Some(account));
        assert_eq!(repo.get_by_user(Uuid::new_v4()).await.unwrap(), None);
    }

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_list_by_status(pool: PgPool) {
        let repo = PgProfessionalRepository::new(pool.clone());
        let opened = ProfessionalAccount::open(user(&pool, "a@example.com").await.id, now());
        let mut submitted = ProfessionalAccount::open(user(&pool, "b@example.com").await.id, now());
        submitted.submit(company(), now()).unwrap();
        repo.save(&opened).await.unwrap();
        repo.save(&submitted).await.unwrap();

        let pending = repo.list(Some(VerificationStatus::Pending)).await.unwrap();
        assert_eq!(pending, vec![submitted.clone()]);
        assert!(repo.list(Some(VerificationStatus::Approved)).await.unwrap().is_empty());
        // Dossiers soumis en tête
        assert_eq!(repo.list(None).await.unwrap(), vec![submitted, opened]);
    }

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_documents(pool: PgPool) {
        let owner = user(&pool, "garage@example.com").await;
        let repo = PgProfessionalRepository::new(pool.clone());
        let account = ProfessionalAccount::open(owner.id, now());
        repo.save(&account).await.unwrap();

        let document = VerificationDocument {
            id: Uuid::new_v4(),
            professional_account_id: account.id,
            document_type: DocumentType::Kbis,
            file_name: "kbis.pdf".into(),
            content_type: "application/pdf".into(),
            size_bytes: 48_213,
            sha256: "ab".repeat(32),
            storage_key: format!("{}/kbis.pdf", account.id),
            uploaded_at: now(),
        };
        repo.add_document(&document).await.unwrap();

        assert_eq!(repo.get_document(document.id).await.unwrap(), Some(document.clone()));
        assert_eq!(repo.list_documents(account.id).await.unwrap(), vec![document]);
        assert!(repo.list_documents(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
