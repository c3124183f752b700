use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::User;
use crate::infrastructure::repositories::UserRepository;
use crate::utils::error::{AppError, Result};

const USER_COLUMNS: &str = "id, email, name, phone, whatsapp, city, postal_code, account_type, \
    email_verified, is_verified, is_suspended, suspension_reason, created_at, updated_at, \
    last_login_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    phone: Option<String>,
    whatsapp: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    account_type: String,
    email_verified: bool,
    is_verified: bool,
    is_suspended: bool,
    suspension_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            whatsapp: row.whatsapp,
            city: row.city,
            postal_code: row.postal_code,
            account_type: row.account_type.parse()?,
            email_verified: row.email_verified,
            is_verified: row.is_verified,
            is_suspended: row.is_suspended,
            suspension_reason: row.suspension_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        })
    }
}

/// Motif `ILIKE` littéral : `%`, `_` et `\` saisis sont échappés
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Repository pour les opérations sur les utilisateurs
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Crée une nouvelle instance du repository
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Récupère un utilisateur par son ID
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn save(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, name, phone, whatsapp, city, postal_code, account_type,
                email_verified, is_verified, is_suspended, suspension_reason,
                created_at, updated_at, last_login_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                whatsapp = EXCLUDED.whatsapp,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                account_type = EXCLUDED.account_type,
                email_verified = EXCLUDED.email_verified,
                is_verified = EXCLUDED.is_verified,
                is_suspended = EXCLUDED.is_suspended,
                suspension_reason = EXCLUDED.suspension_reason,
                updated_at = EXCLUDED.updated_at,
                last_login_at = EXCLUDED.last_login_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.whatsapp)
        .bind(&user.city)
        .bind(&user.postal_code)
        .bind(user.account_type.as_str())
        .bind(user.email_verified)
        .bind(user.is_verified)
        .bind(user.is_suspended)
        .bind(&user.suspension_reason)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Liste les utilisateurs, filtrés par email ou nom
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>> {
        let pattern = search.map(like_pattern);
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE $1::TEXT IS NULL OR email ILIKE $1 ESCAPE '\\' OR name ILIKE $1 ESCAPE '\\' \
             ORDER BY created_at DESC"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::{now, user};
    use sqlx::PgPool;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" moto "), "%moto%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_roundtrip_and_upsert(pool: PgPool) {
        let repo = PgUserRepository::new(pool.clone());
        let mut stored = user(&pool, "alice@example.com").await;
        assert_eq!(repo.get(stored.id).await.unwrap(), Some(stored.clone()));

        stored.name = Some("Alice".into());
        stored.city = Some("Lyon".into());
        stored.updated_at = now();
        repo.save(&stored).await.unwrap();
        assert_eq!(repo.get(stored.id).await.unwrap(), Some(stored));
    }

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_search_treats_wildcards_literally(pool: PgPool) {
        let repo = PgUserRepository::new(pool.clone());
        for (email, name) in [
            ("garage@example.com", "100% moto"),
            ("club@example.com", "1000 motos"),
            ("atelier_nord@example.com", "Atelier Nord"),
        ] {
            let mut u = user(&pool, email).await;
            u.name = Some(name.to_string());
            repo.save(&u).await.unwrap();
        }

        let names = |users: Vec<User>| {
            users
                .into_iter()
                .filter_map(|u| u.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(repo.list(Some("100%")).await.unwrap()), vec!["100% moto"]);
        assert_eq!(names(repo.list(Some("_nord")).await.unwrap()), vec!["Atelier Nord"]);
        assert_eq!(repo.list(Some("MOTO")).await.unwrap().len(), 2);
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
    }
}
