use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::infrastructure::repositories::FavoriteRepository;
use crate::utils::error::Result;

/// Relation utilisateur → annonce favorite
#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: Pool<Postgres>,
}

impl PgFavoriteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn list_vehicle_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT vehicle_id FROM favorites WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn add(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, vehicle_id, created_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id, vehicle_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND vehicle_id = $2")
            .bind(user_id)
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::{approved_vehicle, user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[ignore = "nécessite DATABASE_URL (Postgres)"]
    async fn test_add_and_remove_are_idempotent(pool: PgPool) {
        let seller = user(&pool, "vendeur@example.com").await;
        let buyer = user(&pool, "acheteur@example.com").await;
        let first = approved_vehicle(&pool, seller.id, "Ducati Monster", 9900.0).await;
        let second = approved_vehicle(&pool, seller.id, "Vespa GTS 300", 5200.0).await;
        let repo = PgFavoriteRepository::new(pool.clone());

        assert!(repo.add(buyer.id, first.id).await.unwrap());
        assert!(!repo.add(buyer.id, first.id).await.unwrap());
        assert!(repo.add(buyer.id, second.id).await.unwrap());

        let mut ids = repo.list_vehicle_ids(buyer.id).await.unwrap();
        ids.sort();
        let mut expected = vec![first.id, second.id];
        expected.sort();
        assert_eq!(ids, expected);
        assert!(repo.list_vehicle_ids(seller.id).await.unwrap().is_empty());

        assert!(repo.remove(buyer.id, first.id).await.unwrap());
        assert!(!repo.remove(buyer.id, first.id).await.unwrap());
        assert_eq!(repo.list_vehicle_ids(buyer.id).await.unwrap(), vec![second.id]);
    }
}
