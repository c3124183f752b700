use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{ListingStatus, Vehicle};
use crate::infrastructure::repositories::VehicleRepository;
use crate::utils::error::{AppError, Result};

const VEHICLE_COLUMNS: &str = "id, user_id, title, description, category, brand, model, year, \
    mileage, price, fuel_type, transmission, location, images, contact_phone, status, \
    rejection_reason, is_active, is_premium, premium_pack, premium_until, favorites, views, \
    deleted_at, deletion_reason, deletion_comment, created_at, updated_at";

/// Ligne brute de la table `vehicles` (énumérations stockées en TEXT)
#[derive(Debug, FromRow)]
struct VehicleRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    category: String,
    brand: Option<String>,
    model: Option<String>,
    year: Option<i32>,
    mileage: Option<i32>,
    price: f64,
    fuel_type: Option<String>,
    transmission: Option<String>,
    location: Option<String>,
    images: Vec<String>,
    contact_phone: Option<String>,
    status: String,
    rejection_reason: Option<String>,
    is_active: bool,
    is_premium: bool,
    premium_pack: Option<String>,
    premium_until: Option<DateTime<Utc>>,
    favorites: i32,
    views: i32,
    deleted_at: Option<DateTime<Utc>>,
    deletion_reason: Option<String>,
    deletion_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = AppError;

    fn try_from(row: VehicleRow) -> Result<Self> {
        Ok(Vehicle {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            category: row.category.parse()?,
            brand: row.brand,
            model: row.model,
            year: row.year,
            mileage: row.mileage,
            price: row.price,
            fuel_type: row.fuel_type,
            transmission: row.transmission,
            location: row.location,
            images: row.images,
            contact_phone: row.contact_phone,
            status: row.status.parse()?,
            rejection_reason: row.rejection_reason,
            is_active: row.is_active,
            is_premium: row.is_premium,
            premium_pack: row.premium_pack.map(|p| p.parse()).transpose()?,
            premium_until: row.premium_until,
            favorites: row.favorites,
            views: row.views,
            deleted_at: row.deleted_at,
            deletion_reason: row.deletion_reason.map(|r| r.parse()).transpose()?,
            deletion_comment: row.deletion_comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_vehicles(rows: Vec<VehicleRow>) -> Result<Vec<Vehicle>> {
    rows.into_iter().map(Vehicle::try_from).collect()
}

/// Repository Postgres des annonces
#[derive(Clone)]
pub struct PgVehicleRepository {
    pool: Pool<Postgres>,
}

impl PgVehicleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn upsert(&self, vehicle: &Vehicle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, user_id, title, description, category, brand, model, year,
                mileage, price, fuel_type, transmission, location, images, contact_phone,
                status, rejection_reason, is_active, is_premium, premium_pack, premium_until,
                favorites, views, deleted_at, deletion_reason, deletion_comment,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                category = EXCLUDED.category,
                brand = EXCLUDED.brand,
                model = EXCLUDED.model,
                year = EXCLUDED.year,
                mileage = EXCLUDED.mileage,
                price = EXCLUDED.price,
                fuel_type = EXCLUDED.fuel_type,
                transmission = EXCLUDED.transmission,
                location = EXCLUDED.location,
                images = EXCLUDED.images,
                contact_phone = EXCLUDED.contact_phone,
                status = EXCLUDED.status,
                rejection_reason = EXCLUDED.rejection_reason,
                is_active = EXCLUDED.is_active,
                is_premium = EXCLUDED.is_premium,
                premium_pack = EXCLUDED.premium_pack,
                premium_until = EXCLUDED.premium_until,
                deleted_at = EXCLUDED.deleted_at,
                deletion_reason = EXCLUDED.deletion_reason,
                deletion_comment = EXCLUDED.deletion_comment,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.user_id)
        .bind(&vehicle.title)
        .bind(&vehicle.description)
        .bind(vehicle.category.as_str())
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(vehicle.price)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.transmission)
        .bind(&vehicle.location)
        .bind(&vehicle.images)
        .bind(&vehicle.contact_phone)
        .bind(vehicle.status.as_str())
        .bind(&vehicle.rejection_reason)
        .bind(vehicle.is_active)
        .bind(vehicle.is_premium)
        .bind(vehicle.premium_pack.map(|p| p.as_str()))
        .bind(vehicle.premium_until)
        .bind(vehicle.favorites)
        .bind(vehicle.views)
        .bind(vehicle.deleted_at)
        .bind(vehicle.deletion_reason.map(|r| r.as_str()))
        .bind(&vehicle.deletion_comment)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn list_public(&self) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles \
             WHERE status = 'approved' AND is_active AND deleted_at IS NULL \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_vehicles(rows)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles \
             WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_vehicles(rows)
    }

    async fn list_all(&self, status: Option<ListingStatus>) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles \
             WHERE deleted_at IS NULL AND ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        into_vehicles(rows)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        into_vehicles(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn insert(&self, vehicle: &Vehicle) -> Result<()> {
        self.upsert(vehicle).await
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<()> {
        self.upsert(vehicle).await
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE vehicles SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn adjust_favorites(&self, id: Uuid, delta: i32) -> Result<()> {
        sqlx::query("UPDATE vehicles SET favorites = GREATEST(favorites + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn deactivate_owner_listings(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE vehicles SET is_active = FALSE, updated_at = NOW() \
             WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_deleted(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vehicles WHERE deleted_at IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
