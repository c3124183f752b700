pub mod favorites;
pub mod messages;
pub mod professionals;
pub mod saved_searches;
pub mod users;
pub mod vehicles;

pub use favorites::PgFavoriteRepository;
pub use messages::PgMessageRepository;
pub use professionals::PgProfessionalRepository;
pub use saved_searches::PgSavedSearchRepository;
pub use users::PgUserRepository;
pub use vehicles::PgVehicleRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::utils::error::Result;

/// Gestion de la connexion à la base de données
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    /// Crée une nouvelle connexion à la base de données
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        info!("🔌 Connexion à la base de données PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("✅ Connexion établie avec succès");

        Ok(Self { pool })
    }

    /// Applique les migrations embarquées
    pub async fn migrate(&self) -> Result<()> {
        info!("📦 Application des migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
