pub mod cache;
pub mod database;
pub mod memory;
pub mod repositories;
pub mod storage;

pub use cache::{ListingCache, TtlCache};
pub use database::Database;
pub use memory::MemoryStore;
pub use repositories::{
    FavoriteRepository, MessageRepository, ProfessionalRepository, Repositories,
    SavedSearchRepository, UserRepository, VehicleRepository,
};
pub use storage::DocumentStorage;
