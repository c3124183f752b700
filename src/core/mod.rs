// core/mod.rs
pub mod admin_service;
pub mod conversion_service;
pub mod favorite_service;
pub mod message_service;
pub mod saved_search_service;
pub mod user_service;
pub mod vehicle_service;

// Ré-exports pour faciliter l'import
pub use admin_service::{AdminLogin, AdminService, AdminStats, AdminToken, ModerationAction, UserAction};
pub use conversion_service::{ConversionService, ConversionStatus, DocumentUpload};
pub use favorite_service::FavoriteService;
pub use message_service::MessageService;
pub use saved_search_service::SavedSearchService;
pub use user_service::{Storefront, UserService};
pub use vehicle_service::VehicleService;
