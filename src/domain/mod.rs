//! # Domain Models Module
//!
//! Entités métier de la marketplace et règles qui ne dépendent ni de la
//! base de données ni du transport HTTP.
//!
//! ## Structure
//! - `vehicle.rs`: annonces, modération, suppression, packs premium
//! - `search.rs`: filtres et tris du catalogue
//! - `user.rs`: utilisateur miroir du fournisseur d'identité
//! - `professional.rs`: conversion en compte professionnel
//! - `saved_search.rs`: recherches sauvegardées et alertes
//! - `message.rs`: messagerie et regroupement en conversations
//!
//! ## Conventions
//! - Tous les modèles implémentent `serde::Serialize` et `serde::Deserialize`
//! - Les identifiants utilisent `uuid::Uuid`
//! - Les timestamps utilisent `chrono::DateTime<chrono::Utc>`
//! - Les fonctions de transition reçoivent `now` pour rester déterministes

pub mod message;
pub mod professional;
pub mod saved_search;
pub mod search;
pub mod user;
pub mod vehicle;

// Ré-export des types principaux pour une utilisation facile
pub use message::{ConversationSummary, Message, NewMessage};
pub use professional::{
    CompanyDetails, DocumentType, ProfessionalAccount, ReviewDecision, VerificationDocument,
    VerificationStatus,
};
pub use saved_search::{NewSavedSearch, SavedSearch, SavedSearchUpdate};
pub use search::{SearchFilters, SortOrder};
pub use user::{AccountType, ProfileUpdate, User};
pub use vehicle::{
    DeletionReason, DeletionRequest, ListingStatus, PremiumPack, Vehicle, VehicleCategory,
    VehicleContent,
};
