use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_image_urls;

/// Catégorie d'annonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Car,
    Motorcycle,
    Boat,
    Part,
    Service,
}

/// Statut de modération d'une annonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Pending
    }
}

/// Pack de mise en avant payant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumPack {
    Daily,
    Weekly,
    Monthly,
}

impl PremiumPack {
    pub fn duration(&self) -> Duration {
        match self {
            PremiumPack::Daily => Duration::days(1),
            PremiumPack::Weekly => Duration::days(7),
            PremiumPack::Monthly => Duration::days(30),
        }
    }
}

/// Motif de suppression d'une annonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    SoldOnPlatform,
    SoldElsewhere,
    NoLongerForSale,
    Moderation,
    Other,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::utils::error::AppError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err($crate::utils::error::AppError::ParseError(format!(
                        "{} inconnu: {}",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(VehicleCategory {
    Car => "car",
    Motorcycle => "motorcycle",
    Boat => "boat",
    Part => "part",
    Service => "service",
});

text_enum!(ListingStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

text_enum!(PremiumPack {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
});

text_enum!(DeletionReason {
    SoldOnPlatform => "sold_on_platform",
    SoldElsewhere => "sold_elsewhere",
    NoLongerForSale => "no_longer_for_sale",
    Moderation => "moderation",
    Other => "other",
});

pub(crate) use text_enum;

/// Annonce de véhicule (ou pièce / service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    /// Propriétaire de l'annonce
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: VehicleCategory,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub price: f64,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub location: Option<String>,
    pub images: Vec<String>,
    pub contact_phone: Option<String>,
    pub status: ListingStatus,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub is_premium: bool,
    pub premium_pack: Option<PremiumPack>,
    pub premium_until: Option<DateTime<Utc>>,
    pub favorites: i32,
    pub views: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deletion_reason: Option<DeletionReason>,
    pub deletion_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contenu éditable d'une annonce (création et mise à jour)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VehicleContent {
    #[validate(length(min = 3, max = 120, message = "Le titre doit contenir entre 3 et 120 caractères"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description trop longue (5000 caractères max)"))]
    #[serde(default)]
    pub description: String,
    pub category: VehicleCategory,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Année invalide"))]
    pub year: Option<i32>,
    #[validate(range(min = 0, message = "Le kilométrage doit être positif"))]
    pub mileage: Option<i32>,
    #[validate(range(min = 0.0, message = "Le prix doit être positif"))]
    pub price: f64,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub location: Option<String>,
    #[validate(custom = "validate_image_urls")]
    #[serde(default)]
    pub images: Vec<String>,
    pub contact_phone: Option<String>,
}

/// Demande de suppression d'une annonce
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeletionRequest {
    pub reason: DeletionReason,
    #[validate(length(max = 1000, message = "Commentaire trop long"))]
    pub comment: Option<String>,
}

impl VehicleContent {
    /// Titre débarrassé des blancs, à appeler avant `validate()`
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }
}

impl Vehicle {
    /// Crée une annonce en attente de modération
    pub fn new(user_id: Uuid, content: VehicleContent, now: DateTime<Utc>) -> Self {
        let mut vehicle = Self {
            id: Uuid::new_v4(),
            user_id,
            title: String::new(),
            description: String::new(),
            category: content.category,
            brand: None,
            model: None,
            year: None,
            mileage: None,
            price: 0.0,
            fuel_type: None,
            transmission: None,
            location: None,
            images: Vec::new(),
            contact_phone: None,
            status: ListingStatus::Pending,
            rejection_reason: None,
            is_active: true,
            is_premium: false,
            premium_pack: None,
            premium_until: None,
            favorites: 0,
            views: 0,
            deleted_at: None,
            deletion_reason: None,
            deletion_comment: None,
            created_at: now,
            updated_at: now,
        };
        vehicle.apply_content(content, now);
        vehicle
    }

    /// Remplace le contenu; toute modification repasse par la modération
    pub fn apply_content(&mut self, content: VehicleContent, now: DateTime<Utc>) {
        self.title = content.title.trim().to_string();
        self.description = content.description;
        self.category = content.category;
        self.brand = content.brand;
        self.model = content.model;
        self.year = content.year;
        self.mileage = content.mileage;
        self.price = content.price;
        self.fuel_type = content.fuel_type;
        self.transmission = content.transmission;
        self.location = content.location;
        self.images = content.images;
        self.contact_phone = content.contact_phone;
        self.status = ListingStatus::Pending;
        self.rejection_reason = None;
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Visible dans le catalogue public
    pub fn is_public(&self) -> bool {
        self.status == ListingStatus::Approved && self.is_active && !self.is_deleted()
    }

    pub fn premium_active(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_until.map_or(false, |until| until > now)
    }

    /// Active ou prolonge un pack premium
    pub fn activate_premium(&mut self, pack: PremiumPack, now: DateTime<Utc>) {
        let start = match self.premium_until {
            Some(until) if until > now => until,
            _ => now,
        };
        self.is_premium = true;
        self.premium_pack = Some(pack);
        self.premium_until = Some(start + pack.duration());
        self.updated_at = now;
    }

    pub fn mark_deleted(
        &mut self,
        reason: DeletionReason,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.deleted_at = Some(now);
        self.deletion_reason = Some(reason);
        self.deletion_comment = comment;
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn approve(&mut self, now: DateTime<Utc>) {
        self.status = ListingStatus::Approved;
        self.rejection_reason = None;
        self.updated_at = now;
    }

    pub fn reject(&mut self, reason: String, now: DateTime<Utc>) {
        self.status = ListingStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn content(title: &str, price: f64) -> VehicleContent {
        VehicleContent {
            title: title.to_string(),
            description: String::new(),
            category: VehicleCategory::Car,
            brand: None,
            model: None,
            year: None,
            mileage: None,
            price,
            fuel_type: None,
            transmission: None,
            location: None,
            images: Vec::new(),
            contact_phone: None,
        }
    }
}
