use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use crate::domain::{DeletionRequest, PremiumPack, SearchFilters, VehicleContent};
use crate::utils::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct PremiumRequest {
    pub pack: PremiumPack,
}

/// Catalogue public filtré et trié
#[get("/vehicles")]
pub async fn search_vehicles(
    state: web::Data<AppState>,
    filters: web::Query<SearchFilters>,
) -> Result<HttpResponse> {
    let vehicles = state.vehicles.search(&filters).await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

/// Annonces du vendeur connecté
#[get("/vehicles/mine")]
pub async fn my_vehicles(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let vehicles = state.vehicles.list_own(user.id).await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

#[get("/vehicles/{id}")]
pub async fn get_vehicle(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let vehicle = state.vehicles.get_public(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

#[post("/vehicles")]
pub async fn create_vehicle(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<VehicleContent>,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let vehicle = state.vehicles.create(&user, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(vehicle))
}

#[put("/vehicles/{id}")]
pub async fn update_vehicle(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<VehicleContent>,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let vehicle = state
        .vehicles
        .update(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

#[patch("/vehicles/{id}/active")]
pub async fn set_vehicle_active(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<SetActiveRequest>,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let vehicle = state
        .vehicles
        .set_active(&user, path.into_inner(), payload.is_active)
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

/// Suppression logique avec motif
#[delete("/vehicles/{id}")]
pub async fn delete_vehicle(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<DeletionRequest>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let vehicle = state
        .vehicles
        .delete(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

#[post("/vehicles/{id}/premium")]
pub async fn activate_premium(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<PremiumRequest>,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let vehicle = state
        .vehicles
        .activate_premium(&user, path.into_inner(), payload.pack)
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}
