use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use crate::utils::error::Result;
use crate::AppState;

/// Annonces favorites de l'utilisateur
#[get("/favorites")]
pub async fn list_favorites(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let vehicles = state.favorites.vehicles(user.id).await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

#[get("/favorites/ids")]
pub async fn favorite_ids(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let ids = state.favorites.ids(user.id).await?;
    Ok(HttpResponse::Ok().json(ids))
}

#[post("/favorites/{vehicle_id}")]
pub async fn add_favorite(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let created = state.favorites.add(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "favorite": true, "changed": created })))
}

#[delete("/favorites/{vehicle_id}")]
pub async fn remove_favorite(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let removed = state.favorites.remove(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "favorite": false, "changed": removed })))
}
