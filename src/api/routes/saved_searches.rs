use actix_web::{delete, get, patch, post, web, HttpResponse};
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use crate::domain::{NewSavedSearch, SavedSearchUpdate};
use crate::utils::error::Result;
use crate::AppState;

#[get("/saved-searches")]
pub async fn list_saved_searches(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let searches = state.saved_searches.list(user.id).await?;
    Ok(HttpResponse::Ok().json(searches))
}

#[post("/saved-searches")]
pub async fn create_saved_search(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<NewSavedSearch>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let search = state
        .saved_searches
        .create(user.id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(search))
}

#[patch("/saved-searches/{id}")]
pub async fn update_saved_search(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<SavedSearchUpdate>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let search = state
        .saved_searches
        .update(user.id, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(search))
}

#[delete("/saved-searches/{id}")]
pub async fn delete_saved_search(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    state.saved_searches.delete(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Rejoue les filtres enregistrés sur le catalogue
#[get("/saved-searches/{id}/results")]
pub async fn saved_search_results(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let vehicles = state
        .saved_searches
        .results(user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicles))
}
