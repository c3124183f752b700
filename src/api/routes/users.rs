use actix_web::{get, patch, web, HttpResponse};
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use crate::domain::ProfileUpdate;
use crate::utils::error::Result;
use crate::AppState;

/// Profil de l'utilisateur connecté (créé au premier appel)
#[get("/users/me")]
pub async fn get_me(state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse> {
    let user = state.users.me(&auth.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[patch("/users/me")]
pub async fn update_me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .update_profile(&auth.0, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Vitrine publique d'un professionnel vérifié
#[get("/users/{id}/storefront")]
pub async fn storefront(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let storefront = state.users.storefront(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(storefront))
}
