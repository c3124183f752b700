use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::middleware::AdminUser;
use crate::core::{AdminLogin, ModerationAction, UserAction};
use crate::domain::{DeletionRequest, ListingStatus, VerificationStatus};
use crate::utils::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery<S> {
    pub status: Option<S>,
}

/// Connexion au back-office
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<AppState>,
    payload: web::Json<AdminLogin>,
) -> Result<HttpResponse> {
    let session = state.admin.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/admin/stats")]
pub async fn admin_stats(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
    let stats = state.admin.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

// Utilisateurs

#[get("/admin/users")]
pub async fn admin_list_users(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<UserSearchQuery>,
) -> Result<HttpResponse> {
    let users = state.admin.list_users(query.search.as_deref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[patch("/admin/users/{id}")]
pub async fn admin_moderate_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    payload: web::Json<UserAction>,
) -> Result<HttpResponse> {
    let user = state
        .admin
        .moderate_user(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

// Annonces

#[get("/admin/vehicles")]
pub async fn admin_list_vehicles(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<StatusQuery<ListingStatus>>,
) -> Result<HttpResponse> {
    let vehicles = state.admin.list_vehicles(query.status).await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

#[patch("/admin/vehicles/{id}")]
pub async fn admin_moderate_vehicle(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    payload: web::Json<ModerationAction>,
) -> Result<HttpResponse> {
    let vehicle = state
        .admin
        .moderate_vehicle(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

#[delete("/admin/vehicles/{id}")]
pub async fn admin_delete_vehicle(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    payload: web::Json<DeletionRequest>,
) -> Result<HttpResponse> {
    let vehicle = state
        .admin
        .delete_vehicle(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

// Comptes professionnels

#[get("/admin/professional-accounts")]
pub async fn admin_list_professionals(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<StatusQuery<VerificationStatus>>,
) -> Result<HttpResponse> {
    let accounts = state.admin.list_professionals(query.status).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

#[patch("/admin/professional-accounts/{id}")]
pub async fn admin_review_professional(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    payload: web::Json<ModerationAction>,
) -> Result<HttpResponse> {
    let account = state
        .admin
        .review_professional(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

#[get("/admin/professional-accounts/{id}/documents")]
pub async fn admin_list_documents(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let documents = state.admin.list_documents(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(documents))
}

/// Contenu brut d'un justificatif
#[get("/admin/documents/{id}")]
pub async fn admin_download_document(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let (document, data) = state.admin.download_document(path.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type(document.content_type.as_str())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.file_name)],
        })
        .body(data))
}
