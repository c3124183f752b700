use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use crate::domain::NewMessage;
use crate::utils::error::Result;
use crate::AppState;

/// Désigne une conversation : interlocuteur et annonce éventuelle
#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    pub with: Uuid,
    pub vehicle_id: Option<Uuid>,
}

#[post("/messages-simple/send")]
pub async fn send_message(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<NewMessage>,
) -> Result<HttpResponse> {
    let sender = state.users.ensure_user(&auth.0).await?;
    let message = state.messages.send(&sender, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(message))
}

#[get("/messages-simple/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let conversations = state.messages.conversations(user.id).await?;
    Ok(HttpResponse::Ok().json(conversations))
}

#[get("/messages-simple/thread")]
pub async fn get_thread(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<ThreadQuery>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let messages = state
        .messages
        .thread(user.id, query.with, query.vehicle_id)
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

#[post("/messages-simple/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<ThreadQuery>,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let updated = state
        .messages
        .mark_read(user.id, payload.with, payload.vehicle_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

#[get("/messages-simple/unread-count")]
pub async fn unread_count(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let count = state.messages.unread_count(user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}
