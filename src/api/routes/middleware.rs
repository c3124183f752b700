//! # API Middleware
//!
//! Extracteurs d'authentification utilisés par les handlers :
//! - `AuthenticatedUser` : token du fournisseur d'identité (HS256, audience)
//! - `AdminUser` : token de session admin émis par `/api/admin/login`
//!
//! Un token absent ou mal formé donne 401, un token valide sans les
//! privilèges requis donne 403.

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::utils::error::{AppError, Result};
use crate::utils::security::{bearer_token, verify_identity_token, AdminClaims, IdentityClaims};
use crate::AppState;

/// Utilisateur authentifié par le fournisseur d'identité
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub IdentityClaims);

/// Administrateur authentifié
#[derive(Debug, Clone)]
pub struct AdminUser(pub AdminClaims);

fn app_state(req: &HttpRequest) -> Result<&web::Data<AppState>> {
    req.app_data::<web::Data<AppState>>()
        .ok_or(AppError::Internal)
}

fn request_token(req: &HttpRequest) -> Result<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::Unauthorized)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let state = app_state(req)?;
    let token = request_token(req)?;
    let claims = verify_identity_token(token, &state.config.jwt_secret, &state.config.jwt_audience)?;
    Ok(AuthenticatedUser(claims))
}

fn authenticate_admin(req: &HttpRequest) -> Result<AdminUser> {
    let state = app_state(req)?;
    let token = request_token(req)?;
    let claims = state.admin.verify(token)?;
    Ok(AdminUser(claims))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate_admin(req))
    }
}
