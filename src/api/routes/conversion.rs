use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use futures_util::StreamExt as _;

use super::middleware::AuthenticatedUser;
use crate::core::DocumentUpload;
use crate::domain::{CompanyDetails, DocumentType};
use crate::utils::error::{AppError, Result};
use crate::AppState;

/// Étape 1 : ouverture du dossier professionnel
#[post("/account/conversion/start")]
pub async fn start_conversion(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let account = state.conversion.start(&user).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Étape 2 : identité de l'entreprise
#[post("/account/conversion/submit")]
pub async fn submit_conversion(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<CompanyDetails>,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let account = state
        .conversion
        .submit(&user, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Étape 3 : dépôt d'un justificatif (multipart `document_type` + `file`)
#[post("/account/conversion/documents")]
pub async fn upload_document(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let user = state.users.require_active(&auth.0).await?;
    let max_size = state.config.max_document_size_bytes() as usize;

    let mut document_type = DocumentType::Other;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    // Lire le multipart form
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "document_type" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    raw.extend_from_slice(&chunk?);
                }
                document_type = String::from_utf8_lossy(&raw).trim().parse()?;
            }
            "file" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("Nom de fichier manquant".to_string()))?;
                let content_type = field
                    .content_type()
                    .map(|ct| ct.essence_str().to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    data.extend_from_slice(&chunk?);
                    if data.len() > max_size {
                        return Err(AppError::FileTooLarge);
                    }
                }
                file = Some((file_name, content_type, data));
            }
            _ => {
                // Champ inconnu : on draine sans le conserver
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Aucun fichier fourni".to_string()))?;

    let document = state
        .conversion
        .upload_document(
            &user,
            DocumentUpload {
                document_type,
                file_name,
                content_type,
                data,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(document))
}

#[get("/account/conversion/status")]
pub async fn conversion_status(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse> {
    let user = state.users.ensure_user(&auth.0).await?;
    let status = state.conversion.status(&user).await?;
    Ok(HttpResponse::Ok().json(status))
}
