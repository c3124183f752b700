pub mod routes;

use actix_web::web;

use crate::utils::error::AppError;

pub use routes::middleware::{AdminUser, AuthenticatedUser};

/// Configure toutes les routes de l'API
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Erreurs d'extraction au format `{ error, code }`
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::Validation(err.to_string()).into()
            }))
            // Annonces (`/vehicles/mine` avant `/vehicles/{id}`)
            .service(routes::vehicles::search_vehicles)
            .service(routes::vehicles::my_vehicles)
            .service(routes::vehicles::get_vehicle)
            .service(routes::vehicles::create_vehicle)
            .service(routes::vehicles::update_vehicle)
            .service(routes::vehicles::set_vehicle_active)
            .service(routes::vehicles::delete_vehicle)
            .service(routes::vehicles::activate_premium)
            // Favoris
            .service(routes::favorites::list_favorites)
            .service(routes::favorites::favorite_ids)
            .service(routes::favorites::add_favorite)
            .service(routes::favorites::remove_favorite)
            // Recherches sauvegardées
            .service(routes::saved_searches::list_saved_searches)
            .service(routes::saved_searches::create_saved_search)
            .service(routes::saved_searches::update_saved_search)
            .service(routes::saved_searches::delete_saved_search)
            .service(routes::saved_searches::saved_search_results)
            // Messagerie
            .service(routes::messages::send_message)
            .service(routes::messages::list_conversations)
            .service(routes::messages::get_thread)
            .service(routes::messages::mark_read)
            .service(routes::messages::unread_count)
            // Compte
            .service(routes::users::get_me)
            .service(routes::users::update_me)
            .service(routes::users::storefront)
            .service(routes::conversion::start_conversion)
            .service(routes::conversion::submit_conversion)
            .service(routes::conversion::upload_document)
            .service(routes::conversion::conversion_status)
            // Back-office
            .service(routes::admin::admin_login)
            .service(routes::admin::admin_stats)
            .service(routes::admin::admin_list_users)
            .service(routes::admin::admin_moderate_user)
            .service(routes::admin::admin_list_vehicles)
            .service(routes::admin::admin_moderate_vehicle)
            .service(routes::admin::admin_delete_vehicle)
            .service(routes::admin::admin_list_professionals)
            .service(routes::admin::admin_review_professional)
            .service(routes::admin::admin_list_documents)
            .service(routes::admin::admin_download_document),
    );

    // Endpoint de santé
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
}

/// Endpoint de santé pour monitoring
async fn health_check() -> impl actix_web::Responder {
    actix_web::HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "name": crate::NAME,
        "version": crate::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
