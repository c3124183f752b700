use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passion_auto_2_roues::{api, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Chargement de la configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Impossible de charger la configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialisation du logging
    setup_tracing(&config.log_level, &config.log_format);
    info!("🚀 Démarrage de PassionAuto2Roues Backend");
    info!("🔧 Mode: {}", config.run_mode);

    if config.jwt_secret.len() < 32 {
        warn!("⚠️  JWT_SECRET trop court (< 32 caractères) - risque de sécurité");
    }
    if config.is_production() && config.admin_password == "change-me-admin" {
        warn!("⚠️  ADMIN_PASSWORD par défaut en production");
    }

    let bind_address = format!("{}:{}", config.server_host, config.server_port);
    let workers = config.workers;
    let frontend_url = config.frontend_url.clone();

    // Création de l'état de l'application
    let state = match AppState::build(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("❌ Initialisation impossible: {}", e);
            std::process::exit(1);
        }
    };

    // Configuration du serveur Actix-Web
    let server = HttpServer::new(move || {
        let cors = match &frontend_url {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
                .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
                .max_age(3600),
            None => Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600),
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(state.clone())
            .configure(api::config)
    })
    .bind(&bind_address)?
    .workers(workers)
    .shutdown_timeout(10);

    info!("✅ Backend démarré avec succès!");
    info!("🔗 API disponible sur http://{}", bind_address);

    server.run().await
}

/// Configure le tracing pour le logging structuré
fn setup_tracing(log_level: &str, log_format: &str) {
    let log_level = log_level.parse().unwrap_or(tracing::Level::INFO);

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.into()),
        )
        .with(if log_format == "json" {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        } else {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_file(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        });

    subscriber.init();
}
