use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use superdate::auth::TokenVerifier;
use superdate::config::{LoggingSettings, Settings, StorageBackend};
use superdate::routes::{self, AppState};
use superdate::services::{MemoryStore, PostgresStore, SwipeStore};
use superdate::SwipeEngine;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)))
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging is configured from settings, so a load failure can only go to stderr
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let logging = settings.logging.clone().with_env_overrides();
    init_logging(&logging);

    info!("Starting Superdate swipe service (log level: {}, format: {})", logging.level, logging.format);

    match settings.storage.backend {
        StorageBackend::Postgres => {
            let store = PostgresStore::from_settings(&settings.database)
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            info!("PostgreSQL store initialized (max: {} connections)", settings.database.max_connections());
            serve(settings, store).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store, swipes and matches are lost on restart");
            serve(settings, MemoryStore::new()).await
        }
    }
}

async fn serve<S>(settings: Settings, store: S) -> std::io::Result<()>
where
    S: SwipeStore + Clone + 'static,
{
    let app_state = AppState {
        engine: SwipeEngine::new(store),
    };
    let verifier = Arc::new(TokenVerifier::new(&settings.auth.jwt_secret));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::from(verifier.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<S>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
