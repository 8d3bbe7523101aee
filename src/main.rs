use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use carte_engine::config::{Settings, StoreBackend};
use carte_engine::core::MapEngine;
use carte_engine::routes::{self, map::AppState};
use carte_engine::services::{refresh_once, spawn_refresh_task, OfferStore, StaticOfferStore, SupabaseStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; logging comes up first so failures are reported
    let settings = match std::env::var("CARTE_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    // Initialize logging, LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting carte engine...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // Initialize offer store
    let store: Arc<dyn OfferStore> = match settings.store.backend {
        StoreBackend::Supabase => {
            let store = SupabaseStore::new(
                settings.store.url.clone(),
                settings.store.api_key.clone(),
                settings.store.timeout(),
            )
            .map_err(|e| {
                error!("Failed to create Supabase client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("Supabase store initialized ({})", settings.store.url);
            Arc::new(store)
        }
        StoreBackend::Seed => {
            warn!("Using built-in seed offers");
            Arc::new(StaticOfferStore::seed())
        }
    };

    // Initialize engine
    let engine_config = settings.engine_config();
    info!("Map engine initialized with viewport: {:?}", engine_config.viewport);
    let engine = Arc::new(Mutex::new(MapEngine::new(engine_config)));

    // Initial fetch; a failure leaves an empty map until the next refresh
    if let Err(e) = refresh_once(store.as_ref(), &engine).await {
        warn!("Initial offer fetch failed, starting with an empty map: {}", e);
    }

    if let Some(period) = settings.refresh.interval() {
        spawn_refresh_task(store.clone(), engine.clone(), period);
    } else {
        info!("Periodic refresh disabled");
    }

    let app_state = AppState { store, engine };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
