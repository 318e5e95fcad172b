//! Upload handler server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tokio::sync::Semaphore;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use upload_handler_lib::api;
use upload_handler_lib::config::Config;
use upload_handler_lib::middleware::RequestLogger;
use upload_handler_lib::services::{
    self, CleanupConfig, LocalStorage, ParseLimits, StorageWriter, UploadHandler,
};

/// Readiness check behind `--health-check`: configuration loads and the storage
/// root can be prepared.
async fn health_check() -> bool {
    match Config::from_env() {
        Ok(config) => LocalStorage::new(&config.storage_dir).await.is_ok(),
        Err(_) => false,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // --health-check reports readiness through the exit code instead of serving
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check().await { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, UPL_STORAGE_DIR must be an absolute, non-default path");
            error!("  - Numeric limits must be valid non-negative integers");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Upload Handler");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    // Prepare storage root and its temp area
    let storage = match LocalStorage::new(&config.storage_dir).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!(
                "Failed to prepare storage directory {}: {}",
                config.storage_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };
    info!("Storing uploads in {}", storage.root().display());

    // Start the cleanup background task
    let cleanup_config = CleanupConfig {
        temp_dir: storage.temp_dir().to_path_buf(),
        retention_secs: config.temp_retention_secs,
        interval_secs: if config.is_development() { 60 } else { 3600 }, // 1 min dev, 1 hour prod
    };
    services::start_cleanup_task(cleanup_config);

    // Prepare shared state
    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let handler = web::Data::new(UploadHandler::new(
        config.policy.clone(),
        StorageWriter::new(storage),
    ));
    let limits = web::Data::new(ParseLimits {
        max_request_size: config.max_request_size,
        default_mode: config.default_mode,
    });

    // Create upload semaphore to limit concurrent uploads
    // This bounds memory usage: max_concurrent_uploads × max_request_size
    let upload_semaphore = web::Data::new(Arc::new(Semaphore::new(config.max_concurrent_uploads)));
    info!(
        "Upload limits: {} per file, {}MB per request, {} concurrent uploads, default mode {}",
        config
            .policy
            .max_file_size
            .map(|size| format!("{} bytes", size))
            .unwrap_or_else(|| "unlimited".to_string()),
        config.max_request_size / 1024 / 1024,
        config.max_concurrent_uploads,
        config.default_mode
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Same-origin only
        let cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(handler.clone())
            .app_data(limits.clone())
            .app_data(upload_semaphore.clone())
            .configure(api::configure_routes)
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
