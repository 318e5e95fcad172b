//! API endpoint modules.

pub mod files;
pub mod health;
pub mod upload;

use actix_web::web;

/// Register all routes.
///
/// The upload form posts to `/upload`; the same handler is also mounted
/// under `/api/v1` next to the health check.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload::upload)
        .service(files::serve_file)
        .service(
            web::scope("/api/v1")
                .service(health::health)
                .service(upload::upload),
        );
}
