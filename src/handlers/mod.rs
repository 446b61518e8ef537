pub mod voice;

pub use voice::*;

use crate::health;
use actix_web::web;

/// Registers every API route. Shared by the server binary and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(voice::json_error_handler))
            .route("/voice-command", web::post().to(voice::voice_command))
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics)),
    );
}
