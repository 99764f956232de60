//! app.rs
use crate::handlers::{candidate_handler, health_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(candidate_handler::json_error_handler))
        .route("/health", web::get().to(health_handler::health_endpoint))
        .service(
            web::scope("/api").service(
                web::scope("/candidates")
                    .route(
                        "",
                        web::post().to(candidate_handler::create_candidate_endpoint),
                    )
                    .route(
                        "",
                        web::get().to(candidate_handler::list_candidates_endpoint),
                    )
                    .route(
                        "/success",
                        web::get().to(candidate_handler::list_successful_endpoint),
                    ),
            ),
        );
}
