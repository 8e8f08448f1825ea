// Route exports
pub mod swipes;

use actix_web::{error, web, HttpRequest};

use crate::models::ErrorResponse;
use crate::services::SwipeStore;

pub use swipes::AppState;

pub fn configure_routes<S: SwipeStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(swipes::configure::<S>),
    );
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = actix_web::HttpResponse::BadRequest()
        .json(ErrorResponse::new("invalid_json", format!("Invalid JSON: {}", err)));
    error::InternalError::from_response(err, response).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = actix_web::HttpResponse::BadRequest()
        .json(ErrorResponse::new("invalid_query", format!("Invalid query: {}", err)));
    error::InternalError::from_response(err, response).into()
}
