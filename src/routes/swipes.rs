use actix_web::{error, web, HttpRequest, HttpResponse, Responder, ResponseError};
use validator::Validate;

use crate::auth::AuthenticatedPrincipal;
use crate::core::SwipeEngine;
use crate::error::{InvalidReason, SwipeError};
use crate::models::{
    ErrorResponse, HealthResponse, ListQuery, MatchSummary, MatchesResponse, RecordSwipeRequest,
    SeenProfilesResponse, SwipeResponse,
};
use crate::services::SwipeStore;

/// Application state shared across all handlers
pub struct AppState<S> {
    pub engine: SwipeEngine<S>,
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

/// Configure swipe and match routes
pub fn configure<S: SwipeStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check::<S>))
        .service(
            web::resource("/swipe")
                .app_data(web::JsonConfig::default().error_handler(handle_swipe_payload_error))
                .route(web::post().to(record_swipe::<S>)),
        )
        .route("/swipes/seen", web::get().to(seen_profiles::<S>))
        .route("/matches", web::get().to(list_matches::<S>));
}

/// A swipe body that parses as JSON but has wrongly typed fields is a
/// malformed swipe request, not a JSON error
fn handle_swipe_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    if !matches!(err, error::JsonPayloadError::Deserialize(_)) {
        return super::handle_json_payload_error(err, req);
    }

    tracing::info!("Malformed swipe body on {}: {}", req.path(), err);
    let response = SwipeError::from(InvalidReason::MissingFields).error_response();
    error::InternalError::from_response(err, response).into()
}

/// Health check endpoint
async fn health_check<S: SwipeStore>(state: web::Data<AppState<S>>) -> impl Responder {
    let status = if state.engine.health_check().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Record swipe endpoint
///
/// POST /api/v1/swipe
///
/// Request body:
/// ```json
/// {
///   "target_user_id": "string",
///   "action": "like|pass"
/// }
/// ```
async fn record_swipe<S: SwipeStore>(
    state: web::Data<AppState<S>>,
    principal: AuthenticatedPrincipal,
    req: web::Json<RecordSwipeRequest>,
) -> Result<HttpResponse, SwipeError> {
    let actor = principal.0;

    // Storage failures are logged by the engine
    let result = state.engine.record_swipe(&actor, &req).await.map_err(|e| {
        if let SwipeError::InvalidRequest(reason) = &e {
            tracing::info!("Rejected swipe from {}: {}", actor, reason.code());
        }
        e
    })?;

    Ok(HttpResponse::Ok().json(SwipeResponse { ok: true, result }))
}

/// Targets the caller has already swiped
///
/// GET /api/v1/swipes/seen?limit={limit}
async fn seen_profiles<S: SwipeStore>(
    state: web::Data<AppState<S>>,
    principal: AuthenticatedPrincipal,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, SwipeError> {
    if let Err(errors) = query.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("invalid_query", errors.to_string())));
    }

    let user_id = principal.0;
    let seen_profiles = state.engine.swiped_targets(&user_id, query.limit).await?;

    Ok(HttpResponse::Ok().json(SeenProfilesResponse {
        count: seen_profiles.len(),
        user_id,
        seen_profiles,
    }))
}

/// Matches the caller is part of
///
/// GET /api/v1/matches?limit={limit}
async fn list_matches<S: SwipeStore>(
    state: web::Data<AppState<S>>,
    principal: AuthenticatedPrincipal,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, SwipeError> {
    if let Err(errors) = query.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("invalid_query", errors.to_string())));
    }

    let user_id = principal.0;
    let matches: Vec<MatchSummary> = state
        .engine
        .matches_for(&user_id, query.limit)
        .await?
        .into_iter()
        .filter_map(|m| MatchSummary::for_viewer(&user_id, m))
        .collect();

    Ok(HttpResponse::Ok().json(MatchesResponse {
        count: matches.len(),
        user_id,
        matches,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, TokenVerifier};
    use crate::services::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn bearer(user_id: &str) -> (&'static str, String) {
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState { engine: SwipeEngine::new($store) }))
                    .app_data(web::Data::new(TokenVerifier::new(SECRET)))
                    .configure(crate::routes::configure_routes::<MemoryStore>),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_swipe_requires_token() {
        let app = app!(MemoryStore::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/swipe")
            .set_json(serde_json::json!({"target_user_id": "b", "action": "like"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_mutual_like_over_http() {
        let store = MemoryStore::new();
        let app = app!(store.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/swipe")
            .insert_header(bearer("a"))
            .set_json(serde_json::json!({"target_user_id": "b", "action": "like"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["is_mutual"], false);
        assert!(body["match"].is_null());

        let req = test::TestRequest::post()
            .uri("/api/v1/swipe")
            .insert_header(bearer("b"))
            .set_json(serde_json::json!({"target_user_id": "a", "action": "like"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_mutual"], true);
        assert_eq!(body["match"]["low_id"], "a");
        assert_eq!(body["match"]["high_id"], "b");
        assert_eq!(store.match_count().await, 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/matches")
            .insert_header(bearer("a"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["matches"][0]["partnerId"], "b");
    }

    #[actix_web::test]
    async fn test_invalid_requests_map_to_400() {
        let app = app!(MemoryStore::new());

        for (payload, code) in [
            (serde_json::json!({"action": "like"}), "missing_fields"),
            (serde_json::json!({"target_user_id": "b", "action": "wink"}), "invalid_action"),
            (serde_json::json!({"target_user_id": "a", "action": "like"}), "cannot_swipe_self"),
            (serde_json::json!({"target_user_id": 5, "action": "like"}), "missing_fields"),
            (serde_json::json!({"target_user_id": "b", "action": ["like"]}), "missing_fields"),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/swipe")
                .insert_header(bearer("a"))
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["ok"], false);
            assert_eq!(body["error"], code);
        }
    }

    #[actix_web::test]
    async fn test_seen_profiles_lists_swiped_targets() {
        let app = app!(MemoryStore::new());

        for target in ["b", "c"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/swipe")
                .insert_header(bearer("a"))
                .set_json(serde_json::json!({"target_user_id": target, "action": "pass"}))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/swipes/seen?limit=10")
            .insert_header(bearer("a"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["userId"], "a");
        assert_eq!(body["count"], 2);
    }

    #[actix_web::test]
    async fn test_health_reports_healthy() {
        let app = app!(MemoryStore::new());
        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }
}
