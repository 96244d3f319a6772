pub mod auth;
pub mod birthdays;
pub mod congratulations;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::openapi;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public routes (health, docs, auth)
/// and the birthday routes behind `require_login`.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/birthday", get(birthdays::list))
        .route("/birthday/create", get(birthdays::create_page).post(birthdays::create))
        .route("/birthday/login-only", get(birthdays::login_only))
        .route("/birthday/:id", get(birthdays::detail))
        .route("/birthday/:id/edit", get(birthdays::edit_page).post(birthdays::edit))
        .route("/birthday/:id/delete", get(birthdays::delete_page).post(birthdays::delete))
        .route("/birthday/:id/comment", post(congratulations::add_congratulation))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_login));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
