use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{self as auth_service, AuthConfig, AuthService};
use service::birthday::repo::seaorm::SeaOrmBirthdayRepository;
use service::birthday::BirthdayService;
use service::forms::FormContext;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub login_url: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub auth_svc: Arc<AuthService<SeaOrmAuthRepository>>,
    pub birthdays: Arc<BirthdayService<SeaOrmBirthdayRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &configs::AppConfig) -> Self {
        let auth_svc = AuthService::new(
            Arc::new(SeaOrmAuthRepository { db: db.clone() }),
            AuthConfig::from(&cfg.auth),
        );
        let birthdays = BirthdayService::new(
            Arc::new(SeaOrmBirthdayRepository { db: db.clone() }),
            cfg.birthday.page_size,
        );
        Self {
            auth: ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), login_url: cfg.auth.login_url.clone() },
            auth_svc: Arc::new(auth_svc),
            birthdays: Arc::new(birthdays),
        }
    }
}

/// The authenticated requester, injected by [`require_login`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub username: String, pub token: String }

#[derive(Debug, Default, Serialize)]
pub struct LoginForm { pub username: String }

#[derive(Serialize)]
pub struct LoginPage {
    pub form: FormContext<LoginForm>,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery { pub next: Option<String> }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let user = state.auth_svc.register(input).await?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

/// Context for the login page; `next` is where `require_login` came from.
pub async fn login_page(Query(q): Query<NextQuery>) -> Json<LoginPage> {
    Json(LoginPage { form: FormContext::unbound(LoginForm::default()), next: q.next })
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth_svc.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let out = LoginOutput { user_id: session.user.id, username: session.user.username, token: session.token };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    let jar = jar.remove(cookie);
    (jar, StatusCode::NO_CONTENT)
}

/// `login_url?next=<path and query>`
pub fn login_redirect(login_url: &str, next: &str) -> Redirect {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => Redirect::to(&format!("{login_url}?{query}")),
        Err(_) => Redirect::to(login_url),
    }
}

/// 登录校验中间件：优先读取 Authorization: Bearer <token>，缺失时回退到 auth_token Cookie。
/// 校验失败统一 303 跳转到登录页并附带 next 参数。
pub async fn require_login(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);
    let token = bearer.or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string()));

    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        tracing::debug!(path = %target, "anonymous request, redirecting to login");
        return login_redirect(&state.auth.login_url, &target).into_response();
    };

    match auth_service::verify_token(&state.auth.jwt_secret, &token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser { id: claims.uid });
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(path = %target, err = %e, "token validation failed");
            login_redirect(&state.auth.login_url, &target).into_response()
        }
    }
}
