use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use axum_extra::extract::{Form, FormRejection, Query};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::IntoParams;

use service::birthday::domain::{BirthdayDetail, BirthdayFormContext, DeleteContext, ListContext};
use service::birthday::forms::BirthdayForm;
use service::errors::ServiceError;
use service::forms::FormContext;
use service::pagination::PageNumber;

use super::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;

pub const LOGIN_ONLY_TEXT: &str = "Page for logged-in users only!";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number or `last`; when repeated the last value wins
    #[serde(default)]
    pub page: Vec<String>,
}

/// Ids in the URL are integers; anything else names no page at all.
pub(crate) fn parse_id(raw: &str) -> Result<i32, JsonApiError> {
    raw.parse::<i32>()
        .map_err(|_| JsonApiError::not_found(format!("no birthday at {raw:?}")))
}

pub(crate) fn detail_url(id: i32) -> String {
    format!("/birthday/{id}")
}

/// 400 with the submitted data and its errors for invalid forms, the JSON
/// error body otherwise.
pub(crate) fn form_error<F: Serialize>(data: F, err: ServiceError) -> Response {
    match err {
        ServiceError::InvalidForm(errors) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "form": FormContext::with_errors(data, errors) }))).into_response()
        }
        other => JsonApiError::from(other).into_response(),
    }
}

#[utoipa::path(get, path = "/birthday", tag = "birthday", params(ListQuery), responses((status = 200, description = "One page of birthdays ordered by id"), (status = 404, description = "No such page")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<ListContext>, JsonApiError> {
    let page = PageNumber::parse(q.page.last().map(String::as_str))?;
    Ok(Json(state.birthdays.list(page).await?))
}

pub async fn create_page(State(state): State<ServerState>) -> Json<BirthdayFormContext> {
    Json(state.birthdays.create_form())
}

#[utoipa::path(post, path = "/birthday/create", tag = "birthday", responses((status = 303, description = "Created, redirect to detail"), (status = 400, description = "Invalid form")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<BirthdayForm>,
) -> Response {
    match state.birthdays.create(user.id, &form).await {
        Ok(created) => Redirect::to(&detail_url(created.id)).into_response(),
        Err(e) => form_error(form, e),
    }
}

#[utoipa::path(get, path = "/birthday/{id}", tag = "birthday", params(("id" = i32, Path, description = "birthday id")), responses((status = 200, description = "Birthday, countdown, comment form and congratulations"), (status = 404, description = "Not found")))]
pub async fn detail(State(state): State<ServerState>, Path(raw): Path<String>) -> Result<Json<BirthdayDetail>, JsonApiError> {
    let id = parse_id(&raw)?;
    Ok(Json(state.birthdays.detail(id).await?))
}

pub async fn edit_page(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw): Path<String>,
) -> Result<Json<BirthdayFormContext>, JsonApiError> {
    let id = parse_id(&raw)?;
    Ok(Json(state.birthdays.edit_form(user.id, id).await?))
}

pub async fn edit(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw): Path<String>,
    form: Result<Form<BirthdayForm>, FormRejection>,
) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    // 先校验作者身份，再处理请求体
    if let Err(e) = state.birthdays.ensure_author(user.id, id).await {
        return JsonApiError::from(e).into_response();
    }
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!(err = %rejection, "unreadable birthday form");
            return JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(rejection.to_string())).into_response();
        }
    };
    match state.birthdays.update(user.id, id, &form).await {
        Ok(updated) => Redirect::to(&detail_url(updated.id)).into_response(),
        Err(e) => form_error(form, e),
    }
}

pub async fn delete_page(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw): Path<String>,
) -> Result<Json<DeleteContext>, JsonApiError> {
    let id = parse_id(&raw)?;
    Ok(Json(state.birthdays.delete_form(user.id, id).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw): Path<String>,
) -> Result<Redirect, JsonApiError> {
    let id = parse_id(&raw)?;
    state.birthdays.delete(user.id, id).await?;
    Ok(Redirect::to("/birthday"))
}

pub async fn login_only() -> &'static str {
    LOGIN_ONLY_TEXT
}
