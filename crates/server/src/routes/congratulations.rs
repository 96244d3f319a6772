use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::Form;

use service::birthday::forms::CongratulationForm;

use super::auth::{CurrentUser, ServerState};
use super::birthdays::{detail_url, form_error, parse_id};

/// Only `text` is read from the body; the author is the requester and the
/// birthday is the one in the path.
#[utoipa::path(post, path = "/birthday/{id}/comment", tag = "birthday", params(("id" = i32, Path, description = "birthday id")), responses((status = 303, description = "Added, redirect to detail"), (status = 400, description = "Invalid form"), (status = 404, description = "Not found")))]
pub async fn add_congratulation(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(raw): Path<String>,
    Form(form): Form<CongratulationForm>,
) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match state.birthdays.add_congratulation(user.id, id, &form).await {
        Ok(_) => Redirect::to(&detail_url(id)).into_response(),
        Err(e) => form_error(form, e),
    }
}
