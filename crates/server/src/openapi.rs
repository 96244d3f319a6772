use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub username: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

/// Form-encoded body of the create/edit endpoints; `tags` may repeat.
#[derive(ToSchema)]
pub struct BirthdayFormDoc {
    pub first_name: String,
    pub last_name: Option<String>,
    /// YYYY-MM-DD
    pub birthday: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

#[derive(ToSchema)]
pub struct CongratulationFormDoc { pub text: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::birthdays::list,
        crate::routes::birthdays::create,
        crate::routes::birthdays::detail,
        crate::routes::congratulations::add_congratulation,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            BirthdayFormDoc,
            CongratulationFormDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "birthday")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
