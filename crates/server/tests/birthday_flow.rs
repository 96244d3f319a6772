use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};

async fn build_app() -> anyhow::Result<(Router, DatabaseConnection)> {
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    let db_cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&db_cfg).await?;
    migration::Migrator::up(&db, None).await?;
    let state = ServerState::new(db.clone(), &cfg);
    Ok((routes::build_router(state, tower_http::cors::CorsLayer::very_permissive()), db))
}

async fn body_json(resp: Response<Body>) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Register + login; returns the bearer token.
async fn sign_up(app: &Router, username: &str) -> anyhow::Result<String> {
    let req = Request::post("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "S3curePass!",
        }))?))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::post("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": username, "password": "S3curePass!"}))?))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_some());
    let body = body_json(resp).await?;
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

async fn get(app: &Router, uri: &str, token: &str) -> anyhow::Result<Response<Body>> {
    let req = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    Ok(app.clone().oneshot(req).await?)
}

async fn post_form(app: &Router, uri: &str, token: &str, form: &str) -> anyhow::Result<Response<Body>> {
    let req = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))?;
    Ok(app.clone().oneshot(req).await?)
}

async fn post_empty(app: &Router, uri: &str, token: &str) -> anyhow::Result<Response<Body>> {
    let req = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    Ok(app.clone().oneshot(req).await?)
}

#[tokio::test]
async fn anonymous_requests_redirect_to_login() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;

    for uri in ["/birthday", "/birthday/login-only", "/birthday/create", "/birthday/1"] {
        let resp = app.clone().oneshot(Request::get(uri).body(Body::empty())?).await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert!(location(&resp).starts_with("/auth/login?next="), "{uri}");
    }

    let resp = app.clone().oneshot(Request::get("/birthday?page=2").body(Body::empty())?).await?;
    assert_eq!(location(&resp), "/auth/login?next=%2Fbirthday%3Fpage%3D2");

    let resp = get(&app, "/birthday", "garbage").await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app.clone().oneshot(Request::get("/auth/login?next=%2Fbirthday").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?["next"], "/birthday");

    let resp = app.clone().oneshot(Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn login_only_page_is_plain_text() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let token = sign_up(&app, "alice").await?;

    let resp = get(&app, "/birthday/login-only", &token).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(content_type.starts_with("text/plain"));
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"Page for logged-in users only!");
    Ok(())
}

#[tokio::test]
async fn cookie_session_is_accepted() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let token = sign_up(&app, "carol").await?;
    let req = Request::get("/birthday")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_and_view_birthday() -> anyhow::Result<()> {
    let (app, db) = build_app().await?;
    let token = sign_up(&app, "alice").await?;
    let friends = models::tag::create(&db, "friends").await?;
    let family = models::tag::create(&db, "family").await?;

    let resp = get(&app, "/birthday/create", &token).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?["form"]["data"]["first_name"], "");

    let form = format!("first_name=Ivan+Ivanovich&last_name=Petrov&birthday=1990-05-17&tags={}&tags={}", friends.id, family.id);
    let resp = post_form(&app, "/birthday/create", &token, &form).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let detail_url = location(&resp);
    assert!(detail_url.starts_with("/birthday/"));

    let resp = get(&app, &detail_url, &token).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["birthday"]["first_name"], "Ivan");
    assert_eq!(body["birthday"]["author"]["username"], "alice");
    assert_eq!(body["birthday"]["tags"].as_array().map(Vec::len), Some(2));
    let countdown = body["birthday_countdown"].as_i64().unwrap_or(-1);
    assert!((0..366).contains(&countdown));
    assert_eq!(body["form"]["data"]["text"], "");
    assert_eq!(body["congratulations"], json!([]));
    Ok(())
}

#[tokio::test]
async fn invalid_form_is_rejected_without_saving() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let token = sign_up(&app, "alice").await?;

    let resp = post_form(&app, "/birthday/create", &token, "first_name=&birthday=not-a-date&tags=99").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["form"]["errors"]["first_name"][0], "This field is required.");
    assert_eq!(body["form"]["errors"]["birthday"][0], "Enter a valid date.");
    assert_eq!(body["form"]["data"]["birthday"], "not-a-date");

    let resp = post_form(&app, "/birthday/create", &token, "first_name=Ann&birthday=2000-01-01&tags=99").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["form"]["errors"]["tags"][0], "Select a valid choice. 99 is not one of the available choices.");

    let list = body_json(get(&app, "/birthday", &token).await?).await?;
    assert_eq!(list["page_obj"]["count"], 0);
    Ok(())
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let alice = sign_up(&app, "alice").await?;
    let bob = sign_up(&app, "bob").await?;

    let resp = post_form(&app, "/birthday/create", &alice, "first_name=Ann&birthday=1991-03-04").await?;
    let url = location(&resp);

    let resp = get(&app, &format!("{url}/edit"), &bob).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = post_form(&app, &format!("{url}/edit"), &bob, "first_name=Hacked&birthday=1991-03-04").await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = get(&app, &format!("{url}/delete"), &bob).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = post_form(&app, &format!("{url}/delete"), &bob, "").await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // ownership is checked before the body is read
    assert_eq!(post_empty(&app, &format!("{url}/edit"), &bob).await?.status(), StatusCode::FORBIDDEN);
    assert_eq!(post_empty(&app, &format!("{url}/delete"), &bob).await?.status(), StatusCode::FORBIDDEN);
    assert_eq!(post_empty(&app, "/birthday/999/edit", &bob).await?.status(), StatusCode::NOT_FOUND);
    let resp = post_empty(&app, &format!("{url}/edit"), &alice).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await?["error"], "Bad Request");

    assert_eq!(get(&app, "/birthday/999/edit", &bob).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/birthday/abc", &bob).await?.status(), StatusCode::NOT_FOUND);

    let resp = get(&app, &format!("{url}/edit"), &alice).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["form"]["data"]["first_name"], "Ann");
    assert!(body["birthday_countdown"].is_i64());

    let resp = post_form(&app, &format!("{url}/edit"), &alice, "first_name=Anna&last_name=Lee&birthday=1991-03-04").await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), url);
    let body = body_json(get(&app, &url, &bob).await?).await?;
    assert_eq!(body["birthday"]["first_name"], "Anna");
    assert_eq!(body["birthday"]["author"]["username"], "alice");

    let resp = get(&app, &format!("{url}/delete"), &alice).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?["object"]["first_name"], "Anna");

    let resp = post_form(&app, &format!("{url}/delete"), &alice, "").await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/birthday");
    assert_eq!(get(&app, &url, &alice).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn congratulation_fields_come_from_context() -> anyhow::Result<()> {
    let (app, db) = build_app().await?;
    let alice = sign_up(&app, "alice").await?;
    let bob = sign_up(&app, "bob").await?;
    let alice_id = models::user::find_by_username(&db, "alice").await?.map(|u| u.id.to_string()).unwrap_or_default();

    let resp = post_form(&app, "/birthday/create", &alice, "first_name=Ann&birthday=1991-03-04").await?;
    let url = location(&resp);
    let resp = post_form(&app, "/birthday/create", &alice, "first_name=Ben&birthday=1992-03-04").await?;
    let other_url = location(&resp);
    let other_id = other_url.trim_start_matches("/birthday/").to_string();

    let forged = format!("text=Happy+birthday!&author={alice_id}&birthday={other_id}&birthday_id={other_id}");
    let resp = post_form(&app, &format!("{url}/comment"), &bob, &forged).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), url);
    let resp = post_form(&app, &format!("{url}/comment"), &alice, "text=Second").await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = body_json(get(&app, &url, &alice).await?).await?;
    let list = body["congratulations"].as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["text"], "Happy birthday!");
    assert_eq!(list[0]["author"]["username"], "bob");
    assert_eq!(list[1]["text"], "Second");
    assert_eq!(list[1]["author"]["username"], "alice");

    let other = body_json(get(&app, &other_url, &alice).await?).await?;
    assert_eq!(other["congratulations"], json!([]));

    let resp = post_form(&app, &format!("{url}/comment"), &bob, "text=+++").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await?["form"]["errors"]["text"][0], "This field is required.");

    let resp = post_form(&app, "/birthday/999/comment", &bob, "text=hi").await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_is_paginated_by_ten_in_id_order() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let token = sign_up(&app, "alice").await?;

    let empty = body_json(get(&app, "/birthday", &token).await?).await?;
    assert_eq!(empty["page_obj"]["num_pages"], 1);

    for i in 0..12 {
        let resp = post_form(&app, "/birthday/create", &token, &format!("first_name=P{i}&birthday=2000-01-01")).await?;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let page = body_json(get(&app, "/birthday", &token).await?).await?["page_obj"].clone();
    let items = page["object_list"].as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 10);
    assert_eq!(page["num_pages"], 2);
    assert_eq!(page["has_next"], true);
    let ids: Vec<i64> = items.iter().filter_map(|b| b["id"].as_i64()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(items[0]["first_name"], "P0");

    let page = body_json(get(&app, "/birthday?page=2", &token).await?).await?["page_obj"].clone();
    assert_eq!(page["object_list"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["has_previous"], true);

    let last = body_json(get(&app, "/birthday?page=last", &token).await?).await?;
    assert_eq!(last["page_obj"]["number"], 2);

    let repeated = get(&app, "/birthday?page=1&page=2", &token).await?;
    assert_eq!(repeated.status(), StatusCode::OK);
    assert_eq!(body_json(repeated).await?["page_obj"]["number"], 2);

    assert_eq!(get(&app, "/birthday?page=3", &token).await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/birthday?page=abc", &token).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn auth_endpoints_report_errors() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    sign_up(&app, "dave").await?;

    let dup = Request::post("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "dave", "email": "d@e.com", "password": "Password1"}))?))?;
    assert_eq!(app.clone().oneshot(dup).await?.status(), StatusCode::CONFLICT);

    let short = Request::post("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "erin", "email": "e@e.com", "password": "short"}))?))?;
    assert_eq!(app.clone().oneshot(short).await?.status(), StatusCode::BAD_REQUEST);

    let bad = Request::post("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": "dave", "password": "wrong-password"}))?))?;
    assert_eq!(app.clone().oneshot(bad).await?.status(), StatusCode::UNAUTHORIZED);

    let logout = app.clone().oneshot(Request::post("/auth/logout").body(Body::empty())?).await?;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let docs = app.clone().oneshot(Request::get("/api-docs/openapi.json").body(Body::empty())?).await?;
    assert_eq!(docs.status(), StatusCode::OK);
    assert!(body_json(docs).await?["paths"]["/birthday"].is_object());
    Ok(())
}
