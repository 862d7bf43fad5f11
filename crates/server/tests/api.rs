use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;

async fn setup_test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(Arc::new(engine))
}

fn basic(email: &str, password: &str) -> String {
    let secret = format!("{email}:{password}");
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode(secret)
    )
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, name: &str) -> String {
    let email = format!("{name}@example.com");
    let response = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": email,
            "username": name,
            "name": name,
            "password": "secret",
            "password_confirm": "secret",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    basic(&email, "secret")
}

async fn create_wallet(app: &Router, auth: &str, name: &str, balance: i64) -> String {
    let response = send(
        app,
        Method::POST,
        "/wallets",
        Some(auth),
        Some(json!({ "name": name, "type": "checking", "balance_minor": balance })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn wallet_balance(app: &Router, auth: &str, id: &str) -> i64 {
    let response = send(app, Method::GET, &format!("/wallets/{id}"), Some(auth), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await["balance_minor"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_rejected() {
    let app = setup_test_app().await;
    register(&app, "alice").await;

    let response = send(&app, Method::GET, "/wallets", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = basic("alice@example.com", "nope");
    let response = send(&app, Method::GET, "/wallets", Some(&wrong), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let app = setup_test_app().await;
    register(&app, "alice").await;

    let response = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "alice@example.com",
            "username": "other",
            "name": "Other",
            "password": "x",
            "password_confirm": "x",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "bob@example.com",
            "username": "bob",
            "name": "Bob",
            "password": "one",
            "password_confirm": "two",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["field"], "password");
}

#[tokio::test]
async fn profile_read_and_patch() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;

    let response = send(&app, Method::GET, "/auth/me", Some(&auth), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = get_body_json(response).await;
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["currency"], "USD");
    assert!(me.get("password_hash").is_none());

    let response = send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(&auth),
        Some(json!({ "monthly_income_minor": 250000, "language": "en" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = get_body_json(response).await;
    assert_eq!(me["monthly_income_minor"], 250000);
    assert_eq!(me["language"], "en");
    assert_eq!(me["name"], "alice");
}

#[tokio::test]
async fn transfer_lifecycle_keeps_balances_consistent() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;
    let a = create_wallet(&app, &auth, "A", 10_000).await;
    let b = create_wallet(&app, &auth, "B", 0).await;

    let response = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&auth),
        Some(json!({
            "wallet": a,
            "receiver_wallet": b,
            "name": "Move",
            "amount_minor": 3000,
            "category": "savings",
            "type": "transfer",
            "date": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx = get_body_json(response).await;
    assert_eq!(tx["wallet_name"], "A");
    assert_eq!(tx["receiver_wallet_name"], "B");
    assert_eq!(tx["status"], "completed");
    assert_eq!(tx["icon"], "attach_money");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    assert_eq!(wallet_balance(&app, &auth, &a).await, 7_000);
    assert_eq!(wallet_balance(&app, &auth, &b).await, 3_000);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/transactions/{tx_id}"),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(wallet_balance(&app, &auth, &a).await, 10_000);
    assert_eq!(wallet_balance(&app, &auth, &b).await, 0);
}

#[tokio::test]
async fn transaction_validation_errors() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;
    let a = create_wallet(&app, &auth, "A", 0).await;

    let response = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&auth),
        Some(json!({
            "wallet": a,
            "name": "Broken",
            "amount_minor": 0,
            "category": "misc",
            "type": "expense",
            "date": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["field"], "amount");

    let response = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&auth),
        Some(json!({
            "wallet": a,
            "name": "No receiver",
            "amount_minor": 100,
            "category": "misc",
            "type": "transfer",
            "date": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["field"], "receiver_wallet");

    let response = send(
        &app,
        Method::GET,
        "/transactions?ordering=name",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["field"], "ordering");
}

#[tokio::test]
async fn other_users_records_are_not_found() {
    let app = setup_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let wallet = create_wallet(&app, &alice, "Main", 500).await;

    let response = send(&app, Method::GET, &format!("/wallets/{wallet}"), Some(&bob), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Method::PATCH,
        &format!("/wallets/{wallet}"),
        Some(&bob),
        Some(json!({ "name": "Mine now" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, Method::GET, "/wallets", Some(&bob), None).await;
    assert_eq!(get_body_json(response).await, json!([]));
}

#[tokio::test]
async fn put_resets_omitted_fields_to_defaults() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;
    let w = create_wallet(&app, &auth, "Main", 0).await;

    let response = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&auth),
        Some(json!({
            "wallet": w,
            "name": "Salary",
            "amount_minor": 5000,
            "category": "work",
            "type": "income",
            "status": "pending",
            "icon": "work",
            "date": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx = get_body_json(response).await;
    assert_eq!(tx["status"], "pending");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        Method::PUT,
        &format!("/transactions/{tx_id}"),
        Some(&auth),
        Some(json!({
            "wallet": w,
            "name": "Salary",
            "amount_minor": 6000,
            "category": "work",
            "type": "income",
            "date": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tx = get_body_json(response).await;
    assert_eq!(tx["status"], "completed");
    assert_eq!(tx["icon"], "attach_money");
    assert_eq!(wallet_balance(&app, &auth, &w).await, 6_000);

    let response = send(
        &app,
        Method::PUT,
        &format!("/wallets/{w}"),
        Some(&auth),
        Some(json!({ "name": "Main", "type": "savings" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let wallet = get_body_json(response).await;
    assert_eq!(wallet["color"], "blue");
    assert_eq!(wallet["icon"], "account_balance");
    assert_eq!(wallet["balance_minor"], 6000);
}

#[tokio::test]
async fn goals_report_progress() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;

    let response = send(
        &app,
        Method::POST,
        "/goals",
        Some(&auth),
        Some(json!({
            "name": "Bike",
            "target_amount_minor": 20000,
            "current_amount_minor": 5000,
            "deadline": "2027-06-01",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let goal = get_body_json(response).await;
    assert_eq!(goal["progress"], 25.0);
    assert_eq!(goal["color"], "blue");

    let id = goal["id"].as_str().unwrap();
    let response = send(
        &app,
        Method::PUT,
        &format!("/goals/{id}"),
        Some(&auth),
        Some(json!({
            "name": "Bike",
            "target_amount_minor": 0,
            "deadline": "2027-06-01",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["progress"], 0.0);
}

#[tokio::test]
async fn summary_and_fixed_expenses() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;
    let wallet = create_wallet(&app, &auth, "Main", 0).await;

    send(
        &app,
        Method::PATCH,
        "/auth/me",
        Some(&auth),
        Some(json!({ "monthly_income_minor": 200000 })),
    )
    .await;
    let response = send(
        &app,
        Method::POST,
        "/fixed-expenses",
        Some(&auth),
        Some(json!({ "name": "Rent", "amount_minor": 80000 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let expense = get_body_json(response).await;
    assert_eq!(expense["periodicity"], "monthly");
    assert_eq!(expense["currency"], "USD");

    send(
        &app,
        Method::POST,
        "/transactions",
        Some(&auth),
        Some(json!({
            "wallet": wallet,
            "name": "Groceries",
            "amount_minor": 50000,
            "category": "food",
            "type": "expense",
            "date": "2026-05-10T08:00:00Z",
        })),
    )
    .await;

    let response = send(&app, Method::GET, "/summary?month=2026-05", Some(&auth), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = get_body_json(response).await;
    assert_eq!(summary["month"], "2026-05");
    assert_eq!(summary["total_balance_minor"], -50000);
    assert_eq!(summary["month_expenses_minor"], 50000);
    assert_eq!(summary["budget_left_minor"], 150000);
    assert_eq!(summary["budget_percentage"], 75);
    assert_eq!(summary["fixed_expenses_monthly_minor"], 80000);
    assert_eq!(
        summary["expenses_by_category"],
        json!([{ "category": "food", "amount_minor": 50000 }])
    );

    let response = send(&app, Method::GET, "/summary?month=2026-13", Some(&auth), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_account_revokes_access() {
    let app = setup_test_app().await;
    let auth = register(&app, "alice").await;
    create_wallet(&app, &auth, "Main", 0).await;

    let response = send(&app, Method::DELETE, "/auth/me", Some(&auth), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, "/auth/me", Some(&auth), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
