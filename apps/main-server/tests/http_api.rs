//! HTTP-level tests driving the full router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use booking_store::{BookingStore, MemoryBookingStore};
use entities::TreatmentOption;
use portal_server::{
    config::Config,
    create_app, create_state,
    services::{GatewayError, PaymentGateway, PaymentIntent},
    state::SharedState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        _payment_method_types: &[&str],
    ) -> Result<PaymentIntent, GatewayError> {
        Ok(PaymentIntent {
            client_secret: format!("secret_{amount_minor}_{currency}"),
        })
    }
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "PORTAL_JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap()
}

async fn setup(
    gateway: Option<Arc<dyn PaymentGateway>>,
) -> (Router, SharedState<MemoryBookingStore>) {
    let state = create_state(test_config(), MemoryBookingStore::new(), gateway);
    state
        .store
        .create_treatment_option(TreatmentOption::new("Braces", 120.0).with_slots(["9am", "10am"]))
        .await
        .unwrap();
    state
        .store
        .create_treatment_option(TreatmentOption::new("Cleaning", 40.0).with_slots(["8am"]))
        .await
        .unwrap();
    (create_app(state.clone()), state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, value)
}

async fn sign_up(app: &Router, email: &str, name: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        "PUT",
        "/setuser",
        None,
        Some(json!({ "email": email, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["userToken"].as_str().unwrap().to_string();
    (token, body)
}

fn booking_body(slot: &str) -> Value {
    json!({
        "treatmentName": "Braces",
        "appointmentDate": "2024-01-01",
        "slot": slot,
        "patient": "Alice",
        "email": "spoofed@example.com",
    })
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = setup(None).await;

    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "doctors portal server is running");

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_first_user_becomes_admin() {
    let (app, _) = setup(None).await;

    let (admin_token, first) = sign_up(&app, "admin@example.com", "Admin").await;
    sign_up(&app, "b@example.com", "B").await;

    assert_eq!(first["alreadyRegistered"], false);
    assert_eq!(first["result"]["acknowledged"], true);

    let (status, admin) = send(
        &app,
        "GET",
        "/adminusers?email=admin@example.com",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admin["role"], "Admin");

    let (_, b) = send(&app, "GET", "/adminusers?email=b@example.com", Some(&admin_token), None).await;
    assert_eq!(b["role"], "Regular");
}

#[tokio::test]
async fn test_sign_in_twice_is_idempotent() {
    let (app, _) = setup(None).await;

    sign_up(&app, "a@example.com", "Alice").await;
    let (token, again) = sign_up(&app, "a@example.com", "Alice").await;

    assert_eq!(again["alreadyRegistered"], true);
    assert_eq!(again["result"]["message"], "welcome back! Alice");
    assert!(!token.is_empty());

    let (_, users) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["role"], "Admin");
}

#[tokio::test]
async fn test_user_routes_require_token() {
    let (app, _) = setup(None).await;

    let (status, body) = send(&app, "GET", "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized access");

    let (status, body) = send(&app, "GET", "/bookings", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "unauthorized user");

    let (status, _) = send(&app, "POST", "/bookings", None, Some(booking_body("9am"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_booking_is_rejected() {
    let (app, state) = setup(None).await;
    let (token, _) = sign_up(&app, "a@example.com", "Alice").await;

    let (status, first) = send(&app, "POST", "/bookings", Some(&token), Some(booking_body("9am"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["acknowledged"], true);

    let (status, second) =
        send(&app, "POST", "/bookings", Some(&token), Some(booking_body("10am"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["acknowledged"], false);
    assert_eq!(second["message"], "You already have a booking on 2024-01-01");

    let (_, mine) = send(&app, "GET", "/bookings?date=2024-01-01", Some(&token), None).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["email"], "a@example.com");

    let all = state.store.list_bookings(&Default::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_availability_excludes_booked_slots() {
    let (app, _) = setup(None).await;
    let (token, _) = sign_up(&app, "a@example.com", "Alice").await;
    send(&app, "POST", "/bookings", Some(&token), Some(booking_body("9am"))).await;

    let (status, options) = send(&app, "GET", "/appointmentOptions?date=2024-01-01", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(options[0]["name"], "Braces");
    assert_eq!(options[0]["slots"], json!(["10am"]));
    assert_eq!(options[1]["slots"], json!(["8am"]));

    let (_, other_day) = send(&app, "GET", "/appointmentOptions?date=2024-01-02", None, None).await;
    assert_eq!(other_day[0]["slots"], json!(["9am", "10am"]));

    let (status, _) = send(&app, "GET", "/appointmentOptions", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, names) = send(&app, "GET", "/appointment-Speciality", None, None).await;
    assert_eq!(names[1]["name"], "Cleaning");
    assert!(names[1].get("slots").is_none());
}

#[tokio::test]
async fn test_booking_lookup_and_delete() {
    let (app, _) = setup(None).await;
    let (owner, _) = sign_up(&app, "owner@example.com", "Owner").await;
    let (other, _) = sign_up(&app, "other@example.com", "Other").await;

    let (_, created) = send(&app, "POST", "/bookings", Some(&other), Some(booking_body("9am"))).await;
    let id = created["insertedId"].as_str().unwrap().to_string();

    let (status, booking) = send(&app, "GET", &format!("/bookings/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["paid"], false);

    let (status, _) = send(&app, "GET", "/bookings/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/bookings/{id}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The first registered user is an admin and may delete any booking.
    let (status, deleted) = send(&app, "DELETE", &format!("/bookings/{id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deletedCount"], 1);

    let (_, again) = send(&app, "DELETE", &format!("/bookings/{id}"), Some(&other), None).await;
    assert_eq!(again["deletedCount"], 0);
}

#[tokio::test]
async fn test_non_admin_cannot_use_admin_routes() {
    let (app, state) = setup(None).await;
    let (admin, _) = sign_up(&app, "admin@example.com", "Admin").await;
    let (regular, _) = sign_up(&app, "b@example.com", "B").await;

    let (status, body) = send(&app, "PUT", "/Admin/user?email=b@example.com", Some(&regular), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not an admin");

    let doctor = json!({ "name": "Dr. Who", "speciality": "Braces" });
    let (status, _) = send(
        &app,
        "POST",
        "/doctors?email=who@example.com",
        Some(&regular),
        Some(doctor.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/alldoctors", Some(&regular), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let b = state.store.get_user_by_email("b@example.com").await.unwrap().unwrap();
    assert!(!b.is_admin());
    assert!(state.store.list_doctors().await.unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/alldoctors", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/alldoctors", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_promotes_and_manages_doctors() {
    let (app, _) = setup(None).await;
    let (admin, _) = sign_up(&app, "admin@example.com", "Admin").await;
    let (regular, _) = sign_up(&app, "b@example.com", "B").await;

    let (status, update) = send(&app, "PUT", "/Admin/user?email=b@example.com", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["modifiedCount"], 1);

    let (status, _) = send(&app, "PUT", "/Admin/user?email=ghost@example.com", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The promoted user now passes the admin check.
    let doctor = json!({ "name": "Dr. Who", "speciality": "Braces" });
    let (_, first) = send(
        &app,
        "POST",
        "/doctors?email=who@example.com",
        Some(&regular),
        Some(doctor.clone()),
    )
    .await;
    assert_eq!(first["acknowledged"], true);

    let (_, duplicate) = send(
        &app,
        "POST",
        "/doctors?email=who@example.com",
        Some(&admin),
        Some(doctor),
    )
    .await;
    assert_eq!(duplicate["acknowledged"], false);
    assert_eq!(
        duplicate["message"],
        "Dr. Who already set in doctors list with Braces speciality"
    );

    let (_, doctors) = send(&app, "GET", "/alldoctors", Some(&admin), None).await;
    assert_eq!(doctors.as_array().unwrap().len(), 1);

    let id = first["insertedId"].as_str().unwrap();
    let (_, deleted) = send(&app, "DELETE", &format!("/doctors/{id}"), Some(&admin), None).await;
    assert_eq!(deleted["deletedCount"], 1);
}

#[tokio::test]
async fn test_user_delete_is_self_or_admin() {
    let (app, state) = setup(None).await;
    sign_up(&app, "admin@example.com", "Admin").await;
    let (b_token, b) = sign_up(&app, "b@example.com", "B").await;
    let (_, c) = sign_up(&app, "c@example.com", "C").await;
    let b_id = b["result"]["insertedId"].as_str().unwrap();
    let c_id = c["result"]["insertedId"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/users/{c_id}"), Some(&b_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.store.count_users().await.unwrap(), 3);

    let (status, deleted) = send(&app, "DELETE", &format!("/users/{b_id}"), Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deletedCount"], 1);
}

#[tokio::test]
async fn test_payment_confirmed_twice_records_once() {
    let (app, state) = setup(Some(Arc::new(FakeGateway))).await;
    let (token, _) = sign_up(&app, "a@example.com", "Alice").await;
    let (_, created) = send(&app, "POST", "/bookings", Some(&token), Some(booking_body("9am"))).await;
    let id = created["insertedId"].as_str().unwrap().to_string();

    let (status, intent) = send(
        &app,
        "POST",
        "/create-payment-intent",
        None,
        Some(json!({ "price": 120.0, "treatmentName": "Braces" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(intent["clientSecret"], "secret_12000_usd");

    let payment = json!({
        "booking_id": id,
        "price": 120.0,
        "transactionId": "pi_123",
        "email": "a@example.com",
    });
    let (status, first) = send(&app, "POST", "/payments", None, Some(payment.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["outcome"], "updated");
    assert_eq!(first["payment"]["transactionId"], "pi_123");

    let (status, second) = send(&app, "POST", "/payments", None, Some(payment)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["outcome"], "already_paid");

    assert_eq!(state.store.list_payments(None).await.unwrap().len(), 1);
    let (_, booking) = send(&app, "GET", &format!("/bookings/{id}"), None, None).await;
    assert_eq!(booking["paid"], true);
}

#[tokio::test]
async fn test_payment_intent_without_gateway() {
    let (app, _) = setup(None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/create-payment-intent",
        None,
        Some(json!({ "price": 10.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

#[tokio::test]
async fn test_header_without_token_is_unauthorized() {
    let (app, _) = setup(None).await;

    for value in ["", "Bearer "] {
        let request = Request::builder()
            .method("GET")
            .uri("/bookings")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {value:?}");
    }
}
