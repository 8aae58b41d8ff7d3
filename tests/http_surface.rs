//! Router tests over the booking endpoints. Like the ledger tests they need
//! `DATABASE_URL` and are skipped when it is unset.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use rideshare::api::IdentityAPI;
use rideshare::config::Settings;
use rideshare::db;
use rideshare::engine::Engine;
use rideshare::entities::{Registration, UserKind};
use rideshare::server::{router, DynAPI};

static SCHEMA: Mutex<()> = Mutex::new(());

async fn engine() -> Option<Arc<Engine>> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };

    let pool = db::connect(&url, 10).await.unwrap();

    let _guard = SCHEMA.lock().unwrap_or_else(|e| e.into_inner());
    Some(Arc::new(
        Engine::new(pool, Settings::default()).await.unwrap(),
    ))
}

fn app(engine: &Arc<Engine>) -> Router {
    let api: DynAPI = engine.clone();
    router(api)
}

/// Registers a member and returns `(id, bearer token)`.
async fn member(engine: &Engine, kind: UserKind) -> (Uuid, Uuid) {
    let email = format!("http-{}@example.com", Uuid::new_v4());

    let mut registration = Registration {
        kind: Some(kind),
        name: Some("Http Member".into()),
        email: Some(email.clone()),
        password: Some("password1".into()),
        ..Default::default()
    };
    if kind == UserKind::Driver {
        registration.vehicle_model = Some("Corolla".into());
        registration.vehicle_plate = Some("HTTP-1".into());
        registration.license_number = Some("LIC-9".into());
    }

    let profile = engine.register(registration).await.unwrap();
    let session = engine.login(email, "password1".into()).await.unwrap();

    (profile.id(), session.token)
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn ride() -> Value {
    json!({
        "pickupLocation": "Old Town",
        "dropoffLocation": "Stadium",
        "fare": 20.0,
        "distance": 5.0,
    })
}

#[tokio::test]
async fn create_booking_returns_created_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (customer_id, customer) = member(&engine, UserKind::Customer).await;

    let (status, body) = send(
        app(&engine),
        Method::POST,
        "/bookings",
        Some(customer),
        Some(ride()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["customerId"], customer_id.to_string());
    assert_eq!(body["pickupLocation"], "Old Town");
    assert!(body["driverId"].is_null());

    let (status, body) = send(
        app(&engine),
        Method::POST,
        "/bookings",
        Some(customer),
        Some(json!({ "pickupLocation": "Old Town" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);
}

#[tokio::test]
async fn missing_token_is_unauthorized_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (status, body) = send(app(&engine), Method::POST, "/bookings", None, Some(ride())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 104);
}

#[tokio::test]
async fn lost_claim_is_bad_request_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (_, customer) = member(&engine, UserKind::Customer).await;
    let (first_id, first) = member(&engine, UserKind::Driver).await;
    let (_, second) = member(&engine, UserKind::Driver).await;

    let (_, booking) = send(
        app(&engine),
        Method::POST,
        "/bookings",
        Some(customer),
        Some(ride()),
    )
    .await;
    let uri = format!("/bookings/{}/accept", booking["id"].as_str().unwrap());

    let (status, body) = send(app(&engine), Method::PATCH, &uri, Some(first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["driverId"], first_id.to_string());

    let (status, body) = send(app(&engine), Method::PATCH, &uri, Some(second), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 103);
}

#[tokio::test]
async fn cancel_other_customers_booking_is_not_found_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (_, owner) = member(&engine, UserKind::Customer).await;
    let (_, stranger) = member(&engine, UserKind::Customer).await;

    let (_, booking) = send(app(&engine), Method::POST, "/bookings", Some(owner), Some(ride())).await;
    let uri = format!("/bookings/{}/cancel", booking["id"].as_str().unwrap());

    let (status, body) = send(app(&engine), Method::PATCH, &uri, Some(stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 102);

    let (status, body) = send(app(&engine), Method::PATCH, &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn rate_response_shape_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (_, customer) = member(&engine, UserKind::Customer).await;
    let (driver_id, driver) = member(&engine, UserKind::Driver).await;

    let (_, booking) = send(
        app(&engine),
        Method::POST,
        "/bookings",
        Some(customer),
        Some(ride()),
    )
    .await;
    let id = booking["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app(&engine),
        Method::POST,
        &format!("/bookings/{}/rate", id),
        Some(customer),
        Some(json!({ "rating": 4, "review": "ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 100);

    send(
        app(&engine),
        Method::PATCH,
        &format!("/bookings/{}/accept", id),
        Some(driver),
        None,
    )
    .await;

    let (status, body) = send(
        app(&engine),
        Method::POST,
        &format!("/bookings/{}/rate", id),
        Some(customer),
        Some(json!({ "rating": 4, "review": "ok" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["newDriverAverage"], 4.0);
    assert_eq!(body["totalRatings"], 1);
    assert_eq!(body["booking"]["id"], id.as_str());
    assert_eq!(body["booking"]["status"], "completed");
    assert_eq!(body["booking"]["review"], "ok");

    let (status, body) = send(
        app(&engine),
        Method::GET,
        &format!("/drivers/{}/ratings", driver_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRatings"], 1);
    assert_eq!(body["averageRating"], 4.0);
    assert_eq!(body["ratingsList"][0]["bookingId"], id.as_str());
}

#[tokio::test]
async fn malformed_params_are_json_errors_test() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let (_, customer) = member(&engine, UserKind::Customer).await;
    let (_, driver) = member(&engine, UserKind::Driver).await;

    let (status, body) = send(
        app(&engine),
        Method::GET,
        "/bookings/not-a-uuid",
        Some(customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);

    let (status, body) = send(
        app(&engine),
        Method::GET,
        "/bookings/pending?limit=many",
        Some(driver),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);

    let (status, body) = send(
        app(&engine),
        Method::GET,
        "/bookings/pending?limit=1",
        Some(driver),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().len() <= 1);
}
