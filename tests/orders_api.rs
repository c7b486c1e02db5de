mod common;

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use common::{Catalog, TestApp, json_body};

fn order_body(catalog: &Catalog) -> Value {
    json!({
        "customer_name": "Meera Nair",
        "customer_email": "meera@example.com",
        "phone_number": "9876543210",
        "theatre_id": catalog.theatre_id,
        "slot_id": catalog.slot_id,
        "no_of_persons": 4,
        "total_price": 500,
        "order_date": "2024-01-01",
        "addons": [{ "id": catalog.addon_id, "quantity": 2 }]
    })
}

#[tokio::test]
async fn create_order_charges_minor_units_and_round_trips() {
    let app = TestApp::new();
    let catalog = app.seed_catalog().await;

    let response = app
        .request(Method::POST, "/orders", Some(order_body(&catalog)), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let order = &created["data"];
    assert_eq!(order["razorpay_order_id"], "order_test_0001");
    assert_eq!(app.gateway.amounts(), vec![50_000]);

    let id = order["id"].as_str().unwrap();
    let response = app
        .request(Method::GET, &format!("/orders/{id}"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let details = json_body(response).await["data"].clone();
    assert_eq!(details["theatre"]["id"], json!(catalog.theatre_id));
    assert_eq!(details["slot"]["id"], json!(catalog.slot_id));
    assert_eq!(details["total_price"], 500);
    assert_eq!(details["addons"][0]["id"], json!(catalog.addon_id));
    assert_eq!(details["addons"][0]["quantity"], 2);
    assert_eq!(details["payment_details"]["status"], "pending");
}

#[tokio::test]
async fn repeating_a_booking_is_a_conflict() {
    let app = TestApp::new();
    let catalog = app.seed_catalog().await;

    let first = app
        .request(Method::POST, "/orders", Some(order_body(&catalog)), None)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(Method::POST, "/orders", Some(order_body(&catalog)), None)
        .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = json_body(second).await;
    assert_eq!(
        body["message"],
        "order already exists for the given theatre and slot"
    );
    assert_eq!(app.gateway.amounts().len(), 1);

    let list = json_body(app.request(Method::GET, "/orders", None, None).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn same_slot_on_another_date_is_allowed() {
    let app = TestApp::new();
    let catalog = app.seed_catalog().await;
    app.request(Method::POST, "/orders", Some(order_body(&catalog)), None)
        .await;

    let mut body = order_body(&catalog);
    body["order_date"] = json!("2024-01-02");
    let response = app.request(Method::POST, "/orders", Some(body), None).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_order_reports_field_errors() {
    let app = TestApp::new();
    let catalog = app.seed_catalog().await;
    let mut body = order_body(&catalog);
    body["customer_email"] = json!("not-an-email");
    body["slot_id"] = json!("s1");

    let response = app.request(Method::POST, "/orders", Some(body), None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["errors"]["customer_email"].is_string());
    assert_eq!(body["errors"]["slot_id"], "slot id must be a valid uuid");
    assert!(app.gateway.amounts().is_empty());
}

#[tokio::test]
async fn unknown_or_malformed_order_id_is_not_found() {
    let app = TestApp::new();

    let malformed = app.request(Method::GET, "/orders/abc", None, None).await;
    let missing = app
        .request(Method::GET, &format!("/orders/{}", Uuid::new_v4()), None, None)
        .await;

    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .request(Method::POST, "/orders", Some(json!({ "customer_name": 7 })), None)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
