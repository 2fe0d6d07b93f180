mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};
use service_orders_api::entities::{
    service_order::Entity as ServiceOrderEntity,
    service_part::{Column as ServicePartColumn, Entity as ServicePartEntity},
};
use uuid::Uuid;

use common::{decimal_field, read_json, TestApp};

fn sample_order() -> Value {
    json!({
        "serviceName": "AC maintenance",
        "area": "HVAC",
        "technicianName": "Dana Alves",
        "status": "open",
        "parts": [
            { "partName": "Compressor", "quantity": 2, "unitPrice": "49.99" },
            { "partName": "Air filter", "quantity": 3, "unitPrice": "10.00" }
        ]
    })
}

async fn create_order(app: &TestApp, body: Value) -> Uuid {
    let response = app.request(Method::POST, "/api/orders", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    body["id"]
        .as_str()
        .expect("created response carries the new id")
        .parse()
        .expect("id is a uuid")
}

#[tokio::test]
async fn create_computes_total_and_parts_are_retrievable() {
    let app = TestApp::new().await;
    let order_id = create_order(&app, sample_order()).await;

    let response = app
        .request(Method::GET, &format!("/api/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = read_json(response).await;

    assert_eq!(order["serviceName"], "AC maintenance");
    assert_eq!(order["status"], "open");
    assert_eq!(decimal_field(&order, "totalCost"), dec!(129.98));

    let parts = order["parts"].as_array().expect("parts array");
    assert_eq!(parts.len(), 2);
    let compressor = parts
        .iter()
        .find(|p| p["partName"] == "Compressor")
        .expect("compressor line");
    assert_eq!(compressor["quantity"], 2);
    assert_eq!(decimal_field(compressor, "lineTotal"), dec!(99.98));

    // Child rows are independently retrievable by the parent's identifier.
    let stored_parts = ServicePartEntity::find()
        .filter(ServicePartColumn::ServiceOrderId.eq(order_id))
        .all(&*app.db)
        .await
        .expect("query parts");
    assert_eq!(stored_parts.len(), 2);
}

#[tokio::test]
async fn get_unknown_order_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, &format!("/api/orders/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn create_with_zero_quantity_is_rejected_before_persistence() {
    let app = TestApp::new().await;

    let mut body = sample_order();
    body["parts"][0]["quantity"] = json!(0);

    let response = app.request(Method::POST, "/api/orders", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let order_count = ServiceOrderEntity::find()
        .count(&*app.db)
        .await
        .expect("count orders");
    assert_eq!(order_count, 0);
}

#[tokio::test]
async fn create_rejects_missing_and_oversized_text_fields() {
    let app = TestApp::new().await;

    let mut body = sample_order();
    body["serviceName"] = json!("");
    let response = app.request(Method::POST, "/api/orders", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = sample_order();
    body["area"] = json!("x".repeat(81));
    let response = app.request(Method::POST, "/api/orders", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_fully_replaces_the_part_set() {
    let app = TestApp::new().await;
    let order_id = create_order(&app, sample_order()).await;

    let replacement = json!({
        "serviceName": "AC maintenance",
        "area": "HVAC",
        "technicianName": "Dana Alves",
        "status": "in_progress",
        "parts": [
            { "partName": "Fan belt", "quantity": 1, "unitPrice": "15.50" }
        ]
    });
    let response = app
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}"),
            Some(replacement),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let order = read_json(
        app.request(Method::GET, &format!("/api/orders/{order_id}"), None)
            .await,
    )
    .await;
    assert_eq!(order["status"], "in_progress");
    assert_eq!(decimal_field(&order, "totalCost"), dec!(15.50));

    let parts = order["parts"].as_array().expect("parts array");
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["partName"], "Fan belt");

    // Old rows are gone, not merged.
    let stored_parts = ServicePartEntity::find()
        .filter(ServicePartColumn::ServiceOrderId.eq(order_id))
        .all(&*app.db)
        .await
        .expect("query parts");
    assert_eq!(stored_parts.len(), 1);
    assert_eq!(stored_parts[0].part_name, "Fan belt");
}

#[tokio::test]
async fn update_with_empty_part_set_zeroes_the_total() {
    let app = TestApp::new().await;
    let order_id = create_order(&app, sample_order()).await;

    let replacement = json!({
        "serviceName": "AC maintenance",
        "area": "HVAC",
        "technicianName": "Dana Alves",
        "status": "done",
        "parts": []
    });
    let response = app
        .request(
            Method::PUT,
            &format!("/api/orders/{order_id}"),
            Some(replacement),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let order = read_json(
        app.request(Method::GET, &format!("/api/orders/{order_id}"), None)
            .await,
    )
    .await;
    assert_eq!(decimal_field(&order, "totalCost"), dec!(0));
    assert!(order["parts"].as_array().expect("parts array").is_empty());
}

#[tokio::test]
async fn update_is_idempotent() {
    let app = TestApp::new().await;
    let order_id = create_order(&app, sample_order()).await;

    let replacement = json!({
        "serviceName": "Compressor swap",
        "area": "HVAC",
        "technicianName": "Jo Silva",
        "status": "in_progress",
        "parts": [
            { "partName": "Compressor", "quantity": 1, "unitPrice": "219.90" }
        ]
    });

    for _ in 0..2 {
        let response = app
            .request(
                Method::PUT,
                &format!("/api/orders/{order_id}"),
                Some(replacement.clone()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let order = read_json(
        app.request(Method::GET, &format!("/api/orders/{order_id}"), None)
            .await,
    )
    .await;
    assert_eq!(order["serviceName"], "Compressor swap");
    assert_eq!(order["technicianName"], "Jo Silva");
    assert_eq!(decimal_field(&order, "totalCost"), dec!(219.90));
    let parts = order["parts"].as_array().expect("parts array");
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["partName"], "Compressor");
    assert_eq!(parts[0]["quantity"], 1);
}

#[tokio::test]
async fn update_of_unknown_order_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/orders/{}", Uuid::new_v4()),
            Some(sample_order()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_cascades_to_parts() {
    let app = TestApp::new().await;
    let order_id = create_order(&app, sample_order()).await;

    let response = app
        .request(Method::DELETE, &format!("/api/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/orders/{order_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No orphan part rows remain retrievable.
    let orphans = ServicePartEntity::find()
        .filter(ServicePartColumn::ServiceOrderId.eq(order_id))
        .all(&*app.db)
        .await
        .expect("query parts");
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn delete_of_unknown_order_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/orders/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_exact_area_and_ignores_blank_filter() {
    let app = TestApp::new().await;
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    app.seed_order("Duct cleaning", "HVAC", "Dana", "open", base)
        .await;
    app.seed_order("Thermostat swap", "HVAC", "Jo", "done", base + Duration::minutes(1))
        .await;
    app.seed_order("Panel repair", "Electrical", "Sam", "open", base + Duration::minutes(2))
        .await;

    let body = read_json(app.request(Method::GET, "/api/orders?area=HVAC", None).await).await;
    assert_eq!(body["totalCount"], 2);
    for item in body["items"].as_array().expect("items") {
        assert_eq!(item["area"], "HVAC");
    }

    // Blank/whitespace-only filter is equivalent to omitting it.
    let body = read_json(
        app.request(Method::GET, "/api/orders?area=%20%20", None)
            .await,
    )
    .await;
    assert_eq!(body["totalCount"], 3);
}

#[tokio::test]
async fn list_filters_by_status_and_rejects_unknown_status() {
    let app = TestApp::new().await;
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    app.seed_order("Duct cleaning", "HVAC", "Dana", "open", base)
        .await;
    app.seed_order("Thermostat swap", "HVAC", "Jo", "done", base + Duration::minutes(1))
        .await;

    let body = read_json(
        app.request(Method::GET, "/api/orders?status=done", None)
            .await,
    )
    .await;
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["items"][0]["status"], "done");

    let response = app
        .request(Method::GET, "/api/orders?status=archived", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let app = TestApp::new().await;
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    for i in 1..=12i64 {
        app.seed_order(
            &format!("order-{i:02}"),
            "HVAC",
            "Dana",
            "open",
            base + Duration::minutes(i),
        )
        .await;
    }

    let body = read_json(
        app.request(Method::GET, "/api/orders?page=2&pageSize=5", None)
            .await,
    )
    .await;

    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 5);
    assert_eq!(body["totalCount"], 12);

    let names: Vec<&str> = body["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["serviceName"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["order-07", "order-06", "order-05", "order-04", "order-03"]
    );
}

#[tokio::test]
async fn list_clamps_page_and_page_size() {
    let app = TestApp::new().await;
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    for i in 1..=3i64 {
        app.seed_order(
            &format!("order-{i:02}"),
            "HVAC",
            "Dana",
            "open",
            base + Duration::minutes(i),
        )
        .await;
    }

    // Oversized pageSize is capped by configuration.
    let body = read_json(
        app.request(Method::GET, "/api/orders?pageSize=100000", None)
            .await,
    )
    .await;
    assert_eq!(body["pageSize"], 100);
    assert_eq!(body["totalCount"], 3);

    // page=0 behaves like the first page.
    let body = read_json(app.request(Method::GET, "/api/orders?page=0", None).await).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"].as_array().expect("items").len(), 3);
}

#[tokio::test]
async fn healthz_reports_status_and_environment() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["env"], "test");
    assert_eq!(body["database"], "reachable");
}

#[tokio::test]
async fn root_redirects_to_interactive_docs() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/swagger")
    );
}
