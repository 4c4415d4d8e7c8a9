//! Drives the HTTP gateway and controller against a local axum server that
//! serves canned dashboard responses.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use revdash::api::{DashboardApi, Endpoint, HttpGateway};
use revdash::controller::{load_charts, Controller, Outcome, Phase};
use revdash::datefmt::DatePattern;
use revdash::export::{DirectorySaver, ExportCoordinator, PrintNotifier, EXPORT_FILENAME};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const EXPORT_BYTES: &[u8] = b"PK\x03\x04fake-xlsx";

async fn orders(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    let restaurant = params.get("type").ok_or(StatusCode::BAD_REQUEST)?;
    let all = match restaurant.as_str() {
        "1" => {
            // restaurant 1 answers slowly
            tokio::time::sleep(Duration::from_millis(300)).await;
            vec![
                json!({"orderNumber": 1, "orderDate": "2024-01-02T10:00:00Z", "itemName": "Burger",
                       "quantity": 2, "productPrice": 9.5, "totalProducts": 19.0}),
                json!({"orderNumber": 2, "orderDate": "2024-01-03T12:30:00Z", "itemName": "Fries",
                       "quantity": 1, "productPrice": 3.25, "totalProducts": 3.25}),
            ]
        }
        "2" => vec![json!({"orderNumber": 9, "orderDate": "2024-02-10T19:45:00",
                           "itemName": "Sushi", "quantity": 3, "productPrice": 12, "totalProducts": 36})],
        _ => vec![],
    };
    let filtered: Vec<Value> = match params.get("searchText") {
        Some(text) => all
            .into_iter()
            .filter(|o| o["itemName"].as_str().is_some_and(|n| n.contains(text.as_str())))
            .collect(),
        None => all,
    };
    Ok(Json(Value::Array(filtered)))
}

/// Valid JSON that does not match the order schema.
async fn wrong_schema_orders(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("type").map(String::as_str) {
        Some("2") => Json(json!([{"orderNumber": 1, "orderDate": "2024-01-02T10:00:00Z",
                                  "quantity": 1, "productPrice": 9.5, "totalProducts": 9.5}])),
        _ => Json(json!([{"orderNumber": 1, "orderDate": 20240102, "itemName": "Burger",
                          "quantity": 1, "productPrice": 9.5, "totalProducts": 9.5}])),
    }
}

fn router() -> Router {
    Router::new()
        .route(
            "/dashboards/revenue-period",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"Revenue Period 2":[{"restaurantName":"Restaurant 1","percentage":61.5}],
                        "Revenue Period 1":[{"restaurantName":"Restaurant 1","percentage":20.1},
                                            {"restaurantName":"Restaurant 2","percentage":28.2}]}"#,
                )
            }),
        )
        .route("/dashboards/current-year", get(|| async { Json(json!(2024)) }))
        .route(
            "/dashboards/top-product",
            get(|| async {
                Json(json!({"productRevenues": [
                    {"productName": "A", "revenue": 15000},
                    {"productName": "B", "revenue": 20499}
                ]}))
            }),
        )
        .route(
            "/dashboards/restaurant-revenue",
            get(|| async {
                Json(json!({
                    "Fast food": [{"year": 2023, "revenue": 120000.0}, {"year": 2024, "revenue": 135500.0}],
                    "Casual": [{"year": 2023, "revenue": 80000.0}]
                }))
            }),
        )
        .route("/orders", get(orders))
        .route(
            "/orders/export",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")],
                    EXPORT_BYTES.to_vec(),
                )
            }),
        )
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn gateway() -> HttpGateway {
    HttpGateway::new(&serve(router()).await, None).unwrap()
}

#[tokio::test]
async fn top_products_are_scaled_to_thousands() {
    let charts = load_charts(&gateway().await).await.unwrap();
    let points: Vec<(&str, u64)> = charts
        .top_products
        .iter()
        .map(|p| (p.label.as_str(), p.value))
        .collect();
    assert_eq!(points, vec![("A", 15), ("B", 20)]);
    assert_eq!(charts.current_year, 2024);
}

#[tokio::test]
async fn chart_series_follow_response_key_order() {
    let charts = load_charts(&gateway().await).await.unwrap();
    let periods: Vec<&str> = charts.revenue_periods.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(periods, vec!["Revenue Period 2", "Revenue Period 1"]);
    assert_eq!(charts.revenue_periods[1].points[1].value, 28.2);

    let restaurants: Vec<&str> = charts.restaurant_series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(restaurants, vec!["Fast food", "Casual"]);
    assert_eq!(charts.restaurant_series[0].points[1].label, 2024);
}

#[tokio::test]
async fn orders_dates_use_display_pattern() {
    let gw = gateway().await;
    let mut controller = Controller::new(1, DatePattern::default());
    assert_eq!(controller.reload(&gw).await, Outcome::Applied);

    let rows = &controller.view().rows;
    assert_eq!(controller.phase(), Phase::Loaded);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].order_number, 1);
    assert_eq!(rows[0].order_date, "02-01-2024 10:00");
}

#[tokio::test]
async fn search_text_is_sent_only_when_present() {
    let gw = gateway().await;
    let mut controller = Controller::new(1, DatePattern::default());

    controller.search(Some("Fries"));
    controller.reload(&gw).await;
    assert_eq!(controller.view().rows.len(), 1);
    assert_eq!(controller.view().rows[0].item_name, "Fries");

    controller.search(Some(""));
    controller.reload(&gw).await;
    assert_eq!(controller.view().rows.len(), 2);
}

#[tokio::test]
async fn slow_superseded_request_cannot_overwrite_newer_rows() {
    let gw = gateway().await;
    let mut controller = Controller::new(1, DatePattern::default());
    let (tx, mut rx) = mpsc::unbounded_channel();

    // restaurant 1 is slow, restaurant 2 answers immediately
    for ticket in [controller.begin_reload(), controller.select_restaurant(2)] {
        let gw = gw.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = ticket.fetch(&gw).await;
            tx.send((ticket.seq, result)).unwrap();
        });
    }
    drop(tx);

    let mut outcomes = Vec::new();
    while let Some((seq, result)) = rx.recv().await {
        outcomes.push((seq, controller.complete(seq, result)));
    }

    assert_eq!(outcomes, vec![(2, Outcome::Applied), (1, Outcome::Superseded)]);
    assert_eq!(controller.view().rows.len(), 1);
    assert_eq!(controller.view().rows[0].item_name, "Sushi");
    assert_eq!(controller.view().rows[0].order_date, "10-02-2024 19:45");
}

#[tokio::test]
async fn failures_collapse_into_fetch_error() {
    let base = serve(
        Router::new()
            .route("/dashboards/current-year", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
            .route("/dashboards/top-product", get(|| async { "not json" }))
            .route(
                "/orders",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!([]))
                }),
            ),
    )
    .await;
    let gw = HttpGateway::new(&base, Some(Duration::from_millis(200))).unwrap();

    let err = gw.current_year().await.unwrap_err();
    assert_eq!(err.endpoint, Endpoint::CurrentYear);
    assert!(err.cause.contains("500"));

    let err = gw.top_products().await.unwrap_err();
    assert!(err.cause.contains("malformed body"));

    let err = gw.restaurant_revenue().await.unwrap_err();
    assert!(err.cause.contains("404"));

    let mut controller = Controller::new(1, DatePattern::default());
    controller.reload(&gw).await;
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(controller.view().rows.is_empty());
    assert_eq!(controller.last_error().map(|e| e.endpoint), Some(Endpoint::Orders));
}

#[tokio::test]
async fn wrong_schema_bodies_collapse_into_fetch_error() {
    let base = serve(
        Router::new()
            .route(
                "/dashboards/top-product",
                get(|| async { Json(json!({"products": [{"productName": "A", "revenue": 15000}]})) }),
            )
            .route("/orders", get(wrong_schema_orders)),
    )
    .await;
    let gw = HttpGateway::new(&base, None).unwrap();

    let err = gw.top_products().await.unwrap_err();
    assert_eq!(err.endpoint, Endpoint::TopProduct);
    assert!(err.cause.contains("malformed body"));

    // orderDate of the wrong type
    let err = gw.orders(1, None).await.unwrap_err();
    assert_eq!(err.endpoint, Endpoint::Orders);
    assert!(err.cause.contains("malformed body"));

    // itemName missing
    let err = gw.orders(2, None).await.unwrap_err();
    assert!(err.cause.contains("malformed body"));
    assert!(err.cause.contains("itemName"));

    let mut controller = Controller::new(1, DatePattern::default());
    controller.reload(&gw).await;
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(controller.view().rows.is_empty());
}

#[tokio::test]
async fn untyped_fetch_returns_json() {
    let gw = gateway().await;
    let value = gw.fetch_json(Endpoint::CurrentYear, None).await.unwrap();
    assert_eq!(value, json!(2024));
}

#[tokio::test]
async fn untyped_fetch_keeps_response_key_order() {
    let gw = gateway().await;
    let value = gw.fetch_json(Endpoint::RevenuePeriod, None).await.unwrap();
    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["Revenue Period 2", "Revenue Period 1"]);
}

#[tokio::test]
async fn export_is_saved_to_disk() {
    let gw = gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let coordinator = ExportCoordinator::new(DirectorySaver::new(dir.path()), PrintNotifier);
    let mut controller = Controller::new(1, DatePattern::default());

    controller.export_current(&gw, &coordinator).await.unwrap();

    assert_eq!(std::fs::read(dir.path().join(EXPORT_FILENAME)).unwrap(), EXPORT_BYTES);
    assert!(!controller.view().is_exporting);
}
