use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use storefront_dashboard::config::DashboardConfig;
use storefront_dashboard::data::{DataLoader, LoadError};
use storefront_dashboard::web::{create_router, AppState, EMPTY_ORDERS, INVALID_FILTER_NOTICE};

const ORDERS: &str = "order_id,timestamp,category,region,amount,customer_id\n\
                      o1,2018-01-01 09:00:00,A,rio,10,c1\n\
                      o2,2018-01-02 10:30:00,A,natal,5,c2\n\
                      o3,2018-01-03 14:00:00,B,rio,7,c1\n";

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn router() -> Router {
    let file = write_csv(ORDERS);
    let table = DataLoader::default().load_csv(file.path()).unwrap();
    let state = AppState::new(Arc::new(table), DashboardConfig::default());
    create_router(Arc::new(state))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_dashboard_page_renders_sections() {
    let (status, body) = get(&router(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>E-Commerce Dashboard</h1>"));
    assert!(body.contains("Daily Orders &amp; Revenue"));
    assert!(body.contains("Revenue by Category"));
    assert!(body.contains("Best Customer Based on RFM Parameters"));
    assert!(body.contains("Showing 3 of 3 order lines"));
    assert!(!body.contains(EMPTY_ORDERS));
}

#[tokio::test]
async fn test_unmatched_category_shows_empty_state() {
    let (status, body) = get(&router(), "/?category=C").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(EMPTY_ORDERS));
    assert!(body.contains("Showing 0 of 3 order lines"));
}

#[tokio::test]
async fn test_invalid_date_reverts_to_previous_filter() {
    let app = router();
    let (_, first) = get(&app, "/?category=B").await;
    assert!(first.contains("Showing 1 of 3 order lines"));

    let (status, body) = get(&app, "/?start=2018-13-45").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(INVALID_FILTER_NOTICE));
    assert!(body.contains("Showing 1 of 3 order lines"));
    assert!(body.contains(r#"<option value="B" selected>"#));
}

#[tokio::test]
async fn test_inverted_range_reverts() {
    let (status, body) = get(&router(), "/?start=2018-01-03&end=2018-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(INVALID_FILTER_NOTICE));
    assert!(body.contains("Showing 3 of 3 order lines"));
}

#[tokio::test]
async fn test_summary_category_metrics() {
    let (status, json) = get_json(&router(), "/api/summary").await;

    assert_eq!(status, StatusCode::OK);
    let groups = &json["by_category"]["groups"];
    assert_eq!(groups["A"]["count"], 2);
    assert_eq!(groups["A"]["sum"], 15.0);
    assert_eq!(groups["A"]["mean"], 7.5);
    assert_eq!(groups["B"]["count"], 1);
    assert_eq!(groups["B"]["sum"], 7.0);
    assert_eq!(groups["B"]["mean"], 7.0);
    assert_eq!(json["totals"]["rows"], 3);
}

#[tokio::test]
async fn test_summary_is_idempotent() {
    let app = router();
    let (_, first) = get_json(&app, "/api/summary?region=rio").await;
    let (_, second) = get_json(&app, "/api/summary?region=rio").await;
    assert_eq!(first, second);
    assert_eq!(first["totals"]["revenue"], 17.0);
}

#[tokio::test]
async fn test_summary_counts_match_filtered_rows() {
    let (_, json) = get_json(&router(), "/api/summary?start=2018-01-02").await;

    let groups = json["by_category"]["groups"].as_object().unwrap();
    let counted: u64 = groups.values().map(|g| g["count"].as_u64().unwrap()).sum();
    assert_eq!(counted, json["totals"]["rows"].as_u64().unwrap());
    assert_eq!(counted, 2);
    assert_eq!(json["filter"]["start"], "2018-01-02");
    assert!(json["filter"]["end"].is_null());
    for group in groups.values() {
        assert!(group["sum"].as_f64().unwrap() >= 0.0);
        assert!(group["mean"].as_f64().unwrap() >= 0.0);
    }
}

#[tokio::test]
async fn test_summary_empty_category() {
    let (status, json) = get_json(&router(), "/api/summary?category=C").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["totals"].is_null());
    assert!(json["by_category"].is_null());
}

#[tokio::test]
async fn test_summary_rejects_invalid_date() {
    let (status, json) = get_json(&router(), "/api/summary?end=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_FILTER");
}

#[test]
fn test_missing_dataset_is_load_error() {
    let err = DataLoader::default()
        .load_all(&[PathBuf::from("/no/such/orders.csv")])
        .unwrap_err();
    assert!(matches!(err, LoadError::Missing(_)));
}
