use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sl_core::TimelineConfig;
use sl_serve::{app, AppState};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> TimelineConfig {
    TimelineConfig {
        upstream_timeout: Duration::from_secs(2),
        ..TimelineConfig::default()
    }
}

fn router_for(base_url: &str) -> Router {
    app(AppState::new(base_url, config()).unwrap())
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn healthy_system() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onboarding-status"))
        .and(query_param("user_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job": {
                "id": 11,
                "job_type": "rezen_onboarding",
                "status": "completed",
                "updated_at": "2024-05-03T00:00:00Z"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/staging-status"))
        .and(query_param("user_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tables": [
                {"table_name": "rezen_listings_staging", "count": 0},
                {"table_name": "fub_contacts_staging", "count": 6, "updated_at": "2024-05-04T00:00:00Z"}
            ]
        })))
        .mount(&server)
        .await;
    let rows: Vec<Value> = (0..12)
        .map(|i| json!({"table_name": format!("table_{i}"), "count": i}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/table-counts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"generated_at": "2024-05-01T00:00:00Z", "tables": rows})),
        )
        .mount(&server)
        .await;
    server
}

fn events(body: &Value) -> &Vec<Value> {
    body["events"].as_array().unwrap()
}

#[tokio::test]
async fn invalid_id_is_rejected_before_any_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for raw in ["abc", "0", "-5", "1.5"] {
        let (status, body) = get(router_for(&server.uri()), &format!("/users/{raw}/timeline")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("invalid user id"));
    }
}

#[tokio::test]
async fn all_upstreams_failing_still_returns_ok() {
    let (status, body) = get(router_for("http://127.0.0.1:9"), "/users/7/timeline").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], json!(7));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["has_more"], json!(false));
    let events = events(&body);
    assert_eq!(events.len(), 3);
    for event in events {
        assert_eq!(event["type"], json!("error"));
        assert_eq!(event["status"], json!("error"));
        assert_eq!(event["source"], json!("system"));
    }
}

#[tokio::test]
async fn healthy_upstreams_produce_sorted_events_without_errors() {
    let server = healthy_system().await;
    let (status, body) = get(router_for(&server.uri()), "/users/7/timeline").await;

    assert_eq!(status, StatusCode::OK);
    let events = events(&body);
    let ids: Vec<&str> = events.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(
        ids,
        vec!["staging-fub_contacts_staging", "onboarding-11", "table-counts"]
    );
    assert_eq!(body["total"], json!(3));
    assert!(events.iter().all(|e| e["type"] != json!("error")));

    let summary = &events[2];
    assert_eq!(summary["type"], json!("system"));
    assert!(summary["title"].as_str().unwrap().contains("12 tables"));

    let timestamps: Vec<&str> = events.iter().map(|e| e["timestamp"].as_str().unwrap()).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);
}

#[tokio::test]
async fn one_failing_upstream_adds_one_error_event() {
    // Staging answers with a body that is not JSON.
    let broken = MockServer::start().await;
    Mock::given(path("/staging-status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&broken)
        .await;
    Mock::given(path("/onboarding-status"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&broken)
        .await;
    Mock::given(path("/table-counts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"counts": {"a": 3}})))
        .mount(&broken)
        .await;

    let (status, body) = get(router_for(&broken.uri()), "/users/7/timeline").await;
    assert_eq!(status, StatusCode::OK);
    let errors: Vec<&Value> = events(&body)
        .iter()
        .filter(|e| e["type"] == json!("error"))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["id"], json!("error-staging-status"));
    assert_eq!(body["total"], json!(2));
}

#[tokio::test]
async fn filters_and_pagination_apply() {
    let server = healthy_system().await;

    let (_, body) = get(router_for(&server.uri()), "/users/7/timeline?type=staging").await;
    assert_eq!(body["total"], json!(1));
    assert!(events(&body).iter().all(|e| e["type"] == json!("staging")));

    let (_, body) = get(router_for(&server.uri()), "/users/7/timeline?source=rezen").await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(events(&body)[0]["id"], json!("onboarding-11"));

    let (_, body) = get(router_for(&server.uri()), "/users/7/timeline?limit=1&offset=1").await;
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["has_more"], json!(true));
    assert_eq!(events(&body).len(), 1);
    assert_eq!(events(&body)[0]["id"], json!("onboarding-11"));

    let (_, body) = get(router_for(&server.uri()), "/users/7/timeline?limit=0&offset=-3").await;
    assert_eq!(events(&body).len(), 1);
    assert_eq!(body["has_more"], json!(true));

    let (status, body) =
        get(router_for(&server.uri()), "/users/7/timeline?limit=many&offset=5").await;
    assert_eq!(status, StatusCode::OK);
    assert!(events(&body).is_empty());
    assert_eq!(body["has_more"], json!(false));
}

#[tokio::test]
async fn repeated_query_keys_keep_the_first_value() {
    let server = healthy_system().await;

    let uri = "/users/7/timeline?limit=1&limit=10&type=staging&type=error";
    let (status, body) = get(router_for(&server.uri()), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(events(&body).len(), 1);
    assert_eq!(events(&body)[0]["type"], json!("staging"));

    let (status, body) = get(router_for(&server.uri()), "/users/7/timeline?limit=2&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events(&body).len(), 2);
    assert_eq!(body["has_more"], json!(true));
}

#[tokio::test]
async fn undecodable_user_id_gets_json_envelope() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(router_for(&server.uri()), "/users/%FF/timeline").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("invalid_input"));
    assert!(body["correlation_id"].as_str().unwrap().starts_with("corr_"));
    assert!(body["error"].as_str().unwrap().contains("invalid user id"));
}

#[tokio::test]
async fn health_and_correlation_header() {
    let router = router_for("http://127.0.0.1:9");
    let response = router
        .oneshot(
            Request::get("/health")
                .header("x-correlation-id", "corr_test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-correlation-id"], "corr_test");
}
