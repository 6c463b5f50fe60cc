/// HTTP-level tests for the lead endpoints
/// Drives the full router (validation, service, in-memory store) without a network listener
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use leads_api::api;
use leads_api::config::Config;
use leads_api::handlers::AppState;
use leads_api::repository::InMemoryLeadRepository;
use leads_api::services::LeadService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper function to create test config
fn create_test_config() -> Config {
    Config {
        database_url: None,
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        debug: true,
    }
}

fn create_test_app() -> Router {
    let repository = Arc::new(InMemoryLeadRepository::new());
    let state = AppState::new(LeadService::new(repository), create_test_config());
    api::router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, lead) = send(app, Method::POST, "/leads", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    lead
}

fn ids(leads: &Value) -> Vec<i64> {
    leads
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_then_partial_update() {
    let app = create_test_app();

    let created = create(&app, json!({"name": "Jane Doe", "company": "Acme"})).await;
    assert!(created["id"].as_i64().is_some());
    assert!(created["created_at"].is_string());
    assert_eq!(created["name"], "Jane Doe");
    assert_eq!(created["company"], "Acme");
    for field in ["job_title", "phone_number", "email", "headcount", "industry", "updated_at"] {
        assert!(created[field].is_null(), "{} should be null", field);
    }

    let id = created["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/leads/{}", id),
        Some(json!({"headcount": 25})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["headcount"], 25);
    assert_eq!(updated["name"], "Jane Doe");
    assert_eq!(updated["company"], "Acme");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(updated["updated_at"].is_string());
}

#[tokio::test]
async fn test_create_echoes_all_supplied_fields() {
    let app = create_test_app();
    let body = json!({
        "name": "Ana Lima",
        "job_title": "Head of Sales",
        "phone_number": "+55 11 98765-4321",
        "company": "Lima & Co",
        "email": "ana@lima.co",
        "headcount": 120,
        "industry": "Retail"
    });

    let created = create(&app, body.clone()).await;
    for (field, value) in body.as_object().unwrap() {
        assert_eq!(&created[field], value, "field {}", field);
    }

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/leads/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields_identical() {
    let app = create_test_app();
    let created = create(
        &app,
        json!({
            "name": "Jane Doe",
            "company": "Acme",
            "email": "jane@acme.io",
            "industry": "Software",
            "headcount": 8
        }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (_, updated) = send(
        &app,
        Method::PUT,
        &format!("/leads/{}", id),
        Some(json!({"job_title": "CEO"})),
    )
    .await;

    let mut expected = created.clone();
    expected["job_title"] = json!("CEO");
    expected["updated_at"] = updated["updated_at"].clone();
    assert_eq!(updated, expected);
}

#[tokio::test]
async fn test_update_with_null_clears_optional_field() {
    let app = create_test_app();
    let created = create(
        &app,
        json!({"name": "Jane", "company": "Acme", "industry": "Software"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/leads/{}", id),
        Some(json!({"industry": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["industry"].is_null());
    assert_eq!(updated["name"], "Jane");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/leads/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Lead not found");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/leads/404",
        Some(json!({"name": "Nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/leads/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/leads/404/enrich", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_not_repeatable() {
    let app = create_test_app();
    let created = create(&app, json!({"name": "Jane", "company": "Acme"})).await;
    let uri = format!("/leads/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    for _ in 0..2 {
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::POST, &format!("{}/enrich", uri), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_by_headcount_range() {
    let app = create_test_app();
    let mut in_range = Vec::new();
    for (i, headcount) in [Some(5), Some(10), Some(30), Some(50), Some(51), None]
        .into_iter()
        .enumerate()
    {
        let lead = create(
            &app,
            json!({"name": format!("Lead {}", i), "company": "Acme", "headcount": headcount}),
        )
        .await;
        if matches!(headcount, Some(h) if (10..=50).contains(&h)) {
            in_range.push(lead["id"].as_i64().unwrap());
        }
    }

    let (status, leads) = send(
        &app,
        Method::GET,
        "/leads?headcount_min=10&headcount_max=50",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&leads), in_range);

    let (status, all) = send(&app, Method::GET, "/leads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 6);

    let (status, none) = send(&app, Method::GET, "/leads?headcount_min=1000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_list_filters_by_industry() {
    let app = create_test_app();
    let retail = create(
        &app,
        json!({"name": "A", "company": "Shop", "industry": "Retail", "headcount": 20}),
    )
    .await;
    create(
        &app,
        json!({"name": "B", "company": "Soft", "industry": "Software", "headcount": 20}),
    )
    .await;

    let (_, leads) = send(&app, Method::GET, "/leads?industry=Retail", None).await;
    assert_eq!(ids(&leads), vec![retail["id"].as_i64().unwrap()]);

    let (_, leads) = send(
        &app,
        Method::GET,
        "/leads?industry=Retail&headcount_max=10",
        None,
    )
    .await;
    assert_eq!(leads, json!([]));

    let (_, leads) = send(&app, Method::GET, "/leads?industry=", None).await;
    assert_eq!(leads.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_filter_is_a_client_error() {
    let app = create_test_app();
    let (status, _) = send(&app, Method::GET, "/leads?headcount_min=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_path_and_query_report_json_errors() {
    let app = create_test_app();

    for uri in ["/leads/abc", "/leads?headcount_min="] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{} returned {}", uri, body);
    }
}

#[tokio::test]
async fn test_enrich_returns_lead_unchanged() {
    let app = create_test_app();
    let created = create(
        &app,
        json!({"name": "Jane", "company": "Acme", "email": "jane@acme.io"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, enriched) =
        send(&app, Method::POST, &format!("/leads/{}/enrich", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(enriched, created);

    let (_, fetched) = send(&app, Method::GET, &format!("/leads/{}", id), None).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_validation_reports_fields_and_persists_nothing() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/leads",
        Some(json!({"name": "", "headcount": -3})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "company", "headcount"]);

    let (_, leads) = send(&app, Method::GET, "/leads", None).await;
    assert_eq!(leads, json!([]));
}

#[tokio::test]
async fn test_update_validation_leaves_record_untouched() {
    let app = create_test_app();
    let created = create(&app, json!({"name": "Jane", "company": "Acme"})).await;
    let uri = format!("/leads/{}", created["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"headcount": 40, "company": null})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "company");

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_wrongly_typed_field_is_a_validation_error() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/leads",
        Some(json!({"name": "a", "company": "b", "headcount": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["fields"][0]["field"], "headcount");

    let (_, leads) = send(&app, Method::GET, "/leads", None).await;
    assert_eq!(leads, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_root() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_lists_lead_routes() {
    let app = create_test_app();
    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/leads"].is_object());
    assert!(doc["paths"]["/leads/{id}"].is_object());
    assert!(doc["paths"]["/leads/{id}/enrich"].is_object());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = create_test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
