//! YKK AP BOM Workbench
//!
//! HTTP surface over the BOM core: headers, parts, revision sessions,
//! spreadsheet import, export and printable reports, plus quotation drafts
//! through the two-tier repository.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::get,
    serve, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use ykk_utils::{init_logging, AppConfig};

mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;
mod state;

use middleware::*;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });
    config.validate()?;

    init_logging(&config.logging)?;
    info!("Starting YKK AP BOM Workbench");

    let state = AppState::new(config.clone())?;
    if !state.drafts.has_remote() {
        info!("No draft API configured, quotation drafts use local storage only");
    }

    let app = create_app(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("BOM Workbench listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> Router {
        let mut config = AppConfig::default();
        config.draft_api.base_url = None;
        config.draft_api.local_path = dir.path().join("drafts.json").to_string_lossy().into_owned();
        let state = AppState::new(config.clone()).unwrap();
        create_app(state, &config)
    }

    async fn call(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        read_json(call(app, builder.body(body).unwrap()).await).await
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn raw_call(app: &Router, method: &str, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(call(app, request).await).await
    }

    async fn upload_csv(app: &Router, bom: &str, csv: &str) -> (StatusCode, Value) {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"parts.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
            b = boundary,
            csv = csv
        );
        raw_call(
            app,
            "POST",
            &format!("/api/v1/boms/{}/imports", bom),
            &format!("multipart/form-data; boundary={}", boundary),
            &body,
        )
        .await
    }

    fn inner_bom() -> Value {
        json!({
            "variant": "inner",
            "code": "IB-300",
            "series": "APW 330",
            "windowSystem": "Casement",
            "frameDepth": "70",
            "openDirection": "L",
            "glassGroove": "24"
        })
    }

    async fn create_bom(app: &Router) -> String {
        let (status, body) = json_call(app, "POST", "/api/v1/boms", Some(inner_bom())).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_revision_round_trip_over_http() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let bom = create_bom(&app).await;

        let part = json!({"partCode": "PF-1", "description": "Sash stile", "quantity": 2, "material": "AL", "cutFormula": "H - 30"});
        let (status, created) = json_call(&app, "POST", &format!("/api/v1/boms/{}/parts", bom), Some(part)).await;
        assert_eq!(status, StatusCode::CREATED);
        let part_id = created["id"].as_u64().unwrap();

        let (status, _) = json_call(&app, "POST", &format!("/api/v1/boms/{}/revision", bom), None).await;
        assert_eq!(status, StatusCode::OK);

        // Structural edits are blocked while the revision is open
        let (status, body) = json_call(&app, "DELETE", &format!("/api/v1/boms/{}/parts/{}", bom, part_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let edit = json!({"partId": part_id, "field": "quantity", "value": "6"});
        let (status, _) = json_call(&app, "PUT", &format!("/api/v1/boms/{}/revision/cells", bom), Some(edit)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, outcome) = json_call(&app, "POST", &format!("/api/v1/boms/{}/revision/save", bom), None).await;
        assert_eq!(outcome["outcome"], "review");
        assert_eq!(outcome["changes"][0]["oldValue"], "2");

        let (status, confirmed) = json_call(&app, "POST", &format!("/api/v1/boms/{}/revision/confirm", bom), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["parts"][0]["quantity"], 6);

        let (status, body) = json_call(&app, "POST", &format!("/api/v1/boms/{}/revision/confirm", bom), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_import_then_export() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let bom = create_bom(&app).await;

        let csv = "Part Code,Description,Qty,Material Type,Material,Cut Formula\n\
                   PF-1,Frame head,2,Profile,AL,W - 10\n\
                   HW-2,Hinge,4,Hardware,SUS,\n";
        let (status, inspection) = upload_csv(&app, &bom, csv).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inspection["rowCount"], 2);
        assert_eq!(inspection["missing"], json!([]));
        let sheet_id = inspection["sheetId"].as_str().unwrap().to_string();

        let mapping = json!({"mapping": inspection["mapping"].clone()});
        let (status, committed) = json_call(
            &app,
            "POST",
            &format!("/api/v1/boms/{}/imports/{}/commit", bom, sheet_id),
            Some(mapping),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(committed["added"], 2);

        let (_, detail) = json_call(&app, "GET", &format!("/api/v1/boms/{}", bom), None).await;
        assert_eq!(detail["parts"].as_array().unwrap().len(), 2);

        let request = Request::builder()
            .uri(format!("/api/v1/boms/{}/export?width=1200&height=900", bom))
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let request = Request::builder()
            .uri(format!("/api/v1/boms/{}/report?width=1200&height=900", bom))
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        let html = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
        assert!(html.contains("Inner BOM IB-300"));
        assert!(html.contains("1200 - 10"));

        let (status, body) = json_call(&app, "GET", &format!("/api/v1/boms/{}/report?width=0&height=900", bom), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_second_upload_replaces_pending_import() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let bom = create_bom(&app).await;

        let (_, first) = upload_csv(&app, &bom, "Part Code,Description,Qty,Material Type,Material\nPF-1,Frame head,1,Profile,AL\n").await;
        let (_, second) = upload_csv(&app, &bom, "Part Code,Description,Qty,Material Type,Material\nPF-2,Frame sill,1,Profile,AL\n").await;
        let first_id = first["sheetId"].as_str().unwrap();
        let second_id = second["sheetId"].as_str().unwrap();
        assert_ne!(first_id, second_id);

        let mapping = json!({"mapping": second["mapping"].clone()});
        let (status, body) = json_call(
            &app,
            "POST",
            &format!("/api/v1/boms/{}/imports/{}/preview", bom, first_id),
            Some(mapping.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, preview) = json_call(
            &app,
            "POST",
            &format!("/api/v1/boms/{}/imports/{}/preview", bom, second_id),
            Some(mapping),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(preview["parts"][0]["partCode"], "PF-2");
    }

    #[tokio::test]
    async fn test_malformed_requests_get_error_json() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let bom = create_bom(&app).await;

        let (status, body) = raw_call(&app, "POST", "/api/v1/boms", "application/json", r#"{"variant": 5"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = raw_call(&app, "POST", &format!("/api/v1/boms/{}/parts", bom), "text/plain", "PF-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = json_call(&app, "GET", "/api/v1/boms/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = json_call(&app, "GET", &format!("/api/v1/boms/{}/report?width=wide&height=900", bom), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = raw_call(&app, "POST", &format!("/api/v1/boms/{}/imports", bom), "application/json", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_inner_bom_requires_glass_groove() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let mut request = inner_bom();
        request["glassGroove"] = Value::Null;

        let (status, body) = json_call(&app, "POST", "/api/v1/boms", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = json_call(&app, "GET", &format!("/api/v1/boms/{}", uuid::Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_quotations_served_from_local_tier() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, saved) = json_call(
            &app,
            "POST",
            "/api/v1/quotations",
            Some(json!({"customerInfo": {"company": "Kato Glass"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["tier"], "local");

        let (_, listed) = json_call(&app, "GET", "/api/v1/quotations", None).await;
        assert_eq!(listed["value"][0]["customerName"], "Kato Glass");
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = call(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }
}
