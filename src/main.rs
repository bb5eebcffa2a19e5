//src/main.rs

use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod backend;
mod common;
mod config;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;

fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Analytics
        .route("/api/analytics/leads", get(handlers::analytics::refresh_lead_analytics))
        .route(
            "/api/analytics/leads/latest",
            get(handlers::analytics::latest_lead_analytics),
        )
        // Leads e conversão
        .route("/api/leads", post(handlers::crm::create_lead))
        .route(
            "/api/leads/{id}/conversion",
            get(handlers::crm::get_conversion_form),
        )
        .route("/api/leads/{id}/convert", post(handlers::crm::convert_lead))
        .route("/api/national-id/format", get(handlers::crm::format_national_id))
        // Clientes
        .route("/api/customers/{id}", get(handlers::crm::get_customer))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env primeiro, para RUST_LOG valer no logger
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(config)?;
    tracing::info!(
        "Série mensal de analytics em modo {:?}",
        app_state.config.trend_mode
    );

    let listener = TcpListener::bind(app_state.config.listen_addr.as_str()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        backend::testing::FakeBackend,
        middleware::auth::StaticTokenProvider,
        models::{analytics::TrendMode, crm::LeadRecord},
    };

    fn config() -> Config {
        Config {
            api_base_url: "http://localhost:5000/api".into(),
            listen_addr: "127.0.0.1:0".into(),
            trend_mode: TrendMode::Monthly,
        }
    }

    fn router(backend: &Arc<FakeBackend>, fallback_token: Option<&str>) -> Router {
        app(AppState::with_backend(
            config(),
            backend.clone(),
            Arc::new(StaticTokenProvider(fallback_token.map(str::to_string))),
        ))
    }

    fn lead_backend(status: &str) -> Arc<FakeBackend> {
        Arc::new(FakeBackend {
            lead: Some(serde_json::from_value(json!({"id": "5", "status": status})).unwrap()),
            customer: Some(serde_json::from_value(json!({"id": "c9"})).unwrap()),
            ..Default::default()
        })
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let backend = Arc::new(FakeBackend::default());
        let response = router(&backend, None)
            .oneshot(get("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn analytics_requires_credentials() {
        let backend = Arc::new(FakeBackend::default());
        let response = router(&backend, None)
            .oneshot(get("/api/analytics/leads", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn analytics_forwards_request_token() {
        let backend = Arc::new(FakeBackend {
            leads: vec![
                LeadRecord { status: Some("new".into()), ..Default::default() },
                LeadRecord { status: Some("converted".into()), ..Default::default() },
            ],
            ..Default::default()
        });
        let response = router(&backend, Some("fallback"))
            .oneshot(get("/api/analytics/leads", Some("operator-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["analytics"]["totalLeads"], 2);
        assert_eq!(body["analytics"]["conversionRate"], 50.0);
        assert_eq!(backend.tokens.lock().unwrap().as_slice(), ["operator-token".to_string()]);
    }

    #[tokio::test]
    async fn configured_token_is_used_when_request_has_none() {
        let backend = Arc::new(FakeBackend::default());
        let app = router(&backend, Some("service-token"));

        let response = app
            .clone()
            .oneshot(get("/api/analytics/leads/latest", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/api/analytics/leads", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.tokens.lock().unwrap().as_slice(), ["service-token".to_string()]);
    }

    #[tokio::test]
    async fn invalid_national_id_is_rejected_locally() {
        let backend = lead_backend("new");
        let response = router(&backend, None)
            .oneshot(post_json(
                "/api/leads/5/convert",
                "tok",
                json!({"nationalId": "123", "address": "House 12"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["details"]["nationalId"], json!(["invalid_format"]));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn converted_lead_redirects_to_lead_detail() {
        let backend = lead_backend("converted");
        let response = router(&backend, None)
            .oneshot(get("/api/leads/5/conversion", Some("tok")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(read_json(response).await["redirectTo"], "/leads/5");
    }

    #[tokio::test]
    async fn conversion_redirects_to_new_customer() {
        let backend = lead_backend("qualified");
        let response = router(&backend, None)
            .oneshot(post_json(
                "/api/leads/5/convert",
                "tok",
                json!({"nationalId": "12345-1234567-1", "address": "House 12"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["customerId"], "c9");
        assert_eq!(body["redirectTo"], "/customers/c9");
    }

    #[tokio::test]
    async fn national_id_is_formatted_while_typing() {
        let backend = Arc::new(FakeBackend::default());
        let app = router(&backend, None);

        let partial = read_json(
            app.clone()
                .oneshot(get("/api/national-id/format?value=123456", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(partial, json!({"formatted": "12345-6", "complete": false}));

        let full = read_json(
            app.oneshot(get("/api/national-id/format?value=1234512345671", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(full, json!({"formatted": "12345-1234567-1", "complete": true}));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let backend = Arc::new(FakeBackend::default());
        let response = router(&backend, None)
            .oneshot(get("/api/docs/openapi.json", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert!(body["paths"]["/api/leads/{id}/convert"].is_object());
    }
}
