//! HTTP application assembly.

use std::path::Path;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application: admin API, `/health`, the `/socket`
/// upgrade endpoint, API docs, and optionally `/static`.
pub fn build_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .merge(api::build_router())
        .route("/socket", get(ws_handler))
        .merge(docs());

    if let Some(dir) = static_dir {
        tracing::info!(dir = %dir.display(), "serving static assets");
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs() -> Router<AppState> {
    use utoipa::OpenApi;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(api::openapi::ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::service::{RelayService, StaticTokenVerifier};

    fn app() -> Router {
        let relay = RelayService::new(Arc::new(StaticTokenVerifier::new("123456")));
        build_app(AppState::new(relay), None)
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Admin-Token", token);
        }
        let Ok(request) = builder.body(Body::empty()) else {
            panic!("request must build");
        };
        request
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body must be readable");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("body must be json");
        };
        value
    }

    #[tokio::test]
    async fn health_is_open() {
        let Ok(response) = app().oneshot(get_request("/health", None)).await else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["clients"], 0);
    }

    #[tokio::test]
    async fn admin_routes_need_token() {
        let Ok(response) = app()
            .oneshot(get_request("/api.v1/channels/list", Some("wrong")))
            .await
        else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body must be readable");
        };
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn put_then_list() {
        let app = app();
        let Ok(response) = app
            .clone()
            .oneshot(get_request(
                "/api.v1/channels/put?name=b&name=a&is-public=yes&is-public=no&allow-broadcast=no&allow-broadcast=YES",
                Some("123456"),
            ))
            .await
        else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["put"], serde_json::json!(["b", "a"]));

        let Ok(response) = app
            .oneshot(get_request("/api.v1/channels/list", Some("123456")))
            .await
        else {
            panic!("router is infallible");
        };
        assert_eq!(
            body_json(response).await["channels"],
            serde_json::json!(["a", "b"])
        );
    }

    #[tokio::test]
    async fn put_with_missing_flags_is_bad_request() {
        let Ok(response) = app()
            .oneshot(get_request(
                "/api.v1/channels/put?name=a&name=b&is-public=yes&allow-broadcast=no",
                Some("123456"),
            ))
            .await
        else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn subscribe_unknown_client_is_not_applied() {
        let Ok(response) = app()
            .oneshot(get_request(
                "/api.v1/clients/subscribe?client-id=nobody&channel=news",
                Some("123456"),
            ))
            .await
        else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["applied"], false);
        assert_eq!(body["changed"], false);
    }
}
