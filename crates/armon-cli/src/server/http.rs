// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server for stores.
//!
//! This is a thin adapter that converts HTTP requests to `RequestContext`,
//! dispatches them against the currently published [`Snapshot`], and converts
//! the `StoreResponse` (or `DispatchError`) back to HTTP.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use armon::{DispatchError, RequestContext, ResponseBody, Snapshot, StoreResponse};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state for the server.
///
/// Holds the latest published snapshot. Each request loads it once, so a
/// request sees either the old or the new route table, never a mix.
pub struct AppState {
    snapshot: ArcSwap<Snapshot>,
}

impl AppState {
    /// Creates state serving the given snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The currently published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Publishes a new snapshot; in-flight requests finish on the old one.
    pub fn publish(&self, snapshot: Snapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }
}

/// Builds the axum router. `cors_origin` enables a CORS layer for that origin.
pub fn create_router(state: Arc<AppState>, cors_origin: Option<&str>) -> anyhow::Result<Router> {
    let mut app = Router::new()
        .fallback(fallback_handler)
        .with_state(state)
        .layer(middleware::from_fn(log_request));

    if let Some(origin) = cors_origin {
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request());
        app = app.layer(cors);
    }

    Ok(app)
}

/// Creates and starts the HTTP server; returns on Ctrl+C.
pub async fn create_server(
    addr: &str,
    state: Arc<AppState>,
    cors_origin: Option<&str>,
) -> anyhow::Result<()> {
    let app = create_router(state, cors_origin)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

/// Dispatches every request against the current snapshot.
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let snapshot = state.current();

    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    if snapshot.mounts().match_url(&path).is_none() {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    let body_bytes = if parts.method != Method::GET && parts.method != Method::HEAD {
        match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes.to_vec()),
            Err(_) => {
                return (StatusCode::PAYLOAD_TOO_LARGE, "Body too large").into_response();
            }
        }
    } else {
        None
    };

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();

    let mut ctx = RequestContext::new(parts.method.as_str(), path)
        .with_query(query)
        .with_headers(headers);
    if let Some(body) = body_bytes {
        ctx = ctx.with_body(body);
    }

    match snapshot.dispatch(&ctx) {
        Some(Ok(response)) => store_response_to_axum(response),
        Some(Err(err)) => dispatch_error_to_axum(err),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Convert StoreResponse to axum Response
fn store_response_to_axum(response: StoreResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    let has_content_type = response
        .headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case("content-type"));

    let mut builder = axum::http::Response::builder().status(status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    let body = match response.body {
        ResponseBody::Empty => Body::empty(),
        ResponseBody::Text(text) => {
            if !has_content_type {
                builder = builder.header(header::CONTENT_TYPE, "text/plain; charset=utf-8");
            }
            Body::from(text)
        }
        ResponseBody::Json(value) => {
            if !has_content_type {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
            }
            Body::from(serde_json::to_string(&value).unwrap_or_default())
        }
    };

    builder.body(body).unwrap_or_else(|_| {
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
    })
}

/// Convert DispatchError to axum Response
fn dispatch_error_to_axum(err: DispatchError) -> Response {
    match err {
        DispatchError::MethodNotAllowed { ref method, ref allowed } => {
            let body = json!({
                "error": err.to_string(),
                "method": method,
                "allowed": allowed,
            });
            axum::http::Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(header::ALLOW, allowed.join(", "))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap_or_else(|_| StatusCode::METHOD_NOT_ALLOWED.into_response())
        }
        DispatchError::Handler { message } => {
            tracing::warn!("Handler error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_headers_and_status() {
        let mut response = StoreResponse::json(json!({ "id": 1 }));
        response.status = 201;
        response
            .headers
            .insert("x-store".to_string(), "users".to_string());

        let converted = store_response_to_axum(response);
        assert_eq!(converted.status(), StatusCode::CREATED);
        assert_eq!(converted.headers()["x-store"], "users");
        assert_eq!(converted.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_custom_content_type_is_kept() {
        let mut response = StoreResponse::text("<p>hi</p>");
        response
            .headers
            .insert("Content-Type".to_string(), "text/html".to_string());

        let converted = store_response_to_axum(response);
        assert_eq!(converted.headers()[header::CONTENT_TYPE], "text/html");
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let converted = dispatch_error_to_axum(DispatchError::MethodNotAllowed {
            method: "PATCH".to_string(),
            allowed: vec!["GET".to_string(), "POST".to_string()],
        });
        assert_eq!(converted.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(converted.headers()[header::ALLOW], "GET, POST");
    }

    #[test]
    fn test_handler_error_is_500() {
        let converted = dispatch_error_to_axum(DispatchError::Handler {
            message: "db offline".to_string(),
        });
        assert_eq!(converted.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
