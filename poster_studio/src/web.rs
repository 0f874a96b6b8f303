use crate::{PosterQuery, ServerConfig, SessionStore, render_poster_svg};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use blob_poster::PosterConfig;
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const INDEX_HTML: &str = include_str!("studio.html");

#[derive(Clone)]
pub struct AppState {
    pub poster: Arc<PosterConfig>,
    pub store: SessionStore,
}

impl AppState {
    pub fn new(poster: PosterConfig) -> Self {
        Self {
            store: SessionStore::new(poster.palette_size),
            poster: Arc::new(poster),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    sid: String,
}

async fn poster_svg(State(state): State<AppState>, Query(query): Query<PosterQuery>) -> Response {
    match render_poster_svg(&state.poster, &state.store, &query) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            error!("poster render failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// The studio's routes over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/healthz", get(|| async { "ok" }))
        .route("/poster.svg", get(poster_svg))
        .route(
            "/session",
            get(|State(state): State<AppState>, Query(q): Query<SessionQuery>| async move {
                Json(state.store.summary(&q.sid))
            }),
        )
        .route(
            "/session/add",
            post(|State(state): State<AppState>, Query(q): Query<SessionQuery>| async move {
                Json(state.store.add_blob(&q.sid))
            }),
        )
        .route(
            "/session/reset",
            post(|State(state): State<AppState>, Query(q): Query<SessionQuery>| async move {
                Json(state.store.reset(&q.sid))
            }),
        )
        .route(
            "/session/palette",
            post(|State(state): State<AppState>, Query(q): Query<SessionQuery>| async move {
                Json(state.store.regenerate_palette(&q.sid))
            }),
        )
        .with_state(state)
}

pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let state = AppState::new(cfg.poster.clone());
    let store = state.store.clone();
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!("Poster studio listening on http://{}", cfg.bind_addr);

    let ttl = cfg.session_ttl;
    let sweeper = tokio::spawn(async move {
        // tokio intervals reject a zero period
        let mut tick = tokio::time::interval(ttl.max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            store.evict_idle(ttl);
        }
    });

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("studio server stopped: {e}");
        }
        sweeper.abort();
    });

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    fn blob_count(body: &[u8]) -> u64 {
        let summary: serde_json::Value = serde_json::from_slice(body).unwrap();
        summary["blob_count"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn add_then_reset_round_trips_through_the_routes() {
        let app = app(AppState::new(PosterConfig::default()));

        let (status, _, body) = call(&app, "POST", "/session/add?sid=u1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(blob_count(&body), 1);

        let (_, _, body) = call(&app, "GET", "/session?sid=u1").await;
        assert_eq!(blob_count(&body), 1);

        let (_, _, body) = call(&app, "POST", "/session/reset?sid=u1").await;
        assert_eq!(blob_count(&body), 0);
    }

    #[tokio::test]
    async fn poster_route_serves_svg_with_session_blobs() {
        let state = AppState::new(PosterConfig::default());
        let store = state.store.clone();
        let app = app(state);

        call(&app, "POST", "/session/add?sid=u2").await;
        let (status, content_type, body) = call(&app, "GET", "/poster.svg?sid=u2&layers=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
        let svg = String::from_utf8(body).unwrap();
        assert_eq!(svg.matches("<polygon").count(), 3);

        call(&app, "GET", "/poster.svg?sid=stranger").await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn health_and_index_respond() {
        let app = app(AppState::new(PosterConfig::default()));
        let (status, _, body) = call(&app, "GET", "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
        let (status, _, body) = call(&app, "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("<html"));
    }
}
