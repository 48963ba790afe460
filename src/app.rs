//! The interactive surface: one HTML page plus JSON endpoints mirroring the
//! session and the two actions. UI plumbing only; the session and command
//! layer hold all behavior.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::commands::{fetch_feeds, process_items, FetchOutcome, ProcessOutcome};
use crate::config::Config;
use crate::llm::{ModelId, ModelService};
use crate::session::Session;

/// Shared state behind every handler: one session, one set of clients.
///
/// The session mutex is held for the duration of each command, so actions
/// are serialized the way a single user clicking buttons is.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    model_service: Arc<dyn ModelService>,
    http_client: reqwest::Client,
    item_limit: usize,
    progress_tx: Arc<watch::Sender<f32>>,
    progress_rx: watch::Receiver<f32>,
}

impl AppState {
    pub fn new(
        config: &Config,
        http_client: reqwest::Client,
        model_service: Arc<dyn ModelService>,
    ) -> Self {
        let (progress_tx, progress_rx) = watch::channel(0.0);
        Self {
            session: Arc::new(Mutex::new(Session::new(config))),
            model_service,
            http_client,
            item_limit: config.item_limit,
            progress_tx: Arc::new(progress_tx),
            progress_rx,
        }
    }
}

#[derive(Deserialize)]
struct SessionUpdate {
    feed_urls_text: Option<String>,
    prompt_text: Option<String>,
    selected_model: Option<ModelId>,
}

#[derive(Serialize)]
struct Progress {
    fraction: f32,
}

pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/session", get(get_session).put(update_session))
        .route("/api/fetch", post(run_fetch))
        .route("/api/process", post(run_process))
        .route("/api/progress", get(get_progress))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.session.lock().await.clone())
}

async fn update_session(
    State(state): State<AppState>,
    Json(update): Json<SessionUpdate>,
) -> Json<Session> {
    let mut session = state.session.lock().await;
    if let Some(text) = update.feed_urls_text {
        session.feed_urls_text = text;
    }
    if let Some(prompt) = update.prompt_text {
        session.prompt_text = prompt;
    }
    if let Some(model) = update.selected_model {
        session.selected_model = model;
    }
    Json(session.clone())
}

async fn run_fetch(State(state): State<AppState>) -> Json<FetchOutcome> {
    let mut session = state.session.lock().await;
    Json(fetch_feeds(&mut session, &state.http_client, state.item_limit).await)
}

async fn run_process(State(state): State<AppState>) -> Json<ProcessOutcome> {
    let mut session = state.session.lock().await;
    Json(process_items(&mut session, state.model_service.as_ref(), &state.progress_tx).await)
}

async fn get_progress(State(state): State<AppState>) -> Json<Progress> {
    Json(Progress {
        fraction: *state.progress_rx.borrow(),
    })
}
