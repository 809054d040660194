//! Web dashboard.
//!
//! Request-driven: every page load runs one poll pass.  Vendors are protected
//! from reload storms by the response cache in front of the HTTP client, not
//! by anything here.
//!
//! | Route          | Response                         |
//! |----------------|----------------------------------|
//! | `/`            | HTML dashboard                   |
//! | `/api/status`  | the same pass as a JSON array    |
//! | `/healthz`     | `ok`                             |

mod page;

pub use page::PageSettings;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::poll::Poller;
use crate::status::StatusResult;

#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<Poller>,
    pub page: PageSettings,
}

#[derive(Debug, Error)]
enum WebError {
    #[error("poll pass did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "poll pass failed").into_response()
    }
}

/// Run a blocking pass off the async workers.
async fn run_pass(poller: Arc<Poller>) -> Result<Vec<StatusResult>, WebError> {
    Ok(tokio::task::spawn_blocking(move || poller.poll_pass()).await?)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let results = run_pass(state.poller.clone()).await?;
    Ok(Html(page::render(&results, &state.page)))
}

async fn api_status(State(state): State<AppState>) -> Result<Json<Vec<StatusResult>>, WebError> {
    Ok(Json(run_pass(state.poller.clone()).await?))
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(api_status))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        providers = state.poller.registry().len(),
        "dashboard listening on http://{addr}/"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
