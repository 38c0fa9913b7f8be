//! Web server for the resource directory.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | State and category picker |
//! | `GET`  | `/{state_code}/{category_name}` | Resources of one category in one state |
//! | `POST` | `/search` | AI smart search (form field `query`) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Unknown categories and states render an empty listing, not an error.
//! Database failures surface as `500 Internal Server Error`. Smart-search
//! failures never do: the adapter turns them into text for the results page.

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db;
use crate::directory;
use crate::smart_search::SmartSearch;
use crate::views::{CategoryView, IndexView, ResultsView};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub search: Arc<SmartSearch>,
}

/// Starts the web server on `[server].bind` and runs until the process is
/// terminated.
///
/// The smart-search adapter is built here, once, from `[search]`.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(&config.db).await?;
    let search = SmartSearch::from_config(&config.search);
    if let Some(reason) = search.unconfigured_reason() {
        println!("Smart search disabled: {}", reason);
    }

    let app = router(AppState {
        pool,
        search: Arc::new(search),
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %config.server.bind, "server listening");
    println!("Patriot Pathways listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/search", post(handle_search))
        .route("/{state_code}/{category_name}", get(handle_category))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal error: {}", err),
        }
    }
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::from(anyhow::Error::new(e).context("template render failed")))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

async fn handle_index() -> Result<Html<String>, AppError> {
    render(&IndexView::new())
}

// ============ GET /{state_code}/{category_name} ============

async fn handle_category(
    State(state): State<AppState>,
    Path((state_code, category_name)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    let listing = directory::list_category(&state.pool, &state_code, &category_name).await?;
    render(&CategoryView::from(listing))
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchForm {
    query: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    let response = state.search.search(&form.query).await;
    render(&ResultsView::new(form.query, &response))
}
