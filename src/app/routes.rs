use crate::core::lookup::LookupService;
use crate::domain::model::EntityKind;
use crate::utils::error::LookupError;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
}

impl AppState {
    pub fn new(lookup: LookupService) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}

/// 頁面外框本身無法產生時回傳 500
pub struct PageError(LookupError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("Failed to render page: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to render page",
        )
            .into_response()
    }
}

pub fn create_router<P: AsRef<Path>>(state: AppState, public_dir: P) -> Router {
    Router::new()
        .route("/", get(redirect_to_license))
        .route("/license", get(render_license))
        .route("/badge", get(render_badge))
        .route("/name", get(render_name))
        .nest_service("/public", ServeDir::new(public_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 查詢字串不會帶到轉址目標
async fn redirect_to_license() -> Redirect {
    Redirect::temporary("/license")
}

async fn render_license(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, PageError> {
    render_entity(&state, EntityKind::License, query).await
}

async fn render_badge(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, PageError> {
    render_entity(&state, EntityKind::Badge, query).await
}

async fn render_name(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, PageError> {
    render_entity(&state, EntityKind::Name, query).await
}

async fn render_entity(
    state: &AppState,
    kind: EntityKind,
    query: Option<String>,
) -> Result<Html<String>, PageError> {
    state
        .lookup
        .render(kind, query.as_deref())
        .await
        .map(Html)
        .map_err(PageError)
}
