//! # HTTP API
//!
//! JSON endpoints the builder UI talks to. Every route answers 403 while
//! the builder feature is switched off.
//!
//! ```text
//! GET    /api/settings               -> { features, autosaveDebounceMs, siteTitle }
//! GET    /api/templates
//! GET    /api/slots?namespace=pages|elements
//! GET    /api/slots/:slot            -> { blocks, elementStyles? }
//! POST   /api/slots/:slot            -> { ok, bytesWritten, backupCreated }
//! DELETE /api/slots/:slot            -> { ok }
//! POST   /api/slots/:slot/reset      -> { ok }
//! POST   /api/slots/:slot/generate   -> { code }
//! ```

use crate::config::Config;
use crate::slots::Namespace;
use crate::store::{SlotStore, StoreError};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pagesmith_compiler::Snapshot;
use pagesmith_document::{BlockTemplate, Category};
use pagesmith_editor::FeatureFlags;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// What the builder UI needs to know before editing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub features: FeatureFlags,
    pub autosave_debounce_ms: u64,
    pub site_title: String,
}

impl ClientSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            features: config.features,
            autosave_debounce_ms: config.autosave_debounce_ms,
            site_title: config.site_title.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SlotStore>,
    pub settings: Arc<ClientSettings>,
}

impl AppState {
    /// State with default settings; features follow the store
    pub fn new(store: SlotStore) -> Self {
        let settings = ClientSettings {
            features: store.features(),
            ..ClientSettings::from_config(&Config::default())
        };
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
        }
    }

    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }
}

#[derive(Debug)]
pub enum ApiError {
    BuilderDisabled,
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BuilderDisabled => (StatusCode::FORBIDDEN, "Builder is disabled".to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Store(e) => {
                let status = match &e {
                    StoreError::InvalidSlot(_) => StatusCode::BAD_REQUEST,
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Compile(_) | StoreError::Defaults(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    StoreError::WriteFailed { .. } | StoreError::BackupFailed { .. } | StoreError::Io(_) => {
                        tracing::error!(error = %e, "storage failure");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/settings", get(client_settings))
        .route("/api/templates", get(list_templates))
        .route("/api/slots", get(list_slots))
        .route(
            "/api/slots/:slot",
            get(load_slot).post(save_slot).delete(delete_slot),
        )
        .route("/api/slots/:slot/reset", post(reset_slot))
        .route("/api/slots/:slot/generate", post(generate_code))
        .layer(middleware::from_fn_with_state(state.clone(), require_builder))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, project_dir: &FsPath) -> anyhow::Result<()> {
    let store = SlotStore::new(config.storage_path(project_dir))
        .with_features(config.features)
        .with_site_title(&config.site_title);
    store.init()?;

    let addr = config.socket_addr();
    tracing::info!(%addr, root = %store.root().display(), "serving builder API");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let state = AppState::new(store).with_settings(ClientSettings::from_config(config));
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn require_builder(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.store.features().builder_enabled {
        return ApiError::BuilderDisabled.into_response();
    }
    next.run(request).await
}

async fn client_settings(State(state): State<AppState>) -> Json<ClientSettings> {
    Json(state.settings.as_ref().clone())
}

#[derive(Serialize)]
struct PaletteGroup<'a> {
    category: Category,
    label: &'static str,
    templates: Vec<&'a BlockTemplate>,
}

async fn list_templates(State(state): State<AppState>) -> Response {
    let groups: Vec<PaletteGroup> = state
        .store
        .registry()
        .categories()
        .into_iter()
        .map(|(category, templates)| PaletteGroup {
            category,
            label: category.label(),
            templates,
        })
        .collect();
    Json(groups).into_response()
}

#[derive(Debug, Deserialize)]
struct SlotsQuery {
    #[serde(default)]
    namespace: Namespace,
}

#[derive(Serialize)]
struct SlotsResponse {
    namespace: Namespace,
    slots: Vec<String>,
}

async fn list_slots(State(state): State<AppState>, Query(query): Query<SlotsQuery>) -> ApiResult<SlotsResponse> {
    let slots = state.store.list_slots(query.namespace)?;
    Ok(Json(SlotsResponse {
        namespace: query.namespace,
        slots,
    }))
}

async fn load_slot(State(state): State<AppState>, Path(slot): Path<String>) -> ApiResult<Snapshot> {
    let slot = state.store.slot(&slot)?;
    let doc = state.store.load(&slot)?;
    Ok(Json(Snapshot::from_document(&doc)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    ok: bool,
    bytes_written: usize,
    backup_created: bool,
}

async fn save_slot(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    body: Result<Json<Snapshot>, JsonRejection>,
) -> ApiResult<SaveResponse> {
    let slot = state.store.slot(&slot)?;
    let Json(snapshot) = body?;
    let doc = snapshot.into_document(slot.as_str(), state.store.registry());
    let receipt = state.store.save(&slot, &doc)?;
    Ok(Json(SaveResponse {
        ok: true,
        bytes_written: receipt.bytes_written,
        backup_created: receipt.backup_created,
    }))
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

async fn reset_slot(State(state): State<AppState>, Path(slot): Path<String>) -> ApiResult<OkResponse> {
    let slot = state.store.slot(&slot)?;
    state.store.reset(&slot)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn delete_slot(State(state): State<AppState>, Path(slot): Path<String>) -> ApiResult<OkResponse> {
    let slot = state.store.slot(&slot)?;
    state.store.delete(&slot)?;
    Ok(Json(OkResponse { ok: true }))
}

#[derive(Serialize)]
struct CodeResponse {
    code: String,
}

async fn generate_code(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    body: Result<Json<Snapshot>, JsonRejection>,
) -> ApiResult<CodeResponse> {
    let slot = state.store.slot(&slot)?;
    let Json(snapshot) = body?;
    let doc = snapshot.into_document(slot.as_str(), state.store.registry());
    let code = state.store.generate_preview(&doc)?;
    Ok(Json(CodeResponse { code }))
}
