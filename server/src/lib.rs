use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lexis_core::catalog::{Catalog, DocumentListing, StatsReport};
use lexis_core::snippet::{SnippetExtractor, DEFAULT_WINDOW};
use lexis_core::{Document, DocumentStore, Error, QueryEngine, SearchOptions, SearchResults, MAX_RESULTS};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub const API_VERSION: &str = "2.0";

const ENDPOINTS: &[&str] = &["/api/search?q=word", "/api/documents", "/api/document/1", "/api/stats"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    /// Budget for one core call, storage I/O included.
    pub request_timeout: Duration,
    pub max_results: usize,
    pub snippet_tokens: usize,
    /// Use conventional HTTP status codes for errors instead of always 200.
    pub strict_status: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Lexis Corpus API".into(),
            request_timeout: Duration::from_secs(5),
            max_results: MAX_RESULTS,
            snippet_tokens: DEFAULT_WINDOW,
            strict_status: false,
        }
    }
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub status: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
    pub cors: &'static str,
    pub robots: &'static str,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StatsReport,
    pub api_version: &'static str,
    pub cors_enabled: bool,
    pub robots_allowed: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub config: Arc<ServerConfig>,
}

/// A core error on its way out. Always rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    status: StatusCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.error.to_string() }))).into_response()
    }
}

fn status_code(error: &Error) -> StatusCode {
    match error {
        Error::InvalidQuery | Error::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::SearchError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppState {
    pub fn new(store: DocumentStore, config: ServerConfig) -> Self {
        Self { store: Arc::new(store), config: Arc::new(config) }
    }

    fn reject(&self, error: Error) -> ApiError {
        if error.is_caller_error() {
            tracing::debug!(%error, "request rejected");
        } else {
            tracing::warn!(%error, "request failed");
        }
        let status = if self.config.strict_status { status_code(&error) } else { StatusCode::OK };
        ApiError { error, status }
    }

    /// Run a core call on the blocking pool under the request timeout. A call
    /// that times out or panics is reported as `failure`.
    async fn run<T, F>(&self, failure: fn(String) -> Error, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&DocumentStore) -> lexis_core::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || call(&store));
        match tokio::time::timeout(self.config.request_timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(error))) => Err(self.reject(error)),
            Ok(Err(join)) => Err(self.reject(failure(join.to_string()))),
            Err(_) => Err(self.reject(failure("request timed out".into()))),
        }
    }
}

pub fn build_app(index_dir: &str, config: ServerConfig) -> Result<Router> {
    let store = DocumentStore::open(index_dir)?;
    Ok(router(AppState::new(store, config)))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    let robots = SetResponseHeaderLayer::overriding(HeaderName::from_static("x-robots-tag"), HeaderValue::from_static("all"));

    // CorsLayer answers every OPTIONS request itself; robots wraps it so
    // preflight responses carry the tag too.
    Router::new()
        .route("/api", get(index_handler))
        .route("/api/", get(index_handler))
        .route("/api/search", get(search_handler))
        .route("/api/search/", get(search_handler))
        .route("/api/documents", get(documents_handler))
        .route("/api/documents/", get(documents_handler))
        .route("/api/document/", get(invalid_document_handler))
        .route("/api/document/:doc_id", get(document_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/stats/", get(stats_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(cors)
        .layer(robots)
        .layer(TraceLayer::new_for_http())
}

pub async fn index_handler(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: state.config.name.clone(),
        status: "online",
        version: API_VERSION,
        endpoints: ENDPOINTS,
        cors: "enabled",
        robots: "allowed",
    })
}

/// The first `q` in the query string wins; repeats are ignored.
fn first_query(params: Option<Query<Vec<(String, String)>>>) -> String {
    params
        .and_then(|Query(pairs)| pairs.into_iter().find(|(key, _)| key == "q"))
        .map(|(_, value)| value)
        .unwrap_or_default()
}

pub async fn search_handler(
    State(state): State<AppState>,
    params: Option<Query<Vec<(String, String)>>>,
) -> Result<Json<SearchResults>, ApiError> {
    let q = first_query(params);
    // Rejected before any storage access.
    if q.trim().is_empty() {
        return Err(state.reject(Error::InvalidQuery));
    }
    let options = SearchOptions { limit: state.config.max_results, deadline: Some(Instant::now() + state.config.request_timeout) };
    let snippets = SnippetExtractor::with_window(state.config.snippet_tokens);
    let results = state
        .run(Error::SearchError, move |store| QueryEngine::new(store).with_options(options).with_snippets(snippets).search(&q))
        .await?;
    Ok(Json(results))
}

pub async fn documents_handler(State(state): State<AppState>) -> Result<Json<DocumentListing>, ApiError> {
    let listing = state.run(Error::StoreUnavailable, |store| Ok(Catalog::new(store).list())).await?;
    Ok(Json(listing))
}

pub async fn document_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<Document>, ApiError> {
    let doc = state.run(Error::StoreUnavailable, move |store| Catalog::new(store).document(&doc_id)).await?;
    Ok(Json(doc))
}

async fn invalid_document_handler(State(state): State<AppState>) -> ApiError {
    state.reject(Error::InvalidIdentifier(String::new()))
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.run(Error::StoreUnavailable, |store| Ok(Catalog::new(store).stats())).await?;
    Ok(Json(StatsResponse { stats, api_version: API_VERSION, cors_enabled: true, robots_allowed: true }))
}

async fn fallback_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let status = if state.config.strict_status { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(serde_json::json!({ "error": "Unknown endpoint", "path": uri.path() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use lexis_core::build::IndexBuilder;
    use lexis_core::tokenizer::TokenizerPolicy;
    use tempfile::{tempdir, TempDir};

    fn impatient_state() -> (TempDir, AppState) {
        let dir = tempdir().unwrap();
        let mut builder = IndexBuilder::new(TokenizerPolicy::default());
        builder.add_document("one.txt", "a single line");
        builder.write(dir.path()).unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let config = ServerConfig { request_timeout: Duration::from_millis(1), ..ServerConfig::default() };
        (dir, AppState::new(store, config))
    }

    async fn body_json(error: ApiError) -> serde_json::Value {
        let resp = error.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn slow(_: &DocumentStore) -> lexis_core::Result<()> {
        std::thread::sleep(Duration::from_millis(100));
        Ok(())
    }

    #[tokio::test]
    async fn slow_catalog_call_reports_store_unavailable() {
        let (_dir, state) = impatient_state();
        let error = state.run(Error::StoreUnavailable, slow).await.unwrap_err();
        assert_eq!(body_json(error).await, serde_json::json!({ "error": "Store unavailable: request timed out" }));
    }

    #[tokio::test]
    async fn slow_search_reports_search_error() {
        let (_dir, state) = impatient_state();
        let error = state.run(Error::SearchError, slow).await.unwrap_err();
        assert_eq!(body_json(error).await, serde_json::json!({ "error": "Search error: request timed out" }));
    }

    #[tokio::test]
    async fn panicking_call_reports_failure() {
        let (_dir, state) = impatient_state();
        let state = AppState { config: Arc::new(ServerConfig::default()), ..state };
        let error = state.run(Error::SearchError, |_| -> lexis_core::Result<()> { panic!("boom") }).await.unwrap_err();
        let json = body_json(error).await;
        assert!(json["error"].as_str().unwrap().starts_with("Search error: "));
    }

    #[test]
    fn first_q_wins() {
        let pairs = vec![("q".to_string(), "grace".to_string()), ("q".to_string(), "peace".to_string())];
        assert_eq!(first_query(Some(Query(pairs))), "grace");
        assert_eq!(first_query(None), "");
    }
}
