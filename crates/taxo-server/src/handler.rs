use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use taxo_diff::{compare_trees, project, DiffSummary, DiffView, NodeView, ViewMode, ViewOptions};
use taxo_loader::TreeLoader;
use taxo_types::{Language, NodeId, Version, VersionHash};

use crate::error::{ServerError, ServerResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<dyn TreeLoader>,
    pub default_language: Language,
}

impl AppState {
    pub fn new(loader: Arc<dyn TreeLoader>, default_language: Language) -> Self {
        Self {
            loader,
            default_language,
        }
    }
}

/// Query string of the comparison page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareQuery {
    pub original_hash: Option<String>,
    pub other_hash: Option<String>,
    pub view: Option<String>,
    pub node_view: Option<String>,
    pub field_view: Option<String>,
    pub language: Option<String>,
}

impl CompareQuery {
    fn version(value: Option<&str>, param: &str) -> ServerResult<VersionHash> {
        let raw = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServerError::BadRequest(format!("missing query parameter {param}")))?;
        Ok(VersionHash::parse(raw)?)
    }

    pub fn original(&self) -> ServerResult<VersionHash> {
        Self::version(self.original_hash.as_deref(), "originalHash")
    }

    pub fn other(&self) -> ServerResult<VersionHash> {
        Self::version(self.other_hash.as_deref(), "otherHash")
    }

    /// View options; absent parameters take their defaults.
    pub fn view_options(&self) -> ServerResult<ViewOptions> {
        let view = match self.view.as_deref() {
            Some(v) => v.parse::<ViewMode>()?,
            None => ViewMode::default(),
        };
        let node_view = match self.node_view.as_deref() {
            Some(v) => v.parse::<NodeView>()?,
            None => NodeView::default(),
        };
        let mut options = ViewOptions::new(view, node_view);
        options.field_view = self.field_view.clone();
        Ok(options)
    }

    pub fn language(&self, default: &Language) -> ServerResult<Language> {
        match self.language.as_deref() {
            Some(l) => Ok(Language::parse(l)?),
            None => Ok(default.clone()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub node_id: NodeId,
    pub original_hash: VersionHash,
    pub other_hash: VersionHash,
    pub options: ViewOptions,
    pub identical: bool,
    pub summary: DiffSummary,
    pub view: DiffView,
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "taxo-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn versions_handler(State(state): State<AppState>) -> ServerResult<Json<Vec<Version>>> {
    Ok(Json(state.loader.list_versions().await?))
}

/// Compare the subtree rooted at `node_id` across two versions.
pub async fn compare_handler(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    Query(query): Query<CompareQuery>,
) -> ServerResult<Json<CompareResponse>> {
    let node_id = NodeId::new(node_id);
    let original = query.original()?;
    let other = query.other()?;
    let options = query.view_options()?;
    let language = query.language(&state.default_language)?;

    let (original_tree, other_tree) = state
        .loader
        .fetch_pair(&node_id, &original, &other, &language)
        .await?;

    let tree = compare_trees(&original_tree, &other_tree);
    let summary = tree.summary();
    debug!(node = %node_id, %original, %other, changes = summary.total(), "compared versions");
    let view = project(tree, &options);

    Ok(Json(CompareResponse {
        node_id,
        original_hash: original,
        other_hash: other,
        options,
        identical: view.is_identical(),
        summary,
        view,
    }))
}
