use std::sync::Arc;

use log::debug;
use rocket::{State, get, serde::json::Json};
use tokio::task::spawn_blocking;

use crate::{
    error::{ApiError, ErrorBody},
    markdown::{RenderedDocument, render_markdown},
    search::search_paths,
    state::ServerState,
    tree::{TreeNode, build_tree},
    workspace::{FsReader, is_markdown},
};

#[get("/tree")]
pub async fn tree(state: &State<ServerState>) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let workspace = Arc::clone(&state.workspace);
    let nodes =
        spawn_blocking(move || build_tree(&FsReader, workspace.root(), workspace.root())).await??;

    Ok(Json(nodes))
}

#[get("/file?<path>")]
pub async fn file(
    path: Option<&str>,
    state: &State<ServerState>,
) -> Result<Json<RenderedDocument>, ApiError> {
    let requested = path
        .filter(|path| !path.is_empty())
        .ok_or(ApiError::MISSING_PATH)?;

    let resolved = state.workspace.resolve(requested).await?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(ApiError::lookup)?;
    if !metadata.is_file() || !is_markdown(&resolved) {
        return Err(ApiError::NOT_MARKDOWN);
    }

    debug!("Rendering {}", resolved.display());
    let bytes = tokio::fs::read(&resolved).await.map_err(ApiError::lookup)?;
    let raw = String::from_utf8(bytes)
        .unwrap_or_else(|error| String::from_utf8_lossy(error.as_bytes()).into_owned());

    let highlighter = Arc::clone(&state.highlighter);
    let (raw, html) = spawn_blocking(move || {
        let html = render_markdown(&raw, &*highlighter);
        (raw, html)
    })
    .await?;

    Ok(Json(RenderedDocument {
        path: requested.to_owned(),
        html,
        raw,
    }))
}

#[get("/search?<q>")]
pub async fn search(
    q: Option<&str>,
    state: &State<ServerState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let query = q.unwrap_or_default().to_owned();
    let workspace = Arc::clone(&state.workspace);
    let matches = spawn_blocking(move || search_paths(&FsReader, workspace.root(), &query)).await??;

    Ok(Json(matches))
}

#[catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("not found"))
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("internal server error"))
}
