use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::require_session;
use crate::drafts::{draft_path, load_draft, save_draft};
use crate::error::SwarmError;
use crate::form::TestConfigDraft;
use crate::state::SharedState;

pub async fn get_draft(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<TestConfigDraft>, SwarmError> {
    let session = require_session(&state.db, &headers, "load a draft")?;
    let path = draft_path(&state.config, &session.user_id);
    Ok(Json(load_draft(&path)))
}

pub async fn put_draft(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(draft): Json<TestConfigDraft>,
) -> Result<Json<serde_json::Value>, SwarmError> {
    let session = require_session(&state.db, &headers, "save a draft")?;
    let path = draft_path(&state.config, &session.user_id);
    let saved = save_draft(&path, &draft);

    Ok(Json(serde_json::json!({ "saved": saved })))
}
