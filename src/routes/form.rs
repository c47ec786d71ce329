use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::SwarmError;
use crate::form::{form_options, validate, FormAction, FormOptions, TestConfigDraft};

#[derive(Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub draft: TestConfigDraft,
    #[serde(default)]
    pub actions: Vec<FormAction>,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

pub async fn defaults() -> Json<TestConfigDraft> {
    Json(TestConfigDraft::default())
}

pub async fn options() -> Json<FormOptions> {
    Json(form_options())
}

pub async fn validate_draft(Json(draft): Json<TestConfigDraft>) -> Json<ValidationResponse> {
    let errors = validate(&draft);
    Json(ValidationResponse {
        valid: errors.is_empty(),
        errors,
    })
}

/// Applies the edits in order and returns the resulting draft. A rejected
/// edit fails the whole request; the client keeps its previous draft.
pub async fn apply(Json(body): Json<ApplyRequest>) -> Result<Json<TestConfigDraft>, SwarmError> {
    let mut draft = body.draft;
    draft.apply_all(body.actions)?;
    Ok(Json(draft))
}
