use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{require_session, session_from_headers};
use crate::drafts::{discard_draft, draft_path};
use crate::error::SwarmError;
use crate::form::TestConfigDraft;
use crate::state::SharedState;
use crate::store::queries;
use crate::store::TestConfiguration;
use crate::submission::{self, SubmissionOutcome};

#[derive(Deserialize)]
pub struct CreateTestRequest {
    pub draft: TestConfigDraft,
    #[serde(default)]
    pub confirmation: String,
}

/// `201` with the started test, or `422` with the messages for the form.
pub async fn create_test(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<CreateTestRequest>,
) -> Result<Response, SwarmError> {
    let session = session_from_headers(&state.db, &headers)?;

    let outcome = submission::submit(
        &state.db,
        &state.trigger,
        session.as_ref(),
        &body.draft,
        &body.confirmation,
    )
    .await;

    let response = match outcome {
        SubmissionOutcome::Started(started) => {
            if let Some(session) = &session {
                discard_draft(&draft_path(&state.config, &session.user_id));
            }
            (StatusCode::CREATED, Json(started)).into_response()
        }
        SubmissionOutcome::Rejected(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": errors })),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn list_configurations(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TestConfiguration>>, SwarmError> {
    let session = require_session(&state.db, &headers, "get test configurations")?;
    Ok(Json(queries::get_test_configs(&state.db, &session)?))
}
