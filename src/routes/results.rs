use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::require_session;
use crate::error::SwarmError;
use crate::results::{select_view, ConversationView, MetricSection, ResultsTab};
use crate::state::SharedState;
use crate::store::queries;
use crate::store::{ConversationRecord, ConversationSummary, ResultsSelector};

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    /// A simulation id, or "all".
    pub simulation: Option<String>,
    /// Conversation to show first; defaults to the first returned.
    pub conversation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TabParams {
    #[serde(default)]
    pub tab: ResultsTab,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub conversations: Vec<ConversationRecord>,
    pub selected: Option<ConversationView>,
}

#[derive(Serialize)]
pub struct ConversationResponse {
    pub view: ConversationView,
    pub tab: ResultsTab,
    pub sections: Vec<MetricSection>,
}

pub async fn get_results(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ResultsParams>,
) -> Result<Json<ResultsResponse>, SwarmError> {
    let session = require_session(&state.db, &headers, "get test results")?;
    let selector = ResultsSelector::parse(params.simulation.as_deref().unwrap_or("all"));

    let conversations = queries::get_test_results(&state.db, &session, &selector)?;
    let selected = select_view(&conversations, params.conversation.as_deref());

    Ok(Json(ResultsResponse {
        conversations,
        selected,
    }))
}

pub async fn list_conversations(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ConversationSummary>>, SwarmError> {
    let session = require_session(&state.db, &headers, "list conversations")?;
    Ok(Json(queries::list_conversations(&state.db, &session)?))
}

pub async fn get_conversation(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<TabParams>,
) -> Result<Json<ConversationResponse>, SwarmError> {
    let session = require_session(&state.db, &headers, "get conversation details")?;
    let record = queries::get_conversation(&state.db, &session, &id)?
        .ok_or_else(|| SwarmError::NotFound("Conversation not found or unauthorized".to_string()))?;

    let view = ConversationView::from_record(&record);
    let sections = view.metric_sections(params.tab);
    Ok(Json(ConversationResponse {
        view,
        tab: params.tab,
        sections,
    }))
}
