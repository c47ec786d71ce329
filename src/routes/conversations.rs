//! Ingest endpoints for the execution backend. Rows are attributed to the
//! session presenting the bearer token.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::debug;

use crate::auth::require_session;
use crate::error::SwarmError;
use crate::state::SharedState;
use crate::store::{
    AnalysisResults, ConversationData, QualityMetrics, QualityScores, SemanticAnalysis,
    TechnicalData, TechnicalMetrics, VoiceConversation,
};

pub async fn create_conversation(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(simulation_id): Path<String>,
    Json(data): Json<ConversationData>,
) -> Result<(StatusCode, Json<VoiceConversation>), SwarmError> {
    let session = require_session(&state.db, &headers, "create a voice conversation")?;
    let conversation = state
        .db
        .create_voice_conversation(&session, &simulation_id, &data)?;
    debug!(
        "Recorded conversation {} ({}) for simulation {}",
        conversation.id, conversation.data.call_sid, simulation_id
    );
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn create_quality_metrics(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(scores): Json<QualityScores>,
) -> Result<(StatusCode, Json<QualityMetrics>), SwarmError> {
    let session = require_session(&state.db, &headers, "create quality metrics")?;
    let metrics = state
        .db
        .create_quality_metrics(&session, &conversation_id, &scores)?;
    Ok((StatusCode::CREATED, Json(metrics)))
}

pub async fn create_technical_metrics(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(data): Json<TechnicalData>,
) -> Result<(StatusCode, Json<TechnicalMetrics>), SwarmError> {
    let session = require_session(&state.db, &headers, "create technical metrics")?;
    let metrics = state
        .db
        .create_technical_metrics(&session, &conversation_id, &data)?;
    Ok((StatusCode::CREATED, Json(metrics)))
}

pub async fn create_analysis(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    Json(analysis): Json<SemanticAnalysis>,
) -> Result<(StatusCode, Json<AnalysisResults>), SwarmError> {
    let session = require_session(&state.db, &headers, "create semantic analysis")?;
    let results = state
        .db
        .create_semantic_analysis(&session, &conversation_id, &analysis)?;
    Ok((StatusCode::CREATED, Json(results)))
}
