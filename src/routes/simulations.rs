use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::require_session;
use crate::error::SwarmError;
use crate::state::SharedState;
use crate::store::queries;
use crate::store::{SimulationStatus, TestSimulation};

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: SimulationStatus,
}

pub async fn get_simulation(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TestSimulation>, SwarmError> {
    let session = require_session(&state.db, &headers, "view a simulation")?;
    queries::get_simulation(&state.db, &session, &id)?
        .map(Json)
        .ok_or_else(|| SwarmError::NotFound("Simulation not found or unauthorized".to_string()))
}

/// Returns the simulation as stored after the update.
pub async fn update_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<TestSimulation>, SwarmError> {
    let session = require_session(&state.db, &headers, "update simulation status")?;

    if !state.db.update_simulation_status(&session, &id, body.status)? {
        return Err(SwarmError::NotFound(
            "Simulation not found or unauthorized".to_string(),
        ));
    }
    info!("Simulation {} is now {}", id, body.status.as_str());

    queries::get_simulation(&state.db, &session, &id)?
        .map(Json)
        .ok_or_else(|| SwarmError::NotFound("Simulation not found or unauthorized".to_string()))
}
