use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::require_session;
use crate::dashboard::DashboardSummary;
use crate::error::SwarmError;
use crate::state::SharedState;
use crate::store::queries;

pub async fn dashboard(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, SwarmError> {
    let session = require_session(&state.db, &headers, "get dashboard metrics")?;
    let metrics = queries::get_dashboard_metrics(&state.db, &session)?;
    Ok(Json(DashboardSummary::from_metrics(&metrics)))
}
