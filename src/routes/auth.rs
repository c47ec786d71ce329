use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::auth::{self, Session};
use crate::error::SwarmError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn sign_up(
    State(state): State<SharedState>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<Session>), SwarmError> {
    let session = auth::sign_up(&state.db, &body.email, &body.password)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<SharedState>,
    Json(body): Json<Credentials>,
) -> Result<Json<Session>, SwarmError> {
    Ok(Json(auth::sign_in(&state.db, &body.email, &body.password)?))
}

pub async fn sign_out(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, SwarmError> {
    let token = auth::bearer_token(&headers).ok_or(SwarmError::AuthRequired("sign out"))?;
    let signed_out = auth::sign_out(&state.db, token)?;

    Ok(Json(serde_json::json!({ "signed_out": signed_out })))
}

pub async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Session>, SwarmError> {
    Ok(Json(auth::require_session(
        &state.db,
        &headers,
        "view the current user",
    )?))
}
