use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type Result<T> = std::result::Result<T, SwarmError>;

#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    /// The operation needs a signed-in user; the payload names the action.
    #[error("User must be logged in to {0}")]
    AuthRequired(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Execution trigger failed: {0}")]
    Trigger(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for SwarmError {
    fn from(e: reqwest::Error) -> Self {
        SwarmError::Trigger(e.to_string())
    }
}

impl From<crate::form::FormError> for SwarmError {
    fn from(e: crate::form::FormError) -> Self {
        SwarmError::Validation(e.to_string())
    }
}

impl IntoResponse for SwarmError {
    fn into_response(self) -> Response {
        let status = match &self {
            SwarmError::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            SwarmError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            SwarmError::NotFound(_) => StatusCode::NOT_FOUND,
            SwarmError::Conflict(_) => StatusCode::CONFLICT,
            SwarmError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SwarmError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SwarmError::Trigger(_) => StatusCode::BAD_GATEWAY,
            SwarmError::Serialization(_) => StatusCode::BAD_REQUEST,
            SwarmError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SwarmError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_required_message_names_action() {
        let err = SwarmError::AuthRequired("create a simulation");
        assert_eq!(err.to_string(), "User must be logged in to create a simulation");
    }

    #[test]
    fn test_status_codes() {
        let resp = SwarmError::AuthRequired("get test results").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = SwarmError::NotFound("Conversation not found or unauthorized".into())
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = SwarmError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = SwarmError::Conflict("An account with this email already exists".into())
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = SwarmError::Trigger("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
