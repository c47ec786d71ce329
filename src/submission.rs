//! Create-test submission: validate, confirm, persist, trigger, redirect.

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::Session;
use crate::config::RESULTS_REDIRECT_DELAY_MS;
use crate::error::{Result, SwarmError};
use crate::form::{validate, TestConfigDraft};
use crate::store::db::SwarmDb;
use crate::trigger::ExecutionTrigger;

/// Typed back by the user before an expensive run is started.
pub const CONFIRMATION_PHRASE: &str = "create test";
pub const CONFIRMATION_REQUIRED: &str = "Please type \"create test\" to confirm";
pub const STARTED_MESSAGE: &str = "Test started successfully! Redirecting to results...";

pub fn confirmation_matches(input: &str) -> bool {
    input.to_lowercase() == CONFIRMATION_PHRASE
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedTest {
    pub configuration_id: String,
    pub simulation_id: String,
    pub redirect: String,
    pub redirect_delay_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Started(StartedTest),
    /// Messages for the form's error list.
    Rejected(Vec<String>),
}

pub fn results_path(simulation_id: &str) -> String {
    format!("/results?simulation={simulation_id}")
}

fn failure_message(err: &SwarmError) -> String {
    let msg = err.to_string();
    if msg.is_empty() {
        "Failed to start test: An unexpected error occurred".to_string()
    } else {
        format!("Failed to start test: {msg}")
    }
}

/// Run the submission workflow.
///
/// Nothing is written unless the draft validates and the confirmation phrase
/// matches. After that, each step runs only once the previous one succeeded;
/// rows already written stay in place if a later step fails.
pub async fn submit<T: ExecutionTrigger>(
    db: &SwarmDb,
    trigger: &T,
    session: Option<&Session>,
    draft: &TestConfigDraft,
    confirmation: &str,
) -> SubmissionOutcome {
    let errors = validate(draft);
    if !errors.is_empty() {
        return SubmissionOutcome::Rejected(errors);
    }
    if !confirmation_matches(confirmation) {
        return SubmissionOutcome::Rejected(vec![CONFIRMATION_REQUIRED.to_string()]);
    }

    match start_test(db, trigger, session, draft).await {
        Ok(started) => SubmissionOutcome::Started(started),
        Err(e) => {
            warn!("Failed to start test {:?}: {}", draft.basics.name, e);
            SubmissionOutcome::Rejected(vec![failure_message(&e)])
        }
    }
}

async fn start_test<T: ExecutionTrigger>(
    db: &SwarmDb,
    trigger: &T,
    session: Option<&Session>,
    draft: &TestConfigDraft,
) -> Result<StartedTest> {
    let session = session.ok_or(SwarmError::AuthRequired("create a test configuration"))?;

    let configuration = db.create_test_config(session, draft)?;
    let simulation = db.create_simulation(session, &configuration.id)?;
    trigger.start(&simulation.id, draft).await?;

    info!(
        "Started test {:?}: configuration={}, simulation={}",
        draft.basics.name, configuration.id, simulation.id
    );

    Ok(StartedTest {
        redirect: results_path(&simulation.id),
        configuration_id: configuration.id,
        simulation_id: simulation.id,
        redirect_delay_ms: RESULTS_REDIRECT_DELAY_MS,
        message: STARTED_MESSAGE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_is_case_insensitive() {
        assert!(confirmation_matches("create test"));
        assert!(confirmation_matches("Create test"));
        assert!(confirmation_matches("CREATE TEST"));
        assert!(!confirmation_matches("create"));
        assert!(!confirmation_matches("create tests"));
        assert!(!confirmation_matches(""));
    }

    #[test]
    fn test_failure_message_prefix() {
        let msg = failure_message(&SwarmError::AuthRequired("create a test configuration"));
        assert_eq!(
            msg,
            "Failed to start test: User must be logged in to create a test configuration"
        );
        assert_eq!(
            failure_message(&SwarmError::Other(String::new())),
            "Failed to start test: An unexpected error occurred"
        );
    }

    #[test]
    fn test_results_path() {
        assert_eq!(results_path("abc"), "/results?simulation=abc");
    }
}
