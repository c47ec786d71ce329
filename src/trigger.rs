//! Outbound signal to the external execution service.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::config::{TriggerConfig, TRIGGER_TIMEOUT_SECS};
use crate::error::{Result, SwarmError};
use crate::form::TestConfigDraft;

/// Starts simulated calls for a freshly created simulation.
pub trait ExecutionTrigger: Send + Sync {
    fn start(
        &self,
        simulation_id: &str,
        draft: &TestConfigDraft,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// POSTs to the configured endpoint with `phone_number` and `num_calls` query
/// parameters and no body. Any 2xx is success; the body is ignored.
pub struct HttpTrigger {
    client: reqwest::Client,
    config: TriggerConfig,
}

impl HttpTrigger {
    pub fn new(config: TriggerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TRIGGER_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }
}

pub fn trigger_url(config: &TriggerConfig) -> Result<Url> {
    Url::parse_with_params(
        &config.url,
        &[
            ("phone_number", config.phone_number.clone()),
            ("num_calls", config.num_calls.to_string()),
        ],
    )
    .map_err(|e| SwarmError::Trigger(format!("invalid trigger url {}: {}", config.url, e)))
}

impl ExecutionTrigger for HttpTrigger {
    async fn start(&self, simulation_id: &str, draft: &TestConfigDraft) -> Result<()> {
        // The destination is fixed per deployment. Whether the draft's own
        // number and concurrency should be forwarded is an open product question.
        if draft.basics.twilio_number != self.config.phone_number
            || draft.basics.simultaneous != i64::from(self.config.num_calls)
        {
            warn!(
                "Simulation {}: draft asks for {} x{}, calling configured {} x{}",
                simulation_id,
                draft.basics.twilio_number,
                draft.basics.simultaneous,
                self.config.phone_number,
                self.config.num_calls
            );
        }

        let url = trigger_url(&self.config)?;
        let resp = self.client.post(url).send().await?;

        if !resp.status().is_success() {
            return Err(SwarmError::Trigger(format!(
                "execution service returned {}",
                resp.status()
            )));
        }

        info!("Execution service accepted simulation {}", simulation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> TriggerConfig {
        TriggerConfig {
            url: url.to_string(),
            phone_number: "+15555550100".to_string(),
            num_calls: 3,
        }
    }

    /// A port that was just bound and released, so nothing listens on it.
    fn closed_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[test]
    fn test_trigger_url_carries_query_params() {
        let url = trigger_url(&config("http://127.0.0.1:8000/make-calls")).unwrap();
        assert_eq!(url.path(), "/make-calls");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("phone_number".to_string(), "+15555550100".to_string()),
                ("num_calls".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_trigger_url() {
        let err = trigger_url(&config("not a url")).unwrap_err();
        assert!(matches!(err, SwarmError::Trigger(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let trigger = HttpTrigger::new(config(&format!(
            "http://127.0.0.1:{}/make-calls",
            closed_port()
        )))
        .unwrap();
        let err = trigger
            .start("sim-1", &TestConfigDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SwarmError::Trigger(_)));
    }
}
