//! Path-keyed edits to a [`TestConfigDraft`].
//!
//! Paths use the wire names of the draft (`"conversation.maxTurns"`). An edit
//! either applies completely or leaves the draft untouched; nothing is
//! validated here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Environment, TestConfigDraft};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormAction {
    Set { path: String, value: Value },
    /// Add the option to a multi-select list, or remove it if present.
    Toggle { path: String, option: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {0} is not a multi-select list")]
    NotAList(String),

    #[error("Invalid value for {path}: {message}")]
    InvalidValue { path: String, message: String },
}

fn parse<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FormError> {
    serde_json::from_value(value).map_err(|e| FormError::InvalidValue {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn parse_environment(path: &str, value: Value) -> Result<Option<Environment>, FormError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Environment::parse(&s)
            .map(Some)
            .ok_or_else(|| FormError::InvalidValue {
                path: path.to_string(),
                message: format!("unknown environment: {s}"),
            }),
        other => Err(FormError::InvalidValue {
            path: path.to_string(),
            message: format!("expected a string, got {other}"),
        }),
    }
}

impl TestConfigDraft {
    pub fn apply(&mut self, action: FormAction) -> Result<(), FormError> {
        match action {
            FormAction::Set { path, value } => self.set_field(&path, value),
            FormAction::Toggle { path, option } => {
                let list = self
                    .list_mut(&path)
                    .ok_or_else(|| FormError::NotAList(path.clone()))?;
                if let Some(pos) = list.iter().position(|o| *o == option) {
                    list.remove(pos);
                } else {
                    list.push(option);
                }
                Ok(())
            }
            FormAction::Reset => {
                *self = TestConfigDraft::default();
                Ok(())
            }
        }
    }

    /// Apply a batch of edits in order, stopping at the first rejected one.
    pub fn apply_all(
        &mut self,
        actions: impl IntoIterator<Item = FormAction>,
    ) -> Result<(), FormError> {
        for action in actions {
            self.apply(action)?;
        }
        Ok(())
    }

    fn set_field(&mut self, path: &str, value: Value) -> Result<(), FormError> {
        match path {
            "basics.name" => self.basics.name = parse(path, value)?,
            "basics.simultaneous" => self.basics.simultaneous = parse(path, value)?,
            "basics.duration" => self.basics.duration = parse(path, value)?,
            "basics.environment" => self.basics.environment = parse_environment(path, value)?,
            "basics.twilio_number" | "basics.twilioNumber" => {
                self.basics.twilio_number = parse(path, value)?
            }

            "customer.accents" => self.customer.accents = parse(path, value)?,
            "customer.pace" => self.customer.pace = parse(path, value)?,
            "customer.noise" => self.customer.noise = parse(path, value)?,
            "customer.interruption" => self.customer.interruption = parse(path, value)?,
            "customer.emotions" => self.customer.emotions = parse(path, value)?,

            "conversation.industry" => self.conversation.industry = parse(path, value)?,
            "conversation.complexity" => self.conversation.complexity = parse(path, value)?,
            "conversation.maxTurns" => self.conversation.max_turns = parse(path, value)?,
            "conversation.responseThreshold" => {
                self.conversation.response_threshold = parse(path, value)?
            }
            "conversation.successCriteria" => {
                self.conversation.success_criteria = parse(path, value)?
            }

            "network.latency" => self.network.latency = parse(path, value)?,
            "network.packetLoss" => self.network.packet_loss = parse(path, value)?,
            "network.bandwidth" => self.network.bandwidth = parse(path, value)?,
            "network.stability" => self.network.stability = parse(path, value)?,

            "scenario.template" => self.scenario.template = parse(path, value)?,
            "scenario.edgeCaseFreq" => self.scenario.edge_case_freq = parse(path, value)?,
            "scenario.errorRate" => self.scenario.error_rate = parse(path, value)?,
            "scenario.vocabulary" => self.scenario.vocabulary = parse(path, value)?,
            "scenario.topics" => self.scenario.topics = parse(path, value)?,

            "quality.minResponseTime" => self.quality.min_response_time = parse(path, value)?,
            "quality.completionRate" => self.quality.completion_rate = parse(path, value)?,
            "quality.maxErrorRate" => self.quality.max_error_rate = parse(path, value)?,
            "quality.contextScore" => self.quality.context_score = parse(path, value)?,
            "quality.clarityThreshold" => self.quality.clarity_threshold = parse(path, value)?,

            _ => return Err(FormError::UnknownField(path.to_string())),
        }
        Ok(())
    }

    fn list_mut(&mut self, path: &str) -> Option<&mut Vec<String>> {
        match path {
            "customer.accents" => Some(&mut self.customer.accents),
            "customer.pace" => Some(&mut self.customer.pace),
            "customer.noise" => Some(&mut self.customer.noise),
            "customer.emotions" => Some(&mut self.customer.emotions),
            "scenario.vocabulary" => Some(&mut self.scenario.vocabulary),
            "scenario.topics" => Some(&mut self.scenario.topics),
            _ => None,
        }
    }
}
