pub mod db;
pub mod queries;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::form::NewTestConfiguration;

// ============================================================================
// Configurations and simulations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub settings: NewTestConfiguration,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStatus {
    Starting,
    Running,
    Completed,
    Failed,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::Starting => "starting",
            SimulationStatus::Running => "running",
            SimulationStatus::Completed => "completed",
            SimulationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(SimulationStatus::Starting),
            "running" => Some(SimulationStatus::Running),
            "completed" => Some(SimulationStatus::Completed),
            "failed" => Some(SimulationStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationStatus::Completed | SimulationStatus::Failed)
    }
}

impl ToSql for SimulationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SimulationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        SimulationStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown simulation status: {s}").into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSimulation {
    pub id: String,
    pub config_id: String,
    pub user_id: String,
    pub status: SimulationStatus,
    pub start_time: String,
    pub end_time: Option<String>,
    pub total_conversations: i64,
    pub successful_conversations: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_configurations: Option<TestConfiguration>,
}

// ============================================================================
// Conversations (written by the execution service)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationMetrics {
    pub turns: i64,
    pub avg_response_time: f64,
    pub successful_turns: i64,
}

/// Conversation fields supplied by the execution service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationData {
    pub call_sid: String,
    pub phone_number: Option<String>,
    pub status: String,
    pub duration: f64,
    /// Either `{"messages": [...]}` or a bare message list, depending on producer.
    pub transcript: Value,
    pub message_timestamps: BTreeMap<String, String>,
    pub token_counts: BTreeMap<String, i64>,
    pub response_times: BTreeMap<String, f64>,
    pub error_details: Vec<ErrorDetail>,
    pub conversation_metrics: ConversationMetrics,
}

impl Default for ConversationData {
    fn default() -> Self {
        Self {
            call_sid: String::new(),
            phone_number: None,
            status: "queued".to_string(),
            duration: 0.0,
            transcript: Value::Null,
            message_timestamps: BTreeMap::new(),
            token_counts: BTreeMap::new(),
            response_times: BTreeMap::new(),
            error_details: Vec::new(),
            conversation_metrics: ConversationMetrics::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConversation {
    pub id: String,
    pub simulation_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub data: ConversationData,
    pub created_at: String,
    pub updated_at: String,
}

/// Row for the results page conversation picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub call_sid: String,
    pub status: String,
    pub created_at: String,
}

// ============================================================================
// Metric attachments
// ============================================================================

/// Quality scores in the 0..1 range, except the count/time fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityScores {
    pub coherence_score: Option<f64>,
    pub task_completion_score: Option<f64>,
    pub context_retention_score: Option<f64>,
    pub natural_language_score: Option<f64>,
    pub appropriateness_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub error_recovery_score: Option<f64>,
    pub overall_quality_score: Option<f64>,
    pub order_accuracy: Option<f64>,
    pub required_clarifications: Option<f64>,
    /// Seconds.
    pub completion_time: Option<f64>,
    pub menu_knowledge: Option<f64>,
    pub special_requests: Option<f64>,
    pub upsell_attempts: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub id: String,
    pub conversation_id: String,
    #[serde(flatten)]
    pub scores: QualityScores,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalData {
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<f64>,
    pub total_tokens: Option<f64>,
    pub tokens_per_message: Option<f64>,
    pub token_efficiency: Option<f64>,
    pub memory_usage_mb: Option<f64>,
    pub model_temperature: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub conversation_type: Option<String>,
    pub message_type: Option<String>,
    pub api_errors: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalMetrics {
    pub id: String,
    pub conversation_id: String,
    #[serde(flatten)]
    pub data: TechnicalData,
    pub created_at: String,
}

/// Extracted entity. Older producers put the text under `value`, newer ones
/// under `entity`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    pub entity: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticAnalysis {
    /// `{intent: score}` map or `[{intent, confidence}]` list.
    pub intent_classification: Option<Value>,
    pub entity_extraction: Option<Vec<EntityRecord>>,
    pub topic_classification: Option<Vec<String>>,
    /// `{role: text}` map or `[{role, text, confidence}]` list.
    pub semantic_role_labels: Option<Value>,
    pub conversation_flow: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub id: String,
    pub conversation_id: String,
    #[serde(flatten)]
    pub data: SemanticAnalysis,
    pub created_at: String,
}

/// A conversation with its attachments, each relation as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(flatten)]
    pub conversation: VoiceConversation,
    #[serde(default)]
    pub quality_metrics: Vec<QualityMetrics>,
    #[serde(default)]
    pub technical_metrics: Vec<TechnicalMetrics>,
    #[serde(default)]
    pub analysis_results: Vec<AnalysisResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub simulations: Vec<TestSimulation>,
    pub metrics: Vec<TechnicalMetrics>,
}

/// Which conversations the results query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsSelector {
    All,
    Simulation(String),
}

impl ResultsSelector {
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            ResultsSelector::All
        } else {
            ResultsSelector::Simulation(s.to_string())
        }
    }
}
