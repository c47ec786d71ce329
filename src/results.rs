//! Flat view model for the results page.
//!
//! Every field has a default: a conversation whose metrics have not been
//! written yet renders as zeros and empty lists, never as an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{ConversationRecord, EntityRecord};

/// Stored scores are fractions; show them as percentages.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptMessage {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentScore {
    pub intent: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub entity: String,
    pub kind: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleLabel {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub call_sid: String,
    pub status: String,
    pub created_at: String,
    pub transcript: Vec<TranscriptMessage>,

    // Quality
    pub overall_quality: f64,
    pub coherence: f64,
    pub task_completion: f64,
    pub context_retention: f64,
    pub natural_language: f64,
    pub appropriateness: f64,
    pub engagement: f64,
    pub error_recovery: f64,
    pub order_accuracy: f64,
    pub menu_knowledge: f64,
    pub required_clarifications: f64,
    pub completion_time: f64,
    pub special_requests: f64,
    pub upsell_attempts: f64,

    // Technical
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub total_tokens: f64,
    pub tokens_per_message: f64,
    pub token_efficiency: f64,
    pub memory_usage_mb: f64,
    pub model_temperature: f64,
    pub sentiment: f64,
    pub conversation_type: String,
    pub message_type: String,
    pub api_errors: Vec<Value>,

    // Analysis
    pub intents: Vec<IntentScore>,
    pub entities: Vec<EntityView>,
    pub topics: Vec<String>,
    pub semantic_roles: Vec<RoleLabel>,
    pub conversation_flow: Vec<String>,
}

impl ConversationView {
    pub fn from_record(record: &ConversationRecord) -> Self {
        let conversation = &record.conversation;
        let mut view = ConversationView {
            id: conversation.id.clone(),
            call_sid: conversation.data.call_sid.clone(),
            status: conversation.data.status.clone(),
            created_at: conversation.created_at.clone(),
            transcript: transcript_messages(&conversation.data.transcript),
            ..Default::default()
        };

        if let Some(q) = record.quality_metrics.first().map(|m| &m.scores) {
            let or0 = |v: Option<f64>| v.unwrap_or(0.0);
            view.overall_quality = or0(q.overall_quality_score);
            view.coherence = or0(q.coherence_score);
            view.task_completion = or0(q.task_completion_score);
            view.context_retention = or0(q.context_retention_score);
            view.natural_language = or0(q.natural_language_score);
            view.appropriateness = or0(q.appropriateness_score);
            view.engagement = or0(q.engagement_score);
            view.error_recovery = or0(q.error_recovery_score);
            view.order_accuracy = or0(q.order_accuracy);
            view.menu_knowledge = or0(q.menu_knowledge);
            view.required_clarifications = or0(q.required_clarifications);
            view.completion_time = or0(q.completion_time);
            view.special_requests = or0(q.special_requests);
            view.upsell_attempts = or0(q.upsell_attempts);
        }

        if let Some(t) = record.technical_metrics.first().map(|m| &m.data) {
            let or0 = |v: Option<f64>| v.unwrap_or(0.0);
            view.avg_latency_ms = or0(t.avg_latency_ms);
            view.min_latency_ms = or0(t.min_latency_ms);
            view.max_latency_ms = or0(t.max_latency_ms);
            view.p95_latency_ms = or0(t.p95_latency_ms);
            view.total_tokens = or0(t.total_tokens);
            view.tokens_per_message = or0(t.tokens_per_message);
            view.token_efficiency = or0(t.token_efficiency);
            view.memory_usage_mb = or0(t.memory_usage_mb);
            view.model_temperature = or0(t.model_temperature);
            view.sentiment = or0(t.sentiment_score);
            view.conversation_type = t.conversation_type.clone().unwrap_or_default();
            view.message_type = t.message_type.clone().unwrap_or_default();
            view.api_errors = match &t.api_errors {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
        }

        if let Some(a) = record.analysis_results.first().map(|m| &m.data) {
            view.intents = a
                .intent_classification
                .as_ref()
                .map(intent_scores)
                .unwrap_or_default();
            view.entities = a
                .entity_extraction
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(entity_view)
                .collect();
            view.topics = a.topic_classification.clone().unwrap_or_default();
            view.semantic_roles = a
                .semantic_role_labels
                .as_ref()
                .map(role_labels)
                .unwrap_or_default();
            view.conversation_flow = a.conversation_flow.clone().unwrap_or_default();
        }

        view
    }
}

/// Pick the view for the selected conversation, or the first one.
pub fn select_view(records: &[ConversationRecord], selected: Option<&str>) -> Option<ConversationView> {
    let record = match selected {
        Some(id) => records
            .iter()
            .find(|r| r.conversation.id == id)
            .or_else(|| records.first()),
        None => records.first(),
    };
    record.map(ConversationView::from_record)
}

fn entity_view(record: &EntityRecord) -> EntityView {
    EntityView {
        entity: record
            .entity
            .clone()
            .or_else(|| record.value.clone())
            .unwrap_or_default(),
        kind: record.kind.clone().unwrap_or_default(),
        confidence: record.confidence.unwrap_or(0.0),
    }
}

fn transcript_messages(transcript: &Value) -> Vec<TranscriptMessage> {
    let list = match transcript {
        Value::Array(_) => transcript,
        Value::Object(map) => match map.get("messages") {
            Some(messages) => messages,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    match list {
        Value::Array(items) => items
            .iter()
            .filter_map(|m| serde_json::from_value(m.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn intent_scores(value: &Value) -> Vec<IntentScore> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(intent, score)| IntentScore {
                intent: intent.clone(),
                confidence: score.as_f64().unwrap_or(0.0),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let intent = item.get("intent")?.as_str()?.to_string();
                let confidence = item
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                Some(IntentScore { intent, confidence })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn role_labels(value: &Value) -> Vec<RoleLabel> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(role, text)| RoleLabel {
                role: role.clone(),
                text: text.as_str().map(str::to_string).unwrap_or_else(|| text.to_string()),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                Some(RoleLabel {
                    role: item.get("role")?.as_str()?.to_string(),
                    text: item
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Tabs and metric cards
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsTab {
    #[default]
    Overview,
    Quality,
    Technical,
    Conversation,
    Errors,
    Business,
    Script,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSection {
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub cards: Vec<MetricCard>,
    /// Free-form lines (topics, flow steps, transcript) for list-style panels.
    pub items: Vec<String>,
}

fn card(title: &'static str, value: String, description: &'static str) -> MetricCard {
    MetricCard {
        title,
        value,
        description,
    }
}

fn section(title: &'static str, subtitle: Option<&'static str>, cards: Vec<MetricCard>) -> MetricSection {
    MetricSection {
        title,
        subtitle,
        cards,
        items: Vec::new(),
    }
}

fn list_section(title: &'static str, items: Vec<String>) -> MetricSection {
    MetricSection {
        title,
        subtitle: None,
        cards: Vec::new(),
        items,
    }
}

impl ConversationView {
    pub fn metric_sections(&self, tab: ResultsTab) -> Vec<MetricSection> {
        match tab {
            ResultsTab::Overview => vec![
                section(
                    "Key Performance Indicators",
                    Some("Essential metrics showing overall system performance"),
                    vec![
                        card("Overall Quality", format_percent(self.overall_quality), "Overall quality score of the conversation"),
                        card("Order Accuracy", format_percent(self.order_accuracy), "Percentage of orders processed correctly"),
                        card("Average Latency", format!("{} ms", self.avg_latency_ms), "Average response time"),
                    ],
                ),
                section(
                    "Quick Insights",
                    Some("Key metrics at a glance"),
                    vec![
                        card("Sentiment Score", format_percent(self.sentiment), "Overall conversation sentiment"),
                        card("Menu Knowledge", format_percent(self.menu_knowledge), "AI's understanding of menu items"),
                        card("Error Recovery", format_percent(self.error_recovery), "Effectiveness in recovering from errors"),
                    ],
                ),
            ],
            ResultsTab::Quality => vec![
                section(
                    "Conversation Quality",
                    None,
                    vec![
                        card("Coherence", format_percent(self.coherence), "Measure of conversation flow and consistency"),
                        card("Task Completion", format_percent(self.task_completion), "Success rate in completing assigned tasks"),
                        card("Context Retention", format_percent(self.context_retention), "Ability to maintain context throughout conversation"),
                    ],
                ),
                section(
                    "Interaction Quality",
                    None,
                    vec![
                        card("Natural Language", format_percent(self.natural_language), "Natural language processing effectiveness"),
                        card("Appropriateness", format_percent(self.appropriateness), "Appropriateness of responses"),
                        card("Engagement", format_percent(self.engagement), "Level of user engagement maintained"),
                    ],
                ),
            ],
            ResultsTab::Technical => vec![
                section(
                    "Performance Metrics",
                    None,
                    vec![
                        card("Average Latency", format!("{} ms", self.avg_latency_ms), "Average response time"),
                        card("95th Percentile Latency", format!("{} ms", self.p95_latency_ms), "95th percentile of response times"),
                        card("Memory Usage", format!("{} MB", self.memory_usage_mb), "Memory consumption"),
                    ],
                ),
                section(
                    "Token Usage",
                    None,
                    vec![
                        card("Total Tokens", format_decimal(self.total_tokens), "Total tokens used in conversation"),
                        card("Tokens per Message", format_decimal(self.tokens_per_message), "Average tokens used per message"),
                        card("Token Efficiency", format_percent(self.token_efficiency), "Efficiency of token usage"),
                    ],
                ),
            ],
            ResultsTab::Conversation => vec![
                list_section("Topic Classification", self.topics.clone()),
                list_section("Conversation Flow", self.conversation_flow.clone()),
                list_section(
                    "Intent Classification",
                    self.intents
                        .iter()
                        .map(|i| format!("{}: {}", i.intent, format_percent(i.confidence)))
                        .collect(),
                ),
                list_section(
                    "Entities",
                    self.entities
                        .iter()
                        .map(|e| {
                            if e.kind.is_empty() {
                                e.entity.clone()
                            } else {
                                format!("{} ({})", e.entity, e.kind)
                            }
                        })
                        .collect(),
                ),
                list_section(
                    "Semantic Roles",
                    self.semantic_roles
                        .iter()
                        .map(|r| format!("{}: {}", r.role, r.text))
                        .collect(),
                ),
            ],
            ResultsTab::Errors => vec![
                section(
                    "Error Metrics",
                    None,
                    vec![
                        card("Error Recovery", format_percent(self.error_recovery), "Effectiveness in recovering from errors"),
                        card("Required Clarifications", format_decimal(self.required_clarifications), "Number of clarifications needed"),
                    ],
                ),
                list_section(
                    "API Errors",
                    self.api_errors.iter().map(Value::to_string).collect(),
                ),
            ],
            ResultsTab::Business => vec![section(
                "Business Impact Metrics",
                Some("Metrics showing direct business value"),
                vec![
                    card("Upsell Success", format_decimal(self.upsell_attempts), "Number of successful upsell attempts"),
                    card("Special Requests", format_decimal(self.special_requests), "Successfully handled special requests"),
                    card("Completion Time", format!("{}s", self.completion_time), "Average order completion time"),
                ],
            )],
            ResultsTab::Script => vec![MetricSection {
                title: "Conversation Script",
                subtitle: Some("Raw transcript data"),
                cards: Vec::new(),
                items: self
                    .transcript
                    .iter()
                    .map(|m| format!("{}: {}", m.role, m.content))
                    .collect(),
            }],
        }
    }
}
