//! Test configuration draft.
//!
//! The draft mirrors the nested shape the create-test page edits. Every
//! section deserializes with its seed values for missing fields, so a client
//! may send only what the user touched.

pub mod reducer;
pub mod validation;

use serde::{Deserialize, Deserializer, Serialize};

pub use reducer::{FormAction, FormError};
pub use validation::{is_valid_phone_number, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staging" => Some(Environment::Staging),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    #[default]
    Stable,
    Variable,
    Poor,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Stable => "stable",
            Stability::Variable => "variable",
            Stability::Poor => "poor",
        }
    }
}

// ============================================================================
// Draft sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfigDraft {
    pub basics: Basics,
    pub customer: CustomerSimulation,
    pub conversation: ConversationParams,
    pub network: NetworkConditions,
    pub scenario: Scenario,
    pub quality: QualityThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Basics {
    pub name: String,
    pub simultaneous: i64,
    /// Minutes.
    pub duration: i64,
    #[serde(deserialize_with = "deserialize_environment")]
    pub environment: Option<Environment>,
    /// Stored under its column name; older clients send `twilioNumber`.
    #[serde(rename = "twilio_number", alias = "twilioNumber")]
    pub twilio_number: String,
}

impl Default for Basics {
    fn default() -> Self {
        Self {
            name: String::new(),
            simultaneous: 100,
            duration: 60,
            environment: Some(Environment::Staging),
            twilio_number: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerSimulation {
    pub accents: Vec<String>,
    pub pace: Vec<String>,
    pub noise: Vec<String>,
    pub interruption: f64,
    pub emotions: Vec<String>,
}

impl Default for CustomerSimulation {
    fn default() -> Self {
        Self {
            accents: vec!["American".to_string()],
            pace: vec!["normal".to_string()],
            noise: vec!["quiet".to_string()],
            interruption: 0.0,
            emotions: vec!["neutral".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationParams {
    pub industry: String,
    /// 1 (scripted) to 5 (open-ended).
    pub complexity: i64,
    pub max_turns: i64,
    /// Milliseconds.
    pub response_threshold: i64,
    pub success_criteria: String,
}

impl Default for ConversationParams {
    fn default() -> Self {
        Self {
            industry: String::new(),
            complexity: 3,
            max_turns: 10,
            response_threshold: 2000,
            success_criteria: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConditions {
    pub latency: i64,
    pub packet_loss: f64,
    pub bandwidth: i64,
    pub stability: Stability,
}

impl Default for NetworkConditions {
    fn default() -> Self {
        Self {
            latency: 0,
            packet_loss: 0.0,
            bandwidth: 1000,
            stability: Stability::Stable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    pub template: String,
    pub edge_case_freq: f64,
    pub error_rate: f64,
    pub vocabulary: Vec<String>,
    pub topics: Vec<String>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            template: String::new(),
            edge_case_freq: 10.0,
            error_rate: 5.0,
            vocabulary: Vec::new(),
            topics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityThresholds {
    pub min_response_time: i64,
    pub completion_rate: f64,
    pub max_error_rate: f64,
    pub context_score: f64,
    pub clarity_threshold: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_response_time: 500,
            completion_rate: 95.0,
            max_error_rate: 5.0,
            context_score: 80.0,
            clarity_threshold: 90.0,
        }
    }
}

/// An unselected `<select>` arrives as `""` or `null`.
fn deserialize_environment<'de, D>(deserializer: D) -> Result<Option<Environment>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => Environment::parse(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown environment: {s}"))),
    }
}

// ============================================================================
// Option catalogues for the multi-selects
// ============================================================================

pub const ACCENT_OPTIONS: &[&str] = &[
    "American",
    "British",
    "Australian",
    "Indian",
    "Southern US",
    "Spanish",
    "Chinese",
];
pub const PACE_OPTIONS: &[&str] = &["slow", "normal", "fast"];
pub const NOISE_OPTIONS: &[&str] = &["quiet", "moderate", "noisy", "traffic", "restaurant"];
pub const EMOTION_OPTIONS: &[&str] = &["neutral", "happy", "frustrated", "confused", "impatient"];

#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub accents: &'static [&'static str],
    pub pace: &'static [&'static str],
    pub noise: &'static [&'static str],
    pub emotions: &'static [&'static str],
    pub environments: &'static [&'static str],
    pub stability: &'static [&'static str],
}

pub fn form_options() -> FormOptions {
    FormOptions {
        accents: ACCENT_OPTIONS,
        pace: PACE_OPTIONS,
        noise: NOISE_OPTIONS,
        emotions: EMOTION_OPTIONS,
        environments: &["staging", "production"],
        stability: &["stable", "variable", "poor"],
    }
}

// ============================================================================
// Flattening into stored columns
// ============================================================================

/// A draft flattened into `test_configurations` column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestConfiguration {
    pub name: String,
    pub simultaneous_conversations: i64,
    pub duration_minutes: i64,
    pub environment: String,
    pub twilio_number: String,
    pub accent_types: Vec<String>,
    pub speaking_pace: Vec<String>,
    pub background_noise: Vec<String>,
    pub interruption_frequency: f64,
    pub emotion_types: Vec<String>,
    pub industry: String,
    pub complexity_level: i64,
    pub max_turns: i64,
    pub response_threshold_ms: i64,
    pub latency_ms: i64,
    pub packet_loss_percentage: f64,
    pub bandwidth_kbps: i64,
    pub connection_stability: String,
    pub min_response_time_ms: i64,
    pub required_completion_rate: f64,
    pub max_error_rate: f64,
    pub context_score_threshold: f64,
    pub prompt_template: String,
    pub edge_case_frequency: f64,
    pub error_injection_rate: f64,
}

impl TestConfigDraft {
    pub fn to_new_configuration(&self) -> NewTestConfiguration {
        NewTestConfiguration {
            name: self.basics.name.clone(),
            simultaneous_conversations: self.basics.simultaneous,
            duration_minutes: self.basics.duration,
            environment: self
                .basics
                .environment
                .unwrap_or(Environment::Staging)
                .as_str()
                .to_string(),
            twilio_number: self.basics.twilio_number.clone(),
            accent_types: self.customer.accents.clone(),
            speaking_pace: self.customer.pace.clone(),
            background_noise: self.customer.noise.clone(),
            interruption_frequency: self.customer.interruption,
            emotion_types: self.customer.emotions.clone(),
            industry: self.conversation.industry.clone(),
            complexity_level: self.conversation.complexity,
            max_turns: self.conversation.max_turns,
            response_threshold_ms: self.conversation.response_threshold,
            latency_ms: self.network.latency,
            packet_loss_percentage: self.network.packet_loss,
            bandwidth_kbps: self.network.bandwidth,
            connection_stability: self.network.stability.as_str().to_string(),
            min_response_time_ms: self.quality.min_response_time,
            required_completion_rate: self.quality.completion_rate,
            max_error_rate: self.quality.max_error_rate,
            context_score_threshold: self.quality.context_score,
            prompt_template: self.scenario.template.clone(),
            edge_case_frequency: self.scenario.edge_case_freq,
            error_injection_rate: self.scenario.error_rate,
        }
    }
}
