use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::{
    AnalysisResults, ConversationData, QualityMetrics, QualityScores, SemanticAnalysis,
    SimulationStatus, TechnicalData, TechnicalMetrics, TestConfiguration, TestSimulation,
    VoiceConversation,
};
use crate::auth::Session;
use crate::error::{Result, SwarmError};
use crate::form::{NewTestConfiguration, TestConfigDraft};

pub struct SwarmDb {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SwarmDb {
    /// Open (or create) the database file, creating its directory first.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(dir) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let db_path = db_path.to_path_buf();
        let conn = Connection::open(&db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        db.init_schema()?;
        info!("Opened database at {:?}", db.db_path);
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_configurations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                simultaneous_conversations INTEGER NOT NULL,
                duration_minutes INTEGER NOT NULL,
                environment TEXT NOT NULL,
                twilio_number TEXT NOT NULL,
                accent_types TEXT NOT NULL,
                speaking_pace TEXT NOT NULL,
                background_noise TEXT NOT NULL,
                interruption_frequency REAL NOT NULL,
                emotion_types TEXT NOT NULL,
                industry TEXT NOT NULL,
                complexity_level INTEGER NOT NULL,
                max_turns INTEGER NOT NULL,
                response_threshold_ms INTEGER NOT NULL,
                latency_ms INTEGER NOT NULL,
                packet_loss_percentage REAL NOT NULL,
                bandwidth_kbps INTEGER NOT NULL,
                connection_stability TEXT NOT NULL,
                min_response_time_ms INTEGER NOT NULL,
                required_completion_rate REAL NOT NULL,
                max_error_rate REAL NOT NULL,
                context_score_threshold REAL NOT NULL,
                prompt_template TEXT NOT NULL,
                edge_case_frequency REAL NOT NULL,
                error_injection_rate REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS test_simulations (
                id TEXT PRIMARY KEY,
                config_id TEXT NOT NULL REFERENCES test_configurations(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'starting',
                start_time TEXT NOT NULL,
                end_time TEXT,
                total_conversations INTEGER NOT NULL DEFAULT 0,
                successful_conversations INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS voice_conversations (
                id TEXT PRIMARY KEY,
                simulation_id TEXT NOT NULL REFERENCES test_simulations(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                call_sid TEXT NOT NULL,
                phone_number TEXT,
                status TEXT NOT NULL,
                duration REAL NOT NULL DEFAULT 0,
                transcript TEXT,
                message_timestamps TEXT,
                token_counts TEXT,
                response_times TEXT,
                error_details TEXT,
                conversation_metrics TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quality_metrics (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES voice_conversations(id) ON DELETE CASCADE,
                coherence_score REAL,
                task_completion_score REAL,
                context_retention_score REAL,
                natural_language_score REAL,
                appropriateness_score REAL,
                engagement_score REAL,
                error_recovery_score REAL,
                overall_quality_score REAL,
                order_accuracy REAL,
                required_clarifications REAL,
                completion_time REAL,
                menu_knowledge REAL,
                special_requests REAL,
                upsell_attempts REAL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS technical_metrics (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES voice_conversations(id) ON DELETE CASCADE,
                avg_latency_ms REAL,
                min_latency_ms REAL,
                max_latency_ms REAL,
                p95_latency_ms REAL,
                total_tokens REAL,
                tokens_per_message REAL,
                token_efficiency REAL,
                memory_usage_mb REAL,
                model_temperature REAL,
                sentiment_score REAL,
                conversation_type TEXT,
                message_type TEXT,
                api_errors TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analysis_results (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES voice_conversations(id) ON DELETE CASCADE,
                intent_classification TEXT,
                entity_extraction TEXT,
                topic_classification TEXT,
                semantic_role_labels TEXT,
                conversation_flow TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_configs_user ON test_configurations(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_sims_user ON test_simulations(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_sims_config ON test_simulations(config_id);
            CREATE INDEX IF NOT EXISTS idx_convs_sim ON voice_conversations(simulation_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_convs_user ON voice_conversations(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_qm_conv ON quality_metrics(conversation_id);
            CREATE INDEX IF NOT EXISTS idx_tm_conv ON technical_metrics(conversation_id);
            CREATE INDEX IF NOT EXISTS idx_ar_conv ON analysis_results(conversation_id);
        ",
        )?;
        Ok(())
    }

    // ========================================================================
    // Configurations
    // ========================================================================

    pub fn create_test_config(
        &self,
        session: &Session,
        draft: &TestConfigDraft,
    ) -> Result<TestConfiguration> {
        let settings = draft.to_new_configuration();
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let conn = self.conn();
        conn.execute(
            "INSERT INTO test_configurations (id, user_id, name, simultaneous_conversations, duration_minutes,
                environment, twilio_number, accent_types, speaking_pace, background_noise,
                interruption_frequency, emotion_types, industry, complexity_level, max_turns,
                response_threshold_ms, latency_ms, packet_loss_percentage, bandwidth_kbps,
                connection_stability, min_response_time_ms, required_completion_rate, max_error_rate,
                context_score_threshold, prompt_template, edge_case_frequency, error_injection_rate,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?28)",
            params![
                id,
                session.user_id,
                settings.name,
                settings.simultaneous_conversations,
                settings.duration_minutes,
                settings.environment,
                settings.twilio_number,
                to_json(&settings.accent_types)?,
                to_json(&settings.speaking_pace)?,
                to_json(&settings.background_noise)?,
                settings.interruption_frequency,
                to_json(&settings.emotion_types)?,
                settings.industry,
                settings.complexity_level,
                settings.max_turns,
                settings.response_threshold_ms,
                settings.latency_ms,
                settings.packet_loss_percentage,
                settings.bandwidth_kbps,
                settings.connection_stability,
                settings.min_response_time_ms,
                settings.required_completion_rate,
                settings.max_error_rate,
                settings.context_score_threshold,
                settings.prompt_template,
                settings.edge_case_frequency,
                settings.error_injection_rate,
                now,
            ],
        )?;
        debug!("Created test configuration {} for user {}", id, session.user_id);

        Ok(TestConfiguration {
            id,
            user_id: session.user_id.clone(),
            settings,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    // ========================================================================
    // Simulations
    // ========================================================================

    pub fn create_simulation(&self, session: &Session, config_id: &str) -> Result<TestSimulation> {
        let conn = self.conn();
        let owned: Option<String> = conn
            .query_row(
                "SELECT id FROM test_configurations WHERE id=?1 AND user_id=?2",
                params![config_id, session.user_id],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Err(SwarmError::NotFound(
                "Configuration not found or unauthorized".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let status = SimulationStatus::Starting;
        conn.execute(
            "INSERT INTO test_simulations (id, config_id, user_id, status, start_time,
                total_conversations, successful_conversations, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?5, ?5)",
            params![id, config_id, session.user_id, status, now],
        )?;
        debug!("Created simulation {} for configuration {}", id, config_id);

        Ok(TestSimulation {
            id,
            config_id: config_id.to_string(),
            user_id: session.user_id.clone(),
            status,
            start_time: now.clone(),
            end_time: None,
            total_conversations: 0,
            successful_conversations: 0,
            created_at: now.clone(),
            updated_at: now,
            test_configurations: None,
        })
    }

    /// Returns false when no simulation with this id belongs to the user.
    pub fn update_simulation_status(
        &self,
        session: &Session,
        id: &str,
        status: SimulationStatus,
    ) -> Result<bool> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let end_time = status.is_terminal().then(|| now.clone());
        let updated = conn.execute(
            "UPDATE test_simulations SET status=?3, updated_at=?4, end_time=COALESCE(?5, end_time)
             WHERE id=?1 AND user_id=?2",
            params![id, session.user_id, status, now, end_time],
        )?;
        Ok(updated > 0)
    }

    // ========================================================================
    // Conversations and metric attachments
    // ========================================================================

    pub fn create_voice_conversation(
        &self,
        session: &Session,
        simulation_id: &str,
        data: &ConversationData,
    ) -> Result<VoiceConversation> {
        let conn = self.conn();
        let owned: Option<String> = conn
            .query_row(
                "SELECT id FROM test_simulations WHERE id=?1 AND user_id=?2",
                params![simulation_id, session.user_id],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Err(SwarmError::NotFound(
                "Simulation not found or unauthorized".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO voice_conversations (id, simulation_id, user_id, call_sid, phone_number, status,
                duration, transcript, message_timestamps, token_counts, response_times, error_details,
                conversation_metrics, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                id,
                simulation_id,
                session.user_id,
                data.call_sid,
                data.phone_number,
                data.status,
                data.duration,
                to_json(&data.transcript)?,
                to_json(&data.message_timestamps)?,
                to_json(&data.token_counts)?,
                to_json(&data.response_times)?,
                to_json(&data.error_details)?,
                to_json(&data.conversation_metrics)?,
                now,
            ],
        )?;

        Ok(VoiceConversation {
            id,
            simulation_id: simulation_id.to_string(),
            user_id: session.user_id.clone(),
            data: data.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn ensure_conversation_owned(
        conn: &Connection,
        session: &Session,
        conversation_id: &str,
    ) -> Result<()> {
        let owned: Option<String> = conn
            .query_row(
                "SELECT id FROM voice_conversations WHERE id=?1 AND user_id=?2",
                params![conversation_id, session.user_id],
                |row| row.get(0),
            )
            .optional()?;
        match owned {
            Some(_) => Ok(()),
            None => Err(SwarmError::NotFound(
                "Conversation not found or unauthorized".to_string(),
            )),
        }
    }

    pub fn create_quality_metrics(
        &self,
        session: &Session,
        conversation_id: &str,
        scores: &QualityScores,
    ) -> Result<QualityMetrics> {
        let conn = self.conn();
        Self::ensure_conversation_owned(&conn, session, conversation_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO quality_metrics (id, conversation_id, coherence_score, task_completion_score,
                context_retention_score, natural_language_score, appropriateness_score, engagement_score,
                error_recovery_score, overall_quality_score, order_accuracy, required_clarifications,
                completion_time, menu_knowledge, special_requests, upsell_attempts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                id,
                conversation_id,
                scores.coherence_score,
                scores.task_completion_score,
                scores.context_retention_score,
                scores.natural_language_score,
                scores.appropriateness_score,
                scores.engagement_score,
                scores.error_recovery_score,
                scores.overall_quality_score,
                scores.order_accuracy,
                scores.required_clarifications,
                scores.completion_time,
                scores.menu_knowledge,
                scores.special_requests,
                scores.upsell_attempts,
                now,
            ],
        )?;

        Ok(QualityMetrics {
            id,
            conversation_id: conversation_id.to_string(),
            scores: scores.clone(),
            created_at: now,
        })
    }

    pub fn create_technical_metrics(
        &self,
        session: &Session,
        conversation_id: &str,
        data: &TechnicalData,
    ) -> Result<TechnicalMetrics> {
        let conn = self.conn();
        Self::ensure_conversation_owned(&conn, session, conversation_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO technical_metrics (id, conversation_id, avg_latency_ms, min_latency_ms,
                max_latency_ms, p95_latency_ms, total_tokens, tokens_per_message, token_efficiency,
                memory_usage_mb, model_temperature, sentiment_score, conversation_type, message_type,
                api_errors, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                id,
                conversation_id,
                data.avg_latency_ms,
                data.min_latency_ms,
                data.max_latency_ms,
                data.p95_latency_ms,
                data.total_tokens,
                data.tokens_per_message,
                data.token_efficiency,
                data.memory_usage_mb,
                data.model_temperature,
                data.sentiment_score,
                data.conversation_type,
                data.message_type,
                opt_to_json(&data.api_errors)?,
                now,
            ],
        )?;

        Ok(TechnicalMetrics {
            id,
            conversation_id: conversation_id.to_string(),
            data: data.clone(),
            created_at: now,
        })
    }

    pub fn create_semantic_analysis(
        &self,
        session: &Session,
        conversation_id: &str,
        analysis: &SemanticAnalysis,
    ) -> Result<AnalysisResults> {
        let conn = self.conn();
        Self::ensure_conversation_owned(&conn, session, conversation_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO analysis_results (id, conversation_id, intent_classification, entity_extraction,
                topic_classification, semantic_role_labels, conversation_flow, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                conversation_id,
                opt_to_json(&analysis.intent_classification)?,
                opt_to_json(&analysis.entity_extraction)?,
                opt_to_json(&analysis.topic_classification)?,
                opt_to_json(&analysis.semantic_role_labels)?,
                opt_to_json(&analysis.conversation_flow)?,
                now,
            ],
        )?;

        Ok(AnalysisResults {
            id,
            conversation_id: conversation_id.to_string(),
            data: analysis.clone(),
            created_at: now,
        })
    }
}

// ============================================================================
// JSON column helpers
// ============================================================================

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn opt_to_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value.as_ref().map(to_json).transpose()
}

/// Decode a nullable JSON text column.
pub(crate) fn json_column<T: DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

fn json_column_or_default<T: DeserializeOwned + Default>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    Ok(json_column(row, idx)?.unwrap_or_default())
}

// ============================================================================
// Row mapping, shared with queries.rs
// ============================================================================

pub(crate) const CONFIG_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "name",
    "simultaneous_conversations",
    "duration_minutes",
    "environment",
    "twilio_number",
    "accent_types",
    "speaking_pace",
    "background_noise",
    "interruption_frequency",
    "emotion_types",
    "industry",
    "complexity_level",
    "max_turns",
    "response_threshold_ms",
    "latency_ms",
    "packet_loss_percentage",
    "bandwidth_kbps",
    "connection_stability",
    "min_response_time_ms",
    "required_completion_rate",
    "max_error_rate",
    "context_score_threshold",
    "prompt_template",
    "edge_case_frequency",
    "error_injection_rate",
    "created_at",
    "updated_at",
];

pub(crate) const SIMULATION_COLUMNS: &[&str] = &[
    "id",
    "config_id",
    "user_id",
    "status",
    "start_time",
    "end_time",
    "total_conversations",
    "successful_conversations",
    "created_at",
    "updated_at",
];

pub(crate) const CONVERSATION_COLUMNS: &[&str] = &[
    "id",
    "simulation_id",
    "user_id",
    "call_sid",
    "phone_number",
    "status",
    "duration",
    "transcript",
    "message_timestamps",
    "token_counts",
    "response_times",
    "error_details",
    "conversation_metrics",
    "created_at",
    "updated_at",
];

pub(crate) const QUALITY_COLUMNS: &[&str] = &[
    "id",
    "conversation_id",
    "coherence_score",
    "task_completion_score",
    "context_retention_score",
    "natural_language_score",
    "appropriateness_score",
    "engagement_score",
    "error_recovery_score",
    "overall_quality_score",
    "order_accuracy",
    "required_clarifications",
    "completion_time",
    "menu_knowledge",
    "special_requests",
    "upsell_attempts",
    "created_at",
];

pub(crate) const TECHNICAL_COLUMNS: &[&str] = &[
    "id",
    "conversation_id",
    "avg_latency_ms",
    "min_latency_ms",
    "max_latency_ms",
    "p95_latency_ms",
    "total_tokens",
    "tokens_per_message",
    "token_efficiency",
    "memory_usage_mb",
    "model_temperature",
    "sentiment_score",
    "conversation_type",
    "message_type",
    "api_errors",
    "created_at",
];

pub(crate) const ANALYSIS_COLUMNS: &[&str] = &[
    "id",
    "conversation_id",
    "intent_classification",
    "entity_extraction",
    "topic_classification",
    "semantic_role_labels",
    "conversation_flow",
    "created_at",
];

/// `a.id, a.user_id, ...` for use in SELECT lists.
pub(crate) fn select_list(alias: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn config_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<TestConfiguration> {
    Ok(TestConfiguration {
        id: row.get(base)?,
        user_id: row.get(base + 1)?,
        settings: NewTestConfiguration {
            name: row.get(base + 2)?,
            simultaneous_conversations: row.get(base + 3)?,
            duration_minutes: row.get(base + 4)?,
            environment: row.get(base + 5)?,
            twilio_number: row.get(base + 6)?,
            accent_types: json_column_or_default(row, base + 7)?,
            speaking_pace: json_column_or_default(row, base + 8)?,
            background_noise: json_column_or_default(row, base + 9)?,
            interruption_frequency: row.get(base + 10)?,
            emotion_types: json_column_or_default(row, base + 11)?,
            industry: row.get(base + 12)?,
            complexity_level: row.get(base + 13)?,
            max_turns: row.get(base + 14)?,
            response_threshold_ms: row.get(base + 15)?,
            latency_ms: row.get(base + 16)?,
            packet_loss_percentage: row.get(base + 17)?,
            bandwidth_kbps: row.get(base + 18)?,
            connection_stability: row.get(base + 19)?,
            min_response_time_ms: row.get(base + 20)?,
            required_completion_rate: row.get(base + 21)?,
            max_error_rate: row.get(base + 22)?,
            context_score_threshold: row.get(base + 23)?,
            prompt_template: row.get(base + 24)?,
            edge_case_frequency: row.get(base + 25)?,
            error_injection_rate: row.get(base + 26)?,
        },
        created_at: row.get(base + 27)?,
        updated_at: row.get(base + 28)?,
    })
}

pub(crate) fn simulation_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<TestSimulation> {
    Ok(TestSimulation {
        id: row.get(base)?,
        config_id: row.get(base + 1)?,
        user_id: row.get(base + 2)?,
        status: row.get(base + 3)?,
        start_time: row.get(base + 4)?,
        end_time: row.get(base + 5)?,
        total_conversations: row.get(base + 6)?,
        successful_conversations: row.get(base + 7)?,
        created_at: row.get(base + 8)?,
        updated_at: row.get(base + 9)?,
        test_configurations: None,
    })
}

pub(crate) fn conversation_from_row(
    row: &Row<'_>,
    base: usize,
) -> rusqlite::Result<VoiceConversation> {
    Ok(VoiceConversation {
        id: row.get(base)?,
        simulation_id: row.get(base + 1)?,
        user_id: row.get(base + 2)?,
        data: ConversationData {
            call_sid: row.get(base + 3)?,
            phone_number: row.get(base + 4)?,
            status: row.get(base + 5)?,
            duration: row.get(base + 6)?,
            transcript: json_column_or_default(row, base + 7)?,
            message_timestamps: json_column_or_default(row, base + 8)?,
            token_counts: json_column_or_default(row, base + 9)?,
            response_times: json_column_or_default(row, base + 10)?,
            error_details: json_column_or_default(row, base + 11)?,
            conversation_metrics: json_column_or_default(row, base + 12)?,
        },
        created_at: row.get(base + 13)?,
        updated_at: row.get(base + 14)?,
    })
}

pub(crate) fn quality_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<QualityMetrics> {
    Ok(QualityMetrics {
        id: row.get(base)?,
        conversation_id: row.get(base + 1)?,
        scores: QualityScores {
            coherence_score: row.get(base + 2)?,
            task_completion_score: row.get(base + 3)?,
            context_retention_score: row.get(base + 4)?,
            natural_language_score: row.get(base + 5)?,
            appropriateness_score: row.get(base + 6)?,
            engagement_score: row.get(base + 7)?,
            error_recovery_score: row.get(base + 8)?,
            overall_quality_score: row.get(base + 9)?,
            order_accuracy: row.get(base + 10)?,
            required_clarifications: row.get(base + 11)?,
            completion_time: row.get(base + 12)?,
            menu_knowledge: row.get(base + 13)?,
            special_requests: row.get(base + 14)?,
            upsell_attempts: row.get(base + 15)?,
        },
        created_at: row.get(base + 16)?,
    })
}

pub(crate) fn technical_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<TechnicalMetrics> {
    Ok(TechnicalMetrics {
        id: row.get(base)?,
        conversation_id: row.get(base + 1)?,
        data: TechnicalData {
            avg_latency_ms: row.get(base + 2)?,
            min_latency_ms: row.get(base + 3)?,
            max_latency_ms: row.get(base + 4)?,
            p95_latency_ms: row.get(base + 5)?,
            total_tokens: row.get(base + 6)?,
            tokens_per_message: row.get(base + 7)?,
            token_efficiency: row.get(base + 8)?,
            memory_usage_mb: row.get(base + 9)?,
            model_temperature: row.get(base + 10)?,
            sentiment_score: row.get(base + 11)?,
            conversation_type: row.get(base + 12)?,
            message_type: row.get(base + 13)?,
            api_errors: json_column(row, base + 14)?,
        },
        created_at: row.get(base + 15)?,
    })
}

pub(crate) fn analysis_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<AnalysisResults> {
    Ok(AnalysisResults {
        id: row.get(base)?,
        conversation_id: row.get(base + 1)?,
        data: SemanticAnalysis {
            intent_classification: json_column(row, base + 2)?,
            entity_extraction: json_column(row, base + 3)?,
            topic_classification: json_column(row, base + 4)?,
            semantic_role_labels: json_column(row, base + 5)?,
            conversation_flow: json_column(row, base + 6)?,
        },
        created_at: row.get(base + 7)?,
    })
}
