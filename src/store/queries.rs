use rusqlite::{params, Connection, OptionalExtension};

use super::db::{
    analysis_from_row, config_from_row, conversation_from_row, quality_from_row, select_list,
    simulation_from_row, technical_from_row, SwarmDb, ANALYSIS_COLUMNS, CONFIG_COLUMNS,
    CONVERSATION_COLUMNS, QUALITY_COLUMNS, SIMULATION_COLUMNS, TECHNICAL_COLUMNS,
};
use super::{
    ConversationRecord, ConversationSummary, DashboardMetrics, ResultsSelector, TestConfiguration,
    TestSimulation, VoiceConversation,
};
use crate::auth::Session;
use crate::config::{ALL_RESULTS_LIMIT, DASHBOARD_SIMULATION_LIMIT};
use crate::error::Result;

/// The user's configurations, newest first.
pub fn get_test_configs(db: &SwarmDb, session: &Session) -> Result<Vec<TestConfiguration>> {
    let conn = db.conn();
    let sql = format!(
        "SELECT {} FROM test_configurations c WHERE c.user_id=?1
         ORDER BY c.created_at DESC, c.rowid DESC",
        select_list("c", CONFIG_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![session.user_id], |row| config_from_row(row, 0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_simulation(
    db: &SwarmDb,
    session: &Session,
    id: &str,
) -> Result<Option<TestSimulation>> {
    let conn = db.conn();
    let sql = format!(
        "SELECT {}, {} FROM test_simulations s
         LEFT JOIN test_configurations c ON c.id = s.config_id
         WHERE s.id=?1 AND s.user_id=?2",
        select_list("s", SIMULATION_COLUMNS),
        select_list("c", CONFIG_COLUMNS)
    );
    let sim = conn
        .query_row(&sql, params![id, session.user_id], simulation_with_config)
        .optional()?;
    Ok(sim)
}

fn simulation_with_config(row: &rusqlite::Row<'_>) -> rusqlite::Result<TestSimulation> {
    let mut sim = simulation_from_row(row, 0)?;
    // LEFT JOIN: a missing configuration leaves every c.* column NULL
    let config_id: Option<String> = row.get(SIMULATION_COLUMNS.len())?;
    if config_id.is_some() {
        sim.test_configurations = Some(config_from_row(row, SIMULATION_COLUMNS.len())?);
    }
    Ok(sim)
}

/// Recent simulations with their configuration, plus technical metrics for
/// every conversation the user owns.
pub fn get_dashboard_metrics(db: &SwarmDb, session: &Session) -> Result<DashboardMetrics> {
    let conn = db.conn();

    let sql = format!(
        "SELECT {}, {} FROM test_simulations s
         LEFT JOIN test_configurations c ON c.id = s.config_id
         WHERE s.user_id=?1
         ORDER BY s.created_at DESC, s.rowid DESC
         LIMIT ?2",
        select_list("s", SIMULATION_COLUMNS),
        select_list("c", CONFIG_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let simulations = stmt
        .query_map(
            params![session.user_id, DASHBOARD_SIMULATION_LIMIT as i64],
            simulation_with_config,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let sql = format!(
        "SELECT {} FROM technical_metrics t
         JOIN voice_conversations v ON v.id = t.conversation_id
         WHERE v.user_id=?1
         ORDER BY t.created_at DESC, t.rowid DESC",
        select_list("t", TECHNICAL_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let metrics = stmt
        .query_map(params![session.user_id], |row| technical_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(DashboardMetrics {
        simulations,
        metrics,
    })
}

/// Conversations with their metric attachments.
///
/// `All` returns the user's latest conversations, newest first. A simulation
/// id returns that run's conversations in call order.
pub fn get_test_results(
    db: &SwarmDb,
    session: &Session,
    selector: &ResultsSelector,
) -> Result<Vec<ConversationRecord>> {
    let conn = db.conn();
    let columns = select_list("v", CONVERSATION_COLUMNS);

    let conversations = match selector {
        ResultsSelector::All => {
            let sql = format!(
                "SELECT {columns} FROM voice_conversations v WHERE v.user_id=?1
                 ORDER BY v.created_at DESC, v.rowid DESC LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![session.user_id, ALL_RESULTS_LIMIT as i64],
                |row| conversation_from_row(row, 0),
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        ResultsSelector::Simulation(simulation_id) => {
            let sql = format!(
                "SELECT {columns} FROM voice_conversations v
                 WHERE v.simulation_id=?1 AND v.user_id=?2
                 ORDER BY v.created_at ASC, v.rowid ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![simulation_id, session.user_id], |row| {
                conversation_from_row(row, 0)
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };

    conversations
        .into_iter()
        .map(|c| with_relations(&conn, c))
        .collect()
}

/// Picker rows for the results page, newest first.
pub fn list_conversations(db: &SwarmDb, session: &Session) -> Result<Vec<ConversationSummary>> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, call_sid, status, created_at FROM voice_conversations WHERE user_id=?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![session.user_id], |row| {
        Ok(ConversationSummary {
            id: row.get(0)?,
            call_sid: row.get(1)?,
            status: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_conversation(
    db: &SwarmDb,
    session: &Session,
    id: &str,
) -> Result<Option<ConversationRecord>> {
    let conn = db.conn();
    let sql = format!(
        "SELECT {} FROM voice_conversations v WHERE v.id=?1 AND v.user_id=?2",
        select_list("v", CONVERSATION_COLUMNS)
    );
    let conversation = conn
        .query_row(&sql, params![id, session.user_id], |row| {
            conversation_from_row(row, 0)
        })
        .optional()?;

    conversation.map(|c| with_relations(&conn, c)).transpose()
}

fn with_relations(conn: &Connection, conversation: VoiceConversation) -> Result<ConversationRecord> {
    let id = conversation.id.clone();

    let sql = format!(
        "SELECT {} FROM quality_metrics q WHERE q.conversation_id=?1
         ORDER BY q.created_at DESC, q.rowid DESC",
        select_list("q", QUALITY_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let quality_metrics = stmt
        .query_map(params![id], |row| quality_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let sql = format!(
        "SELECT {} FROM technical_metrics t WHERE t.conversation_id=?1
         ORDER BY t.created_at DESC, t.rowid DESC",
        select_list("t", TECHNICAL_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let technical_metrics = stmt
        .query_map(params![id], |row| technical_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let sql = format!(
        "SELECT {} FROM analysis_results a WHERE a.conversation_id=?1
         ORDER BY a.created_at DESC, a.rowid DESC",
        select_list("a", ANALYSIS_COLUMNS)
    );
    let mut stmt = conn.prepare(&sql)?;
    let analysis_results = stmt
        .query_map(params![id], |row| analysis_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(ConversationRecord {
        conversation,
        quality_metrics,
        technical_metrics,
        analysis_results,
    })
}
