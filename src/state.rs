use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::store::db::SwarmDb;
use crate::trigger::HttpTrigger;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: ConsoleConfig,
    pub db: SwarmDb,
    pub trigger: HttpTrigger,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Opens (or creates) the database under the data directory.
    pub fn new(config: ConsoleConfig) -> Result<Self> {
        let db = SwarmDb::new(&config.db_path())?;
        let trigger = HttpTrigger::new(config.trigger.clone())?;
        Ok(Self {
            config,
            db,
            trigger,
            started_at: Utc::now(),
        })
    }
}
