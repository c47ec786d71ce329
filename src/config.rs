use clap::Parser;
use std::path::PathBuf;

/// Swarm console backend: test configuration, submission and results API.
#[derive(Parser, Debug, Clone)]
#[command(name = "swarm-console")]
pub struct CliArgs {
    /// HTTP port for the console API
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the SQLite database and saved drafts
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Endpoint of the external execution service
    #[arg(long = "trigger-url", default_value = DEFAULT_TRIGGER_URL)]
    pub trigger_url: String,

    /// Destination number sent to the execution service
    #[arg(long = "trigger-phone", default_value = DEFAULT_TRIGGER_PHONE)]
    pub trigger_phone: String,

    /// Number of calls requested from the execution service
    #[arg(long = "trigger-calls", default_value_t = DEFAULT_TRIGGER_CALLS)]
    pub trigger_calls: u32,

    /// Also write logs to this file
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub trigger: TriggerConfig,
    pub log_file: Option<PathBuf>,
}

/// Where the execution service is reached and what it is asked to do.
///
/// The destination number and call count are fixed per deployment and are
/// not taken from the submitted configuration.
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub url: String,
    pub phone_number: String,
    pub num_calls: u32,
}

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_TRIGGER_URL: &str = "http://127.0.0.1:8000/make-calls";
pub const DEFAULT_TRIGGER_PHONE: &str = "+15555550100";
pub const DEFAULT_TRIGGER_CALLS: u32 = 1;
pub const TRIGGER_TIMEOUT_SECS: u64 = 30;

pub const DB_FILE_NAME: &str = "swarm-console.db";
pub const DRAFTS_DIR_NAME: &str = "drafts";

// Results/dashboard query limits
pub const DASHBOARD_SIMULATION_LIMIT: usize = 10;
pub const ALL_RESULTS_LIMIT: usize = 50;

// Cosmetic pause before the client navigates to results
pub const RESULTS_REDIRECT_DELAY_MS: u64 = 2000;

impl ConsoleConfig {
    pub fn from_args(args: CliArgs) -> Self {
        let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

        ConsoleConfig {
            port: args.port,
            data_dir,
            trigger: TriggerConfig {
                url: args.trigger_url,
                phone_number: args.trigger_phone,
                num_calls: args.trigger_calls,
            },
            log_file: args.log_file,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.data_dir.join(DRAFTS_DIR_NAME)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("swarm-console")
}
