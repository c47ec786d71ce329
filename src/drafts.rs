//! Per-user in-progress form drafts, persisted as JSON files so a half-filled
//! form survives a restart.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::ConsoleConfig;
use crate::form::TestConfigDraft;

pub fn draft_path(config: &ConsoleConfig, user_id: &str) -> PathBuf {
    config.drafts_dir().join(format!("{user_id}.json"))
}

/// A missing or unreadable draft loads as the seed form.
pub fn load_draft(path: &Path) -> TestConfigDraft {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable draft {:?}: {}", path, e);
            TestConfigDraft::default()
        }),
        Err(_) => TestConfigDraft::default(),
    }
}

/// Returns false when the draft could not be written.
pub fn save_draft(path: &Path, draft: &TestConfigDraft) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("Failed to create drafts dir {:?}: {}", parent, e);
            return false;
        }
    }
    match serde_json::to_string_pretty(draft) {
        Ok(json) => match std::fs::write(path, json) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save draft to {:?}: {}", path, e);
                false
            }
        },
        Err(e) => {
            warn!("Failed to serialize draft: {}", e);
            false
        }
    }
}

pub fn discard_draft(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove draft {:?}: {}", path, e);
        }
    }
}
