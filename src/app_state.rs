// Application state management

use std::path::PathBuf;
use std::sync::Arc;

use crate::ledger::Ledger;
use crate::store::Relations;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub ledger: Ledger,
    data_path: PathBuf,
}

impl AppState {
    /// Build state for the server: restore a persisted snapshot if one
    /// exists, otherwise start with an empty book.
    pub fn new() -> Self {
        let data_path = PathBuf::from(
            std::env::var("BOOK_DATA_FILE").unwrap_or_else(|_| "data/state.json".to_string()),
        );

        let ledger = match Self::load_from_disk(&data_path) {
            Ok(relations) => {
                tracing::info!(path = %data_path.display(), "restored persisted state");
                Ledger::from_snapshot(relations)
            }
            Err(reason) => {
                tracing::info!(%reason, "no persisted state, starting fresh");
                Ledger::new()
            }
        };

        Self { ledger, data_path }
    }

    /// State around an already-built ledger; tests use this to avoid disk.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger,
            data_path: PathBuf::from("data/state.json"),
        }
    }

    pub fn save_to_disk(&self) -> Result<(), String> {
        let snapshot = self
            .ledger
            .snapshot()
            .map_err(|e| format!("Failed to snapshot ledger: {}", e))?;

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;

        if let Some(parent) = self.data_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data directory: {}", e))?;
        }
        std::fs::write(&self.data_path, json)
            .map_err(|e| format!("Failed to write state file: {}", e))?;

        tracing::info!(path = %self.data_path.display(), "state saved to disk");
        Ok(())
    }

    fn load_from_disk(path: &PathBuf) -> Result<Relations, String> {
        let json = std::fs::read_to_string(path).map_err(|_| "no state file found".to_string())?;
        serde_json::from_str(&json).map_err(|e| format!("failed to deserialize state: {}", e))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
