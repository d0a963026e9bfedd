use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::agent::StopVoiceChatRequest;

/// What we need to stop an agent we may have lost track of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub app_id: String,
    pub business_id: Option<String>,
    pub room_id: String,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn stop_request(&self) -> StopVoiceChatRequest {
        StopVoiceChatRequest {
            app_id: self.app_id.clone(),
            business_id: self.business_id.clone(),
            room_id: self.room_id.clone(),
            task_id: self.task_id.clone(),
        }
    }
}

/// Persisted "agent enabled" marker
///
/// Written when an agent starts and removed once it is stopped, so a client
/// that exited without stopping can still stop the remote agent on its next
/// run.
#[derive(Debug, Clone)]
pub struct SessionMarker {
    path: PathBuf,
}

impl SessionMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the marker; a missing or unreadable marker counts as absent
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Discarding unreadable session marker {}: {}",
                    self.path.display(),
                    e
                );
                self.clear();
                None
            }
        }
    }

    pub fn is_present(&self) -> bool {
        self.load().is_some()
    }

    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create marker directory")?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json).context("Failed to write session marker")?;

        info!("Session marker written to {}", self.path.display());

        Ok(())
    }

    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Session marker removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session marker: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> SessionRecord {
        SessionRecord {
            app_id: "app".to_string(),
            business_id: None,
            room_id: "Room123".to_string(),
            task_id: "User123".to_string(),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let marker = SessionMarker::new(dir.path().join("state/session.json"));

        assert!(!marker.is_present());

        marker.save(&record()).unwrap();
        let loaded = marker.load().unwrap();
        assert_eq!(loaded.room_id, "Room123");
        assert_eq!(loaded.stop_request().task_id, "User123");

        marker.clear();
        assert!(!marker.is_present());
        marker.clear();
    }

    #[test]
    fn test_corrupt_marker_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let marker = SessionMarker::new(&path);
        assert!(marker.load().is_none());
        assert!(!path.exists());
    }
}
