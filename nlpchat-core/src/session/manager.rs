//! Saving and loading sessions on disk

use super::store::{Session, Turn};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists conversation sessions as JSONL files
#[derive(Debug)]
pub struct SessionManager {
    /// Directory for bare session names
    sessions_dir: PathBuf,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new<P: AsRef<Path>>(sessions_dir: P) -> Self {
        Self {
            sessions_dir: sessions_dir.as_ref().to_path_buf(),
        }
    }

    /// Save a session, generating a timestamped name when none is given.
    /// Returns the path the session was written to.
    pub fn save(&self, session: &Session, name: Option<&str>) -> crate::Result<PathBuf> {
        let default_name;
        let name = match name {
            Some(name) => name,
            None => {
                default_name = format!("conversation_{}.jsonl", Utc::now().format("%Y%m%d_%H%M%S"));
                &default_name
            }
        };
        let path = self.resolve_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut lines = Vec::new();

        let metadata = serde_json::json!({
            "_type": "metadata",
            "created_at": session.created_at.to_rfc3339(),
            "updated_at": session.updated_at.to_rfc3339(),
        });
        lines.push(serde_json::to_string(&metadata)?);

        for turn in session.turns() {
            lines.push(serde_json::to_string(turn)?);
        }

        std::fs::write(&path, lines.join("\n"))?;
        debug!("Saved session with {} turns to {:?}", session.len(), path);
        Ok(path)
    }

    /// Load a session from disk.
    ///
    /// Fails with `Error::NotFound` when the file is absent and
    /// `Error::Serialization` when any line does not parse; the caller's
    /// current session is untouched in both cases.
    pub fn load(&self, name: &str) -> crate::Result<Session> {
        let path = self.resolve_path(name);

        if !path.exists() {
            return Err(crate::Error::NotFound(format!(
                "no saved conversation at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let mut session = Session::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
                crate::Error::Serialization(format!("{}: {}", path.display(), e))
            })?;

            if value.get("_type").and_then(|v| v.as_str()) == Some("metadata") {
                if let Some(created) = value
                    .get("created_at")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse().ok())
                {
                    session.created_at = created;
                }
                continue;
            }

            let turn: Turn = serde_json::from_value(value).map_err(|e| {
                crate::Error::Serialization(format!("{}: {}", path.display(), e))
            })?;
            session.turns.push(turn);
        }

        session.updated_at = Utc::now();
        debug!("Loaded session with {} turns from {:?}", session.len(), path);
        Ok(session)
    }

    /// Resolve a session name to a file path. A bare name lands in the
    /// sessions directory with a `.jsonl` extension; anything with a path
    /// separator is used verbatim.
    fn resolve_path(&self, name: &str) -> PathBuf {
        if name.contains('/') || name.contains('\\') {
            return PathBuf::from(name);
        }

        let file_name = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{}.jsonl", name)
        };
        self.sessions_dir.join(file_name)
    }
}
