// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const FILE_NAME: &str = "session-recovery.json";

/// Marker left while a session is open so an interrupted kiosk can find it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub session_id: String,
    pub started_at: u64,
}

#[derive(Debug, Clone)]
pub struct RecoveryStore {
    path: PathBuf,
}

impl RecoveryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::data_dir()?.join("bayguard").join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, session_id: &str, started_at: u64) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let crumb = Breadcrumb {
            session_id: session_id.to_string(),
            started_at,
        };
        let data = serde_json::to_vec(&crumb)?;

        // Readers never see a partial file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)
    }

    /// `Ok(None)` when there is no breadcrumb or it cannot be parsed.
    pub fn read(&self) -> io::Result<Option<Breadcrumb>> {
        let data = match fs::read(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(serde_json::from_slice(&data).ok())
    }

    /// Remove the breadcrumb only if it belongs to `session_id`.
    pub fn clear_if_matches(&self, session_id: &str) -> io::Result<bool> {
        match self.read()? {
            Some(crumb) if crumb.session_id == session_id => {
                fs::remove_file(&self.path)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> RecoveryStore {
        RecoveryStore::new(dir.path().join("nested").join(FILE_NAME))
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store.write("s1", 1234).unwrap();

        assert_eq!(
            store.read().unwrap(),
            Some(Breadcrumb {
                session_id: "s1".to_string(),
                started_at: 1234
            })
        );

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"sessionId\":\"s1\""));
        assert!(raw.contains("\"startedAt\":1234"));
    }

    #[test]
    fn clear_only_removes_matching_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        store.write("s1", 1).unwrap();

        assert!(!store.clear_if_matches("s2").unwrap());
        assert!(store.path().exists());

        assert!(store.clear_if_matches("s1").unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn missing_or_corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert_eq!(store.read().unwrap(), None);
        assert!(!store.clear_if_matches("s1").unwrap());

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"{not json").unwrap();
        assert_eq!(store.read().unwrap(), None);
        assert!(!store.clear_if_matches("s1").unwrap());
    }
}
