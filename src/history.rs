use std::collections::HashSet;
use std::fs::{create_dir_all, read_to_string};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;
use uuid::Uuid;

use crate::error::HistoryError;
use crate::idea::IdeaResult;

pub const DEFAULT_HISTORY_PATH: &str = "./data/history.json";

/// A result the user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedIdea {
    pub id: Uuid,
    #[serde(flatten)]
    pub idea: IdeaResult,
}

/// Ordered list of saved ideas, newest first.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<SavedIdea>, HistoryError>;

    /// Tag `idea` with a fresh id and put it at the front of the list.
    fn save(&self, idea: IdeaResult) -> Result<SavedIdea, HistoryError>;

    fn clear(&self) -> Result<(), HistoryError>;

    /// Put previously exported entries at the front, in their given order.
    /// Entries whose id is already stored are skipped. Returns how many were added.
    fn import(&self, items: Vec<SavedIdea>) -> Result<usize, HistoryError>;
}

fn merge_front(list: &mut Vec<SavedIdea>, items: Vec<SavedIdea>) -> usize {
    let mut seen: HashSet<Uuid> = list.iter().map(|s| s.id).collect();
    let fresh: Vec<SavedIdea> = items.into_iter().filter(|s| seen.insert(s.id)).collect();
    let added = fresh.len();
    list.splice(0..0, fresh);
    added
}

/// History kept as one JSON array on disk.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_list(&self) -> Result<Vec<SavedIdea>, HistoryError> {
        let raw = match read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable history file");
                Ok(Vec::new())
            }
        }
    }

    // Readers see either the old list or the new one, never a partial write.
    fn write_list(&self, list: &[SavedIdea]) -> Result<(), HistoryError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let serialized = serde_json::to_string_pretty(list)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serialized.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistory {
    fn load(&self) -> Result<Vec<SavedIdea>, HistoryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_list()
    }

    fn save(&self, idea: IdeaResult) -> Result<SavedIdea, HistoryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let saved = SavedIdea {
            id: Uuid::new_v4(),
            idea,
        };
        let mut list = self.read_list()?;
        list.insert(0, saved.clone());
        self.write_list(&list)?;
        Ok(saved)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_list(&[])
    }

    fn import(&self, items: Vec<SavedIdea>) -> Result<usize, HistoryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut list = self.read_list()?;
        let added = merge_front(&mut list, items);
        if added > 0 {
            self.write_list(&list)?;
        }
        Ok(added)
    }
}

/// In-process history, for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    items: Mutex<Vec<SavedIdea>>,
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Result<Vec<SavedIdea>, HistoryError> {
        Ok(self.items.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, idea: IdeaResult) -> Result<SavedIdea, HistoryError> {
        let saved = SavedIdea {
            id: Uuid::new_v4(),
            idea,
        };
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(0, saved.clone());
        Ok(saved)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }

    fn import(&self, items: Vec<SavedIdea>) -> Result<usize, HistoryError> {
        let mut list = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(merge_front(&mut list, items))
    }
}
