//! Local capture history: dedupe, retention limit, newest-first listing.
//!
//! Payloads live in the backend as one raw JSON array under `ZH_HISTORY`,
//! oldest first; readers get it reversed. Records deduplicate on `item_id`,
//! with a re-visited item moving to the newest slot. The retention limit is
//! itself persisted, defaulting to 20, and trims from the oldest end.
//!
//! Deployments that previously stored history in another location hand that
//! backend in as `legacy`; its payload is moved into the primary backend the
//! first time the history is read.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::interface::RetraceError;
use crate::models::HistoryRecord;
use crate::storage::{StorageBackend, StorageError};

pub const HISTORY_KEY: &str = "ZH_HISTORY";
pub const HISTORY_LIMIT_KEY: &str = "HISTORY_LIMIT";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Capture-history store over an injected key-value backend.
pub struct HistoryStore {
    backend: Arc<dyn StorageBackend>,
    legacy: Option<Arc<dyn StorageBackend>>,
    limit: RwLock<usize>,
}

impl HistoryStore {
    /// Open a store over the given backend, reading the persisted retention
    /// limit (or defaulting it).
    pub fn open(backend: Arc<dyn StorageBackend>) -> Result<Self, RetraceError> {
        Self::build(backend, None)
    }

    /// Open a store that also migrates history out of a legacy backend on
    /// first read.
    pub fn open_with_legacy(
        backend: Arc<dyn StorageBackend>,
        legacy: Arc<dyn StorageBackend>,
    ) -> Result<Self, RetraceError> {
        Self::build(backend, Some(legacy))
    }

    fn build(
        backend: Arc<dyn StorageBackend>,
        legacy: Option<Arc<dyn StorageBackend>>,
    ) -> Result<Self, RetraceError> {
        let stored_limit = backend
            .get(HISTORY_LIMIT_KEY)?
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(Self {
            backend,
            legacy,
            limit: RwLock::new(stored_limit),
        })
    }

    /// Record one viewed item.
    ///
    /// An existing record with the same `item_id` is removed first, so the
    /// item moves to the newest slot instead of duplicating. When the list
    /// exceeds the retention limit, the oldest records are dropped.
    pub fn save(&self, record: &HistoryRecord) -> Result<(), RetraceError> {
        let mut records = self.load_stored()?;
        records.retain(|existing| existing.item_id != record.item_id);
        records.push(record.clone());

        let limit = *self.limit.read();
        if records.len() > limit {
            let excess = records.len() - limit;
            records.drain(..excess);
        }

        let payload = serde_json::to_string(&records).map_err(StorageError::from)?;
        self.backend.set(HISTORY_KEY, &payload)?;
        debug!(count = records.len(), "saved history record");
        Ok(())
    }

    /// All stored records, newest first.
    pub fn list(&self) -> Result<Vec<HistoryRecord>, RetraceError> {
        self.migrate_legacy()?;
        let mut records = self.load_stored()?;
        records.reverse();
        Ok(records)
    }

    /// Drop the whole history.
    pub fn clear(&self) -> Result<(), RetraceError> {
        self.backend.remove(HISTORY_KEY)?;
        Ok(())
    }

    /// The active retention limit.
    pub fn limit(&self) -> usize {
        *self.limit.read()
    }

    /// Parse and persist a new retention limit.
    ///
    /// Accepts positive integers only; the limit applies from the next save,
    /// existing records are not trimmed retroactively.
    pub fn set_limit(&self, input: &str) -> Result<(), RetraceError> {
        let limit = input
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or_else(|| {
                RetraceError::InvalidInput(
                    "history limit must be a positive integer".to_string(),
                )
            })?;
        self.backend.set(HISTORY_LIMIT_KEY, &limit.to_string())?;
        *self.limit.write() = limit;
        Ok(())
    }

    fn load_stored(&self) -> Result<Vec<HistoryRecord>, RetraceError> {
        match self.backend.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).map_err(StorageError::from)?),
            None => Ok(Vec::new()),
        }
    }

    fn migrate_legacy(&self) -> Result<(), RetraceError> {
        let legacy = match &self.legacy {
            Some(legacy) => legacy,
            None => return Ok(()),
        };
        if let Some(raw) = legacy.get(HISTORY_KEY)? {
            info!("moving legacy history payload to the primary backend");
            self.backend.set(HISTORY_KEY, &raw)?;
            legacy.remove(HISTORY_KEY)?;
        }
        Ok(())
    }
}
