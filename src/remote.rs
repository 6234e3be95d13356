//! Remote read-history boundary: paging drain, batch deletion, stats.
//!
//! Transport stays with the caller. This module fixes the wire shapes and the
//! paging protocol behind the `RemoteHistory` trait, so the drain and
//! deletion flows can be exercised against an in-memory fake.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::interface::RetraceError;
use crate::models::{ContentKind, FeedEntry};

/// Page size the drain requests; matches what the read-history endpoint
/// serves per call.
pub const REMOTE_PAGE_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// WIRE SHAPES
// ─────────────────────────────────────────────────────────────────────────────

/// One page of the remote feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(rename = "data")]
    pub entries: Vec<FeedEntry>,
    pub is_end: bool,
}

/// One deletion target, keyed the way the remote keys items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePair {
    pub content_token: String,
    pub content_type: ContentKind,
}

/// Body of the batch deletion endpoint. `clear: true` with no pairs wipes
/// the whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    pub pairs: Vec<DeletePair>,
    pub clear: bool,
}

impl BatchDeleteRequest {
    /// Deletion request for the given entries.
    pub fn for_entries(entries: &[FeedEntry]) -> Self {
        let pairs = entries
            .iter()
            .map(|entry| DeletePair {
                content_token: entry.data.extra.content_token.clone(),
                content_type: entry.data.extra.content_type,
            })
            .collect();
        Self {
            pairs,
            clear: false,
        }
    }

    /// Request that wipes the whole remote history.
    pub fn clear_all() -> Self {
        Self {
            pairs: Vec::new(),
            clear: true,
        }
    }
}

/// Item count the remote reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub count: u64,
}

impl HistoryStats {
    /// Adjust the count by a local delta, clamping at zero. Used when
    /// deletions are reflected locally without refetching the stats.
    pub fn apply_delta(&mut self, delta: i64) {
        let next = self.count as i64 + delta;
        self.count = next.max(0) as u64;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// REMOTE API
// ─────────────────────────────────────────────────────────────────────────────

/// The remote read-history API.
#[async_trait::async_trait]
pub trait RemoteHistory: Send + Sync {
    /// Fetch one page starting at `offset`.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<HistoryPage, RemoteError>;

    /// Delete the targeted items, or everything when the request says so.
    async fn batch_delete(&self, request: BatchDeleteRequest) -> Result<(), RemoteError>;

    /// Total item count.
    async fn stats(&self) -> Result<HistoryStats, RemoteError>;
}

/// What a full drain produced. `error` is set when the drain stopped early;
/// `entries` still holds everything loaded before the failure.
#[derive(Debug)]
pub struct FetchAllOutcome {
    pub entries: Vec<FeedEntry>,
    pub error: Option<RemoteError>,
}

/// Drain the remote feed from `start_offset` until it reports the end.
///
/// The offset advances by the number of entries each page actually returned.
/// A failed page stops the drain and hands back what loaded so far.
pub async fn fetch_all(remote: &dyn RemoteHistory, start_offset: usize) -> FetchAllOutcome {
    let mut outcome = FetchAllOutcome {
        entries: Vec::new(),
        error: None,
    };
    let mut offset = start_offset;
    loop {
        let page = match remote.fetch_page(offset, REMOTE_PAGE_SIZE).await {
            Ok(page) => page,
            Err(err) => {
                warn!(offset, error = %err, "history page fetch failed, keeping partial results");
                outcome.error = Some(err);
                break;
            }
        };
        let batch = page.entries.len();
        offset += batch;
        outcome.entries.extend(page.entries);
        if page.is_end {
            break;
        }
        // An empty page without is_end would refetch the same offset forever.
        if batch == 0 {
            break;
        }
    }
    debug!(loaded = outcome.entries.len(), "history drain finished");
    outcome
}

/// Wipe the remote history.
pub async fn clear_remote(remote: &dyn RemoteHistory) -> Result<(), RetraceError> {
    remote.batch_delete(BatchDeleteRequest::clear_all()).await?;
    Ok(())
}

/// Delete the given entries from the remote history. No-op for an empty
/// selection.
pub async fn delete_entries(
    remote: &dyn RemoteHistory,
    entries: &[FeedEntry],
) -> Result<(), RetraceError> {
    if entries.is_empty() {
        return Ok(());
    }
    remote
        .batch_delete(BatchDeleteRequest::for_entries(entries))
        .await?;
    Ok(())
}
