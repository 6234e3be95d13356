//! Public interface types for the history search pipeline.
//!
//! This file is the source of truth for the types shared between the search
//! core, the storage/remote collaborators, and UI consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// SEARCH RESULT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// A field of an item the matcher scans.
///
/// Ordering matters: `Title` sorts before `Content`, so per-field maps iterate
/// title first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchableField {
    Title,
    Content,
}

/// One occurrence of a term inside a field's text.
///
/// `start`/`end` are half-open **character** offsets into the original-case
/// text (`end` exclusive). Matching is case-insensitive, but the offsets
/// always index the text as supplied, so consumers can slice it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// The term that produced this occurrence, in its original casing.
    pub term: String,
}

/// Per-item search outcome: which terms matched, and where.
///
/// A field key is present in `matches` only when at least one span was found
/// for it. `terms` preserves first-seen order and holds no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub terms: Vec<String>,
    pub matches: BTreeMap<SearchableField, Vec<MatchSpan>>,
}

impl SearchResult {
    /// Spans recorded for one field, if any were found.
    pub fn field_spans(&self, field: SearchableField) -> Option<&[MatchSpan]> {
        self.matches.get(&field).map(|spans| spans.as_slice())
    }
}

/// Map from item position (0-based, in the searched sequence) to its result.
///
/// Only positions with at least one matching term are present; a missing key
/// is the authoritative "no match". An empty map for a non-empty query means
/// "searched, nothing found", while an empty query always produces an empty
/// map without searching at all.
pub type SearchResultMap = BTreeMap<usize, SearchResult>;

/// One contiguous run of text, tagged matched or unmatched.
///
/// Concatenating the `text` of a segment sequence reconstructs the source
/// string exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    pub highlight: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for history store and remote operations.
///
/// The search core itself is infallible; only the storage and remote
/// collaborators produce these.
#[derive(Debug, Error)]
pub enum RetraceError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<crate::storage::StorageError> for RetraceError {
    fn from(e: crate::storage::StorageError) -> Self {
        RetraceError::Storage(e.to_string())
    }
}

impl From<crate::remote::RemoteError> for RetraceError {
    fn from(e: crate::remote::RemoteError) -> Self {
        RetraceError::Remote(e.to_string())
    }
}
