//! Item shapes the search pipeline operates on.
//!
//! Two shapes exist for historical reasons: the flat `HistoryRecord` captured
//! at browse time and stored locally, and the nested `FeedEntry` returned by
//! the remote read-history API. The `Searchable` trait is the seam that lets
//! the search core serve both without knowing either.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Character budget for content previews.
pub const DEFAULT_PREVIEW_CHARS: usize = 120;

// ─────────────────────────────────────────────────────────────────────────────
// CONTENT KIND
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of content an item points at.
///
/// Captured records only ever carry `Answer`, `Article`, or `Pin`; remote
/// feed entries may also reference profiles and bare questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Answer,
    Article,
    Pin,
    Profile,
    Question,
}

impl ContentKind {
    /// Classify a content URL by its path shape.
    ///
    /// Recognizes the canonical link forms: `/question/{id}/answer/{id}`,
    /// `/question/{id}`, `/p/{id}` (column article), `/pin/{id}` and
    /// `/people/{id}`. Anything else is unclassified.
    pub fn from_url(url: &Url) -> Option<Self> {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["question", _, "answer", _] => Some(ContentKind::Answer),
            ["question", _] => Some(ContentKind::Question),
            ["p", _] => Some(ContentKind::Article),
            ["pin", _] => Some(ContentKind::Pin),
            ["people", _] => Some(ContentKind::Profile),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FLAT CAPTURE SHAPE
// ─────────────────────────────────────────────────────────────────────────────

/// One viewed item as captured at browse time.
///
/// Serialized camelCase because stored payloads predate this crate and must
/// keep decoding. `visit_time` is unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub author_name: String,
    pub item_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl HistoryRecord {
    /// Visit time as a UTC timestamp, when recorded and in range.
    pub fn visited_at(&self) -> Option<DateTime<Utc>> {
        self.visit_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Parsed content link, when present and well-formed.
    pub fn link(&self) -> Option<Url> {
        self.url.as_deref().and_then(|u| Url::parse(u).ok())
    }

    /// Content truncated to the preview budget.
    pub fn content_preview(&self) -> Option<String> {
        self.content
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| truncate_chars(c, DEFAULT_PREVIEW_CHARS))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NESTED REMOTE SHAPE
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the remote read-history feed, as the wire has it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub data: FeedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedData {
    pub header: FeedHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<FeedContent>,
    pub extra: FeedExtra,
    pub action: FeedAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matrix: Vec<FeedMatrixCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedHeader {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Identity and bookkeeping the deletion API needs. `read_time` is unix
/// seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedExtra {
    pub content_token: String,
    pub content_type: ContentKind,
    pub read_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedAction {
    pub url: String,
}

/// One cell of the entry's meta matrix ("1.2k upvotes" style strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMatrixCell {
    pub data: FeedMatrixData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMatrixData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl FeedEntry {
    /// The first meta-matrix text, when present and non-empty.
    pub fn meta_text(&self) -> Option<&str> {
        self.data
            .matrix
            .first()
            .and_then(|cell| cell.data.text.as_deref())
            .filter(|text| !text.is_empty())
    }

    /// Read time as a UTC timestamp, when in range.
    pub fn read_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.data.extra.read_time, 0).single()
    }

    /// Parsed action link, when well-formed.
    pub fn link(&self) -> Option<Url> {
        Url::parse(&self.data.action.url).ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SEARCHABLE SEAM
// ─────────────────────────────────────────────────────────────────────────────

/// Field access the search core depends on.
///
/// Implementations return `None` from `content_text` rather than an empty
/// string; an item with no secondary text has exactly one searchable field.
pub trait Searchable {
    /// Primary text, always present.
    fn title_text(&self) -> &str;

    /// Optional secondary text (summary or body excerpt).
    fn content_text(&self) -> Option<&str>;
}

impl Searchable for HistoryRecord {
    fn title_text(&self) -> &str {
        &self.title
    }

    fn content_text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

impl Searchable for FeedEntry {
    fn title_text(&self) -> &str {
        &self.data.header.title
    }

    fn content_text(&self) -> Option<&str> {
        self.data
            .content
            .as_ref()
            .and_then(|c| c.summary.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DISPLAY HELPERS
// ─────────────────────────────────────────────────────────────────────────────

/// Truncate to a character budget, appending "..." when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{kept}...")
}

/// Relative wording for recent times, absolute date beyond a day.
pub fn format_relative_time(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    if seconds < 3600 {
        let minutes = seconds / 60;
        return if minutes == 1 {
            "1 minute ago".to_string()
        } else {
            format!("{minutes} minutes ago")
        };
    }
    if seconds < 86_400 {
        let hours = seconds / 3600;
        return if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{hours} hours ago")
        };
    }
    then.format("%Y-%m-%d").to_string()
}
