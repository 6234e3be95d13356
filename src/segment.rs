//! Query segmentation strategies.
//!
//! Tokenizing a query prefers locale-aware word segmentation and degrades to
//! plain whitespace splitting when that capability is unavailable. Which one
//! runs is a `Segmenter` implementation picked at `Searcher` construction,
//! never probed mid-query.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Particles and punctuation dropped from segment-derived sub-terms.
///
/// A starting point, not an exhaustive list; callers with different corpora
/// override it through `SegmentPolicy`.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "的", "了", "是", "在", "和", "有", "就", "不", "也", "这", "那", "吗", "吧", "啊", "哦",
    "啦", "呀", "！", "？", "，", "。", "、", "；", "：", "“", "”", "‘", "’", "《", "》", "[",
    "]", "{", "}", ".", "(", ")", "【", "】", "——", "—", "…", "·",
];

/// Filtering rules applied to sub-terms produced by segmentation.
///
/// Raw whitespace-delimited tokens are exempt: a single-character token the
/// user typed survives, while a single-character segment carved out of a
/// longer token is noise and drops under the default minimum length.
#[derive(Debug, Clone)]
pub struct SegmentPolicy {
    pub stop_words: HashSet<String>,
    pub min_subtoken_chars: usize,
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_subtoken_chars: 2,
        }
    }
}

impl SegmentPolicy {
    /// Whether a segmentation sub-term survives filtering.
    pub fn keeps_subtoken(&self, sub: &str) -> bool {
        !sub.is_empty()
            && !self.stop_words.contains(sub)
            && sub.chars().count() >= self.min_subtoken_chars
    }
}

/// Word-boundary analysis for one whitespace-free token.
pub trait Segmenter: Send + Sync {
    /// Word segments of the token. An implementation without real
    /// word-boundary analysis returns no segments.
    fn segment(&self, token: &str) -> Vec<String>;
}

/// UAX-29 word segmentation.
///
/// Splits script runs apart and isolates CJK ideographs one by one;
/// dictionary-based phrase grouping is not something this strategy offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn segment(&self, token: &str) -> Vec<String> {
        token.unicode_words().map(|w| w.to_string()).collect()
    }
}

/// Degraded strategy for hosts without segmentation support: tokens pass
/// through unsegmented, so the tokenizer falls back to whitespace splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, _token: &str) -> Vec<String> {
        Vec::new()
    }
}
