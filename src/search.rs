//! Search core: query tokenization, per-term matching, span aggregation.
//!
//! Everything here is a pure function of its inputs. The `Searcher` scans the
//! supplied item slice linearly per call, holds no state between calls, and
//! never touches I/O; callers own debouncing and result lifetime (see the
//! `session` module for the async shell).
//!
//! Offsets are character positions into the original-case text. Matching is
//! case-insensitive via per-character folding, which keeps every produced
//! span a valid slice of the text it was found in.

use crate::interface::{MatchSpan, SearchResult, SearchResultMap, SearchableField};
use crate::models::Searchable;
use crate::segment::{SegmentPolicy, Segmenter, UnicodeSegmenter, WhitespaceSegmenter};

/// Lowercase one character for comparison.
///
/// Characters whose lowercase form expands to multiple characters (e.g.
/// U+0130) are compared as-is; a length-changing fold would let span offsets
/// drift off the original text.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => c,
    }
}

fn folded_chars(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// Locate every occurrence of `term` in `text`, case-insensitively.
///
/// Occurrences may overlap: the scan advances one character at a time, so
/// `"aa"` occurs three times in `"aaaa"`. Span offsets index `text` by
/// character; `term` is recorded in its original casing.
pub fn find_spans(text: &str, term: &str) -> Vec<MatchSpan> {
    if term.is_empty() {
        return Vec::new();
    }
    let haystack = folded_chars(text);
    let needle = folded_chars(term);
    if needle.len() > haystack.len() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for (start, window) in haystack.windows(needle.len()).enumerate() {
        if window == needle.as_slice() {
            spans.push(MatchSpan {
                start,
                end: start + needle.len(),
                term: term.to_string(),
            });
        }
    }
    spans
}

/// Whether `term` occurs in any searchable field of `item`.
///
/// The empty term matches everything; the tokenizer never produces it for a
/// non-empty query.
pub fn is_match<S: Searchable>(item: &S, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = folded_chars(term);
    if contains_folded(item.title_text(), &needle) {
        return true;
    }
    item.content_text()
        .map_or(false, |content| contains_folded(content, &needle))
}

fn contains_folded(text: &str, needle: &[char]) -> bool {
    let haystack = folded_chars(text);
    needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Tokenizes queries and aggregates match results over item sequences.
///
/// Construction fixes the segmentation strategy and filtering policy;
/// `new` picks UAX-29 segmentation, `whitespace_fallback` the degraded
/// split-on-whitespace path for hosts without that capability.
pub struct Searcher {
    segmenter: Box<dyn Segmenter>,
    policy: SegmentPolicy,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Self::with_segmenter(Box::new(UnicodeSegmenter), SegmentPolicy::default())
    }

    pub fn with_policy(policy: SegmentPolicy) -> Self {
        Self::with_segmenter(Box::new(UnicodeSegmenter), policy)
    }

    pub fn whitespace_fallback() -> Self {
        Self::with_segmenter(Box::new(WhitespaceSegmenter), SegmentPolicy::default())
    }

    pub fn with_segmenter(segmenter: Box<dyn Segmenter>, policy: SegmentPolicy) -> Self {
        Self { segmenter, policy }
    }

    /// Break a query into search terms, order-preserving and duplicate-free.
    ///
    /// Whitespace-delimited tokens come first, each followed by its surviving
    /// word segments; the full trimmed query is appended last when not
    /// already present. Single-character tokens are kept verbatim and never
    /// segmented. A whitespace-only query yields no terms.
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut terms: Vec<String> = Vec::new();
        let push_unique = |terms: &mut Vec<String>, term: &str| {
            if !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        };

        for token in trimmed.split_whitespace() {
            let mut chars = token.chars();
            let single_char = chars.next().is_some() && chars.next().is_none();
            push_unique(&mut terms, token);
            if single_char {
                continue;
            }
            for sub in self.segmenter.segment(token) {
                let sub = sub.trim();
                if self.policy.keeps_subtoken(sub) {
                    push_unique(&mut terms, sub);
                }
            }
        }

        push_unique(&mut terms, trimmed);
        terms
    }

    /// Search an ordered item sequence for a full query.
    ///
    /// Returns a map keyed by item position; positions with no matching term
    /// are absent. An empty or whitespace-only query returns an empty map
    /// without scanning ("not searching" rather than "searched, nothing
    /// found"). Iteration is item order, then term order, so span lists per
    /// field preserve discovery order.
    pub fn search_items<S: Searchable>(&self, items: &[S], query: &str) -> SearchResultMap {
        let mut map = SearchResultMap::new();
        if query.trim().is_empty() {
            return map;
        }
        let terms = self.tokenize(query);

        for (index, item) in items.iter().enumerate() {
            let title = item.title_text();
            let content = item.content_text();
            let mut result = SearchResult::default();

            for term in &terms {
                let title_spans = find_spans(title, term);
                let content_spans = content.map(|c| find_spans(c, term)).unwrap_or_default();
                if title_spans.is_empty() && content_spans.is_empty() {
                    continue;
                }

                if !result.terms.iter().any(|t| t == term) {
                    result.terms.push(term.clone());
                }
                if !title_spans.is_empty() {
                    result
                        .matches
                        .entry(SearchableField::Title)
                        .or_default()
                        .extend(title_spans);
                }
                if !content_spans.is_empty() {
                    result
                        .matches
                        .entry(SearchableField::Content)
                        .or_default()
                        .extend(content_spans);
                }
            }

            if !result.terms.is_empty() {
                map.insert(index, result);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, HistoryRecord};

    fn item(title: &str, content: Option<&str>) -> HistoryRecord {
        HistoryRecord {
            author_name: "tester".to_string(),
            item_id: title.to_string(),
            title: title.to_string(),
            kind: ContentKind::Answer,
            url: None,
            visit_time: None,
            content: content.map(str::to_string),
        }
    }

    fn span(start: usize, end: usize, term: &str) -> MatchSpan {
        MatchSpan {
            start,
            end,
            term: term.to_string(),
        }
    }

    #[test]
    fn test_tokenize_plain_words() {
        let searcher = Searcher::new();
        assert_eq!(
            searcher.tokenize("hello world"),
            vec!["hello", "world", "hello world"]
        );
    }

    #[test]
    fn test_tokenize_trims_and_rejects_whitespace_only() {
        let searcher = Searcher::new();
        assert_eq!(searcher.tokenize("  rust  "), vec!["rust"]);
        assert!(searcher.tokenize("").is_empty());
        assert!(searcher.tokenize("   \t\n").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_single_char_tokens_verbatim() {
        let searcher = Searcher::new();
        // single-character raw tokens survive even though single-character
        // sub-tokens would be filtered
        assert_eq!(searcher.tokenize("a 门"), vec!["a", "门", "a 门"]);
    }

    #[test]
    fn test_tokenize_segments_mixed_script_tokens() {
        let searcher = Searcher::new();
        // UAX-29 isolates the ideographs, which then drop as single-char
        // sub-tokens; the script run "TypeScript" survives segmentation
        assert_eq!(
            searcher.tokenize("TypeScript入门 教程"),
            vec!["TypeScript入门", "TypeScript", "教程", "TypeScript入门 教程"]
        );
    }

    #[test]
    fn test_tokenize_relaxed_policy_admits_single_char_subtokens() {
        let policy = SegmentPolicy {
            min_subtoken_chars: 1,
            ..SegmentPolicy::default()
        };
        let searcher = Searcher::with_policy(policy);
        // with the length floor lowered, ideograph sub-tokens survive but
        // stopwords still drop
        assert_eq!(searcher.tokenize("入门的"), vec!["入门的", "入", "门"]);
    }

    #[test]
    fn test_tokenize_whitespace_fallback_skips_segmentation() {
        let searcher = Searcher::whitespace_fallback();
        assert_eq!(
            searcher.tokenize("TypeScript入门 教程"),
            vec!["TypeScript入门", "教程", "TypeScript入门 教程"]
        );
    }

    #[test]
    fn test_tokenize_deduplicates_preserving_first_seen_order() {
        let searcher = Searcher::new();
        assert_eq!(searcher.tokenize("rust rust"), vec!["rust", "rust rust"]);
        // the full query equals the sole token and is not re-appended
        assert_eq!(searcher.tokenize("rust"), vec!["rust"]);
    }

    #[test]
    fn test_find_spans_case_insensitive() {
        assert_eq!(
            find_spans("Hello World", "hello"),
            vec![span(0, 5, "hello")]
        );
        assert_eq!(find_spans("abc", "ABC"), vec![span(0, 3, "ABC")]);
    }

    #[test]
    fn test_find_spans_overlapping_occurrences() {
        assert_eq!(
            find_spans("aaaa", "aa"),
            vec![span(0, 2, "aa"), span(1, 3, "aa"), span(2, 4, "aa")]
        );
    }

    #[test]
    fn test_find_spans_char_offsets_in_mixed_script_text() {
        // "一篇关于 TypeScript 的文章": the ASCII run starts at char 5
        let spans = find_spans("一篇关于 TypeScript 的文章", "typescript");
        assert_eq!(spans, vec![span(5, 15, "typescript")]);
    }

    #[test]
    fn test_find_spans_empty_inputs() {
        assert!(find_spans("hello", "").is_empty());
        assert!(find_spans("", "hello").is_empty());
        assert!(find_spans("hi", "high").is_empty());
    }

    #[test]
    fn test_is_match_checks_both_fields() {
        let with_content = item("Apple pie", Some("baking guide"));
        assert!(is_match(&with_content, "apple"));
        assert!(is_match(&with_content, "GUIDE"));
        assert!(!is_match(&with_content, "cherry"));

        let title_only = item("Banana", None);
        assert!(is_match(&title_only, "banana"));
        assert!(!is_match(&title_only, "guide"));
    }

    #[test]
    fn test_is_match_empty_term_matches_everything() {
        assert!(is_match(&item("anything", None), ""));
    }

    #[test]
    fn test_search_items_empty_query_yields_empty_map() {
        let searcher = Searcher::new();
        let items = vec![item("Apple", None), item("Banana", None)];
        assert!(searcher.search_items(&items, "").is_empty());
        assert!(searcher.search_items(&items, "   ").is_empty());
    }

    #[test]
    fn test_search_items_no_matches_with_active_query() {
        let searcher = Searcher::new();
        let items = vec![item("Apple", None), item("Banana", None)];
        // non-empty query with zero hits: an empty map, same shape as "no
        // query", distinguished by the caller knowing a query was active
        assert!(searcher.search_items(&items, "xyz").is_empty());
    }

    #[test]
    fn test_search_items_locates_spans_in_both_fields() {
        let searcher = Searcher::new();
        let items = vec![item(
            "TypeScript 入门",
            Some("一篇关于 TypeScript 的文章"),
        )];
        let map = searcher.search_items(&items, "TypeScript");

        let result = map.get(&0).expect("item 0 should match");
        assert!(result.terms.iter().any(|t| t == "TypeScript"));
        assert_eq!(
            result.field_spans(SearchableField::Title),
            Some(&[span(0, 10, "TypeScript")][..])
        );
        assert_eq!(
            result.field_spans(SearchableField::Content),
            Some(&[span(5, 15, "TypeScript")][..])
        );
    }

    #[test]
    fn test_search_items_skips_unmatched_items() {
        let searcher = Searcher::new();
        let items = vec![item("Apple", None), item("Banana", None)];
        let map = searcher.search_items(&items, "banana");
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&0));
    }

    #[test]
    fn test_search_items_field_key_absent_without_spans() {
        let searcher = Searcher::new();
        let items = vec![item("Rust guide", Some("all about ownership"))];
        let map = searcher.search_items(&items, "ownership");
        let result = map.get(&0).expect("should match on content");
        assert!(result.field_spans(SearchableField::Title).is_none());
        assert!(result.field_spans(SearchableField::Content).is_some());
    }

    #[test]
    fn test_search_items_ignores_empty_content() {
        let searcher = Searcher::new();
        let items = vec![item("Rust", Some(""))];
        let map = searcher.search_items(&items, "rust");
        let result = map.get(&0).expect("title should match");
        assert!(result.field_spans(SearchableField::Content).is_none());
    }

    #[test]
    fn test_search_items_multi_term_spans_preserve_term_order() {
        let searcher = Searcher::new();
        let items = vec![item("alpha beta", None)];
        let map = searcher.search_items(&items, "beta alpha");
        let result = map.get(&0).expect("should match");
        // the joined query "beta alpha" matches neither field and is not recorded
        assert_eq!(result.terms, vec!["beta", "alpha"]);

        // term order first, scan order within each term
        let title = result.field_spans(SearchableField::Title).unwrap();
        assert_eq!(
            title,
            &[span(6, 10, "beta"), span(0, 5, "alpha")][..]
        );
    }

    #[test]
    fn test_search_items_records_joined_query_only_when_it_matches() {
        let searcher = Searcher::new();
        let items = vec![item("alpha beta", None)];
        let map = searcher.search_items(&items, "alpha beta");
        let result = map.get(&0).expect("should match");
        assert_eq!(result.terms, vec!["alpha", "beta", "alpha beta"]);

        let title = result.field_spans(SearchableField::Title).unwrap();
        assert_eq!(
            title,
            &[
                span(0, 5, "alpha"),
                span(6, 10, "beta"),
                span(0, 10, "alpha beta"),
            ][..]
        );
    }

    #[test]
    fn test_search_items_is_deterministic() {
        let searcher = Searcher::new();
        let items = vec![
            item("TypeScript 入门", Some("一篇关于 TypeScript 的文章")),
            item("Rust 指南", None),
        ];
        let first = searcher.search_items(&items, "typescript 指南");
        let second = searcher.search_items(&items, "typescript 指南");
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_items_monotonic_against_is_match() {
        let searcher = Searcher::new();
        let items = vec![
            item("Apple pie", Some("baking")),
            item("Banana bread", None),
            item("入门教程", Some("TypeScript 的文章")),
        ];
        let query = "apple 教程";
        let map = searcher.search_items(&items, query);
        let terms = searcher.tokenize(query);
        for (&index, _) in &map {
            assert!(
                terms.iter().any(|t| is_match(&items[index], t)),
                "item {index} present without a matching term"
            );
        }
    }
}
