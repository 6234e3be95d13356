//! Highlight segmentation: turning match spans into renderable text runs.
//!
//! A field's span list routinely contains overlapping entries, because the
//! full query and its sub-terms hit the same stretch of text. Segmentation
//! merges those into maximal ranges first so no character is ever emitted
//! twice, then partitions the text into an alternating run sequence a
//! renderer can walk without further bookkeeping.

use crate::interface::{MatchSpan, TextSegment};

/// Clamp, order, and coalesce spans into disjoint character ranges.
///
/// Out-of-range offsets clamp to the text length (upstream content can
/// shrink between matching and rendering), spans left empty are dropped, and
/// overlapping or touching ranges merge into one.
fn merge_spans(spans: &[MatchSpan], char_count: usize) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = spans
        .iter()
        .map(|span| (span.start.min(char_count), span.end.min(char_count)))
        .filter(|(start, end)| end > start)
        .collect();
    ranges.sort_unstable_by_key(|range| range.0);

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Split `text` into an ordered run of highlighted and plain segments.
///
/// The segments partition `text` exactly: concatenating their `text` fields
/// reproduces the input, and no two consecutive segments are both
/// highlighted. With no usable spans the whole text comes back as a single
/// unhighlighted segment. Span offsets are character positions, as produced
/// by `search::find_spans`.
pub fn build_highlight_segments(text: &str, spans: &[MatchSpan]) -> Vec<TextSegment> {
    let unhighlighted = || {
        vec![TextSegment {
            text: text.to_string(),
            highlight: false,
        }]
    };
    if spans.is_empty() {
        return unhighlighted();
    }

    let char_count = text.chars().count();
    let ranges = merge_spans(spans, char_count);
    if ranges.is_empty() {
        return unhighlighted();
    }

    // byte offset of every character position, plus one past the end
    let mut byte_at: Vec<usize> = Vec::with_capacity(char_count + 1);
    byte_at.extend(text.char_indices().map(|(offset, _)| offset));
    byte_at.push(text.len());

    let mut segments = Vec::new();
    let mut push = |slice: &str, highlight: bool| {
        segments.push(TextSegment {
            text: slice.to_string(),
            highlight,
        });
    };

    let mut cursor = 0usize;
    for (start, end) in ranges {
        if cursor < start {
            push(&text[byte_at[cursor]..byte_at[start]], false);
        }
        push(&text[byte_at[start]..byte_at[end]], true);
        cursor = end;
    }
    if cursor < char_count {
        push(&text[byte_at[cursor]..], false);
    }
    segments
}
