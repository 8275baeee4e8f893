//! Offset segmentation
//!
//! Partitions a document's text into an ordered run of plain and marked
//! segments from a set of non-overlapping highlight spans. The result is
//! recomputed from data on every render; nothing here holds state.

use serde::Serialize;

use crate::document::{char_len, char_slice};
use crate::models::{Annotation, Highlight, Interval};

/// Anything that occupies an interval of the document and may carry an annotation
pub trait Span {
    fn interval(&self) -> Interval;

    fn annotation(&self) -> Option<&Annotation> {
        None
    }
}

impl Span for Interval {
    fn interval(&self) -> Interval {
        *self
    }
}

impl Span for Highlight {
    fn interval(&self) -> Interval {
        Highlight::interval(self)
    }

    fn annotation(&self) -> Option<&Annotation> {
        Some(&self.annotation)
    }
}

impl<T: Span + ?Sized> Span for &T {
    fn interval(&self) -> Interval {
        (**self).interval()
    }

    fn annotation(&self) -> Option<&Annotation> {
        (**self).annotation()
    }
}

/// A contiguous run of document text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub content: String,
    /// Whether this run is highlighted
    pub mark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Segment {
    fn plain(text: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            content: char_slice(text, start, end).to_string(),
            mark: false,
            annotation: None,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Split `text` into plain and marked segments
///
/// Spans need not be sorted but must not overlap. Offsets past the end of
/// the text are clamped to it.
pub fn segment<S: Span>(text: &str, spans: &[S]) -> Vec<Segment> {
    let len = char_len(text);
    let mut sorted: Vec<&S> = spans.iter().collect();
    sorted.sort_by_key(|span| span.interval().start);

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut last_end = 0;

    for span in sorted {
        let interval = span.interval();
        let start = interval.start.min(len);
        let end = interval.end.min(len);

        if last_end < start {
            segments.push(Segment::plain(text, last_end, start));
        }
        segments.push(Segment {
            start,
            end,
            content: char_slice(text, start, end).to_string(),
            mark: true,
            annotation: span.annotation().cloned(),
        });
        last_end = end;
    }

    if last_end < len {
        segments.push(Segment::plain(text, last_end, len));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Annotation;

    fn highlight(start: usize, end: usize, text: &str, name: &str) -> Highlight {
        Highlight::new(
            Interval::new(start, end),
            text,
            Annotation {
                name: name.to_string(),
                ..Annotation::default()
            },
        )
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.content.as_str()).collect()
    }

    #[test]
    fn test_no_highlights_single_segment() {
        let segments = segment::<Highlight>("rate = 0.5", &[]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "rate = 0.5");
        assert_eq!(segments[0].interval(), Interval::new(0, 10));
        assert!(!segments[0].mark);
    }

    #[test]
    fn test_empty_text_no_segments() {
        assert!(segment::<Highlight>("", &[]).is_empty());
    }

    #[test]
    fn test_hello_world_today() {
        let text = "Hello world today!";
        assert_eq!(text.len(), 18);
        let highlights = vec![
            highlight(0, 5, "Hello", "greeting"),
            highlight(10, 15, "d tod", "day"),
        ];

        let segments = segment(text, &highlights);
        let shape: Vec<_> = segments.iter().map(|s| (s.start, s.end, s.mark)).collect();
        assert_eq!(
            shape,
            vec![(0, 5, true), (5, 10, false), (10, 15, true), (15, 18, false)]
        );
        assert_eq!(segments[0].content, "Hello");
        assert_eq!(segments[2].content, "d tod");
        assert_eq!(segments[3].content, "ay!");
        assert_eq!(
            segments[2].annotation.as_ref().map(|a| a.name.as_str()),
            Some("day")
        );
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_unsorted_input() {
        let text = "a=1 b=2 c=3";
        let highlights = vec![
            highlight(10, 11, "3", "c"),
            highlight(2, 3, "1", "a"),
            highlight(6, 7, "2", "b"),
        ];
        let segments = segment(text, &highlights);
        let marked: Vec<_> = segments
            .iter()
            .filter(|s| s.mark)
            .map(|s| s.content.as_str())
            .collect();
        assert_eq!(marked, vec!["1", "2", "3"]);
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_segments_are_contiguous() {
        let text = "--alpha 1 --beta 22 --gamma 333";
        let highlights = vec![
            highlight(8, 9, "1", "alpha"),
            highlight(17, 19, "22", "beta"),
            highlight(28, 31, "333", "gamma"),
        ];
        let segments = segment(text, &highlights);
        assert_eq!(segments.first().map(|s| s.start), Some(0));
        assert_eq!(segments.last().map(|s| s.end), Some(text.len()));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_adjacent_highlights_have_no_gap_segment() {
        let text = "abcdef";
        let highlights = vec![highlight(0, 3, "abc", "x"), highlight(3, 6, "def", "y")];
        let segments = segment(text, &highlights);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.mark));
    }

    #[test]
    fn test_plain_intervals_are_marked_without_annotation() {
        let segments = segment("abcdef", &[Interval::new(2, 4)]);
        assert_eq!(segments.len(), 3);
        assert!(segments[1].mark);
        assert!(segments[1].annotation.is_none());
        assert_eq!(segments[1].content, "cd");
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let text = "größe: 10 µm";
        let segments = segment(text, &[Interval::new(7, 9)]);
        assert_eq!(segments[1].content, "10");
        assert_eq!(segments[2].content, " µm");
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_out_of_bounds_clamped() {
        let segments = segment("abc", &[Interval::new(1, 10)]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].interval(), Interval::new(1, 3));
        assert_eq!(segments[1].content, "bc");
    }

    #[test]
    fn test_idempotent() {
        let text = "x = 1\ny = 2\n";
        let highlights = vec![highlight(4, 5, "1", "x")];
        assert_eq!(segment(text, &highlights), segment(text, &highlights));
    }
}
