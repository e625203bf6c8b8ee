//! Whitespace word segmentation

use std::ops::Range;

/// Maximal runs of non-whitespace characters, borrowed from the document
#[derive(Debug, Clone)]
pub(crate) struct Words<'a> {
    words: Vec<&'a str>,
}

impl<'a> Words<'a> {
    pub(crate) fn split(text: &'a str) -> Self {
        Self {
            words: text.split_whitespace().collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    /// Words in `range` joined by single spaces
    pub(crate) fn join(&self, range: Range<usize>) -> String {
        self.words[range].join(" ")
    }

    /// Byte span of every word of `range` inside `self.join(range)`
    pub(crate) fn spans(&self, range: Range<usize>) -> Vec<(usize, usize)> {
        let mut spans = Vec::with_capacity(range.len());
        let mut pos = 0;

        for word in &self.words[range] {
            spans.push((pos, pos + word.len()));
            pos += word.len() + 1;
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_collapses_whitespace() {
        let words = Words::split("\n  alpha\t\tbeta  gamma\r\n");
        assert_eq!(words.len(), 3);
        assert_eq!(words.join(0..3), "alpha beta gamma");
        assert_eq!(words.join(1..2), "beta");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(Words::split("").len(), 0);
        assert_eq!(Words::split(" \t\n\u{00A0} ").len(), 0);
    }

    #[test]
    fn test_spans_index_joined_text() {
        let words = Words::split("aa bbb  ç d");
        let joined = words.join(1..4);
        let spans = words.spans(1..4);

        assert_eq!(spans, vec![(0, 3), (4, 6), (7, 8)]);
        assert_eq!(&joined[spans[1].0..spans[1].1], "ç");
    }
}
