//! A lazy filtered view over the raw input bytes: trims leading/trailing C0
//! control or space at construction, and transparently skips tab/LF/CR
//! during iteration, while keeping indices addressable against the
//! *original* byte sequence (§4.5's scan map stores offsets into this
//! view's underlying buffer, not a freshly compacted copy).
//!
//! The reference browser engine does the equivalent trimming/skipping
//! inline inside its state machine loop (`crates/url/src/parser.rs`'s
//! `ReversibleCharIterator`); here it is pulled out as its own pass so the
//! scan state machine in [`crate::scan`] can stay byte-oriented and never
//! special-case whitespace itself.

use crate::error::ValidationError;

/// The filtered input: `bytes` has had leading/trailing C0-or-space
/// trimmed, and `had_tab_or_newline` records whether any were skipped
/// during the trim-and-compact pass below.
pub struct FilteredInput<'a> {
    original: &'a [u8],
    start: usize,
    end: usize,
    pub had_leading_or_trailing_c0_or_space: bool,
    pub had_tab_or_newline: bool,
}

fn is_c0_or_space(b: u8) -> bool {
    b <= 0x20
}

fn is_tab_or_newline(b: u8) -> bool {
    matches!(b, 0x09 | 0x0a | 0x0d)
}

impl<'a> FilteredInput<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut start = 0;
        let mut end = input.len();
        while start < end && is_c0_or_space(input[start]) {
            start += 1;
        }
        while end > start && is_c0_or_space(input[end - 1]) {
            end -= 1;
        }
        let trimmed = start > 0 || end < input.len();
        let had_tab_or_newline = input[start..end].iter().any(|&b| is_tab_or_newline(b));

        Self {
            original: input,
            start,
            end,
            had_leading_or_trailing_c0_or_space: trimmed,
            had_tab_or_newline,
        }
    }

    /// Any validation errors the trim/skip pass itself produced, in
    /// reporting order.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.had_leading_or_trailing_c0_or_space {
            errors.push(ValidationError::UnexpectedC0ControlOrSpace);
        }
        if self.had_tab_or_newline {
            errors.push(ValidationError::UnexpectedAsciiTabOrNewline);
        }
        errors
    }

    /// An iterator over the trimmed range with tab/LF/CR skipped, yielding
    /// `(original_index, byte)` pairs so callers can still slice back into
    /// the pre-filter input.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + 'a {
        let original = self.original;
        (self.start..self.end)
            .map(move |i| (i, original[i]))
            .filter(|&(_, b)| !is_tab_or_newline(b))
    }

    /// Copies the filtered bytes (tab/LF/CR removed, already trimmed) into
    /// an owned buffer. Used once per parse to hand the scan state machine
    /// a compact slice instead of re-filtering on every cursor step.
    pub fn compact(&self) -> Vec<u8> {
        self.iter().map(|(_, b)| b).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_leading_and_trailing_space() {
        let filtered = FilteredInput::new(b"  http://x  ");
        assert!(filtered.had_leading_or_trailing_c0_or_space);
        assert_eq!(filtered.compact(), b"http://x");
    }

    #[test]
    fn skips_tab_and_newline() {
        let filtered = FilteredInput::new(b"ht\ntp://e\txample");
        assert!(filtered.had_tab_or_newline);
        assert_eq!(filtered.compact(), b"http://example");
    }

    #[test]
    fn clean_input_reports_nothing() {
        let filtered = FilteredInput::new(b"http://example.com");
        assert!(!filtered.had_leading_or_trailing_c0_or_space);
        assert!(!filtered.had_tab_or_newline);
        assert!(filtered.validation_errors().is_empty());
    }

    #[test]
    fn all_control_input_trims_to_empty() {
        let filtered = FilteredInput::new(b"\x01\x02");
        assert_eq!(filtered.compact(), Vec::<u8>::new());
        assert!(filtered.had_leading_or_trailing_c0_or_space);
    }
}
