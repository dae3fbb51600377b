//! Spans and per-match data shared by the engine
//!
//! ByteSpan: byte-precise half-open range
//! MatchData: one match re-indexed by the *original* group numbers of a pattern
//! MatchContext: read-only view handed to template expansion and callbacks

use std::ops::Range;

use crate::engine::combine::TableEntry;
use crate::error::{Error, Result};

/// Half-open absolute byte range `[start, end)`.
///
/// Invariants:
/// - Units are **bytes**, not chars.
/// - `start <= end` always holds (empty spans are allowed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    /// Create a span if `end >= start`; returns `InvalidRange` if not.
    #[inline]
    pub fn try_new(start: usize, end: usize) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange(start, end));
        }
        Ok(Self { start, end })
    }

    /// True if the span is empty (start == end).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Convert to `Range<usize>`.
    #[inline]
    #[must_use]
    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<regex::Match<'_>> for ByteSpan {
    #[inline]
    fn from(m: regex::Match<'_>) -> Self {
        Self {
            start: m.start(),
            end: m.end(),
        }
    }
}

/// Group spans of one match, indexed by the pattern's original group numbers.
///
/// Slot `0` is the whole match and is always set. Slots `1..=max_group` are
/// `None` when the group did not participate, which is distinct from a group
/// that matched the empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchData {
    slots: Vec<Option<ByteSpan>>,
}

impl MatchData {
    /// Allocate slots `0..=max_group` with only the whole match set.
    pub fn new(whole: ByteSpan, max_group: usize) -> Self {
        let mut slots = vec![None; max_group + 1];
        slots[0] = Some(whole);
        Self { slots }
    }

    #[inline]
    pub(crate) fn set(&mut self, group: usize, span: ByteSpan) {
        if let Some(slot) = self.slots.get_mut(group) {
            *slot = Some(span);
        }
    }

    /// `$0` span (whole match).
    #[inline]
    #[must_use]
    pub fn whole(&self) -> ByteSpan {
        // Slot 0 is populated by `new` and never cleared.
        self.slots[0].unwrap_or(ByteSpan { start: 0, end: 0 })
    }

    /// Span of `group` if the pattern defines it and it participated.
    #[inline]
    #[must_use]
    pub fn get(&self, group: usize) -> Option<ByteSpan> {
        self.slots.get(group).copied().flatten()
    }

    /// Highest group number the pattern can refer to.
    #[inline]
    #[must_use]
    pub fn max_group(&self) -> usize {
        self.slots.len() - 1
    }

    /// True if `group` is within the pattern's numbering (participating or not).
    #[inline]
    #[must_use]
    pub fn defines(&self, group: usize) -> bool {
        group < self.slots.len()
    }
}

/// Everything a replacement may look at for one match.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    haystack: &'a str,
    data: &'a MatchData,
    entry: &'a TableEntry,
    count: usize,
}

impl<'a> MatchContext<'a> {
    pub fn new(haystack: &'a str, data: &'a MatchData, entry: &'a TableEntry, count: usize) -> Self {
        Self {
            haystack,
            data,
            entry,
            count,
        }
    }

    /// Text of the whole match.
    #[must_use]
    pub fn whole(&self) -> &'a str {
        &self.haystack[self.data.whole().to_range()]
    }

    /// Text of `group` (original numbering), `None` if it did not participate.
    #[must_use]
    pub fn group(&self, group: usize) -> Option<&'a str> {
        self.data.get(group).map(|s| &self.haystack[s.to_range()])
    }

    /// Text of a named group, `None` if unknown or not participating.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&'a str> {
        self.group(self.entry.pattern.group_by_name(name)?)
    }

    /// Replacements performed so far in this operation.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &'a MatchData {
        self.data
    }

    /// The pair whose pattern produced this match.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> &'a TableEntry {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_data_distinguishes_unset_from_empty() {
        let mut data = MatchData::new(ByteSpan { start: 0, end: 3 }, 3);
        data.set(1, ByteSpan { start: 1, end: 1 });

        assert_eq!(data.whole(), ByteSpan { start: 0, end: 3 });
        assert_eq!(data.get(1), Some(ByteSpan { start: 1, end: 1 }));
        assert_eq!(data.get(2), None);
        assert!(data.defines(3));
        assert!(!data.defines(4));
        assert_eq!(data.max_group(), 3);
    }

    #[test]
    fn test_set_outside_numbering_is_ignored() {
        let mut data = MatchData::new(ByteSpan { start: 0, end: 1 }, 0);
        data.set(5, ByteSpan { start: 0, end: 1 });
        assert_eq!(data.get(5), None);
    }

    #[test]
    fn test_span_rejects_inverted_range() {
        assert!(ByteSpan::try_new(4, 2).is_err());
        assert!(ByteSpan::try_new(2, 2).is_ok_and(|s| s.is_empty()));
    }
}
