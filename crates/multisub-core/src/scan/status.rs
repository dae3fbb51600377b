//! Status text describing the pair currently being applied

use std::fmt;

use crate::engine::combine::TableEntry;

/// Which pair is active and how it is being applied.
///
/// Owned by the scan driver for the duration of one match; nothing here
/// affects matching or the inserted text.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    entry: &'a TableEntry,
    total: usize,
    regex: bool,
}

impl<'a> StatusLine<'a> {
    pub fn new(entry: &'a TableEntry, total: usize, regex: bool) -> Self {
        Self {
            entry,
            total,
            regex,
        }
    }

    /// The active pair's pattern.
    #[inline]
    #[must_use]
    pub fn from(&self) -> &'a str {
        &self.entry.from
    }
}

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.regex { "regexp" } else { "string" };
        write!(
            f,
            "replacing {kind} `{}` with `{}` (pair {} of {})",
            self.entry.from,
            self.entry.to.describe(),
            self.entry.index + 1,
            self.total
        )
    }
}
