use crate::error::Result;
use regex::{Captures, Regex, RegexBuilder};

/// Configuration options for compiling the combined pattern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegexEngineOpts {
    /// Case-insensitive ("i")
    pub case_insensitive: bool,
    /// Unicode classes/word boundaries
    pub unicode: bool,
    /// CRLF anchor semantics (affects ^/$ around \r\n)
    pub crlf: bool,
    /// Anchor-multiline ("m"): ^/$ match at internal line boundaries
    pub anchor_multiline: bool,
    /// Dot-all ("s"): `.` matches `\n`
    pub dot_matches_new_line: bool,
}

impl Default for RegexEngineOpts {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            unicode: true,
            crlf: false,
            anchor_multiline: false,
            dot_matches_new_line: false,
        }
    }
}

/// Thin wrapper around the compiled combined pattern.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    inner: Regex,
}

impl RegexMatcher {
    /// Compile `pattern`; `delimited` restricts matches to whole words.
    pub fn compile(pattern: &str, opts: &RegexEngineOpts, delimited: bool) -> Result<Self> {
        // Non-capturing wrapper keeps every capture index unchanged.
        let source = if delimited {
            format!(r"\b(?:{pattern})\b")
        } else {
            pattern.to_string()
        };

        let inner = RegexBuilder::new(&source)
            .case_insensitive(opts.case_insensitive)
            .unicode(opts.unicode)
            .crlf(opts.crlf)
            .multi_line(opts.anchor_multiline)
            .dot_matches_new_line(opts.dot_matches_new_line)
            .build()?;
        Ok(Self { inner })
    }

    /// Leftmost-first match starting the search at `start`.
    ///
    /// Text before `start` is still visible to anchors and word boundaries.
    #[inline]
    pub fn captures_at<'h>(&self, haystack: &'h str, start: usize) -> Option<Captures<'h>> {
        self.inner.captures_at(haystack, start)
    }
}
