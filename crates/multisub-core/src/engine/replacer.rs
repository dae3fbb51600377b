//! One multi-pair replace operation, ready for scanning

use tracing::debug;

use crate::engine::combine::{combine, Combined, Pair, TableEntry};
use crate::engine::model::{MatchContext, MatchData};
use crate::engine::normalize::normalize;
use crate::engine::reconstruct::{reconstruct, CaptureSpans};
use crate::engine::synthesize::{synthesize, CasePolicy, Synthesized};
use crate::error::Result;
use crate::scan::abort::AbortFlag;
use crate::scan::matcher::RegexMatcher;
use crate::scan::replace::{apply_plan, plan_in_str, ReplaceAll};
use crate::ReplaceOptions;

/// Replacement proposed for one match of the combined pattern.
#[derive(Debug)]
pub struct Candidate<'r> {
    pub entry: &'r TableEntry,
    pub data: MatchData,
    pub synthesized: Synthesized,
}

/// Combined pattern, decode table and compiled matcher for one operation.
///
/// Built once before scanning; immutable afterwards.
#[derive(Debug, Clone)]
pub struct MultiReplacer {
    combined: Combined,
    matcher: RegexMatcher,
    policy: CasePolicy,
    options: ReplaceOptions,
}

impl MultiReplacer {
    /// Normalize and combine `pairs`, then compile the result.
    ///
    /// Any malformed pattern fails the whole operation before scanning starts.
    pub fn new(pairs: Vec<Pair>, options: &ReplaceOptions) -> Result<Self> {
        let normalized = pairs
            .into_iter()
            .map(|pair| {
                let norm = normalize(&pair.from, options.regex)?;
                Ok((pair, norm))
            })
            .collect::<Result<Vec<_>>>()?;

        let combined = combine(normalized)?;
        let matcher = RegexMatcher::compile(&combined.pattern, &options.engine_opts, options.delimited)?;
        let policy = CasePolicy {
            preserve_case: options.preserve_case && options.engine_opts.case_insensitive,
            regex: options.regex,
        };
        debug!(
            pairs = combined.table.len(),
            regex = options.regex,
            delimited = options.delimited,
            "replacer ready"
        );

        Ok(Self {
            combined,
            matcher,
            policy,
            options: options.clone(),
        })
    }

    /// Combined pattern in `regex` syntax.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.combined.pattern
    }

    /// Decode table in priority order.
    #[inline]
    #[must_use]
    pub fn table(&self) -> &[TableEntry] {
        &self.combined.table
    }

    #[inline]
    #[must_use]
    pub fn matcher(&self) -> &RegexMatcher {
        &self.matcher
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &ReplaceOptions {
        &self.options
    }

    /// Per-match hook for the scan driver: decode `caps` and build the replacement.
    ///
    /// `count` is the number of replacements already made in this operation.
    pub fn candidate<C>(&self, haystack: &str, caps: &C, count: usize) -> Result<Candidate<'_>>
    where
        C: CaptureSpans + ?Sized,
    {
        let (entry, data) = reconstruct(caps, self.table())?;
        let synthesized = synthesize(&MatchContext::new(haystack, &data, entry, count), &self.policy)?;
        Ok(Candidate {
            entry,
            data,
            synthesized,
        })
    }

    /// Replace every match in `haystack` without confirmation.
    pub fn replace_all(&self, haystack: &str) -> Result<String> {
        let plan = plan_in_str(haystack, self, &mut ReplaceAll, &AbortFlag::new())?;
        Ok(apply_plan(haystack, &plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::combine::Replacement;
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bad_pattern_fails_before_scanning() {
        let pairs = vec![Pair::text("ok", "x", true), Pair::text("(broken", "y", true)];
        let err = MultiReplacer::new(pairs, &ReplaceOptions::regex()).unwrap_err();
        assert!(matches!(err, Error::PatternSyntax { ref pattern, .. } if pattern == "(broken"));
    }

    #[test]
    fn test_candidate_reports_pair_and_text() {
        let pairs = vec![
            Pair::text("x+", "many", true),
            Pair::new("(?<3>y)", Replacement::Template(r"<\3>".to_string())),
        ];
        let r = MultiReplacer::new(pairs, &ReplaceOptions::regex()).unwrap();
        assert_eq!(r.pattern(), "(x+)|((y))");

        let caps = r.matcher().captures_at("ay", 0).unwrap();
        let cand = r.candidate("ay", &caps, 0).unwrap();
        assert_eq!(cand.entry.index, 1);
        assert_eq!(cand.synthesized.text, "<y>");
    }

    #[test]
    fn test_case_preservation_needs_case_insensitive_matching() {
        let pairs = vec![Pair::text("cat", "dog", false)];
        let mut options = ReplaceOptions {
            preserve_case: true,
            ..ReplaceOptions::default()
        };
        let r = MultiReplacer::new(pairs.clone(), &options).unwrap();
        assert_eq!(r.replace_all("cat CAT").unwrap(), "dog CAT");

        options.engine_opts.case_insensitive = true;
        let r = MultiReplacer::new(pairs, &options).unwrap();
        assert_eq!(r.replace_all("cat CAT Cat").unwrap(), "dog DOG Dog");
    }
}
