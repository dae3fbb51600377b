pub mod engine;
pub mod error;
pub mod scan;

pub use engine::{
    combine, escape_template, expand, normalize, reconstruct, synthesize, ByteSpan, Candidate,
    CaptureSpans, CaseConversion, CasePolicy, Combined, MatchContext, MatchData, MultiReplacer,
    NormalizedPattern, Pair, ReplaceFn, Replacement, Synthesized, TableEntry,
};
pub use error::{BoxError, Error, Result};
pub use scan::{
    apply_plan, plan_in_str, AbortFlag, Confirm, Decision, EditOp, Proposal, RegexEngineOpts,
    ReplaceAll, ReplacePlan, StatusLine,
};

/// Parameters for one multi-pair replace operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplaceOptions {
    /// Treat every `from` as a regex and every plain `to` as a template.
    pub regex: bool,
    /// Re-case replacements to follow the matched text (needs case-insensitive matching).
    pub preserve_case: bool,
    /// Only match whole words.
    pub delimited: bool,
    /// Byte range `[start, end)` to scan; the whole text when `None`.
    pub region: Option<(usize, usize)>,
    /// Regex compilation options.
    pub engine_opts: RegexEngineOpts,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            regex: false,
            preserve_case: true,
            delimited: false,
            region: None,
            engine_opts: RegexEngineOpts::default(),
        }
    }
}

impl ReplaceOptions {
    /// Defaults with regex mode switched on.
    pub fn regex() -> Self {
        Self {
            regex: true,
            ..Self::default()
        }
    }
}

/// Replace every match of `pairs` in `haystack` in a single pass.
pub fn replace_all(haystack: &str, pairs: Vec<Pair>, options: &ReplaceOptions) -> Result<String> {
    MultiReplacer::new(pairs, options)?.replace_all(haystack)
}

pub mod prelude {
    //! Common imports for consumers of this crate.
    pub use super::{
        replace_all, AbortFlag, Confirm, Decision, Error, MatchContext, MultiReplacer, Pair,
        Proposal, ReplaceOptions, Replacement, Result,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_deserialize_camel_case() {
        let json = r#"{
            "regex": true,
            "preserveCase": false,
            "region": [2, 8],
            "engineOpts": { "caseInsensitive": true }
        }"#;
        let options: ReplaceOptions = serde_json::from_str(json).unwrap();

        assert!(options.regex);
        assert!(!options.preserve_case);
        assert!(!options.delimited);
        assert_eq!(options.region, Some((2, 8)));
        assert!(options.engine_opts.case_insensitive);
        assert!(options.engine_opts.unicode);
    }

    #[test]
    fn test_empty_options_are_defaults() {
        let options: ReplaceOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ReplaceOptions::default());
    }
}
