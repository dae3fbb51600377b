//! Turn one reconstructed match into replacement text
//!
//! Literal and template output is escaped template text: the scan driver's
//! own expansion pass turns it back into exactly one round of substitution,
//! with `\?` left intact as the next-stop marker. Dynamic output is marked
//! `verbatim` and must be inserted as-is.

use crate::engine::combine::Replacement;
use crate::engine::model::MatchContext;
use crate::engine::template::{escape_template, expand, CaseConversion};
use crate::error::{Error, Result};

/// Replacement text for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub text: String,
    /// True when `text` must bypass the driver's expansion pass.
    pub verbatim: bool,
}

/// When replacement text follows the case of the matched text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CasePolicy {
    /// Preserve case at all (only meaningful with case-insensitive matching).
    pub preserve_case: bool,
    /// Patterns are regexes; escaped characters do not count as upper case.
    pub regex: bool,
}

impl CasePolicy {
    /// Conversion for this match; `Fixed` if the pair's pattern has upper case.
    pub fn conversion_for(&self, ctx: &MatchContext<'_>) -> CaseConversion {
        if !self.preserve_case || has_upper_case(&ctx.entry().from, self.regex) {
            return CaseConversion::Fixed;
        }
        CaseConversion::infer(ctx.whole())
    }
}

fn has_upper_case(pattern: &str, regex: bool) -> bool {
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if regex && c == '\\' {
            chars.next();
            continue;
        }
        if c.is_uppercase() {
            return true;
        }
    }
    false
}

/// Produce replacement text for the pair that matched.
pub fn synthesize(ctx: &MatchContext<'_>, policy: &CasePolicy) -> Result<Synthesized> {
    match &ctx.entry().to {
        Replacement::Literal(text) => {
            let cased = policy.conversion_for(ctx).apply(text);
            Ok(Synthesized {
                text: escape_template(&cased).into_owned(),
                verbatim: false,
            })
        }
        Replacement::Template(template) => {
            let expansion = expand(template, ctx, policy.conversion_for(ctx))?;
            Ok(Synthesized {
                text: expansion.to_escaped(),
                verbatim: false,
            })
        }
        Replacement::Dynamic(callback) => {
            let text = callback
                .replace(ctx, ctx.count())
                .map_err(Error::Callback)?;
            Ok(Synthesized {
                text,
                verbatim: true,
            })
        }
    }
}
