//! scan/replace.rs — build and apply a replace plan for a multi-pair operation.
//!
//! The text is scanned once with the combined pattern. Each match is decoded,
//! offered to a `Confirm` strategy and, if accepted, recorded as an `EditOp`.
//! Scanning resumes after the match in the *original* text, so inserted text is
//! never matched again.

use tracing::{debug, trace};

use crate::engine::model::{ByteSpan, MatchContext};
use crate::engine::replacer::MultiReplacer;
use crate::engine::template::{expand, CaseConversion};
use crate::error::{Error, Result};
use crate::scan::abort::AbortFlag;
use crate::scan::status::StatusLine;

/// One concrete edit to apply to the haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    /// Absolute byte range to replace (half-open).
    pub span: ByteSpan,
    /// Text to insert.
    pub replacement: String,
    /// Input position of the pair that matched.
    pub pair: usize,
    /// Offsets within `replacement` where a next-stop marker stood.
    pub stops: Vec<usize>,
}

/// A set of non-overlapping, start-sorted edits.
#[derive(Debug, Clone, Default)]
pub struct ReplacePlan {
    pub ops: Vec<EditOp>,
}

impl ReplacePlan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Next-stop positions as byte offsets into the output of `apply_plan`.
    pub fn output_stops(&self) -> Vec<usize> {
        let mut delta = 0isize;
        let mut out = Vec::new();
        for op in &self.ops {
            let start = op.span.start.saturating_add_signed(delta);
            out.extend(op.stops.iter().map(|s| start + s));
            delta += op.replacement.len() as isize - (op.span.end - op.span.start) as isize;
        }
        out
    }
}

/// A match offered for confirmation.
#[derive(Debug)]
pub struct Proposal<'a> {
    pub span: ByteSpan,
    pub matched: &'a str,
    pub replacement: &'a str,
    pub status: StatusLine<'a>,
}

/// Answer to a `Proposal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Replace,
    Skip,
    /// Replace this and every later match without asking.
    ReplaceRest,
    /// Stop scanning; edits accepted so far are kept.
    Quit,
}

/// Confirmation policy consulted once per match.
pub trait Confirm {
    fn decide(&mut self, proposal: &Proposal<'_>) -> Decision;
}

/// Accept every match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceAll;

impl Confirm for ReplaceAll {
    fn decide(&mut self, _: &Proposal<'_>) -> Decision {
        Decision::Replace
    }
}

impl<F> Confirm for F
where
    F: FnMut(&Proposal<'_>) -> Decision,
{
    fn decide(&mut self, proposal: &Proposal<'_>) -> Decision {
        self(proposal)
    }
}

/// Build a replace plan over `haystack`.
pub fn plan_in_str(
    haystack: &str,
    replacer: &MultiReplacer,
    confirm: &mut dyn Confirm,
    abort: &AbortFlag,
) -> Result<ReplacePlan> {
    let region = scan_region(haystack, replacer.options().region)?;
    let bounded = &haystack[..region.end];
    let total = replacer.table().len();
    let regex = replacer.options().regex;

    let mut ops: Vec<EditOp> = Vec::new();
    let mut asking = true;
    let mut at = region.start;
    let mut last_end: Option<usize> = None;

    while at <= bounded.len() {
        abort.check().inspect_err(|_| debug!(edits = ops.len(), "replace aborted"))?;
        let Some(caps) = replacer.matcher().captures_at(bounded, at) else {
            break;
        };
        let Some(whole) = caps.get(0).map(ByteSpan::from) else {
            break;
        };

        // An empty match touching the previous match is not a new occurrence.
        if whole.is_empty() && last_end == Some(whole.start) {
            match next_boundary(bounded, whole.start) {
                Some(next) => {
                    at = next;
                    continue;
                }
                None => break,
            }
        }

        let candidate = replacer.candidate(haystack, &caps, ops.len())?;
        let (replacement, stops) = if candidate.synthesized.verbatim {
            (candidate.synthesized.text, Vec::new())
        } else {
            let ctx = MatchContext::new(haystack, &candidate.data, candidate.entry, ops.len());
            let expansion = expand(&candidate.synthesized.text, &ctx, CaseConversion::Fixed)?;
            (expansion.text(), expansion.stop_offsets())
        };

        let status = StatusLine::new(candidate.entry, total, regex);
        let decision = if asking {
            confirm.decide(&Proposal {
                span: whole,
                matched: &haystack[whole.to_range()],
                replacement: &replacement,
                status,
            })
        } else {
            Decision::Replace
        };
        trace!(%status, start = whole.start, end = whole.end, ?decision, "match");

        match decision {
            Decision::Quit => {
                debug!(edits = ops.len(), "replace stopped by confirmation");
                break;
            }
            Decision::Skip => {}
            Decision::Replace | Decision::ReplaceRest => {
                asking &= decision == Decision::Replace;
                ops.push(EditOp {
                    span: whole,
                    replacement,
                    pair: candidate.entry.index,
                    stops,
                });
            }
        }

        last_end = Some(whole.end);
        at = if whole.is_empty() {
            match next_boundary(bounded, whole.end) {
                Some(next) => next,
                None => break,
            }
        } else {
            whole.end
        };
    }

    // Matches come from one forward scan that never moves backwards, so the
    // ops are sorted and disjoint. Verify in debug builds.
    #[cfg(debug_assertions)]
    {
        for i in 1..ops.len() {
            if ops[i].span.start < ops[i - 1].span.end {
                panic!(
                    "Unexpected overlap: op[{}] starts at {} but op[{}] ends at {}",
                    i,
                    ops[i].span.start,
                    i - 1,
                    ops[i - 1].span.end
                );
            }
        }
    }

    Ok(ReplacePlan { ops })
}

/// Apply a previously built plan to `haystack` in a single pass.
///
/// If the plan is empty, returns a copy of the input.
pub fn apply_plan(haystack: &str, plan: &ReplacePlan) -> String {
    if plan.ops.is_empty() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());

    let mut cursor = 0usize;
    for op in &plan.ops {
        if op.span.start > cursor {
            out.push_str(&haystack[cursor..op.span.start]);
        }
        out.push_str(&op.replacement);
        cursor = op.span.end;
    }

    if cursor < haystack.len() {
        out.push_str(&haystack[cursor..]);
    }
    out
}

/// Validate the optional scan region against `haystack`.
fn scan_region(haystack: &str, region: Option<(usize, usize)>) -> Result<ByteSpan> {
    let Some((start, end)) = region else {
        return Ok(ByteSpan {
            start: 0,
            end: haystack.len(),
        });
    };
    let span = ByteSpan::try_new(start, end)?;
    if end > haystack.len() || !haystack.is_char_boundary(start) || !haystack.is_char_boundary(end) {
        return Err(Error::InvalidRange(start, end));
    }
    Ok(span)
}

fn next_boundary(text: &str, at: usize) -> Option<usize> {
    text[at..].chars().next().map(|c| at + c.len_utf8())
}
