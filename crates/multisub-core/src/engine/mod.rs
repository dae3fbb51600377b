//! Engine: normalize each pair's pattern, combine them into one alternation,
//! and decode matches of that alternation back into per-pair replacements.
//! Pure in-memory; no scanning happens here.

pub mod combine;
pub mod model;
pub mod normalize;
pub mod reconstruct;
pub mod replacer;
pub mod synthesize;
pub mod template;

pub use combine::{combine, Combined, Pair, ReplaceFn, Replacement, TableEntry};
pub use model::{ByteSpan, MatchContext, MatchData};
pub use normalize::{normalize, NormalizedPattern};
pub use reconstruct::{reconstruct, CaptureSpans};
pub use replacer::{Candidate, MultiReplacer};
pub use synthesize::{synthesize, CasePolicy, Synthesized};
pub use template::{escape_template, expand, CaseConversion, Expansion, STOP_MARKER};
