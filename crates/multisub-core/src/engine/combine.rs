//! Pairs, replacement specs and the combined alternation
//!
//! Each pair's normalized pattern is wrapped in one capturing "base" group:
//! `(p1)|(p2)|…`. Pair `i` owns groups `base_i ..= base_i + len(group_ids_i)`;
//! the ranges are disjoint, strictly increasing and leave no gaps.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::model::MatchContext;
use crate::engine::normalize::NormalizedPattern;
use crate::error::{BoxError, Error, Result};

/// Callback computing replacement text from a match.
///
/// Receives the reconstructed match and the number of replacements made so
/// far. Any state the callback needs is captured by the implementor.
pub trait ReplaceFn: Send + Sync {
    fn replace(&self, ctx: &MatchContext<'_>, count: usize) -> std::result::Result<String, BoxError>;
}

impl<F> ReplaceFn for F
where
    F: Fn(&MatchContext<'_>, usize) -> std::result::Result<String, BoxError> + Send + Sync,
{
    fn replace(&self, ctx: &MatchContext<'_>, count: usize) -> std::result::Result<String, BoxError> {
        self(ctx, count)
    }
}

/// What to insert for a match.
#[derive(Clone)]
pub enum Replacement {
    /// Inserted verbatim; backslashes carry no meaning.
    Literal(String),
    /// Expanded against the match: `\N`, `\{N}`, `\{name}`, `\&`, `\#`, `\\`, `\?`.
    Template(String),
    /// Computed per match; the returned text is inserted exactly as returned.
    Dynamic(Arc<dyn ReplaceFn>),
}

impl Replacement {
    /// Plain replacement text: a template in regex mode, a literal otherwise.
    pub fn infer(text: impl Into<String>, regex: bool) -> Self {
        if regex {
            Replacement::Template(text.into())
        } else {
            Replacement::Literal(text.into())
        }
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&MatchContext<'_>, usize) -> std::result::Result<String, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Replacement::Dynamic(Arc::new(f))
    }

    /// Short human-readable form for status text.
    #[must_use]
    pub fn describe(&self) -> Cow<'_, str> {
        match self {
            Replacement::Literal(s) | Replacement::Template(s) => Cow::Borrowed(s),
            Replacement::Dynamic(_) => Cow::Borrowed("<computed>"),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Replacement::Template(s) => f.debug_tuple("Template").field(s).finish(),
            Replacement::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// One (pattern, replacement) rule.
#[derive(Debug, Clone)]
pub struct Pair {
    pub from: String,
    pub to: Replacement,
}

impl Pair {
    pub fn new(from: impl Into<String>, to: Replacement) -> Self {
        Self {
            from: from.into(),
            to,
        }
    }

    /// Pair whose replacement kind follows the operation's regex flag.
    pub fn text(from: impl Into<String>, to: impl Into<String>, regex: bool) -> Self {
        Self::new(from, Replacement::infer(to, regex))
    }
}

/// A pair placed in the combined pattern.
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// Capture index of the group wrapping this pair's pattern.
    pub base: usize,
    /// Position of the pair in the input list.
    pub index: usize,
    pub from: String,
    pub to: Replacement,
    pub pattern: NormalizedPattern,
}

impl TableEntry {
    /// Combined-pattern capture index of flat group `k` (1-based).
    #[inline]
    #[must_use]
    pub fn flat_group(&self, k: usize) -> usize {
        self.base + k
    }
}

/// The alternation of all pairs plus the table used to decode its matches.
#[derive(Debug, Clone)]
pub struct Combined {
    pub pattern: String,
    /// Entries in input (priority) order.
    pub table: Vec<TableEntry>,
}

/// Build the combined alternation from already-normalized pairs.
pub fn combine(normalized: Vec<(Pair, NormalizedPattern)>) -> Result<Combined> {
    if normalized.is_empty() {
        return Err(Error::NoPairs);
    }

    let mut pattern = String::new();
    let mut table = Vec::with_capacity(normalized.len());
    let mut counter = 1usize;

    for (index, (pair, norm)) in normalized.into_iter().enumerate() {
        if index > 0 {
            pattern.push('|');
        }
        pattern.push('(');
        pattern.push_str(&norm.source);
        pattern.push(')');

        let base = counter;
        counter += 1 + norm.group_ids.len();
        table.push(TableEntry {
            base,
            index,
            from: pair.from,
            to: pair.to,
            pattern: norm,
        });
    }

    debug!(pairs = table.len(), groups = counter - 1, %pattern, "combined patterns");
    Ok(Combined { pattern, table })
}
