//! engine/normalize.rs — flatten one user pattern into anonymous, renumbered groups
//!
//! Input dialect is the `regex` crate syntax plus explicitly numbered groups
//! `(?<N>…)` / `(?P<N>…)`. Output contains only anonymous capturing groups;
//! `group_ids[k - 1]` is the number the user's template uses for flat group `k`.
//!
//! Numbering:
//! - An explicitly numbered group takes `N`.
//! - Every other capturing group (anonymous or named) takes one more than the
//!   largest number assigned so far in the pattern.
//! - Groups are visited in order of their opening parenthesis.

use std::borrow::Cow;
use std::fmt::Write as _;

use regex_syntax::ast::parse::ParserBuilder;
use regex_syntax::ast::print::Printer;
use regex_syntax::ast::{self, Ast, GroupKind};
use regex_syntax::hir::translate::TranslatorBuilder;

use crate::error::{Error, Result};

/// Reserved capture-name prefix used to smuggle explicit numbers through the parser.
const EXPLICIT_PREFIX: &str = "__multisub_n";

/// Largest explicit group number; match data allocates one slot per number.
const MAX_EXPLICIT_GROUP: usize = u16::MAX as usize;

/// One pattern rewritten for embedding in the combined alternation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPattern {
    /// Pattern source with flat, anonymous capturing groups only.
    pub source: String,
    /// Original group number of each flat group, in flat order.
    pub group_ids: Vec<usize>,
    /// Named groups and the original number assigned to them.
    pub group_names: Vec<(String, usize)>,
}

impl NormalizedPattern {
    /// Highest original group number (0 when the pattern has no groups).
    #[inline]
    #[must_use]
    pub fn max_group(&self) -> usize {
        self.group_ids.iter().copied().max().unwrap_or(0)
    }

    /// Original number of a named group.
    #[must_use]
    pub fn group_by_name(&self, name: &str) -> Option<usize> {
        self.group_names
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, id)| id)
    }
}

/// Rewrite `pattern` for the combiner.
///
/// With `is_regex == false` the pattern is a literal and gains no groups.
pub fn normalize(pattern: &str, is_regex: bool) -> Result<NormalizedPattern> {
    if !is_regex {
        return Ok(NormalizedPattern {
            source: regex::escape(pattern),
            group_ids: Vec::new(),
            group_names: Vec::new(),
        });
    }

    let tagged = tag_explicit_groups(pattern)?;
    let syntax_error = |message: String| Error::PatternSyntax {
        pattern: pattern.to_string(),
        message,
    };

    let mut ast = ParserBuilder::new()
        .build()
        .parse(&tagged)
        .map_err(|e| syntax_error(e.kind().to_string()))?;
    // Surface class/flag errors now rather than when the combined pattern compiles.
    TranslatorBuilder::new()
        .build()
        .translate(&tagged, &ast)
        .map_err(|e| syntax_error(e.kind().to_string()))?;

    let mut numbering = Numbering::default();
    numbering.walk(&mut ast);

    let mut source = String::with_capacity(pattern.len());
    Printer::new()
        .print(&ast, &mut source)
        .map_err(|_| Error::InternalInconsistency(format!("failed to print `{pattern}`")))?;

    Ok(NormalizedPattern {
        source,
        group_ids: numbering.group_ids,
        group_names: numbering.group_names,
    })
}

#[derive(Default)]
struct Numbering {
    /// Largest original number handed out so far.
    highest: usize,
    /// Flat index of the last rewritten group.
    flat: u32,
    group_ids: Vec<usize>,
    group_names: Vec<(String, usize)>,
}

impl Numbering {
    fn walk(&mut self, ast: &mut Ast) {
        match ast {
            Ast::Group(group) => {
                self.renumber(group);
                self.walk(&mut group.ast);
            }
            Ast::Repetition(rep) => self.walk(&mut rep.ast),
            Ast::Alternation(alt) => {
                for sub in alt.asts.iter_mut() {
                    self.walk(sub);
                }
            }
            Ast::Concat(concat) => {
                for sub in concat.asts.iter_mut() {
                    self.walk(sub);
                }
            }
            _ => {}
        }
    }

    fn renumber(&mut self, group: &mut ast::Group) {
        let id = match &group.kind {
            GroupKind::NonCapturing(_) => return,
            GroupKind::CaptureIndex(_) => self.implicit(),
            GroupKind::CaptureName { name, .. } => match explicit_number(&name.name) {
                Some(n) => {
                    self.highest = self.highest.max(n);
                    n
                }
                None => {
                    let id = self.implicit();
                    self.group_names.push((name.name.clone(), id));
                    id
                }
            },
        };
        self.flat += 1;
        group.kind = GroupKind::CaptureIndex(self.flat);
        self.group_ids.push(id);
    }

    fn implicit(&mut self) -> usize {
        self.highest += 1;
        self.highest
    }
}

fn explicit_number(name: &str) -> Option<usize> {
    let (_, number) = name.strip_prefix(EXPLICIT_PREFIX)?.split_once('_')?;
    number.parse().ok()
}

/// Rewrite `(?<N>` and `(?P<N>` into reserved names the parser accepts.
///
/// Each occurrence gets a distinct name so a repeated number is not a
/// duplicate-name error.
fn tag_explicit_groups(pattern: &str) -> Result<Cow<'_, str>> {
    if !pattern.contains("(?") {
        return Ok(Cow::Borrowed(pattern));
    }

    let bytes = pattern.as_bytes();
    let mut out = String::with_capacity(pattern.len() + 32);
    let mut copied = 0usize;
    let mut seq = 0usize;
    let mut class_depth = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' => {
                class_depth += 1;
                i += 1;
                // `]` directly after `[` or `[^` is a literal.
                if bytes.get(i) == Some(&b'^') {
                    i += 1;
                }
                if bytes.get(i) == Some(&b']') {
                    i += 1;
                }
                continue;
            }
            b']' if class_depth > 0 => class_depth -= 1,
            b'(' if class_depth == 0 => {
                if let Some((digits, close)) = explicit_group_at(bytes, i) {
                    let number = &pattern[digits..close];
                    let valid = number
                        .parse::<usize>()
                        .is_ok_and(|n| (1..=MAX_EXPLICIT_GROUP).contains(&n));
                    if !valid {
                        return Err(Error::PatternSyntax {
                            pattern: pattern.to_string(),
                            message: format!("invalid explicit group number `{number}`"),
                        });
                    }
                    out.push_str(&pattern[copied..i]);
                    let _ = write!(out, "(?P<{EXPLICIT_PREFIX}{seq}_{number}>");
                    seq += 1;
                    i = close + 1;
                    copied = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if seq == 0 {
        return Ok(Cow::Borrowed(pattern));
    }
    out.push_str(&pattern[copied..]);
    Ok(Cow::Owned(out))
}

/// If `(` at `open` starts `(?<digits>` or `(?P<digits>`, return the digit
/// range start and the index of `>`.
fn explicit_group_at(bytes: &[u8], open: usize) -> Option<(usize, usize)> {
    let rest = &bytes[open + 1..];
    let prefix = if rest.starts_with(b"?P<") {
        3
    } else if rest.starts_with(b"?<") {
        2
    } else {
        return None;
    };
    let digits = open + 1 + prefix;
    let len = bytes[digits..].iter().take_while(|b| b.is_ascii_digit()).count();
    let close = digits + len;
    (len > 0 && bytes.get(close) == Some(&b'>')).then_some((digits, close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_is_escaped_without_groups() {
        let n = normalize("a.b(c)", false).unwrap();
        assert_eq!(n.source, r"a\.b\(c\)");
        assert!(n.group_ids.is_empty());
        assert_eq!(n.max_group(), 0);
    }

    #[test]
    fn test_anonymous_groups_keep_opening_order() {
        let n = normalize("(a)(b(c))", true).unwrap();
        assert_eq!(n.source, "(a)(b(c))");
        assert_eq!(n.group_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_explicit_numbers_round_trip() {
        let n = normalize("(?<2>a)(?<5>b)(?P<7>c)", true).unwrap();
        assert_eq!(n.source, "(a)(b)(c)");
        assert_eq!(n.group_ids, vec![2, 5, 7]);
        assert_eq!(n.max_group(), 7);
    }

    #[test]
    fn test_implicit_group_follows_highest_explicit() {
        let n = normalize("(?<4>a)(b)(?<2>c)(d)", true).unwrap();
        assert_eq!(n.group_ids, vec![4, 5, 2, 6]);
    }

    #[test]
    fn test_named_groups_are_stripped_and_remembered() {
        let n = normalize(r"(?P<year>\d+)-(\d+)-(?<day>\d+)", true).unwrap();
        assert_eq!(n.source, r"(\d+)-(\d+)-(\d+)");
        assert_eq!(n.group_ids, vec![1, 2, 3]);
        assert_eq!(n.group_by_name("year"), Some(1));
        assert_eq!(n.group_by_name("day"), Some(3));
        assert_eq!(n.group_by_name("month"), None);
    }

    #[test]
    fn test_non_capturing_and_nesting_pass_through() {
        let n = normalize("(?:a|(b))+((?i)c(d)?)", true).unwrap();
        assert_eq!(n.source, "(?:a|(b))+((?i)c(d)?)");
        assert_eq!(n.group_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_explicit_syntax_inside_class_is_untouched() {
        let n = normalize("[(?<2>]x", true).unwrap();
        assert!(n.group_ids.is_empty());
        assert!(n.source.contains("<2>"));
    }

    #[test]
    fn test_escaped_paren_is_not_a_group() {
        let n = normalize(r"\(?<3>x", true).unwrap();
        assert!(n.group_ids.is_empty());
    }

    #[test]
    fn test_duplicate_explicit_number_does_not_crash() {
        let n = normalize("(?<3>a)|(?<3>b)", true).unwrap();
        assert_eq!(n.source, "(a)|(b)");
        assert_eq!(n.group_ids, vec![3, 3]);
    }

    #[test]
    fn test_malformed_pattern_is_a_syntax_error() {
        let err = normalize("a(b", true).unwrap_err();
        assert!(matches!(err, Error::PatternSyntax { ref pattern, .. } if pattern == "a(b"));
    }

    #[test]
    fn test_explicit_number_upper_bound() {
        let n = normalize("(?<65535>x)(y)", true).unwrap();
        assert_eq!(n.group_ids, vec![65535, 65536]);

        for pattern in ["(?<65536>x)", "(?<18446744073709551615>x)", "(?<99999999999999999999999>x)"] {
            assert!(
                matches!(normalize(pattern, true), Err(Error::PatternSyntax { .. })),
                "{pattern}"
            );
        }
    }

    #[test]
    fn test_group_zero_is_rejected() {
        assert!(matches!(
            normalize("(?<0>x)", true),
            Err(Error::PatternSyntax { .. })
        ));
    }
}
