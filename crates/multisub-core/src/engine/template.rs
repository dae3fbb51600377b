//! engine/template.rs — back-reference expansion and escaping for replacement text
//!
//! Escapes understood by `expand`:
//! - `\0`..`\9`, `\{N}`: group by original number
//! - `\{name}`: named group
//! - `\&`: whole match
//! - `\#`: replacements made so far
//! - `\\`: one backslash
//! - `\?`: next-stop marker (splits the output into segments)
//!
//! A defined group that did not participate expands to nothing; an undefined
//! one is an error.

use std::borrow::Cow;

use memchr::memchr;

use crate::engine::model::MatchContext;
use crate::error::{Error, Result};

/// Marker the scan driver treats as "pause here".
pub const STOP_MARKER: &str = "\\?";

/// How replacement text is re-cased to follow the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseConversion {
    /// Insert as written.
    #[default]
    Fixed,
    /// Upper-case the whole replacement.
    Upper,
    /// Upper-case the first letter of every word.
    Capitalize,
}

impl CaseConversion {
    /// Pick a conversion from the case pattern of `matched`.
    ///
    /// All-caps text with a word of two or more letters gives `Upper`; text whose
    /// words all start with an upper-case letter gives `Capitalize`.
    pub fn infer(matched: &str) -> Self {
        let mut any_letter = false;
        let mut any_lower = false;
        let mut long_word = false;
        let mut lower_initial = false;

        for word in words(matched) {
            let Some(first) = word.chars().find(|c| c.is_alphabetic()) else {
                continue;
            };
            any_letter = true;
            lower_initial |= first.is_lowercase();
            any_lower |= word.chars().any(char::is_lowercase);
            long_word |= word.chars().filter(|c| c.is_alphabetic()).nth(1).is_some();
        }

        if !any_letter {
            CaseConversion::Fixed
        } else if !any_lower && long_word {
            CaseConversion::Upper
        } else if !lower_initial {
            CaseConversion::Capitalize
        } else {
            CaseConversion::Fixed
        }
    }

    pub fn apply<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            CaseConversion::Fixed => Cow::Borrowed(text),
            CaseConversion::Upper => Cow::Owned(text.to_uppercase()),
            CaseConversion::Capitalize => {
                let mut out = String::with_capacity(text.len());
                capitalize_into(text, &mut out, &mut false);
                Cow::Owned(out)
            }
        }
    }

    /// Convert stop-separated segments as one text, so a word split by a
    /// stop marker is still one word.
    fn apply_segments(self, segments: Vec<String>) -> Vec<String> {
        match self {
            CaseConversion::Fixed => segments,
            CaseConversion::Upper => segments.iter().map(|s| s.to_uppercase()).collect(),
            CaseConversion::Capitalize => {
                let mut in_word = false;
                segments
                    .iter()
                    .map(|s| {
                        let mut out = String::with_capacity(s.len());
                        capitalize_into(s, &mut out, &mut in_word);
                        out
                    })
                    .collect()
            }
        }
    }
}

/// Upper-case word initials of `text` into `out`; `in_word` carries over between calls.
fn capitalize_into(text: &str, out: &mut String, in_word: &mut bool) {
    for c in text.chars() {
        if c.is_alphanumeric() {
            if *in_word {
                out.push(c);
            } else {
                out.extend(c.to_uppercase());
            }
            *in_word = true;
        } else {
            out.push(c);
            *in_word = false;
        }
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Output of one expansion: text pieces separated by next-stop markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    segments: Vec<String>,
}

impl Expansion {
    /// The expanded text with stop markers removed.
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.concat()
    }

    /// Byte offsets within `text()` where a stop marker stood.
    #[must_use]
    pub fn stop_offsets(&self) -> Vec<usize> {
        self.segments
            .iter()
            .take(self.segments.len() - 1)
            .scan(0usize, |offset, seg| {
                *offset += seg.len();
                Some(*offset)
            })
            .collect()
    }

    /// Re-encode as template text that expands back to this expansion.
    #[must_use]
    pub fn to_escaped(&self) -> String {
        self.segments
            .iter()
            .map(|s| escape_template(s))
            .collect::<Vec<_>>()
            .join(STOP_MARKER)
    }
}

/// Expand `template` against one match, applying `case` to every segment.
pub fn expand(template: &str, ctx: &MatchContext<'_>, case: CaseConversion) -> Result<Expansion> {
    if memchr(b'\\', template.as_bytes()).is_none() {
        return Ok(Expansion {
            segments: vec![case.apply(template).into_owned()],
        });
    }

    let invalid = |position: usize, reason: String| Error::InvalidTemplate {
        template: template.to_string(),
        position,
        reason,
    };

    let mut segments = Vec::new();
    let mut current = String::with_capacity(template.len());
    let mut chars = template.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            current.push(c);
            continue;
        }
        let Some((_, next)) = chars.next() else {
            return Err(invalid(pos, "trailing backslash".to_string()));
        };
        match next {
            '\\' => current.push('\\'),
            '&' => current.push_str(ctx.whole()),
            '#' => current.push_str(&ctx.count().to_string()),
            '?' => segments.push(std::mem::take(&mut current)),
            '0'..='9' => {
                let group = next as usize - '0' as usize;
                current.push_str(group_text(ctx, group).ok_or_else(|| {
                    invalid(pos, format!("no group {group} in `{}`", ctx.entry().from))
                })?);
            }
            '{' => {
                let rest = &template[pos + 2..];
                let Some(close) = rest.find('}') else {
                    return Err(invalid(pos, "unterminated `\\{`".to_string()));
                };
                let reference = &rest[..close];
                let text = match reference.parse::<usize>() {
                    Ok(group) => group_text(ctx, group),
                    Err(_) => ctx
                        .entry()
                        .pattern
                        .group_by_name(reference)
                        .map(|group| ctx.group(group).unwrap_or("")),
                };
                current.push_str(text.ok_or_else(|| {
                    invalid(pos, format!("no group `{reference}` in `{}`", ctx.entry().from))
                })?);
                // Skip the reference and the closing brace.
                for _ in reference.chars() {
                    chars.next();
                }
                chars.next();
            }
            other => return Err(invalid(pos, format!("unknown escape `\\{other}`"))),
        }
    }
    segments.push(current);

    Ok(Expansion {
        segments: case.apply_segments(segments),
    })
}

/// Group text for a defined group; empty when it did not participate.
fn group_text<'a>(ctx: &MatchContext<'a>, group: usize) -> Option<&'a str> {
    ctx.data()
        .defines(group)
        .then(|| ctx.group(group).unwrap_or(""))
}

/// Double every backslash so `expand` reproduces `text` verbatim.
pub fn escape_template(text: &str) -> Cow<'_, str> {
    if memchr(b'\\', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace('\\', "\\\\"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::combine::{combine, Combined, Pair};
    use crate::engine::model::MatchData;
    use crate::engine::normalize::normalize;
    use crate::engine::reconstruct::reconstruct;
    use pretty_assertions::assert_eq;

    fn build(from: &str) -> Combined {
        combine(vec![(Pair::text(from, "", true), normalize(from, true).unwrap())]).unwrap()
    }

    fn expand_on(from: &str, haystack: &str, template: &str) -> Result<Expansion> {
        let c = build(from);
        let re = regex::Regex::new(&c.pattern).unwrap();
        let caps = re.captures(haystack).unwrap();
        let (entry, data): (_, MatchData) = reconstruct(&caps, &c.table).unwrap();
        let ctx = MatchContext::new(haystack, &data, entry, 3);
        expand(template, &ctx, CaseConversion::Fixed)
    }

    #[test]
    fn test_numbered_named_and_whole_references() {
        let e = expand_on(r"(?P<k>\w+)=(\w+)", "key=val", r"\2:\{k}[\&]#\#").unwrap();
        assert_eq!(e.text(), "val:key[key=val]#3");
    }

    #[test]
    fn test_braced_number_and_explicit_groups() {
        let e = expand_on("(?<12>a)(b)", "ab", r"\{13}\{12}").unwrap();
        assert_eq!(e.text(), "ba");
    }

    #[test]
    fn test_unparticipating_group_expands_empty() {
        let e = expand_on("(a)(b)?", "a", r"<\1\2>").unwrap();
        assert_eq!(e.text(), "<a>");
    }

    #[test]
    fn test_stop_marker_splits_segments() {
        let e = expand_on("(a)", "a", r"x\?y\1\?").unwrap();
        assert_eq!(e.text(), "xya");
        assert_eq!(e.stop_offsets(), vec![1, 3]);
        assert_eq!(e.to_escaped(), r"x\?ya\?");
    }

    #[test]
    fn test_escaped_backslash_survives_second_pass() {
        let first = expand_on("p", "p", r"C:\\path").unwrap();
        assert_eq!(first.text(), r"C:\path");

        let escaped = first.to_escaped();
        assert_eq!(escaped, r"C:\\path");
        let second = expand_on("p", "p", &escaped).unwrap();
        assert_eq!(second.text(), r"C:\path");
    }

    #[test]
    fn test_invalid_templates_are_rejected() {
        for bad in [r"\3", r"oops\", r"\q", r"\{nope}", r"\{1"] {
            let err = expand_on("(a)", "a", bad).unwrap_err();
            assert!(matches!(err, Error::InvalidTemplate { .. }), "{bad}");
        }
    }

    #[test]
    fn test_case_inference() {
        assert_eq!(CaseConversion::infer("HELLO world"), CaseConversion::Fixed);
        assert_eq!(CaseConversion::infer("HELLO"), CaseConversion::Upper);
        assert_eq!(CaseConversion::infer("Hello World"), CaseConversion::Capitalize);
        assert_eq!(CaseConversion::infer("A"), CaseConversion::Capitalize);
        assert_eq!(CaseConversion::infer("hello"), CaseConversion::Fixed);
        assert_eq!(CaseConversion::infer("42"), CaseConversion::Fixed);
    }

    #[test]
    fn test_capitalize_spans_stop_marker() {
        let c = build("(cat)");
        let re = regex::Regex::new(&c.pattern).unwrap();
        let caps = re.captures("cat").unwrap();
        let (entry, data): (_, MatchData) = reconstruct(&caps, &c.table).unwrap();
        let ctx = MatchContext::new("cat", &data, entry, 0);

        let e = expand(r"fo\?o bar", &ctx, CaseConversion::Capitalize).unwrap();
        assert_eq!(e.text(), "Foo Bar");
        assert_eq!(e.stop_offsets(), vec![2]);
    }

    #[test]
    fn test_case_application() {
        assert_eq!(CaseConversion::Upper.apply("new cat"), "NEW CAT");
        assert_eq!(CaseConversion::Capitalize.apply("new cat"), "New Cat");
        assert_eq!(CaseConversion::Fixed.apply("new cat"), "new cat");
    }
}
