//! Decode one combined match back into its pair's numbering

use crate::engine::combine::TableEntry;
use crate::engine::model::{ByteSpan, MatchData};
use crate::error::{Error, Result};

/// Per-index view of a combined-pattern match.
///
/// Implemented for `regex::Captures` and for plain span slices so the decoder
/// does not depend on one matcher.
pub trait CaptureSpans {
    /// Span of capture `index`, `None` if it did not participate.
    fn span(&self, index: usize) -> Option<ByteSpan>;
}

impl CaptureSpans for regex::Captures<'_> {
    #[inline]
    fn span(&self, index: usize) -> Option<ByteSpan> {
        self.get(index).map(ByteSpan::from)
    }
}

impl CaptureSpans for [Option<ByteSpan>] {
    #[inline]
    fn span(&self, index: usize) -> Option<ByteSpan> {
        self.get(index).copied().flatten()
    }
}

/// Find the pair that matched and rebuild its match data.
///
/// The first entry (lowest base) whose base group participated wins, even if
/// the matcher reports more than one.
pub fn reconstruct<'t, C>(caps: &C, table: &'t [TableEntry]) -> Result<(&'t TableEntry, MatchData)>
where
    C: CaptureSpans + ?Sized,
{
    let (entry, whole) = table
        .iter()
        .find_map(|entry| caps.span(entry.base).map(|span| (entry, span)))
        .ok_or_else(|| {
            Error::InternalInconsistency("no base group participated in the match".to_string())
        })?;

    let mut data = MatchData::new(whole, entry.pattern.max_group());
    for (k, &id) in entry.pattern.group_ids.iter().enumerate() {
        if let Some(span) = caps.span(entry.flat_group(k + 1)) {
            data.set(id, span);
        }
    }
    Ok((entry, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::combine::{combine, Combined, Pair};
    use crate::engine::normalize::normalize;
    use pretty_assertions::assert_eq;

    fn build(froms: &[&str]) -> Combined {
        let normalized = froms
            .iter()
            .map(|&from| (Pair::text(from, "", true), normalize(from, true).unwrap()))
            .collect();
        combine(normalized).unwrap()
    }

    fn span(start: usize, end: usize) -> Option<ByteSpan> {
        Some(ByteSpan { start, end })
    }

    #[test]
    fn test_explicit_numbers_map_back() {
        let c = build(&["zz", "(?<2>a)(?<5>b)(?<7>c)"]);
        let re = regex::Regex::new(&c.pattern).unwrap();
        let caps = re.captures("xabc").unwrap();

        let (entry, data) = reconstruct(&caps, &c.table).unwrap();
        assert_eq!(entry.index, 1);
        assert_eq!(data.whole(), ByteSpan { start: 1, end: 4 });
        assert_eq!(data.get(2), span(1, 2));
        assert_eq!(data.get(5), span(2, 3));
        assert_eq!(data.get(7), span(3, 4));
        assert_eq!(data.get(1), None);
        assert_eq!(data.max_group(), 7);
    }

    #[test]
    fn test_unparticipating_group_stays_unset() {
        let c = build(&["(a)(b)?"]);
        let re = regex::Regex::new(&c.pattern).unwrap();
        let caps = re.captures("a").unwrap();

        let (_, data) = reconstruct(&caps, &c.table).unwrap();
        assert_eq!(data.get(1), span(0, 1));
        assert_eq!(data.get(2), None);
        assert!(data.defines(2));
    }

    #[test]
    fn test_lowest_base_wins_when_several_participate() {
        let c = build(&["(x)", "(x)x"]);
        // Simulated matcher reporting both alternatives at once.
        let caps = [span(0, 1), span(0, 1), span(0, 1), span(0, 2), span(0, 1)];

        let (entry, data) = reconstruct(&caps[..], &c.table).unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(data.whole(), ByteSpan { start: 0, end: 1 });
    }

    #[test]
    fn test_later_entry_selected_when_earlier_absent() {
        let c = build(&["(x)", "(y)(z)?"]);
        let caps = [span(0, 1), None, None, span(0, 1), span(0, 1), None];

        let (entry, data) = reconstruct(&caps[..], &c.table).unwrap();
        assert_eq!(entry.index, 1);
        assert_eq!(data.get(1), span(0, 1));
        assert_eq!(data.get(2), None);
    }

    #[test]
    fn test_no_participating_base_is_inconsistent() {
        let c = build(&["a", "b"]);
        let caps = [span(0, 1), None, None];
        assert!(matches!(
            reconstruct(&caps[..], &c.table),
            Err(Error::InternalInconsistency(_))
        ));
    }
}
