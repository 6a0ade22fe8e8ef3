// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Percentage ranking of a language histogram.
//!
//! Rankings are sorted by share descending with the language name as a
//! secondary key, so identical histograms always produce identical cards.

use std::cmp::Ordering;

use serde::Serialize;

use crate::languages::LanguageHistogram;

/// Display name of the synthetic bucket that collects the collapsed tail.
pub const OTHER_LANGUAGE: &str = "<other>";

/// One language and its share of the total byte count.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct RankedEntry
{
    /// Language name as reported by GitHub.
    pub language:   String,
    /// Share of the total in `[0, 1]`.
    pub percentage: f64,
}

/// Languages beyond the visible rows, merged into one bucket.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct OverflowEntry
{
    /// Sum of the merged shares.
    pub percentage: f64,
    /// Merged languages in ranking order.
    pub languages:  Vec<String,>,
}

impl OverflowEntry
{
    /// Name used when the bucket is displayed.
    pub fn label(&self,) -> &'static str
    {
        OTHER_LANGUAGE
    }
}

/// Ranking split into individually drawn rows and an optional tail bucket.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct CollapsedRanking
{
    /// Leading entries, unchanged.
    pub visible:  Vec<RankedEntry,>,
    /// Remaining entries, absent when nothing was collapsed.
    pub overflow: Option<OverflowEntry,>,
}

/// Ranks a histogram by share, largest first.
///
/// Returns an empty ranking when the total byte count is zero.
///
/// # Examples
///
/// ```
/// use ghcard::{LanguageHistogram, rank};
///
/// let histogram: LanguageHistogram = [("Go", 150,), ("JS", 50,),].into_iter().collect();
/// let ranking = rank(&histogram,);
/// assert_eq!(ranking[0].language, "Go");
/// assert_eq!(ranking[0].percentage, 0.75);
/// assert_eq!(ranking[1].percentage, 0.25);
/// ```
pub fn rank(histogram: &LanguageHistogram,) -> Vec<RankedEntry,>
{
    let total = histogram.total();
    if total == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedEntry,> = histogram
        .iter()
        .map(|(language, bytes,)| RankedEntry {
            language:   language.clone(),
            percentage: *bytes as f64 / total as f64,
        },)
        .collect();

    ranked.sort_by(|left, right| {
        right
            .percentage
            .partial_cmp(&left.percentage,)
            .unwrap_or(Ordering::Equal,)
            .then_with(|| left.language.cmp(&right.language,),)
    },);

    ranked
}

/// Keeps the first `keep` entries and merges the rest into one bucket.
///
/// # Examples
///
/// ```
/// use ghcard::{RankedEntry, collapse_tail};
///
/// let ranked = vec![
///     RankedEntry { language: "Rust".to_owned(), percentage: 0.5 },
///     RankedEntry { language: "Go".to_owned(), percentage: 0.3 },
///     RankedEntry { language: "C".to_owned(), percentage: 0.2 },
/// ];
/// let collapsed = collapse_tail(ranked, 1,);
/// assert_eq!(collapsed.visible.len(), 1);
/// let overflow = collapsed.overflow.expect("tail collapsed",);
/// assert_eq!(overflow.languages, vec!["Go", "C"]);
/// ```
pub fn collapse_tail(mut ranked: Vec<RankedEntry,>, keep: usize,) -> CollapsedRanking
{
    if keep >= ranked.len() {
        return CollapsedRanking {
            visible: ranked, overflow: None,
        };
    }

    let tail = ranked.split_off(keep,);
    let overflow = OverflowEntry {
        percentage: tail.iter().map(|entry| entry.percentage,).sum(),
        languages:  tail.into_iter().map(|entry| entry.language,).collect(),
    };

    CollapsedRanking {
        visible: ranked, overflow: Some(overflow,),
    }
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::{OTHER_LANGUAGE, RankedEntry, collapse_tail, rank};
    use crate::languages::LanguageHistogram;

    fn histogram(entries: &[(&str, u64,)],) -> LanguageHistogram
    {
        entries.iter().map(|(language, bytes,)| (*language, *bytes,),).collect()
    }

    #[test]
    fn empty_or_zero_histogram_ranks_to_nothing()
    {
        assert!(rank(&LanguageHistogram::new()).is_empty());
        assert!(rank(&histogram(&[("Go", 0,)],)).is_empty());
    }

    #[test]
    fn shares_are_sorted_descending()
    {
        let ranked = rank(&histogram(&[("C", 10,), ("Rust", 60,), ("Go", 30,)],),);
        let names: Vec<&str,> = ranked.iter().map(|entry| entry.language.as_str(),).collect();

        assert_eq!(names, vec!["Rust", "Go", "C"]);
        assert!((ranked[0].percentage - 0.6).abs() < 1e-12);
    }

    #[test]
    fn ties_are_broken_by_language_name()
    {
        let ranked = rank(&histogram(&[("Zig", 5,), ("Ada", 5,), ("Mojo", 5,)],),);
        let names: Vec<&str,> = ranked.iter().map(|entry| entry.language.as_str(),).collect();

        assert_eq!(names, vec!["Ada", "Mojo", "Zig"]);
    }

    #[test]
    fn end_to_end_histogram_ranks_go_first()
    {
        let ranked = rank(&histogram(&[("Go", 150,), ("JS", 50,)],),);

        assert_eq!(ranked, vec![
            RankedEntry {
                language: "Go".to_owned(), percentage: 0.75,
            },
            RankedEntry {
                language: "JS".to_owned(), percentage: 0.25,
            },
        ]);
    }

    #[test]
    fn overflow_label_is_other()
    {
        let ranked = rank(&histogram(&[("A", 3,), ("B", 2,), ("C", 1,)],),);
        let collapsed = collapse_tail(ranked, 2,);
        let overflow = collapsed.overflow.expect("tail collapsed",);

        assert_eq!(overflow.label(), OTHER_LANGUAGE);
        assert_eq!(overflow.languages, vec!["C"]);
    }

    fn non_empty_histogram() -> impl Strategy<Value = LanguageHistogram,>
    {
        prop::collection::btree_map("[A-Za-z+#]{1,8}", 1u64..10_000_000, 1..40,)
            .prop_map(|entries| entries.into_iter().collect(),)
    }

    proptest! {
        #[test]
        fn ranking_sums_to_one_and_is_non_increasing(histogram in non_empty_histogram()) {
            let ranked = rank(&histogram);
            let sum: f64 = ranked.iter().map(|entry| entry.percentage).sum();

            prop_assert_eq!(ranked.len(), histogram.len());
            prop_assert!((sum - 1.0).abs() < 1e-9);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].percentage >= pair[1].percentage);
            }
        }

        #[test]
        fn collapse_with_large_keep_is_identity(histogram in non_empty_histogram(), extra in 0usize..5) {
            let ranked = rank(&histogram);
            let collapsed = collapse_tail(ranked.clone(), ranked.len() + extra);

            prop_assert_eq!(collapsed.visible, ranked);
            prop_assert!(collapsed.overflow.is_none());
        }

        #[test]
        fn overflow_complements_visible_share(histogram in non_empty_histogram(), keep in 0usize..40) {
            let ranked = rank(&histogram);
            prop_assume!(keep < ranked.len());

            let collapsed = collapse_tail(ranked.clone(), keep);
            let visible: f64 = collapsed.visible.iter().map(|entry| entry.percentage).sum();
            let overflow = collapsed.overflow.expect("tail collapsed");

            prop_assert_eq!(collapsed.visible.as_slice(), &ranked[..keep]);
            prop_assert_eq!(overflow.languages.len(), ranked.len() - keep);
            prop_assert!((overflow.percentage - (1.0 - visible)).abs() < 1e-9);
        }
    }
}
