//! Suggestion engine: ranks existing entry names against a key that missed.
//!
//! Similarity is the character-level diff ratio `2·M / T`, where `M` is the
//! number of matching characters and `T` the combined length, so scores lie
//! in `[0, 1]`. Ranking is a stable sort, so equal scores keep the
//! candidates' original order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::types::config::SuggestionOrder;


/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    /// Similarity in `[0, 1]`; higher is closer.
    pub score: f32,
}


/// Similarity of `candidate` to `target`. Callers always pass the candidate
/// first; the ratio is not guaranteed symmetric.
pub fn similarity(candidate: &str, target: &str) -> f32 {
    TextDiff::from_chars(candidate, target).ratio()
}


/// Score and order every candidate.
pub fn rank<I, S>(candidates: I, target: &str, order: SuggestionOrder) -> Vec<Suggestion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranked: Vec<Suggestion> = candidates
        .into_iter()
        .map(|c| {
            let name = c.as_ref().to_string();
            let score = similarity(&name, target);
            Suggestion { name, score }
        })
        .collect();

    match order {
        SuggestionOrder::MostSimilarFirst => {
            ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        }
        SuggestionOrder::LeastSimilarFirst => {
            ranked.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal))
        }
    }
    ranked
}


/// Up to `limit` candidate names, best first under `order`.
///
/// An empty candidate set yields an empty list.
pub fn suggest<I, S>(candidates: I, target: &str, limit: usize, order: SuggestionOrder) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rank(candidates, target, order)
        .into_iter()
        .take(limit)
        .map(|s| s.name)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    const BEST: SuggestionOrder = SuggestionOrder::MostSimilarFirst;

    #[test]
    fn empty_candidates_yield_nothing() {
        let none: Vec<String> = Vec::new();
        assert!(suggest(none, "x", 3, BEST).is_empty());
    }

    #[test]
    fn closest_first_by_default() {
        let got = suggest(["Garage", "Loc2", "Kitchen", "Loc1x"], "Loc1", 2, BEST);
        assert_eq!(got, vec!["Loc1x", "Loc2"]);
    }

    #[test]
    fn least_similar_first_when_configured() {
        let got = suggest(
            ["Loc1x", "zzzz", "Loc2"],
            "Loc1",
            1,
            SuggestionOrder::LeastSimilarFirst,
        );
        assert_eq!(got, vec!["zzzz"]);
    }

    #[test]
    fn fewer_candidates_than_limit_returns_all() {
        let got = suggest(["a", "b"], "a", 5, BEST);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn ties_keep_input_order() {
        // None of these share a character with the target.
        let got = suggest(["qq", "ww", "ee", "rr"], "x", 3, BEST);
        assert_eq!(got, vec!["qq", "ww", "ee"]);
        let got = suggest(["qq", "ww", "ee"], "x", 3, SuggestionOrder::LeastSimilarFirst);
        assert_eq!(got, vec!["qq", "ww", "ee"]);
    }

    #[test]
    fn scores_are_normalized() {
        assert!((similarity("abcd", "abcd") - 1.0).abs() < f32::EPSILON);
        assert_eq!(similarity("abcd", "wxyz"), 0.0);
        let s = similarity("Loc1", "Loc2");
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn rank_reports_scores() {
        let ranked = rank(["Loc1", "Other"], "Loc1", BEST);
        assert_eq!(ranked[0].name, "Loc1");
        assert!((ranked[0].score - 1.0).abs() < f32::EPSILON);
    }
}
