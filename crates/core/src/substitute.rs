//! Placeholder substitution over a deck's text runs.
//!
//! Matching is literal and per run: a token only matches when it sits
//! entirely inside one run. Presentation editors often split text into
//! several runs (spell-check marks, partial formatting), so a token typed
//! as `{{na` + `me}}` is left alone. [`Substituter::split_tokens`] finds
//! those cases so they can be reported.

use crate::placeholder::{ReplacementMap, TOKEN_CLOSE, TOKEN_OPEN};
use crate::types::Deck;
use regex::Regex;
use std::sync::LazyLock;

/// Regex matching any `{{...}}` token that contains no braces.
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]+\}\}").unwrap());

/// Counters from one substitution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    /// Runs visited.
    pub runs: usize,
    /// Runs whose text changed.
    pub runs_changed: usize,
    /// Token occurrences replaced across all runs.
    pub replacements: usize,
}

/// Applies a replacement map to a deck.
#[derive(Debug, Clone, Default)]
pub struct Substituter;

impl Substituter {
    pub fn new() -> Self {
        Self
    }

    /// Replace every token occurrence in every run, in map order.
    ///
    /// Text outside the tokens, and the runs' formatting, are untouched.
    /// Tokens with no map entry stay in the text as written.
    pub fn apply(&self, deck: &mut Deck, map: &ReplacementMap) -> SubstitutionStats {
        let mut stats = SubstitutionStats::default();

        for run in deck.runs_mut() {
            stats.runs += 1;
            let mut changed = false;

            for (token, value) in map.iter() {
                if token.is_empty() || !run.text.contains(token) {
                    continue;
                }
                stats.replacements += run.text.matches(token).count();
                run.text = run.text.replace(token, value);
                changed = true;
            }

            if changed {
                stats.runs_changed += 1;
            }
        }

        log::debug!(
            "Substituted {} token(s) across {} of {} run(s)",
            stats.replacements,
            stats.runs_changed,
            stats.runs
        );

        stats
    }

    /// Tokens still present in run text, deduplicated, in first-seen order.
    pub fn unresolved_tokens(&self, deck: &Deck) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for run in deck.runs() {
            for m in TOKEN_REGEX.find_iter(&run.text) {
                if !found.iter().any(|t| t == m.as_str()) {
                    found.push(m.as_str().to_string());
                }
            }
        }
        found
    }

    /// Map tokens that appear in a paragraph's joined text but inside no
    /// single run, so per-run matching cannot replace them.
    pub fn split_tokens(&self, deck: &Deck, map: &ReplacementMap) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for paragraph in deck.paragraphs() {
            let joined = paragraph.text();
            if !joined.contains(TOKEN_OPEN) || !joined.contains(TOKEN_CLOSE) {
                continue;
            }
            for (token, _) in map.iter() {
                let whole = joined.matches(token).count();
                let in_runs: usize = paragraph
                    .runs
                    .iter()
                    .map(|r| r.text.matches(token).count())
                    .sum();
                if whole > in_runs && !found.iter().any(|t| t == token) {
                    found.push(token.to_string());
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Paragraph, Shape, Slide, TextFrame};

    fn deck_with(paragraphs: Vec<Paragraph>) -> Deck {
        let mut slide = Slide::new(1, "ppt/slides/slide1.xml");
        slide.shapes.push(Shape {
            name: Some("TextBox 1".to_string()),
            text_frame: Some(TextFrame { paragraphs }),
        });
        slide.shapes.push(Shape::default());
        let mut deck = Deck::new();
        deck.add_slide(slide);
        deck
    }

    fn texts(deck: &Deck) -> Vec<String> {
        deck.runs().map(|r| r.text.clone()).collect()
    }

    fn map(pairs: &[(&str, &str)]) -> ReplacementMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_replaces_every_occurrence_in_run() {
        let mut deck = deck_with(vec![Paragraph::from_runs([
            "Awarded to {{name}} ({{name}})",
            " with score {{score}}.",
        ])]);
        let stats = Substituter::new().apply(
            &mut deck,
            &map(&[("{{name}}", "Ada"), ("{{score}}", "97")]),
        );

        assert_eq!(
            texts(&deck),
            vec!["Awarded to Ada (Ada)", " with score 97."]
        );
        assert_eq!(stats.replacements, 3);
        assert_eq!(stats.runs_changed, 2);
        assert_eq!(stats.runs, 2);
    }

    #[test]
    fn test_leaves_other_text_unchanged() {
        let mut deck = deck_with(vec![
            Paragraph::from_runs(["Certificate of Achievement"]),
            Paragraph::from_runs(["{{name}}", ""]),
        ]);
        Substituter::new().apply(&mut deck, &map(&[("{{name}}", "Grace Hopper")]));
        assert_eq!(
            texts(&deck),
            vec!["Certificate of Achievement", "Grace Hopper", ""]
        );
    }

    #[test]
    fn test_split_token_is_not_replaced() {
        let mut deck = deck_with(vec![Paragraph::from_runs(["Dear {{na", "me}},"])]);
        let m = map(&[("{{name}}", "Ada")]);
        let substituter = Substituter::new();
        let stats = substituter.apply(&mut deck, &m);

        assert_eq!(texts(&deck), vec!["Dear {{na", "me}},"]);
        assert_eq!(stats.replacements, 0);
        assert_eq!(substituter.split_tokens(&deck, &m), vec!["{{name}}"]);
    }

    #[test]
    fn test_unmatched_tokens_remain() {
        let mut deck = deck_with(vec![Paragraph::from_runs(["{{name}} - {{team}}"])]);
        let substituter = Substituter::new();
        substituter.apply(&mut deck, &map(&[("{{name}}", "Ada"), ("{{unused}}", "x")]));

        assert_eq!(texts(&deck), vec!["Ada - {{team}}"]);
        assert_eq!(substituter.unresolved_tokens(&deck), vec!["{{team}}"]);
    }

    #[test]
    fn test_map_order_decides_overlaps() {
        // The value of the first entry contains the second token.
        let mut deck = deck_with(vec![Paragraph::from_runs(["{{a}}"])]);
        Substituter::new().apply(&mut deck, &map(&[("{{a}}", "{{b}}"), ("{{b}}", "done")]));
        assert_eq!(texts(&deck), vec!["done"]);

        let mut deck = deck_with(vec![Paragraph::from_runs(["{{a}}"])]);
        Substituter::new().apply(&mut deck, &map(&[("{{b}}", "done"), ("{{a}}", "{{b}}")]));
        assert_eq!(texts(&deck), vec!["{{b}}"]);
    }

    #[test]
    fn test_split_tokens_ignores_whole_run_tokens() {
        let deck = deck_with(vec![Paragraph::from_runs(["{{name}}", " and more"])]);
        let m = map(&[("{{name}}", "Ada")]);
        assert!(Substituter::new().split_tokens(&deck, &m).is_empty());
    }
}
