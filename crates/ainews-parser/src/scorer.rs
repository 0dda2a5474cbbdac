//! AI-relevance scorer: a saturating weighted sum of independent signals.

use ainews_core::Taxonomy;

use crate::text::{compile_phrases, contains_any, count_phrase, tokenize, Phrase};

/// Signal weights. Each signal is normalized to `[0.0, 1.0]` before weighting.
/// The weights sum past 1.0; the total saturates there without renormalizing.
pub(crate) const TITLE_TERM_WEIGHT: f32 = 0.5;
pub(crate) const BODY_DENSITY_WEIGHT: f32 = 0.3;
pub(crate) const CATEGORY_WEIGHT: f32 = 0.2;
pub(crate) const DEAL_SIGNAL_WEIGHT: f32 = 0.15;
pub(crate) const AMOUNT_WEIGHT: f32 = 0.1;

/// Core-term hits per body token at which the density signal saturates.
const DENSITY_TARGET: f32 = 0.02;

/// Normalized inputs to the relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelevanceSignals {
    pub title_core_term: bool,
    /// In `[0.0, 1.0]`.
    pub body_density: f32,
    pub has_categories: bool,
    pub deal_signal: bool,
    pub amount_found: bool,
}

impl RelevanceSignals {
    /// Weighted sum clamped to `[0.0, 1.0]`. A NaN density counts as zero.
    #[must_use]
    pub fn score(&self) -> f32 {
        let flag = |on: bool, weight: f32| if on { weight } else { 0.0 };
        let density = if self.body_density.is_nan() {
            0.0
        } else {
            self.body_density.clamp(0.0, 1.0)
        };
        let total = flag(self.title_core_term, TITLE_TERM_WEIGHT)
            + density * BODY_DENSITY_WEIGHT
            + flag(self.has_categories, CATEGORY_WEIGHT)
            + flag(self.deal_signal, DEAL_SIGNAL_WEIGHT)
            + flag(self.amount_found, AMOUNT_WEIGHT);
        total.clamp(0.0, 1.0)
    }
}

/// Measures the core-AI-term signals of an article.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    core_terms: Vec<Phrase>,
}

impl RelevanceScorer {
    #[must_use]
    pub fn new(taxonomy: &Taxonomy) -> Self {
        Self {
            core_terms: compile_phrases(&taxonomy.core_terms),
        }
    }

    /// Whether any core term appears in `title`.
    #[must_use]
    pub fn title_has_core_term(&self, title: &str) -> bool {
        self.title_signal(&tokenize(title))
    }

    /// `min(1, hits / (tokens × 0.02))`; `0.0` for empty text.
    #[must_use]
    pub fn body_density(&self, content: &str) -> f32 {
        self.density_signal(&tokenize(content))
    }

    pub(crate) fn title_signal(&self, title: &[String]) -> bool {
        contains_any(title, &self.core_terms)
    }

    pub(crate) fn density_signal(&self, content: &[String]) -> f32 {
        if content.is_empty() {
            return 0.0;
        }
        let hits: usize = self
            .core_terms
            .iter()
            .map(|term| count_phrase(content, term))
            .sum();

        #[allow(clippy::cast_precision_loss)]
        let density = hits as f32 / (content.len() as f32 * DENSITY_TARGET);
        density.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(&Taxonomy::default())
    }

    #[test]
    fn no_signals_scores_zero() {
        assert_eq!(RelevanceSignals::default().score(), 0.0);
    }

    #[test]
    fn all_signals_saturate_at_one() {
        let signals = RelevanceSignals {
            title_core_term: true,
            body_density: 1.0,
            has_categories: true,
            deal_signal: true,
            amount_found: true,
        };
        assert_eq!(signals.score(), 1.0);
    }

    #[test]
    fn partial_signals_add_their_weights() {
        let signals = RelevanceSignals {
            title_core_term: true,
            has_categories: true,
            ..RelevanceSignals::default()
        };
        assert!((signals.score() - 0.7).abs() < 1e-6);

        let signals = RelevanceSignals {
            deal_signal: true,
            amount_found: true,
            ..RelevanceSignals::default()
        };
        assert!((signals.score() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_density_is_clamped() {
        let high = RelevanceSignals {
            body_density: 7.0,
            ..RelevanceSignals::default()
        };
        assert!((high.score() - BODY_DENSITY_WEIGHT).abs() < 1e-6);

        let negative = RelevanceSignals {
            body_density: -3.0,
            ..RelevanceSignals::default()
        };
        assert_eq!(negative.score(), 0.0);
    }

    #[test]
    fn nan_density_counts_as_zero() {
        let signals = RelevanceSignals {
            title_core_term: true,
            body_density: f32::NAN,
            ..RelevanceSignals::default()
        };
        let score = signals.score();
        assert!(!score.is_nan());
        assert!((score - TITLE_TERM_WEIGHT).abs() < 1e-6);

        let infinite = RelevanceSignals {
            body_density: f32::INFINITY,
            ..RelevanceSignals::default()
        };
        assert!((infinite.score() - BODY_DENSITY_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn title_signal_uses_whole_words() {
        let s = scorer();
        assert!(s.title_has_core_term("OpenAI Raises $6.6B in Series C"));
        assert!(s.title_has_core_term("Why machine learning still matters"));
        assert!(!s.title_has_core_term("Said the chairman"));
    }

    #[test]
    fn density_saturates() {
        let s = scorer();
        // 1 hit in 10 tokens = 0.1 / 0.02 → capped at 1.0
        assert_eq!(s.body_density("AI one two three four five six seven eight nine"), 1.0);
    }

    #[test]
    fn density_is_proportional_below_saturation() {
        let s = scorer();
        let mut body = String::from("ai");
        for _ in 0..99 {
            body.push_str(" filler");
        }
        // 1 hit in 100 tokens = 0.01 / 0.02
        assert!((s.body_density(&body) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn density_of_empty_or_unrelated_text_is_zero() {
        let s = scorer();
        assert_eq!(s.body_density(""), 0.0);
        assert_eq!(s.body_density("Sunny skies ahead"), 0.0);
    }
}
