//! Lexical category tagging (supertagging) contract.
//!
//! The parser seeds its single-word cells from a tagger: per word, a short
//! ranked list of categories with scores. How the scores are computed is up
//! to an external model ([`TagScorer`]); this module only fixes the shape of
//! the output and the pruning applied to a row of scores.
//!
//! ## Pruning
//!
//! ```text
//! scores ─▶ sort descending ─▶ keep max_tags_per_word ─▶ beam cut
//! ```
//!
//! The beam cut drops everything from the first candidate (at index 2 or
//! later) whose `exp(score)` is below `beta * exp(best)`. The first two
//! candidates are always kept, whatever the beam.

use crate::{Category, TaggerOptions};

/// A candidate category for one word.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCategory {
    pub category: Category,
    /// Log-space score; higher is better.
    pub score: f64,
}

impl ScoredCategory {
    pub fn new(category: Category, score: f64) -> Self {
        Self { category, score }
    }
}

/// Produces ranked candidate categories per word.
pub trait LexicalTagger {
    fn tag(&self, words: &[&str]) -> Vec<Vec<ScoredCategory>>;
}

/// A scoring model: one score per `(word, category)`.
pub trait TagScorer {
    /// Categories the model scores, in column order.
    fn categories(&self) -> &[Category];

    /// One row per word, aligned with [`TagScorer::categories`].
    fn score(&self, words: &[&str]) -> Vec<Vec<f32>>;
}

/// [`LexicalTagger`] over a [`TagScorer`] with the standard pruning.
#[derive(Debug)]
pub struct ScoredTagger<S> {
    scorer: S,
    options: TaggerOptions,
}

impl<S: TagScorer> ScoredTagger<S> {
    pub fn new(scorer: S, options: TaggerOptions) -> Self {
        Self { scorer, options }
    }

    pub fn options(&self) -> &TaggerOptions {
        &self.options
    }
}

impl<S: TagScorer> LexicalTagger for ScoredTagger<S> {
    fn tag(&self, words: &[&str]) -> Vec<Vec<ScoredCategory>> {
        let categories = self.scorer.categories();
        self.scorer.score(words).iter().map(|row| prune_tags(row, categories, &self.options)).collect()
    }
}

/// Rank and prune one word's scores.
///
/// `scores[i]` scores `categories[i]`; extra entries on either side are
/// ignored. The sort is stable, so equal scores keep column order.
pub fn prune_tags(scores: &[f32], categories: &[Category], options: &TaggerOptions) -> Vec<ScoredCategory> {
    let mut ranked: Vec<ScoredCategory> = categories
        .iter()
        .zip(scores)
        .map(|(category, &score)| ScoredCategory::new(category.clone(), f64::from(score)))
        .collect();
    let best = ranked.iter().map(|c| c.score).fold(f64::NEG_INFINITY, f64::max);

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(options.max_tags_per_word);

    let threshold = options.beta * best.exp();
    if let Some(cut) = ranked.iter().skip(2).position(|c| c.score.exp() < threshold) {
        ranked.truncate(cut + 2);
    }
    ranked
}
