//! Comment quality scoring on top of the [`WordModel`].
//!
//! A comment scores high when it is long enough, uses rare words, and mixes
//! rare with common words. Three factors multiply into the score:
//!
//! - `k = 1 - exp(-K * n)`: saturating length reward over `n` retained tokens.
//! - `j = sigmoid(K_ * (stdev(word_scores) - B))`: rarity spread, `0` for a
//!   single token.
//! - `mean(word_scores) * n`: total rarity.

use std::sync::Arc;

use infl_core::{PostActivity, ScoringParams};

use crate::stats::{mean, sample_std};
use crate::tokenize::tokenize;
use crate::word_model::WordModel;

/// Scores comments against a shared, read-only word model.
#[derive(Debug, Clone)]
pub struct CommentScorer {
    model: Arc<WordModel>,
    params: ScoringParams,
}

impl CommentScorer {
    #[must_use]
    pub fn new(model: Arc<WordModel>, params: ScoringParams) -> Self {
        Self { model, params }
    }

    /// Rarity of each retained token: `1 / frequency`, or `1` for tokens
    /// the corpus never saw.
    #[must_use]
    pub fn word_scores(&self, text: &str) -> Vec<f64> {
        tokenize(text)
            .retained
            .iter()
            .map(|token| {
                let freq = self.model.frequency(token);
                if freq > 0.0 {
                    1.0 / freq
                } else {
                    1.0
                }
            })
            .collect()
    }

    /// Quality score of one comment.
    #[must_use]
    pub fn score(&self, text: &str) -> f64 {
        let scores = self.word_scores(text);
        let ScoringParams { k, k_sigmoid, b } = self.params;
        #[allow(clippy::cast_precision_loss)]
        let n = scores.len() as f64;

        let length = 1.0 - (-k * n).exp();
        let spread = if scores.len() > 1 {
            1.0 / (1.0 + (-k_sigmoid * (sample_std(&scores) - b)).exp())
        } else {
            0.0
        };
        let rarity = mean(&scores).unwrap_or(0.0);

        length * spread * rarity * n
    }

    /// Scores every comment on `posts` except the post owner's own replies.
    #[must_use]
    pub fn score_posts(&self, posts: &[PostActivity]) -> Vec<f64> {
        posts
            .iter()
            .flat_map(|p| {
                p.comments
                    .iter()
                    .filter(move |c| c.author != p.post.owner)
                    .map(move |c| self.score(&c.text))
            })
            .collect()
    }
}

/// Per-user aggregate: `mean * (1 + stdev)` for two or more scores, the
/// single score for one, `0` for none.
#[must_use]
pub fn aggregate_comment_scores(scores: &[f64]) -> f64 {
    match scores {
        [] => 0.0,
        [only] => *only,
        _ => mean(scores).unwrap_or(0.0) * (1.0 + sample_std(scores)),
    }
}
