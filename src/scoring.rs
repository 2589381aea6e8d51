/// Weighted popularity scoring
///
/// Each signal (click, review and favorite counts) is min-max normalized over
/// the candidate set, then combined with non-negative weights. A signal with
/// no spread across candidates contributes its full weight to everyone.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::video::VideoRecord;

/// Per-signal weights, conventionally summing to 1.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub click: f64,
    pub scores: f64,
    pub stow: f64,
}

impl ScoreWeights {
    pub fn new(click: f64, scores: f64, stow: f64) -> Self {
        Self { click, scores, stow }
    }

    pub fn total(&self) -> f64 {
        self.click + self.scores + self.stow
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [("click", self.click), ("scores", self.scores), ("stow", self.stow)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(anyhow!("weight '{}' must be a non-negative number, got {}", name, weight));
            }
        }
        if self.total() <= 0.0 {
            return Err(anyhow!("at least one weight must be positive"));
        }
        Ok(())
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            click: 0.2,
            scores: 0.5,
            stow: 0.3,
        }
    }
}

/// Min-max normalize to `[0, 1]`; without spread every value maps to 1.0
pub fn min_max_normalize(values: &[u64]) -> Vec<f64> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };

    if min == max {
        return vec![1.0; values.len()];
    }

    let range = (max - min) as f64;
    values.iter().map(|&v| (v - min) as f64 / range).collect()
}

/// Attach a weighted score to every candidate and return the best `top_n`,
/// highest first. Equal scores keep their incoming order.
pub fn rank_by_weighted_score(
    mut candidates: Vec<VideoRecord>,
    weights: &ScoreWeights,
    top_n: usize,
) -> Vec<VideoRecord> {
    if candidates.is_empty() {
        return candidates;
    }

    let clicks: Vec<u64> = candidates.iter().map(|c| c.counts.click).collect();
    let scores: Vec<u64> = candidates.iter().map(|c| c.counts.scores).collect();
    let stows: Vec<u64> = candidates.iter().map(|c| c.counts.stow).collect();

    let norm_click = min_max_normalize(&clicks);
    let norm_scores = min_max_normalize(&scores);
    let norm_stow = min_max_normalize(&stows);

    for (i, candidate) in candidates.iter_mut().enumerate() {
        let score = norm_click[i] * weights.click
            + norm_scores[i] * weights.scores
            + norm_stow[i] * weights.stow;
        candidate.weighted_score = Some(score);
    }

    candidates.sort_by(|a, b| {
        let a = a.weighted_score.unwrap_or(0.0);
        let b = b.weighted_score.unwrap_or(0.0);
        b.total_cmp(&a)
    });
    candidates.truncate(top_n);

    debug!(
        "Scored candidates, best: {:?}",
        candidates.first().and_then(|c| c.weighted_score)
    );
    candidates
}
