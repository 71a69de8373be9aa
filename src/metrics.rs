//! Metrics describing the evolution of the training process.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{Pair, TokenId};

/// Metrics captured for each merge iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationMetrics {
    /// Sequential iteration number (1-indexed).
    pub iteration: usize,
    /// Pair selected for merging.
    pub pair: Pair,
    /// Token id assigned to the merged pair.
    pub token_id: TokenId,
    /// Frequency of the selected pair before the merge.
    pub frequency: usize,
    /// Number of occurrences replaced across all sequences.
    pub merges_applied: usize,
    /// Total tokens across all sequences after the merge.
    pub tokens_remaining: usize,
    /// Execution time for the iteration.
    pub elapsed_iteration: Duration,
}

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Per-iteration snapshots accrued during training.
    pub iterations: Vec<IterationMetrics>,
    /// Byte tokens in the training input before any merge.
    pub initial_tokens: usize,
    /// Tokens remaining after the final merge.
    pub final_tokens: usize,
    /// Total duration of the training session.
    pub total_duration: Duration,
}

impl TrainingMetrics {
    /// Creates an empty metrics container with pre-allocated capacity.
    #[must_use]
    pub fn new(capacity: usize, initial_tokens: usize) -> Self {
        Self {
            iterations: Vec::with_capacity(capacity),
            initial_tokens,
            final_tokens: initial_tokens,
            total_duration: Duration::ZERO,
        }
    }

    /// Ratio of input tokens to output tokens; `1.0` when nothing was compressed.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.final_tokens == 0 {
            return 1.0;
        }
        self.initial_tokens as f64 / self.final_tokens as f64
    }
}
