//! Core training loop that learns merges from a text corpus.

use std::fmt;
use std::time::Instant;

use log::info;

use crate::bytes::render_token;
use crate::config::{TrainerBuilder, TrainerConfig};
use crate::error::{BpeError, Result};
use crate::merge::merge_in_place;
use crate::metrics::{IterationMetrics, TrainingMetrics};
use crate::model::{BpeModel, TokenId};
use crate::segment::Segmenter;
use crate::stats::PairCounts;

/// High-level façade configuring and executing BPE training runs.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained BPE model.
    pub model: BpeModel,
    /// Detailed metrics captured during training.
    pub metrics: TrainingMetrics,
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TrainerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TrainerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Trains on `text`, first splitting it into chunks when a segmenter is supplied.
    pub fn train(&self, text: &str, segmenter: Option<&Segmenter>) -> Result<TrainerArtifacts> {
        match segmenter {
            Some(segmenter) => self.train_from_sequences(&segmenter.split(text)),
            None => self.train_from_sequences(&[text]),
        }
    }

    /// Trains on independent byte sequences; pairs are never counted across sequences.
    ///
    /// Each iteration recounts every pair, merges the most frequent one (earliest discovered on
    /// ties) into id `256 + i`, and fails with [`BpeError::Exhausted`] if no pair is left before
    /// the target vocabulary size is reached.
    pub fn train_from_sequences<S>(&self, sequences: &[S]) -> Result<TrainerArtifacts>
    where
        S: AsRef<[u8]>,
    {
        self.cfg.validate()?;

        let requested = self.cfg.num_merges();
        let mut working: Vec<Vec<TokenId>> = sequences
            .iter()
            .map(|seq| seq.as_ref().iter().map(|&b| TokenId::from(b)).collect())
            .collect();
        let initial_tokens: usize = working.iter().map(Vec::len).sum();

        let mut model = BpeModel::new();
        let mut metrics = TrainingMetrics::new(requested.min(16_384), initial_tokens);
        let mut remaining = initial_tokens;
        let training_start = Instant::now();

        for iteration in 0..requested {
            let iteration_start = Instant::now();
            let counts = PairCounts::from_sequences(&working);
            let Some((pair, frequency)) = counts.most_frequent() else {
                return Err(BpeError::Exhausted {
                    completed: iteration,
                    requested,
                });
            };

            let token_id = model.push_merge(pair)?;
            let merges_applied: usize = working
                .iter_mut()
                .map(|sequence| merge_in_place(sequence, pair, token_id))
                .sum();
            remaining -= merges_applied;

            if self.cfg.show_progress {
                info!(
                    "merge {}/{}: [{}] + [{}] -> {} ({} occurrences)",
                    iteration + 1,
                    requested,
                    render_token(model.token(pair.0).unwrap_or_default()),
                    render_token(model.token(pair.1).unwrap_or_default()),
                    token_id,
                    frequency
                );
            }

            metrics.iterations.push(IterationMetrics {
                iteration: iteration + 1,
                pair,
                token_id,
                frequency,
                merges_applied,
                tokens_remaining: remaining,
                elapsed_iteration: iteration_start.elapsed(),
            });
        }

        metrics.final_tokens = remaining;
        metrics.total_duration = training_start.elapsed();

        if self.cfg.show_progress {
            info!("tokens before training: {}", metrics.initial_tokens);
            info!("tokens after training: {}", metrics.final_tokens);
            info!(
                "compression ratio: {:.2}X ({} merges in {:.2?})",
                metrics.compression_ratio(),
                model.merges().len(),
                metrics.total_duration
            );
        }

        Ok(TrainerArtifacts { model, metrics })
    }
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BPE model with vocab size {}", self.model.vocab_size())?;
        writeln!(
            f,
            "Tokens: {} -> {} ({:.2}X)",
            self.metrics.initial_tokens,
            self.metrics.final_tokens,
            self.metrics.compression_ratio()
        )?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}
