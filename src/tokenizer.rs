//! Text tokenizer combining a [`BpeModel`] with optional [`Segmenter`] pre-splitting.

use std::path::{Path, PathBuf};

use crate::config::{Segmentation, TrainerConfig};
use crate::error::Result;
use crate::metrics::TrainingMetrics;
use crate::model::{BpeModel, MergeTable, TokenId};
use crate::segment::Segmenter;
use crate::serialization;
use crate::trainer::Trainer;

/// Trainable byte-level BPE tokenizer.
///
/// Without a segmenter the whole text is one sequence. With one, text is split into chunks
/// before both training and encoding, so merges never cross chunk boundaries.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    model: BpeModel,
    segmenter: Option<Segmenter>,
}

impl Tokenizer {
    /// Creates an untrained tokenizer for the given segmentation mode.
    #[must_use]
    pub fn new(segmentation: Segmentation) -> Self {
        Self::with_segmenter(Segmenter::for_mode(segmentation))
    }

    /// Creates an untrained tokenizer with an explicit (possibly custom) segmenter.
    #[must_use]
    pub fn with_segmenter(segmenter: Option<Segmenter>) -> Self {
        Self {
            model: BpeModel::new(),
            segmenter,
        }
    }

    /// Tokenizer that merges across the whole text.
    #[must_use]
    pub fn basic() -> Self {
        Self::new(Segmentation::Disabled)
    }

    /// Tokenizer that splits text with the GPT-4 pattern before merging.
    #[must_use]
    pub fn regex() -> Self {
        Self::new(Segmentation::Gpt4)
    }

    /// Creates a tokenizer and loads merges from a `.model` file.
    pub fn from_file<P: AsRef<Path>>(path: P, segmentation: Segmentation) -> Result<Self> {
        let mut tokenizer = Self::new(segmentation);
        tokenizer.load(path)?;
        Ok(tokenizer)
    }

    /// Learns `vocab_size - 256` merges from `text`, replacing anything learned before.
    ///
    /// The tokenizer is reset first, so an invalid `vocab_size` also leaves it untrained.
    pub fn train(&mut self, text: &str, vocab_size: usize, verbose: bool) -> Result<TrainingMetrics> {
        self.reset();
        let cfg = TrainerConfig::builder()
            .vocab_size(vocab_size)
            .show_progress(verbose)
            .build()?;
        self.train_with_config(text, &cfg)
    }

    /// Trains with an explicit configuration.
    ///
    /// The tokenizer is reset before training starts and stays reset if training fails.
    pub fn train_with_config(&mut self, text: &str, cfg: &TrainerConfig) -> Result<TrainingMetrics> {
        self.reset();
        let artifacts = Trainer::new(cfg.clone()).train(text, self.segmenter.as_ref())?;
        self.model = artifacts.model;
        Ok(artifacts.metrics)
    }

    /// Encodes text into token ids.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        match &self.segmenter {
            Some(segmenter) => segmenter
                .split(text)
                .into_iter()
                .flat_map(|chunk| self.model.encode_chunk(chunk.as_bytes()))
                .collect(),
            None => self.model.encode_chunk(text.as_bytes()),
        }
    }

    /// Decodes token ids into text, replacing invalid UTF-8 and unknown ids with U+FFFD.
    #[must_use]
    pub fn decode(&self, ids: &[TokenId]) -> String {
        String::from_utf8_lossy(&self.model.decode_bytes_lossy(ids)).into_owned()
    }

    /// Decodes token ids into raw bytes, failing on ids outside the vocabulary.
    pub fn decode_bytes(&self, ids: &[TokenId]) -> Result<Vec<u8>> {
        self.model.decode_bytes(ids)
    }

    /// Saves the merge list to `path` with a `.model` suffix, returning the path written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        serialization::save_model(&self.model, path)
    }

    /// Replaces the current model with the one stored at `path` (suffix forced to `.model`).
    ///
    /// On error the tokenizer keeps its previous state.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.model = serialization::load_model(path)?;
        Ok(())
    }

    /// Writes a human-readable `.vocab` listing next to `path`.
    pub fn export_vocab<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        serialization::export_vocab(&self.model, path)
    }

    /// Drops every learned merge, returning to the 256 byte tokens.
    pub fn reset(&mut self) {
        self.model = BpeModel::new();
    }

    /// The underlying model.
    #[must_use]
    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    /// Learned merges in rank order.
    #[must_use]
    pub fn merges(&self) -> &MergeTable {
        self.model.merges()
    }

    /// Vocabulary size including the 256 byte tokens.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.model.vocab_size()
    }

    /// The segmenter consulted by train and encode, if any.
    #[must_use]
    pub fn segmenter(&self) -> Option<&Segmenter> {
        self.segmenter.as_ref()
    }
}
