//! Configuration builders controlling training and corpus ingestion.

use std::fmt;

use crate::error::{BpeError, Result};
use crate::model::BASE_VOCAB_SIZE;
use serde::{Deserialize, Serialize};

/// Pre-segmentation applied to text before training and encoding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Segmentation {
    /// The whole text is a single sequence; merges may span any boundary.
    Disabled,
    /// GPT-2 style category split.
    Gpt2,
    /// GPT-4 style category split (contractions, letters, 1-3 digit runs, punctuation, whitespace).
    #[default]
    Gpt4,
}

impl fmt::Display for Segmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "disabled",
            Self::Gpt2 => "gpt2",
            Self::Gpt4 => "gpt4",
        };
        f.write_str(name)
    }
}

/// Configuration for BPE training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainerConfig {
    /// Target vocabulary size including the 256 base byte tokens.
    pub vocab_size: usize,
    /// Enables per-merge logging through the `log` facade.
    pub show_progress: bool,
}

impl TrainerConfig {
    /// Returns a builder initialised with [`TrainerConfig::default`].
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Number of merges implied by the target vocabulary size.
    #[must_use]
    pub fn num_merges(&self) -> usize {
        self.vocab_size.saturating_sub(BASE_VOCAB_SIZE)
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < BASE_VOCAB_SIZE {
            return Err(BpeError::InvalidConfig(format!(
                "vocab_size ({}) must be at least {BASE_VOCAB_SIZE}",
                self.vocab_size
            )));
        }
        let max_vocab = usize::try_from(u32::MAX).unwrap_or(usize::MAX);
        if self.vocab_size > max_vocab {
            return Err(BpeError::InvalidConfig(format!(
                "vocab_size ({}) exceeds {max_vocab}, the maximum representable TokenId",
                self.vocab_size
            )));
        }
        Ok(())
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 512,
            show_progress: false,
        }
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainerBuilder {
    cfg: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a builder with [`TrainerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the desired vocabulary size (including base byte tokens).
    #[must_use]
    pub fn vocab_size(mut self, value: usize) -> Self {
        self.cfg.vocab_size = value;
        self
    }

    /// Enables or disables per-merge logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TrainerConfig`].
    pub fn build(self) -> Result<TrainerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how text corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
    /// File extensions (without the dot) accepted inside directories; empty accepts all.
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            extensions: Vec::new(),
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }

    /// Returns `true` when a file discovered inside a directory should be loaded.
    #[must_use]
    pub fn accepts_extension(&self, extension: Option<&str>) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        extension.is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Restricts directory traversal to the given file extensions.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
