//! Trainable byte pair encoding (BPE) tokenizer library and CLI.
//!
//! The crate learns a vocabulary of byte-sequence tokens from text by repeatedly merging the
//! most frequent adjacent pair, then converts text to token ids and back without loss.  An
//! optional GPT-style regex pre-segmentation keeps merges inside lexical chunks (letters,
//! digits, punctuation, whitespace).
//!
//! ```no_run
//! use bytepair::Tokenizer;
//!
//! # fn main() -> bytepair::Result<()> {
//! let mut tokenizer = Tokenizer::regex();
//! tokenizer.train("the quick brown fox jumps over the lazy dog", 260, false)?;
//! let ids = tokenizer.encode("the lazy fox");
//! assert_eq!(tokenizer.decode(&ids), "the lazy fox");
//! tokenizer.save("fox")?; // writes fox.model
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature.  Users targeting the
//! library portion only can disable default features to avoid the CLI
//! dependencies: `bytepair = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

pub mod bytes;
pub mod config;
pub mod corpus;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod model;
pub mod segment;
pub mod serialization;
pub mod stats;
pub mod tokenizer;
pub mod trainer;

pub use config::{IngestConfig, Segmentation, TrainerBuilder, TrainerConfig};
pub use error::{BpeError, Result};
pub use metrics::{IterationMetrics, TrainingMetrics};
pub use model::{BpeModel, MergeTable, Pair, TokenId, BASE_VOCAB_SIZE};
pub use segment::{Segmenter, GPT2_SPLIT_PATTERN, GPT4_SPLIT_PATTERN};
pub use stats::PairCounts;
pub use tokenizer::Tokenizer;
pub use trainer::{Trainer, TrainerArtifacts};
