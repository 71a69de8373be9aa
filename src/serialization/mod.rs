//! Helpers for persisting trained merge tables.

pub mod model_file;

pub use model_file::{
    export_vocab, load_model, merges_from_json, merges_to_json, model_path, save_model,
    vocab_listing, vocab_path, MODEL_SUFFIX, VOCAB_SUFFIX,
};
