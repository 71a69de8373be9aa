//! `.model` files: a JSON array of `[left, right]` merge pairs in rank order.
//!
//! Token ids and vocabulary bytes are not stored; both are rebuilt from the pair order on load.
//! A human-readable `.vocab` listing can be exported alongside for inspection.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::bytes::render_token;
use crate::error::{BpeError, Result};
use crate::model::{BpeModel, Pair, BASE_VOCAB_SIZE};

/// Suffix forced onto every saved or loaded model path.
pub const MODEL_SUFFIX: &str = "model";
/// Suffix used for exported vocabulary listings.
pub const VOCAB_SUFFIX: &str = "vocab";

/// Replaces any suffix on `path` with [`MODEL_SUFFIX`].
#[must_use]
pub fn model_path<P: AsRef<Path>>(path: P) -> PathBuf {
    path.as_ref().with_extension(MODEL_SUFFIX)
}

/// Replaces any suffix on `path` with [`VOCAB_SUFFIX`].
#[must_use]
pub fn vocab_path<P: AsRef<Path>>(path: P) -> PathBuf {
    path.as_ref().with_extension(VOCAB_SUFFIX)
}

/// Serialises the merge pairs of `model` in rank order.
pub fn merges_to_json(model: &BpeModel) -> Result<String> {
    Ok(serde_json::to_string(model.merges().pairs())?)
}

/// Parses an ordered pair list produced by [`merges_to_json`].
pub fn merges_from_json(text: &str) -> Result<Vec<Pair>> {
    Ok(serde_json::from_str(text)?)
}

/// Writes the merge list to `path` with its suffix replaced by `.model`, returning the path written.
pub fn save_model<P: AsRef<Path>>(model: &BpeModel, path: P) -> Result<PathBuf> {
    let target = model_path(path);
    let json = merges_to_json(model)?;
    fs::write(&target, json).map_err(|err| BpeError::io(err, Some(target.clone())))?;
    debug!(
        "saved {} merges to {}",
        model.merges().len(),
        target.display()
    );
    Ok(target)
}

/// Reads a `.model` file and rebuilds the model, assigning ids `256, 257, ...` in stored order.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<BpeModel> {
    let source = model_path(path);
    let text =
        fs::read_to_string(&source).map_err(|err| BpeError::io(err, Some(source.clone())))?;
    let pairs: Vec<Pair> = serde_json::from_str(&text)
        .map_err(|err| BpeError::Format(format!("{}: {err}", source.display())))?;
    let model = BpeModel::from_merges(pairs)?;
    debug!(
        "loaded {} merges from {}",
        model.merges().len(),
        source.display()
    );
    Ok(model)
}

/// Renders one line per token: `[bytes] id` for base bytes and
/// `[left][right] -> [merged] id` for learned merges.
#[must_use]
pub fn vocab_listing(model: &BpeModel) -> String {
    let mut listing = String::new();
    for (id, bytes) in model.token_bytes().iter().take(BASE_VOCAB_SIZE).enumerate() {
        let _ = writeln!(listing, "[{}] {id}", render_token(bytes));
    }
    for ((left, right), id) in model.merges().iter() {
        let _ = writeln!(
            listing,
            "[{}][{}] -> [{}] {id}",
            render_token(model.token(left).unwrap_or_default()),
            render_token(model.token(right).unwrap_or_default()),
            render_token(model.token(id).unwrap_or_default()),
        );
    }
    listing
}

/// Writes [`vocab_listing`] to `path` with its suffix replaced by `.vocab`.
pub fn export_vocab<P: AsRef<Path>>(model: &BpeModel, path: P) -> Result<PathBuf> {
    let target = vocab_path(path);
    fs::write(&target, vocab_listing(model))
        .map_err(|err| BpeError::io(err, Some(target.clone())))?;
    Ok(target)
}
