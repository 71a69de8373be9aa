//! Model types and helpers for working with trained BPE vocabularies.

use rustc_hash::FxHashMap;

use crate::error::{BpeError, Result};
use crate::merge::merge_in_place;

/// Token identifier used throughout the crate.
pub type TokenId = u32;
/// Merge pair encoded as `(left, right)` token identifiers.
pub type Pair = (TokenId, TokenId);

/// Number of reserved single-byte tokens; learned merges start at this id.
pub const BASE_VOCAB_SIZE: usize = 256;

const REPLACEMENT_BYTES: &[u8] = "\u{FFFD}".as_bytes();

/// Ordered record of learned merges. The position of a pair is its rank, and its token id is
/// `256 + rank`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    pairs: Vec<Pair>,
    ids: FxHashMap<Pair, TokenId>,
}

impl MergeTable {
    /// Returns the id the pair was merged into, if it was learned.
    #[must_use]
    pub fn get(&self, pair: Pair) -> Option<TokenId> {
        self.ids.get(&pair).copied()
    }

    /// Returns `true` when the pair has been learned.
    #[must_use]
    pub fn contains(&self, pair: Pair) -> bool {
        self.ids.contains_key(&pair)
    }

    /// Learned pairs in rank order.
    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Iterates `(pair, id)` entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, TokenId)> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .map(|(rank, &pair)| (pair, (BASE_VOCAB_SIZE + rank) as TokenId))
    }

    /// Number of learned merges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` when nothing has been learned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn push(&mut self, pair: Pair, id: TokenId) {
        self.pairs.push(pair);
        self.ids.insert(pair, id);
    }
}

/// Trained BPE model: the merge table plus the byte sequence behind every token id.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpeModel {
    merges: MergeTable,
    token_bytes: Vec<Vec<u8>>,
}

impl Default for BpeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl BpeModel {
    /// Creates an untrained model holding only the 256 single-byte tokens.
    pub fn new() -> Self {
        Self {
            merges: MergeTable::default(),
            token_bytes: (0u8..=u8::MAX).map(|b| vec![b]).collect(),
        }
    }

    /// Rebuilds a model from an ordered pair list, assigning ids `256, 257, ...` in order.
    ///
    /// Every pair may only reference ids defined before it, and no pair may repeat.
    pub fn from_merges<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = Pair>,
    {
        let mut model = Self::new();
        for (rank, pair) in pairs.into_iter().enumerate() {
            let next = model.vocab_size();
            if pair.0 as usize >= next || pair.1 as usize >= next {
                return Err(BpeError::Format(format!(
                    "merge #{rank} ({}, {}) references an id not defined before {next}",
                    pair.0, pair.1
                )));
            }
            if model.merges.contains(pair) {
                return Err(BpeError::Format(format!(
                    "merge #{rank} ({}, {}) is listed more than once",
                    pair.0, pair.1
                )));
            }
            model.push_merge(pair)?;
        }
        Ok(model)
    }

    /// Appends a merge, materialising its bytes, and returns the new token id.
    pub(crate) fn push_merge(&mut self, pair: Pair) -> Result<TokenId> {
        let id = TokenId::try_from(self.token_bytes.len()).map_err(|_| {
            BpeError::InvalidConfig("vocabulary size exceeded u32::MAX".into())
        })?;
        let left = &self.token_bytes[pair.0 as usize];
        let right = &self.token_bytes[pair.1 as usize];
        let mut merged = Vec::with_capacity(left.len() + right.len());
        merged.extend_from_slice(left);
        merged.extend_from_slice(right);
        self.token_bytes.push(merged);
        self.merges.push(pair, id);
        Ok(id)
    }

    /// Returns the merge table.
    #[must_use]
    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    /// Returns the byte sequence behind every token, indexed by id.
    #[must_use]
    pub fn token_bytes(&self) -> &[Vec<u8>] {
        &self.token_bytes
    }

    /// Returns the bytes for a single token id.
    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&[u8]> {
        self.token_bytes.get(id as usize).map(Vec::as_slice)
    }

    /// Total vocabulary size including the base byte tokens.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.token_bytes.len()
    }

    /// Encodes one chunk of bytes, repeatedly applying the lowest-rank learned merge present.
    #[must_use]
    pub fn encode_chunk(&self, bytes: &[u8]) -> Vec<TokenId> {
        let mut ids: Vec<TokenId> = bytes.iter().map(|&b| TokenId::from(b)).collect();
        while ids.len() >= 2 {
            let Some((pair, id)) = self.lowest_rank_pair(&ids) else {
                break;
            };
            merge_in_place(&mut ids, pair, id);
        }
        ids
    }

    /// Finds the adjacent pair with the smallest merge id, if any adjacent pair was learned.
    fn lowest_rank_pair(&self, ids: &[TokenId]) -> Option<(Pair, TokenId)> {
        ids.windows(2)
            .filter_map(|window| {
                let pair = (window[0], window[1]);
                self.merges.get(pair).map(|id| (pair, id))
            })
            .min_by_key(|&(_, id)| id)
    }

    /// Concatenates the bytes of every token, rejecting ids outside the vocabulary.
    pub fn decode_bytes(&self, ids: &[TokenId]) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        for &id in ids {
            let token = self.token(id).ok_or(BpeError::UnknownToken {
                id,
                vocab_size: self.vocab_size(),
            })?;
            bytes.extend_from_slice(token);
        }
        Ok(bytes)
    }

    /// Concatenates the bytes of every token, substituting U+FFFD for unknown ids.
    #[must_use]
    pub fn decode_bytes_lossy(&self, ids: &[TokenId]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &id in ids {
            bytes.extend_from_slice(self.token(id).unwrap_or(REPLACEMENT_BYTES));
        }
        bytes
    }
}
