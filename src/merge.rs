//! Pair replacement over token sequences.

use crate::model::{Pair, TokenId};

/// Replaces every non-overlapping occurrence of `pair` with `replacement`, scanning left to
/// right, and returns the number of replacements made.
///
/// Runs of identical tokens are consumed greedily: merging `(a, a)` over `[a, a, a]` yields
/// `[X, a]`.
pub fn merge_in_place(sequence: &mut Vec<TokenId>, pair: Pair, replacement: TokenId) -> usize {
    let original_len = sequence.len();
    if original_len < 2 {
        return 0;
    }

    let mut read = 0usize;
    let mut write = 0usize;
    let mut merges = 0usize;
    while read < original_len {
        if read + 1 < original_len && sequence[read] == pair.0 && sequence[read + 1] == pair.1 {
            sequence[write] = replacement;
            read += 2;
            merges += 1;
        } else {
            if write != read {
                sequence[write] = sequence[read];
            }
            read += 1;
        }
        write += 1;
    }

    sequence.truncate(write);
    merges
}

/// Returns a copy of `sequence` with every occurrence of `pair` collapsed into `replacement`.
#[must_use]
pub fn merge_pair(sequence: &[TokenId], pair: Pair, replacement: TokenId) -> Vec<TokenId> {
    let mut merged = sequence.to_vec();
    merge_in_place(&mut merged, pair, replacement);
    merged
}
