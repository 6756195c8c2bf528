//! Merkle accumulators for deposit commitments
//!
//! ```text
//!                    Root
//!                   /    \
//!                 H01    H23
//!                /  \   /   \
//!               H0  H1 H2   H3
//!               |   |   |    |
//!              C0  C1  C2   Z0  (commitments, Z0 = zero leaf)
//! ```
//!
//! Empty subtrees hash to a precomputed zero table:
//! `zero[0] = zero_value`, `zero[k] = H(zero[k-1], zero[k-1])`.
//!
//! [`IncrementalMerkleTree`] is the append-only view the ledger maintains.
//! [`SparseMerkleTree`] is index-addressed and rebuilt from replayed events.
//! Both agree on roots and proofs for the same leaves.

mod incremental;
mod sparse;

pub use incremental::IncrementalMerkleTree;
pub use sparse::SparseMerkleTree;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, field_to_decimal};
use crate::poseidon::hash_pair;

pub const DEFAULT_DEPTH: usize = 20;
pub const MAX_DEPTH: usize = 32;

/// Shape of a tree: depth and the value of an empty leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    depth: usize,
    #[serde(with = "crate::field::decimal")]
    zero_value: FieldElement,
}

impl TreeParams {
    pub fn new(depth: usize) -> Result<Self> {
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(PrivacyError::InvalidDepth(depth));
        }
        Ok(Self {
            depth,
            zero_value: Fr::from(0u64),
        })
    }

    pub fn with_zero_value(mut self, zero_value: FieldElement) -> Self {
        self.zero_value = zero_value;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn zero_value(&self) -> FieldElement {
        self.zero_value
    }

    /// Number of leaves, `2^depth`.
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    /// `zero[0..=depth]`
    pub fn zero_hashes(&self) -> Vec<FieldElement> {
        let mut zeros = Vec::with_capacity(self.depth + 1);
        let mut current = self.zero_value;
        zeros.push(current);
        for _ in 0..self.depth {
            current = hash_pair(current, current);
            zeros.push(current);
        }
        zeros
    }

    /// Root of a tree with no leaves.
    pub fn empty_root(&self) -> FieldElement {
        self.zero_hashes()[self.depth]
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            zero_value: Fr::from(0u64),
        }
    }
}

/// A Merkle path proving inclusion of a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    /// Sibling hashes from leaf to root
    pub siblings: Vec<FieldElement>,
    /// Position bits (false = left, true = right)
    pub path_bits: Vec<bool>,
    /// The leaf position
    pub position: u64,
}

impl MerklePath {
    /// Verify that this path proves inclusion of `leaf` in `root`
    pub fn verify(&self, leaf: FieldElement, root: FieldElement) -> bool {
        verify_proof(leaf, self.position, &self.siblings, root)
    }

    /// Siblings as decimal strings, leaf level first.
    pub fn sibling_decimals(&self) -> Vec<String> {
        self.siblings.iter().map(field_to_decimal).collect()
    }

    /// Path bits as "0"/"1" strings, leaf level first.
    pub fn index_decimals(&self) -> Vec<String> {
        self.path_bits
            .iter()
            .map(|bit| if *bit { "1" } else { "0" }.to_string())
            .collect()
    }
}

/// Folds `leaf` up through `siblings`. Bit `k` of `leaf_index` set means the
/// running node is the right child at level `k`.
pub fn compute_root(leaf: FieldElement, leaf_index: u64, siblings: &[FieldElement]) -> FieldElement {
    let mut current = leaf;
    let mut index = leaf_index;
    for sibling in siblings {
        current = if index & 1 == 1 {
            hash_pair(*sibling, current)
        } else {
            hash_pair(current, *sibling)
        };
        index >>= 1;
    }
    current
}

/// Checks `siblings` proves `leaf` at `leaf_index` under `expected_root`.
///
/// An index with bits set above the path length addresses no leaf of the
/// tree and never verifies.
pub fn verify_proof(
    leaf: FieldElement,
    leaf_index: u64,
    siblings: &[FieldElement],
    expected_root: FieldElement,
) -> bool {
    index_fits(leaf_index, siblings.len())
        && compute_root(leaf, leaf_index, siblings) == expected_root
}

fn index_fits(index: u64, depth: usize) -> bool {
    depth >= u64::BITS as usize || index >> depth == 0
}

/// Read access shared by both accumulators.
pub trait CommitmentTree {
    fn params(&self) -> &TreeParams;

    fn root(&self) -> FieldElement;

    /// Leaf stored at `index`.
    fn leaf(&self, index: u64) -> Result<FieldElement>;

    fn proof(&self, index: u64) -> Result<MerklePath>;

    fn depth(&self) -> usize {
        self.params().depth()
    }

    /// Like [`verify_proof`], but rejects paths whose length does not match
    /// this tree's depth.
    fn verify_path(&self, leaf: FieldElement, path: &MerklePath, root: FieldElement) -> Result<bool> {
        if path.siblings.len() != self.depth() {
            return Err(PrivacyError::PathLengthMismatch {
                expected: self.depth(),
                actual: path.siblings.len(),
            });
        }
        if path.position >= self.params().capacity() {
            return Err(PrivacyError::IndexOutOfBounds {
                index: path.position,
                bound: self.params().capacity(),
            });
        }
        Ok(path.verify(leaf, root))
    }
}

/// One level up: pairs `layer` into parents, padding a trailing odd node
/// with `zero`.
pub(crate) fn parent_layer(layer: &[FieldElement], zero: FieldElement) -> Vec<FieldElement> {
    layer
        .chunks(2)
        .map(|pair| hash_pair(pair[0], pair.get(1).copied().unwrap_or(zero)))
        .collect()
}
