use log::debug;

use super::{CommitmentTree, MerklePath, TreeParams, parent_layer};
use crate::error::{PrivacyError, Result};
use crate::field::FieldElement;
use crate::poseidon::hash_pair;

/// Append-only Merkle tree.
///
/// Keeps one frontier node per level (the latest left child there), so an
/// insert costs `depth` hashes and the root is cached. Leaves are retained
/// for proof generation.
#[derive(Debug, Clone)]
pub struct IncrementalMerkleTree {
    params: TreeParams,
    zeros: Vec<FieldElement>,
    leaves: Vec<FieldElement>,
    /// Frontier nodes at each level (index 0 = leaf level)
    frontier: Vec<Option<FieldElement>>,
    root: FieldElement,
}

impl IncrementalMerkleTree {
    pub fn new(params: TreeParams) -> Self {
        let zeros = params.zero_hashes();
        let root = zeros[params.depth()];
        Self {
            frontier: vec![None; params.depth()],
            params,
            zeros,
            leaves: Vec::new(),
            root,
        }
    }

    pub fn with_depth(depth: usize) -> Result<Self> {
        Ok(Self::new(TreeParams::new(depth)?))
    }

    /// Appends `leaf` and returns its position.
    pub fn insert(&mut self, leaf: FieldElement) -> Result<u64> {
        let position = self.len();
        if position >= self.capacity() {
            return Err(PrivacyError::TreeFull {
                capacity: self.capacity(),
            });
        }

        let mut current = leaf;
        let mut current_position = position;

        for level in 0..self.params.depth() {
            if current_position & 1 == 1 {
                let left = self.frontier[level].unwrap_or(self.zeros[level]);
                current = hash_pair(left, current);
            } else {
                self.frontier[level] = Some(current);
                current = hash_pair(current, self.zeros[level]);
            }
            current_position >>= 1;
        }

        self.leaves.push(leaf);
        self.root = current;
        debug!("appended leaf at position {}", position);
        Ok(position)
    }

    /// Root recomputed directly from all leaves. Always equals [`Self::root`].
    pub fn root_from_leaves(&self) -> FieldElement {
        let mut layer = self.leaves.clone();
        for level in 0..self.params.depth() {
            if layer.is_empty() {
                break;
            }
            layer = parent_layer(&layer, self.zeros[level]);
        }
        layer.first().copied().unwrap_or(self.zeros[self.params.depth()])
    }

    pub fn leaves(&self) -> &[FieldElement] {
        &self.leaves
    }

    pub fn len(&self) -> u64 {
        self.leaves.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn capacity(&self) -> u64 {
        self.params.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    fn check_index(&self, index: u64) -> Result<usize> {
        if index >= self.len() {
            return Err(PrivacyError::IndexOutOfBounds {
                index,
                bound: self.len(),
            });
        }
        Ok(index as usize)
    }
}

impl CommitmentTree for IncrementalMerkleTree {
    fn params(&self) -> &TreeParams {
        &self.params
    }

    fn root(&self) -> FieldElement {
        self.root
    }

    fn leaf(&self, index: u64) -> Result<FieldElement> {
        let i = self.check_index(index)?;
        Ok(self.leaves[i])
    }

    fn proof(&self, index: u64) -> Result<MerklePath> {
        self.check_index(index)?;

        let depth = self.params.depth();
        let mut siblings = Vec::with_capacity(depth);
        let mut path_bits = Vec::with_capacity(depth);
        let mut layer = self.leaves.clone();
        let mut current_index = index;

        for level in 0..depth {
            let sibling_index = (current_index ^ 1) as usize;
            siblings.push(layer.get(sibling_index).copied().unwrap_or(self.zeros[level]));
            path_bits.push(current_index & 1 == 1);

            layer = parent_layer(&layer, self.zeros[level]);
            current_index >>= 1;
        }

        Ok(MerklePath {
            siblings,
            path_bits,
            position: index,
        })
    }
}
