use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{CommitmentTree, MerklePath, TreeParams};
use crate::error::{PrivacyError, Result};
use crate::field::FieldElement;
use crate::poseidon::hash_pair;

/// Index-addressed Merkle tree.
///
/// Only populated leaves are stored. Interior nodes on populated paths live
/// in a `(level, index)` table that each insert refreshes, so leaves can
/// arrive in any order and every other node reads from the zero table.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    params: TreeParams,
    zeros: Vec<FieldElement>,
    leaves: BTreeMap<u64, FieldElement>,
    /// Non-empty interior nodes: (level, index) -> hash, level >= 1
    nodes: HashMap<(usize, u64), FieldElement>,
}

impl SparseMerkleTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            zeros: params.zero_hashes(),
            params,
            leaves: BTreeMap::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn with_depth(depth: usize) -> Result<Self> {
        Ok(Self::new(TreeParams::new(depth)?))
    }

    fn node(&self, level: usize, index: u64) -> FieldElement {
        let stored = if level == 0 {
            self.leaves.get(&index)
        } else {
            self.nodes.get(&(level, index))
        };
        stored.copied().unwrap_or(self.zeros[level])
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.params.capacity() {
            return Err(PrivacyError::IndexOutOfBounds {
                index,
                bound: self.params.capacity(),
            });
        }
        Ok(())
    }

    /// Sets the leaf at `index`, replacing any previous value.
    pub fn insert(&mut self, index: u64, leaf: FieldElement) -> Result<()> {
        self.check_index(index)?;
        self.leaves.insert(index, leaf);

        let mut current_index = index;
        let mut current_hash = leaf;

        for level in 0..self.params.depth() {
            let is_right = current_index & 1 == 1;
            let sibling = self.node(level, current_index ^ 1);

            current_hash = if is_right {
                hash_pair(sibling, current_hash)
            } else {
                hash_pair(current_hash, sibling)
            };
            current_index >>= 1;

            self.nodes.insert((level + 1, current_index), current_hash);
        }

        debug!("set leaf {} ({} populated)", index, self.leaves.len());
        Ok(())
    }

    /// Root recomputed bottom-up from the populated leaves alone, one level at
    /// a time. Always equals [`CommitmentTree::root`].
    pub fn recompute_root(&self) -> FieldElement {
        let mut layer = self.leaves.clone();
        for level in 0..self.params.depth() {
            let mut parents = BTreeMap::new();
            for &index in layer.keys() {
                let parent = index >> 1;
                if parents.contains_key(&parent) {
                    continue;
                }
                let left = layer.get(&(parent << 1)).copied().unwrap_or(self.zeros[level]);
                let right = layer
                    .get(&((parent << 1) | 1))
                    .copied()
                    .unwrap_or(self.zeros[level]);
                parents.insert(parent, hash_pair(left, right));
            }
            layer = parents;
        }
        layer
            .get(&0)
            .copied()
            .unwrap_or(self.zeros[self.params.depth()])
    }

    /// Check if `leaf` is stored at `index`
    pub fn contains(&self, index: u64, leaf: &FieldElement) -> bool {
        self.leaves.get(&index) == Some(leaf)
    }

    /// Populated leaves in index order.
    pub fn leaves(&self) -> impl Iterator<Item = (u64, FieldElement)> + '_ {
        self.leaves.iter().map(|(i, l)| (*i, *l))
    }

    /// Number of populated leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl CommitmentTree for SparseMerkleTree {
    fn params(&self) -> &TreeParams {
        &self.params
    }

    fn root(&self) -> FieldElement {
        self.node(self.params.depth(), 0)
    }

    /// Unpopulated positions read as the zero value.
    fn leaf(&self, index: u64) -> Result<FieldElement> {
        self.check_index(index)?;
        Ok(self.node(0, index))
    }

    fn proof(&self, index: u64) -> Result<MerklePath> {
        self.check_index(index)?;

        let depth = self.params.depth();
        let mut siblings = Vec::with_capacity(depth);
        let mut path_bits = Vec::with_capacity(depth);
        let mut current_index = index;

        for level in 0..depth {
            path_bits.push(current_index & 1 == 1);
            siblings.push(self.node(level, current_index ^ 1));
            current_index >>= 1;
        }

        Ok(MerklePath {
            siblings,
            path_bits,
            position: index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    #[test]
    fn test_empty_root_uses_zero_table() {
        let params = TreeParams::new(4).unwrap().with_zero_value(Fr::from(3u64));
        let tree = SparseMerkleTree::new(params);
        assert_eq!(tree.root(), params.empty_root());
        assert_eq!(tree.recompute_root(), params.empty_root());
        assert_ne!(tree.root(), Fr::from(3u64));
    }

    #[test]
    fn test_out_of_order_inserts() {
        let mut a = SparseMerkleTree::with_depth(6).unwrap();
        let mut b = SparseMerkleTree::with_depth(6).unwrap();
        for i in [5u64, 0, 33, 2] {
            a.insert(i, Fr::from(i + 1)).unwrap();
        }
        for i in [2u64, 33, 5, 0] {
            b.insert(i, Fr::from(i + 1)).unwrap();
        }
        assert_eq!(a.root(), b.root());
        assert_eq!(a.root(), a.recompute_root());
    }

    #[test]
    fn test_gap_leaves_read_as_zero() {
        let params = TreeParams::new(4).unwrap().with_zero_value(Fr::from(7u64));
        let mut tree = SparseMerkleTree::new(params);
        tree.insert(3, Fr::from(1u64)).unwrap();
        assert_eq!(tree.leaf(1).unwrap(), Fr::from(7u64));
        assert_eq!(tree.leaf(3).unwrap(), Fr::from(1u64));
        assert!(tree.contains(3, &Fr::from(1u64)));
        assert!(!tree.contains(1, &Fr::from(7u64)));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let mut tree = SparseMerkleTree::with_depth(3).unwrap();
        assert_eq!(
            tree.insert(8, Fr::from(1u64)),
            Err(PrivacyError::IndexOutOfBounds { index: 8, bound: 8 })
        );
        assert!(tree.proof(8).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_overwrite_leaf() {
        let mut tree = SparseMerkleTree::with_depth(4).unwrap();
        tree.insert(2, Fr::from(1u64)).unwrap();
        let first = tree.root();
        tree.insert(2, Fr::from(9u64)).unwrap();
        assert_ne!(tree.root(), first);
        assert_eq!(tree.root(), tree.recompute_root());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_proofs_verify() {
        let mut tree = SparseMerkleTree::with_depth(5).unwrap();
        for i in [1u64, 4, 9, 30] {
            tree.insert(i, Fr::from(100 + i)).unwrap();
        }
        for i in [1u64, 4, 9, 30] {
            let path = tree.proof(i).unwrap();
            assert!(path.verify(Fr::from(100 + i), tree.root()));
        }
        // an empty slot proves the zero leaf
        let path = tree.proof(7).unwrap();
        assert!(path.verify(Fr::from(0u64), tree.root()));
    }
}
