//! Linker hashes
//!
//! Public tags that let the holder of a viewing key recognise their own
//! deposits and claims without revealing the link to anyone else.
//!
//! ```text
//! deposit = Poseidon(linker_key, recipient_low, recipient_high)
//! claim   = Poseidon(linker_key, leaf_index)
//! ```

use std::fmt;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::{FieldElement, field_to_decimal, split_public_key};
use crate::keys::LinkerKey;
use crate::poseidon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkerHash(#[serde(with = "crate::field::decimal")] pub FieldElement);

impl LinkerHash {
    pub fn to_field(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Display for LinkerHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&field_to_decimal(&self.0))
    }
}

/// Tag published with a deposit to `recipient` (a 32-byte public key).
pub fn deposit_linker_hash(linker_key: &LinkerKey, recipient: &[u8]) -> Result<LinkerHash> {
    let recipient = split_public_key(recipient)?;
    let hash = poseidon::hash(&[linker_key.expose(), recipient.low, recipient.high])?;
    Ok(LinkerHash(hash))
}

/// Tag published with a claim of the leaf at `leaf_index`.
pub fn claim_linker_hash(linker_key: &LinkerKey, leaf_index: u64) -> Result<LinkerHash> {
    let hash = poseidon::hash(&[linker_key.expose(), Fr::from(leaf_index)])?;
    Ok(LinkerHash(hash))
}
