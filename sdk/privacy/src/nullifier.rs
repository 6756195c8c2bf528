//! Nullifiers
//!
//! A nullifier is a per-deposit secret. Its hash is published at claim time
//! and recorded on-chain, so the same deposit cannot be claimed twice.
//!
//! ```text
//! NullifierHash = Poseidon(nullifier)
//! ```

use std::fmt;

use ark_bn254::Fr;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Result;
use crate::field::{FieldElement, bytes_to_field, field_to_decimal};
use crate::poseidon;

/// Uniform field element drawn from 64 random bytes, so the modular bias is
/// negligible.
pub(crate) fn random_field<R: RngCore + CryptoRng>(rng: &mut R) -> FieldElement {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    let value = bytes_to_field(&bytes);
    bytes.zeroize();
    value
}

/// The secret nullifier of a deposit.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nullifier(#[serde(with = "crate::field::decimal")] FieldElement);

impl Nullifier {
    pub fn from_field(value: FieldElement) -> Self {
        Self(value)
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(random_field(rng))
    }

    pub fn expose(&self) -> FieldElement {
        self.0
    }

    /// The public tag that marks this deposit as claimed.
    pub fn hash(&self) -> Result<NullifierHash> {
        nullifier_hash(self)
    }
}

impl From<u64> for Nullifier {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nullifier(<redacted>)")
    }
}

/// Public double-claim tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullifierHash(#[serde(with = "crate::field::decimal")] pub FieldElement);

impl NullifierHash {
    pub fn to_field(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Display for NullifierHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&field_to_decimal(&self.0))
    }
}

pub fn nullifier_hash(nullifier: &Nullifier) -> Result<NullifierHash> {
    Ok(NullifierHash(poseidon::hash(&[nullifier.0])?))
}
