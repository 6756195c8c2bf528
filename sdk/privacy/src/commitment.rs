//! Deposit Commitments
//!
//! Two-layer Poseidon commitment binding a deposit's secrets, recipient and
//! public parameters.
//!
//! ```text
//! inner      = Poseidon(secret, nullifier, recipient_low, recipient_high)
//! commitment = Poseidon(version, leaf_index, inner,
//!                       depositor_low, depositor_high, amount,
//!                       token_low, token_high,
//!                       year, month, day, hour, minute, second)
//! ```
//!
//! Only `commitment` is ever published. Public keys and the token identifier
//! are split into two 128-bit halves before hashing.

use std::fmt;

use ark_bn254::Fr;
use chrono::{DateTime, Utc};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Result;
use crate::field::{FieldElement, TimestampFields, field_to_decimal, split_public_key};
use crate::nullifier::{Nullifier, random_field};
use crate::poseidon;

/// Version bound into every commitment built by this crate.
pub const COMMITMENT_VERSION: u64 = 1;

/// Leaf index bound into a commitment before the deposit lands in the tree.
/// The real position is only known after the ledger appends it.
pub const PLACEHOLDER_LEAF_INDEX: u64 = 0;

/// A deposit commitment (one field element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(#[serde(with = "crate::field::decimal")] pub FieldElement);

impl Commitment {
    pub fn from_field(f: FieldElement) -> Self {
        Self(f)
    }

    pub fn to_field(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&field_to_decimal(&self.0))
    }
}

/// The deposit's blinding secret.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(#[serde(with = "crate::field::decimal")] FieldElement);

impl Secret {
    pub fn from_field(value: FieldElement) -> Self {
        Self(value)
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(random_field(rng))
    }

    pub fn expose(&self) -> FieldElement {
        self.0
    }
}

impl From<u64> for Secret {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Fresh per-deposit secrets.
#[derive(Debug, Clone)]
pub struct DepositSecrets {
    pub secret: Secret,
    pub nullifier: Nullifier,
}

impl DepositSecrets {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            secret: Secret::random(rng),
            nullifier: Nullifier::random(rng),
        }
    }
}

/// Public parameters a commitment binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositParams {
    /// Recipient's stealth public key
    #[serde(with = "hex")]
    pub recipient: [u8; 32],
    #[serde(with = "hex")]
    pub depositor: [u8; 32],
    pub amount: u64,
    /// Token mint / coin type identifier
    #[serde(with = "hex")]
    pub token: [u8; 32],
    pub timestamp: DateTime<Utc>,
    pub version: u64,
    pub leaf_index: u64,
}

impl DepositParams {
    pub fn new(
        recipient: [u8; 32],
        depositor: [u8; 32],
        amount: u64,
        token: [u8; 32],
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            recipient,
            depositor,
            amount,
            token,
            timestamp,
            version: COMMITMENT_VERSION,
            leaf_index: PLACEHOLDER_LEAF_INDEX,
        }
    }

    pub fn with_leaf_index(mut self, leaf_index: u64) -> Self {
        self.leaf_index = leaf_index;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// A commitment together with the secrets that open it.
#[derive(Debug, Clone)]
pub struct CommitmentOpening {
    pub commitment: Commitment,
    pub secret: Secret,
    pub nullifier: Nullifier,
}

/// Builds the deposit commitment.
///
/// Fails only if one of the 32-byte inputs could not be split, which the
/// fixed-size parameters rule out, or if the timestamp predates year 0.
pub fn build_commitment(
    secret: Secret,
    nullifier: Nullifier,
    params: &DepositParams,
) -> Result<CommitmentOpening> {
    let recipient = split_public_key(&params.recipient)?;
    let depositor = split_public_key(&params.depositor)?;
    let token = split_public_key(&params.token)?;
    let [year, month, day, hour, minute, second] =
        TimestampFields::from_datetime(&params.timestamp)?.to_fields();

    let inner = poseidon::hash(&[
        secret.expose(),
        nullifier.expose(),
        recipient.low,
        recipient.high,
    ])?;

    let outer = poseidon::hash(&[
        Fr::from(params.version),
        Fr::from(params.leaf_index),
        inner,
        depositor.low,
        depositor.high,
        Fr::from(params.amount),
        token.low,
        token.high,
        year,
        month,
        day,
        hour,
        minute,
        second,
    ])?;

    Ok(CommitmentOpening {
        commitment: Commitment(outer),
        secret,
        nullifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params() -> DepositParams {
        DepositParams::new(
            [3u8; 32],
            [4u8; 32],
            1_000_000,
            [1u8; 32],
            Utc.with_ymd_and_hms(2025, 11, 19, 12, 0, 0).unwrap(),
        )
    }

    fn commit(secret: u64, nullifier: u64, params: &DepositParams) -> Commitment {
        build_commitment(Secret::from(secret), Nullifier::from(nullifier), params)
            .unwrap()
            .commitment
    }

    #[test]
    fn test_commitment_deterministic() {
        let c1 = commit(12345, 67890, &params());
        let c2 = commit(12345, 67890, &params());
        assert_eq!(c1, c2, "same inputs should produce same commitment");
    }

    #[test]
    fn test_commitment_hiding() {
        let c1 = commit(1, 67890, &params());
        let c2 = commit(2, 67890, &params());
        assert_ne!(c1, c2, "different secrets should produce different commitments");
    }

    #[test]
    fn test_commitment_sensitive_to_every_input() {
        let base = commit(12345, 67890, &params());

        let mut variants: Vec<(&str, Commitment)> = vec![
            ("secret", commit(12346, 67890, &params())),
            ("nullifier", commit(12345, 67891, &params())),
            ("leaf index", commit(12345, 67890, &params().with_leaf_index(5))),
            ("version", commit(12345, 67890, &params().with_version(2))),
        ];

        let tweaks: [(&str, fn(&mut DepositParams)); 6] = [
            ("recipient", |p| p.recipient[0] ^= 1),
            ("depositor", |p| p.depositor[31] ^= 1),
            ("amount", |p| p.amount += 1),
            ("token low half", |p| p.token[0] ^= 1),
            ("token high half", |p| p.token[31] ^= 1),
            ("timestamp", |p| {
                p.timestamp = Utc.with_ymd_and_hms(2025, 11, 19, 12, 0, 1).unwrap()
            }),
        ];
        for (name, tweak) in tweaks {
            let mut p = params();
            tweak(&mut p);
            variants.push((name, commit(12345, 67890, &p)));
        }

        for (name, variant) in variants {
            assert_ne!(base, variant, "{} must be bound by the commitment", name);
        }
    }

    #[test]
    fn test_commitment_structure() {
        let p = params();
        let recipient = split_public_key(&p.recipient).unwrap();
        let depositor = split_public_key(&p.depositor).unwrap();
        let token = split_public_key(&p.token).unwrap();
        let ts = TimestampFields::from_datetime(&p.timestamp).unwrap().to_fields();

        let inner = poseidon::hash(&[
            Fr::from(12345u64),
            Fr::from(67890u64),
            recipient.low,
            recipient.high,
        ])
        .unwrap();
        let mut outer_inputs = vec![
            Fr::from(COMMITMENT_VERSION),
            Fr::from(PLACEHOLDER_LEAF_INDEX),
            inner,
            depositor.low,
            depositor.high,
            Fr::from(p.amount),
            token.low,
            token.high,
        ];
        outer_inputs.extend_from_slice(&ts);
        let expected = poseidon::hash(&outer_inputs).unwrap();

        assert_eq!(commit(12345, 67890, &p).to_field(), expected);
    }

    #[test]
    fn test_params_serde_roundtrip() {
        let p = params().with_leaf_index(9);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(&"03".repeat(32)));
        let back: DepositParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
