//! Deposit Records
//!
//! Everything the claimant needs to later open a deposit, kept off-chain
//! (encrypted, see [`crate::encryption`]).
//!
//! ```text
//! DepositRecord = {
//!     commitment, secret, nullifier,   // the opening
//!     params,                          // recipient, depositor, amount, token,
//!                                      // timestamp, version, bound leaf index
//!     deposit_linker_hash,
//!     mvk_commitment,                  // depositor's Poseidon(mvk)
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::commitment::{
    Commitment, CommitmentOpening, DepositParams, Secret, build_commitment,
};
use crate::error::{PrivacyError, Result};
use crate::field::FieldElement;
use crate::linker::LinkerHash;
use crate::nullifier::Nullifier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRecord {
    pub commitment: Commitment,
    pub secret: Secret,
    pub nullifier: Nullifier,
    pub params: DepositParams,
    pub deposit_linker_hash: LinkerHash,
    #[serde(with = "crate::field::decimal")]
    pub mvk_commitment: FieldElement,
}

impl DepositRecord {
    pub fn new(
        opening: CommitmentOpening,
        params: DepositParams,
        deposit_linker_hash: LinkerHash,
        mvk_commitment: FieldElement,
    ) -> Self {
        Self {
            commitment: opening.commitment,
            secret: opening.secret,
            nullifier: opening.nullifier,
            params,
            deposit_linker_hash,
            mvk_commitment,
        }
    }

    /// Recomputes the commitment from the stored opening.
    pub fn recompute_commitment(&self) -> Result<Commitment> {
        let opening = build_commitment(self.secret.clone(), self.nullifier.clone(), &self.params)?;
        Ok(opening.commitment)
    }

    /// Checks the stored opening still produces the stored commitment.
    pub fn verify(&self) -> Result<()> {
        if self.recompute_commitment()? != self.commitment {
            return Err(PrivacyError::CommitmentMismatch {
                index: self.params.leaf_index,
            });
        }
        Ok(())
    }

    pub fn opening(&self) -> CommitmentOpening {
        CommitmentOpening {
            commitment: self.commitment,
            secret: self.secret.clone(),
            nullifier: self.nullifier.clone(),
        }
    }
}
