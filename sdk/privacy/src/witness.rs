//! Circuit witness bundles
//!
//! Field names match the deposit and claim circuits' input signals; every
//! value is a canonical decimal string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commitment::{DepositParams, DepositSecrets, build_commitment};
use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, TimestampFields, field_to_decimal, split_public_key};
use crate::keys::{SuiViewingKey, UmbraViewingKey};
use crate::linker::{claim_linker_hash, deposit_linker_hash};
use crate::merkle::CommitmentTree;
use crate::record::DepositRecord;

/// Witness for the deposit circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositWitness {
    /// Private: depositor's Sui viewing key
    #[serde(rename = "suiMVK")]
    pub sui_mvk: String,
    /// Private
    pub recipient_pub_key_low: String,
    /// Private
    pub recipient_pub_key_high: String,
    /// Private
    pub secret: String,
    /// Private
    pub nullifier: String,

    pub commitment: String,
    pub linker_hash: String,
    pub mvk_commitment: String,
    pub timestamp_year: String,
    pub timestamp_month: String,
    pub timestamp_day: String,
    pub timestamp_hour: String,
    pub timestamp_minute: String,
    pub timestamp_second: String,
    pub depositor_key_low: String,
    pub depositor_key_high: String,
    pub amount: String,
    pub token_mint_low: String,
    pub token_mint_high: String,
    pub version: String,
    pub index: String,
}

impl DepositWitness {
    /// Public signals in circuit order.
    pub fn public_inputs(&self) -> Vec<String> {
        vec![
            self.commitment.clone(),
            self.linker_hash.clone(),
            self.mvk_commitment.clone(),
            self.timestamp_year.clone(),
            self.timestamp_month.clone(),
            self.timestamp_day.clone(),
            self.timestamp_hour.clone(),
            self.timestamp_minute.clone(),
            self.timestamp_second.clone(),
            self.depositor_key_low.clone(),
            self.depositor_key_high.clone(),
            self.amount.clone(),
            self.token_mint_low.clone(),
            self.token_mint_high.clone(),
            self.version.clone(),
            self.index.clone(),
        ]
    }
}

/// The deposit circuit's witness plus the record the depositor keeps.
#[derive(Debug, Clone)]
pub struct PreparedDeposit {
    pub witness: DepositWitness,
    pub record: DepositRecord,
}

/// Builds the commitment, linker hash and witness for a new deposit.
pub fn prepare_deposit(
    viewing_key: &SuiViewingKey,
    secrets: DepositSecrets,
    params: DepositParams,
) -> Result<PreparedDeposit> {
    let DepositSecrets { secret, nullifier } = secrets;
    let opening = build_commitment(secret, nullifier, &params)?;

    let linker_key = viewing_key.deposit_itk(&params.timestamp)?.linker_key()?;
    let linker_hash = deposit_linker_hash(&linker_key, &params.recipient)?;
    let mvk_commitment = viewing_key.commitment()?;

    let recipient = split_public_key(&params.recipient)?;
    let depositor = split_public_key(&params.depositor)?;
    let token = split_public_key(&params.token)?;
    let [year, month, day, hour, minute, second] =
        TimestampFields::from_datetime(&params.timestamp)?.to_decimals();

    let witness = DepositWitness {
        sui_mvk: field_to_decimal(&viewing_key.expose()),
        recipient_pub_key_low: field_to_decimal(&recipient.low),
        recipient_pub_key_high: field_to_decimal(&recipient.high),
        secret: field_to_decimal(&opening.secret.expose()),
        nullifier: field_to_decimal(&opening.nullifier.expose()),
        commitment: opening.commitment.to_string(),
        linker_hash: linker_hash.to_string(),
        mvk_commitment: field_to_decimal(&mvk_commitment),
        timestamp_year: year,
        timestamp_month: month,
        timestamp_day: day,
        timestamp_hour: hour,
        timestamp_minute: minute,
        timestamp_second: second,
        depositor_key_low: field_to_decimal(&depositor.low),
        depositor_key_high: field_to_decimal(&depositor.high),
        amount: params.amount.to_string(),
        token_mint_low: field_to_decimal(&token.low),
        token_mint_high: field_to_decimal(&token.high),
        version: params.version.to_string(),
        index: params.leaf_index.to_string(),
    };

    let record = DepositRecord::new(opening, params, linker_hash, mvk_commitment);
    Ok(PreparedDeposit { witness, record })
}

/// Witness for the claim circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimWitness {
    /// Private: recipient's Umbra viewing key
    #[serde(rename = "umbraMVK")]
    pub umbra_mvk: String,
    pub secret: String,
    pub nullifier: String,
    pub recipient_pub_key_low: String,
    pub recipient_pub_key_high: String,
    pub version: String,
    /// Leaf index bound inside the commitment
    pub commitment_index: String,
    pub depositor_key_low: String,
    pub depositor_key_high: String,
    pub amount: String,
    pub token_mint_low: String,
    pub token_mint_high: String,
    pub deposit_timestamp_year: String,
    pub deposit_timestamp_month: String,
    pub deposit_timestamp_day: String,
    pub deposit_timestamp_hour: String,
    pub deposit_timestamp_minute: String,
    pub deposit_timestamp_second: String,
    pub merkle_path_indices: Vec<String>,
    pub merkle_path_siblings: Vec<String>,

    /// Public
    pub merkle_root: String,
    /// Public
    pub nullifier_hash: String,
    /// Public
    pub claim_linker_hash: String,
    /// Public
    pub mvk_commitment: String,
    pub claim_timestamp_year: String,
    pub claim_timestamp_month: String,
    pub claim_timestamp_day: String,
    pub claim_timestamp_hour: String,
    pub claim_timestamp_minute: String,
    pub claim_timestamp_second: String,
}

impl ClaimWitness {
    /// Assembles the claim witness for the deposit stored at `position`.
    ///
    /// Refuses to build if the local tree disagrees with `ledger_root`, if the
    /// leaf at `position` is not the commitment `record` opens, or if the
    /// Merkle path does not span the tree's depth.
    pub fn build<T: CommitmentTree>(
        viewing_key: &UmbraViewingKey,
        record: &DepositRecord,
        tree: &T,
        position: u64,
        ledger_root: FieldElement,
        claim_timestamp: &DateTime<Utc>,
    ) -> Result<Self> {
        let root = tree.root();
        if root != ledger_root {
            return Err(PrivacyError::RootMismatch {
                local: field_to_decimal(&root),
                ledger: field_to_decimal(&ledger_root),
            });
        }

        let leaf = tree.leaf(position)?;
        let commitment = record.recompute_commitment()?;
        if commitment.to_field() != leaf || commitment != record.commitment {
            return Err(PrivacyError::CommitmentMismatch { index: position });
        }

        let path = tree.proof(position)?;
        if !tree.verify_path(leaf, &path, root)? {
            return Err(PrivacyError::RootMismatch {
                local: field_to_decimal(&root),
                ledger: field_to_decimal(&ledger_root),
            });
        }

        let linker_key = viewing_key.claim_itk(claim_timestamp)?.linker_key()?;
        let claim_linker = claim_linker_hash(&linker_key, position)?;
        let nullifier_hash = record.nullifier.hash()?;
        let mvk_commitment = viewing_key.commitment()?;

        let params = &record.params;
        let recipient = split_public_key(&params.recipient)?;
        let depositor = split_public_key(&params.depositor)?;
        let token = split_public_key(&params.token)?;
        let [dy, dmo, dd, dh, dmi, ds] =
            TimestampFields::from_datetime(&params.timestamp)?.to_decimals();
        let [cy, cmo, cd, ch, cmi, cs] =
            TimestampFields::from_datetime(claim_timestamp)?.to_decimals();

        Ok(Self {
            umbra_mvk: field_to_decimal(&viewing_key.expose()),
            secret: field_to_decimal(&record.secret.expose()),
            nullifier: field_to_decimal(&record.nullifier.expose()),
            recipient_pub_key_low: field_to_decimal(&recipient.low),
            recipient_pub_key_high: field_to_decimal(&recipient.high),
            version: params.version.to_string(),
            commitment_index: params.leaf_index.to_string(),
            depositor_key_low: field_to_decimal(&depositor.low),
            depositor_key_high: field_to_decimal(&depositor.high),
            amount: params.amount.to_string(),
            token_mint_low: field_to_decimal(&token.low),
            token_mint_high: field_to_decimal(&token.high),
            deposit_timestamp_year: dy,
            deposit_timestamp_month: dmo,
            deposit_timestamp_day: dd,
            deposit_timestamp_hour: dh,
            deposit_timestamp_minute: dmi,
            deposit_timestamp_second: ds,
            merkle_path_indices: path.index_decimals(),
            merkle_path_siblings: path.sibling_decimals(),
            merkle_root: field_to_decimal(&root),
            nullifier_hash: nullifier_hash.to_string(),
            claim_linker_hash: claim_linker.to_string(),
            mvk_commitment: field_to_decimal(&mvk_commitment),
            claim_timestamp_year: cy,
            claim_timestamp_month: cmo,
            claim_timestamp_day: cd,
            claim_timestamp_hour: ch,
            claim_timestamp_minute: cmi,
            claim_timestamp_second: cs,
        })
    }

    /// Public signals in circuit order.
    pub fn public_inputs(&self) -> Vec<String> {
        vec![
            self.merkle_root.clone(),
            self.nullifier_hash.clone(),
            self.claim_linker_hash.clone(),
            self.mvk_commitment.clone(),
            self.claim_timestamp_year.clone(),
            self.claim_timestamp_month.clone(),
            self.claim_timestamp_day.clone(),
            self.claim_timestamp_hour.clone(),
            self.claim_timestamp_minute.clone(),
            self.claim_timestamp_second.clone(),
        ]
    }
}
