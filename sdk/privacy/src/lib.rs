//! Umbra Privacy SDK
//!
//! Client-side cryptography for private deposits and claims: commitments,
//! nullifiers, the viewing-key hierarchy and the Merkle accumulators the
//! claim proof is built against.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Deposit / Claim                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │  MasterSeed  │  │ Commitment   │  │  Encrypted record      │  │
//! │  │  MVK / ITK   │  │ Nullifier    │  │  (off-chain storage)   │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────────┘  │
//! │         │                 │                                      │
//! │         ▼                 ▼                                      │
//! │  ┌───────────────────────────────────────────────────────────┐   │
//! │  │  Witness (decimal strings) for the deposit / claim circuit │   │
//! │  │  • commitment opening        • linker hash                 │   │
//! │  │  • Merkle path to the root   • nullifier hash              │   │
//! │  └───────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is computed over the BN254 scalar field with Poseidon.

pub mod commitment;
pub mod encryption;
pub mod error;
pub mod events;
pub mod field;
pub mod keys;
pub mod linker;
pub mod merkle;
pub mod nullifier;
pub mod poseidon;
pub mod record;
pub mod witness;

pub use commitment::{
    COMMITMENT_VERSION, Commitment, CommitmentOpening, DepositParams, DepositSecrets,
    PLACEHOLDER_LEAF_INDEX, Secret, build_commitment,
};
pub use encryption::{EncryptedRecord, RecordKey, decrypt_record, encrypt_record, try_decrypt_record};
pub use error::{ErrorKind, PrivacyError, Result};
pub use events::{DepositEvent, RawDepositEvent, RawValue, ReplayReport, replay};
pub use field::{
    FieldElement, SplitKey, TimestampFields, bytes_to_field, field_from_decimal, field_to_bytes_be,
    field_to_decimal, split_public_key, string_to_field, timestamp_from_components,
    timestamp_to_fields,
};
pub use keys::{
    IntentTransmissionKey, LinkerKey, MasterSeed, MemoKey, StealthKeypair, SuiViewingKey,
    UmbraViewingKey,
};
pub use linker::{LinkerHash, claim_linker_hash, deposit_linker_hash};
pub use merkle::{
    CommitmentTree, DEFAULT_DEPTH, IncrementalMerkleTree, MAX_DEPTH, MerklePath, SparseMerkleTree,
    TreeParams, compute_root, verify_proof,
};
pub use nullifier::{Nullifier, NullifierHash, nullifier_hash};
pub use record::DepositRecord;
pub use witness::{ClaimWitness, DepositWitness, PreparedDeposit, prepare_deposit};
