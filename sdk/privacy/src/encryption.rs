//! Record Encryption
//!
//! Deposit records are stored off-chain under a key only the viewing-key
//! holder can derive.
//!
//! ```text
//! key        = blake3::derive_key("umbra-deposit-record-v1", mvk_be_bytes)
//! ciphertext = ChaCha20-Poly1305(key, random nonce, json(record))
//! ```

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::commitment::Commitment;
use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, field_to_bytes_be};
use crate::keys::{SuiViewingKey, UmbraViewingKey};
use crate::record::DepositRecord;

const RECORD_KEY_CONTEXT: &str = "umbra-deposit-record-v1";

/// An encrypted deposit record (handed to storage)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Nonce for ChaCha20-Poly1305
    #[serde(with = "hex")]
    pub nonce: [u8; 12],
    /// Encrypted record with authentication tag
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedRecord {
    /// nonce + tag
    pub const OVERHEAD: usize = 12 + 16;
}

/// Symmetric key for deposit records.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecordKey([u8; 32]);

impl RecordKey {
    fn derive(mvk: FieldElement) -> Self {
        let mut material = field_to_bytes_be(&mvk);
        let key = blake3::derive_key(RECORD_KEY_CONTEXT, &material);
        material.zeroize();
        Self(key)
    }

    /// Key for records a depositor keeps about their own deposits.
    pub fn for_depositor(mvk: &SuiViewingKey) -> Self {
        Self::derive(mvk.expose())
    }

    /// Key for records addressed to a receiving address.
    pub fn for_recipient(mvk: &UmbraViewingKey) -> Self {
        Self::derive(mvk.expose())
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305> {
        ChaCha20Poly1305::new_from_slice(&self.0).map_err(|_| PrivacyError::DecryptionFailed)
    }
}

pub fn encrypt_record<R: RngCore + CryptoRng>(
    record: &DepositRecord,
    key: &RecordKey,
    rng: &mut R,
) -> Result<EncryptedRecord> {
    let mut plaintext =
        serde_json::to_vec(record).map_err(|e| PrivacyError::Serialization(e.to_string()))?;

    let mut nonce_bytes = [0u8; 12];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()?
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| PrivacyError::Serialization("record encryption failed".into()));
    plaintext.zeroize();

    Ok(EncryptedRecord {
        nonce: nonce_bytes,
        ciphertext: ciphertext?,
    })
}

/// Fails with `DecryptionFailed` under the wrong key or on tampered data.
pub fn decrypt_record(encrypted: &EncryptedRecord, key: &RecordKey) -> Result<DepositRecord> {
    let nonce = Nonce::from_slice(&encrypted.nonce);
    let mut plaintext = key
        .cipher()?
        .decrypt(nonce, encrypted.ciphertext.as_slice())
        .map_err(|_| PrivacyError::DecryptionFailed)?;

    let record = serde_json::from_slice(&plaintext).map_err(|_| PrivacyError::DecryptionFailed);
    plaintext.zeroize();
    record
}

/// Scan mode: returns the record only if it decrypts and opens
/// `expected_commitment`.
pub fn try_decrypt_record(
    encrypted: &EncryptedRecord,
    key: &RecordKey,
    expected_commitment: &Commitment,
) -> Option<DepositRecord> {
    let record = decrypt_record(encrypted, key).ok()?;
    if &record.commitment != expected_commitment || record.verify().is_err() {
        return None;
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::{DepositParams, Secret, build_commitment};
    use crate::field::timestamp_from_components;
    use crate::keys::MasterSeed;
    use crate::linker::LinkerHash;
    use crate::nullifier::Nullifier;
    use ark_bn254::Fr;
    use rand::{SeedableRng, rngs::StdRng};

    fn record() -> DepositRecord {
        let params = DepositParams::new(
            [3u8; 32],
            [4u8; 32],
            500,
            [1u8; 32],
            timestamp_from_components(2025, 11, 19, 12, 0, 0).unwrap(),
        );
        let opening = build_commitment(Secret::from(12345), Nullifier::from(67890), &params).unwrap();
        DepositRecord::new(opening, params, LinkerHash(Fr::from(1u64)), Fr::from(2u64))
    }

    fn key(seed_byte: u8) -> RecordKey {
        let seed = MasterSeed::from_bytes(&[seed_byte; 32]).unwrap();
        RecordKey::for_depositor(&seed.sui_viewing_key().unwrap())
    }

    #[test]
    fn test_encrypt_decrypt_record() {
        let mut rng = StdRng::seed_from_u64(1);
        let record = record();
        let encrypted = encrypt_record(&record, &key(7), &mut rng).unwrap();
        let decrypted = decrypt_record(&encrypted, &key(7)).expect("decryption should succeed");

        assert_eq!(decrypted.commitment, record.commitment);
        assert_eq!(decrypted.secret, record.secret);
        assert_eq!(decrypted.params, record.params);
        assert!(encrypted.ciphertext.len() > EncryptedRecord::OVERHEAD);
    }

    #[test]
    fn test_wrong_key_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let encrypted = encrypt_record(&record(), &key(7), &mut rng).unwrap();
        assert_eq!(
            decrypt_record(&encrypted, &key(8)).unwrap_err(),
            PrivacyError::DecryptionFailed,
            "wrong key should fail decryption"
        );
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut encrypted = encrypt_record(&record(), &key(7), &mut rng).unwrap();
        encrypted.ciphertext[0] ^= 1;
        assert!(decrypt_record(&encrypted, &key(7)).is_err());
    }

    #[test]
    fn test_roles_use_distinct_keys() {
        let seed = MasterSeed::from_bytes(&[7u8; 32]).unwrap();
        let depositor = RecordKey::for_depositor(&seed.sui_viewing_key().unwrap());
        let recipient = RecordKey::for_recipient(&seed.umbra_viewing_key(0).unwrap());
        let mut rng = StdRng::seed_from_u64(2);
        let encrypted = encrypt_record(&record(), &depositor, &mut rng).unwrap();
        assert!(decrypt_record(&encrypted, &recipient).is_err());
    }

    #[test]
    fn test_commitment_verification() {
        let mut rng = StdRng::seed_from_u64(3);
        let record = record();
        let encrypted = encrypt_record(&record, &key(7), &mut rng).unwrap();

        assert!(try_decrypt_record(&encrypted, &key(7), &record.commitment).is_some());
        let wrong = Commitment(Fr::from(0u64));
        assert!(try_decrypt_record(&encrypted, &key(7), &wrong).is_none());
    }
}
