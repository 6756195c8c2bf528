use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::stealth::StealthKeypair;
use super::viewing::{SuiViewingKey, UmbraViewingKey};
use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, bytes_to_field};

pub const SEED_LEN: usize = 32;

/// Message the wallet signs to bootstrap the master seed.
pub const SIGNING_MESSAGE: &str = "UmbraPrivacy - Do NOT sign this message unless you are using a product by the Umbra Privacy Team or an integration with Umbra Privacy";

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"Sui Signed Message:";

/// The digest a wallet actually signs: blake2b-256 over the prefixed message.
pub fn signing_digest() -> [u8; 32] {
    let mut input = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + SIGNING_MESSAGE.len());
    input.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    input.extend_from_slice(SIGNING_MESSAGE.as_bytes());

    let hash = blake2b_simd::Params::new().hash_length(32).hash(&input);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Root secret of a user's key hierarchy.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSeed([u8; SEED_LEN]);

impl MasterSeed {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let seed: [u8; SEED_LEN] =
            bytes
                .try_into()
                .map_err(|_| PrivacyError::InvalidSeedLength {
                    expected: SEED_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(seed))
    }

    /// Seed = Keccak-256 of the raw 64-byte wallet signature over
    /// [`signing_digest`].
    pub fn from_signature(signature: &[u8]) -> Result<Self> {
        if signature.len() < SEED_LEN {
            return Err(PrivacyError::InvalidSeedLength {
                expected: SEED_LEN,
                actual: signature.len(),
            });
        }
        Ok(Self(Keccak256::digest(signature).into()))
    }

    /// Signs the bootstrap message locally. Ed25519 signatures are
    /// deterministic, so the same wallet key always yields the same seed.
    pub fn from_wallet_key(wallet: &SigningKey) -> Result<Self> {
        let signature = wallet.sign(&signing_digest());
        Self::from_signature(&signature.to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    pub(crate) fn to_field(&self) -> FieldElement {
        bytes_to_field(&self.0)
    }

    pub fn sui_viewing_key(&self) -> Result<SuiViewingKey> {
        SuiViewingKey::derive(self)
    }

    pub fn umbra_viewing_key(&self, address_index: u64) -> Result<UmbraViewingKey> {
        UmbraViewingKey::derive(self, address_index)
    }

    pub fn stealth_keypair(&self, index: u32) -> StealthKeypair {
        StealthKeypair::derive(self, index)
    }
}

impl fmt::Debug for MasterSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSeed(<redacted>)")
    }
}
