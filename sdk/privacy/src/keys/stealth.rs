//! One-time receiving keys.
//!
//! Child seed = KMAC256(key = master seed, msg = "Umbra-Address-Generation" ‖ be32(index)),
//! 32 bytes of output, empty customization. The child seed is used directly as
//! an Ed25519 secret key.

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use sha3::{
    CShake256, CShake256Core,
    digest::{ExtendableOutput, Update, XofReader},
};
use zeroize::Zeroize;

use super::seed::MasterSeed;

pub const STEALTH_DOMAIN: &str = "Umbra-Address-Generation";

/// cSHAKE256 block size in bytes.
const KMAC256_RATE: usize = 136;

fn left_encode(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let mut out = Vec::with_capacity(9);
    out.push((8 - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
    out
}

fn right_encode(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    let mut out = bytes[skip..].to_vec();
    out.push((8 - skip) as u8);
    out
}

fn encode_string(s: &[u8]) -> Vec<u8> {
    let mut out = left_encode(8 * s.len() as u64);
    out.extend_from_slice(s);
    out
}

fn bytepad(input: &[u8], width: usize) -> Vec<u8> {
    let mut out = left_encode(width as u64);
    out.extend_from_slice(input);
    let padded = out.len().div_ceil(width) * width;
    out.resize(padded, 0);
    out
}

/// KMAC256 (NIST SP 800-185) with an empty customization string.
pub fn kmac256(key: &[u8], message: &[u8], out_len: usize) -> Vec<u8> {
    kmac256_customized(key, message, out_len, b"")
}

fn kmac256_customized(key: &[u8], message: &[u8], out_len: usize, customization: &[u8]) -> Vec<u8> {
    let mut padded_key = bytepad(&encode_string(key), KMAC256_RATE);

    let mut xof = CShake256::from_core(CShake256Core::new_with_function_name(b"KMAC", customization));
    xof.update(&padded_key);
    xof.update(message);
    xof.update(&right_encode(8 * out_len as u64));
    padded_key.zeroize();

    let mut out = vec![0u8; out_len];
    xof.finalize_xof().read(&mut out);
    out
}

/// Ed25519 keypair for one receiving address.
#[derive(Clone)]
pub struct StealthKeypair {
    index: u32,
    signing_key: SigningKey,
}

impl StealthKeypair {
    pub fn derive(seed: &MasterSeed, index: u32) -> Self {
        let mut message = Vec::with_capacity(STEALTH_DOMAIN.len() + 4);
        message.extend_from_slice(STEALTH_DOMAIN.as_bytes());
        message.extend_from_slice(&index.to_be_bytes());

        let mut child = [0u8; 32];
        let mut derived = kmac256(seed.as_bytes(), &message, child.len());
        child.copy_from_slice(&derived);
        derived.zeroize();

        let signing_key = SigningKey::from_bytes(&child);
        child.zeroize();
        Self { index, signing_key }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The 32-byte public key deposits are addressed to.
    pub fn public_key(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }
}

impl fmt::Debug for StealthKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StealthKeypair")
            .field("index", &self.index)
            .field("public_key", &self.verifying_key())
            .finish()
    }
}
