//! Shared fixtures and utilities for the Umbra circuit input generators
//!
//! Both binaries derive the same deterministic wallet, deposit and ledger so
//! the claim input always matches the deposit input written alongside it.

use anyhow::{Context, Result};
use ark_bn254::Fr;
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use umbra_config::UmbraConfig;
use umbra_privacy::{
    DepositParams, DepositSecrets, MasterSeed, Nullifier, PreparedDeposit, Secret,
    poseidon, prepare_deposit, timestamp_from_components,
};

/// Fixed test secrets
pub const TEST_SECRET: u64 = 12345;
pub const TEST_NULLIFIER: u64 = 67890;

pub const TEST_AMOUNT: u64 = 1000;

/// Ledger position of the test deposit
pub const DEPOSIT_INDEX: u64 = 5;

/// Filler leaves before and after the deposit
pub const FILLERS_BEFORE: u64 = 5;
pub const FILLERS_AFTER: u64 = 3;

const WALLET_KEY: [u8; 32] = [11u8; 32];
const DEPOSITOR_KEY: [u8; 32] = [22u8; 32];
const TOKEN_MINT: [u8; 32] = [1u8; 32];

pub const DEPOSIT_FILE: &str = "deposit_input.json";
pub const CLAIM_FILE: &str = "claim_input.json";

/// Seed derived from the fixed test wallet
pub fn wallet_seed() -> Result<MasterSeed> {
    MasterSeed::from_wallet_key(&SigningKey::from_bytes(&WALLET_KEY))
        .context("Failed to derive master seed from test wallet")
}

pub fn deposit_time() -> Result<DateTime<Utc>> {
    Ok(timestamp_from_components(2025, 11, 19, 12, 0, 0)?)
}

pub fn claim_time() -> Result<DateTime<Utc>> {
    Ok(timestamp_from_components(2025, 11, 19, 14, 30, 0)?)
}

/// Builds the test deposit to stealth address 0 of the test wallet.
pub fn test_deposit(config: &UmbraConfig, seed: &MasterSeed) -> Result<PreparedDeposit> {
    let recipient = seed.stealth_keypair(0).public_key();
    let depositor = SigningKey::from_bytes(&DEPOSITOR_KEY).verifying_key().to_bytes();

    let params = DepositParams::new(recipient, depositor, TEST_AMOUNT, TOKEN_MINT, deposit_time()?)
        .with_version(config.protocol.version)
        .with_leaf_index(DEPOSIT_INDEX);
    let secrets = DepositSecrets {
        secret: Secret::from(TEST_SECRET),
        nullifier: Nullifier::from(TEST_NULLIFIER),
    };

    let viewing_key = seed.sui_viewing_key()?;
    prepare_deposit(&viewing_key, secrets, params).context("Failed to prepare deposit")
}

/// Simulated ledger contents: fillers, the deposit, more fillers.
pub fn ledger_leaves(commitment: Fr) -> Result<Vec<Fr>> {
    let mut leaves = Vec::new();
    for i in 0..FILLERS_BEFORE {
        leaves.push(poseidon::hash(&[Fr::from(100 + i)])?);
    }
    leaves.push(commitment);
    for i in 0..FILLERS_AFTER {
        leaves.push(poseidon::hash(&[Fr::from(200 + i)])?);
    }
    Ok(leaves)
}

/// Pretty-prints `value` to `dir/name`, creating `dir` if needed.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value).context("Failed to serialize witness")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

/// Print success message
pub fn print_success(msg: &str) {
    println!("✅ {}", msg);
}

/// Print info message
pub fn print_info(msg: &str) {
    println!("ℹ️  {}", msg);
}
