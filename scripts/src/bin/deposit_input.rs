//! Generate deposit circuit input
//!
//! Builds the fixed test deposit (secret 12345, nullifier 67890) and writes
//! the deposit circuit's witness as JSON.
//!
//! Usage:
//!   cargo run --bin deposit_input
//!
//! Environment variables:
//!   UMBRA_OUTPUT_DIR - Where to write deposit_input.json (default: ./circuits)

use umbra_config::UmbraConfig;
use umbra_scripts::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    print_header("Deposit Circuit Input");

    let config = UmbraConfig::load()?;
    let seed = wallet_seed()?;
    let prepared = test_deposit(&config, &seed)?;

    print_info(&format!("Commitment:  {}", prepared.witness.commitment));
    print_info(&format!("Linker hash: {}", prepared.witness.linker_hash));
    print_info(&format!("Public inputs: {}", prepared.witness.public_inputs().len()));

    let path = write_json(&config.output_dir(), DEPOSIT_FILE, &prepared.witness)?;
    print_success(&format!("Wrote {}", path.display()));
    Ok(())
}
