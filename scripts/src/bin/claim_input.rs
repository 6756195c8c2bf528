//! Generate claim circuit input
//!
//! Replays the test ledger (five fillers, the test deposit, three fillers)
//! into a tree of the configured shape and writes the claim circuit's witness
//! for the deposit at index 5.
//!
//! Usage:
//!   cargo run --bin claim_input
//!
//! Environment variables:
//!   UMBRA_TREE_DEPTH - Tree depth (default: 20)
//!   UMBRA_OUTPUT_DIR - Where to write claim_input.json (default: ./circuits)

use anyhow::Context;
use umbra_config::UmbraConfig;
use umbra_privacy::{ClaimWitness, CommitmentTree, IncrementalMerkleTree, field_to_decimal};
use umbra_scripts::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    print_header("Claim Circuit Input");

    let config = UmbraConfig::load()?;
    let seed = wallet_seed()?;
    let prepared = test_deposit(&config, &seed)?;

    let mut tree = IncrementalMerkleTree::new(config.tree_params()?);
    for leaf in ledger_leaves(prepared.record.commitment.to_field())? {
        tree.insert(leaf).context("Failed to insert ledger leaf")?;
    }
    let root = tree.root();
    print_info(&format!("Leaves: {} (depth {})", tree.len(), tree.depth()));
    print_info(&format!("Root:   {}", field_to_decimal(&root)));

    let viewing_key = seed.umbra_viewing_key(0)?;
    let witness = ClaimWitness::build(
        &viewing_key,
        &prepared.record,
        &tree,
        DEPOSIT_INDEX,
        root,
        &claim_time()?,
    )
    .context("Failed to build claim witness")?;

    print_info(&format!("Nullifier hash: {}", witness.nullifier_hash));
    print_info(&format!("Linker hash:    {}", witness.claim_linker_hash));

    let path = write_json(&config.output_dir(), CLAIM_FILE, &witness)?;
    print_success(&format!("Wrote {}", path.display()));
    Ok(())
}
