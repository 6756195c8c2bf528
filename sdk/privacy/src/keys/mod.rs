//! Key hierarchy
//!
//! ```text
//! wallet signature ──keccak256──▶ MasterSeed
//!   ├─ Poseidon(seed, "MVK-Sui-Address")            ─▶ SuiViewingKey
//!   ├─ Poseidon(seed, "MVK-Umbra-Address", index)   ─▶ UmbraViewingKey
//!   └─ KMAC256(seed, "Umbra-Address-Generation"‖i)  ─▶ StealthKeypair
//!
//! viewing key + timestamp ─▶ IntentTransmissionKey ─┬▶ LinkerKey
//!                                                   └▶ MemoKey
//! ```
//!
//! The Sui viewing key scopes deposits, the Umbra viewing key scopes claims.
//! All derivations are deterministic.

mod seed;
mod stealth;
mod viewing;

pub use seed::{MasterSeed, SEED_LEN, SIGNING_MESSAGE, signing_digest};
pub use stealth::{STEALTH_DOMAIN, StealthKeypair, kmac256};
pub use viewing::{IntentTransmissionKey, LinkerKey, MemoKey, SuiViewingKey, UmbraViewingKey};

/// Domain tag for the viewing key scoping deposits.
pub const SUI_MVK_TAG: &str = "MVK-Sui-Address";
/// Domain tag for the viewing key scoping claims.
pub const UMBRA_MVK_TAG: &str = "MVK-Umbra-Address";
pub const LINKER_KEY_TAG: &str = "Linker-Key";
pub const MEMO_KEY_TAG: &str = "Memo-Key";
