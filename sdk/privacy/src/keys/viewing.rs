//! Viewing keys and the per-intent keys derived from them.

use std::fmt;

use ark_bn254::Fr;
use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::seed::MasterSeed;
use super::{LINKER_KEY_TAG, MEMO_KEY_TAG, SUI_MVK_TAG, UMBRA_MVK_TAG};
use crate::error::Result;
use crate::field::{FieldElement, TimestampFields, string_to_field};
use crate::poseidon;

macro_rules! redacted_debug {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($ty), "(<redacted>)"))
            }
        }
    };
}

/// ITK = Poseidon(mvk, year, month, day, hour, minute, second)
fn derive_itk(mvk: FieldElement, timestamp: &DateTime<Utc>) -> Result<IntentTransmissionKey> {
    let [year, month, day, hour, minute, second] =
        TimestampFields::from_datetime(timestamp)?.to_fields();
    let key = poseidon::hash(&[mvk, year, month, day, hour, minute, second])?;
    Ok(IntentTransmissionKey(key))
}

/// Public commitment to a viewing key: Poseidon(mvk).
fn mvk_commitment(mvk: FieldElement) -> Result<FieldElement> {
    poseidon::hash(&[mvk])
}

/// Viewing key scoping the deposit side.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SuiViewingKey(FieldElement);

impl SuiViewingKey {
    /// Poseidon(seed, "MVK-Sui-Address")
    pub fn derive(seed: &MasterSeed) -> Result<Self> {
        let tag = string_to_field(SUI_MVK_TAG)?;
        Ok(Self(poseidon::hash(&[seed.to_field(), tag])?))
    }

    pub fn expose(&self) -> FieldElement {
        self.0
    }

    /// Intent key for a deposit made at `timestamp`.
    pub fn deposit_itk(&self, timestamp: &DateTime<Utc>) -> Result<IntentTransmissionKey> {
        derive_itk(self.0, timestamp)
    }

    pub fn commitment(&self) -> Result<FieldElement> {
        mvk_commitment(self.0)
    }
}

redacted_debug!(SuiViewingKey);

/// Viewing key scoping the claim side, one per receiving address index.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct UmbraViewingKey(FieldElement);

impl UmbraViewingKey {
    /// Poseidon(seed, "MVK-Umbra-Address", address_index)
    pub fn derive(seed: &MasterSeed, address_index: u64) -> Result<Self> {
        let tag = string_to_field(UMBRA_MVK_TAG)?;
        Ok(Self(poseidon::hash(&[
            seed.to_field(),
            tag,
            Fr::from(address_index),
        ])?))
    }

    pub fn expose(&self) -> FieldElement {
        self.0
    }

    /// Intent key for a claim made at `timestamp`.
    pub fn claim_itk(&self, timestamp: &DateTime<Utc>) -> Result<IntentTransmissionKey> {
        derive_itk(self.0, timestamp)
    }

    pub fn commitment(&self) -> Result<FieldElement> {
        mvk_commitment(self.0)
    }
}

redacted_debug!(UmbraViewingKey);

/// Time-bound key for a single deposit or claim intent.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct IntentTransmissionKey(FieldElement);

impl IntentTransmissionKey {
    pub fn expose(&self) -> FieldElement {
        self.0
    }

    /// Poseidon(itk, "Linker-Key")
    pub fn linker_key(&self) -> Result<LinkerKey> {
        let tag = string_to_field(LINKER_KEY_TAG)?;
        Ok(LinkerKey(poseidon::hash(&[self.0, tag])?))
    }

    /// Poseidon(itk, "Memo-Key")
    pub fn memo_key(&self) -> Result<MemoKey> {
        let tag = string_to_field(MEMO_KEY_TAG)?;
        Ok(MemoKey(poseidon::hash(&[self.0, tag])?))
    }
}

redacted_debug!(IntentTransmissionKey);

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct LinkerKey(FieldElement);

impl LinkerKey {
    pub fn expose(&self) -> FieldElement {
        self.0
    }
}

redacted_debug!(LinkerKey);

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MemoKey(FieldElement);

impl MemoKey {
    pub fn expose(&self) -> FieldElement {
        self.0
    }
}

redacted_debug!(MemoKey);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seed() -> MasterSeed {
        MasterSeed::from_bytes(&[7u8; 32]).unwrap()
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 19, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_viewing_keys_deterministic() {
        let s = seed();
        assert_eq!(s.sui_viewing_key().unwrap(), s.sui_viewing_key().unwrap());
        assert_eq!(
            s.umbra_viewing_key(3).unwrap(),
            s.umbra_viewing_key(3).unwrap()
        );
    }

    #[test]
    fn test_viewing_keys_domain_separated() {
        let s = seed();
        let sui = s.sui_viewing_key().unwrap();
        let umbra0 = s.umbra_viewing_key(0).unwrap();
        let umbra1 = s.umbra_viewing_key(1).unwrap();
        assert_ne!(sui.expose(), umbra0.expose());
        assert_ne!(umbra0.expose(), umbra1.expose());
    }

    #[test]
    fn test_sui_mvk_formula() {
        let s = seed();
        let expected = poseidon::hash(&[
            s.to_field(),
            string_to_field("MVK-Sui-Address").unwrap(),
        ])
        .unwrap();
        assert_eq!(s.sui_viewing_key().unwrap().expose(), expected);
    }

    #[test]
    fn test_itk_is_time_bound() {
        let mvk = seed().sui_viewing_key().unwrap();
        let a = mvk.deposit_itk(&ts(12)).unwrap();
        let b = mvk.deposit_itk(&ts(13)).unwrap();
        assert_ne!(a, b, "different timestamps should produce different ITKs");
        assert_eq!(a, mvk.deposit_itk(&ts(12)).unwrap());
    }

    #[test]
    fn test_linker_and_memo_keys_differ() {
        let itk = seed().sui_viewing_key().unwrap().deposit_itk(&ts(12)).unwrap();
        let linker = itk.linker_key().unwrap();
        let memo = itk.memo_key().unwrap();
        assert_ne!(linker.expose(), memo.expose());
    }

    #[test]
    fn test_mvk_commitment() {
        let mvk = seed().umbra_viewing_key(0).unwrap();
        let expected = poseidon::hash(&[mvk.expose()]).unwrap();
        assert_eq!(mvk.commitment().unwrap(), expected);
    }
}
