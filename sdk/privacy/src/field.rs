//! Conversions between bytes, strings, timestamps and BN254 scalars.
//!
//! Every value produced here is canonically reduced below the field modulus.
//! Decimal strings are the interchange format with the proving circuits.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use num_bigint::BigUint;

use crate::error::{PrivacyError, Result};

/// Scalar field of BN254, the field the circuits operate over.
pub type FieldElement = Fr;

/// Byte length of an Ed25519 public key or a token identifier.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Longest domain tag that still fits in one field element.
pub const MAX_TAG_LEN: usize = 32;

/// Interprets bytes as a big-endian integer and reduces it modulo p.
pub fn bytes_to_field(bytes: &[u8]) -> FieldElement {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Canonical 32-byte big-endian encoding.
pub fn field_to_bytes_be(value: &FieldElement) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// A 32-byte key split into two 128-bit halves, each of which fits in one
/// field element without reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitKey {
    /// bytes[0..16], big-endian
    pub low: FieldElement,
    /// bytes[16..32], big-endian
    pub high: FieldElement,
}

pub fn split_public_key(bytes: &[u8]) -> Result<SplitKey> {
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(PrivacyError::InvalidLength {
            expected: PUBLIC_KEY_LEN,
            actual: bytes.len(),
        });
    }
    let (low, high) = bytes.split_at(PUBLIC_KEY_LEN / 2);
    Ok(SplitKey {
        low: bytes_to_field(low),
        high: bytes_to_field(high),
    })
}

impl SplitKey {
    /// Reassembles the original 32 bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let low = field_to_bytes_be(&self.low);
        let high = field_to_bytes_be(&self.high);
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&low[16..]);
        out[16..].copy_from_slice(&high[16..]);
        out
    }
}

fn modulus() -> BigUint {
    BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be())
}

/// Encodes a short ASCII/UTF-8 domain tag as a field element.
///
/// Tags longer than 32 bytes or whose value reaches the modulus are rejected
/// rather than silently reduced.
pub fn string_to_field(tag: &str) -> Result<FieldElement> {
    let bytes = tag.as_bytes();
    if bytes.len() > MAX_TAG_LEN || BigUint::from_bytes_be(bytes) >= modulus() {
        return Err(PrivacyError::DomainTagTooLong {
            tag: tag.to_string(),
        });
    }
    Ok(bytes_to_field(bytes))
}

pub fn field_to_decimal(value: &FieldElement) -> String {
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be()).to_str_radix(10)
}

/// Parses a base-10 string. Values at or above the modulus are rejected.
pub fn field_from_decimal(s: &str) -> Result<FieldElement> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrivacyError::NonCanonicalField(s.to_string()));
    }
    let value = BigUint::parse_bytes(s.as_bytes(), 10)
        .ok_or_else(|| PrivacyError::NonCanonicalField(s.to_string()))?;
    if value >= modulus() {
        return Err(PrivacyError::NonCanonicalField(s.to_string()));
    }
    Ok(bytes_to_field(&value.to_bytes_be()))
}

// ============================================================================
// Timestamps
// ============================================================================

/// Calendar components of a UTC instant, in the order the circuits hash them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFields {
    pub year: u64,
    /// 1-based
    pub month: u64,
    pub day: u64,
    pub hour: u64,
    pub minute: u64,
    pub second: u64,
}

impl TimestampFields {
    pub fn from_datetime(timestamp: &DateTime<Utc>) -> Result<Self> {
        let year = u64::try_from(timestamp.year())
            .map_err(|_| PrivacyError::InvalidTimestamp(timestamp.to_rfc3339()))?;
        Ok(Self {
            year,
            month: u64::from(timestamp.month()),
            day: u64::from(timestamp.day()),
            hour: u64::from(timestamp.hour()),
            minute: u64::from(timestamp.minute()),
            second: u64::from(timestamp.second()),
        })
    }

    pub fn to_fields(&self) -> [FieldElement; 6] {
        [
            Fr::from(self.year),
            Fr::from(self.month),
            Fr::from(self.day),
            Fr::from(self.hour),
            Fr::from(self.minute),
            Fr::from(self.second),
        ]
    }

    pub fn to_decimals(&self) -> [String; 6] {
        [
            self.year.to_string(),
            self.month.to_string(),
            self.day.to_string(),
            self.hour.to_string(),
            self.minute.to_string(),
            self.second.to_string(),
        ]
    }
}

/// Builds a UTC instant from calendar components, rejecting impossible dates.
pub fn timestamp_from_components(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| {
            PrivacyError::InvalidTimestamp(format!(
                "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z"
            ))
        })
}

pub fn timestamp_to_fields(timestamp: &DateTime<Utc>) -> Result<[FieldElement; 6]> {
    Ok(TimestampFields::from_datetime(timestamp)?.to_fields())
}

/// Serde adapter storing a field element as its decimal string.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{FieldElement, field_from_decimal, field_to_decimal};

    pub fn serialize<S: Serializer>(value: &FieldElement, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&field_to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldElement, D::Error> {
        let s = String::deserialize(deserializer)?;
        field_from_decimal(&s).map_err(D::Error::custom)
    }
}
