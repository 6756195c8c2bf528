//! Ledger event replay
//!
//! Deposit events arrive from a ledger RPC as loosely typed JSON
//! (`{"index": "5", "commitment": "1234..."}`). They are validated here and
//! replayed into a [`SparseMerkleTree`], which must end up with the same root
//! the ledger reports.

use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, field_from_decimal};
use crate::merkle::{SparseMerkleTree, TreeParams};

/// A JSON scalar as RPC nodes emit it: u64 values may come as numbers or
/// strings, u256 values always as strings. Anything else (negative or
/// fractional numbers, booleans, objects) lands in `Other` and is rejected
/// per record during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(u64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Deposit event exactly as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDepositEvent {
    #[serde(default, alias = "leaf_index")]
    pub index: Option<RawValue>,
    #[serde(default)]
    pub commitment: Option<RawValue>,
}

/// A validated deposit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositEvent {
    pub index: u64,
    pub commitment: FieldElement,
}

impl TryFrom<&RawDepositEvent> for DepositEvent {
    type Error = PrivacyError;

    fn try_from(raw: &RawDepositEvent) -> Result<Self> {
        let index = match &raw.index {
            Some(RawValue::Number(n)) => *n,
            Some(RawValue::Text(s)) => s
                .parse::<u64>()
                .map_err(|_| PrivacyError::MalformedRecord(format!("index {:?}", s)))?,
            Some(RawValue::Other(v)) => {
                return Err(PrivacyError::MalformedRecord(format!("index {}", v)));
            }
            None => return Err(PrivacyError::MalformedRecord("missing index".into())),
        };
        let commitment = match &raw.commitment {
            Some(RawValue::Other(v)) => {
                return Err(PrivacyError::MalformedRecord(format!("commitment {}", v)));
            }
            Some(value) => field_from_decimal(&value.to_string())
                .map_err(|_| PrivacyError::MalformedRecord(format!("commitment {}", value)))?,
            None => return Err(PrivacyError::MalformedRecord("missing commitment".into())),
        };
        Ok(Self { index, commitment })
    }
}

/// What a replay did with its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Events inserted into the tree
    pub applied: usize,
    /// Exact repeats of an already applied event
    pub duplicates: usize,
    /// (position in the input stream, reason)
    pub rejected: Vec<(usize, String)>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.rejected.is_empty()
    }
}

/// Rebuilds a sparse tree from a deposit event log, in any order.
///
/// Malformed or out-of-range records are skipped and reported. The same index
/// appearing with two different commitments aborts the replay.
pub fn replay<'a, I>(params: TreeParams, events: I) -> Result<(SparseMerkleTree, ReplayReport)>
where
    I: IntoIterator<Item = &'a RawDepositEvent>,
{
    let mut report = ReplayReport::default();
    let mut seen: BTreeMap<u64, FieldElement> = BTreeMap::new();

    for (position, raw) in events.into_iter().enumerate() {
        let event = match DepositEvent::try_from(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("skipping deposit event #{}: {}", position, e);
                report.rejected.push((position, e.to_string()));
                continue;
            }
        };
        if event.index >= params.capacity() {
            let e = PrivacyError::IndexOutOfBounds {
                index: event.index,
                bound: params.capacity(),
            };
            warn!("skipping deposit event #{}: {}", position, e);
            report.rejected.push((position, e.to_string()));
            continue;
        }

        match seen.entry(event.index) {
            Entry::Occupied(existing) if *existing.get() == event.commitment => {
                report.duplicates += 1;
            }
            Entry::Occupied(_) => {
                return Err(PrivacyError::ConflictingLeaf { index: event.index });
            }
            Entry::Vacant(slot) => {
                slot.insert(event.commitment);
            }
        }
    }

    let mut tree = SparseMerkleTree::new(params);
    for (index, commitment) in seen {
        tree.insert(index, commitment)?;
        report.applied += 1;
    }

    debug!(
        "replayed {} deposit events ({} duplicates, {} rejected)",
        report.applied,
        report.duplicates,
        report.rejected.len()
    );
    Ok((tree, report))
}

impl SparseMerkleTree {
    /// See [`replay`].
    pub fn from_events<'a, I>(params: TreeParams, events: I) -> Result<(Self, ReplayReport)>
    where
        I: IntoIterator<Item = &'a RawDepositEvent>,
    {
        replay(params, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::CommitmentTree;
    use ark_bn254::Fr;

    fn event(index: u64, commitment: u64) -> RawDepositEvent {
        RawDepositEvent {
            index: Some(RawValue::Text(index.to_string())),
            commitment: Some(RawValue::Text(commitment.to_string())),
        }
    }

    #[test]
    fn test_parse_rpc_json() {
        let json = r#"[
            {"index": "0", "commitment": "11"},
            {"index": 1, "commitment": "22"},
            {"leaf_index": "2", "commitment": 33}
        ]"#;
        let raw: Vec<RawDepositEvent> = serde_json::from_str(json).unwrap();
        let events: Vec<DepositEvent> = raw
            .iter()
            .map(|r| DepositEvent::try_from(r).unwrap())
            .collect();
        assert_eq!(events[1].index, 1);
        assert_eq!(events[2].commitment, Fr::from(33u64));
    }

    #[test]
    fn test_odd_json_values_are_rejected_per_record() {
        let json = r#"[
            {"index": "0", "commitment": "11"},
            {"index": -1, "commitment": "22"},
            {"index": 1.5, "commitment": "22"},
            {"index": true, "commitment": "22"},
            {"index": 18446744073709551616, "commitment": "22"},
            {"index": 2, "commitment": {"value": "33"}},
            {"index": 3, "commitment": null},
            {"index": 4, "commitment": -7}
        ]"#;
        let raw: Vec<RawDepositEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(raw.len(), 8);
        for record in &raw[1..] {
            assert!(matches!(
                DepositEvent::try_from(record),
                Err(PrivacyError::MalformedRecord(_))
            ));
        }

        let (tree, report) = replay(TreeParams::new(4).unwrap(), &raw).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 7);
        assert_eq!(tree.leaf(0).unwrap(), Fr::from(11u64));
    }

    #[test]
    fn test_replay_matches_direct_inserts() {
        let params = TreeParams::new(6).unwrap();
        let events = vec![event(2, 30), event(0, 10), event(1, 20)];
        let (tree, report) = replay(params, &events).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.applied, 3);

        let mut direct = SparseMerkleTree::new(params);
        for (i, c) in [(0u64, 10u64), (1, 20), (2, 30)] {
            direct.insert(i, Fr::from(c)).unwrap();
        }
        assert_eq!(tree.root(), direct.root());
    }

    #[test]
    fn test_replay_rejects_malformed() {
        let params = TreeParams::new(4).unwrap();
        let events = vec![
            event(0, 10),
            RawDepositEvent {
                index: None,
                commitment: Some(RawValue::Text("5".into())),
            },
            RawDepositEvent {
                index: Some(RawValue::Text("x".into())),
                commitment: Some(RawValue::Text("5".into())),
            },
            RawDepositEvent {
                index: Some(RawValue::Number(3)),
                commitment: Some(RawValue::Text("-5".into())),
            },
            event(99, 10),
        ];
        let (tree, report) = replay(params, &events).unwrap();
        assert_eq!(report.applied, 1);
        let positions: Vec<usize> = report.rejected.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_replay_duplicates() {
        let params = TreeParams::new(4).unwrap();
        let events = vec![event(0, 10), event(0, 10)];
        let (_, report) = replay(params, &events).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.duplicates, 1);

        let events = vec![event(0, 10), event(0, 11)];
        assert_eq!(
            replay(params, &events).unwrap_err(),
            PrivacyError::ConflictingLeaf { index: 0 }
        );
    }

    #[test]
    fn test_from_events() {
        let params = TreeParams::new(4).unwrap();
        let events = vec![event(3, 7)];
        let (tree, _) = SparseMerkleTree::from_events(params, &events).unwrap();
        assert_eq!(tree.leaf(3).unwrap(), Fr::from(7u64));
    }
}
