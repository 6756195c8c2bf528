//! Poseidon over the BN254 scalar field, circomlib flavour.
//!
//! An `n`-input hash runs the width `n + 1` permutation over the state
//! `[0, x_1, .., x_n]` and returns `state[0]`, exactly as circomlib's
//! `Poseidon(n)` template and circomlibjs do. Round constants and the MDS
//! matrix come from the Grain LFSR (`find_poseidon_ark_and_mds`), which yields
//! the circomlib tables for widths 2..=17 with 8 full rounds and circomlib's
//! partial round counts.
//!
//! Each arity has its own parameters, so `H([a])` and `H([a, 0])` differ.
//! Configurations are generated on first use and cached for the lifetime of
//! the process.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, find_poseidon_ark_and_mds};
use ark_ff::Field;

use crate::error::{PrivacyError, Result};
use crate::field::FieldElement;

/// Largest number of inputs a single invocation accepts.
pub const MAX_ARITY: usize = 16;

const PRIME_BITS: u64 = 254;
const FULL_ROUNDS: usize = 8;
const ALPHA: u64 = 5;
const CAPACITY: usize = 1;

/// Partial rounds for widths 2..=17 (arity 1..=16), circomlib schedule.
const PARTIAL_ROUNDS: [usize; MAX_ARITY] = [
    56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68,
];

static CONFIGS: [OnceLock<PoseidonConfig<Fr>>; MAX_ARITY] = [const { OnceLock::new() }; MAX_ARITY];

fn build_config(arity: usize) -> PoseidonConfig<Fr> {
    let partial_rounds = PARTIAL_ROUNDS[arity - 1];
    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        PRIME_BITS,
        arity,
        FULL_ROUNDS as u64,
        partial_rounds as u64,
        0,
    );

    PoseidonConfig::new(
        FULL_ROUNDS,
        partial_rounds,
        ALPHA,
        mds,
        ark,
        arity,
        CAPACITY,
    )
}

fn config(arity: usize) -> Result<&'static PoseidonConfig<Fr>> {
    let slot = arity
        .checked_sub(1)
        .and_then(|i| CONFIGS.get(i))
        .ok_or(PrivacyError::ArityUnsupported(arity))?;
    Ok(slot.get_or_init(|| build_config(arity)))
}

/// Full rounds on both ends, partial rounds (S-box on `state[0]` only) in
/// the middle. Each round: add constants, S-box, multiply by MDS.
fn permute(config: &PoseidonConfig<Fr>, inputs: &[FieldElement]) -> FieldElement {
    let mut state = Vec::with_capacity(inputs.len() + 1);
    state.push(Fr::from(0u64));
    state.extend_from_slice(inputs);

    let half_full = config.full_rounds / 2;
    let rounds = config.full_rounds + config.partial_rounds;

    for round in 0..rounds {
        for (cell, constant) in state.iter_mut().zip(&config.ark[round]) {
            *cell += constant;
        }

        if round < half_full || round >= half_full + config.partial_rounds {
            for cell in state.iter_mut() {
                *cell = cell.pow([config.alpha]);
            }
        } else {
            state[0] = state[0].pow([config.alpha]);
        }

        state = config
            .mds
            .iter()
            .map(|row| row.iter().zip(&state).map(|(m, cell)| *m * cell).sum::<Fr>())
            .collect();
    }

    state[0]
}

/// Hashes 1..=16 field elements to one.
pub fn hash(inputs: &[FieldElement]) -> Result<FieldElement> {
    let config = config(inputs.len())?;
    Ok(permute(config, inputs))
}

/// Two-to-one compression used by the Merkle trees. Same result as
/// `hash(&[left, right])`.
pub fn hash_pair(left: FieldElement, right: FieldElement) -> FieldElement {
    let config = CONFIGS[1].get_or_init(|| build_config(2));
    permute(config, &[left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = hash(&[Fr::from(1u64), Fr::from(2u64)]).unwrap();
        let b = hash(&[Fr::from(1u64), Fr::from(2u64)]).unwrap();
        assert_eq!(a, b, "same inputs should produce same digest");
    }

    fn fr(decimal: &str) -> Fr {
        crate::field::field_from_decimal(decimal).unwrap()
    }

    fn inputs(values: &[u64]) -> Vec<Fr> {
        values.iter().map(|v| Fr::from(*v)).collect()
    }

    #[test]
    fn test_circomlib_known_answers() {
        assert_eq!(
            hash(&inputs(&[1])).unwrap(),
            fr("18586133768512220936620570745912940619677854269274689475585506675881198879027")
        );
        assert_eq!(
            hash(&inputs(&[1, 2])).unwrap(),
            fr("7853200120776062878684798364095072458815029376092732009249414926327459813530")
        );
        // 0x299c867db6c1fdd79dcefa40e4510b9837e60ebb1ce0663dbaa525df65250465
        assert_eq!(
            hash(&inputs(&[1, 2, 3, 4])).unwrap(),
            fr("18821383157269793795438455681495246036402687001665670618754263018637548127333")
        );
        // 0x1cd139bdaaf7450acd086f9aa725241c0e6e2ef2d7ec9e3fa28e90a407417261
        assert_eq!(
            hash(&inputs(&[3, 4, 5, 10, 23])).unwrap(),
            fr("13034429309846638789535561449942021891039729847501137143363028890275222221409")
        );
    }

    #[test]
    fn test_hash_pair_matches_hash() {
        let l = Fr::from(7u64);
        let r = Fr::from(11u64);
        assert_eq!(hash_pair(l, r), hash(&[l, r]).unwrap());
    }

    #[test]
    fn test_hash_order_sensitive() {
        let l = Fr::from(7u64);
        let r = Fr::from(11u64);
        assert_ne!(hash_pair(l, r), hash_pair(r, l));
    }

    #[test]
    fn test_arity_separation() {
        let a = Fr::from(5u64);
        let zero = Fr::from(0u64);
        assert_ne!(
            hash(&[a]).unwrap(),
            hash(&[a, zero]).unwrap(),
            "padding with zero must not collide"
        );
    }

    #[test]
    fn test_arity_bounds() {
        assert_eq!(hash(&[]), Err(PrivacyError::ArityUnsupported(0)));
        let inputs = vec![Fr::from(1u64); MAX_ARITY + 1];
        assert_eq!(hash(&inputs), Err(PrivacyError::ArityUnsupported(17)));

        let inputs = vec![Fr::from(1u64); MAX_ARITY];
        assert!(hash(&inputs).is_ok());
        let inputs = vec![Fr::from(1u64); 14];
        assert!(hash(&inputs).is_ok());
    }
}
