//! Solution pipeline tests against a fixed job
//!
//! Header fields, pool nonce, client nonce and index set are fixed, so the
//! mid-state, the minimal encoding and the double SHA-256 are all known.
//! The client nonce is written in native byte order; the expected bytes
//! below are for little-endian hosts.

#![cfg(target_endian = "little")]

use zelhash_miner::core::{NonceCounter, Target, WorkState};
use zelhash_miner::crypto::MIDSTATE_LEN;
use zelhash_miner::equihash::{encode_solution, SolutionVerifier};
use zelhash_miner::stratum::hex::decode_hex_concat;

const HEADER_FRAGMENTS: [&str; 6] = [
    "04000000",
    "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20",
    "404142434445464748494a4b4c4d4e4f505152535455565758595a5b5c5d5e5f",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "5d000000",
    "1f07ffff",
];

const POOL_NONCE: &str = "a1b2c3d4";

const MIDSTATE: &str = concat!(
    "2e9a97ca7feed0c1f125df71a9ea8e1679ed17dc53f095e4a237e75b0a305fe9",
    "e7ac4d9808b5f13919971b73322d5ca3a0a774e9be68e10dbbe6d99d0b81d23f",
);

const SOLUTION: &str = concat!(
    "00000003779b11bbcd88a66d133779b1115607553368998453d76ef3621f3473",
    "90ab03a8623a9b266d130d12dfd4229eb940215f5de6c41af14c179a39c81e08",
    "2315607508cfb85311d4d8fbeee74cda2616ae2496896fe9d9d5ab0453d7048c",
    "90d2010af8b7bc6f",
);

const CLIENT_NONCE: &str = "00000000000000000000000000000000000000000000000004030201";

/// The double SHA-256 of the fixture block, read as a number, equals this
const BOUNDARY_TARGET: &str = "0c43467fe6ea8c23a078d47fcf5f5b5426df6130f4111b0eea6b898d0d597256";

fn indices() -> Vec<u32> {
    (0..32u64)
        .map(|i| ((i * 2_654_435_761) & 0x1FF_FFFF) as u32)
        .collect()
}

fn work_state() -> WorkState {
    let state = WorkState::with_nonce_counter(NonceCounter::starting_at(0x0102_0303));
    state
        .set_job(
            decode_hex_concat(HEADER_FRAGMENTS).unwrap(),
            hex::decode(POOL_NONCE).unwrap(),
            HEADER_FRAGMENTS[4],
            "fx",
        )
        .unwrap();
    state
}

#[test]
fn test_fixture_indices() {
    assert_eq!(
        &indices()[..4],
        &[0, 3_635_633, 7_271_266, 10_906_899]
    );
}

#[test]
fn test_midstate_and_work_issue() {
    let state = work_state();
    let mut midstate = [0u8; MIDSTATE_LEN];
    let work = state.issue_work(&mut midstate);

    assert_eq!(work.job_id, "fx");
    assert_eq!(work.nonce, 0x0102_0304);
    assert_eq!(hex::encode(midstate), MIDSTATE);
}

#[test]
fn test_encoding_matches_fixture() {
    assert_eq!(hex::encode(encode_solution(&indices()).unwrap()), SOLUTION);
}

#[test]
fn test_share_below_target() {
    let state = work_state();
    let mut target = hex::decode(BOUNDARY_TARGET).unwrap();
    target[31] += 1;
    state.set_target(Target::from_slice(&target).unwrap());

    let mut midstate = [0u8; MIDSTATE_LEN];
    let work = state.issue_work(&mut midstate);
    let share = SolutionVerifier::new()
        .check(&indices(), &work, &state.snapshot())
        .expect("fixture hash is below the target");

    assert_eq!(share.job_id, "fx");
    assert_eq!(share.time, "5d000000");
    assert_eq!(hex::encode(&share.client_nonce), CLIENT_NONCE);
    assert_eq!(hex::encode(&share.solution), format!("34{}", SOLUTION));
}

#[test]
fn test_hash_equal_to_target_is_not_a_share() {
    let state = work_state();
    state.set_target(Target::from_hex(BOUNDARY_TARGET).unwrap());

    let mut midstate = [0u8; MIDSTATE_LEN];
    let work = state.issue_work(&mut midstate);
    assert!(SolutionVerifier::new()
        .check(&indices(), &work, &state.snapshot())
        .is_none());
}

#[test]
fn test_zero_target_rejects_everything() {
    let state = work_state();
    state.set_target(Target::zero());

    let mut midstate = [0u8; MIDSTATE_LEN];
    let work = state.issue_work(&mut midstate);
    assert!(SolutionVerifier::new()
        .check(&indices(), &work, &state.snapshot())
        .is_none());
}

#[test]
fn test_new_job_makes_work_stale() {
    let state = work_state();
    state.set_target(Target::from_bytes([0xFF; 32]));

    let mut midstate = [0u8; MIDSTATE_LEN];
    let work = state.issue_work(&mut midstate);
    state
        .set_job(
            decode_hex_concat(HEADER_FRAGMENTS).unwrap(),
            hex::decode(POOL_NONCE).unwrap(),
            HEADER_FRAGMENTS[4],
            "fx2",
        )
        .unwrap();

    assert!(SolutionVerifier::new()
        .check(&indices(), &work, &state.snapshot())
        .is_none());
}
