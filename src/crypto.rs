//! Hashing for ZelHash work and shares
//!
//! Two hash functions are involved:
//! - BLAKE2b-512 personalized with `"ZelProof" || le32(n) || le32(k)` feeds the
//!   Equihash search. The first 128-byte block of every attempt's input is
//!   identical within a job, so the compression state after that block (the
//!   mid-state) is computed once per job and handed to the compute engine.
//! - Double SHA-256 over the candidate block decides whether a share meets
//!   the pool target.

use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};

/// Equihash `n` parameter of ZelHash
pub const EQUIHASH_N: u32 = 125;

/// Equihash `k` parameter of ZelHash
pub const EQUIHASH_K: u32 = 4;

/// Personalization tag prefix
pub const PERSONAL_PREFIX: &[u8; 8] = b"ZelProof";

/// BLAKE2b digest length used by the search
pub const DIGEST_LEN: usize = 64;

/// BLAKE2b block length
pub const BLOCK_LEN: usize = 128;

/// Size of the serialized mid-state (eight little-endian u64 words)
pub const MIDSTATE_LEN: usize = 64;

const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// The 16-byte BLAKE2b personalization for ZelHash
pub fn personalization() -> [u8; 16] {
    let mut personal = [0u8; 16];
    personal[..8].copy_from_slice(PERSONAL_PREFIX);
    LittleEndian::write_u32(&mut personal[8..12], EQUIHASH_N);
    LittleEndian::write_u32(&mut personal[12..16], EQUIHASH_K);
    personal
}

/// Initial chaining value: IV xor the parameter block
/// (64-byte digest, no key, fanout 1, depth 1, ZelHash personalization).
fn initial_state() -> [u64; 8] {
    let mut h = IV;
    h[0] ^= 0x0101_0000 ^ DIGEST_LEN as u64;
    let personal = personalization();
    h[6] ^= LittleEndian::read_u64(&personal[..8]);
    h[7] ^= LittleEndian::read_u64(&personal[8..]);
    h
}

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// BLAKE2b compression function F
fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], counter: u128, last: bool) {
    let mut m = [0u64; 16];
    LittleEndian::read_u64_into(block, &mut m);

    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= counter as u64;
    v[13] ^= (counter >> 64) as u64;
    if last {
        v[14] = !v[14];
    }

    for round in 0..12 {
        let s = &SIGMA[round % 10];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

fn state_to_bytes(h: &[u64; 8]) -> [u8; MIDSTATE_LEN] {
    let mut out = [0u8; MIDSTATE_LEN];
    LittleEndian::write_u64_into(h, &mut out);
    out
}

/// Compute the ZelProof mid-state over the first block of a job.
///
/// `prefix` is zero-padded (or cut) to exactly 128 bytes and compressed as a
/// non-final block. The returned bytes are the raw chaining value, not a
/// digest.
pub fn zelproof_midstate(prefix: &[u8]) -> [u8; MIDSTATE_LEN] {
    let mut block = [0u8; BLOCK_LEN];
    let len = prefix.len().min(BLOCK_LEN);
    block[..len].copy_from_slice(&prefix[..len]);

    let mut h = initial_state();
    compress(&mut h, &block, BLOCK_LEN as u128, false);
    state_to_bytes(&h)
}

/// Finish a ZelProof hash from a mid-state and a final tail of at most one block.
///
/// This is the per-attempt work a compute engine does after [`zelproof_midstate`].
/// Returns `None` when the tail does not fit in one block.
pub fn finish_midstate(midstate: &[u8; MIDSTATE_LEN], tail: &[u8]) -> Option<[u8; DIGEST_LEN]> {
    if tail.len() > BLOCK_LEN {
        return None;
    }

    let mut h = [0u64; 8];
    LittleEndian::read_u64_into(midstate, &mut h);

    let mut block = [0u8; BLOCK_LEN];
    block[..tail.len()].copy_from_slice(tail);
    compress(&mut h, &block, (BLOCK_LEN + tail.len()) as u128, true);

    Some(state_to_bytes(&h))
}

/// One-shot ZelProof BLAKE2b-512 digest
pub fn zelproof_digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let hash = blake2b_simd::Params::new()
        .hash_length(DIGEST_LEN)
        .personal(&personalization())
        .hash(data);

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// SHA-256 applied twice
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}
