//! Solution and candidate header encoding

use crate::core::constants::{
    CLIENT_NONCE_OFFSET, CLIENT_NONCE_SIZE, COLLISION_BIT_LENGTH, HEADER_SIZE,
    SOLUTION_LENGTH_MARKER,
};
use crate::core::Job;
use crate::equihash::bit_packer::{compress_array, index_to_bytes};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, NativeEndian};

/// Minimal encoding of an index set.
///
/// Every index is packed into `collision_bit_length + 1` bits. For ZelHash
/// (collision bit length 25, 32 indices) this is 104 bytes.
pub fn minimal_from_indices(indices: &[u32], collision_bit_length: usize) -> Result<Vec<u8>> {
    let bit_len = collision_bit_length + 1;
    let word_size = std::mem::size_of::<u32>();
    if bit_len.div_ceil(8) > word_size {
        return Err(Error::encoding(format!(
            "collision bit length {} does not fit in a {}-byte index",
            collision_bit_length, word_size
        )));
    }
    let byte_pad = word_size - bit_len.div_ceil(8);

    let words: Vec<u8> = indices.iter().flat_map(|&i| index_to_bytes(i)).collect();
    compress_array(&words, bit_len, byte_pad)
}

/// ZelHash solution encoding (collision bit length 25)
pub fn encode_solution(indices: &[u32]) -> Result<Vec<u8>> {
    minimal_from_indices(indices, COLLISION_BIT_LENGTH)
}

/// Candidate header for one attempt.
///
/// Header prefix, then pool nonce, zero fill, and the client nonce in the last
/// four bytes. The nonce is written in native byte order, the layout the
/// compute engine uses when it hashes the header.
pub fn build_candidate_header(job: &Job, nonce: u32) -> Result<[u8; HEADER_SIZE]> {
    let prefix_len = job.header_prefix.len();
    let fixed_len = job.fixed_len();
    if fixed_len > HEADER_SIZE {
        return Err(Error::invalid_work(format!(
            "job {} fixes {} header bytes, more than {}",
            job.job_id, fixed_len, HEADER_SIZE
        )));
    }

    let mut header = [0u8; HEADER_SIZE];
    header[..prefix_len].copy_from_slice(&job.header_prefix);
    header[prefix_len..fixed_len].copy_from_slice(&job.pool_nonce);
    NativeEndian::write_u32(
        &mut header[CLIENT_NONCE_OFFSET..CLIENT_NONCE_OFFSET + CLIENT_NONCE_SIZE],
        nonce,
    );
    Ok(header)
}

/// Header bytes not fixed by the job: the client's share of the nonce
pub fn client_nonce<'a>(job: &Job, header: &'a [u8; HEADER_SIZE]) -> &'a [u8] {
    &header[job.fixed_len().min(HEADER_SIZE)..]
}

/// Solution as submitted: length marker followed by the minimal encoding
pub fn with_length_marker(solution: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(solution.len() + 1);
    out.push(SOLUTION_LENGTH_MARKER);
    out.extend_from_slice(solution);
    out
}
