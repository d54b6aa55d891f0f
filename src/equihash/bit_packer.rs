//! Big-endian bit packing of fixed-width words
//!
//! Equihash solutions are transmitted in their minimal form: every index
//! occupies exactly `bit_len` bits of one contiguous big-endian bit stream.
//! The input side is a byte array of `in_width`-byte words, each holding one
//! value in its low `ceil(bit_len / 8)` bytes after `byte_pad` leading bytes.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Smallest supported width of a packed value in bits
pub const MIN_BIT_LEN: usize = 8;

/// Largest supported width of a packed value in bits
pub const MAX_BIT_LEN: usize = 32;

/// Width in bytes of one input word for the given bit length and pad
pub fn input_width(bit_len: usize, byte_pad: usize) -> usize {
    bit_len.div_ceil(8) + byte_pad
}

/// Number of output bytes produced by [`compress_array`]
pub fn packed_len(in_len: usize, bit_len: usize, byte_pad: usize) -> usize {
    (bit_len * in_len / input_width(bit_len, byte_pad)).div_ceil(8)
}

/// Pack an array of big-endian words into a minimal bit stream.
///
/// Each word of `input` contributes its low `bit_len` bits, most significant
/// bit first. The final byte is zero-padded on the right.
pub fn compress_array(input: &[u8], bit_len: usize, byte_pad: usize) -> Result<Vec<u8>> {
    if !(MIN_BIT_LEN..=MAX_BIT_LEN).contains(&bit_len) {
        return Err(Error::encoding(format!(
            "bit length {} outside {}..={}",
            bit_len, MIN_BIT_LEN, MAX_BIT_LEN
        )));
    }

    let in_width = input_width(bit_len, byte_pad);
    if input.len() % in_width != 0 {
        return Err(Error::encoding(format!(
            "input length {} is not a multiple of the {}-byte word width",
            input.len(),
            in_width
        )));
    }

    let out_len = packed_len(input.len(), bit_len, byte_pad);
    let bit_len_mask: u64 = (1u64 << bit_len) - 1;

    let mut out = Vec::with_capacity(out_len);

    // The low `acc_bits` bits of `acc_value` hold pending output, big-endian.
    let mut acc_bits = 0usize;
    let mut acc_value = 0u64;
    let mut j = 0usize;

    for _ in 0..out_len {
        if acc_bits < 8 {
            if j < input.len() {
                acc_value <<= bit_len;
                for x in byte_pad..in_width {
                    let shift = 8 * (in_width - x - 1);
                    let byte_mask = (bit_len_mask >> shift) & 0xFF;
                    acc_value |= (u64::from(input[j + x]) & byte_mask) << shift;
                }
                j += in_width;
                acc_bits += bit_len;
            } else {
                acc_value <<= 8 - acc_bits;
                acc_bits = 8;
            }
        }

        acc_bits -= 8;
        out.push(((acc_value >> acc_bits) & 0xFF) as u8);
    }

    Ok(out)
}

/// Big-endian bytes of an index.
///
/// Lexicographic comparison of the encodings agrees with numeric comparison
/// of the indices.
pub fn index_to_bytes(index: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    BigEndian::write_u32(&mut out, index);
    out
}

/// Pack a sequence of values, `bit_len` bits each.
///
/// Convenience wrapper that lays the values out as 4-byte big-endian words
/// and packs them with the matching pad.
pub fn pack(values: &[u32], bit_len: usize) -> Result<Vec<u8>> {
    if !(MIN_BIT_LEN..=MAX_BIT_LEN).contains(&bit_len) {
        return Err(Error::encoding(format!(
            "bit length {} outside {}..={}",
            bit_len, MIN_BIT_LEN, MAX_BIT_LEN
        )));
    }
    let byte_pad = 4 - bit_len.div_ceil(8);
    let words: Vec<u8> = values.iter().flat_map(|&v| index_to_bytes(v)).collect();
    compress_array(&words, bit_len, byte_pad)
}
