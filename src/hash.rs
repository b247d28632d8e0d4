use crate::error::{HashError, HashResult};

const WORD_BYTES: usize = 8;

/// Sum `buffer` as little-endian u64 words, plus `total_size`, wrapping on
/// overflow.
pub fn fold_words(buffer: &[u8], total_size: u64) -> HashResult<u64> {
    if buffer.len() % WORD_BYTES != 0 {
        return Err(HashError::Decode { len: buffer.len() });
    }
    let sum = buffer
        .chunks_exact(WORD_BYTES)
        .map(|word| {
            let mut bytes = [0u8; WORD_BYTES];
            bytes.copy_from_slice(word);
            u64::from_le_bytes(bytes)
        })
        .fold(0u64, u64::wrapping_add);
    Ok(sum.wrapping_add(total_size))
}

/// 16 lowercase hex digits, zero-padded.
pub fn format_hash(value: u64) -> String {
    format!("{value:016x}")
}

pub fn compute_identity_hash(buffer: &[u8], total_size: u64) -> HashResult<String> {
    fold_words(buffer, total_size).map(format_hash)
}
