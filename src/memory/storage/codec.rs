//! Embedding blob encoding: packed little-endian `f32`, 4 bytes per dimension.

use crate::memory::core::errors::{MemoryError, MemoryResult};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Encode a vector as a blob.
#[must_use]
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Decode a blob into a vector.
///
/// # Errors
/// Returns [`MemoryError::InvalidEntry`] if the blob length is not a multiple of 4.
pub fn decode_embedding(blob: &[u8]) -> MemoryResult<Vec<f32>> {
    let chunks = blob.chunks_exact(F32_BYTES);
    if !chunks.remainder().is_empty() {
        return Err(MemoryError::InvalidEntry(format!(
            "embedding blob of {} bytes is not a multiple of {F32_BYTES}",
            blob.len()
        )));
    }

    Ok(chunks
        .map(|chunk| {
            let mut bytes = [0_u8; F32_BYTES];
            bytes.copy_from_slice(chunk);
            f32::from_le_bytes(bytes)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_little_endian() {
        assert_eq!(encode_embedding(&[1.0]), vec![0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn test_decode_restores_values() {
        let vector = vec![0.25_f32, -3.5, 1e-7];
        assert_eq!(decode_embedding(&encode_embedding(&vector)).unwrap(), vector);
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        let err = decode_embedding(&[0, 0, 128]).unwrap_err();
        assert!(matches!(err, MemoryError::InvalidEntry(_)));
    }

    #[test]
    fn test_empty_blob_is_empty_vector() {
        assert!(decode_embedding(&[]).unwrap().is_empty());
    }
}
