//! Binary layout of the similarity artifact (little-endian):
//!
//! | bytes | field                      |
//! |-------|----------------------------|
//! | 4     | magic `RSIM`               |
//! | 2     | format version             |
//! | 8     | dataset fingerprint        |
//! | 8     | matrix size `n`            |
//! | 8·n²  | `f64` values, row-major    |

use super::StoredModel;
use crate::algorithms::SimilarityMatrix;
use crate::error::{RecError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

const MAGIC: &[u8; 4] = b"RSIM";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 8 + 8;

pub fn encode(model: &StoredModel) -> Bytes {
    let values = model.matrix.as_slice();
    let mut buf = BytesMut::with_capacity(HEADER_LEN + values.len() * 8);
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u64_le(model.fingerprint);
    buf.put_u64_le(model.matrix.size() as u64);
    for &value in values {
        buf.put_f64_le(value);
    }
    buf.freeze()
}

pub fn decode(mut buf: &[u8]) -> Result<StoredModel> {
    if buf.len() < HEADER_LEN {
        return Err(RecError::CorruptArtifact(format!(
            "artifact is {} bytes, shorter than its header",
            buf.len()
        )));
    }

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(RecError::CorruptArtifact("bad magic".to_string()));
    }

    let version = buf.get_u16_le();
    if version != VERSION {
        return Err(RecError::CorruptArtifact(format!("unsupported version {version}")));
    }

    let fingerprint = buf.get_u64_le();
    let size = usize::try_from(buf.get_u64_le())
        .map_err(|_| RecError::CorruptArtifact("matrix size overflows usize".to_string()))?;

    let expected = size
        .checked_mul(size)
        .and_then(|cells| cells.checked_mul(8))
        .ok_or_else(|| RecError::CorruptArtifact("matrix size overflows usize".to_string()))?;
    if buf.remaining() != expected {
        return Err(RecError::CorruptArtifact(format!(
            "expected {expected} bytes of matrix data for size {size}, found {}",
            buf.remaining()
        )));
    }

    let mut values = Vec::with_capacity(size * size);
    while buf.has_remaining() {
        values.push(buf.get_f64_le());
    }

    Ok(StoredModel {
        fingerprint,
        matrix: SimilarityMatrix::from_row_major(size, values)?,
    })
}
