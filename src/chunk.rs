//! Chunk level reading: chunk headers, the `MThd` header chunk and `MTrk` track chunks

use tracing::trace;

use crate::{codec::BigEndian, error::DecodeError, reader::ByteCursor, ChunkHeader};

pub mod chunk_types;
pub mod header;
pub mod track;

/// Reads an 8 byte chunk header: a 4 character tag followed by a big-endian 32 bit length.
///
/// The length is reported as-is and never checked against what remains in the stream.
pub fn read_chunk_header<ITER>(cursor: &mut ByteCursor<ITER>) -> Result<ChunkHeader, DecodeError>
where
    ITER: Iterator<Item = u8>,
{
    let raw = u64::read_be(cursor)?;
    let header = ChunkHeader::from(raw);
    trace!(tag = %header.tag_str(), length = header.len(), "read chunk header");

    Ok(header)
}

/// Reads a chunk header and fails with [`DecodeError::WrongChunkTag`] unless its tag matches
/// `expected`
pub fn expect_chunk<ITER>(
    cursor: &mut ByteCursor<ITER>,
    expected: [char; 4],
) -> Result<ChunkHeader, DecodeError>
where
    ITER: Iterator<Item = u8>,
{
    let header = read_chunk_header(cursor)?;

    if header.chunk_type != expected {
        return Err(DecodeError::WrongChunkTag {
            expected,
            found: header.chunk_type,
        });
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::{chunk_types::TRACK_DATA_CHUNK, expect_chunk, read_chunk_header};
    use crate::{reader::ByteCursor, DecodeError};

    #[test]
    fn reads_tag_and_length() {
        let mut cursor = ByteCursor::from_slice(b"MTrk\x00\x00\x01\x02");
        let header = read_chunk_header(&mut cursor).expect("Read chunk header");

        assert_eq!(header.chunk_type, TRACK_DATA_CHUNK);
        assert_eq!(header.len(), 258);
    }

    #[test]
    fn three_bytes_is_not_a_header() {
        let mut cursor = ByteCursor::from_slice(b"MTr");

        assert!(read_chunk_header(&mut cursor)
            .expect_err("Too short for a chunk header")
            .is_truncated())
    }

    #[test]
    fn declared_length_is_not_enforced() {
        let mut cursor = ByteCursor::from_slice(b"MTrk\xFF\xFF\xFF\xFF");
        let header = read_chunk_header(&mut cursor).expect("Read chunk header");

        assert_eq!(header.len(), u32::MAX as usize);
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn unexpected_tag_is_rejected() {
        let mut cursor = ByteCursor::from_slice(b"RIFF\x00\x00\x00\x04");
        let err = expect_chunk(&mut cursor, TRACK_DATA_CHUNK).expect_err("Not a track chunk");

        assert!(matches!(
            err,
            DecodeError::WrongChunkTag {
                expected: TRACK_DATA_CHUNK,
                found: ['R', 'I', 'F', 'F'],
            }
        ))
    }
}
