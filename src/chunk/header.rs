//! Header chunk (`MThd`) reading, along with typed views over its format and division fields

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{chunk_types::HEADER_CHUNK, expect_chunk};
use crate::{
    codec::BigEndian, config::DecoderConfig, error::DecodeError, reader::ByteCursor,
};

/// Payload length every well formed header chunk declares
pub const HEADER_LENGTH: u32 = 6;

/// Header chunk data, including format, track count and division as 3 16 bit unsigned integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequenceHeader {
    /// The MIDI format, see [`SequenceHeader::format_kind`]
    pub format: u16,
    /// Number of track chunks that follow
    pub track_count: u16,
    /// Meaning of a tick, see [`SequenceHeader::division`]
    pub time_division: u16,
}

impl SequenceHeader {
    /// Interprets the raw format field
    pub fn format_kind(&self) -> Result<Format, InvalidFormat> {
        Format::try_from(self.format)
    }

    /// Interprets the raw division field
    pub fn division(&self) -> Division {
        Division::from(self.time_division)
    }
}

/// Reads the `MThd` chunk: its chunk header followed by a fixed 6 byte payload.
///
/// The declared chunk length is only checked when
/// [`DecoderConfig::strict_header_length`] is set; otherwise a mismatch is logged and exactly 6
/// payload bytes are read regardless.
pub fn read_sequence_header<ITER>(
    cursor: &mut ByteCursor<ITER>,
    config: &DecoderConfig,
) -> Result<SequenceHeader, DecodeError>
where
    ITER: Iterator<Item = u8>,
{
    let chunk = expect_chunk(cursor, HEADER_CHUNK)?;

    if chunk.length != HEADER_LENGTH {
        if config.strict_header_length {
            return Err(DecodeError::InvalidHeaderLength(chunk.length));
        }
        warn!(length = chunk.length, "header chunk length is not 6, reading 6 bytes anyway");
    }

    let header = SequenceHeader {
        format: u16::read_be(cursor)?,
        track_count: u16::read_be(cursor)?,
        time_division: u16::read_be(cursor)?,
    };

    if header.format_kind().is_err() {
        warn!(format = header.format, "unknown MIDI file format");
    }
    debug!(
        format = header.format,
        tracks = header.track_count,
        division = ?header.division(),
        "read sequence header"
    );

    Ok(header)
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

/// Error struct representing an invalid format specifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid header format {0}")]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            other => Err(InvalidFormat(other)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, bits 14-8 represent the negative SMPTE format,
    /// and bits 7-0 represent ticks per frame
    TimeCode(SmpteTicks),
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteTicks {
    /// Negative SMPTE frame rate code (-24, -25, -29 or -30)
    pub smpte: i8,
    /// Ticks per frame
    pub tpf: u8,
}

impl SmpteTicks {
    /// Frames per second encoded by the SMPTE code
    pub fn frames_per_second(&self) -> u8 {
        self.smpte.unsigned_abs()
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value >> 15 == 0 {
            Division::Metrical(value & MASK)
        } else {
            // The high byte is already a two's complement negative number
            let [high, low] = value.to_be_bytes();
            Division::TimeCode(SmpteTicks {
                smpte: high as i8,
                tpf: low,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{read_sequence_header, Division, Format, InvalidFormat, SequenceHeader, SmpteTicks};
    use crate::{config::DecoderConfig, reader::ByteCursor, DecodeError};

    const HEADER: &[u8] = &[
        b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, // Chunk header
        0x00, 0x01, // Format
        0x00, 0x0A, // Tracks
        0x01, 0x80, // Division
    ];

    #[test]
    fn parsing_division_to_metrical_works() {
        let test: Division = (0x000au16).into();
        assert_eq!(test, Division::Metrical(10))
    }

    #[test]
    fn parsing_division_to_timecode_works() {
        let test: Division = (0xE728u16).into();
        let expected = Division::TimeCode(SmpteTicks { smpte: -25, tpf: 40 });
        assert_eq!(test, expected);

        let test: Division = (0xE250u16).into();
        let expected = Division::TimeCode(SmpteTicks { smpte: -30, tpf: 80 });
        assert_eq!(test, expected);
    }

    #[test]
    fn smpte_frame_rate() {
        let ticks = SmpteTicks { smpte: -29, tpf: 4 };
        assert_eq!(ticks.frames_per_second(), 29)
    }

    #[test]
    fn header_chunk_reads_properly() {
        let mut cursor = ByteCursor::from_slice(HEADER);
        let header = read_sequence_header(&mut cursor, &DecoderConfig::default())
            .expect("Parse header chunk");

        let expected = SequenceHeader {
            format: 1,
            track_count: 10,
            time_division: 384,
        };

        assert_eq!(header, expected);
        assert_eq!(header.format_kind(), Ok(Format::One));
        assert_eq!(header.division(), Division::Metrical(384));
    }

    #[test]
    fn out_of_range_format_is_reported() {
        let header = SequenceHeader {
            format: 7,
            track_count: 1,
            time_division: 96,
        };

        assert_eq!(header.format_kind(), Err(InvalidFormat(7)))
    }

    #[test]
    fn track_tag_is_not_a_header() {
        let mut bytes = HEADER.to_vec();
        bytes[..4].copy_from_slice(b"MTrk");

        let err = read_sequence_header(&mut ByteCursor::new(bytes), &DecoderConfig::default())
            .expect_err("Wrong tag");
        assert!(matches!(err, DecodeError::WrongChunkTag { .. }))
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut cursor = ByteCursor::from_slice(&HEADER[..12]);
        let err = read_sequence_header(&mut cursor, &DecoderConfig::default())
            .expect_err("Payload cut short");

        assert!(err.is_truncated())
    }

    #[test]
    fn mismatched_length_is_tolerated_by_default() {
        let mut bytes = HEADER.to_vec();
        bytes[7] = 0x08;

        let header = read_sequence_header(&mut ByteCursor::new(bytes), &DecoderConfig::default())
            .expect("Lenient mode ignores declared length");
        assert_eq!(header.track_count, 10)
    }

    #[test]
    fn mismatched_length_fails_in_strict_mode() {
        let mut bytes = HEADER.to_vec();
        bytes[7] = 0x08;

        let config = DecoderConfig::default().with_strict_header_length(true);
        let err = read_sequence_header(&mut ByteCursor::new(bytes), &config)
            .expect_err("Strict mode enforces length");
        assert!(matches!(err, DecodeError::InvalidHeaderLength(8)))
    }
}
