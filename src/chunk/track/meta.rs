//! Typed views over meta event payloads

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Meta event type that terminates a track chunk
pub const END_OF_TRACK: u8 = 0x2F;

/// A meta event payload that does not fit its declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMetaEvent {
    /// A fixed size meta event had the wrong number of bytes
    #[error("Meta event {type_code:#04x} expects {expected} bytes, found {found}")]
    WrongLength {
        /// Meta event type
        type_code: u8,
        /// Bytes this type always carries
        expected: usize,
        /// Bytes actually present
        found: usize,
    },
    /// A text meta event was not valid utf-8
    #[error("Meta event {0:#04x} text is not valid utf-8")]
    InvalidText(u8),
}

/// A meta level event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaEvent {
    /// Sequence Number, tag 0x00
    SequenceNumber(u16),
    /// Text metadata, tag 0x01
    Text(String),
    /// Copyright, tag 0x02
    Copyright(String),
    /// Track name, tag 0x03
    TrackName(String),
    /// Instrument name, tag 0x04
    InstrumentName(String),
    /// Lyric, tag 0x05
    Lyric(String),
    /// Marker, tag 0x06
    Marker(String),
    /// Cue Point, tag 0x07
    CuePoint(Vec<u8>),
    /// Midi Channel Prefix, tag 0x20
    ChannelPrefix(u8),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Microseconds per quarter note, tag 0x51
    Tempo(u32),
    /// Smpte Offset, tag 0x54
    SmpteOffset(SmpteOffset),
    /// Time signature, tag 0x58
    TimeSignature(TimeSignature),
    /// Key Signature, tag 0x59
    KeySignature(KeySignature),
    /// Sequencer Specific, tag 0x7F
    SequencerSpecific(Vec<u8>),
    /// An unknown meta event
    Unknown(u8, Vec<u8>),
}

/// A key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeySignature {
    /// Sharps (positive) or flats (negative)
    pub sharps_flats: i8,
    /// True if in a minor key
    pub minor: bool,
}

/// An SMPTE Offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteOffset {
    /// Hours of offset
    pub hours: u8,
    /// Minutes of offset
    pub minutes: u8,
    /// Seconds of offset
    pub seconds: u8,
    /// Frames of offset
    pub frames: u8,
    /// Hundredths of a frame
    pub subframes: u8,
}

/// A Time Signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSignature {
    /// The time signature's numerator
    pub numerator: u8,
    /// The time signature's denominator, already raised from its power of two
    pub denominator: u32,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Thirty second notes per quarter
    pub thirty_second_notes_per_quarter: u8,
}

/// Checks a fixed size payload and hands it back as an array
fn fixed<const N: usize>(type_code: u8, payload: &[u8]) -> Result<[u8; N], InvalidMetaEvent> {
    payload
        .try_into()
        .map_err(|_| InvalidMetaEvent::WrongLength {
            type_code,
            expected: N,
            found: payload.len(),
        })
}

impl MetaEvent {
    /// Interprets a raw meta event payload according to its type code
    pub fn parse(type_code: u8, payload: &[u8]) -> Result<Self, InvalidMetaEvent> {
        let text = || {
            String::from_utf8(payload.to_vec()).map_err(|_| InvalidMetaEvent::InvalidText(type_code))
        };

        let event = match type_code {
            0x00 => Self::SequenceNumber(u16::from_be_bytes(fixed(type_code, payload)?)),
            0x01 => Self::Text(text()?),
            0x02 => Self::Copyright(text()?),
            0x03 => Self::TrackName(text()?),
            0x04 => Self::InstrumentName(text()?),
            0x05 => Self::Lyric(text()?),
            0x06 => Self::Marker(text()?),
            0x07 => Self::CuePoint(payload.to_vec()),

            0x20 => {
                let [channel] = fixed(type_code, payload)?;
                Self::ChannelPrefix(channel)
            }
            END_OF_TRACK => {
                fixed::<0>(type_code, payload)?;
                Self::EndOfTrack
            }

            0x51 => {
                let [a, b, c] = fixed(type_code, payload)?;
                Self::Tempo(u32::from_be_bytes([0, a, b, c]))
            }
            0x54 => {
                let [hours, minutes, seconds, frames, subframes] = fixed(type_code, payload)?;
                Self::SmpteOffset(SmpteOffset {
                    hours,
                    minutes,
                    seconds,
                    frames,
                    subframes,
                })
            }
            0x58 => {
                let [numerator, power, clocks_per_click, thirty_seconds] =
                    fixed(type_code, payload)?;
                Self::TimeSignature(TimeSignature {
                    numerator,
                    denominator: 2u32.saturating_pow(power as u32),
                    clocks_per_click,
                    thirty_second_notes_per_quarter: thirty_seconds,
                })
            }
            0x59 => {
                let [sharps_flats, minor] = fixed(type_code, payload)?;
                Self::KeySignature(KeySignature {
                    sharps_flats: sharps_flats as i8,
                    minor: minor != 0,
                })
            }

            0x7F => Self::SequencerSpecific(payload.to_vec()),

            other => Self::Unknown(other, payload.to_vec()),
        };

        Ok(event)
    }
}
