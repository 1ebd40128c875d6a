//! The events that make up a track chunk

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::meta::{InvalidMetaEvent, MetaEvent, END_OF_TRACK};

/// Status nibble of a note off event
pub const NOTE_OFF: u8 = 0x8;
/// Status nibble of a note on event
pub const NOTE_ON: u8 = 0x9;
/// Status nibble of a polyphonic key pressure event
pub const POLYPHONIC_PRESSURE: u8 = 0xA;
/// Status nibble of a control change event
pub const CONTROL_CHANGE: u8 = 0xB;
/// Status nibble of a program change event
pub const PROGRAM_CHANGE: u8 = 0xC;
/// Status nibble of a channel pressure event
pub const CHANNEL_PRESSURE: u8 = 0xD;
/// Status nibble of a pitch wheel change event
pub const PITCH_BEND: u8 = 0xE;

/// Status byte of a meta event
pub const META: u8 = 0xFF;
/// Status byte of a system exclusive event
pub const SYSEX: u8 = 0xF0;
/// Status byte of an escaped system exclusive event
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// A single timed event from a track chunk.
///
/// Every variant carries the delta time exactly as it appeared on the wire: the ticks elapsed
/// since the previous event of the same track, never an absolute tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// Non-MIDI information useful to sequencers, identified by a type code
    Meta {
        /// Ticks since the previous event
        delta_time: u32,
        /// Meta event type, e.g. `0x2F` for end of track
        type_code: u8,
        /// Raw payload
        payload: Vec<u8>,
    },
    /// A system exclusive message, either `0xF0` or `0xF7` prefixed
    SystemExclusive {
        /// Ticks since the previous event
        delta_time: u32,
        /// Raw payload
        payload: Vec<u8>,
    },
    /// A key was pressed. An intensity of 0 means the key was released
    NoteStart {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// Key number
        pitch: u8,
        /// Velocity
        intensity: u8,
    },
    /// A key was released
    NoteStop {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// Key number
        pitch: u8,
        /// Release velocity
        intensity: u8,
    },
    /// Pressure applied to a single held key
    PolyphonicPressure {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// Key number
        pitch: u8,
        /// Pressure amount
        pressure: u8,
    },
    /// A controller such as a pedal or lever changed
    ControlChange {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// Controller number
        controller: u8,
        /// New value
        value: u8,
    },
    /// The patch number changed
    ProgramChange {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// New program
        program: u8,
    },
    /// Pressure applied to every held key of a channel
    ChannelPressure {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// Pressure amount
        pressure: u8,
    },
    /// The pitch wheel moved
    PitchBend {
        /// Ticks since the previous event
        delta_time: u32,
        /// Channel 0-15
        channel: u8,
        /// 14 bit wheel position, 0x2000 is centered
        value: u16,
    },
}

impl Event {
    /// Builds a channel voice event from its status byte and data bytes. `second` is ignored for
    /// the one data byte events (program change and channel pressure).
    ///
    /// Returns `None` if `status` is not a channel voice status.
    pub fn channel_voice(delta_time: u32, status: u8, first: u8, second: u8) -> Option<Self> {
        let channel = status & 0x0F;

        let event = match status >> 4 {
            NOTE_OFF => Self::NoteStop {
                delta_time,
                channel,
                pitch: first,
                intensity: second,
            },
            NOTE_ON => Self::NoteStart {
                delta_time,
                channel,
                pitch: first,
                intensity: second,
            },
            POLYPHONIC_PRESSURE => Self::PolyphonicPressure {
                delta_time,
                channel,
                pitch: first,
                pressure: second,
            },
            CONTROL_CHANGE => Self::ControlChange {
                delta_time,
                channel,
                controller: first,
                value: second,
            },
            PROGRAM_CHANGE => Self::ProgramChange {
                delta_time,
                channel,
                program: first,
            },
            CHANNEL_PRESSURE => Self::ChannelPressure {
                delta_time,
                channel,
                pressure: first,
            },
            PITCH_BEND => Self::PitchBend {
                delta_time,
                channel,
                value: ((second as u16 & 0x7F) << 7) | (first as u16 & 0x7F),
            },
            _ => return None,
        };

        Some(event)
    }

    /// Ticks since the previous event of the same track
    pub fn delta_time(&self) -> u32 {
        match self {
            Self::Meta { delta_time, .. }
            | Self::SystemExclusive { delta_time, .. }
            | Self::NoteStart { delta_time, .. }
            | Self::NoteStop { delta_time, .. }
            | Self::PolyphonicPressure { delta_time, .. }
            | Self::ControlChange { delta_time, .. }
            | Self::ProgramChange { delta_time, .. }
            | Self::ChannelPressure { delta_time, .. }
            | Self::PitchBend { delta_time, .. } => *delta_time,
        }
    }

    /// Channel of a channel voice event, `None` for meta and system exclusive events
    pub fn channel(&self) -> Option<u8> {
        match self {
            Self::Meta { .. } | Self::SystemExclusive { .. } => None,
            Self::NoteStart { channel, .. }
            | Self::NoteStop { channel, .. }
            | Self::PolyphonicPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(*channel),
        }
    }

    /// Returns true for the meta event that terminates a track chunk
    pub fn is_end_of_track(&self) -> bool {
        matches!(
            self,
            Self::Meta {
                type_code: END_OF_TRACK,
                ..
            }
        )
    }

    /// Interprets a meta event's payload. `None` for every other kind of event
    pub fn meta_event(&self) -> Option<Result<MetaEvent, InvalidMetaEvent>> {
        match self {
            Self::Meta {
                type_code, payload, ..
            } => Some(MetaEvent::parse(*type_code, payload)),
            _ => None,
        }
    }

    /// Short name of the event kind, used for logging and counting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Meta { .. } => "meta",
            Self::SystemExclusive { .. } => "sysex",
            Self::NoteStart { .. } => "note_start",
            Self::NoteStop { .. } => "note_stop",
            Self::PolyphonicPressure { .. } => "polyphonic_pressure",
            Self::ControlChange { .. } => "control_change",
            Self::ProgramChange { .. } => "program_change",
            Self::ChannelPressure { .. } => "channel_pressure",
            Self::PitchBend { .. } => "pitch_bend",
        }
    }
}
