//! # notefold
//!
//! A streaming MIDI file decoder that turns a Standard MIDI File into a flat list of notes
//! (channel, pitch, start tick and duration) ready for rendering.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. A file
//! starts with a single `MThd` header chunk and is followed by one `MTrk` chunk per track.
//!
//! Track chunks are decoded one event at a time and handed to an [`EventSink`]. The decoder
//! never materializes a list of events, so memory stays bounded no matter how large the file
//! is. Sinks can be stacked with a [`Broadcaster`], which is how one [`NoteFolder`] per channel
//! observes a single pass over each track.
//!
//! ## Example Usage
//!
//! ```rust
//! let bytes = [
//!     b'M', b'T', b'h', b'd', 0, 0, 0, 6, // Header chunk
//!     0, 1, 0, 1, 0, 96, // Format 1, 1 track, 96 ticks per quarter note
//!     b'M', b'T', b'r', b'k', 0, 0, 0, 12, // Track chunk
//!     0x00, 0x90, 60, 100, // Note on
//!     0x60, 0x80, 60, 0, // Note off 96 ticks later
//!     0x00, 0xFF, 0x2F, 0x00, // End of track
//! ];
//!
//! let notes = notefold::decode_sequence(bytes).expect("Decode sequence");
//!
//! assert_eq!(notes.len(), 1);
//! assert_eq!(notes[0].duration, 96);
//! ```
//!
//! ## Library Structure
//!
//! - **[`reader`]**: The [`ByteCursor`] every decoder reads through, and the
//!   [`MidiReadable`](reader::MidiReadable) trait for turning paths or buffers into bytes.
//! - **[`codec`]**: Big-endian integers and variable length quantities.
//! - **[`chunk`]**: Chunk headers, the sequence header and the track event decoder.
//! - **[`sink`]**: The [`EventSink`] trait, the [`Broadcaster`] and a counting sink.
//! - **[`notes`]**: [`Note`] and the per-channel [`NoteFolder`].

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod chunk;
pub mod codec;
pub mod config;
pub mod error;
pub mod notes;
pub mod reader;
pub mod sink;

pub use chunk::{
    header::{read_sequence_header, SequenceHeader},
    track::{decode_chunk, event::Event, TrackDecoder},
};
pub use config::DecoderConfig;
pub use error::DecodeError;
pub use notes::{Note, NoteFolder};
pub use reader::ByteCursor;
pub use sink::{Broadcaster, EventSink};

use reader::MidiReadable;

/// Number of MIDI channels, and so of note folders per track
pub const CHANNEL_COUNT: u8 = 16;

/// Represents a raw MIDI Chunk header.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer
/// specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkHeader {
    /// 4 character ASCII chunk type
    pub chunk_type: [char; 4],
    /// Length of the data that follows
    length: u32,
}

impl ChunkHeader {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The chunk type as a string, e.g. `"MTrk"`
    pub fn tag_str(&self) -> String {
        self.chunk_type.iter().collect()
    }
}

impl From<u64> for ChunkHeader {
    fn from(value: u64) -> Self {
        let [a, b, c, d, ..] = value.to_be_bytes();

        Self {
            chunk_type: [a as char, b as char, c as char, d as char],
            length: value as u32,
        }
    }
}

/// Decodes a complete MIDI file into its notes using the default [`DecoderConfig`].
///
/// See [`decode_sequence_with`] for the ordering of the returned notes.
pub fn decode_sequence<I>(stream: I) -> Result<Vec<Note>, DecodeError>
where
    I: IntoIterator<Item = u8>,
{
    decode_sequence_with(stream, &DecoderConfig::default())
}

/// Decodes a complete MIDI file into its notes.
///
/// Reads the header chunk, then exactly as many track chunks as it declares. Every track is
/// decoded in a single pass feeding one [`NoteFolder`] per enabled channel. Notes come out
/// grouped by track in file order, then by channel in ascending order, and within a channel in
/// the order their notes ended. Any failure aborts the whole sequence.
pub fn decode_sequence_with<I>(stream: I, config: &DecoderConfig) -> Result<Vec<Note>, DecodeError>
where
    I: IntoIterator<Item = u8>,
{
    let mut cursor = ByteCursor::new(stream);
    let header = read_sequence_header(&mut cursor, config)?;
    let mut notes = vec![];

    for track in 0..header.track_count {
        let mut folders: Vec<NoteFolder> = (0..CHANNEL_COUNT)
            .filter(|channel| config.channel_enabled(*channel))
            .map(NoteFolder::new)
            .collect();

        {
            let mut broadcaster = Broadcaster::new();
            for folder in folders.iter_mut() {
                broadcaster.register(folder);
            }
            decode_chunk(&mut cursor, &mut broadcaster)?;
        }

        let before = notes.len();
        for folder in folders {
            notes.extend(folder.into_notes());
        }
        debug!(track, notes = notes.len() - before, "folded track notes");
    }

    Ok(notes)
}

/// Decodes a MIDI file held in a borrowed buffer
pub fn decode_slice(bytes: &[u8]) -> Result<Vec<Note>, DecodeError> {
    decode_sequence(bytes.iter().copied())
}

/// Decodes anything that can be turned into MIDI bytes, such as a path or a
/// [`MidiData`](reader::MidiData) buffer
pub fn decode_source<SOURCE>(source: SOURCE) -> Result<Vec<Note>, DecodeError>
where
    SOURCE: MidiReadable,
    DecodeError: From<SOURCE::Error>,
{
    let bytes = source.get_midi_bytes()?;
    decode_sequence(bytes)
}

/// Opens a MIDI file from disk and decodes it with [`decode_sequence`]
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Vec<Note>, DecodeError> {
    decode_source(path)
}
