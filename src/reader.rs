//! MIDI source trait and the byte cursor every decoder reads through. In memory byte spans and
//! files can both be turned into a stream of bytes

use std::{convert::Infallible, fs, path::Path};

use crate::error::{DecodeError, DecodeResult};

/// Trait that allows certain amount of bytes to be yielded by an iterator
pub trait Yieldable<T> {
    /// Gets up to `n` elements while advancing the iterator
    fn get(&mut self, n: usize) -> Vec<T>;
}

impl<ITER: Iterator> Yieldable<ITER::Item> for ITER {
    fn get(&mut self, n: usize) -> Vec<ITER::Item> {
        self.by_ref().take(n).collect()
    }
}

/// Trait that allows for different types to be translated to a MIDI parseable format
pub trait MidiReadable {
    /// Error type that may be returned while opening the source
    type Error;
    /// Creates a byte iterator from the type
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error>;
}

/// Wrapper struct to allow passing `Vec<u8>` to the [`MidiReadable`] trait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiData(pub Vec<u8>);

impl MidiReadable for MidiData {
    type Error = Infallible;
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        Ok(self.0.into_iter())
    }
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = std::io::Error;
    /// Reads the whole file up front, so read failures surface here rather than as a stream
    /// that ends early
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        let bytes = fs::read(self.as_ref())?;
        Ok(bytes.into_iter())
    }
}

/// Sequential, fallible reader over a stream of bytes. Tracks how many bytes have been consumed
/// so errors can point at the offending offset
#[derive(Debug, Clone)]
pub struct ByteCursor<ITER> {
    /// The underlying byte source
    bytes: ITER,
    /// Number of bytes consumed so far
    position: usize,
}

impl<'a> ByteCursor<std::iter::Copied<std::slice::Iter<'a, u8>>> {
    /// Creates a cursor borrowing an in-memory buffer
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(bytes.iter().copied())
    }
}

impl<ITER> ByteCursor<ITER>
where
    ITER: Iterator<Item = u8>,
{
    /// Wraps any byte iterator in a cursor
    pub fn new<I>(bytes: I) -> Self
    where
        I: IntoIterator<IntoIter = ITER>,
    {
        Self {
            bytes: bytes.into_iter(),
            position: 0,
        }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Reads a single byte
    pub fn read_byte(&mut self) -> DecodeResult<u8> {
        let byte = self.bytes.next().ok_or(DecodeError::TruncatedInput {
            position: self.position,
        })?;
        self.position += 1;

        Ok(byte)
    }

    /// Reads exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut buf = [0u8; N];
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }

        Ok(buf)
    }

    /// Reads exactly `n` bytes into a freshly allocated buffer
    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<Vec<u8>> {
        let bytes = self.bytes.get(n);
        self.position += bytes.len();

        if bytes.len() < n {
            return Err(DecodeError::TruncatedInput {
                position: self.position,
            });
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteCursor, MidiData, MidiReadable, Yieldable};

    #[test]
    fn yield_stops_when_iterator_runs_out() {
        let mut iter = [1u8, 2, 3].into_iter();

        assert_eq!(iter.get(2), vec![1, 2]);
        assert_eq!(iter.get(5), vec![3]);
        assert!(iter.get(1).is_empty());
    }

    #[test]
    fn cursor_tracks_position() {
        let mut cursor = ByteCursor::from_slice(&[0x10, 0x20, 0x30, 0x40]);

        assert_eq!(cursor.read_byte().expect("Read first byte"), 0x10);
        assert_eq!(cursor.read_array::<2>().expect("Read two bytes"), [0x20, 0x30]);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn read_byte_on_empty_input_is_truncated() {
        let mut cursor = ByteCursor::from_slice(&[]);
        let err = cursor.read_byte().expect_err("Nothing to read");

        assert!(err.is_truncated())
    }

    #[test]
    fn short_read_reports_where_input_ended() {
        let mut cursor = ByteCursor::from_slice(&[1, 2, 3]);
        let err = cursor.read_bytes(8).expect_err("Only 3 bytes available");

        assert!(matches!(
            err,
            crate::DecodeError::TruncatedInput { position: 3 }
        ))
    }

    #[test]
    fn in_memory_data_streams() {
        let data = MidiData(vec![0x4D, 0x54])
            .get_midi_bytes()
            .expect("Infallible source");

        assert_eq!(data.collect::<Vec<_>>(), vec![0x4D, 0x54])
    }

    #[test]
    fn missing_file_fails_to_open() {
        let data = "does/not/exist.mid".get_midi_bytes();

        assert!(data.is_err())
    }

    #[test]
    fn unreadable_path_fails_instead_of_streaming_nothing() {
        let data = std::env::temp_dir().get_midi_bytes();

        assert!(data.is_err())
    }
}
