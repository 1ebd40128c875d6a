//! Track chunk (`MTrk`) decoding. Events are decoded one at a time and streamed to an
//! [`EventSink`], so no track is ever held in memory as a list of events.

use event::{Event, META, SYSEX, SYSEX_ESCAPE};
use tracing::{debug, trace};

use super::{chunk_types::TRACK_DATA_CHUNK, expect_chunk};
use crate::{
    codec::{msb_is_one, read_vlq},
    error::{DecodeError, DecodeResult},
    reader::ByteCursor,
    sink::EventSink,
};

pub mod event;
pub mod meta;

/// Decoding state for a single pass over one track chunk: the running status register and the
/// absolute tick reached so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackDecoder {
    /// Most recent channel voice status byte, reused when an event omits its own
    running_status: Option<u8>,
    /// Sum of every delta time decoded so far
    absolute_tick: u32,
}

impl TrackDecoder {
    /// Creates a decoder at tick 0 with no running status
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached channel voice status, if any
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// Absolute tick of the last decoded event
    pub fn absolute_tick(&self) -> u32 {
        self.absolute_tick
    }

    /// Decodes the next event: a delta time followed by either an explicit status byte and its
    /// data, or data bytes that reuse the running status.
    ///
    /// Meta and system exclusive events neither update nor consult the running status.
    pub fn decode_event<ITER>(&mut self, cursor: &mut ByteCursor<ITER>) -> DecodeResult<Event>
    where
        ITER: Iterator<Item = u8>,
    {
        let delta_time = read_vlq(cursor)?;
        self.absolute_tick = self.absolute_tick.wrapping_add(delta_time);

        let position = cursor.position();
        let byte = cursor.read_byte()?;

        match byte {
            META => {
                let type_code = cursor.read_byte()?;
                let length = read_vlq(cursor)?;
                let payload = cursor.read_bytes(length as usize)?;

                Ok(Event::Meta {
                    delta_time,
                    type_code,
                    payload,
                })
            }

            SYSEX | SYSEX_ESCAPE => {
                let length = read_vlq(cursor)?;
                let payload = cursor.read_bytes(length as usize)?;

                Ok(Event::SystemExclusive {
                    delta_time,
                    payload,
                })
            }

            status @ 0x80..=0xEF => {
                self.running_status = Some(status);
                let first = cursor.read_byte()?;
                Self::channel_voice(delta_time, status, first, cursor)
            }

            status if msb_is_one(status) => {
                Err(DecodeError::UnsupportedStatus { status, position })
            }

            // Not a status byte, so it is the first data byte of a running status event
            first => {
                let status = self
                    .running_status
                    .ok_or(DecodeError::MissingRunningStatus {
                        byte: first,
                        position,
                    })?;
                Self::channel_voice(delta_time, status, first, cursor)
            }
        }
    }

    /// Reads whatever data bytes remain for a channel voice event and builds it
    fn channel_voice<ITER>(
        delta_time: u32,
        status: u8,
        first: u8,
        cursor: &mut ByteCursor<ITER>,
    ) -> DecodeResult<Event>
    where
        ITER: Iterator<Item = u8>,
    {
        let second = match status >> 4 {
            event::PROGRAM_CHANGE | event::CHANNEL_PRESSURE => 0,
            _ => cursor.read_byte()?,
        };

        Event::channel_voice(delta_time, status, first, second).ok_or(
            DecodeError::UnsupportedStatus {
                status,
                position: cursor.position(),
            },
        )
    }
}

/// Decodes one `MTrk` chunk, forwarding every event to `sink` in stream order.
///
/// Decoding stops right after the end of track meta event has been forwarded; nothing past it is
/// read, whatever length the chunk header declares. Fails if the chunk tag is not `MTrk` or the
/// input runs out first.
pub fn decode_chunk<ITER, SINK>(cursor: &mut ByteCursor<ITER>, sink: &mut SINK) -> DecodeResult<()>
where
    ITER: Iterator<Item = u8>,
    SINK: EventSink + ?Sized,
{
    let chunk = expect_chunk(cursor, TRACK_DATA_CHUNK)?;
    let mut decoder = TrackDecoder::new();
    let mut events = 0usize;

    loop {
        let event = decoder.decode_event(cursor)?;
        trace!(kind = event.kind(), tick = decoder.absolute_tick(), "decoded event");

        sink.receive(&event);
        events += 1;

        if event.is_end_of_track() {
            debug!(
                declared_length = chunk.len(),
                events,
                final_tick = decoder.absolute_tick(),
                "finished track chunk"
            );
            return Ok(());
        }
    }
}
