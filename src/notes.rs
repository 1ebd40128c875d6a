//! Notes and the per-channel folder that pairs note on and note off events into them

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{chunk::track::event::Event, sink::EventSink};

/// A note played on one channel, spanning `duration` ticks from absolute tick `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    /// Channel 0-15
    pub channel: u8,
    /// Key number
    pub pitch: u8,
    /// Absolute tick the note started at
    pub start: u32,
    /// Length in ticks
    pub duration: u32,
}

impl Note {
    /// Absolute tick the note ended at
    pub fn end(&self) -> u32 {
        self.start.wrapping_add(self.duration)
    }
}

/// A note that has started but not yet stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingNote {
    /// Absolute tick of the start event
    pub start: u32,
    /// Velocity of the start event
    pub intensity: u8,
}

/// Collects the notes of a single channel from a stream of events.
///
/// The folder keeps its own clock by summing every delta time it receives, whatever the event
/// or channel, so it has to see every event of a track to stay in step. A note is emitted when
/// its stop event arrives, so notes come out ordered by when they ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFolder {
    /// The only channel whose notes are collected
    channel: u8,
    /// Absolute tick of the last event received
    now: u32,
    /// Started notes, keyed by pitch
    pending: HashMap<u8, PendingNote>,
    /// Closed notes in the order they stopped
    notes: Vec<Note>,
}

impl NoteFolder {
    /// Creates a folder collecting notes on `channel`
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            now: 0,
            pending: HashMap::new(),
            notes: vec![],
        }
    }

    /// The channel this folder collects
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The folder's current absolute tick
    pub fn now(&self) -> u32 {
        self.now
    }

    /// Notes closed so far, in the order they stopped
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// The note pending at `pitch`, if any
    pub fn pending(&self, pitch: u8) -> Option<&PendingNote> {
        self.pending.get(&pitch)
    }

    /// Consumes the folder, returning its notes. Notes still pending are dropped
    pub fn into_notes(self) -> Vec<Note> {
        if !self.pending.is_empty() {
            trace!(
                channel = self.channel,
                unterminated = self.pending.len(),
                "dropping notes that never stopped"
            );
        }
        self.notes
    }

    /// Moves the clock forward without touching any note
    pub fn advance(&mut self, delta_time: u32) {
        self.now = self.now.wrapping_add(delta_time);
    }

    /// A note on event. An intensity of 0 stops the note instead, and starting a pitch that is
    /// already pending restarts it at the current tick.
    pub fn note_start(&mut self, delta_time: u32, channel: u8, pitch: u8, intensity: u8) {
        self.advance(delta_time);

        if channel != self.channel {
            return;
        }

        if intensity == 0 {
            self.close(pitch);
        } else {
            self.pending.insert(
                pitch,
                PendingNote {
                    start: self.now,
                    intensity,
                },
            );
        }
    }

    /// A note off event. The release intensity plays no part in folding
    pub fn note_stop(&mut self, delta_time: u32, channel: u8, pitch: u8, _intensity: u8) {
        self.advance(delta_time);

        if channel == self.channel {
            self.close(pitch);
        }
    }

    /// Emits the note pending at `pitch`. A stop with nothing pending is ignored
    fn close(&mut self, pitch: u8) {
        match self.pending.remove(&pitch) {
            Some(pending) => self.notes.push(Note {
                channel: self.channel,
                pitch,
                start: pending.start,
                duration: self.now.wrapping_sub(pending.start),
            }),
            None => trace!(
                channel = self.channel,
                pitch,
                tick = self.now,
                "stop without a pending note"
            ),
        }
    }
}

impl EventSink for NoteFolder {
    fn receive(&mut self, event: &Event) {
        match *event {
            Event::NoteStart {
                delta_time,
                channel,
                pitch,
                intensity,
            } => self.note_start(delta_time, channel, pitch, intensity),
            Event::NoteStop {
                delta_time,
                channel,
                pitch,
                intensity,
            } => self.note_stop(delta_time, channel, pitch, intensity),
            _ => self.advance(event.delta_time()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Note, NoteFolder};
    use crate::{chunk::track::event::Event, sink::EventSink};

    fn note(channel: u8, pitch: u8, start: u32, duration: u32) -> Note {
        Note {
            channel,
            pitch,
            start,
            duration,
        }
    }

    #[test]
    fn single_note() {
        let mut folder = NoteFolder::new(0);
        folder.note_start(0, 0, 5, 255);
        folder.note_stop(100, 0, 5, 255);

        assert_eq!(folder.notes(), &[note(0, 5, 0, 100)]);
    }

    #[test]
    fn single_note_on_other_bound_channel() {
        let mut folder = NoteFolder::new(2);
        folder.note_start(0, 2, 5, 255);
        folder.note_stop(100, 2, 5, 255);

        assert_eq!(folder.notes(), &[note(2, 5, 0, 100)]);
    }

    #[test]
    fn other_channels_are_ignored() {
        let mut folder = NoteFolder::new(2);
        folder.note_start(0, 0, 5, 255);
        folder.note_stop(100, 0, 5, 255);

        assert!(folder.notes().is_empty());
        assert_eq!(folder.now(), 100);
    }

    #[test]
    fn two_consecutive_notes() {
        let mut folder = NoteFolder::new(0);
        folder.note_start(0, 0, 5, 255);
        folder.note_stop(100, 0, 5, 255);
        folder.note_start(100, 0, 7, 255);
        folder.note_stop(100, 0, 7, 255);

        assert_eq!(folder.notes(), &[note(0, 5, 0, 100), note(0, 7, 200, 100)]);
    }

    #[test]
    fn overlapping_notes_come_out_in_stop_order() {
        // A B a b
        let mut folder = NoteFolder::new(0);
        folder.note_start(100, 0, 10, 255);
        folder.note_start(200, 0, 15, 255);
        folder.note_stop(300, 0, 10, 255);
        folder.note_stop(400, 0, 15, 255);

        assert_eq!(folder.notes(), &[note(0, 10, 100, 500), note(0, 15, 300, 700)]);
    }

    #[test]
    fn nested_notes_come_out_in_stop_order() {
        // A a b B
        let mut folder = NoteFolder::new(0);
        folder.note_start(100, 0, 50, 255);
        folder.note_start(200, 0, 40, 255);
        folder.note_stop(400, 0, 40, 255);
        folder.note_stop(300, 0, 50, 255);

        assert_eq!(folder.notes(), &[note(0, 40, 300, 400), note(0, 50, 100, 900)]);
    }

    #[test]
    fn zero_intensity_start_stops_the_note() {
        let mut folder = NoteFolder::new(0);
        folder.note_start(0, 0, 50, 255);
        folder.note_start(100, 0, 50, 0);

        assert_eq!(folder.notes(), &[note(0, 50, 0, 100)]);
        assert!(folder.pending(50).is_none());
    }

    #[test]
    fn five_simultaneous_notes() {
        let mut folder = NoteFolder::new(0);
        for pitch in 0..5 {
            folder.note_start(0, 0, pitch, 255);
        }
        folder.note_start(1000, 0, 0, 0);
        for pitch in 1..5 {
            folder.note_start(0, 0, pitch, 0);
        }

        let expected: Vec<_> = (0..5).map(|pitch| note(0, pitch, 0, 1000)).collect();
        assert_eq!(folder.notes(), expected.as_slice());
    }

    #[test]
    fn stop_without_start_is_ignored() {
        let mut folder = NoteFolder::new(0);
        folder.note_stop(10, 0, 60, 0);
        folder.note_start(10, 0, 61, 0);

        assert!(folder.notes().is_empty());
        assert_eq!(folder.now(), 20);
    }

    #[test]
    fn restarting_a_pending_pitch_overwrites_it() {
        let mut folder = NoteFolder::new(0);
        folder.note_start(0, 0, 60, 90);
        folder.note_start(50, 0, 60, 80);
        assert_eq!(folder.pending(60).map(|p| (p.start, p.intensity)), Some((50, 80)));

        folder.note_stop(50, 0, 60, 0);
        assert_eq!(folder.notes(), &[note(0, 60, 50, 50)]);
    }

    #[test]
    fn unrelated_events_keep_the_clock_in_step() {
        let mut folder = NoteFolder::new(1);
        let events = [
            Event::NoteStart {
                delta_time: 10,
                channel: 1,
                pitch: 64,
                intensity: 100,
            },
            Event::ControlChange {
                delta_time: 5,
                channel: 0,
                controller: 64,
                value: 127,
            },
            Event::Meta {
                delta_time: 7,
                type_code: 0x01,
                payload: vec![],
            },
            Event::SystemExclusive {
                delta_time: 3,
                payload: vec![],
            },
            Event::NoteStop {
                delta_time: 5,
                channel: 1,
                pitch: 64,
                intensity: 0,
            },
        ];

        for event in &events {
            folder.receive(event);
        }

        assert_eq!(folder.into_notes(), vec![note(1, 64, 10, 20)]);
    }

    #[test]
    fn unterminated_notes_are_dropped() {
        let mut folder = NoteFolder::new(0);
        folder.note_start(0, 0, 60, 90);

        assert!(folder.into_notes().is_empty());
    }

    #[test]
    fn note_end() {
        assert_eq!(note(0, 60, 96, 48).end(), 144)
    }
}
