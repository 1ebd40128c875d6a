//! Consumers of decoded events. The track decoder hands every event it decodes to an
//! [`EventSink`] instead of collecting them, inverting control over what happens to each event.

use std::collections::BTreeMap;

use crate::chunk::track::event::Event;

/// Anything that can consume a stream of decoded events.
///
/// Events arrive in stream order, each carrying its delta time relative to the previous event
/// of the same track. Sinks that care about absolute time keep their own running sum.
pub trait EventSink {
    /// Handles a single decoded event
    fn receive(&mut self, event: &Event);
}

impl<SINK: EventSink + ?Sized> EventSink for &mut SINK {
    fn receive(&mut self, event: &Event) {
        (**self).receive(event)
    }
}

impl<SINK: EventSink + ?Sized> EventSink for Box<SINK> {
    fn receive(&mut self, event: &Event) {
        (**self).receive(event)
    }
}

/// Forwards every event to each of its sinks, in registration order. Lets several independent
/// sinks observe one pass over a track
#[derive(Default)]
pub struct Broadcaster<'a> {
    /// Borrowed sinks, which must outlive the broadcaster
    sinks: Vec<&'a mut dyn EventSink>,
}

impl<'a> Broadcaster<'a> {
    /// Creates a broadcaster with no sinks
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink to the end of the forwarding order
    pub fn register(&mut self, sink: &'a mut dyn EventSink) {
        self.sinks.push(sink);
    }

    /// Number of registered sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if no sinks are registered
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl<'a> FromIterator<&'a mut dyn EventSink> for Broadcaster<'a> {
    fn from_iter<T: IntoIterator<Item = &'a mut dyn EventSink>>(iter: T) -> Self {
        Self {
            sinks: iter.into_iter().collect(),
        }
    }
}

impl EventSink for Broadcaster<'_> {
    fn receive(&mut self, event: &Event) {
        for sink in self.sinks.iter_mut() {
            sink.receive(event);
        }
    }
}

/// Diagnostic sink that counts events by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCounter {
    /// Events seen, keyed by [`Event::kind`]
    counts: BTreeMap<&'static str, usize>,
}

impl EventCounter {
    /// Creates a counter that has seen nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events of the given kind, e.g. `"note_start"`
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Number of events of every kind
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterates over every kind seen along with its count
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl EventSink for EventCounter {
    fn receive(&mut self, event: &Event) {
        *self.counts.entry(event.kind()).or_default() += 1;
    }
}
