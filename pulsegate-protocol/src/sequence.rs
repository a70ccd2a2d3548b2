//! Sequence model
//!
//! A sequence is a named, ordered set of periodic pulse events. Event names
//! follow a strict `event0..event<N-1>` enumeration; the index is the firing
//! order within one scheduling pass.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::SequenceError;

/// Prefix shared by every event name
pub const EVENT_PREFIX: &str = "event";

/// One periodic pulse definition
///
/// All times are in seconds relative to the trigger edge. Pulses repeat every
/// `1 / frequency` seconds from `onset` until `onset + duration`.
/// `pulse_width <= 1 / frequency` is expected but not enforced; a wider
/// pulse just makes consecutive pulses overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Pulse repetition frequency (Hz)
    pub frequency: f64,
    /// Offset of the first pulse from the trigger (s)
    pub onset: f64,
    /// Length of the pulse window (s)
    pub duration: f64,
    /// High time of each pulse (s)
    pub pulse_width: f64,
}

impl Event {
    /// Create an event without validating it
    pub const fn new(frequency: f64, onset: f64, duration: f64, pulse_width: f64) -> Self {
        Self {
            frequency,
            onset,
            duration,
            pulse_width,
        }
    }

    /// Check the event can be scheduled
    pub fn validate(&self) -> Result<(), SequenceError> {
        let values = [self.frequency, self.onset, self.duration, self.pulse_width];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SequenceError::NonFiniteValue);
        }
        if self.frequency <= 0.0 {
            return Err(SequenceError::NonPositiveFrequency);
        }
        if self.pulse_width <= 0.0 {
            return Err(SequenceError::NonPositivePulseWidth);
        }
        if self.onset < 0.0 || self.duration < 0.0 {
            return Err(SequenceError::NegativeTiming);
        }
        Ok(())
    }

    /// Pulse period (s)
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// End of the pulse window relative to the trigger (s)
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}

/// Name of the event at a given index (`event<k>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventName(pub usize);

impl EventName {
    /// Parse `event<k>` into its index
    ///
    /// Leading zeros are rejected so that every index has exactly one name.
    pub fn parse(name: &str) -> Result<Self, SequenceError> {
        let digits = name
            .strip_prefix(EVENT_PREFIX)
            .ok_or(SequenceError::BadEventName)?;
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(SequenceError::BadEventName);
        }
        digits
            .parse::<usize>()
            .map(EventName)
            .map_err(|_| SequenceError::BadEventName)
    }

    /// Event index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", EVENT_PREFIX, self.0)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(&['\t', '\r', '\n'][..])
}

/// A named, validated sequence of events
///
/// Immutable once built; the scheduler borrows it for a whole pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: String,
    events: Vec<Event>,
}

impl Sequence {
    /// Build a sequence from events already in firing order
    ///
    /// Event `i` is named `event<i>`. The name ends up in a tab-separated
    /// line, so it must be non-empty and free of tabs and line breaks.
    pub fn new(name: impl Into<String>, events: Vec<Event>) -> Result<Self, SequenceError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(SequenceError::BadSequenceName);
        }
        for event in &events {
            event.validate()?;
        }
        Ok(Self { name, events })
    }

    /// Build a sequence from a name → event mapping
    ///
    /// Order of the input does not matter. Names must be `event<k>`,
    /// unique, and contiguous from `event0`.
    pub fn from_named_events<'a, I>(name: impl Into<String>, named: I) -> Result<Self, SequenceError>
    where
        I: IntoIterator<Item = (&'a str, Event)>,
    {
        let mut by_index = BTreeMap::new();
        for (event_name, event) in named {
            let index = EventName::parse(event_name)?.index();
            if by_index.insert(index, event).is_some() {
                return Err(SequenceError::DuplicateEvent(index));
            }
        }

        let mut events = Vec::with_capacity(by_index.len());
        for (expected, (index, event)) in by_index.into_iter().enumerate() {
            if index != expected {
                return Err(SequenceError::MissingEvent(expected));
            }
            events.push(event);
        }

        Self::new(name, events)
    }

    /// Sequence name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events in firing order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the sequence has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up an event by name
    pub fn get(&self, name: &str) -> Option<&Event> {
        let index = EventName::parse(name).ok()?.index();
        self.events.get(index)
    }

    /// Events paired with their names, in firing order
    pub fn iter_named(&self) -> impl Iterator<Item = (EventName, &Event)> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, event)| (EventName(i), event))
    }
}

/// Collection of sequences keyed by name
///
/// Insertion order is kept; inserting a name twice replaces the earlier
/// sequence in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceLibrary {
    sequences: Vec<Sequence>,
}

impl SequenceLibrary {
    /// Create an empty library
    pub const fn new() -> Self {
        Self {
            sequences: Vec::new(),
        }
    }

    /// Add or replace a sequence
    pub fn insert(&mut self, sequence: Sequence) {
        match self
            .sequences
            .iter_mut()
            .find(|s| s.name() == sequence.name())
        {
            Some(existing) => *existing = sequence,
            None => self.sequences.push(sequence),
        }
    }

    /// Look up a sequence by name
    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name() == name)
    }

    /// Iterate sequences in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// True if the library is empty
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl FromIterator<Sequence> for SequenceLibrary {
    fn from_iter<T: IntoIterator<Item = Sequence>>(iter: T) -> Self {
        let mut library = SequenceLibrary::new();
        for sequence in iter {
            library.insert(sequence);
        }
        library
    }
}
