//! Tab-separated sequence encoding
//!
//! Sequences travel as plain text so that the same files can be edited by
//! hand, stored on the board, and sent inside a `Sequence` frame:
//!
//! ```text
//! sequence<TAB>sequence0
//! event<TAB>frequency<TAB>onset<TAB>duration<TAB>pulse_width
//! event0<TAB>2<TAB>0<TAB>1<TAB>0.01
//! event1<TAB>40<TAB>0.5<TAB>0.25<TAB>0.005
//! ```
//!
//! A library is several such blocks back to back. Numbers are written with
//! the shortest representation that parses back to the same `f64`, so a
//! round trip is exact.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::SequenceError;
use crate::sequence::{Event, Sequence, SequenceLibrary};

/// Keyword that opens a sequence block
pub const SEQUENCE_KEYWORD: &str = "sequence";

/// Column header line of every block
pub const HEADER: &str = "event\tfrequency\tonset\tduration\tpulse_width";

const COLUMNS: usize = 5;

/// Append one sequence block to `out`
pub fn write_sequence(out: &mut String, sequence: &Sequence) {
    // Writing into a String cannot fail
    let _ = writeln!(out, "{}\t{}", SEQUENCE_KEYWORD, sequence.name());
    let _ = writeln!(out, "{}", HEADER);
    for (name, event) in sequence.iter_named() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            name, event.frequency, event.onset, event.duration, event.pulse_width
        );
    }
}

/// Encode a single sequence
pub fn encode_sequence(sequence: &Sequence) -> String {
    let mut out = String::new();
    write_sequence(&mut out, sequence);
    out
}

/// Encode every sequence of a library
pub fn encode_library(library: &SequenceLibrary) -> String {
    let mut out = String::new();
    for sequence in library.iter() {
        write_sequence(&mut out, sequence);
    }
    out
}

/// Decode text holding exactly one sequence block
pub fn decode_sequence(text: &str) -> Result<Sequence, SequenceError> {
    let mut blocks = parse_blocks(text)?;
    match blocks.len() {
        1 => blocks.remove(0).build(),
        0 => Err(SequenceError::Syntax(1)),
        _ => Err(SequenceError::Syntax(blocks[1].line)),
    }
}

/// Decode text holding any number of sequence blocks
pub fn decode_library(text: &str) -> Result<SequenceLibrary, SequenceError> {
    let mut library = SequenceLibrary::new();
    for block in parse_blocks(text)? {
        library.insert(block.build()?);
    }
    Ok(library)
}

/// One parsed block before validation
struct Block<'a> {
    /// Line of the `sequence` keyword (1-based)
    line: usize,
    name: &'a str,
    has_header: bool,
    rows: Vec<(&'a str, Event)>,
}

impl Block<'_> {
    fn build(self) -> Result<Sequence, SequenceError> {
        if !self.has_header {
            return Err(SequenceError::Syntax(self.line + 1));
        }
        Sequence::from_named_events(self.name, self.rows)
    }
}

fn parse_blocks(text: &str) -> Result<Vec<Block<'_>>, SequenceError> {
    let mut blocks: Vec<Block<'_>> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split('\t');
        let first = fields.next().unwrap_or_default();

        if first == SEQUENCE_KEYWORD {
            let name = fields.next().ok_or(SequenceError::Syntax(line_no))?;
            if name.is_empty() || fields.next().is_some() {
                return Err(SequenceError::Syntax(line_no));
            }
            blocks.push(Block {
                line: line_no,
                name,
                has_header: false,
                rows: Vec::new(),
            });
            continue;
        }

        let block = blocks.last_mut().ok_or(SequenceError::Syntax(line_no))?;

        if line == HEADER {
            if block.has_header {
                return Err(SequenceError::Syntax(line_no));
            }
            block.has_header = true;
            continue;
        }

        if !block.has_header {
            return Err(SequenceError::Syntax(line_no));
        }

        let row = parse_row(first, fields).ok_or(SequenceError::Syntax(line_no))?;
        block.rows.push(row);
    }

    Ok(blocks)
}

fn parse_row<'a>(
    name: &'a str,
    fields: core::str::Split<'a, char>,
) -> Option<(&'a str, Event)> {
    let mut values = [0.0f64; COLUMNS - 1];
    let mut count = 0;
    for field in fields {
        let slot = values.get_mut(count)?;
        *slot = field.trim().parse::<f64>().ok()?;
        count += 1;
    }
    if count != COLUMNS - 1 {
        return None;
    }
    let [frequency, onset, duration, pulse_width] = values;
    Some((name, Event::new(frequency, onset, duration, pulse_width)))
}
