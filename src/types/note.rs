//! MIDI note to frequency conversion using equal temperament
//! A440 tuning: MIDI note 69 = 440 Hz

use anyhow::{anyhow, Result};

/// Convert MIDI note number to frequency in Hz
/// Uses equal temperament: f = 440 * 2^((n-69)/12)
pub fn midi_note_to_frequency(note: u8) -> f32 {
    const A4: f32 = 440.0;
    const A4_MIDI: i32 = 69;

    let semitones = note as i32 - A4_MIDI;
    A4 * 2.0_f32.powf(semitones as f32 / 12.0)
}

/// Parse a note name to a MIDI note number
/// Examples: "c1" -> 24, "a4" -> 69, "gb1" -> 30, "c#-1" -> 1
pub fn parse_note_name(name: &str) -> Result<u8> {
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();

    let base_note = match chars.next() {
        Some('c') => 0,
        Some('d') => 2,
        Some('e') => 4,
        Some('f') => 5,
        Some('g') => 7,
        Some('a') => 9,
        Some('b') => 11,
        Some(other) => return Err(anyhow!("Invalid note name: {}", other)),
        None => return Err(anyhow!("Empty note string")),
    };

    // An accidental may only follow the letter directly
    let rest = chars.as_str();
    let (offset, octave_str) = match rest.chars().next() {
        Some('#') | Some('s') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave_str
        .parse()
        .map_err(|_| anyhow!("Invalid octave: {}", octave_str))?;

    // C-1 = 0, C0 = 12, C4 = 60
    let midi_note = (octave + 1) * 12 + base_note + offset;
    if !(0..=127).contains(&midi_note) {
        return Err(anyhow!("Note out of range: {}", midi_note));
    }

    Ok(midi_note as u8)
}
