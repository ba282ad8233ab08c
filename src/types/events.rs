/// Events sent from control threads (CLI, MIDI) to the audio thread
/// Must be simple and fast to construct/parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneEvent {
    /// Retune to `frequency` and open the gate
    NoteOn { note: u8, frequency: f32 },
    /// Close the gate if `note` is the sounding note
    NoteOff { note: u8 },
    /// Close the gate regardless of note (MIDI panic)
    AllNotesOff,
    /// Restart the oscillator from phase 0
    ResetPhase,
}

impl ToneEvent {
    pub fn note_on(note: u8, frequency: f32) -> Self {
        ToneEvent::NoteOn { note, frequency }
    }

    pub fn note_off(note: u8) -> Self {
        ToneEvent::NoteOff { note }
    }
}
