use crate::types::{events::ToneEvent, note::midi_note_to_frequency};

/// CC 123: All Notes Off
const CC_ALL_NOTES_OFF: u8 = 123;

/// Filter value that accepts every channel
pub const OMNI: u8 = 255;

/// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    Unknown,
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a message
    /// Handles standard MIDI protocol: [status, data1, data2]
    pub fn parse(bytes: &[u8]) -> Self {
        let [status, data1, data2, ..] = *bytes else {
            return MidiMessage::Unknown;
        };
        let channel = status & 0x0F;

        match status & 0xF0 {
            // Note On with velocity 0 is a Note Off
            0x90 if data2 == 0 => MidiMessage::NoteOff { channel, note: data1 },
            0x90 => MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            0x80 => MidiMessage::NoteOff { channel, note: data1 },
            0xB0 => MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            },
            _ => MidiMessage::Unknown,
        }
    }

    fn channel(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. } => Some(*channel),
            MidiMessage::Unknown => None,
        }
    }

    /// Convert MIDI message to tone event
    /// Filters by MIDI channel: 255 = omni (all channels), 0-15 = specific channel
    pub fn to_tone_event(&self, channel_filter: u8) -> Option<ToneEvent> {
        let channel = self.channel()?;
        if channel_filter != OMNI && channel != channel_filter {
            return None;
        }

        match *self {
            MidiMessage::NoteOn { note, .. } => {
                Some(ToneEvent::note_on(note, midi_note_to_frequency(note)))
            }
            MidiMessage::NoteOff { note, .. } => Some(ToneEvent::note_off(note)),
            MidiMessage::ControlChange { controller, .. } if controller == CC_ALL_NOTES_OFF => {
                Some(ToneEvent::AllNotesOff)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let bytes = [0x90, 60, 100]; // Note On, channel 0, middle C, velocity 100
        let msg = MidiMessage::parse(&bytes);
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_parse_note_off() {
        let bytes = [0x85, 60, 64]; // Note Off, channel 5, middle C
        let msg = MidiMessage::parse(&bytes);
        assert_eq!(msg, MidiMessage::NoteOff { channel: 5, note: 60 });
    }

    #[test]
    fn test_note_on_velocity_zero_is_note_off() {
        let msg = MidiMessage::parse(&[0x90, 60, 0]);
        assert!(matches!(msg, MidiMessage::NoteOff { .. }));
    }

    #[test]
    fn test_short_messages_are_unknown() {
        assert_eq!(MidiMessage::parse(&[]), MidiMessage::Unknown);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), MidiMessage::Unknown);
        assert_eq!(MidiMessage::parse(&[0xF8, 0, 0]), MidiMessage::Unknown);
    }

    #[test]
    fn test_to_tone_event() {
        let msg = MidiMessage::NoteOn {
            channel: 0,
            note: 69, // A4
            velocity: 100,
        };
        match msg.to_tone_event(OMNI) {
            Some(ToneEvent::NoteOn { note, frequency }) => {
                assert_eq!(note, 69);
                assert!((frequency - 440.0).abs() < 0.1);
            }
            other => panic!("Expected NoteOn event, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_filter() {
        let msg = MidiMessage::NoteOff { channel: 2, note: 60 };
        assert_eq!(msg.to_tone_event(2), Some(ToneEvent::note_off(60)));
        assert_eq!(msg.to_tone_event(3), None);
    }

    #[test]
    fn test_all_notes_off_cc() {
        let panic = MidiMessage::parse(&[0xB0, 123, 0]);
        assert_eq!(panic.to_tone_event(OMNI), Some(ToneEvent::AllNotesOff));

        let modwheel = MidiMessage::parse(&[0xB0, 1, 64]);
        assert_eq!(modwheel.to_tone_event(OMNI), None);
    }
}
