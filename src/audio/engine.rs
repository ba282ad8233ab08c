use crossbeam_channel::Receiver;
use std::sync::{atomic::Ordering, Arc};

use super::parameters::ToneParameters;
use crate::dsp::oscillator::Oscillator;
use crate::types::events::ToneEvent;
use crate::types::waveform::Waveform;

/// Single-voice tone engine
/// Runs in real-time audio thread - must be lock-free and allocation-free
pub struct ToneEngine {
    oscillator: Oscillator,
    parameters: Arc<ToneParameters>,
    event_rx: Receiver<ToneEvent>,
    gate_open: bool,
    current_note: Option<u8>,
}

impl ToneEngine {
    /// Create an engine whose oscillator starts at the parameters' frequency
    /// The gate starts open, so the tone sounds immediately
    pub fn new(
        sample_rate: f32,
        waveform: Waveform,
        parameters: Arc<ToneParameters>,
        event_rx: Receiver<ToneEvent>,
    ) -> Self {
        let f0 = parameters.frequency.load(Ordering::Relaxed);
        Self {
            oscillator: Oscillator::with_waveform(sample_rate, f0, waveform),
            parameters,
            event_rx,
            gate_open: true,
            current_note: None,
        }
    }

    /// Keep the output silent until the first note on
    pub fn gated(mut self) -> Self {
        self.gate_open = false;
        self
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    /// Fill an interleaved buffer, copying the tone to every channel
    /// This runs in real-time audio thread - must be fast and lock-free
    pub fn process(&mut self, output: &mut [f32], num_channels: usize) {
        self.handle_events();
        let gain = self.sync_parameters();

        // The oscillator keeps running while the gate is closed
        let level = if self.gate_open { gain } else { 0.0 };
        for frame in output.chunks_mut(num_channels.max(1)) {
            let sample = self.oscillator.render() * level;
            frame.fill(sample);
        }
    }

    /// Fill a single-channel buffer
    pub fn render_mono(&mut self, output: &mut [f32]) {
        self.process(output, 1);
    }

    /// Drain pending control events (non-blocking)
    fn handle_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                ToneEvent::NoteOn { note, frequency } => {
                    // Keep the shared target in step so the next sync doesn't undo the retune
                    self.parameters.set_frequency(frequency);
                    self.oscillator.set_f0(frequency);
                    self.gate_open = true;
                    self.current_note = Some(note);
                }
                ToneEvent::NoteOff { note } => {
                    if self.current_note == Some(note) {
                        self.gate_open = false;
                        self.current_note = None;
                    }
                }
                ToneEvent::AllNotesOff => {
                    self.gate_open = false;
                    self.current_note = None;
                }
                ToneEvent::ResetPhase => self.oscillator.reset(),
            }
        }
    }

    /// Apply the shared frequency if it changed and return the current gain
    fn sync_parameters(&mut self) -> f32 {
        let frequency = self.parameters.frequency.load(Ordering::Relaxed);
        if frequency.to_bits() != self.oscillator.f0().to_bits() {
            self.oscillator.set_f0(frequency);
        }
        self.parameters.gain.load(Ordering::Relaxed)
    }
}
