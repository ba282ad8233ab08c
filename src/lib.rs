//! Table lookup sine oscillator with a small real-time host around it.
//!
//! [`dsp::oscillator::Oscillator`] is the core: a 2048-entry wave table read through a
//! fractional phase accumulator, one [`render`](dsp::oscillator::Oscillator::render) per
//! output sample. The `audio`, `midi` and `config` modules drive it from a device
//! callback, a ping-pong buffer, MIDI input and a YAML file.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod midi;
pub mod types;

pub use dsp::oscillator::Oscillator;
pub use dsp::wavetable::{WaveTable, TABLE_LEN};
pub use error::OscillatorError;
pub use types::waveform::Waveform;
