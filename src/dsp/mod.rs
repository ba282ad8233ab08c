pub mod oscillator;
pub mod wavetable;
