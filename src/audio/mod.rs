pub mod engine;
pub mod parameters;
pub mod pingpong;

/// Pack a float sample into signed 16-bit PCM, clamping to full scale
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
