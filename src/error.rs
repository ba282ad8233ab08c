use thiserror::Error;

/// Reasons a checked oscillator construction can fail
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OscillatorError {
    #[error("sample rate must be a positive finite number of Hz, got {0}")]
    InvalidSampleRate(f32),

    #[error("frequency {f0} Hz is outside (0, {nyquist}) Hz")]
    FrequencyOutOfRange { f0: f32, nyquist: f32 },
}

/// Check that `f0` lies strictly between 0 and the Nyquist frequency of `sample_rate`
pub fn validate_frequency(sample_rate: f32, f0: f32) -> Result<(), OscillatorError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(OscillatorError::InvalidSampleRate(sample_rate));
    }

    let nyquist = sample_rate / 2.0;
    if !(f0 > 0.0 && f0 < nyquist) {
        return Err(OscillatorError::FrequencyOutOfRange { f0, nyquist });
    }

    Ok(())
}
