use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe tone parameters using atomic operations
/// Control threads store, the audio thread loads once per block without blocking
pub struct ToneParameters {
    /// Target oscillator frequency in Hz
    pub frequency: AtomicF32,
    /// Output gain (0.0 to 1.0)
    pub gain: AtomicF32,
}

impl ToneParameters {
    pub fn new(frequency: f32, gain: f32) -> Self {
        Self {
            frequency: AtomicF32::new(frequency),
            gain: AtomicF32::new(gain),
        }
    }

    /// Request a new frequency; picked up at the start of the next block
    pub fn set_frequency(&self, frequency: f32) {
        self.frequency.store(frequency, Ordering::Relaxed);
    }

    pub fn set_gain(&self, gain: f32) {
        self.gain.store(gain.clamp(0.0, 1.0), Ordering::Relaxed);
    }
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self::new(440.0, 0.5) // A4 at half scale
    }
}

/// Atomic f32 wrapper for lock-free parameter updates
/// The whole value moves as one u32, so a reader never sees a torn float
pub struct AtomicF32 {
    storage: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            storage: AtomicU32::new(value.to_bits()),
        }
    }

    pub fn load(&self, ordering: Ordering) -> f32 {
        f32::from_bits(self.storage.load(ordering))
    }

    pub fn store(&self, value: f32, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering);
    }
}
