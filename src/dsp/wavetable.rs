use crate::types::waveform::Waveform;

/// Number of entries in one period of a wave table
pub const TABLE_LEN: usize = 2048;

/// Index mask; valid because TABLE_LEN is a power of two
pub const TABLE_MASK: usize = TABLE_LEN - 1;

const _: () = assert!(TABLE_LEN.is_power_of_two());

/// One period of a waveform, sampled at TABLE_LEN evenly spaced phases
/// Stored inline so an oscillator owns its table without heap allocation
#[derive(Clone)]
pub struct WaveTable {
    samples: [f32; TABLE_LEN],
    waveform: Waveform,
}

impl WaveTable {
    /// Build the table for `waveform`: entry i holds the waveform at phase i / TABLE_LEN
    pub fn new(waveform: Waveform) -> Self {
        let mut samples = [0.0f32; TABLE_LEN];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = waveform.evaluate(i as f64 / TABLE_LEN as f64);
        }
        Self { samples, waveform }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    /// Read the entry at `index`, wrapping any index into the table
    #[inline]
    pub fn lookup(&self, index: usize) -> f32 {
        self.samples[index & TABLE_MASK]
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl std::fmt::Debug for WaveTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveTable")
            .field("waveform", &self.waveform)
            .field("len", &TABLE_LEN)
            .finish()
    }
}
