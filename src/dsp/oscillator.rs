use super::wavetable::{WaveTable, TABLE_LEN};
use crate::error::{validate_frequency, OscillatorError};
use crate::types::waveform::Waveform;

const TABLE_LEN_F32: f32 = TABLE_LEN as f32;

/// Table lookup oscillator with a fractional phase accumulator
///
/// One period of the waveform is precomputed into a [`WaveTable`] at construction.
/// Each [`render`](Self::render) call advances the accumulator by
/// `TABLE_LEN * f0 / sample_rate` entries and returns the entry it lands on,
/// truncating the fractional part. Rendering never allocates, locks or blocks.
///
/// Inputs are trusted: [`new`](Self::new) and [`set_f0`](Self::set_f0) accept any
/// frequency. Use [`try_new`](Self::try_new) to reject frequencies outside
/// `(0, sample_rate / 2)` up front.
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// One period of the waveform
    table: WaveTable,
    /// Current read position into the table (0.0 to TABLE_LEN)
    idx: f32,
    /// Table entries advanced per sample
    idx_inc: f32,
    /// Most recently requested fundamental frequency in Hz
    f0: f32,
    /// Sample rate in Hz
    fs: f32,
}

impl Oscillator {
    /// Create a sine oscillator at `f0` Hz for a stream running at `sample_rate` Hz
    pub fn new(sample_rate: f32, f0: f32) -> Self {
        Self::with_waveform(sample_rate, f0, Waveform::Sine)
    }

    /// Create an oscillator reading a table built for `waveform`
    pub fn with_waveform(sample_rate: f32, f0: f32, waveform: Waveform) -> Self {
        let mut osc = Self {
            table: WaveTable::new(waveform),
            idx: 0.0,
            idx_inc: 0.0,
            f0,
            fs: sample_rate,
        };
        osc.set_f0(f0);
        osc
    }

    /// Create a sine oscillator, rejecting a non-positive sample rate or an `f0`
    /// outside `(0, sample_rate / 2)`
    pub fn try_new(sample_rate: f32, f0: f32) -> Result<Self, OscillatorError> {
        validate_frequency(sample_rate, f0)?;
        Ok(Self::new(sample_rate, f0))
    }

    /// Set the fundamental frequency in Hz
    ///
    /// Only the increment changes; the accumulator keeps its position, so the
    /// waveform continues from where it was.
    pub fn set_f0(&mut self, f0_hz: f32) {
        self.f0 = f0_hz;
        self.idx_inc = TABLE_LEN_F32 * f0_hz / self.fs;
    }

    /// Advance the phase by one sample and return the table entry it lands on
    #[inline]
    pub fn render(&mut self) -> f32 {
        self.idx += self.idx_inc;
        if self.idx >= TABLE_LEN_F32 {
            self.idx -= TABLE_LEN_F32;
            // Only reachable when the increment is at least a whole table
            if self.idx >= TABLE_LEN_F32 {
                self.idx = wrap_phase(self.idx);
            }
        } else if self.idx < 0.0 || self.idx.is_nan() {
            self.idx = wrap_phase(self.idx);
        }
        self.table.lookup(self.idx as usize)
    }

    /// Render one sample into every slot of `buffer`
    pub fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.render();
        }
    }

    /// Move the accumulator back to the start of the table
    pub fn reset(&mut self) {
        self.idx = 0.0;
    }

    pub fn f0(&self) -> f32 {
        self.f0
    }

    pub fn sample_rate(&self) -> f32 {
        self.fs
    }

    /// Current accumulator position, in table entries
    pub fn phase(&self) -> f32 {
        self.idx
    }

    /// Table entries advanced per rendered sample
    pub fn phase_increment(&self) -> f32 {
        self.idx_inc
    }

    pub fn waveform(&self) -> Waveform {
        self.table.waveform()
    }

    pub fn table(&self) -> &WaveTable {
        &self.table
    }
}

/// Fold any accumulator value back into `[0, TABLE_LEN)`; non-finite values restart at 0
#[cold]
fn wrap_phase(idx: f32) -> f32 {
    if !idx.is_finite() {
        return 0.0;
    }
    let wrapped = idx.rem_euclid(TABLE_LEN_F32);
    // rem_euclid of a tiny negative value can round up to TABLE_LEN
    if wrapped >= TABLE_LEN_F32 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::TAU;

    const FS: f32 = 48_000.0;

    fn correlation(a: &[f32], b: &[f32]) -> f64 {
        let n = a.len() as f64;
        let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n;
        let mean_b = b.iter().map(|&x| x as f64).sum::<f64>() / n;
        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (&x, &y) in a.iter().zip(b) {
            let dx = x as f64 - mean_a;
            let dy = y as f64 - mean_b;
            cov += dx * dy;
            var_a += dx * dx;
            var_b += dy * dy;
        }
        cov / (var_a.sqrt() * var_b.sqrt())
    }

    fn render_period(f0: f32) -> (Vec<f32>, Vec<f32>) {
        let mut osc = Oscillator::new(FS, f0);
        let len = (FS / f0).round() as usize;
        let rendered: Vec<f32> = (0..len).map(|_| osc.render()).collect();
        // The first sample is read after one advance
        let reference: Vec<f32> = (1..=len)
            .map(|n| (TAU * f0 as f64 * n as f64 / FS as f64).sin() as f32)
            .collect();
        (rendered, reference)
    }

    #[test]
    fn test_oscillator_creates() {
        let osc = Oscillator::new(FS, 440.0);
        assert_eq!(osc.f0(), 440.0);
        assert_eq!(osc.sample_rate(), FS);
        assert_eq!(osc.phase(), 0.0);
        assert_eq!(osc.waveform(), Waveform::Sine);
    }

    #[test]
    fn test_frequency_update() {
        let mut osc = Oscillator::new(FS, 440.0);
        osc.set_f0(880.0);
        assert_eq!(osc.f0(), 880.0);
        assert_relative_eq!(osc.phase_increment(), 2048.0 * 880.0 / 48_000.0);
    }

    #[test]
    fn test_a440_first_sample() {
        let mut osc = Oscillator::new(FS, 440.0);
        assert_relative_eq!(osc.phase_increment(), 18.773_333, epsilon = 1e-4);

        // 0 + 18.77 truncates to entry 18
        let first = osc.render();
        assert_eq!(first, osc.table().lookup(18));
        assert_abs_diff_eq!(first, 0.0582, epsilon = 0.005);
        assert_relative_eq!(osc.phase(), 18.773_333, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_frequency_holds_first_entry() {
        let mut osc = Oscillator::new(FS, 0.0);
        assert_eq!(osc.phase_increment(), 0.0);
        for _ in 0..1000 {
            assert_eq!(osc.render(), 0.0);
        }
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn test_nyquist_alternates_two_points() {
        let mut osc = Oscillator::new(FS, 24_000.0);
        assert_eq!(osc.phase_increment(), 1024.0);

        let half = osc.table().lookup(1024);
        let zero = osc.table().lookup(0);
        for _ in 0..16 {
            assert_eq!(osc.render(), half);
            assert_eq!(osc.phase(), 1024.0);
            assert_eq!(osc.render(), zero);
            assert_eq!(osc.phase(), 0.0);
        }
    }

    #[test]
    fn test_output_and_phase_stay_in_range() {
        for f0 in [1.0, 20.0, 440.0, 1234.5, 5_000.0, 12_000.0, 23_999.0] {
            let mut osc = Oscillator::new(FS, f0);
            for _ in 0..20_000 {
                let sample = osc.render();
                assert!((-1.0..=1.0).contains(&sample), "{sample} out of range at {f0} Hz");
                let phase = osc.phase();
                assert!((0.0..TABLE_LEN_F32).contains(&phase), "phase {phase} at {f0} Hz");
            }
        }
    }

    #[test]
    fn test_set_f0_keeps_phase() {
        let mut osc = Oscillator::new(FS, 440.0);
        for _ in 0..37 {
            osc.render();
        }
        let before = osc.phase();

        osc.set_f0(880.0);
        assert_eq!(osc.phase(), before);

        let mut expected = before + osc.phase_increment();
        if expected >= TABLE_LEN_F32 {
            expected -= TABLE_LEN_F32;
        }
        assert_eq!(osc.render(), osc.table().lookup(expected as usize));
        assert_ne!(osc.phase(), 0.0);
    }

    #[test]
    fn test_one_period_correlates_with_sine() {
        for f0 in [375.0, 440.0, 1_000.0, 6_000.0] {
            let (rendered, reference) = render_period(f0);
            let r = correlation(&rendered, &reference);
            assert!(r >= 0.99, "correlation {r} at {f0} Hz");
        }
    }

    #[test]
    fn test_period_returns_to_start() {
        // 375 Hz at 48 kHz is exactly 128 samples per period
        let mut osc = Oscillator::new(FS, 375.0);
        let first: Vec<f32> = (0..128).map(|_| osc.render()).collect();
        let second: Vec<f32> = (0..128).map(|_| osc.render()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_increment_beyond_table_stays_in_bounds() {
        // 2.5 * fs advances 5120 entries per sample
        let mut osc = Oscillator::new(FS, FS * 2.5);
        for _ in 0..100 {
            let sample = osc.render();
            assert!((-1.0..=1.0).contains(&sample));
            assert!((0.0..TABLE_LEN_F32).contains(&osc.phase()));
        }
        osc.reset();
        osc.render();
        assert_eq!(osc.phase(), 1024.0);
    }

    #[test]
    fn test_negative_frequency_runs_backwards() {
        let mut osc = Oscillator::new(FS, -440.0);
        osc.render();
        assert_relative_eq!(osc.phase(), 2048.0 - 18.773_333, epsilon = 1e-3);
        for _ in 0..10_000 {
            osc.render();
            assert!((0.0..TABLE_LEN_F32).contains(&osc.phase()));
        }
    }

    #[test]
    fn test_non_finite_frequency_recovers() {
        let mut osc = Oscillator::new(FS, f32::NAN);
        assert_eq!(osc.render(), 0.0);
        assert_eq!(osc.phase(), 0.0);

        osc.set_f0(f32::INFINITY);
        assert_eq!(osc.render(), 0.0);
        assert_eq!(osc.phase(), 0.0);

        osc.set_f0(440.0);
        assert_eq!(osc.render(), osc.table().lookup(18));
    }

    #[test]
    fn test_fill_matches_render() {
        let mut a = Oscillator::new(FS, 440.0);
        let mut b = Oscillator::new(FS, 440.0);
        let mut block = [0.0f32; 300];
        a.fill(&mut block);
        for &sample in block.iter() {
            assert_eq!(sample, b.render());
        }
        assert_eq!(a.phase(), b.phase());
    }

    #[test]
    fn test_reset_restarts_phase() {
        let mut osc = Oscillator::new(FS, 440.0);
        let first = osc.render();
        for _ in 0..50 {
            osc.render();
        }
        osc.reset();
        assert_eq!(osc.phase(), 0.0);
        assert_eq!(osc.render(), first);
    }

    #[test]
    fn test_try_new_validates() {
        assert!(Oscillator::try_new(FS, 440.0).is_ok());
        assert!(matches!(
            Oscillator::try_new(FS, 24_000.0),
            Err(OscillatorError::FrequencyOutOfRange { .. })
        ));
        assert!(matches!(
            Oscillator::try_new(0.0, 440.0),
            Err(OscillatorError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_square_table_oscillator() {
        let mut osc = Oscillator::with_waveform(FS, 375.0, Waveform::Square);
        let block: Vec<f32> = (0..128).map(|_| osc.render()).collect();
        assert!(block.iter().all(|&s| s == 1.0 || s == -1.0));
        assert_eq!(block.iter().filter(|&&s| s == 1.0).count(), 64);
    }
}
