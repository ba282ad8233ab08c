use super::engine::ToneEngine;

/// One half of a ping-pong buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Self {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }
}

/// Double buffer refilled one half at a time, the way a circular DMA transfer is fed
///
/// The consumer reads the buffer front to back and loops. When it finishes the
/// first half ("half transfer") that half is re-rendered while the second half
/// plays, and vice versa on "transfer complete". Storage is allocated once here
/// and never resized.
pub struct PingPongBuffer {
    samples: Box<[f32]>,
    half_len: usize,
    /// Half the consumer reads next
    playing: Half,
}

impl PingPongBuffer {
    /// Create a buffer of two `half_len` halves, both pre-rendered, ready to start playback
    pub fn primed(half_len: usize, engine: &mut ToneEngine) -> Self {
        let mut buffer = Self {
            samples: vec![0.0; half_len * 2].into_boxed_slice(),
            half_len,
            playing: Half::First,
        };
        buffer.refill(Half::First, engine);
        buffer.refill(Half::Second, engine);
        buffer
    }

    /// Render a fresh block of mono samples into `half`
    pub fn refill(&mut self, half: Half, engine: &mut ToneEngine) {
        let start = half as usize * self.half_len;
        engine.render_mono(&mut self.samples[start..start + self.half_len]);
    }

    /// The consumer finished the first half: refill it while the second plays
    pub fn on_half_complete(&mut self, engine: &mut ToneEngine) {
        self.refill(Half::First, engine);
        self.playing = Half::Second;
    }

    /// The consumer finished the second half and wrapped: refill it while the first plays
    pub fn on_transfer_complete(&mut self, engine: &mut ToneEngine) {
        self.refill(Half::Second, engine);
        self.playing = Half::First;
    }

    pub fn half(&self, half: Half) -> &[f32] {
        let start = half as usize * self.half_len;
        &self.samples[start..start + self.half_len]
    }

    pub fn half_len(&self) -> usize {
        self.half_len
    }

    /// The half the consumer is reading now
    pub fn playing(&self) -> Half {
        self.playing
    }

    /// Hand the playing half to `consume`, then refill it, as the matching interrupt would
    pub fn advance<F>(&mut self, engine: &mut ToneEngine, mut consume: F)
    where
        F: FnMut(&[f32]),
    {
        let half = self.playing;
        consume(self.half(half));
        match half {
            Half::First => self.on_half_complete(engine),
            Half::Second => self.on_transfer_complete(engine),
        }
    }
}
