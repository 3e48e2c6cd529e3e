//! Synthesized one-shot sound effects, rendered offline and played on
//! detached rodio sinks.

use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

const SAMPLE_RATE: u32 = 44_100;

pub struct Audio {
    stream: OutputStream,
}

impl Audio {
    /// Open the default output device. `None` means a mute game, not an error.
    pub fn open() -> Option<Self> {
        let stream = OutputStreamBuilder::open_default_stream().ok()?;
        Some(Self { stream })
    }

    fn play(&self, mut unit: impl AudioUnit, secs: f32) {
        unit.set_sample_rate(SAMPLE_RATE as f64);
        let n = (secs * SAMPLE_RATE as f32) as usize;
        let samples: Vec<f32> = (0..n).map(|_| unit.get_mono()).collect();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
        sink.detach(); // Play in background
    }

    /// Short rising chirp on each flap.
    pub fn flap(&self) {
        let freq = lfo(|t: f32| lerp(320.0, 620.0, (t / 0.08).min(1.0)));
        let gain = lfo(|t: f32| lerp(0.12, 0.0, (t / 0.1).min(1.0)));
        self.play((freq >> sine::<f32>()) * gain, 0.1);
    }

    /// Ding when a pipe is passed.
    pub fn score(&self) {
        let gain = lfo(|t: f32| lerp(0.12, 0.0, (t / 0.15).min(1.0)));
        self.play((dc(880.0) >> triangle()) * gain, 0.15);
    }

    /// Two-tone ding when the level goes up.
    pub fn level_up(&self) {
        let freq = lfo(|t: f32| if t < 0.1 { 660.0 } else { 880.0 });
        let gain = lfo(|t: f32| lerp(0.14, 0.0, (t / 0.22).min(1.0)));
        self.play((freq >> triangle()) * gain, 0.22);
    }

    /// Falling saw sweep on game over (400Hz to 80Hz over 0.4s).
    pub fn death(&self) {
        let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
        let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
        self.play((freq >> saw()) * gain, 0.5);
    }
}
