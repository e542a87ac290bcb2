//! Sample playback voice.
//!
//! [`Sample`] is an [`Oscillator`] whose waveform is a recording. When data
//! is loaded its pitch is detected from the spectrum, and the note is tuned
//! so that pressing the detected pitch plays the recording at its original
//! speed:
//!
//! ```text
//! source_tune = log2((1 / root) / source_duration)
//! loop_tune   = log2(len / loop_len)
//! note_hz     = root * 2^(coarse + fine/12 + source_tune + loop_tune)
//! ```
//!
//! With `looping` off the recording plays once per press. At the end of
//! the loop region the voice releases itself and the release tail plays
//! out over the looped region.

use std::{any::Any, path::Path};

use log::{debug, info};

use crate::{
    dsp::{analysis, waveform::Waveform},
    io::wav,
    synth::{RenderCtx, SynthConfig},
    voice::{oscillator::Oscillator, Velocity, Voice, VoiceCore},
    Result,
};

/// Frames kept from a loaded file unless a size is given.
pub const DEFAULT_MAX_SIZE: usize = 4096;

const DEFAULT_ROOT: f32 = 440.0;

#[derive(Debug, Clone)]
pub struct Sample {
    osc: Oscillator,
    looping: bool,
    max_size: usize,
    sample_rate: u32,
    source_tune: f32,
    loop_tune: f32,
}

impl Sample {
    pub fn new(config: &SynthConfig) -> Self {
        let mut osc = Oscillator::with_root(config, DEFAULT_ROOT);
        osc.note_mut().looping = true;

        Self {
            osc,
            looping: true,
            max_size: DEFAULT_MAX_SIZE,
            sample_rate: config.sample_rate(),
            source_tune: 0.0,
            loop_tune: 0.0,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.set_looping(looping);
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(2);
        self
    }

    /// The underlying oscillator, for envelope, filter and LFO settings.
    ///
    /// Change the waveform and loop through [`Sample`] so the tuning
    /// follows.
    pub fn oscillator(&self) -> &Oscillator {
        &self.osc
    }

    pub fn oscillator_mut(&mut self) -> &mut Oscillator {
        &mut self.osc
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.osc.note_mut().looping = looping;
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Load a 16-bit WAV file, normalized and cut to `max_size` frames.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = wav::load(path, self.max_size)?;
        info!(
            "loaded {} ({} frames at {} Hz)",
            path.display(),
            data.samples.len(),
            data.sample_rate
        );
        self.set_waveform_data(analysis::normalize(&data.samples), data.sample_rate);
        Ok(())
    }

    /// Use `samples` recorded at `sample_rate` as the waveform.
    pub fn set_waveform_data(&mut self, mut samples: Vec<i16>, sample_rate: u32) {
        samples.truncate(self.max_size);
        if samples.is_empty() {
            self.clear();
            return;
        }

        self.sample_rate = sample_rate.max(1);
        self.osc.set_waveform(Some(Waveform::from_samples(samples)));
        self.update_loop_tune();
        self.update_source_root();
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.osc.waveform()
    }

    /// Drop the sample data.
    pub fn clear(&mut self) {
        self.osc.set_waveform(None);
        self.loop_tune = 0.0;
        self.update_source_root();
    }

    /// Rate the data was recorded at, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.update_source_root();
    }

    /// Detected pitch of the data, or 440 Hz without data.
    pub fn root(&self) -> f32 {
        self.osc.root()
    }

    pub fn waveform_loop(&self) -> (f32, f32) {
        self.osc.waveform_loop()
    }

    pub fn set_waveform_loop(&mut self, start: f32, end: f32) {
        self.osc.set_waveform_loop(start, end);
        self.update_loop_tune();
        self.update_tune();
    }

    /// Seconds for one pass through the loop region at the current pitch.
    pub fn duration(&self) -> f32 {
        let note = self.osc.note();
        let rate = note.frequency * note.bend.exp2();
        if rate > 0.0 {
            1.0 / rate
        } else {
            0.0
        }
    }

    fn update_source_root(&mut self) {
        let detected = self
            .osc
            .waveform()
            .map(|w| (w.len(), analysis::peak_frequency(w.as_slice(), self.sample_rate)));

        match detected {
            Some((len, Some(root))) if root > 0.0 => {
                let source_duration = len as f32 / self.sample_rate as f32;
                self.source_tune = ((1.0 / root) / source_duration).log2();
                self.osc.set_root(root);
                debug!("detected root {root:.2} Hz, source tune {:.3}", self.source_tune);
            }
            _ => {
                self.source_tune = 0.0;
                self.osc.set_root(DEFAULT_ROOT);
            }
        }
        self.update_tune();
    }

    fn update_loop_tune(&mut self) {
        self.loop_tune = match (self.osc.waveform_loop_indices(), self.osc.waveform()) {
            (Some((start, end)), Some(waveform)) => {
                let loop_len = end - start;
                if loop_len < 2 || loop_len == waveform.len() {
                    0.0
                } else {
                    (waveform.len() as f32 / loop_len as f32).log2()
                }
            }
            _ => 0.0,
        };
    }

    fn update_tune(&mut self) {
        self.osc.set_tune_offset(self.source_tune + self.loop_tune);
    }
}

impl Voice for Sample {
    fn core(&self) -> &VoiceCore {
        self.osc.core()
    }

    fn core_mut(&mut self) -> &mut VoiceCore {
        self.osc.core_mut()
    }

    /// Returns false without sample data.
    fn press(&mut self, note: u8, velocity: Velocity) -> bool {
        if self.osc.waveform().is_none() {
            return false;
        }
        self.osc.press(note, velocity)
    }

    fn release(&mut self) -> bool {
        self.osc.release()
    }

    fn update(&mut self, dt: f32) {
        self.osc.update(dt);
        if !self.looping && self.osc.note().finished() && self.pressed() {
            self.release();
        }
    }

    fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render(out, ctx);
    }

    fn amplitude(&self) -> f32 {
        self.osc.amplitude()
    }

    fn set_amplitude(&mut self, value: f32) {
        self.osc.set_amplitude(value);
    }

    fn set_bend(&mut self, value: f32) {
        self.osc.set_bend(value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const RATE: u32 = 44_100;

    fn config() -> SynthConfig {
        SynthConfig::new(RATE, 1).unwrap()
    }

    fn tone(freq: f32, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| ((TAU * freq * i as f32 / RATE as f32).sin() * 30_000.0) as i16)
            .collect()
    }

    #[test]
    fn press_needs_data() {
        let mut sample = Sample::new(&config());
        assert!(!sample.press(60, Velocity::FULL));
        assert_eq!(sample.root(), 440.0);
    }

    #[test]
    fn data_is_cut_to_max_size() {
        let mut sample = Sample::new(&config()).with_max_size(1000);
        sample.set_waveform_data(tone(441.0, 4096), RATE);
        assert_eq!(sample.waveform().map(Waveform::len), Some(1000));
    }

    #[test]
    fn detected_root_plays_at_original_speed() {
        let mut sample = Sample::new(&config());
        sample.set_waveform_data(tone(441.0, 4096), RATE);

        let root = sample.root();
        assert!((root - 441.0).abs() < RATE as f32 / 1024.0, "root {root}");

        // The note frequency plays the whole table once per source duration
        let source_duration = 4096.0 / RATE as f32;
        let expected = 1.0 / source_duration;
        assert!((sample.oscillator().note().frequency - expected).abs() < 1e-2);
    }

    #[test]
    fn loop_region_raises_note_rate() {
        let mut sample = Sample::new(&config());
        sample.set_waveform_data(tone(441.0, 4096), RATE);
        let full = sample.oscillator().note().frequency;

        sample.set_waveform_loop(0.0, 0.5);
        let half = sample.oscillator().note().frequency;
        assert!((half / full - 2.0).abs() < 1e-3);
    }

    #[test]
    fn sample_rate_change_redetects_root() {
        let mut sample = Sample::new(&config());
        sample.set_waveform_data(tone(441.0, 4096), RATE);
        let before = sample.root();

        // Same data read at half speed sounds an octave down
        sample.set_sample_rate(RATE / 2);
        assert_eq!(sample.sample_rate(), RATE / 2);
        assert!((sample.root() - before / 2.0).abs() < 1e-3, "root {}", sample.root());

        let expected = (RATE / 2) as f32 / 4096.0;
        assert!((sample.oscillator().note().frequency - expected).abs() < 1e-2);
    }

    #[test]
    fn duration_follows_pitch_and_loop() {
        let mut sample = Sample::new(&config());
        sample.set_waveform_data(tone(441.0, 4096), RATE);
        let source_duration = 4096.0 / RATE as f32;
        assert!((sample.duration() - source_duration).abs() < 1e-5);

        sample.set_waveform_loop(0.0, 0.5);
        assert!((sample.duration() - source_duration / 2.0).abs() < 1e-5);

        // An octave above the root plays twice as fast
        sample.set_waveform_loop(0.0, 1.0);
        let root = sample.root();
        let octave_up = 69 + 12;
        assert!(sample.press(octave_up, Velocity::FULL));
        sample.update(0.01);
        let expected = source_duration * root / crate::voice::midi_to_hz(octave_up);
        assert!(
            (sample.duration() - expected).abs() < 1e-4,
            "duration {} expected {expected}",
            sample.duration()
        );
    }

    #[test]
    fn clear_resets_root() {
        let mut sample = Sample::new(&config());
        sample.set_waveform_data(tone(1_000.0, 2048), RATE);
        sample.clear();
        assert!(sample.waveform().is_none());
        assert_eq!(sample.root(), 440.0);
    }

    #[test]
    fn one_shot_releases_itself() {
        let mut sample = Sample::new(&config()).with_looping(false);
        sample.set_waveform_data(tone(441.0, 256), RATE);
        let ctx = config().render_ctx();

        let note = 69;
        assert!(sample.press(note, Velocity::FULL));
        sample.update(0.001);

        let duration = sample.duration();
        let frames = (duration * RATE as f32) as usize + 64;
        let mut out = vec![0.0; frames];
        sample.render(&mut out, &ctx);
        sample.update(0.001);

        assert!(!sample.pressed());
    }
}
