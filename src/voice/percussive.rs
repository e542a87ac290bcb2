//! Single-shot "analog" drum voices.
//!
//! A [`Drum`] plays a few fixed-pitch notes at once, each with an envelope
//! that jumps to full level and decays to silence. All notes share one pitch
//! LFO that runs a single falling ramp per hit, which gives the drums their
//! pitch drop. The MIDI note of a press is ignored.
//!
//! [`Cymbal`] and [`Tom`] wrap a drum and map a normalized decay (and, for
//! toms, pitch) control onto preset ranges.

use std::any::Any;

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        filter::FilterType,
        lfo::Lfo,
        waveform::{mix, Shape, Waveform, WaveformBuilder},
    },
    synth::{Note, RenderCtx, SynthConfig},
    voice::{Velocity, Voice, VoiceCore},
};

/// Bend ramp shared by every drum note: +0.63 falling to +0.03 octaves.
fn bend_lfo() -> Lfo {
    Lfo::new()
        .with_waveform(Waveform::from_samples(vec![i16::MAX, i16::MIN]))
        .with_rate(20.0)
        .with_scale(0.3)
        .with_offset(0.33)
        .once()
}

#[derive(Debug, Clone)]
pub struct Drum {
    core: VoiceCore,
    notes: Vec<Note>,
    times: Vec<f32>,
    attack_level: f32,
    amplitude: f32,
    lfo: Lfo,
}

impl Drum {
    /// A drum of `count` square-wave notes at 440 Hz decaying over 1 s,
    /// low-passed at 20 kHz.
    pub fn new(config: &SynthConfig, count: usize) -> Self {
        let mut drum = Self {
            core: VoiceCore::new(config),
            notes: (0..count.max(1)).map(|_| Note::new(440.0)).collect(),
            times: vec![1.0],
            attack_level: 1.0,
            amplitude: 1.0,
            lfo: bend_lfo(),
        };
        drum.core.set_filter_frequency(20_000.0);
        drum.update_envelope();
        drum
    }

    pub fn kick(config: &SynthConfig) -> Self {
        let sine = Waveform::sine();
        let offset_sine = WaveformBuilder::new(Shape::Sine).phase(0.5).build();

        let mut drum = Self::new(config, 3);
        drum.set_filter_frequency(2_000.0);
        drum.set_frequencies(&[53.0, 72.0, 41.0]);
        drum.set_times(&[0.075, 0.055, 0.095]);
        drum.set_waveforms(&[offset_sine.clone(), sine, offset_sine]);
        drum
    }

    pub fn snare(config: &SynthConfig) -> Self {
        let noise = Waveform::noise();
        let sine_noise = mix(&[(Waveform::sine(), 1.0), (noise.clone(), 0.5)]);
        let offset_sine_noise = mix(&[
            (WaveformBuilder::new(Shape::Sine).phase(0.5).build(), 1.0),
            (noise, 0.5),
        ]);

        let mut drum = Self::new(config, 3);
        drum.set_filter_frequency(9_500.0);
        drum.set_frequencies(&[90.0, 135.0, 165.0]);
        drum.set_times(&[0.115, 0.095, 0.115]);
        drum.set_waveforms(&[sine_noise, offset_sine_noise.clone(), offset_sine_noise]);
        drum
    }

    /// Start a hit. The drum always restarts, even if it is still ringing.
    pub fn trigger(&mut self, velocity: Velocity) {
        self.core.release();
        self.core.press(1, velocity);
        self.update_envelope();

        for note in &mut self.notes {
            note.release();
            note.press();
        }
        self.lfo.retrigger();
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn frequencies(&self) -> Vec<f32> {
        self.notes.iter().map(|n| n.frequency).collect()
    }

    /// Note frequencies in Hz, repeated across the notes. Empty is ignored.
    pub fn set_frequencies(&mut self, frequencies: &[f32]) {
        if frequencies.is_empty() {
            return;
        }
        for (note, &frequency) in self.notes.iter_mut().zip(frequencies.iter().cycle()) {
            note.frequency = frequency;
        }
    }

    /// Decay times in seconds, repeated across the notes.
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn set_times(&mut self, times: &[f32]) {
        if times.is_empty() {
            return;
        }
        self.times = times.to_vec();
        self.update_envelope();
    }

    pub fn waveforms(&self) -> Vec<Option<Waveform>> {
        self.notes.iter().map(|n| n.waveform.clone()).collect()
    }

    /// Note waveforms, repeated across the notes. Empty is ignored.
    pub fn set_waveforms(&mut self, waveforms: &[Waveform]) {
        if waveforms.is_empty() {
            return;
        }
        for (note, waveform) in self.notes.iter_mut().zip(waveforms.iter().cycle()) {
            note.waveform = Some(waveform.clone());
        }
    }

    pub fn attack_level(&self) -> f32 {
        self.attack_level
    }

    pub fn set_attack_level(&mut self, value: f32) {
        self.attack_level = value.clamp(0.0, 1.0);
        self.update_envelope();
    }

    fn update_envelope(&mut self) {
        let level = self.core.velocity_mod() * self.attack_level;
        let times = &self.times;
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.set_envelope(EnvelopeParams {
                attack_time: 0.0,
                decay_time: times[i % times.len()],
                release_time: 0.0,
                attack_level: level,
                sustain_level: 0.0,
            });
        }
    }
}

impl Voice for Drum {
    fn core(&self) -> &VoiceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VoiceCore {
        &mut self.core
    }

    /// Triggers the drum. The note number is ignored.
    fn press(&mut self, _note: u8, velocity: Velocity) -> bool {
        self.trigger(velocity);
        true
    }

    /// Drums ring out on their own; this always returns false.
    fn release(&mut self) -> bool {
        false
    }

    fn update(&mut self, dt: f32) {
        let bend = self.lfo.tick(dt);
        for note in &mut self.notes {
            note.bend = bend;
        }

        let frequency = self.core.filter_frequency();
        if let Some(filter) = self.core.resolve_filter(frequency) {
            for note in &mut self.notes {
                note.set_filter(filter);
            }
        }
    }

    fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for note in &mut self.notes {
            note.render_add(out, ctx);
        }
    }

    fn amplitude(&self) -> f32 {
        self.amplitude
    }

    fn set_amplitude(&mut self, value: f32) {
        self.amplitude = value.clamp(0.0, 1.0);
        for note in &mut self.notes {
            note.amplitude = self.amplitude;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// Cymbal and Tom are drums with a couple of extra controls
macro_rules! delegate_voice {
    ($ty:ty) => {
        impl Voice for $ty {
            fn core(&self) -> &VoiceCore {
                self.drum.core()
            }

            fn core_mut(&mut self) -> &mut VoiceCore {
                self.drum.core_mut()
            }

            fn press(&mut self, note: u8, velocity: Velocity) -> bool {
                self.drum.press(note, velocity)
            }

            fn release(&mut self) -> bool {
                self.drum.release()
            }

            fn update(&mut self, dt: f32) {
                self.drum.update(dt);
            }

            fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
                self.drum.render(out, ctx);
            }

            fn amplitude(&self) -> f32 {
                self.drum.amplitude()
            }

            fn set_amplitude(&mut self, value: f32) {
                self.drum.set_amplitude(value);
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

/// Noise through a high-pass filter, with a decay control.
#[derive(Debug, Clone)]
pub struct Cymbal {
    drum: Drum,
    min_time: f32,
    max_time: f32,
    decay: f32,
}

impl Cymbal {
    /// `min_time` and `max_time` bound the decay in seconds; `frequency` is
    /// the high-pass cutoff.
    pub fn new(config: &SynthConfig, min_time: f32, max_time: f32, frequency: f32) -> Self {
        let mut drum = Drum::new(config, 3);
        drum.set_filter_type(FilterType::HighPass);
        drum.set_filter_frequency(frequency);
        drum.set_frequencies(&[90.0, 135.0, 165.0]);
        drum.set_waveforms(&[Waveform::noise()]);

        let min_time = min_time.max(0.0);
        let mut cymbal = Self {
            drum,
            min_time,
            max_time: max_time.max(min_time),
            decay: 0.5,
        };
        cymbal.set_decay(0.5);
        cymbal
    }

    pub fn closed_hat(config: &SynthConfig) -> Self {
        Self::new(config, 0.025, 0.2, 9_500.0)
    }

    pub fn open_hat(config: &SynthConfig) -> Self {
        Self::new(config, 0.25, 1.0, 9_500.0)
    }

    pub fn ride(config: &SynthConfig) -> Self {
        Self::new(config, 0.5, 2.0, 18_000.0)
    }

    pub fn drum(&self) -> &Drum {
        &self.drum
    }

    pub fn drum_mut(&mut self) -> &mut Drum {
        &mut self.drum
    }

    /// Decay between the preset's shortest (0.0) and longest (1.0) time.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn set_decay(&mut self, value: f32) {
        self.decay = value.clamp(0.0, 1.0);
        let time = self.decay * (self.max_time - self.min_time) + self.min_time;
        self.drum.set_times(&[time, (time - 0.02).max(0.0), time]);
    }
}

delegate_voice!(Cymbal);

/// Triangle plus a little noise, with decay and pitch controls.
#[derive(Debug, Clone)]
pub struct Tom {
    drum: Drum,
    min_time: f32,
    max_time: f32,
    min_frequency: f32,
    max_frequency: f32,
    decay: f32,
    frequency: f32,
}

impl Tom {
    pub fn new(
        config: &SynthConfig,
        min_time: f32,
        max_time: f32,
        min_frequency: f32,
        max_frequency: f32,
    ) -> Self {
        let mut drum = Drum::new(config, 2);
        drum.set_filter_frequency(4_000.0);
        drum.set_waveforms(&[
            Waveform::triangle(),
            WaveformBuilder::new(Shape::Noise).amplitude(0.25).build(),
        ]);

        let min_time = min_time.max(0.0);
        let min_frequency = min_frequency.max(0.0);
        let mut tom = Self {
            drum,
            min_time,
            max_time: max_time.max(min_time),
            min_frequency,
            max_frequency: max_frequency.max(min_frequency),
            decay: 0.5,
            frequency: 0.5,
        };
        tom.set_decay(0.5);
        tom.set_frequency(0.5);
        tom
    }

    pub fn high(config: &SynthConfig) -> Self {
        Self::new(config, 0.1, 0.45, 261.63, 293.66)
    }

    pub fn mid(config: &SynthConfig) -> Self {
        Self::new(config, 0.1, 0.45, 185.00, 207.65)
    }

    pub fn floor(config: &SynthConfig) -> Self {
        Self::new(config, 0.1, 0.65, 116.54, 146.83)
    }

    pub fn drum(&self) -> &Drum {
        &self.drum
    }

    pub fn drum_mut(&mut self) -> &mut Drum {
        &mut self.drum
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn set_decay(&mut self, value: f32) {
        self.decay = value.clamp(0.0, 1.0);
        let time = self.decay * (self.max_time - self.min_time) + self.min_time;
        self.drum.set_times(&[time, 0.025]);
    }

    /// Pitch between the preset's lowest (0.0) and highest (1.0) frequency.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, value: f32) {
        self.frequency = value.clamp(0.0, 1.0);
        let hz = self.frequency * (self.max_frequency - self.min_frequency) + self.min_frequency;
        self.drum.set_frequencies(&[hz]);
    }
}

delegate_voice!(Tom);
