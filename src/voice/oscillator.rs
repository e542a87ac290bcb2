use std::any::Any;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::EnvelopeParams,
        filter::{FilterType, MIN_Q},
        lerp::{ArEnvelope, Lerp, MIN_RATE},
        lfo::Lfo,
        waveform::{Shape, Waveform, WaveformBuilder},
    },
    synth::{Note, RenderCtx, SynthConfig},
    voice::{midi_to_hz, Velocity, Voice, VoiceCore, HIGHPASS_MIN_FREQUENCY},
};

/*
Oscillator Voice
================

A single wavetable note with everything a monophonic synth patch needs:

    amplitude   ADSR envelope (scaled by velocity) * tremolo LFO
    pitch       root * 2^(coarse + fine/12), bent by glide + vibrato + pitch bend
    panning     pan offset + pan LFO
    filter      cutoff + filter AR envelope + filter LFO

Pitch is handled entirely in octaves. The note keeps the root frequency and
the voice writes a bend every control block:

    bend = glide lerp  (log2(note_hz / root), moved over `glide` seconds)
         + vibrato LFO (depth in octaves)
         + bend lerp   (bend * bend_range)

so a glide is a straight line in pitch, not in Hz.

The filter cutoff seen by the note is never below 50 Hz:

    cutoff = max(filter_frequency + filter_envelope + filter_lfo, 50)
*/

/// Plain parameter set for an [`Oscillator`], e.g. for saving a patch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorPatch {
    /// `None` plays the built-in square wave.
    pub waveform: Option<Shape>,
    pub waveform_loop: (f32, f32),
    pub coarse_tune: f32,
    pub fine_tune: f32,
    pub glide: f32,
    pub bend_range: f32,
    pub vibrato_rate: f32,
    pub vibrato_depth: f32,
    pub amplitude: f32,
    pub tremolo_rate: f32,
    pub tremolo_depth: f32,
    pub pan: f32,
    pub pan_rate: f32,
    pub pan_depth: f32,
    pub envelope: EnvelopeParams,
    pub velocity_amount: f32,
    pub filter_type: FilterType,
    pub filter_frequency: f32,
    pub filter_resonance: f32,
    pub filter_attack_time: f32,
    pub filter_amount: f32,
    pub filter_release_time: f32,
    pub filter_rate: f32,
    pub filter_depth: f32,
}

impl Default for OscillatorPatch {
    fn default() -> Self {
        Self::for_config(&SynthConfig::default())
    }
}

impl OscillatorPatch {
    /// The settings of a fresh [`Oscillator`] built from `config`. The
    /// filter starts fully open at the config's nyquist.
    pub fn for_config(config: &SynthConfig) -> Self {
        Self {
            waveform: None,
            waveform_loop: (0.0, 1.0),
            coarse_tune: 0.0,
            fine_tune: 0.0,
            glide: MIN_RATE,
            bend_range: 0.0,
            vibrato_rate: 1.0,
            vibrato_depth: 0.0,
            amplitude: 1.0,
            tremolo_rate: 1.0,
            tremolo_depth: 0.0,
            pan: 0.0,
            pan_rate: 1.0,
            pan_depth: 0.0,
            envelope: EnvelopeParams {
                sustain_level: 0.75,
                ..EnvelopeParams::default()
            },
            velocity_amount: 1.0,
            filter_type: FilterType::LowPass,
            filter_frequency: config.nyquist(),
            filter_resonance: MIN_Q,
            filter_attack_time: 0.0,
            filter_amount: 0.0,
            filter_release_time: 0.0,
            filter_rate: 1.0,
            filter_depth: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    core: VoiceCore,
    note: Note,

    root: f32,
    coarse_tune: f32,
    fine_tune: f32,
    tune_offset: f32,
    bend_range: f32,
    bend: f32,
    shape: Option<Shape>,
    waveform_loop: (f32, f32),
    envelope: EnvelopeParams,

    freq_lerp: Lerp,
    pitch_lerp: Lerp,
    vibrato: Lfo,
    tremolo: Lfo,
    panning: Lfo,
    filter_envelope: ArEnvelope,
    filter_lfo: Lfo,
}

impl Oscillator {
    pub fn new(config: &SynthConfig) -> Self {
        Self::with_root(config, 440.0)
    }

    /// `root` is the frequency the tuning controls are relative to.
    pub fn with_root(config: &SynthConfig, root: f32) -> Self {
        let mut osc = Self {
            core: VoiceCore::new(config),
            note: Note::new(root),
            root,
            coarse_tune: 0.0,
            fine_tune: 0.0,
            tune_offset: 0.0,
            bend_range: 0.0,
            bend: 0.0,
            shape: None,
            waveform_loop: (0.0, 1.0),
            envelope: EnvelopeParams {
                sustain_level: 0.75,
                ..EnvelopeParams::default()
            },
            freq_lerp: Lerp::new(0.0, 0.0),
            pitch_lerp: Lerp::new(0.0, 0.0),
            vibrato: Lfo::new().with_scale(0.0),
            tremolo: Lfo::new().with_scale(0.0).with_offset(1.0),
            panning: Lfo::new().with_scale(0.0),
            filter_envelope: ArEnvelope::new(0.0, 0.0, 0.0),
            filter_lfo: Lfo::new().with_scale(0.0),
        };
        osc.update_root();
        osc.update_envelope();
        osc
    }

    /// The note this voice plays.
    pub fn note(&self) -> &Note {
        &self.note
    }

    pub(crate) fn note_mut(&mut self) -> &mut Note {
        &mut self.note
    }

    fn update_root(&mut self) {
        self.note.frequency =
            self.root * (self.coarse_tune + self.fine_tune / 12.0 + self.tune_offset).exp2();
    }

    fn update_envelope(&mut self) {
        let velocity_mod = self.core.velocity_mod();
        self.note.set_envelope(EnvelopeParams {
            attack_level: velocity_mod * self.envelope.attack_level,
            sustain_level: velocity_mod * self.envelope.sustain_level,
            ..self.envelope
        });
    }

    fn update_filter(&mut self) {
        let frequency = (self.core.filter_frequency()
            + self.filter_envelope.value()
            + self.filter_lfo.value())
        .max(HIGHPASS_MIN_FREQUENCY);

        if let Some(filter) = self.core.resolve_filter(frequency) {
            self.note.set_filter(filter);
        }
    }

    pub fn root(&self) -> f32 {
        self.root
    }

    /// Change the root. The held pitch moves with it.
    pub fn set_root(&mut self, root: f32) {
        self.root = root.max(f32::MIN_POSITIVE);
        self.update_root();
    }

    /// Extra tuning in octaves on top of coarse and fine tune.
    pub(crate) fn set_tune_offset(&mut self, octaves: f32) {
        self.tune_offset = octaves;
        self.update_root();
    }

    /// Tuning in octaves. 1.0 is an octave up, -2.0 two octaves down.
    pub fn coarse_tune(&self) -> f32 {
        self.coarse_tune
    }

    pub fn set_coarse_tune(&mut self, value: f32) {
        self.coarse_tune = value;
        self.update_root();
    }

    /// Tuning in semitones.
    pub fn fine_tune(&self) -> f32 {
        self.fine_tune
    }

    pub fn set_fine_tune(&mut self, value: f32) {
        self.fine_tune = value;
        self.update_root();
    }

    /// Frequency the glide is heading to, in Hz.
    pub fn frequency(&self) -> f32 {
        self.root * self.freq_lerp.target().exp2()
    }

    /// Glide to `value` Hz over [`glide`](Self::glide) seconds.
    pub fn set_frequency(&mut self, value: f32) {
        self.freq_lerp
            .set_value((value.max(f32::MIN_POSITIVE) / self.root).log2());
    }

    /// Glide time between notes in seconds.
    pub fn glide(&self) -> f32 {
        self.freq_lerp.rate()
    }

    pub fn set_glide(&mut self, value: f32) {
        self.freq_lerp.set_rate(value);
    }

    /// Maximum pitch bend in octaves, either direction. 1/12 is a
    /// semitone.
    pub fn bend_range(&self) -> f32 {
        self.bend_range
    }

    pub fn set_bend_range(&mut self, value: f32) {
        self.bend_range = value;
        self.pitch_lerp.set_value(self.bend * self.bend_range);
    }

    pub fn bend(&self) -> f32 {
        self.bend
    }

    pub fn vibrato_rate(&self) -> f32 {
        self.vibrato.rate()
    }

    pub fn set_vibrato_rate(&mut self, value: f32) {
        self.vibrato.set_rate(value);
    }

    /// Vibrato depth in octaves.
    pub fn vibrato_depth(&self) -> f32 {
        self.vibrato.scale()
    }

    pub fn set_vibrato_depth(&mut self, value: f32) {
        self.vibrato.set_scale(value);
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.note.waveform.as_ref()
    }

    pub fn set_waveform(&mut self, waveform: Option<Waveform>) {
        self.shape = None;
        self.note.waveform = waveform;
        self.apply_waveform_loop();
    }

    /// Build the waveform from a [`Shape`].
    pub fn set_shape(&mut self, shape: Option<Shape>) {
        self.set_waveform(shape.map(|s| WaveformBuilder::new(s).build()));
        self.shape = shape;
    }

    /// Loop region as fractions of the waveform, `start <= end`.
    pub fn waveform_loop(&self) -> (f32, f32) {
        self.waveform_loop
    }

    pub fn set_waveform_loop(&mut self, start: f32, end: f32) {
        let start = start.clamp(0.0, 1.0);
        let end = end.clamp(start, 1.0);
        self.waveform_loop = (start, end);
        self.apply_waveform_loop();
    }

    /// Loop region in samples, or `None` without a usable waveform.
    pub fn waveform_loop_indices(&self) -> Option<(usize, usize)> {
        let len = self.note.waveform.as_ref().map(Waveform::len)?;
        (len >= 2).then_some((self.note.waveform_loop_start, self.note.waveform_loop_end))
    }

    fn apply_waveform_loop(&mut self) {
        let len = self.note.waveform.as_ref().map_or(0, Waveform::len);
        if len < 2 {
            self.note.waveform_loop_start = 0;
            self.note.waveform_loop_end = usize::MAX;
            return;
        }

        let (start, end) = self.waveform_loop;
        let start = ((start * len as f32) as usize).min(len - 2);
        let end = ((end * len as f32) as usize).clamp(start + 2, len);
        self.note.waveform_loop_start = start;
        self.note.waveform_loop_end = end;
    }

    pub fn tremolo_rate(&self) -> f32 {
        self.tremolo.rate()
    }

    pub fn set_tremolo_rate(&mut self, value: f32) {
        self.tremolo.set_rate(value);
    }

    pub fn tremolo_depth(&self) -> f32 {
        self.tremolo.scale()
    }

    pub fn set_tremolo_depth(&mut self, value: f32) {
        self.tremolo.set_scale(value);
    }

    /// Stereo position, -1.0 (left) to 1.0 (right).
    pub fn pan(&self) -> f32 {
        self.panning.offset()
    }

    pub fn set_pan(&mut self, value: f32) {
        self.panning.set_offset(value);
    }

    pub fn pan_rate(&self) -> f32 {
        self.panning.rate()
    }

    pub fn set_pan_rate(&mut self, value: f32) {
        self.panning.set_rate(value);
    }

    /// Negative depths flip the pan LFO.
    pub fn pan_depth(&self) -> f32 {
        self.panning.scale()
    }

    pub fn set_pan_depth(&mut self, value: f32) {
        self.panning.set_scale(value);
    }

    pub fn attack_time(&self) -> f32 {
        self.envelope.attack_time
    }

    pub fn set_attack_time(&mut self, value: f32) {
        self.envelope.attack_time = value.max(0.0);
        self.update_envelope();
    }

    pub fn attack_level(&self) -> f32 {
        self.envelope.attack_level
    }

    pub fn set_attack_level(&mut self, value: f32) {
        self.envelope.attack_level = value.clamp(0.0, 1.0);
        self.update_envelope();
    }

    pub fn decay_time(&self) -> f32 {
        self.envelope.decay_time
    }

    pub fn set_decay_time(&mut self, value: f32) {
        self.envelope.decay_time = value.max(0.0);
        self.update_envelope();
    }

    pub fn sustain_level(&self) -> f32 {
        self.envelope.sustain_level
    }

    pub fn set_sustain_level(&mut self, value: f32) {
        self.envelope.sustain_level = value.clamp(0.0, 1.0);
        self.update_envelope();
    }

    pub fn release_time(&self) -> f32 {
        self.envelope.release_time
    }

    pub fn set_release_time(&mut self, value: f32) {
        self.envelope.release_time = value.max(0.0);
        self.update_envelope();
    }

    pub fn filter_attack_time(&self) -> f32 {
        self.filter_envelope.attack_time()
    }

    pub fn set_filter_attack_time(&mut self, value: f32) {
        self.filter_envelope.set_attack_time(value);
    }

    /// Hz added to the cutoff while pressed.
    pub fn filter_amount(&self) -> f32 {
        self.filter_envelope.amount()
    }

    pub fn set_filter_amount(&mut self, value: f32) {
        self.filter_envelope.set_amount(value);
    }

    pub fn filter_release_time(&self) -> f32 {
        self.filter_envelope.release_time()
    }

    pub fn set_filter_release_time(&mut self, value: f32) {
        self.filter_envelope.set_release_time(value);
    }

    pub fn filter_rate(&self) -> f32 {
        self.filter_lfo.rate()
    }

    pub fn set_filter_rate(&mut self, value: f32) {
        self.filter_lfo.set_rate(value);
    }

    /// Filter LFO depth in Hz.
    pub fn filter_depth(&self) -> f32 {
        self.filter_lfo.scale()
    }

    pub fn set_filter_depth(&mut self, value: f32) {
        self.filter_lfo.set_scale(value);
    }

    /// Current settings as a patch.
    pub fn patch(&self) -> OscillatorPatch {
        OscillatorPatch {
            waveform: self.shape,
            waveform_loop: self.waveform_loop,
            coarse_tune: self.coarse_tune,
            fine_tune: self.fine_tune,
            glide: self.glide(),
            bend_range: self.bend_range,
            vibrato_rate: self.vibrato_rate(),
            vibrato_depth: self.vibrato_depth(),
            amplitude: self.amplitude(),
            tremolo_rate: self.tremolo_rate(),
            tremolo_depth: self.tremolo_depth(),
            pan: self.pan(),
            pan_rate: self.pan_rate(),
            pan_depth: self.pan_depth(),
            envelope: self.envelope,
            velocity_amount: self.velocity_amount(),
            filter_type: self.filter_type(),
            filter_frequency: self.filter_frequency(),
            filter_resonance: self.filter_resonance(),
            filter_attack_time: self.filter_attack_time(),
            filter_amount: self.filter_amount(),
            filter_release_time: self.filter_release_time(),
            filter_rate: self.filter_rate(),
            filter_depth: self.filter_depth(),
        }
    }

    /// Apply every setting in `patch`. Values are clamped as by the
    /// individual setters.
    pub fn apply_patch(&mut self, patch: &OscillatorPatch) {
        self.set_shape(patch.waveform);
        self.set_waveform_loop(patch.waveform_loop.0, patch.waveform_loop.1);
        self.coarse_tune = patch.coarse_tune;
        self.fine_tune = patch.fine_tune;
        self.update_root();
        self.set_glide(patch.glide);
        self.set_bend_range(patch.bend_range);
        self.set_vibrato_rate(patch.vibrato_rate);
        self.set_vibrato_depth(patch.vibrato_depth);
        self.set_amplitude(patch.amplitude);
        self.set_tremolo_rate(patch.tremolo_rate);
        self.set_tremolo_depth(patch.tremolo_depth);
        self.set_pan(patch.pan);
        self.set_pan_rate(patch.pan_rate);
        self.set_pan_depth(patch.pan_depth);
        self.envelope = patch.envelope.sanitized();
        self.set_velocity_amount(patch.velocity_amount);
        self.update_envelope();
        self.set_filter_type(patch.filter_type);
        self.set_filter_frequency(patch.filter_frequency);
        self.set_filter_resonance(patch.filter_resonance);
        self.set_filter_attack_time(patch.filter_attack_time);
        self.set_filter_amount(patch.filter_amount);
        self.set_filter_release_time(patch.filter_release_time);
        self.set_filter_rate(patch.filter_rate);
        self.set_filter_depth(patch.filter_depth);
    }
}

impl Voice for Oscillator {
    fn core(&self) -> &VoiceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VoiceCore {
        &mut self.core
    }

    fn press(&mut self, note: u8, velocity: Velocity) -> bool {
        let new_note = self.core.press(note, velocity);
        self.update_envelope();
        if !new_note {
            return false;
        }

        self.set_frequency(midi_to_hz(note));
        self.note.press();
        self.filter_envelope.press();
        true
    }

    fn release(&mut self) -> bool {
        if !self.core.release() {
            return false;
        }
        self.note.release();
        self.filter_envelope.release();
        true
    }

    fn update(&mut self, dt: f32) {
        let glide = self.freq_lerp.tick(dt);
        let vibrato = self.vibrato.tick(dt);
        let bend = self.pitch_lerp.tick(dt);
        self.note.bend = glide + vibrato + bend;

        self.note.amplitude = self.tremolo.tick(dt);
        self.note.panning = self.panning.tick(dt);

        self.filter_envelope.tick(dt);
        self.filter_lfo.tick(dt);
        self.update_filter();
    }

    fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.note.render_add(out, ctx);
    }

    fn amplitude(&self) -> f32 {
        self.tremolo.offset()
    }

    fn set_amplitude(&mut self, value: f32) {
        self.tremolo.set_offset(value);
    }

    /// Pitch bend in -1.0..=1.0, scaled by the bend range.
    fn set_bend(&mut self, value: f32) {
        self.bend = value;
        self.pitch_lerp.set_value(self.bend * self.bend_range);
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

    const DT: f32 = 64.0 / 48_000.0;

    fn osc() -> Oscillator {
        Oscillator::new(&SynthConfig::new(48_000, 1).unwrap())
    }

    #[test]
    fn press_same_note_does_not_retrigger() {
        let mut osc = osc();
        assert!(osc.press(60, Velocity::FULL));
        assert!(!osc.press(60, Velocity::FULL));
        assert!(osc.pressed());
        assert!(osc.release());
        assert!(!osc.release());
    }

    #[test]
    fn pitch_follows_note_in_octaves() {
        let mut osc = osc();
        osc.press(81, Velocity::FULL);
        osc.update(0.01);
        assert!((osc.note().bend - 1.0).abs() < 1e-3, "bend {}", osc.note().bend);
        assert!((osc.frequency() - 880.0).abs() < 0.1);
    }

    #[test]
    fn glide_moves_linearly_in_pitch() {
        let mut osc = osc();
        osc.set_glide(0.1);
        osc.press(69, Velocity::FULL);
        osc.update(0.1);
        osc.press(81, Velocity::FULL);
        osc.update(0.05);
        assert!((osc.note().bend - 0.5).abs() < 1e-3, "bend {}", osc.note().bend);
    }

    #[test]
    fn tuning_moves_the_note_frequency() {
        let mut osc = osc();
        osc.set_coarse_tune(-1.0);
        assert!((osc.note().frequency - 220.0).abs() < 1e-3);
        osc.set_fine_tune(12.0);
        assert!((osc.note().frequency - 440.0).abs() < 1e-3);
    }

    #[test]
    fn velocity_scales_envelope_levels() {
        let mut osc = osc();
        osc.press(60, Velocity::from(0.5f32));
        let env = osc.note().envelope();
        assert!((env.attack_level - 0.5).abs() < 1e-6);
        assert!((env.sustain_level - 0.375).abs() < 1e-6);

        osc.set_velocity_amount(0.0);
        osc.press(60, Velocity::from(0.5f32));
        assert!((osc.note().envelope().sustain_level - 0.75).abs() < 1e-6);
    }

    #[test]
    fn bend_uses_range() {
        let mut osc = osc();
        osc.set_bend_range(2.0);
        osc.set_bend(-0.5);
        osc.update(DT);
        assert!((osc.note().bend + 1.0).abs() < 1e-3);
    }

    #[test]
    fn filter_envelope_opens_cutoff() {
        let mut osc = osc();
        osc.set_filter_frequency(1_000.0);
        osc.set_filter_amount(500.0);
        osc.update(DT);
        assert_eq!(osc.note().filter().map(|f| f.frequency), Some(1_000.0));

        osc.press(60, Velocity::FULL);
        osc.update(DT);
        assert_eq!(osc.note().filter().map(|f| f.frequency), Some(1_500.0));
    }

    #[test]
    fn filter_cutoff_never_below_50hz() {
        let mut osc = osc();
        osc.set_filter_type(FilterType::BandPass);
        osc.set_filter_frequency(10.0);
        osc.update(DT);
        assert_eq!(osc.note().filter().map(|f| f.frequency), Some(50.0));
    }

    #[test]
    fn waveform_loop_maps_to_indices() {
        let mut osc = osc();
        osc.set_shape(Some(Shape::Saw));
        osc.set_waveform_loop(0.25, 0.5);
        assert_eq!(osc.waveform_loop_indices(), Some((64, 128)));

        osc.set_waveform_loop(1.0, 1.0);
        assert_eq!(osc.waveform_loop_indices(), Some((254, 256)));

        osc.set_waveform_loop(0.8, 0.2);
        assert_eq!(osc.waveform_loop(), (0.8, 0.8));
    }

    #[test]
    fn tremolo_offset_is_amplitude() {
        let mut osc = osc();
        osc.set_amplitude(0.5);
        osc.update(DT);
        assert!((osc.note().amplitude - 0.5).abs() < 1e-6);
    }

    #[test]
    fn patch_round_trip() {
        let mut osc = osc();
        let patch = OscillatorPatch {
            waveform: Some(Shape::Triangle),
            glide: 0.2,
            envelope: EnvelopeParams {
                attack_time: 0.1,
                decay_time: 0.2,
                release_time: 0.3,
                attack_level: 0.9,
                sustain_level: 0.5,
            },
            filter_type: FilterType::HighPass,
            filter_frequency: 300.0,
            filter_amount: 200.0,
            ..OscillatorPatch::default()
        };

        osc.apply_patch(&patch);
        assert_eq!(osc.patch(), patch);
    }

    #[test]
    fn default_patch_matches_a_fresh_voice() {
        let config = SynthConfig::default();
        let default = OscillatorPatch::default();
        assert_eq!(Oscillator::new(&config).patch(), default);

        let mut osc = Oscillator::new(&config);
        osc.set_glide(0.3);
        osc.set_filter_frequency(500.0);
        osc.apply_patch(&default);
        assert_eq!(osc.patch(), default);

        let config = SynthConfig::new(48_000, 1).unwrap();
        assert_eq!(
            Oscillator::new(&config).patch(),
            OscillatorPatch::for_config(&config)
        );
    }
}
