use crate::{synth::RenderCtx, MIN_TIME};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

Linear ADSR envelope driving the amplitude of a single note.

Vocabulary
----------

  level         The envelope's current output value (0.0 to 1.0). This
                multiplies the note's waveform.

  attack level  The peak reached at the end of the attack. Voices scale it
                by note velocity, so a soft note peaks lower.

  sustain level The level held while the gate stays high.

  stage         Idle, Attack, Decay, Sustain or Release.


The Shape
---------

  Level
    AL  ┐     ╱╲
        │    ╱  ╲___________
    SL  │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Every ramp is a straight line. A stage time of zero (or anything below one
sample) jumps straight to the stage target.


Retriggering
------------

note_on never resets the level to zero. The attack ramps from wherever the
envelope currently is, so pressing a drum again while it is still ringing,
or pressing a note during its release, does not click.

The attack slope is fixed by the stage time and the full 0 → attack level
distance, so a retrigger from a high level finishes early instead of
stretching the slope.


Release
-------

Release snapshots the current level and the number of samples to zero at
note_off time, then interpolates. This guarantees the envelope lands on
exactly 0.0 and goes Idle.


Changing Parameters While Playing
---------------------------------

set_params() swaps the shape without touching the running state. A voice
does this every time the velocity or an ADSR control changes. The next
sample continues from the current level toward the new targets.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping to the attack level
    Decay,   // Reached peak, ramping to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

/// Shape of an amplitude envelope. Times are in seconds, levels in 0.0 - 1.0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack_time: f32,
    pub decay_time: f32,
    pub release_time: f32,
    pub attack_level: f32,
    pub sustain_level: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_time: 0.0,
            decay_time: 0.0,
            release_time: 0.0,
            attack_level: 1.0,
            sustain_level: 1.0,
        }
    }
}

impl EnvelopeParams {
    /// Clamp times to be non-negative and levels into 0.0 - 1.0.
    pub fn sanitized(self) -> Self {
        Self {
            attack_time: self.attack_time.max(0.0),
            decay_time: self.decay_time.max(0.0),
            release_time: self.release_time.max(0.0),
            attack_level: self.attack_level.clamp(0.0, 1.0),
            sustain_level: self.sustain_level.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    params: EnvelopeParams,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,

    // Decay bookkeeping
    decay_start_level: f32,

    // Release bookkeeping
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self::with_params(EnvelopeParams::default())
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_params(EnvelopeParams {
            attack_time: attack,
            decay_time: decay,
            release_time: release,
            attack_level: 1.0,
            sustain_level: sustain,
        })
    }

    pub fn with_params(params: EnvelopeParams) -> Self {
        Self {
            params: params.sanitized(),
            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn with_attack_level(mut self, level: f32) -> Self {
        self.params.attack_level = level.clamp(0.0, 1.0);
        self
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Replace the envelope shape without resetting the running stage.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = params.sanitized();
    }

    /// Gate high: ramp from the current level toward the attack level.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;

        if self.params.release_time <= MIN_TIME {
            self.release_total_samples = 1;
        } else {
            self.release_total_samples =
                (self.params.release_time * ctx.sample_rate).round().max(1.0) as u32;
        }

        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let target = self.params.attack_level;
                if self.params.attack_time <= MIN_TIME || self.level >= target {
                    // Instant attack, or a retrigger above the new peak
                    self.level = target;
                } else {
                    let increment = target / (self.params.attack_time * ctx.sample_rate);
                    self.level = (self.level + increment).min(target);
                }

                if self.level >= target {
                    self.decay_start_level = self.level;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.params.sustain_level;
                if self.params.decay_time <= MIN_TIME {
                    self.level = target;
                } else {
                    let distance = (self.decay_start_level - target)
                        .abs()
                        .max((self.level - target).abs());
                    let step = distance / (self.params.decay_time * ctx.sample_rate);
                    if self.level > target {
                        self.level = (self.level - step).max(target);
                    } else {
                        self.level = (self.level + step).min(target);
                    }
                }

                if (self.level - target).abs() <= f32::EPSILON {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain_level;
            }

            EnvelopeState::Release => {
                // level = start * (1 - elapsed/total)
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = RenderCtx::mono(SAMPLE_RATE);
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);

        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 1);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn attack_stops_at_attack_level() {
        let mut env = Envelope::adsr(0.01, 0.5, 0.2, 0.2).with_attack_level(0.5);

        env.note_on();
        render_samples(&mut env, 11);

        assert!(env.level() <= 0.5);
        assert!(env.level() > 0.45);
    }

    #[test]
    fn zero_times_jump_to_sustain() {
        let mut env = Envelope::adsr(0.0, 0.0, 0.75, 0.0);

        env.note_on();
        render_samples(&mut env, 3);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);

        env.note_on();
        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 0.05, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        let ctx = RenderCtx::mono(SAMPLE_RATE);

        env.note_on();
        render_samples(&mut env, (0.02 * SAMPLE_RATE) as usize);

        env.note_off(&ctx);
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn retrigger_continues_from_current_level() {
        let mut env = Envelope::adsr(0.1, 0.0, 1.0, 0.1);
        let ctx = RenderCtx::mono(SAMPLE_RATE);

        env.note_on();
        render_samples(&mut env, 50);
        let before = env.level();

        env.note_off(&ctx);
        env.next_sample(&ctx);
        env.note_on();
        env.next_sample(&ctx);

        assert!(env.level() > before * 0.9, "retrigger must not drop to zero");
    }

    #[test]
    fn set_params_keeps_stage() {
        let mut env = Envelope::adsr(0.0, 0.0, 0.5, 0.0);
        env.note_on();
        render_samples(&mut env, 2);

        env.set_params(EnvelopeParams {
            sustain_level: 0.25,
            ..env.params()
        });
        render_samples(&mut env, 1);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - 0.25).abs() < 1e-6);
    }
}
