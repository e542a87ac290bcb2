use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeParams, EnvelopeState},
        filter::{FilterSettings, SVFilter},
        waveform::Waveform,
    },
    synth::RenderCtx,
};

/*
Note
====

A note is one wavetable oscillator with its own amplitude envelope, plus a
handful of per-note controls the voices write once per control block:

    amplitude   linear gain
    bend        pitch offset in octaves (playback rate = frequency * 2^bend)
    panning     -1.0 (left) to +1.0 (right)
    filter      optional state variable filter

Playback
--------

`frequency` is how many times per second the loop region
(waveform_loop_start..waveform_loop_end) is played. Samples are read by
truncating the position to a table index, the same way short single-cycle
tables are read on small hardware synths.

A looping note wraps back to the loop start forever. A one-shot note
(`looping = false`) starts its release the first time it reaches the loop
end; after that `finished()` is true and the loop keeps cycling under the
release tail until the envelope is idle. With no release time the note is
silent from the end point on.

Without a waveform the note plays a 50% square wave.

Panning
-------

    left  = min(1, 1 - pan)
    right = min(1, 1 + pan)

At pan = 0 both sides play at full level. Mono output ignores panning.
*/

#[derive(Debug, Clone)]
pub struct Note {
    pub frequency: f32,
    pub waveform: Option<Waveform>,
    /// First sample of the loop region. Clamped to the table.
    pub waveform_loop_start: usize,
    /// One past the last sample of the loop region. Clamped to the table.
    pub waveform_loop_end: usize,
    pub looping: bool,
    pub amplitude: f32,
    pub bend: f32,
    pub panning: f32,

    envelope: Envelope,
    filter: Option<FilterSettings>,
    svf: SVFilter,

    phase: f32,
    finished: bool,
    release_pending: bool,
}

impl Note {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            waveform: None,
            waveform_loop_start: 0,
            waveform_loop_end: usize::MAX,
            looping: true,
            amplitude: 1.0,
            bend: 0.0,
            panning: 0.0,
            envelope: Envelope::new(),
            filter: None,
            svf: SVFilter::lowpass(0.0),
            phase: 0.0,
            finished: false,
            release_pending: false,
        }
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = Some(waveform);
        self
    }

    pub fn with_envelope(mut self, params: EnvelopeParams) -> Self {
        self.set_envelope(params);
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_panning(mut self, panning: f32) -> Self {
        self.panning = panning;
        self
    }

    pub fn with_filter(mut self, filter: FilterSettings) -> Self {
        self.set_filter(Some(filter));
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn envelope(&self) -> EnvelopeParams {
        self.envelope.params()
    }

    /// Swap the envelope shape. A playing note keeps its current stage.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.envelope.set_params(params);
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn filter(&self) -> Option<FilterSettings> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Option<FilterSettings>) {
        match filter {
            Some(settings) => {
                if self.filter.is_none() {
                    self.svf.reset();
                }
                self.svf.apply(settings);
            }
            None => self.svf.reset(),
        }
        self.filter = filter;
    }

    /// Start the note from the beginning of its loop region.
    ///
    /// Pressing a note that is still held does nothing. A note that was
    /// released (or finished) restarts, with the attack ramping up from
    /// wherever the envelope currently is.
    pub fn press(&mut self) {
        if self.is_held() {
            return;
        }
        if !self.is_playing() {
            self.svf.reset();
        }
        self.phase = 0.0;
        self.finished = false;
        self.release_pending = false;
        self.envelope.note_on();
    }

    /// Begin the release stage on the next render.
    pub fn release(&mut self) {
        self.release_pending = true;
    }

    /// True while the note produces output, release tail included.
    pub fn is_playing(&self) -> bool {
        self.envelope.is_active()
    }

    /// True while pressed and not yet released.
    pub fn is_held(&self) -> bool {
        self.is_playing() && !self.release_pending && self.envelope.state() != EnvelopeState::Release
    }

    /// True once a one-shot note has played through its loop region. The
    /// release tail may still be sounding.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Loop region clamped to a table of `len` samples.
    pub fn loop_region(&self, len: usize) -> (usize, usize) {
        let end = self.waveform_loop_end.min(len);
        let start = self.waveform_loop_start.min(end.saturating_sub(1));
        (start, end)
    }

    /// Mix the note into an interleaved buffer of `ctx.channel_count`
    /// channels.
    pub fn render_add(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.release_pending {
            self.release_pending = false;
            self.envelope.note_off(ctx);
        }

        if !self.is_playing() || self.is_silent() {
            return;
        }

        let channels = ctx.channel_count.max(1);
        let increment = self.frequency * self.bend.exp2() / ctx.sample_rate;
        let (left_gain, right_gain) = self.pan_gains();

        let table = self.waveform.as_ref().filter(|w| !w.is_empty());
        let (start, end) = table.map(|t| self.loop_region(t.len())).unwrap_or((0, 0));
        let loop_len = end - start;

        for frame in out.chunks_exact_mut(channels) {
            if self.phase >= 1.0 {
                if !self.looping && !self.finished {
                    self.finished = true;
                    self.envelope.note_off(ctx);
                }
                self.phase = self.phase.fract();
            }

            let raw = match table {
                Some(table) if loop_len > 0 => {
                    let index = start + ((self.phase * loop_len as f32) as usize).min(loop_len - 1);
                    table.as_slice()[index] as f32 / 32768.0
                }
                _ => {
                    if self.phase < 0.5 {
                        1.0
                    } else {
                        -1.0
                    }
                }
            };
            self.phase += increment;

            let level = self.envelope.next_sample(ctx);
            let mut sample = raw * level * self.amplitude;
            if self.filter.is_some() {
                sample = self.svf.next_sample(sample, ctx);
            }

            if channels == 1 {
                frame[0] += sample;
            } else {
                frame[0] += sample * left_gain;
                frame[1] += sample * right_gain;
            }

            if !self.envelope.is_active() {
                break;
            }
        }
    }

    fn pan_gains(&self) -> (f32, f32) {
        let pan = self.panning.clamp(-1.0, 1.0);
        ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
    }

    // A decayed envelope with zero sustain holds at zero until the next press
    fn is_silent(&self) -> bool {
        self.envelope.state() == EnvelopeState::Sustain && self.envelope.level() <= 0.0
    }
}
