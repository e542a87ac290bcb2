use log::debug;

use crate::{
    synth::{message::MessageReceiver, RenderCtx, SynthConfig, SynthMessage},
    voice::{Velocity, Voice},
    Error, Result, CONTROL_BLOCK,
};

/// Handle to a voice owned by a [`Synthesizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(usize);

impl VoiceId {
    /// Index used to address the voice in a [`SynthMessage`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns the voices and renders them into interleaved frames.
///
/// Rendering runs in control blocks of [`CONTROL_BLOCK`] frames. Before each
/// block every voice gets `update(dt)` so its envelopes, LFOs and glides
/// advance at control rate; the audio inside the block is then mixed from
/// each voice's `render`.
pub struct Synthesizer {
    config: SynthConfig,
    ctx: RenderCtx,
    voices: Vec<Box<dyn Voice>>,
    // Frames left before the next update
    until_update: usize,
    dropped: u64,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            ctx: config.render_ctx(),
            voices: Vec::new(),
            until_update: 0,
            dropped: 0,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn add_voice(&mut self, voice: impl Voice + 'static) -> VoiceId {
        let id = VoiceId(self.voices.len());
        self.voices.push(Box::new(voice));
        debug!("added voice {}", id.0);
        id
    }

    pub fn voice(&self, id: VoiceId) -> Option<&dyn Voice> {
        self.voices.get(id.0).map(|v| &**v)
    }

    pub fn voice_mut(&mut self, id: VoiceId) -> Option<&mut (dyn Voice + 'static)> {
        self.voices.get_mut(id.0).map(|v| &mut **v)
    }

    /// Borrow a voice as its concrete type.
    pub fn voice_as_mut<T: Voice + 'static>(&mut self, id: VoiceId) -> Option<&mut T> {
        self.voices
            .get_mut(id.0)
            .and_then(|v| v.as_any_mut().downcast_mut::<T>())
    }

    pub fn voices(&self) -> impl Iterator<Item = &dyn Voice> {
        self.voices.iter().map(|v| &**v)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Apply one control message.
    pub fn handle(&mut self, msg: SynthMessage) -> Result<()> {
        match msg {
            SynthMessage::Press {
                voice,
                note,
                velocity,
            } => {
                self.get(voice)?.press(note, Velocity::from(velocity));
            }
            SynthMessage::Release { voice } => {
                self.get(voice)?.release();
            }
            SynthMessage::PitchBend { voice, value } => {
                self.get(voice)?.set_bend(value.clamp(-1.0, 1.0));
            }
            SynthMessage::ReleaseAll => {
                for voice in &mut self.voices {
                    voice.release();
                }
            }
        }
        Ok(())
    }

    fn get(&mut self, index: usize) -> Result<&mut Box<dyn Voice>> {
        self.voices.get_mut(index).ok_or(Error::NoSuchVoice(index))
    }

    /// Render interleaved frames into `out`, replacing its contents.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        let channels = self.ctx.channel_count;
        let dt = CONTROL_BLOCK as f32 / self.ctx.sample_rate;
        let mut remaining = out;

        while remaining.len() >= channels {
            if self.until_update == 0 {
                for voice in &mut self.voices {
                    voice.update(dt);
                }
                self.until_update = CONTROL_BLOCK;
            }

            let frames = (remaining.len() / channels).min(self.until_update);
            let (block, rest) = std::mem::take(&mut remaining).split_at_mut(frames * channels);
            for voice in &mut self.voices {
                voice.render(block, &self.ctx);
            }

            self.until_update -= frames;
            remaining = rest;
        }
    }

    /// Drain pending messages from `rx`, then render.
    ///
    /// This runs on the audio thread, so messages [`handle`](Self::handle)
    /// rejects are counted rather than logged. See
    /// [`dropped_messages`](Self::dropped_messages).
    pub fn render_from<R: MessageReceiver>(&mut self, rx: &mut R, out: &mut [f32]) {
        while let Some(msg) = rx.pop() {
            if self.handle(msg).is_err() {
                self.dropped += 1;
            }
        }
        self.render(out);
    }

    /// Messages `render_from` could not apply since this synthesizer was
    /// created.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped
    }
}
