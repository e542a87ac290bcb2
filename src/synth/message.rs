#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control events for a [`Synthesizer`](crate::synth::Synthesizer).
///
/// `voice` is the index returned by `add_voice`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Press { voice: usize, note: u8, velocity: f32 },
    Release { voice: usize },
    /// `value` is in -1.0..=1.0 and is scaled by the voice's bend range.
    PitchBend { voice: usize, value: f32 },
    ReleaseAll,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
