use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Controller number for "all notes off".
const ALL_NOTES_OFF: u8 = 123;

/// How incoming notes are spread over the synthesizer's voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Every note goes to one voice.
    Single(usize),
    /// Note `n` goes to voice `n % count`.
    Modulo(usize),
}

impl Route {
    fn voice_for(self, key: u8) -> usize {
        match self {
            Route::Single(voice) => voice,
            Route::Modulo(count) => key as usize % count.max(1),
        }
    }
}

/// Translate an event on `channel` into a synthesizer message.
///
/// Events on other channels are dropped. Pitch bend only applies to
/// [`Route::Single`], since a modulo route has no single voice to bend.
pub fn midi_to_synth(midi: MidiEvent, channel: u8, route: Route) -> Option<SynthMessage> {
    if midi.channel() != channel {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::Press {
            voice: route.voice_for(key),
            note: key,
            velocity: velocity as f32 / 127.0,
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::Release {
            voice: route.voice_for(key),
        }),
        MidiEvent::PitchBend { value, .. } => match route {
            Route::Single(voice) => Some(SynthMessage::PitchBend {
                voice,
                value: bend_to_unit(value),
            }),
            Route::Modulo(_) => None,
        },
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::ReleaseAll),
        _ => None,
    }
}

/// Map a signed 14-bit bend onto -1.0..=1.0.
pub fn bend_to_unit(value: i16) -> f32 {
    (value as f32 / 8192.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(channel: u8, key: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 127,
        }
    }

    #[test]
    fn single_route() {
        let msg = midi_to_synth(note_on(0, 60), 0, Route::Single(2));
        assert_eq!(
            msg,
            Some(SynthMessage::Press {
                voice: 2,
                note: 60,
                velocity: 1.0
            })
        );
    }

    #[test]
    fn other_channels_are_dropped() {
        assert_eq!(midi_to_synth(note_on(1, 60), 0, Route::Single(0)), None);
    }

    #[test]
    fn modulo_route_spreads_notes() {
        let route = Route::Modulo(4);
        let voices: Vec<_> = [36u8, 37, 38, 40]
            .iter()
            .filter_map(|&key| match midi_to_synth(note_on(9, key), 9, route) {
                Some(SynthMessage::Press { voice, .. }) => Some(voice),
                _ => None,
            })
            .collect();
        assert_eq!(voices, vec![0, 1, 2, 0]);

        let off = MidiEvent::NoteOff {
            channel: 9,
            key: 38,
            velocity: 0,
        };
        assert_eq!(
            midi_to_synth(off, 9, route),
            Some(SynthMessage::Release { voice: 2 })
        );
    }

    #[test]
    fn pitch_bend_range() {
        let bend = |value| MidiEvent::PitchBend { channel: 0, value };
        let unit = |value| match midi_to_synth(bend(value), 0, Route::Single(0)) {
            Some(SynthMessage::PitchBend { value, .. }) => value,
            other => panic!("unexpected {other:?}"),
        };

        assert_eq!(unit(0), 0.0);
        assert_eq!(unit(-8192), -1.0);
        assert!((unit(8191) - 1.0).abs() < 1e-3);
        assert_eq!(midi_to_synth(bend(100), 0, Route::Modulo(3)), None);
    }

    #[test]
    fn all_notes_off() {
        let cc = MidiEvent::ControlChange {
            channel: 0,
            controller: 123,
            value: 0,
        };
        assert_eq!(
            midi_to_synth(cc, 0, Route::Single(0)),
            Some(SynthMessage::ReleaseAll)
        );
    }
}
