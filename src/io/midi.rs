use midly::{live::LiveEvent, MidiMessage};

/// Channel voice messages the synthesizer reacts to.
///
/// Channels are 0-based, as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Signed bend, -8192..=8191 with 0 at center.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Parse one raw MIDI message. Anything that is not one of the channel
    /// messages above (sysex, clock, aftertouch) yields `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let LiveEvent::Midi { channel, message } = LiveEvent::parse(bytes).ok()? else {
            return None;
        };
        let channel = channel.as_int();

        let event = match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => MidiEvent::NoteOff {
                channel,
                key: key.as_int(),
                velocity: 0,
            },
            MidiMessage::NoteOn { key, vel } => MidiEvent::NoteOn {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, vel } => MidiEvent::NoteOff {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::Controller { controller, value } => MidiEvent::ControlChange {
                channel,
                controller: controller.as_int(),
                value: value.as_int(),
            },
            MidiMessage::PitchBend { bend } => MidiEvent::PitchBend {
                channel,
                value: bend.as_int(),
            },
            MidiMessage::ProgramChange { program } => MidiEvent::ProgramChange {
                channel,
                program: program.as_int(),
            },
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on() {
        assert_eq!(
            MidiEvent::parse(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiEvent::parse(&[0x90, 64, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 64,
                velocity: 0
            })
        );
    }

    #[test]
    fn pitch_bend_is_centered() {
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0xE1, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 1,
                value: 8191
            })
        );
    }

    #[test]
    fn control_and_program_change() {
        let cc = MidiEvent::parse(&[0xB0, 1, 64]);
        assert!(matches!(
            cc,
            Some(MidiEvent::ControlChange {
                controller: 1,
                value: 64,
                ..
            })
        ));
        assert_eq!(cc.map(|e| e.channel()), Some(0));

        assert_eq!(
            MidiEvent::parse(&[0xCF, 5]),
            Some(MidiEvent::ProgramChange {
                channel: 15,
                program: 5
            })
        );
    }

    #[test]
    fn ignores_other_messages() {
        // Timing clock
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
        assert_eq!(MidiEvent::parse(&[]), None);
    }
}
