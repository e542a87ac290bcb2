// Purpose - external interfaces: MIDI input, routing to voices, WAV files

pub mod converter;
pub mod midi;
pub mod wav;

pub use converter::{midi_to_synth, Route};
pub use midi::MidiEvent;
pub use wav::WavData;
