//! MIDI input via midir

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult};
use log::info;
use midir::{Ignore, MidiInput, MidiInputConnection};
use rtrb::Producer;

use synthvoice::{
    io::{midi_to_synth, MidiEvent, Route},
    SynthMessage,
};

use super::app::Counters;

const CLIENT_NAME: &str = "synthvoice";

/// List the available input port names.
pub fn port_names() -> EyreResult<Vec<String>> {
    let input = MidiInput::new(CLIENT_NAME).map_err(|e| eyre!("{}", e))?;
    Ok(input
        .ports()
        .iter()
        .filter_map(|port| input.port_name(port).ok())
        .collect())
}

/// Open the first input whose name starts with `name` and forward its
/// events on `channel` to `tx`. Events that do not fit in the queue are
/// counted in `counters`.
///
/// The returned connection closes when dropped.
pub fn connect(
    name: &str,
    channel: u8,
    route: Route,
    mut tx: Producer<SynthMessage>,
    counters: Arc<Counters>,
) -> EyreResult<MidiInputConnection<()>> {
    let mut input = MidiInput::new(CLIENT_NAME).map_err(|e| eyre!("{}", e))?;
    input.ignore(Ignore::All);

    let port = input
        .ports()
        .into_iter()
        .find(|port| {
            input
                .port_name(port)
                .map(|n| n.starts_with(name))
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            let available = port_names().unwrap_or_default().join(", ");
            eyre!("no MIDI input matching {name:?} (available: {available})")
        })?;

    let port_name = input.port_name(&port).map_err(|e| eyre!("{}", e))?;
    info!("listening on {port_name}, channel {}", channel + 1);

    input
        .connect(
            &port,
            "synthvoice-in",
            move |_stamp, bytes, _| {
                let Some(event) = MidiEvent::parse(bytes) else {
                    return;
                };
                if let Some(msg) = midi_to_synth(event, channel, route) {
                    if tx.push(msg).is_err() {
                        counters.add_dropped(1);
                    }
                }
            },
            (),
        )
        .map_err(|e| eyre!("{}", e))
}
