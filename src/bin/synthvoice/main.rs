//! synthvoice - play the voice demos live
//!
//! Run with: cargo run -- oscillator
//!
//! The computer keyboard plays notes (`a w s e d f t g y h u j k`, `z`/`x`
//! shift the octave). With `--midi-port` a MIDI input drives the voices too.

mod app;
mod demo;
mod midi;
mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result as EyreResult;

use app::Player;
use demo::Demo;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    demo: Command,

    /// MIDI input to listen on. Matches the start of the port name; an empty
    /// string picks the first port.
    #[arg(short, long, global = true)]
    midi_port: Option<String>,

    /// MIDI channel to listen on, 1-16
    #[arg(short, long, global = true, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    channel: u8,

    /// Output sample rate in Hz. Defaults to the device's rate.
    #[arg(short, long, global = true)]
    sample_rate: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Press and release middle C every half second
    Simpletest,
    /// Plain oscillator voice for a MIDI controller
    Midi,
    /// Detuned saw pad with glide, vibrato, tremolo and a filter sweep
    Oscillator,
    /// Loop a region of a 16-bit WAV file
    Sample {
        /// WAV file to load
        file: PathBuf,
    },
    /// Kick, snare, closed and open hat on consecutive keys
    Percussive,
}

impl From<Command> for Demo {
    fn from(command: Command) -> Self {
        match command {
            Command::Simpletest => Demo::SimpleTest,
            Command::Midi => Demo::Midi,
            Command::Oscillator => Demo::Oscillator,
            Command::Sample { file } => Demo::Sample(file),
            Command::Percussive => Demo::Percussive,
        }
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    // Log to stderr at warn unless RUST_LOG says otherwise, so the TUI stays clean
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    Player::new(cli.demo.into())
        .sample_rate(cli.sample_rate)
        .midi_port(cli.midi_port)
        .channel(cli.channel - 1)
        .run()
}
