//! Terminal UI
//!
//! Draws the scope, spectrum and status bar, and turns the computer keyboard
//! into a one-octave MIDI keyboard.

mod spectrum;
mod status;
mod waveform;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use synthvoice::{
    io::{midi_to_synth, MidiEvent, Route},
    SynthMessage,
};

use super::{app::Counters, demo::Autoplay};
use spectrum::SpectrumView;
use status::{render_status, Levels, Status};
use waveform::render_scope;

/// Scope buffer size, also the FFT length
const VIS_BUFFER_SIZE: usize = 1024;

/// Terminals only report key presses. A note is let go once its key has not
/// repeated for this long.
const KEY_HOLD: Duration = Duration::from_millis(600);

/// Piano layout on the home row, semitones above C
const PIANO_KEYS: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

/// Static information sent once at startup
pub struct UiInit {
    pub demo: &'static str,
    pub labels: Vec<&'static str>,
    pub route: Route,
    pub autoplay: Option<Autoplay>,
    pub sample_rate: u32,
    pub midi_port: Option<String>,
}

struct AutoplayState {
    autoplay: Autoplay,
    next_toggle: Instant,
    pressed: bool,
}

pub struct UiApp {
    init: UiInit,
    scope_rx: Consumer<f32>,
    tx: Producer<SynthMessage>,
    counters: Arc<Counters>,
    scope: Vec<f32>,
    spectrum: SpectrumView,
    octave: i8,
    held: Option<(u8, Instant)>,
    autoplay: Option<AutoplayState>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        init: UiInit,
        scope_rx: Consumer<f32>,
        tx: Producer<SynthMessage>,
        counters: Arc<Counters>,
    ) -> Self {
        let autoplay = init.autoplay.map(|autoplay| AutoplayState {
            autoplay,
            next_toggle: Instant::now(),
            pressed: false,
        });

        Self {
            spectrum: SpectrumView::new(init.sample_rate),
            init,
            scope_rx,
            tx,
            counters,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            octave: 4,
            held: None,
            autoplay,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.spectrum.update(&self.scope);
            self.tick_autoplay();
            self.expire_held();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Release {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(SynthMessage::ReleaseAll);
        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE samples
    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(..excess);
        }
    }

    fn tick_autoplay(&mut self) {
        let Some(state) = &mut self.autoplay else {
            return;
        };
        if Instant::now() < state.next_toggle {
            return;
        }

        state.pressed = !state.pressed;
        state.next_toggle += state.autoplay.period;
        let (note, pressed) = (state.autoplay.note, state.pressed);

        if pressed {
            self.note_on(note);
        } else {
            self.note_off(note);
        }
    }

    fn expire_held(&mut self) {
        if let Some((note, last)) = self.held {
            if last.elapsed() > KEY_HOLD {
                self.held = None;
                self.note_off(note);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('z') => self.octave = (self.octave - 1).max(-1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(8),
            KeyCode::Char(' ') => {
                self.held = None;
                self.send(SynthMessage::ReleaseAll);
            }
            KeyCode::Left => self.bend(-1.0),
            KeyCode::Right => self.bend(1.0),
            KeyCode::Down => self.bend(0.0),
            KeyCode::Char(c) => {
                if let Some(note) = self.piano_note(c) {
                    self.play_key(note);
                }
            }
            _ => {}
        }
    }

    fn piano_note(&self, c: char) -> Option<u8> {
        let (_, offset) = PIANO_KEYS.iter().find(|(k, _)| *k == c)?;
        let note = (self.octave as i16 + 1) * 12 + *offset as i16;
        u8::try_from(note).ok().filter(|n| *n < 128)
    }

    fn play_key(&mut self, note: u8) {
        let now = Instant::now();
        match self.held {
            // Key repeat
            Some((held, _)) if held == note => {}
            Some((held, _)) => {
                self.note_off(held);
                self.note_on(note);
            }
            None => self.note_on(note),
        }
        self.held = Some((note, now));
    }

    fn note_on(&mut self, key: u8) {
        self.send_midi(MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity: 127,
        });
    }

    fn note_off(&mut self, key: u8) {
        self.send_midi(MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        });
    }

    fn bend(&mut self, value: f32) {
        // -8192..=8191
        let value = (value * 8191.0) as i16;
        self.send_midi(MidiEvent::PitchBend { channel: 0, value });
    }

    fn send_midi(&mut self, event: MidiEvent) {
        if let Some(msg) = midi_to_synth(event, 0, self.init.route) {
            self.send(msg);
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.tx.push(msg).is_err() {
            self.counters.add_dropped(1);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Min(8),    // Scope
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let status = Status {
            init: &self.init,
            octave: self.octave,
            held: self.held.map(|(note, _)| note),
            levels: Levels::from_buffer(&self.scope),
            dropped: self.counters.dropped(),
            stream_errors: self.counters.stream_errors(),
        };
        render_status(frame, chunks[0], &status);
        render_scope(frame, chunks[1], &self.scope);
        self.spectrum.render(frame, chunks[2]);

        let help = Paragraph::new(
            " [A-K] Play  [Z/X] Octave  [Left/Right/Down] Bend  [Space] Release all  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
