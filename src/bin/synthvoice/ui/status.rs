//! Status bar - demo, keyboard octave, held note and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiInit;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Peak and RMS of the scope buffer
pub struct Levels {
    pub peak: f32,
    pub rms: f32,
}

impl Levels {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// "C4" for 60.
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

pub struct Status<'a> {
    pub init: &'a UiInit,
    pub octave: i8,
    pub held: Option<u8>,
    pub levels: Levels,
    pub dropped: u64,
    pub stream_errors: u64,
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default()
        .title(format!(" synthvoice: {} ", status.init.demo))
        .borders(Borders::ALL);

    let held = status
        .held
        .map(note_name)
        .unwrap_or_else(|| "-".to_string());
    let midi = status.init.midi_port.as_deref().unwrap_or("off");

    let mut spans = vec![
        Span::styled(
            format!(" {}  ", status.init.labels.join(" | ")),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Octave {}  Note {held:<4} ", status.octave),
            Style::default().fg(if status.held.is_some() {
                Color::Green
            } else {
                Color::White
            }),
        ),
        Span::styled(
            format!("MIDI: {midi}  "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:.1}kHz  ", status.init.sample_rate as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", status.levels.peak, status.levels.rms),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if status.dropped > 0 || status.stream_errors > 0 {
        spans.push(Span::styled(
            format!("  Dropped: {}  Stream errors: {}", status.dropped, status.stream_errors),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
