//! Spectrum widget
//!
//! Runs the library's FFT over the scope buffer and plots dBFS against a
//! log frequency axis.

use std::f64::consts::LN_10;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use synthvoice::dsp::analysis;

const MIN_DB: f64 = -100.0;
const MIN_FREQ: f64 = 20.0;

pub struct SpectrumView {
    sample_rate: f64,
    /// (log10 Hz, dBFS)
    points: Vec<(f64, f64)>,
    frame_counter: usize,
}

impl SpectrumView {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            points: Vec::new(),
            frame_counter: 0,
        }
    }

    /// Recompute from the latest scope samples, every other UI frame.
    pub fn update(&mut self, buffer: &[f32]) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        if self.frame_counter % 2 != 0 {
            return;
        }

        let samples: Vec<i16> = buffer
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect();
        let Some(bins) = analysis::spectrum(&samples, true, buffer.len()) else {
            self.points.clear();
            return;
        };

        let size = 2.0 * (bins.len() + 2) as f64;
        // Full-scale sine peaks at size/2 * i16::MAX
        let full_scale = (size / 2.0 * i16::MAX as f64).ln();

        self.points = bins
            .iter()
            .enumerate()
            .filter_map(|(i, &ln_mag)| {
                let freq = (i + 1) as f64 * self.sample_rate / size;
                (freq >= MIN_FREQ).then(|| {
                    let db = 20.0 * (ln_mag as f64 - full_scale) / LN_10;
                    (freq.log10(), db.max(MIN_DB))
                })
            })
            .collect();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&self.points);

        let min_log = MIN_FREQ.log10();
        let max_log = (self.sample_rate / 2.0).max(MIN_FREQ * 2.0).log10();
        let mid_hz = 10f64.powf((min_log + max_log) / 2.0);
        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([min_log, max_log])
                    .labels(vec![
                        Span::raw(hz_label(MIN_FREQ)),
                        Span::raw(hz_label(mid_hz)),
                        Span::raw(hz_label(self.sample_rate / 2.0)),
                    ])
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .bounds([MIN_DB, 0.0])
                    .labels(vec!["-100", "-50", "0"])
                    .style(Style::default().fg(Color::DarkGray)),
            );

        frame.render_widget(chart, area);
    }
}

fn hz_label(hz: f64) -> String {
    if hz >= 1000.0 {
        format!("{:.1}k", hz / 1000.0)
    } else {
        format!("{hz:.0}")
    }
}
