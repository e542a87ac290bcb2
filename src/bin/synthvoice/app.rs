//! Player - audio output and the threads that feed it

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleRate, StreamConfig,
};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use log::{info, warn};
use rtrb::{Consumer, RingBuffer};

use synthvoice::{
    synth::MessageReceiver, SynthConfig, SynthMessage, MAX_BLOCK_SIZE,
};

use super::{
    demo::Demo,
    midi,
    ui::{UiApp, UiInit},
};

/// Capacity of each control message queue
const MESSAGE_QUEUE: usize = 256;
/// Capacity of the scope sample queue
const SCOPE_QUEUE: usize = 8192;

/// Trouble seen while the terminal UI owns the screen.
///
/// Logging would write over the UI (and the audio callback must not block
/// on stderr), so the threads count instead and the status bar shows the
/// totals.
#[derive(Debug, Default)]
pub struct Counters {
    /// Control messages lost to a full queue or an unknown voice
    dropped: AtomicU64,
    stream_errors: AtomicU64,
}

impl Counters {
    pub fn add_dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn add_stream_error(&self) {
        self.stream_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_errors(&self) -> u64 {
        self.stream_errors.load(Ordering::Relaxed)
    }
}

/// Runs a demo on the default output device.
pub struct Player {
    demo: Demo,
    sample_rate: Option<u32>,
    midi_port: Option<String>,
    channel: u8,
}

impl Player {
    pub fn new(demo: Demo) -> Self {
        Self {
            demo,
            sample_rate: None,
            midi_port: None,
            channel: 0,
        }
    }

    /// Request a sample rate instead of the device default
    pub fn sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn midi_port(mut self, midi_port: Option<String>) -> Self {
        self.midi_port = midi_port;
        self
    }

    /// 0-based MIDI channel
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = self.stream_config(&device)?;

        let device_channels = stream_config.channels as usize;
        let synth_config = SynthConfig::new(stream_config.sample_rate.0, device_channels.min(2) as u16)
            .wrap_err("unsupported output configuration")?;
        info!(
            "output: {} Hz, {} channels",
            synth_config.sample_rate(),
            device_channels
        );

        let setup = self.demo.build(synth_config)?;
        let mut synth = setup.synth;

        let (ui_tx, ui_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE);
        let (midi_tx, midi_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE);
        let counters = Arc::new(Counters::default());

        // Kept alive until run returns
        let _midi = match &self.midi_port {
            Some(name) => Some(midi::connect(
                name,
                self.channel,
                setup.route,
                midi_tx,
                Arc::clone(&counters),
            )?),
            None => None,
        };

        let mut inbox = Inbox {
            ui: ui_rx,
            midi: midi_rx,
        };
        let synth_channels = synth_config.channel_count() as usize;
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE * synth_channels];
        let audio_counters = Arc::clone(&counters);
        let error_counters = Arc::clone(&counters);
        let mut dropped_seen = 0u64;

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                let total_frames = data.len() / device_channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let rendered = &mut block[..frames * synth_channels];
                    synth.render_from(&mut inbox, rendered);
                    let dropped = synth.dropped_messages();
                    if dropped > dropped_seen {
                        audio_counters.add_dropped(dropped - dropped_seen);
                        dropped_seen = dropped;
                    }

                    let out_off = frames_written * device_channels;
                    for (i, frame) in rendered.chunks_exact(synth_channels).enumerate() {
                        let out = &mut data[out_off + i * device_channels..][..device_channels];
                        for (ch, sample) in out.iter_mut().enumerate() {
                            // Mono goes everywhere; stereo fills the first two channels
                            *sample = if synth_channels == 1 {
                                frame[0]
                            } else {
                                frame.get(ch).copied().unwrap_or(0.0)
                            };
                        }

                        // Scope gets a mono mix; drop samples when the UI lags
                        let mono = frame.iter().sum::<f32>() / synth_channels as f32;
                        let _ = scope_tx.push(mono);
                    }

                    frames_written += frames;
                }
            },
            move |_err| error_counters.add_stream_error(),
            None,
        )?;

        stream.play().wrap_err("failed to start audio stream")?;

        let init = UiInit {
            demo: self.demo.name(),
            labels: setup.labels,
            route: setup.route,
            autoplay: setup.autoplay,
            sample_rate: synth_config.sample_rate(),
            midi_port: self.midi_port.clone(),
        };

        let mut terminal = ratatui::init();
        let result = UiApp::new(init, scope_rx, ui_tx, counters).run(&mut terminal);
        ratatui::restore();
        result
    }

    fn stream_config(&self, device: &cpal::Device) -> EyreResult<StreamConfig> {
        let default = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let Some(rate) = self.sample_rate else {
            return Ok(default.into());
        };

        let supported = device
            .supported_output_configs()
            .wrap_err("failed to query output configs")?
            .filter(|range| range.sample_format() == default.sample_format())
            .find(|range| {
                range.min_sample_rate().0 <= rate && rate <= range.max_sample_rate().0
            });

        match supported {
            Some(range) => Ok(range.with_sample_rate(SampleRate(rate)).into()),
            None => {
                warn!(
                    "{rate} Hz not supported, using {} Hz",
                    default.sample_rate().0
                );
                Ok(default.into())
            }
        }
    }
}

/// Both control queues, drained by the audio callback.
struct Inbox {
    ui: Consumer<SynthMessage>,
    midi: Consumer<SynthMessage>,
}

impl MessageReceiver for Inbox {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.ui.pop().ok().or_else(|| self.midi.pop().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_add_up_across_threads() {
        let counters = Arc::new(Counters::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        counters.add_dropped(1);
                    }
                    counters.add_stream_error();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.dropped(), 400);
        assert_eq!(counters.stream_errors(), 4);
    }
}
