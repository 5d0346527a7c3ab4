use crate::alarm::ToneEmitter;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use log::{debug, warn};
use std::error::Error;
use std::thread::{self, sleep, JoinHandle};
use std::time::Duration;

/// Fixed-frequency alarm tone played on a background thread so the frame
/// loop never waits on audio. At most one tone thread runs at a time; the
/// thread is fire-and-forget and playback errors only get logged.
pub struct AlarmTone {
    frequency_hz: f32,
    duration: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AlarmTone {
    pub fn new(frequency_hz: f32, duration: Duration) -> Self {
        AlarmTone {
            frequency_hz,
            duration,
            handle: None,
        }
    }
}

impl ToneEmitter for AlarmTone {
    fn trigger(&mut self) {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                debug!("Tone already playing, not starting another");
                return;
            }
        }
        let frequency_hz = self.frequency_hz;
        let duration = self.duration;
        self.handle = Some(thread::spawn(move || {
            if let Err(e) = play_tone(frequency_hz, duration) {
                warn!("Tone playback error {:?}", e);
            }
        }));
    }
}

/// Builds an output stream producing a sine wave and holds it open for the
/// requested duration. Runs to completion, no cancellation.
fn play_tone(frequency_hz: f32, duration: Duration) -> Result<(), Box<dyn Error>> {
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        None => return Err("No output device available".into()),
        Some(device) => device,
    };
    let supported = device.default_output_config()?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err("Unsupported output sample format".into());
    }
    let config: cpal::StreamConfig = supported.into();
    debug!("Tone output config: {:?}", config);

    let sample_rate = config.sample_rate.0 as f32;
    let channels = config.channels as usize;
    let mut clock = 0f32;

    let err_fn = |err| warn!("An error occurred on the output stream: {}", err);

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                clock = (clock + 1.0) % sample_rate;
                let value = (clock * frequency_hz * 2.0 * std::f32::consts::PI / sample_rate).sin() * 0.5;
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;
    sleep(duration);
    Ok(())
}
