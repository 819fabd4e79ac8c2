use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::event::RecognitionEvent;

#[derive(Debug, Clone)]
pub struct InputDevice {
    pub index: usize,
    pub name: String,
}

/// Enumerate microphone devices for the startup prompt.
pub fn list_input_devices() -> Result<Vec<InputDevice>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .context("Failed to enumerate input devices")?;

    Ok(devices
        .enumerate()
        .map(|(index, device)| InputDevice {
            index,
            name: device
                .name()
                .unwrap_or_else(|_| "(unknown device)".to_string()),
        })
        .collect())
}

/// Microphone capture running on a dedicated thread.
///
/// cpal streams are not `Send`, so the stream lives on its own thread for its
/// whole lifetime; captured buffers are forwarded as 16-bit mono PCM over the
/// given channel. Stream errors after startup are reported through the event
/// channel as cancellations.
pub struct MicCapture {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MicCapture {
    /// Open the device (`None` = system default) and start capturing.
    ///
    /// Blocks until the capture thread reports that the stream is playing, so
    /// setup failures surface here rather than being lost on the thread.
    pub fn start(
        device_index: Option<usize>,
        sample_rate: u32,
        samples: UnboundedSender<Vec<i16>>,
        events: UnboundedSender<RecognitionEvent>,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<String>>();

        let thread = std::thread::spawn(move || {
            match open_stream(device_index, sample_rate, samples, events) {
                Ok((name, stream)) => {
                    let _ = ready_tx.send(Ok(name));
                    while !stop_flag.load(Ordering::Acquire) {
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    drop(stream);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            }
        });

        match ready_rx.recv() {
            Ok(Ok(name)) => {
                info!("Microphone capture started: {name}");
                Ok(Self {
                    stop,
                    thread: Some(thread),
                })
            }
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => Err(anyhow!("capture thread exited before reporting status")),
        }
    }

    /// Stop capturing and wait for the stream to tear down.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Capture thread panicked during shutdown");
            }
        }
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_stream(
    device_index: Option<usize>,
    sample_rate: u32,
    samples: UnboundedSender<Vec<i16>>,
    events: UnboundedSender<RecognitionEvent>,
) -> Result<(String, cpal::Stream)> {
    let host = cpal::default_host();

    let device = match device_index {
        Some(index) => host
            .input_devices()
            .context("Failed to enumerate input devices")?
            .nth(index)
            .ok_or_else(|| anyhow!("no input device at index {index}"))?,
        None => host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device"))?,
    };

    let name = device
        .name()
        .unwrap_or_else(|_| "(unknown device)".to_string());

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let sample_format = device
        .default_input_config()
        .map(|c| c.sample_format())
        .unwrap_or(cpal::SampleFormat::I16);

    let make_err_fn = || {
        let events = events.clone();
        move |err: cpal::StreamError| {
            let _ = events.send(RecognitionEvent::Canceled {
                detail: format!("microphone stream error: {err}"),
            });
        }
    };

    let stream = match sample_format {
        cpal::SampleFormat::I16 => {
            let samples = samples.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let _ = samples.send(data.to_vec());
                },
                make_err_fn(),
                None,
            )
        }
        // Convert anything else through f32, cpal's common denominator.
        _ => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let converted: Vec<i16> = data
                    .iter()
                    .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                    .collect();
                let _ = samples.send(converted);
            },
            make_err_fn(),
            None,
        ),
    }
    .with_context(|| format!("Failed to open input stream on {name}"))?;

    stream
        .play()
        .with_context(|| format!("Failed to start input stream on {name}"))?;

    Ok((name, stream))
}
