use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vosk::{DecodingState, Model, Recognizer};

use super::SpeechBackend;
use crate::audio::MicCapture;
use crate::event::RecognitionEvent;

/// Offline adapter: microphone PCM into a vosk incremental decoder.
///
/// The model loads once up front; each `start` builds a fresh recognizer so
/// decoder state is reset between listening periods. Unlike the cloud
/// engine there is no engine-driven lifecycle, so session started/stopped
/// events are emitted synchronously with the local calls.
pub struct OfflineBackend {
    model: Arc<Model>,
    device_index: Option<usize>,
    sample_rate: u32,
    events: UnboundedSender<RecognitionEvent>,
    mic: Option<MicCapture>,
    decode_task: Option<JoinHandle<()>>,
}

impl OfflineBackend {
    pub fn new(
        model_dir: &Path,
        device_index: Option<usize>,
        sample_rate: u32,
        events: UnboundedSender<RecognitionEvent>,
    ) -> Result<Self> {
        let model = Model::new(model_dir.to_string_lossy())
            .ok_or_else(|| anyhow!("failed to load model from {}", model_dir.display()))?;

        info!("Offline model loaded: {}", model_dir.display());

        Ok(Self {
            model: Arc::new(model),
            device_index,
            sample_rate,
            events,
            mic: None,
            decode_task: None,
        })
    }
}

#[async_trait::async_trait]
impl SpeechBackend for OfflineBackend {
    async fn start(&mut self) -> Result<()> {
        if self.mic.is_some() {
            warn!("Offline recognition already started");
            return Ok(());
        }

        let mut recognizer = Recognizer::new(&self.model, self.sample_rate as f32)
            .ok_or_else(|| anyhow!("failed to create recognizer"))?;
        recognizer.set_max_alternatives(0);
        recognizer.set_words(true);

        let (audio_tx, audio_rx) = mpsc::unbounded_channel();
        let events = self.events.clone();
        let decode_task =
            tokio::task::spawn_blocking(move || decode_loop(recognizer, audio_rx, events));

        // Capture starts only after the decode task is ready to consume.
        let mic = MicCapture::start(
            self.device_index,
            self.sample_rate,
            audio_tx,
            self.events.clone(),
        )?;

        self.mic = Some(mic);
        self.decode_task = Some(decode_task);
        let _ = self.events.send(RecognitionEvent::SessionStarted);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mic) = self.mic.take() {
            // Joining the capture thread closes the sample channel, which
            // lets the decode task drain and exit.
            mic.stop();
        }
        if let Some(task) = self.decode_task.take() {
            if task.await.is_err() {
                warn!("Decode task panicked");
            }
        }
        let _ = self.events.send(RecognitionEvent::SessionStopped);
        Ok(())
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Push captured buffers through the decoder until the sample channel closes.
///
/// An utterance boundary yields the accumulated final text, otherwise the
/// current partial is reported. Decoder failures on a single buffer are
/// reported as cancellations and decoding continues with the next buffer.
fn decode_loop(
    mut recognizer: Recognizer,
    mut audio_rx: UnboundedReceiver<Vec<i16>>,
    events: UnboundedSender<RecognitionEvent>,
) {
    while let Some(samples) = audio_rx.blocking_recv() {
        match recognizer.accept_waveform(&samples) {
            Ok(DecodingState::Finalized) => {
                if let Some(result) = recognizer.result().single() {
                    let _ = events.send(RecognitionEvent::Final {
                        text: result.text.to_string(),
                        confidence: None,
                    });
                }
            }
            Ok(DecodingState::Running) => {
                let partial = recognizer.partial_result().partial.to_string();
                let _ = events.send(RecognitionEvent::Partial { text: partial });
            }
            Ok(DecodingState::Failed) => {
                let _ = events.send(RecognitionEvent::Canceled {
                    detail: "decoder failed on audio buffer".to_string(),
                });
            }
            Err(err) => {
                let _ = events.send(RecognitionEvent::Canceled {
                    detail: format!("decoder rejected audio buffer: {err}"),
                });
            }
        }
    }
}
