use anyhow::{Context, Result};
use bytes::{BufMut, Bytes, BytesMut};
use deepgram::common::options::{Encoding, Language, Model, Options};
use deepgram::common::stream_response::{Channel, StreamResponse};
use deepgram::Deepgram;
use futures::channel::mpsc::{self as futures_mpsc, Receiver as FuturesReceiver};
use futures::{SinkExt, TryStreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::SpeechBackend;
use crate::audio::MicCapture;
use crate::event::RecognitionEvent;

/// Cloud adapter: default microphone into a deepgram live-streaming session.
///
/// Session lifecycle follows the engine, not the local calls: the session
/// flag is raised when the streaming connection is established and cleared
/// when the response stream ends, which may lag `start`/`stop`.
pub struct CloudBackend {
    api_key: String,
    api_url: String,
    sample_rate: u32,
    events: UnboundedSender<RecognitionEvent>,
    mic: Option<MicCapture>,
    task: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl CloudBackend {
    pub fn new(
        api_key: String,
        api_url: String,
        sample_rate: u32,
        events: UnboundedSender<RecognitionEvent>,
    ) -> Self {
        Self {
            api_key,
            api_url,
            sample_rate,
            events,
            mic: None,
            task: None,
            shutdown: None,
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for CloudBackend {
    async fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            warn!("Cloud recognition already started");
            return Ok(());
        }

        let (audio_tx, audio_rx) = mpsc::unbounded_channel();
        let mic = MicCapture::start(None, self.sample_rate, audio_tx, self.events.clone())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_stream(
            self.api_key.clone(),
            self.api_url.clone(),
            self.sample_rate,
            audio_rx,
            self.events.clone(),
            shutdown_rx,
        ));

        self.mic = Some(mic);
        self.task = Some(task);
        self.shutdown = Some(shutdown_tx);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mic) = self.mic.take() {
            mic.stop();
        }
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                warn!("Cloud streaming task panicked");
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "cloud"
    }
}

async fn run_stream(
    api_key: String,
    api_url: String,
    sample_rate: u32,
    audio_rx: UnboundedReceiver<Vec<i16>>,
    events: UnboundedSender<RecognitionEvent>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    if let Err(err) = stream_recognition(
        api_key,
        api_url,
        sample_rate,
        audio_rx,
        events.clone(),
        shutdown_rx,
    )
    .await
    {
        let _ = events.send(RecognitionEvent::Canceled {
            detail: format!("cloud stream failed: {err:#}"),
        });
    }
}

async fn stream_recognition(
    api_key: String,
    api_url: String,
    sample_rate: u32,
    audio_rx: UnboundedReceiver<Vec<i16>>,
    events: UnboundedSender<RecognitionEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    let client = Deepgram::with_base_url_and_api_key(api_url.as_str(), api_key.as_str())
        .context("Failed to create streaming client")?;

    let options = Options::builder()
        .model(Model::Nova2)
        .language(Language::tr)
        .smart_format(true)
        .build();

    let mut responses = client
        .transcription()
        .stream_request_with_options(options)
        .keep_alive()
        .encoding(Encoding::Linear16)
        .sample_rate(sample_rate)
        .channels(1)
        .stream(pcm_stream(audio_rx))
        .await
        .context("Failed to open streaming session")?;

    info!("Cloud streaming session opened");
    let _ = events.send(RecognitionEvent::SessionStarted);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            response = responses.try_next() => match response {
                Ok(Some(response)) => handle_response(response, &events),
                Ok(None) => break,
                Err(err) => {
                    let _ = events.send(RecognitionEvent::Canceled {
                        detail: format!("recognition canceled: {err}"),
                    });
                    break;
                }
            },
        }
    }

    info!("Cloud streaming session closed");
    let _ = events.send(RecognitionEvent::SessionStopped);
    Ok(())
}

fn handle_response(response: StreamResponse, events: &UnboundedSender<RecognitionEvent>) {
    if let StreamResponse::TranscriptResponse {
        is_final, channel, ..
    } = response
    {
        let Some((text, confidence)) = top_alternative(&channel) else {
            return;
        };

        let event = if is_final {
            RecognitionEvent::Final {
                text,
                confidence: Some(confidence),
            }
        } else {
            RecognitionEvent::Partial { text }
        };
        let _ = events.send(event);
    }
}

/// Text and confidence of the engine's top alternative, absent when the
/// response carries no alternatives at all.
pub fn top_alternative(channel: &Channel) -> Option<(String, f32)> {
    channel
        .alternatives
        .first()
        .map(|alt| (alt.transcript.clone(), alt.confidence as f32))
}

/// Pack captured i16 buffers into little-endian PCM bytes for the request.
fn pcm_stream(
    mut audio_rx: UnboundedReceiver<Vec<i16>>,
) -> FuturesReceiver<Result<Bytes, std::io::Error>> {
    let (mut tx, rx) = futures_mpsc::channel(1);

    tokio::spawn(async move {
        while let Some(samples) = audio_rx.recv().await {
            let mut bytes = BytesMut::with_capacity(samples.len() * 2);
            for sample in samples {
                bytes.put_i16_le(sample);
            }
            if tx.send(Ok(bytes.freeze())).await.is_err() {
                break;
            }
        }
    });

    rx
}
