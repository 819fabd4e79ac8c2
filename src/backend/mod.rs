//! Recognition backend adapters.
//!
//! Exactly one backend is active per run, selected once at startup:
//! - Cloud: deepgram live streaming over the default microphone
//! - Offline: vosk incremental decoding over a selectable microphone
//!
//! Both translate their engine's native callbacks into `RecognitionEvent`s.

mod cloud;
mod offline;

pub use cloud::{top_alternative, CloudBackend};
pub use offline::OfflineBackend;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::{AppConfig, BackendMode};
use crate::event::RecognitionEvent;

#[async_trait::async_trait]
pub trait SpeechBackend: Send {
    /// Begin continuous recognition. Idempotent while already running.
    async fn start(&mut self) -> Result<()>;

    /// End recognition and wait for in-flight work to drain.
    async fn stop(&mut self) -> Result<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Build the backend selected by configuration.
pub fn create_backend(
    config: &AppConfig,
    device_index: Option<usize>,
    events: UnboundedSender<RecognitionEvent>,
) -> Result<Box<dyn SpeechBackend>> {
    match &config.mode {
        BackendMode::Cloud { api_key, api_url } => Ok(Box::new(CloudBackend::new(
            api_key.clone(),
            api_url.clone(),
            config.sample_rate,
            events,
        ))),
        BackendMode::Offline { model_dir } => Ok(Box::new(OfflineBackend::new(
            model_dir,
            device_index,
            config.sample_rate,
            events,
        )?)),
    }
}
