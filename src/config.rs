use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Sample rate both engines consume (16-bit mono PCM).
pub const SAMPLE_RATE: u32 = 16_000;

/// Recognition language, fixed to Turkish.
pub const LANGUAGE: &str = "tr";

const API_KEY_VAR: &str = "DEEPGRAM_API_KEY";
const API_URL_VAR: &str = "DEEPGRAM_API_URL";
const MODEL_VAR: &str = "VOSK_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("offline model directory not found: {0}")]
    ModelDirMissing(PathBuf),
}

/// Which recognition engine to run. Resolved once at startup, never swapped.
#[derive(Debug, Clone)]
pub enum BackendMode {
    Cloud { api_key: String, api_url: String },
    Offline { model_dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: BackendMode,
    pub sample_rate: u32,
}

impl AppConfig {
    /// One-shot resolution from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = base_dir();
        Self::resolve(
            env::var(API_KEY_VAR).ok(),
            env::var(API_URL_VAR).ok(),
            env::var(MODEL_VAR).ok(),
            &base,
        )
    }

    /// Cloud mode requires both credentials present and non-blank; anything
    /// else falls back to offline mode, which requires an existing model
    /// directory (`VOSK_MODEL` override, or `models/tr` next to the binary).
    pub fn resolve(
        api_key: Option<String>,
        api_url: Option<String>,
        model_override: Option<String>,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let mode = match (non_blank(api_key), non_blank(api_url)) {
            (Some(api_key), Some(api_url)) => BackendMode::Cloud { api_key, api_url },
            _ => {
                let model_dir = non_blank(model_override)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| base_dir.join("models").join(LANGUAGE));

                if !model_dir.is_dir() {
                    return Err(ConfigError::ModelDirMissing(model_dir));
                }

                BackendMode::Offline { model_dir }
            }
        };

        Ok(Self {
            mode,
            sample_rate: SAMPLE_RATE,
        })
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self.mode, BackendMode::Cloud { .. })
    }
}

/// Directory of the running executable; log files and the default model
/// directory live next to the binary.
pub fn base_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
