pub mod audio;
pub mod backend;
pub mod command;
pub mod config;
pub mod event;
pub mod logger;
pub mod session;

pub use backend::{create_backend, SpeechBackend};
pub use command::{parse_command, Command, ListenToggle, ToggleAction};
pub use config::{base_dir, AppConfig, BackendMode, ConfigError};
pub use event::{dispatch_events, printable, LineKind, RecognitionEvent, RecognitionLine};
pub use logger::LineLogger;
pub use session::SessionBuffer;
