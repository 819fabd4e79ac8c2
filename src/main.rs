use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use dikte::audio;
use dikte::backend;
use dikte::command::{parse_command, Command, ListenToggle, ToggleAction};
use dikte::config::{base_dir, AppConfig, BackendMode, ConfigError};
use dikte::event::dispatch_events;
use dikte::logger::LineLogger;
use dikte::session::SessionBuffer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let base = base_dir();
    let logger = Arc::new(LineLogger::new(&base));

    match run(&base, Arc::clone(&logger)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::ModelDirMissing(dir)) => {
                println!("Offline model not found: {}", dir.display());
                println!(
                    "Download a Turkish model (e.g. vosk-model-small-tr-0.3) and extract it \
                     to models/tr next to the binary, or point VOSK_MODEL at it."
                );
                ExitCode::from(2)
            }
            None => {
                logger.error_chain(&err);
                eprintln!("An error occurred. Details are in error_log.txt.");
                ExitCode::from(1)
            }
        },
    }
}

async fn run(base: &Path, logger: Arc<LineLogger>) -> Result<()> {
    let config = AppConfig::from_env()?;

    let logs_dir = base.join("logs");
    std::fs::create_dir_all(&logs_dir).context("Failed to create logs directory")?;

    let session = Arc::new(SessionBuffer::new());
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(dispatch_events(
        event_rx,
        Arc::clone(&logger),
        Arc::clone(&session),
    ));

    // Offline mode prompts for a device; cloud always uses the default mic.
    let device_index = match &config.mode {
        BackendMode::Cloud { .. } => {
            println!("Cloud mode ready. Enter: start/stop, 's': save session");
            None
        }
        BackendMode::Offline { model_dir } => {
            println!("No cloud credentials found. Falling back to offline mode.");
            info!("Offline model directory: {}", model_dir.display());
            let index = prompt_device_index();
            println!("Offline mode ready. Enter: start/stop, 's': save session");
            index
        }
    };

    let mut backend = backend::create_backend(&config, device_index, event_tx)?;
    info!("Active backend: {}", backend.name());

    let mut input_rx = spawn_input_thread();
    let mut toggle = ListenToggle::default();

    loop {
        match input_rx.try_recv() {
            Ok(line) => match parse_command(&line) {
                Some(Command::ToggleListening) => match toggle.next_action() {
                    ToggleAction::Start => match backend.start().await {
                        Ok(()) => {
                            toggle.mark(ToggleAction::Start);
                            println!("Listening: ON");
                        }
                        Err(err) => logger.error_chain(&err),
                    },
                    ToggleAction::Stop => match backend.stop().await {
                        Ok(()) => {
                            toggle.mark(ToggleAction::Stop);
                            println!("Listening: OFF");
                        }
                        Err(err) => logger.error_chain(&err),
                    },
                },
                Some(Command::SaveSession) => match session.save(&logs_dir) {
                    Ok(path) => println!("Session saved: {}", path.display()),
                    Err(err) => logger.error_chain(&err),
                },
                None => {}
            },
            // No quit command: keep polling until the process is interrupted,
            // even after stdin closes.
            Err(_) => {}
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// List input devices and ask for an index; Enter or anything unparseable
/// falls back to the default device.
fn prompt_device_index() -> Option<usize> {
    let devices = audio::list_input_devices().unwrap_or_default();

    println!("Available microphone devices:");
    for device in &devices {
        println!("[{}] {}", device.index, device.name);
    }

    print!("Microphone device number (Enter=0): ");
    std::io::stdout().flush().ok();

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok();

    line.trim()
        .parse::<usize>()
        .ok()
        .filter(|index| *index < devices.len())
}

/// Forward stdin lines into a channel the loop can poll without blocking.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    rx
}
