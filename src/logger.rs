use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Best-effort line logger for the two flat log files next to the binary.
///
/// Logging must never mask the failure being logged, so every write error is
/// swallowed. Both files are append-only and never truncated during a run.
pub struct LineLogger {
    recognized_path: PathBuf,
    error_path: PathBuf,
}

impl LineLogger {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            recognized_path: base_dir.join("recognized_log.txt"),
            error_path: base_dir.join("error_log.txt"),
        }
    }

    /// Append an already-formatted recognition line.
    pub fn recognized(&self, line: &str) {
        append_line(&self.recognized_path, line);
    }

    /// Append a timestamped error entry.
    pub fn error(&self, detail: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        append_line(&self.error_path, &format!("[{stamp}] {detail}"));
    }

    /// Append an error with its full source chain as one block.
    pub fn error_chain(&self, err: &anyhow::Error) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut block = format!("[{stamp}] {err}");
        for cause in err.chain().skip(1) {
            block.push_str(&format!("\n  caused by: {cause}"));
        }
        append_line(&self.error_path, &block);
    }

    pub fn recognized_path(&self) -> &Path {
        &self.recognized_path
    }

    pub fn error_path(&self) -> &Path {
        &self.error_path
    }
}

fn append_line(path: &Path, line: &str) {
    let _ = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{line}"));
}
