use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;

#[derive(Default)]
struct Inner {
    active: bool,
    lines: Vec<String>,
}

/// Ordered buffer of recognized lines for the current session.
///
/// One lock guards both the active flag and the line list; backend callback
/// tasks append while the command loop reads and saves. Nothing else crosses
/// threads.
#[derive(Default)]
pub struct SessionBuffer {
    inner: Mutex<Inner>,
}

impl SessionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&self, active: bool) {
        self.lock().active = active;
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Append a line; ignored while no session is active.
    pub fn append(&self, line: &str) {
        let mut inner = self.lock();
        if inner.active {
            inner.lines.push(line.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Write the buffered lines to `logs_dir/session-<timestamp>.txt`.
    ///
    /// Saving is a snapshot, not a drain: the buffer is left untouched, so
    /// repeated saves accumulate everything recognized so far.
    pub fn save(&self, logs_dir: &Path) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = logs_dir.join(format!("session-{stamp}.txt"));

        let lines = self.snapshot();
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session file: {}", path.display()))?;

        Ok(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
