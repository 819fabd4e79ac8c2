use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::logger::LineLogger;
use crate::session::SessionBuffer;

/// Engine-agnostic recognition events.
///
/// Each backend adapter owns its engine's native callbacks and translates
/// them into this one variant set, pushed onto an unbounded channel. The
/// dispatcher below is the only consumer, which keeps engine specifics out
/// of the command loop.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    Final {
        text: String,
        confidence: Option<f32>,
    },
    Partial {
        text: String,
    },
    SessionStarted,
    SessionStopped,
    Canceled {
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Recognized,
    Partial,
}

/// One formatted recognition result, immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionLine {
    pub timestamp: DateTime<Local>,
    pub kind: LineKind,
    pub text: String,
    pub confidence: Option<f32>,
}

impl RecognitionLine {
    pub fn now(kind: LineKind, text: String, confidence: Option<f32>) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            text,
            confidence,
        }
    }

    /// `[HH:MM:SS] (Conf: 0.93) Recognized: "..."`, confidence segment
    /// omitted when the engine did not report one.
    pub fn render(&self) -> String {
        let stamp = self.timestamp.format("%H:%M:%S");
        let label = match self.kind {
            LineKind::Recognized => "Recognized",
            LineKind::Partial => "Partial",
        };

        match self.confidence {
            Some(confidence) => {
                format!("[{stamp}] (Conf: {confidence:.2}) {label}: \"{}\"", self.text)
            }
            None => format!("[{stamp}] {label}: \"{}\"", self.text),
        }
    }
}

/// Trimmed text worth emitting, or `None` for empty/whitespace-only results.
pub fn printable(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Drains the event channel until every sender is gone.
///
/// Final/partial results become formatted lines on the console, the
/// recognized log, and (while a session is active) the session buffer.
/// Lifecycle events toggle the session flag; cancellations are logged and
/// the loop keeps running, so one bad event never takes the process down.
pub async fn dispatch_events(
    mut events: UnboundedReceiver<RecognitionEvent>,
    logger: Arc<LineLogger>,
    session: Arc<SessionBuffer>,
) {
    while let Some(event) = events.recv().await {
        match event {
            RecognitionEvent::Final { text, confidence } => {
                emit_line(LineKind::Recognized, &text, confidence, &logger, &session);
            }
            RecognitionEvent::Partial { text } => {
                emit_line(LineKind::Partial, &text, None, &logger, &session);
            }
            RecognitionEvent::SessionStarted => {
                session.set_active(true);
                info!("Recognition session started");
            }
            RecognitionEvent::SessionStopped => {
                session.set_active(false);
                info!("Recognition session stopped");
            }
            RecognitionEvent::Canceled { detail } => {
                error!("Recognition canceled: {detail}");
                logger.error(&detail);
            }
        }
    }
}

fn emit_line(
    kind: LineKind,
    text: &str,
    confidence: Option<f32>,
    logger: &LineLogger,
    session: &SessionBuffer,
) {
    let Some(text) = printable(text) else {
        return;
    };

    let line = RecognitionLine::now(kind, text.to_string(), confidence);
    let rendered = line.render();

    println!("{rendered}");
    logger.recognized(&rendered);
    session.append(&rendered);
}
