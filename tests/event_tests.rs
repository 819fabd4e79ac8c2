// Tests for line formatting, suppression, and the event dispatcher.

use std::fs;
use std::sync::Arc;

use dikte::event::{dispatch_events, printable, LineKind, RecognitionEvent, RecognitionLine};
use dikte::logger::LineLogger;
use dikte::session::SessionBuffer;
use tempfile::TempDir;
use tokio::sync::mpsc;

#[test]
fn test_render_with_confidence() {
    let line = RecognitionLine::now(LineKind::Recognized, "merhaba".to_string(), Some(0.93));
    let rendered = line.render();

    assert!(rendered.contains("(Conf: 0.93)"), "got: {rendered}");
    assert!(rendered.contains("Recognized: \"merhaba\""));
    assert!(rendered.starts_with('['));
}

#[test]
fn test_render_without_confidence() {
    let line = RecognitionLine::now(LineKind::Partial, "mer".to_string(), None);
    let rendered = line.render();

    assert!(!rendered.contains("Conf"), "got: {rendered}");
    assert!(rendered.contains("Partial: \"mer\""));
}

#[test]
fn test_printable_suppresses_blank_text() {
    assert_eq!(printable("merhaba"), Some("merhaba"));
    assert_eq!(printable("  merhaba  "), Some("merhaba"));
    assert_eq!(printable(""), None);
    assert_eq!(printable("   \t"), None);
}

#[tokio::test]
async fn test_dispatcher_buffers_lines_while_session_active() {
    let temp = TempDir::new().unwrap();
    let logger = Arc::new(LineLogger::new(temp.path()));
    let session = Arc::new(SessionBuffer::new());

    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = tokio::spawn(dispatch_events(rx, Arc::clone(&logger), Arc::clone(&session)));

    // Before the session starts, lines go to the log but not the buffer.
    tx.send(RecognitionEvent::Final {
        text: "before".to_string(),
        confidence: Some(0.5),
    })
    .unwrap();

    tx.send(RecognitionEvent::SessionStarted).unwrap();
    tx.send(RecognitionEvent::Final {
        text: "merhaba".to_string(),
        confidence: Some(0.9),
    })
    .unwrap();
    tx.send(RecognitionEvent::Partial {
        text: "dun".to_string(),
    })
    .unwrap();
    tx.send(RecognitionEvent::Final {
        text: "   ".to_string(),
        confidence: None,
    })
    .unwrap();
    tx.send(RecognitionEvent::SessionStopped).unwrap();
    tx.send(RecognitionEvent::Final {
        text: "after".to_string(),
        confidence: None,
    })
    .unwrap();

    drop(tx);
    dispatcher.await.unwrap();

    let lines = session.snapshot();
    assert_eq!(lines.len(), 2, "blank text suppressed, inactive ignored");
    assert!(lines[0].contains("Recognized: \"merhaba\""));
    assert!(lines[1].contains("Partial: \"dun\""));

    let log = fs::read_to_string(logger.recognized_path()).unwrap();
    assert!(log.contains("\"before\""));
    assert!(log.contains("\"merhaba\""));
    assert!(log.contains("\"after\""));
}

#[tokio::test]
async fn test_canceled_is_logged_and_does_not_stop_dispatch() {
    let temp = TempDir::new().unwrap();
    let logger = Arc::new(LineLogger::new(temp.path()));
    let session = Arc::new(SessionBuffer::new());

    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = tokio::spawn(dispatch_events(rx, Arc::clone(&logger), Arc::clone(&session)));

    tx.send(RecognitionEvent::SessionStarted).unwrap();
    tx.send(RecognitionEvent::Canceled {
        detail: "transport failure".to_string(),
    })
    .unwrap();
    tx.send(RecognitionEvent::Final {
        text: "devam".to_string(),
        confidence: None,
    })
    .unwrap();

    drop(tx);
    dispatcher.await.unwrap();

    // A cancellation alone does not end the session; the engine's stopped
    // event does that separately.
    assert!(session.is_active());
    assert_eq!(session.len(), 1);

    let errors = fs::read_to_string(logger.error_path()).unwrap();
    assert!(errors.contains("transport failure"));
}
