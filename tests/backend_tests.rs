// Tests for cloud response extraction.
//
// The engine's response types deserialize from the wire payload, so these
// tests build channels from JSON the way the service sends them.

use deepgram::common::stream_response::Channel;
use dikte::backend::top_alternative;

fn channel_from(json: &str) -> Channel {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_top_alternative_returns_confidence() {
    let channel = channel_from(
        r#"{"alternatives": [
            {"transcript": "merhaba", "confidence": 0.93, "words": []},
            {"transcript": "merhabalar", "confidence": 0.41, "words": []}
        ]}"#,
    );

    let (text, confidence) = top_alternative(&channel).unwrap();
    assert_eq!(text, "merhaba");
    assert!((confidence - 0.93).abs() < 1e-6);
}

#[test]
fn test_empty_alternatives_is_absent_not_an_error() {
    let channel = channel_from(r#"{"alternatives": []}"#);

    assert!(top_alternative(&channel).is_none());
}

#[test]
fn test_malformed_payload_fails_deserialization_cleanly() {
    // A payload that does not match the schema never reaches extraction;
    // deserialization fails without panicking and the response is dropped.
    let result = serde_json::from_str::<Channel>(r#"{"alternatives": "nope"}"#);
    assert!(result.is_err());
}
