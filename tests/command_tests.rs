// Tests for keyboard command parsing and the listening toggle.

use dikte::command::{parse_command, Command, ListenToggle, ToggleAction};

#[test]
fn test_enter_toggles_listening() {
    assert_eq!(parse_command(""), Some(Command::ToggleListening));
    assert_eq!(parse_command("  "), Some(Command::ToggleListening));
}

#[test]
fn test_s_saves_session() {
    assert_eq!(parse_command("s"), Some(Command::SaveSession));
    assert_eq!(parse_command("S"), Some(Command::SaveSession));
    assert_eq!(parse_command(" s "), Some(Command::SaveSession));
}

#[test]
fn test_other_input_is_ignored() {
    assert_eq!(parse_command("q"), None);
    assert_eq!(parse_command("start"), None);
}

#[test]
fn test_toggle_strictly_alternates() {
    let mut toggle = ListenToggle::default();
    assert!(!toggle.is_listening());

    assert_eq!(toggle.next_action(), ToggleAction::Start);
    toggle.mark(ToggleAction::Start);
    assert!(toggle.is_listening());

    assert_eq!(toggle.next_action(), ToggleAction::Stop);
    toggle.mark(ToggleAction::Stop);
    assert!(!toggle.is_listening());

    assert_eq!(toggle.next_action(), ToggleAction::Start);
}

#[test]
fn test_failed_start_does_not_advance_to_stop() {
    // If the backend's start call fails, the state is never marked, so the
    // next toggle must try to start again rather than issuing a stop.
    let toggle = ListenToggle::default();

    assert_eq!(toggle.next_action(), ToggleAction::Start);
    // no mark: the start failed
    assert_eq!(toggle.next_action(), ToggleAction::Start);
}
