/// Keyboard commands accepted by the interactive loop: Enter toggles
/// listening, `s` saves the current session buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleListening,
    SaveSession,
}

pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "" => Some(Command::ToggleListening),
        "s" | "S" => Some(Command::SaveSession),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Start,
    Stop,
}

/// Strictly-alternating listening flag.
///
/// The flag only advances via `mark`, after the backend call succeeded, so a
/// failed start leaves the next toggle as a start again rather than issuing a
/// stop that was never preceded by a start.
#[derive(Debug, Default)]
pub struct ListenToggle {
    listening: bool,
}

impl ListenToggle {
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// What the next toggle should do, given the current state.
    pub fn next_action(&self) -> ToggleAction {
        if self.listening {
            ToggleAction::Stop
        } else {
            ToggleAction::Start
        }
    }

    /// Record that `action` completed successfully.
    pub fn mark(&mut self, action: ToggleAction) {
        self.listening = matches!(action, ToggleAction::Start);
    }
}
