use std::time::Duration;
use tokio::time::Instant;

/// Sender-side typing state: a keystroke starts typing, an idle window or a send stops it.
#[derive(Debug)]
pub struct TypingDebouncer {
    idle: Duration,
    last_keystroke: Option<Instant>,
}

/// What the caller should emit after feeding the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingAction {
    Typing,
    StopTyping,
    Nothing,
}

impl TypingDebouncer {
    pub fn new(idle: Duration) -> Self {
        Self { idle, last_keystroke: None }
    }

    /// Every keystroke emits a typing signal and restarts the idle window.
    pub fn keystroke(&mut self, now: Instant) -> TypingAction {
        self.last_keystroke = Some(now);
        TypingAction::Typing
    }

    /// Periodic check; emits stop once the idle window elapsed.
    pub fn tick(&mut self, now: Instant) -> TypingAction {
        match self.last_keystroke {
            Some(last) if now.duration_since(last) >= self.idle => {
                self.last_keystroke = None;
                TypingAction::StopTyping
            }
            _ => TypingAction::Nothing,
        }
    }

    /// A send ends typing immediately.
    pub fn sent(&mut self) -> TypingAction {
        if self.last_keystroke.take().is_some() {
            TypingAction::StopTyping
        } else {
            TypingAction::Nothing
        }
    }

    /// Deadline of the pending stop, if typing.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_keystroke.map(|last| last + self.idle)
    }

    pub fn reset(&mut self) {
        self.last_keystroke = None;
    }
}
