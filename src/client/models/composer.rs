/// Text input of the chat view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    input: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Trimmed text to send, `None` when only whitespace was typed.
    pub fn outgoing(&self) -> Option<&str> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }
}
