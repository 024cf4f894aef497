//! Single-line input control.

pub trait InputControl {
    /// Current, not yet submitted buffer.
    fn value(&self) -> String;
    fn clear(&mut self);
}

/// In-memory editable line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    buffer: String,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
    }

    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl InputControl for TextInput {
    fn value(&self) -> String {
        self.buffer.clone()
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
