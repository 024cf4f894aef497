//! Keys as reported by a keydown source, named like DOM `KeyboardEvent.key`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    /// A printable character.
    Character(char),
    /// Any other named key (`"Shift"`, `"ArrowUp"`, ...).
    Named(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        if name == "Enter" {
            return Self::Enter;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::Character(c),
            _ => Self::Named(name.to_string()),
        }
    }

    pub fn is_enter(&self) -> bool {
        matches!(self, Self::Enter)
    }
}
