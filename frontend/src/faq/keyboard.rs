#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Next,
    Previous,
    First,
    Last,
}

/// What a keydown on a focused question asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(FocusDirection),
    Toggle,
}

impl KeyAction {
    /// Maps a `KeyboardEvent.key` value. Unlisted keys keep their browser default.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" => Some(Self::Move(FocusDirection::Next)),
            "ArrowUp" => Some(Self::Move(FocusDirection::Previous)),
            "Home" => Some(Self::Move(FocusDirection::First)),
            "End" => Some(Self::Move(FocusDirection::Last)),
            "Enter" | " " => Some(Self::Toggle),
            _ => None,
        }
    }
}
