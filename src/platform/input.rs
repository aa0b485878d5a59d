//! Runner input mapping
//!
//! The game has one action. Browser events are reduced to `InputEvent` so the
//! mapping can be tested without a DOM.

/// Keys whose default action (page scroll) is suppressed
pub const SCROLL_KEYS: [&str; 2] = ["Space", "ArrowUp"];

/// Raw input, already stripped of DOM types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// `KeyboardEvent.code`
    KeyDown { code: String },
    PointerDown,
    TouchStart,
}

/// What to do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    pub activate: bool,
    pub prevent_default: bool,
}

impl InputEvent {
    pub fn key(code: impl Into<String>) -> Self {
        Self::KeyDown { code: code.into() }
    }

    /// Every event activates; only scroll keys suppress the browser default
    pub fn response(&self) -> InputResponse {
        let prevent_default = match self {
            Self::KeyDown { code } => SCROLL_KEYS.contains(&code.as_str()),
            Self::PointerDown | Self::TouchStart => false,
        };
        InputResponse {
            activate: true,
            prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_key_activates() {
        for code in ["KeyA", "Enter", "Space", "ArrowUp", "ShiftLeft"] {
            assert!(InputEvent::key(code).response().activate, "{code}");
        }
        assert!(InputEvent::PointerDown.response().activate);
        assert!(InputEvent::TouchStart.response().activate);
    }

    #[test]
    fn test_only_scroll_keys_prevent_default() {
        assert!(InputEvent::key("Space").response().prevent_default);
        assert!(InputEvent::key("ArrowUp").response().prevent_default);
        assert!(!InputEvent::key("ArrowDown").response().prevent_default);
        assert!(!InputEvent::key("KeyW").response().prevent_default);
        assert!(!InputEvent::PointerDown.response().prevent_default);
    }
}
