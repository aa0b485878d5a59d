//! Platform layer
//!
//! - `input`: runner input mapping (pure)
//! - `web`: canvas mounting, frame scheduling and listeners (WASM only)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{InputEvent, InputResponse};

/// Which engine a canvas hosts, from its `data-animation` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Feed,
    Network,
    Growth,
    Runner,
}

impl EngineKind {
    /// Attribute carrying the engine name on a `<canvas>`
    pub const ATTRIBUTE: &'static str = "data-animation";

    pub const ALL: [EngineKind; 4] = [
        EngineKind::Feed,
        EngineKind::Network,
        EngineKind::Growth,
        EngineKind::Runner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Feed => "feed",
            EngineKind::Network => "network",
            EngineKind::Growth => "growth",
            EngineKind::Runner => "runner",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "feed" | "stop-scroll" => Some(EngineKind::Feed),
            "network" => Some(EngineKind::Network),
            "growth" => Some(EngineKind::Growth),
            "runner" | "game" => Some(EngineKind::Runner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_names_round_trip() {
        for kind in EngineKind::ALL {
            assert_eq!(EngineKind::from_attr(kind.as_str()), Some(kind));
        }
        assert_eq!(EngineKind::from_attr(" Runner "), Some(EngineKind::Runner));
        assert_eq!(EngineKind::from_attr("stop-scroll"), Some(EngineKind::Feed));
        assert_eq!(EngineKind::from_attr("confetti"), None);
    }
}
