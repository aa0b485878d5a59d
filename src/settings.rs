//! Runtime settings read from the hosting page
//!
//! Nothing here is persisted: the page's `<html>` classes and media queries
//! are the source of truth and are re-read on load.

use serde::{Deserialize, Serialize};

/// Site color theme, cycled by the theme-switcher dock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
    /// Dark palette with the cloud backdrop
    Cloud,
}

impl Theme {
    /// `dark` class marker on the document element
    pub const DARK_CLASS: &'static str = "dark";
    /// `cloud-mode` class marker on the document element
    pub const CLOUD_CLASS: &'static str = "cloud-mode";

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Cloud => "cloud",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "cloud" => Some(Theme::Cloud),
            _ => None,
        }
    }

    /// Dock order: light -> dark -> cloud -> light
    pub fn next(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Cloud,
            Theme::Cloud => Theme::Light,
        }
    }

    /// Canvas palettes only distinguish light from dark
    pub fn is_dark(&self) -> bool {
        !matches!(self, Theme::Light)
    }

    /// Derive the theme from the document element's class markers
    pub fn from_classes(has_dark: bool, has_cloud: bool) -> Self {
        if has_cloud {
            Theme::Cloud
        } else if has_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Class markers `(dark, cloud-mode)` this theme sets
    pub fn classes(&self) -> (bool, bool) {
        match self {
            Theme::Light => (false, false),
            Theme::Dark => (true, false),
            Theme::Cloud => (true, true),
        }
    }

    /// Read the current theme from `<html>` (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn from_document() -> Self {
        let list = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .map(|el| el.class_list());

        match list {
            Some(list) => Self::from_classes(
                list.contains(Self::DARK_CLASS),
                list.contains(Self::CLOUD_CLASS),
            ),
            None => Self::default(),
        }
    }

    /// Write this theme's class markers onto `<html>` (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn apply(&self) {
        let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let list = el.class_list();
        let (dark, cloud) = self.classes();
        let _ = list.toggle_with_force(Self::DARK_CLASS, dark);
        let _ = list.toggle_with_force(Self::CLOUD_CLASS, cloud);
        log::info!("Theme set to {}", self.as_str());
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_document() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn apply(&self) {
        // No document natively
    }
}

/// Settings the animation engines consult
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// User prefers reduced motion (`prefers-reduced-motion: reduce`)
    pub reduced_motion: bool,
    /// Active color theme
    pub theme: Theme,
}

impl Settings {
    /// Media query signalling the reduced-motion preference
    pub const REDUCED_MOTION_QUERY: &'static str = "(prefers-reduced-motion: reduce)";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let reduced_motion = web_sys::window()
            .and_then(|w| w.match_media(Self::REDUCED_MOTION_QUERY).ok())
            .flatten()
            .map(|mq| mq.matches())
            .unwrap_or(false);

        let settings = Self {
            reduced_motion,
            theme: Theme::from_document(),
        };
        log::info!(
            "Loaded settings: theme={}, reduced_motion={}",
            settings.theme.as_str(),
            settings.reduced_motion
        );
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle_is_total() {
        let mut theme = Theme::Light;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(theme);
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Light);
        assert_eq!(seen, vec![Theme::Light, Theme::Dark, Theme::Cloud]);
    }

    #[test]
    fn test_classes_round_trip() {
        for theme in [Theme::Light, Theme::Dark, Theme::Cloud] {
            let (dark, cloud) = theme.classes();
            assert_eq!(Theme::from_classes(dark, cloud), theme);
        }
        assert!(Theme::Cloud.is_dark());
        assert!(!Theme::Light.is_dark());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("Cloud"), Some(Theme::Cloud));
        assert_eq!(Theme::from_str("sepia"), None);
        for theme in [Theme::Light, Theme::Dark, Theme::Cloud] {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
    }
}
