//! Presentation mode shared across the console.
//!
//! The mode is injected rather than read from the page. Views that care about
//! it (the SQL editor, the graph canvas) subscribe and react to changes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    Light,
    Dark,
    #[default]
    System,
}

impl PresentationMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Syntax theme for the SQL editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTheme {
    OneDark,
    Light,
}

impl EditorTheme {
    /// `System` has no platform preference to consult here and falls back to light.
    pub fn for_mode(mode: PresentationMode) -> Self {
        if mode.is_dark() {
            Self::OneDark
        } else {
            Self::Light
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OneDark => "one-dark",
            Self::Light => "light",
        }
    }
}

/// Process-wide presentation mode with change notification.
#[derive(Debug, Clone)]
pub struct ThemeSignal {
    tx: watch::Sender<PresentationMode>,
}

impl ThemeSignal {
    pub fn new(initial: PresentationMode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> PresentationMode {
        *self.tx.borrow()
    }

    /// Change the mode. Subscribers are only woken when the value differs.
    pub fn set(&self, mode: PresentationMode) {
        self.tx.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                tracing::debug!(?mode, "presentation mode changed");
                *current = mode;
                true
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationMode> {
        self.tx.subscribe()
    }
}

/// Seed the signal with the configured mode.
impl From<&Config> for ThemeSignal {
    fn from(config: &Config) -> Self {
        Self::new(config.theme)
    }
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(PresentationMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_theme_follows_mode() {
        assert_eq!(EditorTheme::for_mode(PresentationMode::Dark), EditorTheme::OneDark);
        assert_eq!(EditorTheme::for_mode(PresentationMode::Light), EditorTheme::Light);
        assert_eq!(EditorTheme::for_mode(PresentationMode::System).name(), "light");
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(PresentationMode::from_str(" Dark "), Some(PresentationMode::Dark));
        assert_eq!(PresentationMode::from_str("sepia"), None);
    }

    #[test]
    fn test_subscribers_see_changes() {
        let signal = ThemeSignal::new(PresentationMode::Light);
        let mut rx = signal.subscribe();
        assert!(!rx.has_changed().unwrap());

        signal.set(PresentationMode::Light);
        assert!(!rx.has_changed().unwrap());

        signal.set(PresentationMode::Dark);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), PresentationMode::Dark);
        assert_eq!(signal.current(), PresentationMode::Dark);
    }

    #[test]
    fn test_signal_from_config() {
        let config = Config::from_toml(r#"theme = "dark""#, "console.toml").unwrap();
        let signal = ThemeSignal::from(&config);
        assert_eq!(signal.current(), PresentationMode::Dark);
        assert_eq!(EditorTheme::for_mode(signal.current()), EditorTheme::OneDark);

        let signal = ThemeSignal::from(&Config::default());
        assert_eq!(signal.current(), PresentationMode::System);
    }

    #[tokio::test]
    async fn test_changed_wakes_subscriber() {
        let signal = ThemeSignal::default();
        let mut rx = signal.subscribe();
        let handle = tokio::spawn(async move {
            rx.changed().await.unwrap();
            *rx.borrow()
        });
        tokio::task::yield_now().await;
        signal.set(PresentationMode::Dark);
        assert_eq!(handle.await.unwrap(), PresentationMode::Dark);
    }
}
