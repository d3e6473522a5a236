//! Color theme preference

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system
    #[default]
    System,
}

impl Theme {
    /// The concrete theme shown, given the system's color-scheme preference
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            explicit => explicit,
        }
    }

    /// Preference after pressing the theme switch.
    ///
    /// The switch always stores an explicit theme: the opposite of what is
    /// currently shown.
    pub fn toggle(self, prefers_dark: bool) -> Theme {
        match self.resolve(prefers_dark) {
            Theme::Dark => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme {:?} (expected light, dark or system)", other)),
        }
    }
}
