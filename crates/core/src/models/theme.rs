use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCENT_COLOR: &str = "#e50914";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub accent_color: String,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Dark,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}
