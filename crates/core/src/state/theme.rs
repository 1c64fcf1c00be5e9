use crate::models::{ThemeMode, ThemeState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeStore {
    state: ThemeState,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ThemeState {
        &self.state
    }

    pub fn toggle_mode(&mut self) {
        self.state.mode = self.state.mode.toggled();
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.state.mode = mode;
    }

    pub fn set_accent_color(&mut self, color: impl Into<String>) {
        self.state.accent_color = color.into();
    }
}
