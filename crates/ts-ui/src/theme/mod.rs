//! Theme system

use ratatui::prelude::*;

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color for focused elements
    pub focus_border: Color,
    /// Border color for unfocused elements
    pub unfocus_border: Color,
    /// Disabled inputs
    pub disabled: Color,
    /// Title bar background
    pub title_bg: Color,
    /// Selected table row background
    pub selection_bg: Color,
    /// Success notices and enabled toggles
    pub success: Color,
    /// Validation notices
    pub warning: Color,
    /// Error notices
    pub error: Color,
    /// Informational notices
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            unfocus_border: Color::DarkGray,
            disabled: Color::DarkGray,
            title_bg: Color::Blue,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Blue,
        }
    }
}

impl Theme {
    /// Border style for a panel
    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.focus_border
        } else {
            self.unfocus_border
        })
    }
}
