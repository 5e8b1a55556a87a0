//! Theme system for human-mode output.

use console::Style;

/// Visual theme for `vxl` human-mode output.
///
/// Centralizes styles for consistent rendering.
pub struct VxTheme {
    // Status colors
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,

    // Component styles
    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub mod_name: Style,
    pub path: Style,
    pub dry_run: Style,
    pub enabled: Style,
    pub disabled: Style,
}

impl Default for VxTheme {
    fn default() -> Self {
        Self {
            accent: Style::new().blue(),
            success: Style::new().green(),
            error: Style::new().red(),
            warning: Style::new().yellow(),
            muted: Style::new().dim(),
            header: Style::new().bold().blue(),
            label: Style::new().dim(),
            value: Style::new().bold(),
            mod_name: Style::new().bold().cyan(),
            path: Style::new().italic(),
            dry_run: Style::new().bold().yellow(),
            enabled: Style::new().bold().green(),
            disabled: Style::new().dim(),
        }
    }
}
