//! Theme system for the editor
//!
//! Provides YAML-based theming support with compile-time embedded themes
//! and user-defined themes from the config directory.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/anuencia/themes/{id}.yaml`
//! 2. Embedded: Built-in themes compiled into binary

use std::path::Path;

use serde::Deserialize;

// Embed theme YAML files at compile time
pub const CLARO_YAML: &str = include_str!("../themes/claro.yaml");
pub const ESCURO_YAML: &str = include_str!("../themes/escuro.yaml");

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier for config (e.g. "claro", "escuro")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "claro",
        yaml: CLARO_YAML,
    },
    BuiltinTheme {
        id: "escuro",
        yaml: ESCURO_YAML,
    },
];

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to ARGB u32 for softbuffer
    pub fn to_argb_u32(&self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Return a new color with the specified alpha value
    pub const fn with_alpha(&self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        match s.len() {
            6 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: 255,
            }),
            8 => Ok(Color {
                r: u8::from_str_radix(&s[0..2], 16).map_err(|e| e.to_string())?,
                g: u8::from_str_radix(&s[2..4], 16).map_err(|e| e.to_string())?,
                b: u8::from_str_radix(&s[4..6], 16).map_err(|e| e.to_string())?,
                a: u8::from_str_radix(&s[6..8], 16).map_err(|e| e.to_string())?,
            }),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    pub ui: UiThemeData,
}

/// UI theme colors (raw strings from YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct UiThemeData {
    pub editor: EditorThemeData,
    pub chrome: ChromeThemeData,
    pub status_bar: StatusBarThemeData,
    pub modal: ModalThemeData,
}

/// Editor area colors
#[derive(Debug, Clone, Deserialize)]
pub struct EditorThemeData {
    pub background: String,
    pub foreground: String,
    pub current_line_background: String,
    pub cursor_color: String,
    pub selection_background: String,
}

/// Menu bar and toolbar colors
#[derive(Debug, Clone, Deserialize)]
pub struct ChromeThemeData {
    pub background: String,
    pub foreground: String,
    pub hover_background: String,
    pub border_color: String,
}

/// Status bar colors
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBarThemeData {
    pub background: String,
    pub foreground: String,
}

/// Modal dialog colors
#[derive(Debug, Clone, Deserialize)]
pub struct ModalThemeData {
    pub background: String,
    pub foreground: String,
    pub border_color: String,
    pub input_background: String,
    pub button_background: String,
    pub button_focus_background: String,
    pub error: String,
}

/// Resolved theme with parsed colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub editor: EditorTheme,
    pub chrome: ChromeTheme,
    pub status_bar: StatusBarTheme,
    pub modal: ModalTheme,
}

/// Editor colors (resolved)
#[derive(Debug, Clone)]
pub struct EditorTheme {
    pub background: Color,
    pub foreground: Color,
    pub current_line_background: Color,
    pub cursor_color: Color,
    pub selection_background: Color,
}

/// Menu bar and toolbar colors (resolved)
#[derive(Debug, Clone)]
pub struct ChromeTheme {
    pub background: Color,
    pub foreground: Color,
    pub hover_background: Color,
    pub border_color: Color,
}

/// Status bar colors (resolved)
#[derive(Debug, Clone)]
pub struct StatusBarTheme {
    pub background: Color,
    pub foreground: Color,
}

/// Modal dialog colors (resolved)
#[derive(Debug, Clone)]
pub struct ModalTheme {
    pub background: Color,
    pub foreground: Color,
    pub border_color: Color,
    pub input_background: Color,
    pub button_background: Color,
    pub button_focus_background: Color,
    pub error: Color,
}

impl Theme {
    /// Parse a theme from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let data: ThemeData =
            serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse theme: {}", e))?;

        if data.version != 1 {
            return Err(format!("Unsupported theme version: {}", data.version));
        }

        let parse = |s: &str| Color::from_hex(s);

        Ok(Theme {
            name: data.name,
            editor: EditorTheme {
                background: parse(&data.ui.editor.background)?,
                foreground: parse(&data.ui.editor.foreground)?,
                current_line_background: parse(&data.ui.editor.current_line_background)?,
                cursor_color: parse(&data.ui.editor.cursor_color)?,
                selection_background: parse(&data.ui.editor.selection_background)?,
            },
            chrome: ChromeTheme {
                background: parse(&data.ui.chrome.background)?,
                foreground: parse(&data.ui.chrome.foreground)?,
                hover_background: parse(&data.ui.chrome.hover_background)?,
                border_color: parse(&data.ui.chrome.border_color)?,
            },
            status_bar: StatusBarTheme {
                background: parse(&data.ui.status_bar.background)?,
                foreground: parse(&data.ui.status_bar.foreground)?,
            },
            modal: ModalTheme {
                background: parse(&data.ui.modal.background)?,
                foreground: parse(&data.ui.modal.foreground)?,
                border_color: parse(&data.ui.modal.border_color)?,
                input_background: parse(&data.ui.modal.input_background)?,
                button_background: parse(&data.ui.modal.button_background)?,
                button_focus_background: parse(&data.ui.modal.button_focus_background)?,
                error: parse(&data.ui.modal.error)?,
            },
        })
    }

    /// Load a built-in theme by id
    pub fn from_builtin(id: &str) -> Result<Self, String> {
        BUILTIN_THEMES
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| format!("Unknown builtin theme: {}", id))
            .and_then(|t| Theme::from_yaml(t.yaml))
    }
}

impl Default for Theme {
    fn default() -> Self {
        // The embedded default must always parse
        Theme::from_yaml(CLARO_YAML).expect("builtin theme 'claro' is valid")
    }
}

/// Load a theme from a YAML file
pub fn from_file(path: &Path) -> Result<Theme, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read theme file {}: {}", path.display(), e))?;
    Theme::from_yaml(&content)
}

/// Load theme by id with priority: user → builtin → default
///
/// Searches in order:
/// 1. `~/.config/anuencia/themes/{id}.yaml`
/// 2. Embedded builtin themes
///
/// Falls back to the default light theme if the id resolves to nothing
/// or the file fails to parse.
pub fn load_theme(id: &str) -> Theme {
    if let Some(user_dir) = crate::config_paths::themes_dir() {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            match from_file(&user_path) {
                Ok(theme) => {
                    tracing::info!("Loaded user theme from {}", user_path.display());
                    return theme;
                }
                Err(e) => {
                    tracing::warn!("Ignoring broken user theme {}: {}", user_path.display(), e);
                }
            }
        }
    }

    match Theme::from_builtin(id) {
        Ok(theme) => theme,
        Err(e) => {
            tracing::warn!("{}, falling back to default theme", e);
            Theme::default()
        }
    }
}
