//! UI state - status bar, cursor blink, menus and modal dialogs

use super::status_bar::StatusBar;

/// Buttons of the unsaved-changes prompt, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

impl UnsavedChoice {
    pub const ALL: [UnsavedChoice; 3] = [
        UnsavedChoice::Save,
        UnsavedChoice::Discard,
        UnsavedChoice::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnsavedChoice::Save => "Salvar",
            UnsavedChoice::Discard => "Descartar",
            UnsavedChoice::Cancel => "Cancelar",
        }
    }

    pub fn next(self) -> Self {
        match self {
            UnsavedChoice::Save => UnsavedChoice::Discard,
            UnsavedChoice::Discard => UnsavedChoice::Cancel,
            UnsavedChoice::Cancel => UnsavedChoice::Save,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            UnsavedChoice::Save => UnsavedChoice::Cancel,
            UnsavedChoice::Discard => UnsavedChoice::Save,
            UnsavedChoice::Cancel => UnsavedChoice::Discard,
        }
    }
}

/// Single-line text input inside a modal
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    pub input: String,
    /// Cursor as a char index into `input`
    pub cursor: usize,
}

impl TextInputState {
    pub fn with_text(text: &str) -> Self {
        Self {
            input: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self
            .input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len());
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let byte_idx = self
            .input
            .char_indices()
            .nth(self.cursor - 1)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len());
        self.input.remove(byte_idx);
        self.cursor -= 1;
    }
}

/// The currently displayed modal dialog, if any
#[derive(Debug, Clone)]
pub enum Modal {
    /// Save/discard/cancel prompt shown before destructive actions
    UnsavedChanges { selected: UnsavedChoice },
    /// "Definir Cidade Padrão" input
    CityPrompt(TextInputState),
    /// "Fonte..." point size input
    FontSizePrompt(TextInputState),
    /// Modal error (or warning) dialog
    Error { title: String, message: String },
    /// "Sobre o Editor" dialog
    About,
}

/// UI state: status bar, menus, modal, cursor blink
#[derive(Debug, Clone)]
pub struct UiState {
    pub status_bar: StatusBar,
    /// Index into the menu registry of the open dropdown, if any
    pub open_menu: Option<usize>,
    /// Highlighted item inside the open dropdown
    pub menu_hover: Option<usize>,
    pub modal: Option<Modal>,
    /// Whether the text cursor is currently shown (blink phase)
    pub cursor_visible: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            status_bar: StatusBar::new(),
            open_menu: None,
            menu_hover: None,
            modal: None,
            cursor_visible: true,
        }
    }

    /// True while a modal captures all input
    pub fn modal_active(&self) -> bool {
        self.modal.is_some()
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
        self.menu_hover = None;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
