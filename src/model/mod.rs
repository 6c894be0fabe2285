//! Application model - the complete state of the editor
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod document;
pub mod editor;
pub mod session;
pub mod status_bar;
pub mod ui;

pub use document::{Document, EditOperation};
pub use editor::{Cursor, EditorState, Position, Selection, Viewport};
pub use session::{PendingAction, Session};
pub use status_bar::{
    SegmentContent, SegmentId, SegmentPosition, StatusBar, StatusSegment, TransientMessage,
};
pub use ui::{Modal, TextInputState, UiState, UnsavedChoice};

use crate::config::EditorConfig;
use crate::template;
use crate::theme::{load_theme, Theme};

/// Window title when no file is associated with the buffer
pub const BASE_TITLE: &str = "Editor de Documentos - Lotes Rurais";

/// Height of the menu bar in pixels
pub const MENU_BAR_HEIGHT: usize = 28;
/// Height of the toolbar in pixels
pub const TOOLBAR_HEIGHT: usize = 32;
/// Horizontal padding before text content (pixels)
pub const TEXT_AREA_PADDING_PX: f32 = 8.0;

/// Window title for the current file state
pub fn window_title(document: &Document) -> String {
    match &document.file_path {
        Some(path) => format!(
            "Editor de Documentos - {}",
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        ),
        None => BASE_TITLE.to_string(),
    }
}

/// The complete application model
#[derive(Debug)]
pub struct AppModel {
    /// The single document being edited
    pub document: Document,
    /// Cursor, selection and viewport
    pub editor: EditorState,
    /// Session fields: tax-id mode, default city, pending destructive action
    pub session: Session,
    /// UI state (status bar, menus, modals, cursor blink)
    pub ui: UiState,
    /// Theme for colors and styling
    pub theme: Theme,
    /// Persisted editor configuration
    pub config: EditorConfig,
    /// Window dimensions
    pub window_size: (u32, u32),
    /// Line height in pixels
    pub line_height: usize,
    /// Character width in pixels (monospace)
    pub char_width: f32,
    /// Font size in points (display scale applied by the renderer)
    pub font_size: f32,
}

impl AppModel {
    /// Create a new application model with the given window size
    pub fn new(window_width: u32, window_height: u32) -> Self {
        let config = EditorConfig::load();
        let theme = load_theme(&config.theme);
        let font_size = config.font_size;
        let line_height = (font_size * 1.5).round() as usize;
        let char_width: f32 = font_size * 0.6; // Corrected by the renderer with actual metrics

        let document = Document::with_text(&template::initial_text());
        let session = Session::new(config.default_city.clone());

        let mut model = Self {
            document,
            editor: EditorState::default(),
            session,
            ui: UiState::new(),
            theme,
            config,
            window_size: (window_width, window_height),
            line_height,
            char_width,
            font_size,
        };
        model.recompute_viewport();
        sync_status_bar(&mut model);
        model
    }

    /// Top of the text area in pixels (below menu bar and toolbar)
    pub fn text_area_top(&self) -> usize {
        MENU_BAR_HEIGHT + TOOLBAR_HEIGHT
    }

    /// Height of the text area in pixels (above the status bar)
    pub fn text_area_height(&self) -> usize {
        (self.window_size.1 as usize)
            .saturating_sub(self.text_area_top())
            .saturating_sub(self.line_height)
    }

    /// Recompute visible lines/columns after a resize or font change
    pub fn recompute_viewport(&mut self) {
        let text_x = TEXT_AREA_PADDING_PX.round() as usize;
        let usable_width = (self.window_size.0 as usize).saturating_sub(text_x);
        self.editor.viewport.visible_columns =
            (usable_width as f32 / self.char_width).floor() as usize;
        self.editor.viewport.visible_lines = self.text_area_height() / self.line_height.max(1);
    }

    /// Sync the display metrics derived from the font size
    pub fn set_font_metrics(&mut self, char_width: f32, line_height: usize) {
        self.char_width = char_width;
        self.line_height = line_height;
        self.recompute_viewport();
        self.ensure_cursor_visible();
    }

    /// Length of the line the cursor is on
    pub fn current_line_length(&self) -> usize {
        self.document.line_length(self.editor.cursor.line)
    }

    /// Clamp the cursor onto an existing position in the buffer
    pub fn clamp_cursor(&mut self) {
        let max_line = self.document.line_count().saturating_sub(1);
        if self.editor.cursor.line > max_line {
            self.editor.cursor.line = max_line;
        }
        let line_len = self.current_line_length();
        if self.editor.cursor.column > line_len {
            self.editor.cursor.column = line_len;
        }
    }

    /// Scroll the viewport so that the cursor is visible
    pub fn ensure_cursor_visible(&mut self) {
        let cursor = self.editor.cursor;
        let viewport = &mut self.editor.viewport;

        if cursor.line < viewport.top_line {
            viewport.top_line = cursor.line;
        } else if viewport.visible_lines > 0
            && cursor.line >= viewport.top_line + viewport.visible_lines
        {
            viewport.top_line = cursor.line + 1 - viewport.visible_lines;
        }

        if cursor.column < viewport.left_column {
            viewport.left_column = cursor.column;
        } else if viewport.visible_columns > 0
            && cursor.column >= viewport.left_column + viewport.visible_columns
        {
            viewport.left_column = cursor.column + 1 - viewport.visible_columns;
        }
    }

    /// Restart the blink phase so the cursor is visible right after movement
    pub fn reset_cursor_blink(&mut self) {
        self.ui.cursor_visible = true;
    }

    /// Move the cursor to the end of the buffer (template insertion target)
    pub fn move_cursor_to_end(&mut self) {
        let (line, column) = self.document.end_position();
        self.editor.cursor.set_position(Position::new(line, column));
        self.editor.clear_selection();
    }
}

/// Recompute the status bar segments from the current state.
///
/// Called after every update so the segments always reflect the cursor and
/// buffer.
pub fn sync_status_bar(model: &mut AppModel) {
    let cursor = model.editor.cursor;
    let text_len = model.document.buffer.len_chars();
    let words = crate::util::word_count(&model.document.text());

    let bar = &mut model.ui.status_bar;
    bar.set(
        SegmentId::CursorPosition,
        SegmentContent::Text(format!(
            "Linha: {}, Coluna: {}",
            cursor.line + 1,
            cursor.column + 1
        )),
    );
    bar.set(
        SegmentId::CharCount,
        SegmentContent::Text(format!("Caracteres: {}", text_len)),
    );
    bar.set(
        SegmentId::WordCount,
        SegmentContent::Text(format!("Palavras: {}", words)),
    );
    bar.set(
        SegmentId::FileName,
        match &model.document.file_path {
            Some(path) => SegmentContent::Text(format!(
                "Arquivo: {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string())
            )),
            None => SegmentContent::Empty,
        },
    );
    bar.set(
        SegmentId::ModifiedIndicator,
        if model.document.is_modified {
            SegmentContent::Text("●".into())
        } else {
            SegmentContent::Empty
        },
    );
    bar.set(
        SegmentId::TaxIdMode,
        SegmentContent::Text(model.session.tax_id_mode.label().into()),
    );
}
