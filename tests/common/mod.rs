//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use anuencia::config::EditorConfig;
use anuencia::messages::Msg;
use anuencia::model::{
    AppModel, Cursor, Document, EditorState, Position, Selection, Session, UiState, Viewport,
};
use anuencia::theme::Theme;
use anuencia::update::update;

/// Create a test model with given text and cursor position
pub fn test_model(text: &str, line: usize, column: usize) -> AppModel {
    let cursor = Cursor {
        line,
        column,
        desired_column: None,
    };
    let editor = EditorState {
        cursor,
        selection: Selection::new(Position::new(line, column)),
        viewport: Viewport {
            top_line: 0,
            left_column: 0,
            visible_lines: 25,
            visible_columns: 80,
        },
    };

    AppModel {
        document: Document::with_text(text),
        editor,
        session: Session::new("Toledo".to_string()),
        ui: UiState::new(),
        theme: Theme::default(),
        config: EditorConfig::default(),
        window_size: (800, 600),
        line_height: 20,
        char_width: 10.0,
        font_size: 14.0,
    }
}

/// A model starting from the boilerplate first document, cursor at origin
pub fn boilerplate_model() -> AppModel {
    test_model(&anuencia::template::initial_text(), 0, 0)
}

/// Create a test model with given text and a selection (anchor to head)
pub fn test_model_with_selection(
    text: &str,
    anchor_line: usize,
    anchor_col: usize,
    head_line: usize,
    head_col: usize,
) -> AppModel {
    let mut model = test_model(text, head_line, head_col);
    model.editor.selection = Selection {
        anchor: Position::new(anchor_line, anchor_col),
        head: Position::new(head_line, head_col),
    };
    model
}

/// Helper to get buffer content as string
pub fn buffer_to_string(model: &AppModel) -> String {
    model.document.buffer.to_string()
}

/// Run a sequence of messages through update
pub fn apply(model: &mut AppModel, msgs: impl IntoIterator<Item = Msg>) {
    for msg in msgs {
        update(model, msg);
    }
}

/// Type a string character by character
pub fn type_str(model: &mut AppModel, text: &str) {
    for ch in text.chars() {
        if ch == '\n' {
            update(model, Msg::Document(anuencia::messages::DocumentMsg::InsertNewline));
        } else {
            update(model, Msg::insert_char(ch));
        }
    }
}
