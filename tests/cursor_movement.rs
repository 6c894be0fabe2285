//! Cursor movement and viewport behavior

mod common;

use anuencia::messages::{Direction, EditorMsg, Msg};
use anuencia::update::update;
use common::test_model;

#[test]
fn left_and_right_move_within_a_line() {
    let mut model = test_model("abc\n", 0, 1);
    update(&mut model, Msg::move_cursor(Direction::Right));
    assert_eq!(model.editor.cursor.column, 2);
    update(&mut model, Msg::move_cursor(Direction::Left));
    assert_eq!(model.editor.cursor.column, 1);
}

#[test]
fn right_at_line_end_wraps_to_next_line() {
    let mut model = test_model("ab\ncd\n", 0, 2);
    update(&mut model, Msg::move_cursor(Direction::Right));
    assert_eq!(model.editor.cursor.line, 1);
    assert_eq!(model.editor.cursor.column, 0);
}

#[test]
fn left_at_line_start_wraps_to_previous_line_end() {
    let mut model = test_model("ab\ncd\n", 1, 0);
    update(&mut model, Msg::move_cursor(Direction::Left));
    assert_eq!(model.editor.cursor.line, 0);
    assert_eq!(model.editor.cursor.column, 2);
}

#[test]
fn vertical_movement_remembers_desired_column() {
    let mut model = test_model("longa linha aqui\nab\noutra linha longa\n", 0, 10);

    update(&mut model, Msg::move_cursor(Direction::Down));
    assert_eq!(model.editor.cursor.line, 1);
    assert_eq!(model.editor.cursor.column, 2); // clamped to short line

    update(&mut model, Msg::move_cursor(Direction::Down));
    assert_eq!(model.editor.cursor.line, 2);
    assert_eq!(model.editor.cursor.column, 10); // desired column restored
}

#[test]
fn home_and_end_jump_within_the_line() {
    let mut model = test_model("conteúdo\n", 0, 3);
    update(&mut model, Msg::Editor(EditorMsg::MoveCursorLineEnd));
    assert_eq!(model.editor.cursor.column, 8);
    update(&mut model, Msg::Editor(EditorMsg::MoveCursorLineStart));
    assert_eq!(model.editor.cursor.column, 0);
}

#[test]
fn ctrl_home_and_end_jump_document_bounds() {
    let mut model = test_model("um\ndois\ntres\n", 1, 2);
    update(&mut model, Msg::Editor(EditorMsg::MoveCursorDocumentEnd));
    let (line, column) = model.document.end_position();
    assert_eq!((model.editor.cursor.line, model.editor.cursor.column), (line, column));

    update(&mut model, Msg::Editor(EditorMsg::MoveCursorDocumentStart));
    assert_eq!((model.editor.cursor.line, model.editor.cursor.column), (0, 0));
}

#[test]
fn word_movement_skips_whole_words() {
    let mut model = test_model("um dois tres\n", 0, 0);
    update(
        &mut model,
        Msg::Editor(EditorMsg::MoveCursorWord(Direction::Right)),
    );
    assert_eq!(model.editor.cursor.column, 2);
    update(
        &mut model,
        Msg::Editor(EditorMsg::MoveCursorWord(Direction::Right)),
    );
    assert_eq!(model.editor.cursor.column, 7);

    update(
        &mut model,
        Msg::Editor(EditorMsg::MoveCursorWord(Direction::Left)),
    );
    assert_eq!(model.editor.cursor.column, 3);
}

#[test]
fn cursor_movement_scrolls_the_viewport() {
    let text = (0..100).map(|i| format!("linha {}\n", i)).collect::<String>();
    let mut model = test_model(&text, 0, 0);

    for _ in 0..40 {
        update(&mut model, Msg::move_cursor(Direction::Down));
    }
    assert_eq!(model.editor.cursor.line, 40);
    // Cursor stays within the 25-line viewport
    assert!(model.editor.viewport.top_line <= 40);
    assert!(40 < model.editor.viewport.top_line + model.editor.viewport.visible_lines);
}

#[test]
fn page_down_moves_by_viewport_height() {
    let text = (0..100).map(|i| format!("linha {}\n", i)).collect::<String>();
    let mut model = test_model(&text, 0, 0);

    update(&mut model, Msg::Editor(EditorMsg::PageDown));
    assert_eq!(model.editor.cursor.line, 23);

    update(&mut model, Msg::Editor(EditorMsg::PageUp));
    assert_eq!(model.editor.cursor.line, 0);
}

#[test]
fn scroll_is_clamped_to_document_bounds() {
    let mut model = test_model("só uma linha\n", 0, 0);
    update(&mut model, Msg::Editor(EditorMsg::Scroll(50)));
    assert_eq!(model.editor.viewport.top_line, 0);
    update(&mut model, Msg::Editor(EditorMsg::Scroll(-50)));
    assert_eq!(model.editor.viewport.top_line, 0);
}

#[test]
fn click_position_is_clamped_to_line_length() {
    let mut model = test_model("ab\n", 0, 0);
    update(
        &mut model,
        Msg::Editor(EditorMsg::SetCursorPosition {
            line: 0,
            column: 99,
        }),
    );
    assert_eq!(model.editor.cursor.column, 2);

    update(
        &mut model,
        Msg::Editor(EditorMsg::SetCursorPosition {
            line: 99,
            column: 0,
        }),
    );
    assert_eq!(model.editor.cursor.line, model.document.line_count() - 1);
}
