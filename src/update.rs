//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions. Nothing in here
//! touches the windowing toolkit: side effects leave as `Cmd` values and
//! their results come back as messages.

use crate::commands::Cmd;
use crate::messages::{AppMsg, Direction, DocumentMsg, EditorMsg, ModalMsg, Msg, UiMsg};
use crate::model::{
    sync_status_bar, window_title, AppModel, Document, EditOperation, Modal, PendingAction,
    Position, TextInputState, UnsavedChoice,
};
use crate::template;
use crate::util::{char_type, CharType};

/// Smallest and largest accepted font sizes (points)
const FONT_SIZE_RANGE: (f32, f32) = (6.0, 72.0);

/// Main update function - dispatches to sub-handlers
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    let result = match msg {
        Msg::Editor(m) => update_editor(model, m),
        Msg::Document(m) => update_document(model, m),
        Msg::Ui(m) => update_ui(model, m),
        Msg::App(m) => update_app(model, m),
    };

    // Sync status bar segments after state changes
    sync_status_bar(model);

    result
}

// ============================================================================
// Editor messages (cursor, selection, viewport)
// ============================================================================

/// Handle editor messages (cursor movement, selection, scrolling)
pub fn update_editor(model: &mut AppModel, msg: EditorMsg) -> Option<Cmd> {
    match msg {
        EditorMsg::MoveCursor(direction) => {
            move_cursor(model, direction, false);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorWithSelection(direction) => {
            move_cursor(model, direction, true);
            Some(Cmd::Redraw)
        }

        EditorMsg::MoveCursorLineStart => {
            move_to(model, Position::new(model.editor.cursor.line, 0), false);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorLineStartWithSelection => {
            move_to(model, Position::new(model.editor.cursor.line, 0), true);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorLineEnd => {
            let end = model.current_line_length();
            move_to(model, Position::new(model.editor.cursor.line, end), false);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorLineEndWithSelection => {
            let end = model.current_line_length();
            move_to(model, Position::new(model.editor.cursor.line, end), true);
            Some(Cmd::Redraw)
        }

        EditorMsg::MoveCursorDocumentStart => {
            move_to(model, Position::new(0, 0), false);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorDocumentEnd => {
            let (line, column) = model.document.end_position();
            move_to(model, Position::new(line, column), false);
            Some(Cmd::Redraw)
        }

        EditorMsg::MoveCursorWord(direction) => {
            move_cursor_word(model, direction, false);
            Some(Cmd::Redraw)
        }
        EditorMsg::MoveCursorWordWithSelection(direction) => {
            move_cursor_word(model, direction, true);
            Some(Cmd::Redraw)
        }

        EditorMsg::PageUp => {
            let jump = model.editor.viewport.visible_lines.saturating_sub(2).max(1);
            move_cursor_lines(model, -(jump as i64), false);
            Some(Cmd::Redraw)
        }
        EditorMsg::PageDown => {
            let jump = model.editor.viewport.visible_lines.saturating_sub(2).max(1);
            move_cursor_lines(model, jump as i64, false);
            Some(Cmd::Redraw)
        }

        EditorMsg::SetCursorPosition { line, column } => {
            let line = line.min(model.document.line_count().saturating_sub(1));
            let column = column.min(model.document.line_length(line));
            move_to(model, Position::new(line, column), false);
            Some(Cmd::Redraw)
        }
        EditorMsg::ExtendSelectionToPosition { line, column } => {
            let line = line.min(model.document.line_count().saturating_sub(1));
            let column = column.min(model.document.line_length(line));
            move_to(model, Position::new(line, column), true);
            Some(Cmd::Redraw)
        }

        EditorMsg::SelectAll => {
            let (line, column) = model.document.end_position();
            model.editor.selection.anchor = Position::new(0, 0);
            model.editor.selection.head = Position::new(line, column);
            model.editor.cursor.set_position(Position::new(line, column));
            model.ensure_cursor_visible();
            model.reset_cursor_blink();
            Some(Cmd::Redraw)
        }
        EditorMsg::ClearSelection => {
            model.editor.clear_selection();
            Some(Cmd::Redraw)
        }

        EditorMsg::Scroll(delta) => {
            let viewport = &mut model.editor.viewport;
            let max_top = model
                .document
                .line_count()
                .saturating_sub(viewport.visible_lines.max(1));
            let top = viewport.top_line as i64 + delta as i64;
            viewport.top_line = top.clamp(0, max_top as i64) as usize;
            Some(Cmd::Redraw)
        }
        EditorMsg::ScrollHorizontal(delta) => {
            let viewport = &mut model.editor.viewport;
            let left = viewport.left_column as i64 + delta as i64;
            viewport.left_column = left.max(0) as usize;
            Some(Cmd::Redraw)
        }
    }
}

/// Move one step in a direction, extending the selection when asked
fn move_cursor(model: &mut AppModel, direction: Direction, extend: bool) {
    match direction {
        Direction::Up => move_cursor_lines(model, -1, extend),
        Direction::Down => move_cursor_lines(model, 1, extend),
        Direction::Left | Direction::Right => {
            begin_selection_if(model, extend);
            let offset = model
                .document
                .cursor_to_offset(model.editor.cursor.line, model.editor.cursor.column);
            let target = match direction {
                Direction::Left => offset.saturating_sub(1),
                _ => (offset + 1).min(model.document.buffer.len_chars()),
            };
            let (line, column) = model.document.offset_to_cursor(target);
            model.editor.cursor.set_position(Position::new(line, column));
            finish_move(model, extend);
        }
    }
}

/// Vertical movement preserving the desired column across short lines
fn move_cursor_lines(model: &mut AppModel, delta: i64, extend: bool) {
    begin_selection_if(model, extend);
    let max_line = model.document.line_count().saturating_sub(1);
    let target_line = (model.editor.cursor.line as i64 + delta).clamp(0, max_line as i64) as usize;

    let desired = model
        .editor
        .cursor
        .desired_column
        .unwrap_or(model.editor.cursor.column);
    let line_len = model.document.line_length(target_line);

    model.editor.cursor.line = target_line;
    model.editor.cursor.column = desired.min(line_len);
    model.editor.cursor.desired_column = Some(desired);
    finish_move(model, extend);
}

fn move_cursor_word(model: &mut AppModel, direction: Direction, extend: bool) {
    begin_selection_if(model, extend);
    let offset = model
        .document
        .cursor_to_offset(model.editor.cursor.line, model.editor.cursor.column);
    let target = match direction {
        Direction::Left => prev_word_offset(&model.document, offset),
        Direction::Right => next_word_offset(&model.document, offset),
        _ => offset,
    };
    let (line, column) = model.document.offset_to_cursor(target);
    model.editor.cursor.set_position(Position::new(line, column));
    finish_move(model, extend);
}

/// Place the cursor at an absolute position
fn move_to(model: &mut AppModel, pos: Position, extend: bool) {
    begin_selection_if(model, extend);
    model.editor.cursor.set_position(pos);
    finish_move(model, extend);
}

fn begin_selection_if(model: &mut AppModel, extend: bool) {
    if extend && model.editor.selection.is_empty() {
        let pos = model.editor.cursor.position();
        model.editor.selection.anchor = pos;
        model.editor.selection.head = pos;
    }
}

fn finish_move(model: &mut AppModel, extend: bool) {
    if extend {
        model.editor.selection.head = model.editor.cursor.position();
    } else {
        model.editor.clear_selection();
    }
    model.ensure_cursor_visible();
    model.reset_cursor_blink();
}

/// Start of the word (or run of punctuation) before `offset`
fn prev_word_offset(document: &Document, offset: usize) -> usize {
    let mut chars = document.buffer.chars_at(offset);
    let mut current = offset;

    while let Some(ch) = chars.prev() {
        current -= 1;
        if char_type(ch) != CharType::Whitespace {
            let class = char_type(ch);
            while let Some(ch2) = chars.prev() {
                if char_type(ch2) == class {
                    current -= 1;
                } else {
                    break;
                }
            }
            return current;
        }
    }
    current
}

/// End of the word (or run of punctuation) after `offset`
fn next_word_offset(document: &Document, offset: usize) -> usize {
    let len = document.buffer.len_chars();
    let mut chars = document.buffer.chars_at(offset);
    let mut current = offset;

    while let Some(ch) = chars.next() {
        current += 1;
        if char_type(ch) != CharType::Whitespace {
            let class = char_type(ch);
            for ch2 in chars {
                if char_type(ch2) == class {
                    current += 1;
                } else {
                    break;
                }
            }
            return current.min(len);
        }
    }
    current.min(len)
}

// ============================================================================
// Document messages (editing, undo/redo, clipboard)
// ============================================================================

/// Handle document messages (text editing, undo/redo, clipboard)
pub fn update_document(model: &mut AppModel, msg: DocumentMsg) -> Option<Cmd> {
    match msg {
        DocumentMsg::InsertChar(ch) => insert_text(model, &ch.to_string()),
        DocumentMsg::InsertNewline => insert_text(model, "\n"),

        DocumentMsg::InsertTemplate => {
            // Always append at the end of the buffer, regardless of where the
            // cursor was.
            model.move_cursor_to_end();
            let text = model.document.text();
            let city = template::city_for_next_block(&text, &model.session.default_city);
            let block = template::appended_block(&city, model.session.tax_id_mode);
            insert_text(model, &block)
        }

        DocumentMsg::DeleteBackward => {
            if let Some((start, end)) = selection_range(model) {
                delete_range(model, start, end)
            } else {
                let offset = cursor_offset(model);
                if offset == 0 {
                    return None;
                }
                delete_range(model, offset - 1, offset)
            }
        }
        DocumentMsg::DeleteForward => {
            if let Some((start, end)) = selection_range(model) {
                delete_range(model, start, end)
            } else {
                let offset = cursor_offset(model);
                if offset >= model.document.buffer.len_chars() {
                    return None;
                }
                delete_range(model, offset, offset + 1)
            }
        }
        DocumentMsg::DeleteWordBackward => {
            if let Some((start, end)) = selection_range(model) {
                delete_range(model, start, end)
            } else {
                let offset = cursor_offset(model);
                let start = prev_word_offset(&model.document, offset);
                delete_range(model, start, offset)
            }
        }
        DocumentMsg::DeleteWordForward => {
            if let Some((start, end)) = selection_range(model) {
                delete_range(model, start, end)
            } else {
                let offset = cursor_offset(model);
                let end = next_word_offset(&model.document, offset);
                delete_range(model, offset, end)
            }
        }

        DocumentMsg::Undo => undo(model),
        DocumentMsg::Redo => redo(model),

        DocumentMsg::Copy => {
            if let Some((start, end)) = selection_range(model) {
                let text = model.document.buffer.slice(start..end).to_string();
                if let Ok(mut clipboard) = arboard::Clipboard::new() {
                    let _ = clipboard.set_text(text);
                }
            }
            None
        }
        DocumentMsg::Cut => {
            if let Some((start, end)) = selection_range(model) {
                let text = model.document.buffer.slice(start..end).to_string();
                if let Ok(mut clipboard) = arboard::Clipboard::new() {
                    let _ = clipboard.set_text(text);
                }
                delete_range(model, start, end)
            } else {
                None
            }
        }
        DocumentMsg::Paste => {
            let clipboard_text = if let Ok(mut clipboard) = arboard::Clipboard::new() {
                clipboard.get_text().ok()
            } else {
                None
            };
            match clipboard_text {
                Some(text) if !text.is_empty() => insert_text(model, &text),
                _ => None,
            }
        }
    }
}

fn cursor_offset(model: &AppModel) -> usize {
    model
        .document
        .cursor_to_offset(model.editor.cursor.line, model.editor.cursor.column)
}

/// Selected char-offset range, if a non-empty selection exists
fn selection_range(model: &AppModel) -> Option<(usize, usize)> {
    let selection = model.editor.selection;
    if selection.is_empty() {
        return None;
    }
    let start = selection.start();
    let end = selection.end();
    Some((
        model.document.cursor_to_offset(start.line, start.column),
        model.document.cursor_to_offset(end.line, end.column),
    ))
}

/// Insert text at the cursor, replacing the selection if there is one.
/// Pushes a single undoable operation.
fn insert_text(model: &mut AppModel, text: &str) -> Option<Cmd> {
    let cursor_before = model.editor.cursor;

    if let Some((start, end)) = selection_range(model) {
        let deleted = model.document.buffer.slice(start..end).to_string();
        model.document.buffer.remove(start..end);
        model.document.buffer.insert(start, text);

        let after = start + text.chars().count();
        let (line, column) = model.document.offset_to_cursor(after);
        model.editor.cursor.set_position(Position::new(line, column));
        model.editor.clear_selection();

        model.document.push_edit(EditOperation::Replace {
            position: start,
            deleted_text: deleted,
            inserted_text: text.to_string(),
            cursor_before,
            cursor_after: model.editor.cursor,
        });
    } else {
        let offset = cursor_offset(model);
        model.document.buffer.insert(offset, text);

        let after = offset + text.chars().count();
        let (line, column) = model.document.offset_to_cursor(after);
        model.editor.cursor.set_position(Position::new(line, column));
        model.editor.clear_selection();

        model.document.push_edit(EditOperation::Insert {
            position: offset,
            text: text.to_string(),
            cursor_before,
            cursor_after: model.editor.cursor,
        });
    }

    model.ensure_cursor_visible();
    model.reset_cursor_blink();
    Some(Cmd::Redraw)
}

/// Delete a char-offset range as a single undoable operation
fn delete_range(model: &mut AppModel, start: usize, end: usize) -> Option<Cmd> {
    if start >= end || end > model.document.buffer.len_chars() {
        return None;
    }
    let cursor_before = model.editor.cursor;
    let deleted = model.document.buffer.slice(start..end).to_string();
    model.document.buffer.remove(start..end);

    let (line, column) = model.document.offset_to_cursor(start);
    model.editor.cursor.set_position(Position::new(line, column));
    model.editor.clear_selection();

    model.document.push_edit(EditOperation::Delete {
        position: start,
        text: deleted,
        cursor_before,
        cursor_after: model.editor.cursor,
    });

    model.ensure_cursor_visible();
    model.reset_cursor_blink();
    Some(Cmd::Redraw)
}

fn undo(model: &mut AppModel) -> Option<Cmd> {
    let op = model.document.undo_stack.pop()?;

    match &op {
        EditOperation::Insert {
            position,
            text,
            cursor_before,
            ..
        } => {
            let end = position + text.chars().count();
            model.document.buffer.remove(*position..end);
            model.editor.cursor = *cursor_before;
        }
        EditOperation::Delete {
            position,
            text,
            cursor_before,
            ..
        } => {
            model.document.buffer.insert(*position, text);
            model.editor.cursor = *cursor_before;
        }
        EditOperation::Replace {
            position,
            deleted_text,
            inserted_text,
            cursor_before,
            ..
        } => {
            let end = position + inserted_text.chars().count();
            model.document.buffer.remove(*position..end);
            model.document.buffer.insert(*position, deleted_text);
            model.editor.cursor = *cursor_before;
        }
    }

    model.document.redo_stack.push(op);
    model.document.is_modified = true;
    model.editor.clear_selection();
    model.clamp_cursor();
    model.ensure_cursor_visible();
    model.reset_cursor_blink();
    Some(Cmd::Redraw)
}

fn redo(model: &mut AppModel) -> Option<Cmd> {
    let op = model.document.redo_stack.pop()?;

    match &op {
        EditOperation::Insert {
            position,
            text,
            cursor_after,
            ..
        } => {
            model.document.buffer.insert(*position, text);
            model.editor.cursor = *cursor_after;
        }
        EditOperation::Delete {
            position,
            text,
            cursor_after,
            ..
        } => {
            let end = position + text.chars().count();
            model.document.buffer.remove(*position..end);
            model.editor.cursor = *cursor_after;
        }
        EditOperation::Replace {
            position,
            deleted_text,
            inserted_text,
            cursor_after,
            ..
        } => {
            let end = position + deleted_text.chars().count();
            model.document.buffer.remove(*position..end);
            model.document.buffer.insert(*position, inserted_text);
            model.editor.cursor = *cursor_after;
        }
    }

    model.document.undo_stack.push(op);
    model.document.is_modified = true;
    model.editor.clear_selection();
    model.clamp_cursor();
    model.ensure_cursor_visible();
    model.reset_cursor_blink();
    Some(Cmd::Redraw)
}

// ============================================================================
// UI messages (status bar, menus, modals)
// ============================================================================

/// Handle UI messages (menus, modals, cursor blink, transient messages)
pub fn update_ui(model: &mut AppModel, msg: UiMsg) -> Option<Cmd> {
    match msg {
        UiMsg::Tick => {
            model.ui.cursor_visible = !model.ui.cursor_visible;
            model.ui.status_bar.expire_transient();
            Some(Cmd::Redraw)
        }
        UiMsg::SetTransientMessage { text, duration_ms } => {
            model.ui.status_bar.show_transient(text, duration_ms);
            Some(Cmd::Redraw)
        }

        UiMsg::OpenMenu(index) => {
            if index < crate::commands::MENUS.len() {
                model.ui.open_menu = Some(index);
                model.ui.menu_hover = None;
            }
            Some(Cmd::Redraw)
        }
        UiMsg::HoverMenuItem(item) => {
            model.ui.menu_hover = item;
            Some(Cmd::Redraw)
        }
        UiMsg::CloseMenu => {
            model.ui.close_menu();
            Some(Cmd::Redraw)
        }

        UiMsg::Modal(m) => update_modal(model, m),

        UiMsg::PromptDefaultCity => {
            model.ui.close_menu();
            model.ui.modal = Some(Modal::CityPrompt(TextInputState::with_text(
                &model.session.default_city,
            )));
            Some(Cmd::Redraw)
        }
        UiMsg::PromptFontSize => {
            model.ui.close_menu();
            model.ui.modal = Some(Modal::FontSizePrompt(TextInputState::with_text(&format!(
                "{:.0}",
                model.font_size
            ))));
            Some(Cmd::Redraw)
        }
        UiMsg::ShowAbout => {
            model.ui.close_menu();
            model.ui.modal = Some(Modal::About);
            Some(Cmd::Redraw)
        }
        UiMsg::ShowError { title, message } => {
            model.ui.modal = Some(Modal::Error { title, message });
            Some(Cmd::Redraw)
        }
    }
}

fn update_modal(model: &mut AppModel, msg: ModalMsg) -> Option<Cmd> {
    let modal = model.ui.modal.take()?;

    match modal {
        Modal::UnsavedChanges { selected } => match msg {
            ModalMsg::FocusNext => {
                model.ui.modal = Some(Modal::UnsavedChanges {
                    selected: selected.next(),
                });
                Some(Cmd::Redraw)
            }
            ModalMsg::FocusPrev => {
                model.ui.modal = Some(Modal::UnsavedChanges {
                    selected: selected.prev(),
                });
                Some(Cmd::Redraw)
            }
            ModalMsg::Confirm => resolve_unsaved_choice(model, selected),
            ModalMsg::Cancel => resolve_unsaved_choice(model, UnsavedChoice::Cancel),
            _ => {
                model.ui.modal = Some(Modal::UnsavedChanges { selected });
                None
            }
        },

        Modal::CityPrompt(mut input) => match msg {
            ModalMsg::InsertChar(ch) => {
                input.insert_char(ch);
                model.ui.modal = Some(Modal::CityPrompt(input));
                Some(Cmd::Redraw)
            }
            ModalMsg::DeleteBackward => {
                input.delete_backward();
                model.ui.modal = Some(Modal::CityPrompt(input));
                Some(Cmd::Redraw)
            }
            ModalMsg::Confirm => {
                let city = input.input.trim().to_string();
                if !city.is_empty() {
                    model.session.default_city = city.clone();
                    model.config.default_city = city.clone();
                    if let Err(e) = model.config.save() {
                        tracing::warn!("failed to persist config: {e}");
                    }
                    model
                        .ui
                        .status_bar
                        .show_transient(format!("Cidade padrão definida para: {city}"), 2000);
                }
                Some(Cmd::Redraw)
            }
            ModalMsg::Cancel => Some(Cmd::Redraw),
            _ => {
                model.ui.modal = Some(Modal::CityPrompt(input));
                None
            }
        },

        Modal::FontSizePrompt(mut input) => match msg {
            ModalMsg::InsertChar(ch) => {
                if ch.is_ascii_digit() || ch == '.' {
                    input.insert_char(ch);
                }
                model.ui.modal = Some(Modal::FontSizePrompt(input));
                Some(Cmd::Redraw)
            }
            ModalMsg::DeleteBackward => {
                input.delete_backward();
                model.ui.modal = Some(Modal::FontSizePrompt(input));
                Some(Cmd::Redraw)
            }
            ModalMsg::Confirm => {
                if let Ok(size) = input.input.trim().parse::<f32>() {
                    set_font_size(model, size);
                }
                Some(Cmd::Redraw)
            }
            ModalMsg::Cancel => Some(Cmd::Redraw),
            _ => {
                model.ui.modal = Some(Modal::FontSizePrompt(input));
                None
            }
        },

        Modal::Error { title, message } => match msg {
            ModalMsg::Confirm | ModalMsg::Cancel => Some(Cmd::Redraw),
            _ => {
                model.ui.modal = Some(Modal::Error { title, message });
                None
            }
        },

        Modal::About => match msg {
            ModalMsg::Confirm | ModalMsg::Cancel => Some(Cmd::Redraw),
            _ => {
                model.ui.modal = Some(Modal::About);
                None
            }
        },
    }
}

fn set_font_size(model: &mut AppModel, size: f32) {
    let size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
    model.font_size = size;
    model.config.font_size = size;
    if let Err(e) = model.config.save() {
        tracing::warn!("failed to persist config: {e}");
    }
}

/// Resolve the Salvar/Descartar/Cancelar prompt
fn resolve_unsaved_choice(model: &mut AppModel, choice: UnsavedChoice) -> Option<Cmd> {
    match choice {
        UnsavedChoice::Cancel => {
            // Short-circuit: buffer, path and modified flag stay untouched.
            model.session.pending = None;
            Some(Cmd::Redraw)
        }
        UnsavedChoice::Discard => {
            let pending = model.session.pending.take();
            match pending {
                Some(action) => run_pending(model, action),
                None => Some(Cmd::Redraw),
            }
        }
        UnsavedChoice::Save => {
            // Keep the pending action; it runs once the save completes.
            Some(start_save(model))
        }
    }
}

// ============================================================================
// App messages (file operations, export, window)
// ============================================================================

/// Handle application messages (file I/O, export, window, session flags)
pub fn update_app(model: &mut AppModel, msg: AppMsg) -> Option<Cmd> {
    match msg {
        AppMsg::Resize(width, height) => {
            model.window_size = (width, height);
            model.recompute_viewport();
            model.ensure_cursor_visible();
            Some(Cmd::Redraw)
        }

        AppMsg::NewFile => gate_destructive(model, PendingAction::NewFile),
        AppMsg::OpenFileDialog => gate_destructive(model, PendingAction::OpenFile),
        AppMsg::Quit => gate_destructive(model, PendingAction::Quit),

        AppMsg::SaveFile => Some(start_save(model)),
        AppMsg::SaveFileAs => Some(Cmd::ShowSaveFileDialog {
            suggested_path: model.document.file_path.clone(),
        }),

        AppMsg::ExportPdf => {
            let suggested_name = model
                .document
                .file_path
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| format!("{}.pdf", s.to_string_lossy()))
                .unwrap_or_else(|| "documento.pdf".to_string());
            Some(Cmd::ShowExportPdfDialog { suggested_name })
        }

        AppMsg::ToggleTaxIdMode => {
            model.session.tax_id_mode = model.session.tax_id_mode.toggled();
            model.ui.status_bar.show_transient(
                format!("Modo documento: {}", model.session.tax_id_mode.label()),
                2000,
            );
            Some(Cmd::Redraw)
        }

        AppMsg::IncreaseFontSize => {
            let size = model.font_size + 1.0;
            set_font_size(model, size);
            Some(Cmd::Redraw)
        }
        AppMsg::DecreaseFontSize => {
            let size = model.font_size - 1.0;
            set_font_size(model, size);
            Some(Cmd::Redraw)
        }

        AppMsg::OpenFileDialogResult { path } => match path {
            Some(path) => Some(Cmd::LoadFile { path }),
            None => None,
        },

        AppMsg::SaveFileAsDialogResult { path } => match path {
            Some(path) => {
                model.document.file_path = Some(path.clone());
                let content = model.document.text();
                Some(Cmd::batch(vec![
                    Cmd::SetWindowTitle(window_title(&model.document)),
                    Cmd::SaveFile { path, content },
                ]))
            }
            None => {
                // A cancelled Save As drops any gated destructive action.
                model.session.pending = None;
                None
            }
        },

        AppMsg::ExportPdfDialogResult { path } => match path {
            Some(path) => Some(Cmd::ExportPdf {
                path,
                content: model.document.text(),
                font_size: model.font_size,
            }),
            None => None,
        },

        AppMsg::FileLoaded { path, result } => match result {
            Ok(content) => {
                tracing::info!("opened {}", path.display());
                model.document = Document::from_loaded(path, &content);
                model.editor.cursor = Default::default();
                model.editor.clear_selection();
                model.editor.viewport.top_line = 0;
                model.editor.viewport.left_column = 0;
                Some(Cmd::batch(vec![
                    Cmd::SetWindowTitle(window_title(&model.document)),
                    Cmd::Redraw,
                ]))
            }
            Err(e) => {
                tracing::error!("failed to open {}: {e}", path.display());
                model.ui.modal = Some(Modal::Error {
                    title: "Erro".to_string(),
                    message: format!("Não foi possível abrir o arquivo:\n{e}"),
                });
                Some(Cmd::Redraw)
            }
        },

        AppMsg::SaveCompleted { path, result } => match result {
            Ok(()) => {
                tracing::info!("saved {}", path.display());
                model.document.is_modified = false;
                model
                    .ui
                    .status_bar
                    .show_transient(format!("Arquivo salvo: {}", path.display()), 3000);
                match model.session.pending.take() {
                    Some(action) => run_pending(model, action),
                    None => Some(Cmd::Redraw),
                }
            }
            Err(e) => {
                tracing::error!("failed to save {}: {e}", path.display());
                model.session.pending = None;
                model.ui.modal = Some(Modal::Error {
                    title: "Erro".to_string(),
                    message: format!("Não foi possível salvar o arquivo:\n{e}"),
                });
                Some(Cmd::Redraw)
            }
        },

        AppMsg::PdfExported { path, result } => match result {
            Ok(()) => {
                tracing::info!("exported {}", path.display());
                Some(Cmd::OpenPath { path })
            }
            Err(e) => {
                tracing::error!("pdf export failed: {e}");
                model.ui.modal = Some(Modal::Error {
                    title: "Erro".to_string(),
                    message: format!("Falha ao exportar PDF:\n{e}"),
                });
                Some(Cmd::Redraw)
            }
        },
    }
}

/// Run a destructive action now, or park it behind the unsaved-changes prompt
fn gate_destructive(model: &mut AppModel, action: PendingAction) -> Option<Cmd> {
    if model.document.is_modified {
        model.session.pending = Some(action);
        model.ui.modal = Some(Modal::UnsavedChanges {
            selected: UnsavedChoice::Save,
        });
        Some(Cmd::Redraw)
    } else {
        run_pending(model, action)
    }
}

fn run_pending(model: &mut AppModel, action: PendingAction) -> Option<Cmd> {
    match action {
        PendingAction::NewFile => {
            model.document = Document::with_text(&template::initial_text());
            model.editor.cursor = Default::default();
            model.editor.clear_selection();
            model.editor.viewport.top_line = 0;
            model.editor.viewport.left_column = 0;
            Some(Cmd::batch(vec![
                Cmd::SetWindowTitle(window_title(&model.document)),
                Cmd::Redraw,
            ]))
        }
        PendingAction::OpenFile => Some(Cmd::ShowOpenFileDialog),
        PendingAction::Quit => Some(Cmd::Quit),
    }
}

/// Save to the known path, or fall through to Save As
fn start_save(model: &mut AppModel) -> Cmd {
    match model.document.file_path.clone() {
        Some(path) => Cmd::SaveFile {
            path,
            content: model.document.text(),
        },
        None => Cmd::ShowSaveFileDialog {
            suggested_path: None,
        },
    }
}
