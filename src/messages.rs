//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use std::path::PathBuf;

/// Direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Editor-specific messages (cursor movement, selection, viewport scrolling)
#[derive(Debug, Clone)]
pub enum EditorMsg {
    // === Basic Movement ===
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to start of line (Home key)
    MoveCursorLineStart,
    /// Move cursor to end of line (End key)
    MoveCursorLineEnd,
    /// Move cursor to start of document (Ctrl+Home)
    MoveCursorDocumentStart,
    /// Move cursor to end of document (Ctrl+End)
    MoveCursorDocumentEnd,
    /// Move cursor by word (Ctrl+Left/Right)
    MoveCursorWord(Direction),
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Set cursor to specific position (from mouse click)
    SetCursorPosition { line: usize, column: usize },
    /// Scroll viewport vertically (positive = down, negative = up)
    Scroll(i32),
    /// Scroll viewport horizontally (positive = right, negative = left)
    ScrollHorizontal(i32),

    // === Selection Movement (Shift+key) ===
    /// Move cursor with selection (Shift+Arrow)
    MoveCursorWithSelection(Direction),
    /// Move to line start with selection (Shift+Home)
    MoveCursorLineStartWithSelection,
    /// Move to line end with selection (Shift+End)
    MoveCursorLineEndWithSelection,
    /// Move word with selection (Shift+Ctrl+Arrow)
    MoveCursorWordWithSelection(Direction),

    // === Selection Commands ===
    /// Select all text (Ctrl+A)
    SelectAll,
    /// Extend selection to position (Shift+Click / drag)
    ExtendSelectionToPosition { line: usize, column: usize },
    /// Clear the selection (collapse to cursor)
    ClearSelection,
}

/// Document-specific messages (text editing, undo/redo, clipboard)
#[derive(Debug, Clone)]
pub enum DocumentMsg {
    /// Insert a character at cursor
    InsertChar(char),
    /// Insert a newline at cursor
    InsertNewline,
    /// Append the boilerplate declaration block at the end of the buffer
    /// (Shift+Enter)
    InsertTemplate,
    /// Delete character before cursor (Backspace)
    DeleteBackward,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Delete word before cursor (Ctrl+Backspace)
    DeleteWordBackward,
    /// Delete word after cursor (Ctrl+Delete)
    DeleteWordForward,
    /// Undo last edit
    Undo,
    /// Redo last undone edit
    Redo,
    /// Copy selection to clipboard (Ctrl+C)
    Copy,
    /// Cut selection to clipboard (Ctrl+X)
    Cut,
    /// Paste from clipboard (Ctrl+V)
    Paste,
}

/// Modal-dialog messages (prompts capture the keyboard while open)
#[derive(Debug, Clone)]
pub enum ModalMsg {
    /// Insert character into the modal input
    InsertChar(char),
    /// Delete character from the modal input (backspace)
    DeleteBackward,
    /// Move the highlighted button (unsaved-changes prompt)
    FocusNext,
    /// Move the highlighted button backwards
    FocusPrev,
    /// Confirm the modal action (Enter / button click)
    Confirm,
    /// Dismiss the modal (Escape)
    Cancel,
}

/// UI-specific messages (status bar, menus, modals, cursor blink)
#[derive(Debug, Clone)]
pub enum UiMsg {
    /// Toggle cursor blink state and expire transient messages
    Tick,
    /// Set a transient status message that auto-expires
    SetTransientMessage { text: String, duration_ms: u64 },
    /// Open a menu dropdown by registry index
    OpenMenu(usize),
    /// Highlight an item in the open dropdown
    HoverMenuItem(Option<usize>),
    /// Close any open menu dropdown
    CloseMenu,
    /// Modal messages
    Modal(ModalMsg),
    /// Open the "Definir Cidade Padrão" prompt
    PromptDefaultCity,
    /// Open the "Fonte..." point size prompt
    PromptFontSize,
    /// Show the "Sobre" dialog
    ShowAbout,
    /// Show a modal error dialog
    ShowError { title: String, message: String },
}

/// Application-level messages (file operations, window events, export)
#[derive(Debug, Clone)]
pub enum AppMsg {
    /// Window resized
    Resize(u32, u32),
    /// Create a new boilerplate document (gated on unsaved changes)
    NewFile,
    /// Show the open-file dialog (gated on unsaved changes)
    OpenFileDialog,
    /// Save current file, prompting for a path if there is none
    SaveFile,
    /// Always prompt for a path, then save
    SaveFileAs,
    /// Export the buffer to PDF
    ExportPdf,
    /// Quit the application (gated on unsaved changes)
    Quit,
    /// Flip between CPF and CNPJ document variants (Ctrl+J)
    ToggleTaxIdMode,
    /// Bump the font size up (Ctrl+=)
    IncreaseFontSize,
    /// Bump the font size down (Ctrl+-)
    DecreaseFontSize,

    // === Dialog results (posted from worker threads) ===
    /// Open dialog returned a path (or None if cancelled)
    OpenFileDialogResult { path: Option<PathBuf> },
    /// Save dialog returned a path (or None if cancelled)
    SaveFileAsDialogResult { path: Option<PathBuf> },
    /// PDF export dialog returned a path (or None if cancelled)
    ExportPdfDialogResult { path: Option<PathBuf> },

    // === I/O results (posted from worker threads) ===
    /// File load completed
    FileLoaded {
        path: PathBuf,
        result: Result<String, String>,
    },
    /// File save completed
    SaveCompleted {
        path: PathBuf,
        result: Result<(), String>,
    },
    /// PDF generation completed
    PdfExported {
        path: PathBuf,
        result: Result<(), String>,
    },
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    /// Editor messages (cursor, selection, viewport)
    Editor(EditorMsg),
    /// Document messages (text editing)
    Document(DocumentMsg),
    /// UI messages (status, menus, modals)
    Ui(UiMsg),
    /// App messages (file I/O, export, window)
    App(AppMsg),
}

// Convenience constructors for common messages
impl Msg {
    /// Create a cursor movement message
    pub fn move_cursor(direction: Direction) -> Self {
        Msg::Editor(EditorMsg::MoveCursor(direction))
    }

    /// Create an insert character message
    pub fn insert_char(ch: char) -> Self {
        Msg::Document(DocumentMsg::InsertChar(ch))
    }
}
