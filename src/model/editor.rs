//! Editor state - cursor, viewport and selection

/// A position in the document (line and column)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A text selection with anchor (start) and head (cursor end)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: Position,
    /// Where the cursor is (moving point)
    pub head: Position,
}

impl Selection {
    /// Create a new empty selection at a position
    pub fn new(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is empty (cursor without selection)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the start of the selection (smaller position)
    pub fn start(&self) -> Position {
        if self.anchor <= self.head {
            self.anchor
        } else {
            self.head
        }
    }

    /// Get the end of the selection (larger position)
    pub fn end(&self) -> Position {
        if self.anchor <= self.head {
            self.head
        } else {
            self.anchor
        }
    }

    /// Extend selection to new head position
    pub fn extend_to(&mut self, pos: Position) {
        self.head = pos;
    }

    /// Collapse both ends to a single position
    pub fn collapse_to(&mut self, pos: Position) {
        self.anchor = pos;
        self.head = pos;
    }
}

/// Cursor position in the document
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
    /// Desired column for vertical movement (preserves position when moving
    /// through short lines)
    pub desired_column: Option<usize>,
}

impl Cursor {
    /// Current position as a `Position`
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Place the cursor at a position, forgetting the desired column
    pub fn set_position(&mut self, pos: Position) {
        self.line = pos.line;
        self.column = pos.column;
        self.desired_column = None;
    }
}

/// The visible window into the document
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// First visible line (0-indexed)
    pub top_line: usize,
    /// First visible column (0-indexed, for horizontal scrolling)
    pub left_column: usize,
    /// Number of lines that fit in the text area
    pub visible_lines: usize,
    /// Number of columns that fit in the text area
    pub visible_columns: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top_line: 0,
            left_column: 0,
            visible_lines: 25,
            visible_columns: 80,
        }
    }
}

/// View-specific editing state: one cursor, one selection, one viewport
#[derive(Debug, Clone)]
pub struct EditorState {
    pub cursor: Cursor,
    pub selection: Selection,
    pub viewport: Viewport,
}

impl EditorState {
    /// Create editor state sized to the given viewport
    pub fn with_viewport(visible_lines: usize, visible_columns: usize) -> Self {
        Self {
            cursor: Cursor::default(),
            selection: Selection::default(),
            viewport: Viewport {
                top_line: 0,
                left_column: 0,
                visible_lines,
                visible_columns,
            },
        }
    }

    /// Collapse the selection onto the cursor position
    pub fn clear_selection(&mut self) {
        self.selection.collapse_to(self.cursor.position());
    }

    /// True when a non-empty range is selected
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::with_viewport(25, 80)
    }
}
