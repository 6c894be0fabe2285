//! Status bar model - segments and transient messages

use std::time::{Duration, Instant};

/// Identifier for status bar segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    /// Cursor position ("Linha: 1, Coluna: 1")
    CursorPosition,
    /// Character count ("Caracteres: 240")
    CharCount,
    /// Word count ("Palavras: 42")
    WordCount,
    /// File name ("Arquivo: anuencia.txt")
    FileName,
    /// Modified indicator ("●")
    ModifiedIndicator,
    /// CPF/CNPJ mode
    TaxIdMode,
    /// Transient status messages ("Arquivo salvo: ...")
    StatusMessage,
}

/// Position of a segment in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentPosition {
    Left,
    Right,
}

/// Content of a segment
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentContent {
    /// Empty/hidden segment
    Empty,
    /// Text content
    Text(String),
}

impl SegmentContent {
    pub fn display_text(&self) -> &str {
        match self {
            SegmentContent::Empty => "",
            SegmentContent::Text(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SegmentContent::Empty => true,
            SegmentContent::Text(s) => s.is_empty(),
        }
    }
}

/// A single segment in the status bar
#[derive(Debug, Clone)]
pub struct StatusSegment {
    pub id: SegmentId,
    pub position: SegmentPosition,
    pub content: SegmentContent,
}

impl StatusSegment {
    pub fn new(id: SegmentId, content: SegmentContent) -> Self {
        let position = match id {
            SegmentId::CursorPosition
            | SegmentId::CharCount
            | SegmentId::WordCount
            | SegmentId::FileName
            | SegmentId::StatusMessage => SegmentPosition::Left,
            SegmentId::ModifiedIndicator | SegmentId::TaxIdMode => SegmentPosition::Right,
        };
        Self {
            id,
            position,
            content,
        }
    }
}

/// A status message that expires on its own
#[derive(Debug, Clone)]
pub struct TransientMessage {
    pub text: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl TransientMessage {
    pub fn new(text: String, duration_ms: u64) -> Self {
        Self {
            text,
            shown_at: Instant::now(),
            duration: Duration::from_millis(duration_ms),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.duration
    }
}

/// The complete status bar state
#[derive(Debug, Clone)]
pub struct StatusBar {
    segments: Vec<StatusSegment>,
    /// Transient message overriding the left side while alive
    pub transient: Option<TransientMessage>,
}

impl StatusBar {
    /// Create a new status bar with default segments
    pub fn new() -> Self {
        Self {
            segments: vec![
                StatusSegment::new(
                    SegmentId::CursorPosition,
                    SegmentContent::Text("Linha: 1, Coluna: 1".into()),
                ),
                StatusSegment::new(
                    SegmentId::CharCount,
                    SegmentContent::Text("Caracteres: 0".into()),
                ),
                StatusSegment::new(
                    SegmentId::WordCount,
                    SegmentContent::Text("Palavras: 0".into()),
                ),
                StatusSegment::new(SegmentId::FileName, SegmentContent::Empty),
                StatusSegment::new(SegmentId::StatusMessage, SegmentContent::Empty),
                StatusSegment::new(SegmentId::ModifiedIndicator, SegmentContent::Empty),
                StatusSegment::new(SegmentId::TaxIdMode, SegmentContent::Text("CPF".into())),
            ],
            transient: None,
        }
    }

    /// Get a segment by ID
    pub fn get(&self, id: SegmentId) -> Option<&StatusSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Replace the content of a segment
    pub fn set(&mut self, id: SegmentId, content: SegmentContent) {
        if let Some(seg) = self.segments.iter_mut().find(|s| s.id == id) {
            seg.content = content;
        }
    }

    /// Segments on one side, in declaration order, skipping empty ones
    pub fn visible(&self, position: SegmentPosition) -> impl Iterator<Item = &StatusSegment> {
        self.segments
            .iter()
            .filter(move |s| s.position == position && !s.content.is_empty())
    }

    /// Show a transient message for `duration_ms` milliseconds
    pub fn show_transient(&mut self, text: String, duration_ms: u64) {
        self.transient = Some(TransientMessage::new(text, duration_ms));
    }

    /// Drop the transient message if its time is up; true when state changed
    pub fn expire_transient(&mut self) -> bool {
        if self.transient.as_ref().is_some_and(|t| t.is_expired()) {
            self.transient = None;
            true
        } else {
            false
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
