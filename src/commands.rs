//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.
//! This module also holds the menu/toolbar registry: every menu item and
//! toolbar button dispatches a `MenuAction`, which maps onto the same
//! messages the keyboard shortcuts produce.

use std::path::PathBuf;

use crate::messages::{AppMsg, DocumentMsg, EditorMsg, Msg, UiMsg};

// ============================================================================
// Menu / toolbar registry
// ============================================================================

/// Identifies an action reachable from the menu bar or the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    // Arquivo
    NewFile,
    OpenFile,
    SaveFile,
    SaveFileAs,
    ExportPdf,
    Quit,

    // Editar
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,

    // Formatar
    FontDialog,
    ToggleTaxIdMode,
    SetDefaultCity,

    // Ajuda
    About,
}

impl MenuAction {
    /// The message this action dispatches
    pub fn to_msg(self) -> Msg {
        match self {
            MenuAction::NewFile => Msg::App(AppMsg::NewFile),
            MenuAction::OpenFile => Msg::App(AppMsg::OpenFileDialog),
            MenuAction::SaveFile => Msg::App(AppMsg::SaveFile),
            MenuAction::SaveFileAs => Msg::App(AppMsg::SaveFileAs),
            MenuAction::ExportPdf => Msg::App(AppMsg::ExportPdf),
            MenuAction::Quit => Msg::App(AppMsg::Quit),
            MenuAction::Undo => Msg::Document(DocumentMsg::Undo),
            MenuAction::Redo => Msg::Document(DocumentMsg::Redo),
            MenuAction::Cut => Msg::Document(DocumentMsg::Cut),
            MenuAction::Copy => Msg::Document(DocumentMsg::Copy),
            MenuAction::Paste => Msg::Document(DocumentMsg::Paste),
            MenuAction::SelectAll => Msg::Editor(EditorMsg::SelectAll),
            MenuAction::FontDialog => Msg::Ui(UiMsg::PromptFontSize),
            MenuAction::ToggleTaxIdMode => Msg::App(AppMsg::ToggleTaxIdMode),
            MenuAction::SetDefaultCity => Msg::Ui(UiMsg::PromptDefaultCity),
            MenuAction::About => Msg::Ui(UiMsg::ShowAbout),
        }
    }
}

/// One entry in a dropdown menu
#[derive(Debug, Clone, Copy)]
pub enum MenuEntry {
    Item {
        action: MenuAction,
        label: &'static str,
        shortcut: Option<&'static str>,
    },
    Separator,
}

/// A top-level menu with its dropdown entries
#[derive(Debug, Clone, Copy)]
pub struct MenuDef {
    pub title: &'static str,
    pub entries: &'static [MenuEntry],
}

/// Static registry of the menu bar
pub static MENUS: &[MenuDef] = &[
    MenuDef {
        title: "Arquivo",
        entries: &[
            MenuEntry::Item {
                action: MenuAction::NewFile,
                label: "Novo",
                shortcut: Some("Ctrl+N"),
            },
            MenuEntry::Item {
                action: MenuAction::OpenFile,
                label: "Abrir",
                shortcut: Some("Ctrl+O"),
            },
            MenuEntry::Item {
                action: MenuAction::SaveFile,
                label: "Salvar",
                shortcut: Some("Ctrl+S"),
            },
            MenuEntry::Item {
                action: MenuAction::SaveFileAs,
                label: "Salvar como...",
                shortcut: None,
            },
            MenuEntry::Separator,
            MenuEntry::Item {
                action: MenuAction::ExportPdf,
                label: "Exportar PDF",
                shortcut: Some("Ctrl+P"),
            },
            MenuEntry::Separator,
            MenuEntry::Item {
                action: MenuAction::Quit,
                label: "Sair",
                shortcut: Some("Ctrl+Q"),
            },
        ],
    },
    MenuDef {
        title: "Editar",
        entries: &[
            MenuEntry::Item {
                action: MenuAction::Undo,
                label: "Desfazer",
                shortcut: Some("Ctrl+Z"),
            },
            MenuEntry::Item {
                action: MenuAction::Redo,
                label: "Refazer",
                shortcut: Some("Ctrl+Y"),
            },
            MenuEntry::Separator,
            MenuEntry::Item {
                action: MenuAction::Cut,
                label: "Cortar",
                shortcut: Some("Ctrl+X"),
            },
            MenuEntry::Item {
                action: MenuAction::Copy,
                label: "Copiar",
                shortcut: Some("Ctrl+C"),
            },
            MenuEntry::Item {
                action: MenuAction::Paste,
                label: "Colar",
                shortcut: Some("Ctrl+V"),
            },
            MenuEntry::Separator,
            MenuEntry::Item {
                action: MenuAction::SelectAll,
                label: "Selecionar Tudo",
                shortcut: Some("Ctrl+A"),
            },
        ],
    },
    MenuDef {
        title: "Formatar",
        entries: &[
            MenuEntry::Item {
                action: MenuAction::FontDialog,
                label: "Fonte...",
                shortcut: None,
            },
            MenuEntry::Separator,
            MenuEntry::Item {
                action: MenuAction::ToggleTaxIdMode,
                label: "Alternar CPF/CNPJ",
                shortcut: Some("Ctrl+J"),
            },
            MenuEntry::Item {
                action: MenuAction::SetDefaultCity,
                label: "Definir Cidade Padrão",
                shortcut: None,
            },
        ],
    },
    MenuDef {
        title: "Ajuda",
        entries: &[MenuEntry::Item {
            action: MenuAction::About,
            label: "Sobre",
            shortcut: None,
        }],
    },
];

/// One entry in the toolbar: a text button or a separator
#[derive(Debug, Clone, Copy)]
pub enum ToolbarEntry {
    Button {
        action: MenuAction,
        label: &'static str,
    },
    Separator,
}

/// Static registry of the toolbar, mirroring the most used file/edit actions
pub static TOOLBAR: &[ToolbarEntry] = &[
    ToolbarEntry::Button {
        action: MenuAction::NewFile,
        label: "Novo",
    },
    ToolbarEntry::Button {
        action: MenuAction::OpenFile,
        label: "Abrir",
    },
    ToolbarEntry::Button {
        action: MenuAction::SaveFile,
        label: "Salvar",
    },
    ToolbarEntry::Separator,
    ToolbarEntry::Button {
        action: MenuAction::Cut,
        label: "Cortar",
    },
    ToolbarEntry::Button {
        action: MenuAction::Copy,
        label: "Copiar",
    },
    ToolbarEntry::Button {
        action: MenuAction::Paste,
        label: "Colar",
    },
    ToolbarEntry::Separator,
    ToolbarEntry::Button {
        action: MenuAction::ExportPdf,
        label: "Exportar PDF",
    },
];

// ============================================================================
// Side-effect commands
// ============================================================================

/// Side effects requested by `update`, executed by the runtime
#[derive(Debug, Clone, Default)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Request a full redraw of the UI
    Redraw,
    /// Execute multiple commands
    Batch(Vec<Cmd>),

    /// Save file on a worker thread; answers with `AppMsg::SaveCompleted`
    SaveFile { path: PathBuf, content: String },
    /// Load file on a worker thread; answers with `AppMsg::FileLoaded`
    LoadFile { path: PathBuf },

    /// Show native open file dialog (*.txt filter)
    ShowOpenFileDialog,
    /// Show native save file dialog (*.txt filter)
    ShowSaveFileDialog { suggested_path: Option<PathBuf> },
    /// Show native save dialog for the PDF target (*.pdf filter)
    ShowExportPdfDialog { suggested_name: String },

    /// Render the buffer to an A4 PDF on a worker thread; answers with
    /// `AppMsg::PdfExported`
    ExportPdf {
        path: PathBuf,
        content: String,
        font_size: f32,
    },
    /// Open a file with the OS default handler
    OpenPath { path: PathBuf },

    /// Update the window title
    SetWindowTitle(String),
    /// Request application exit
    Quit,
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            _ => false,
        }
    }
}
