//! Anuência - editor de documentos para lotes rurais
//!
//! This crate provides the core types and logic for a small word-processor
//! specialized in drafting "Lote Rural" consent declarations, implementing
//! the Elm Architecture pattern.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod logging;
pub mod messages;
pub mod model;
pub mod pdf;
pub mod template;
pub mod theme;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::EditorConfig;
pub use messages::Msg;
pub use model::AppModel;
pub use theme::Theme;
