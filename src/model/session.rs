//! Session state - the handful of fields that outlive individual edits

use crate::template::{TaxIdMode, DEFAULT_CITY};

/// A destructive action deferred behind the unsaved-changes prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Reset to a fresh boilerplate document
    NewFile,
    /// Show the open-file dialog
    OpenFile,
    /// Close the application
    Quit,
}

/// Mutable session fields, held explicitly rather than scattered through
/// the UI layer
#[derive(Debug, Clone)]
pub struct Session {
    /// Whether inserted blocks carry CPF or CNPJ placeholders
    pub tax_id_mode: TaxIdMode,
    /// City used when the document mentions no registry office yet
    pub default_city: String,
    /// Destructive action waiting on the unsaved-changes prompt or on a
    /// save completing
    pub pending: Option<PendingAction>,
}

impl Session {
    pub fn new(default_city: String) -> Self {
        Self {
            tax_id_mode: TaxIdMode::default(),
            default_city,
            pending: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_CITY.to_string())
    }
}
