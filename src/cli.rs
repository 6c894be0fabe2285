//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Editor de documentos para declarações de anuência de lotes rurais
#[derive(Debug, Parser)]
#[command(name = "anuencia", version, about)]
pub struct Cli {
    /// Text file to open at startup
    pub file: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
