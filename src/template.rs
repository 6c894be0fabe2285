//! The legal boilerplate for "Lote Rural" consent declarations
//!
//! This is the one logic-bearing piece of the application: formatting the
//! fixed declaration block (CPF or CNPJ variant) and scanning the document
//! for the registry-office city to reuse in the next block.

use std::sync::OnceLock;

use regex::Regex;

/// City used in the very first document and as the factory default
pub const DEFAULT_CITY: &str = "Toledo";

/// Pattern locating a registry-office line; the capture is the city name
const CITY_PATTERN: &str = r"Serviço de Registro de Imóveis, (.+?) - Paraná";

const SEPARATOR_LINE: &str = "______________________________\n";

const CPF_LINE: &str = " — CPF Nº ..-..-..-..\n";

const CNPJ_LINE: &str = " — CNPJ Nº ..-...-.../....-..\n";

/// Closing line of every declaration block
pub const DISCLAIMER_LINE: &str = "“Estou ciente de que, nos termos do §10 do artigo 213 da LRP, minha anuência supre a participação do cônjuge e de eventuais outros condôminos titulares de nosso imóvel”.\n";

/// Which taxpayer-id variant the next inserted block carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxIdMode {
    /// Individual taxpayer id (pessoa física)
    #[default]
    Cpf,
    /// Corporate taxpayer id (pessoa jurídica)
    Cnpj,
}

impl TaxIdMode {
    /// The opposite variant
    pub fn toggled(self) -> Self {
        match self {
            TaxIdMode::Cpf => TaxIdMode::Cnpj,
            TaxIdMode::Cnpj => TaxIdMode::Cpf,
        }
    }

    /// Display label as shown in the status bar ("CPF" / "CNPJ")
    pub fn label(self) -> &'static str {
        match self {
            TaxIdMode::Cpf => "CPF",
            TaxIdMode::Cnpj => "CNPJ",
        }
    }
}

fn header_line(city: &str) -> String {
    format!(
        "Lote Rural Nº — Matrícula Nº . — º Serviço de Registro de Imóveis, {city} - Paraná\n"
    )
}

/// One declaration block: header, signature line, taxpayer-id line, disclaimer
fn declaration_block(city: &str, mode: TaxIdMode) -> String {
    let id_line = match mode {
        TaxIdMode::Cpf => CPF_LINE,
        TaxIdMode::Cnpj => CNPJ_LINE,
    };
    format!(
        "{}{}{}{}",
        header_line(city),
        SEPARATOR_LINE,
        id_line,
        DISCLAIMER_LINE
    )
}

/// The text every new document starts with
pub fn initial_text() -> String {
    declaration_block(DEFAULT_CITY, TaxIdMode::Cpf)
}

/// The block appended on Shift+Enter, separated from the previous content
/// by a blank line
pub fn appended_block(city: &str, mode: TaxIdMode) -> String {
    format!("\n\n{}", declaration_block(city, mode))
}

fn city_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CITY_PATTERN).expect("valid city pattern"))
}

/// Scan the whole document for registry-office lines and return the city of
/// the last one in document order, if any.
///
/// The inserted city tracks whatever city most recently appeared anywhere in
/// the document, not just the one from the previously inserted block.
pub fn extract_current_city(text: &str) -> Option<String> {
    city_regex()
        .captures_iter(text)
        .last()
        .map(|caps| caps[1].to_string())
}

/// City for the next inserted block: last mentioned city, or the default
pub fn city_for_next_block(text: &str, default_city: &str) -> String {
    extract_current_city(text).unwrap_or_else(|| default_city.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_text_mentions_default_city() {
        let text = initial_text();
        assert!(text.contains("Serviço de Registro de Imóveis, Toledo - Paraná"));
        assert!(text.contains("CPF Nº"));
        assert!(!text.contains("CNPJ"));
        assert!(text.contains("§10 do artigo 213 da LRP"));
    }

    #[test]
    fn extracts_city_from_initial_text() {
        assert_eq!(
            extract_current_city(&initial_text()),
            Some("Toledo".to_string())
        );
    }

    #[test]
    fn uses_last_occurrence_in_document_order() {
        let mut text = initial_text();
        text.push_str(&appended_block("Cascavel", TaxIdMode::Cpf));
        text.push_str(&appended_block("Palotina", TaxIdMode::Cpf));
        assert_eq!(extract_current_city(&text), Some("Palotina".to_string()));
    }

    #[test]
    fn tracks_city_edited_in_place() {
        // A city typed by hand anywhere in the buffer wins over the template's
        let text = format!(
            "{}Observação: º Serviço de Registro de Imóveis, Assis Chateaubriand - Paraná\n",
            initial_text()
        );
        assert_eq!(
            extract_current_city(&text),
            Some("Assis Chateaubriand".to_string())
        );
    }

    #[test]
    fn falls_back_to_default_city() {
        assert_eq!(extract_current_city("texto qualquer"), None);
        assert_eq!(city_for_next_block("texto qualquer", "Marechal"), "Marechal");
    }

    #[test]
    fn cnpj_block_swaps_only_the_id_line() {
        let cpf = appended_block("Toledo", TaxIdMode::Cpf);
        let cnpj = appended_block("Toledo", TaxIdMode::Cnpj);
        assert!(cpf.contains(" — CPF Nº ..-..-..-..\n"));
        assert!(cnpj.contains(" — CNPJ Nº ..-...-.../....-..\n"));
        assert_eq!(
            cpf.replace(CPF_LINE, ""),
            cnpj.replace(CNPJ_LINE, "")
        );
    }

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(TaxIdMode::Cpf.toggled(), TaxIdMode::Cnpj);
        assert_eq!(TaxIdMode::Cpf.toggled().toggled(), TaxIdMode::Cpf);
    }

    #[test]
    fn appended_block_starts_with_blank_line() {
        let block = appended_block("Toledo", TaxIdMode::Cpf);
        assert!(block.starts_with("\n\n"));
        assert!(block.ends_with(".\n"));
    }
}
