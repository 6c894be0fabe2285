//! A4 PDF rendering of the document buffer
//!
//! The buffer is laid out with the same monospace font the editor uses,
//! wrapped to the printable width and paginated.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use printpdf::{Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LAYER_NAME: &str = "Camada 1";

/// Points to millimeters
const PT_TO_MM: f32 = 0.352_778;

/// Advance width of a monospace glyph as a fraction of the point size
const GLYPH_ADVANCE_RATIO: f32 = 0.6;

/// Render `content` to an A4 PDF at `path`, embedding `font_data` (TTF)
pub fn export(path: &Path, content: &str, font_size: f32, font_data: &[u8]) -> Result<()> {
    let line_height_mm = font_size * 1.4 * PT_TO_MM;
    let char_width_mm = font_size * GLYPH_ADVANCE_RATIO * PT_TO_MM;
    let usable_width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let max_columns = ((usable_width_mm / char_width_mm).floor() as usize).max(1);

    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "documento".to_string());

    let (doc, page, layer) = PdfDocument::new(
        &title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let font = doc
        .add_external_font(std::io::Cursor::new(font_data))
        .map_err(|e| anyhow::anyhow!("failed to embed font: {}", e))?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM - line_height_mm;

    for line in content.split('\n') {
        for visual_line in wrap_line(line, max_columns) {
            if y < MARGIN_MM {
                let (page, layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
                current_layer = doc.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM - line_height_mm;
            }
            if !visual_line.is_empty() {
                current_layer.use_text(visual_line, font_size, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= line_height_mm;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow::anyhow!("failed to write PDF: {}", e))?;

    Ok(())
}

/// Wrap one logical line into visual lines of at most `max_columns` chars.
///
/// Breaks at word boundaries where possible; words longer than the line
/// are broken hard. An empty line yields one empty visual line.
fn wrap_line(line: &str, max_columns: usize) -> Vec<String> {
    let total: usize = line.chars().count();
    if total <= max_columns {
        return vec![line.to_string()];
    }

    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split(' ') {
        let word_len = word.chars().count();

        if word_len > max_columns {
            // Flush what we have, then break the word hard
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_columns) {
                let piece: String = chunk.iter().collect();
                if chunk.len() == max_columns {
                    result.push(piece);
                } else {
                    current_len = chunk.len();
                    current = piece;
                }
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > max_columns {
            result.push(std::mem::take(&mut current));
            current = word.to_string();
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_pass_through() {
        assert_eq!(wrap_line("olá mundo", 80), vec!["olá mundo"]);
        assert_eq!(wrap_line("", 80), vec![""]);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let wrapped = wrap_line("um dois tres quatro", 8);
        assert_eq!(wrapped, vec!["um dois", "tres", "quatro"]);
        for line in &wrapped {
            assert!(line.chars().count() <= 8);
        }
    }

    #[test]
    fn breaks_oversized_words_hard() {
        let wrapped = wrap_line("abcdefghij", 4);
        assert_eq!(wrapped, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn counts_chars_not_bytes() {
        // "çãõé" is 4 chars but 8 bytes
        let wrapped = wrap_line("çãõé çãõé", 4);
        assert_eq!(wrapped, vec!["çãõé", "çãõé"]);
    }

    #[test]
    fn oversized_word_tail_joins_next_words() {
        let wrapped = wrap_line("abcdef g", 4);
        assert_eq!(wrapped, vec!["abcd", "ef g"]);
    }
}
