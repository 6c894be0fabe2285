//! Shift+Enter declaration block insertion

mod common;

use anuencia::messages::{DocumentMsg, EditorMsg, Msg};
use anuencia::template::{self, TaxIdMode};
use anuencia::update::update;
use common::{boilerplate_model, buffer_to_string, test_model};

#[test]
fn block_is_appended_at_buffer_end_regardless_of_cursor() {
    let mut model = boilerplate_model();
    // Park the cursor in the middle of the first line
    update(
        &mut model,
        Msg::Editor(EditorMsg::SetCursorPosition { line: 0, column: 5 }),
    );

    let before = buffer_to_string(&model);
    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let after = buffer_to_string(&model);
    assert!(after.starts_with(&before));
    assert!(after.ends_with(template::DISCLAIMER_LINE));

    // Cursor follows the insertion to the very end
    let (line, column) = model.document.end_position();
    assert_eq!(model.editor.cursor.line, line);
    assert_eq!(model.editor.cursor.column, column);
}

#[test]
fn new_block_reuses_last_city_in_document() {
    let mut text = template::initial_text();
    text.push_str(&template::appended_block("Cascavel", TaxIdMode::Cpf));
    let mut model = test_model(&text, 0, 0);

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let after = buffer_to_string(&model);
    let tail = &after[text.len()..];
    assert!(tail.contains("Serviço de Registro de Imóveis, Cascavel - Paraná"));
}

#[test]
fn city_edited_by_hand_wins() {
    // The user replaced the city inside the existing header
    let text = template::initial_text().replace("Toledo", "Palotina");
    let mut model = test_model(&text, 0, 0);

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let after = buffer_to_string(&model);
    let tail = &after[text.len()..];
    assert!(tail.contains("Palotina"));
    assert!(!tail.contains("Toledo"));
}

#[test]
fn falls_back_to_session_default_city() {
    let mut model = test_model("anotações sem cabeçalho\n", 0, 0);
    model.session.default_city = "Marechal Cândido Rondon".to_string();

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    assert!(buffer_to_string(&model)
        .contains("Serviço de Registro de Imóveis, Marechal Cândido Rondon - Paraná"));
}

#[test]
fn cnpj_mode_inserts_cnpj_line() {
    let mut model = boilerplate_model();
    model.session.tax_id_mode = TaxIdMode::Cnpj;

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let text = buffer_to_string(&model);
    let appended = &text[template::initial_text().len()..];
    assert!(appended.contains("CNPJ Nº ..-...-.../....-.."));
    assert!(!appended.contains("CPF Nº"));
}

#[test]
fn insertion_is_separated_by_blank_line() {
    let mut model = boilerplate_model();
    let before_len = buffer_to_string(&model).len();

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let text = buffer_to_string(&model);
    assert!(text[before_len..].starts_with("\n\n"));
}

#[test]
fn insertion_is_one_undo_step() {
    let mut model = boilerplate_model();
    let before = buffer_to_string(&model);

    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));
    assert_ne!(buffer_to_string(&model), before);
    assert!(model.document.is_modified);

    update(&mut model, Msg::Document(DocumentMsg::Undo));
    assert_eq!(buffer_to_string(&model), before);
}

#[test]
fn consecutive_insertions_accumulate_blocks() {
    let mut model = boilerplate_model();
    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));
    update(&mut model, Msg::Document(DocumentMsg::InsertTemplate));

    let text = buffer_to_string(&model);
    assert_eq!(text.matches(template::DISCLAIMER_LINE).count(), 3);
    assert_eq!(
        text.matches("Serviço de Registro de Imóveis, Toledo - Paraná")
            .count(),
        3
    );
}
