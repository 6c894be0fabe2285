//! Status bar segments and transient messages

mod common;

use std::path::PathBuf;

use anuencia::messages::{AppMsg, Direction, Msg, UiMsg};
use anuencia::model::{SegmentContent, SegmentId, SegmentPosition};
use anuencia::update::update;
use common::{boilerplate_model, test_model, type_str};

fn segment_text(model: &anuencia::AppModel, id: SegmentId) -> String {
    model
        .ui
        .status_bar
        .get(id)
        .map(|s| s.content.display_text().to_string())
        .unwrap_or_default()
}

#[test]
fn cursor_segment_is_one_based() {
    let mut model = test_model("abc\ndef\n", 0, 0);
    update(&mut model, Msg::move_cursor(Direction::Down));
    update(&mut model, Msg::move_cursor(Direction::Right));

    assert_eq!(
        segment_text(&model, SegmentId::CursorPosition),
        "Linha: 2, Coluna: 2"
    );
}

#[test]
fn counts_follow_the_buffer() {
    let mut model = test_model("", 0, 0);
    type_str(&mut model, "um dois tres");

    assert_eq!(segment_text(&model, SegmentId::CharCount), "Caracteres: 12");
    assert_eq!(segment_text(&model, SegmentId::WordCount), "Palavras: 3");
}

#[test]
fn file_name_segment_tracks_the_loaded_file() {
    let mut model = boilerplate_model();
    assert!(model
        .ui
        .status_bar
        .get(SegmentId::FileName)
        .is_some_and(|s| s.content.is_empty()));

    update(
        &mut model,
        Msg::App(AppMsg::FileLoaded {
            path: PathBuf::from("/tmp/declaracao.txt"),
            result: Ok("texto\n".to_string()),
        }),
    );

    assert_eq!(
        segment_text(&model, SegmentId::FileName),
        "Arquivo: declaracao.txt"
    );
}

#[test]
fn modified_indicator_appears_and_clears() {
    let mut model = boilerplate_model();
    assert!(model
        .ui
        .status_bar
        .get(SegmentId::ModifiedIndicator)
        .is_some_and(|s| s.content.is_empty()));

    type_str(&mut model, "x");
    assert_eq!(segment_text(&model, SegmentId::ModifiedIndicator), "●");

    update(
        &mut model,
        Msg::App(AppMsg::SaveCompleted {
            path: PathBuf::from("/tmp/declaracao.txt"),
            result: Ok(()),
        }),
    );
    assert!(model
        .ui
        .status_bar
        .get(SegmentId::ModifiedIndicator)
        .is_some_and(|s| s.content.is_empty()));
}

#[test]
fn tax_id_segment_follows_the_session_mode() {
    let mut model = boilerplate_model();
    assert_eq!(segment_text(&model, SegmentId::TaxIdMode), "CPF");

    update(&mut model, Msg::App(AppMsg::ToggleTaxIdMode));
    assert_eq!(segment_text(&model, SegmentId::TaxIdMode), "CNPJ");

    update(&mut model, Msg::App(AppMsg::ToggleTaxIdMode));
    assert_eq!(segment_text(&model, SegmentId::TaxIdMode), "CPF");
}

#[test]
fn transient_message_expires_on_tick() {
    let mut model = boilerplate_model();
    update(
        &mut model,
        Msg::Ui(UiMsg::SetTransientMessage {
            text: "pronto".to_string(),
            duration_ms: 0,
        }),
    );
    assert!(model.ui.status_bar.transient.is_some());

    update(&mut model, Msg::Ui(UiMsg::Tick));
    assert!(model.ui.status_bar.transient.is_none());
}

#[test]
fn tick_does_not_drop_a_live_transient() {
    let mut model = boilerplate_model();
    update(
        &mut model,
        Msg::Ui(UiMsg::SetTransientMessage {
            text: "salvando...".to_string(),
            duration_ms: 60_000,
        }),
    );
    update(&mut model, Msg::Ui(UiMsg::Tick));
    assert!(model.ui.status_bar.transient.is_some());
}

#[test]
fn visible_skips_empty_segments() {
    let model = boilerplate_model();
    let left: Vec<SegmentId> = model
        .ui
        .status_bar
        .visible(SegmentPosition::Left)
        .map(|s| s.id)
        .collect();
    assert!(left.contains(&SegmentId::CursorPosition));
    assert!(!left.contains(&SegmentId::FileName));

    let right: Vec<SegmentId> = model
        .ui
        .status_bar
        .visible(SegmentPosition::Right)
        .map(|s| s.id)
        .collect();
    assert_eq!(right, vec![SegmentId::TaxIdMode]);
}

#[test]
fn segment_content_display_text() {
    assert!(SegmentContent::Empty.is_empty());
    assert_eq!(SegmentContent::Text("oi".into()).display_text(), "oi");
}
