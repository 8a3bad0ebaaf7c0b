//! One widget per question kind.
//!
//! Widgets read the current answer from the flow, edit a local copy and hand
//! the result back through `set_answer`, so every edit goes through the same
//! revalidation path.

use crate::answers::{Answer, Cell, set_grid_choice, toggle_choice, toggle_grid_choice};
use crate::model::{
    ChoiceStyle, OTHER_OPTION, Question, QuestionKind, SliderScale, SubfieldType, SubfieldValidation,
};
use crate::survey::options::{MAX_OPTIONS_PER_COLUMN, organize_options_into_columns};
use crate::survey::{QuestionDisplay, SurveyFlow};
use crate::ui::helpers::{error_text, question_label};
use egui::{ComboBox, Grid, RichText, Slider, TextEdit, Ui};
use std::collections::BTreeMap;

pub fn question_widget(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    if matches!(question.kind, QuestionKind::Malformed { .. }) {
        return;
    }

    ui.push_id(question.id, |ui| {
        question_label(ui, &question.text, question.is_required);
        ui.add_space(4.0);

        match &question.kind {
            QuestionKind::Text | QuestionKind::Email => text_input(ui, flow, question, ""),
            QuestionKind::Number(_) => text_input(ui, flow, question, "0"),
            QuestionKind::Date => text_input(ui, flow, question, "YYYY-MM-DD"),
            QuestionKind::Time => text_input(ui, flow, question, "HH:MM"),
            QuestionKind::Choice { style } => match style {
                ChoiceStyle::Radio => radio_choice(ui, flow, question),
                ChoiceStyle::Dropdown => dropdown_choice(ui, flow, question),
                ChoiceStyle::YesNo => yes_no_choice(ui, flow, question),
            },
            QuestionKind::MultiChoice { .. } => multi_choice(ui, flow, question),
            QuestionKind::FormFields {
                subfields,
                validations,
            } => form_fields(ui, flow, question, subfields, validations),
            QuestionKind::Grid { multi, .. } => grid(ui, flow, question, *multi),
            QuestionKind::Slider(scale) => slider(ui, flow, question, scale),
            QuestionKind::Malformed { .. } => {}
        }

        if let Some(err) = flow.error_for(question.id) {
            error_text(ui, err);
        }
    });
}

fn current_text(flow: &SurveyFlow, question: &Question) -> String {
    flow.answer(question.id)
        .map(Answer::display_text)
        .unwrap_or_default()
}

fn text_input(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question, hint: &str) {
    let mut text = current_text(flow, question);
    let response = ui.add(
        TextEdit::singleline(&mut text)
            .hint_text(hint)
            .desired_width(ui.available_width().min(420.0)),
    );
    if response.changed() {
        if text.is_empty() {
            flow.clear_answer(question.id);
        } else {
            flow.set_answer(question.id, Answer::Text(text));
        }
    }
    if response.lost_focus() {
        flow.blur(question.id);
    }
}

fn display_options(flow: &SurveyFlow, question: &Question) -> Vec<String> {
    match flow.display(question.id) {
        Some(QuestionDisplay::Options(display)) => display.options.clone(),
        _ => question.options.clone(),
    }
}

/// Free-text box under a selected "Other" option.
fn other_text_input(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    let mut text = flow.other_text(question.id).to_string();
    let response = ui.add(
        TextEdit::singleline(&mut text)
            .hint_text("Please specify")
            .desired_width(ui.available_width().min(360.0)),
    );
    if response.changed() {
        flow.set_other_text(question.id, text);
    }
    if response.lost_focus() {
        flow.blur(question.id);
    }
}

fn radio_choice(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    let selected = current_text(flow, question);
    let options = display_options(flow, question);
    let columns = organize_options_into_columns(&options, MAX_OPTIONS_PER_COLUMN);

    let mut picked = None;
    ui.columns(columns.len().max(1), |cols| {
        for (col, options) in cols.iter_mut().zip(&columns) {
            for option in options {
                if col.radio(selected == *option, option).clicked() {
                    picked = Some(option.clone());
                }
            }
        }
    });
    if let Some(option) = picked {
        flow.set_answer(question.id, Answer::Text(option));
    }
    if current_text(flow, question) == OTHER_OPTION {
        other_text_input(ui, flow, question);
    }
}

fn dropdown_choice(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    let mut selected = current_text(flow, question);
    let before = selected.clone();
    let label = if selected.is_empty() {
        "Select an option".to_string()
    } else {
        selected.clone()
    };

    ComboBox::from_id_salt("dropdown")
        .selected_text(label)
        .width(ui.available_width().min(360.0))
        .show_ui(ui, |ui| {
            for option in display_options(flow, question) {
                ui.selectable_value(&mut selected, option.clone(), option);
            }
        });

    if selected != before {
        flow.set_answer(question.id, Answer::Text(selected.clone()));
    }
    if selected == OTHER_OPTION {
        other_text_input(ui, flow, question);
    }
}

fn yes_no_choice(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    let selected = current_text(flow, question);
    let mut options = display_options(flow, question);
    if options.is_empty() {
        options = vec!["Yes".to_string(), "No".to_string()];
    }

    let mut picked = None;
    ui.horizontal(|ui| {
        for option in &options {
            if ui.radio(selected == *option, option).clicked() {
                picked = Some(option.clone());
            }
        }
    });
    if let Some(option) = picked {
        flow.set_answer(question.id, Answer::Text(option));
    }
    if current_text(flow, question) == OTHER_OPTION {
        other_text_input(ui, flow, question);
    }
}

fn multi_choice(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question) {
    let mut selected: Vec<String> = flow
        .answer(question.id)
        .and_then(Answer::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    let exclusive = question.has_none_option.then(|| question.none_label());
    let options = display_options(flow, question);
    let columns = organize_options_into_columns(&options, MAX_OPTIONS_PER_COLUMN);

    let mut toggled = None;
    ui.columns(columns.len().max(1), |cols| {
        for (col, options) in cols.iter_mut().zip(&columns) {
            for option in options {
                let mut checked = selected.contains(option);
                if col.checkbox(&mut checked, option).clicked() {
                    toggled = Some(option.clone());
                }
            }
        }
    });

    if let Some(option) = toggled {
        toggle_choice(&mut selected, &option, exclusive);
        if selected.is_empty() {
            flow.clear_answer(question.id);
        } else {
            flow.set_answer(question.id, Answer::List(selected.clone()));
        }
    }
    if selected.iter().any(|s| s == OTHER_OPTION) {
        other_text_input(ui, flow, question);
    }
}

fn form_fields(
    ui: &mut Ui,
    flow: &mut SurveyFlow,
    question: &Question,
    subfields: &[String],
    validations: &BTreeMap<String, SubfieldValidation>,
) {
    let mut map = flow
        .answer(question.id)
        .and_then(Answer::as_map)
        .cloned()
        .unwrap_or_default();
    let mut changed = false;
    let mut blurred = false;

    Grid::new("form_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for subfield in subfields {
                let rule = validations.get(subfield);
                let kind = rule.map(|r| r.kind).unwrap_or_default();
                let required = rule.is_some_and(|r| r.required);

                if required {
                    ui.label(format!("{subfield} *"));
                } else {
                    ui.label(subfield);
                }

                let mut text = map.get(subfield).map(Cell::display_text).unwrap_or_default();
                if kind == SubfieldType::AutoCalculate {
                    let shown = if text.is_empty() { "–".to_string() } else { text };
                    ui.label(RichText::new(shown).strong());
                } else {
                    let response = ui.add(TextEdit::singleline(&mut text).desired_width(200.0));
                    if response.changed() {
                        if text.trim().is_empty() {
                            map.remove(subfield);
                        } else {
                            map.insert(subfield.clone(), Cell::Text(text));
                        }
                        changed = true;
                    }
                    blurred |= response.lost_focus();
                }
                ui.end_row();
            }
        });

    if changed {
        flow.set_answer(question.id, Answer::Map(map));
    }
    if blurred {
        flow.blur(question.id);
    }
}

fn grid(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question, multi: bool) {
    let Some(QuestionDisplay::Grid { rows, columns }) = flow.display(question.id).cloned() else {
        return;
    };
    let mut map = flow
        .answer(question.id)
        .and_then(Answer::as_map)
        .cloned()
        .unwrap_or_default();
    let exclusive = question.exclusive_column.as_deref();
    let mut changed = false;

    egui::ScrollArea::horizontal().show(ui, |ui| {
        Grid::new("grid").striped(true).show(ui, |ui| {
            ui.label("");
            for column in &columns {
                ui.label(RichText::new(column).small());
            }
            ui.end_row();

            for row in &rows {
                ui.label(row);
                for column in &columns {
                    let cell = map.get(row);
                    if multi {
                        let mut checked = cell
                            .and_then(Cell::as_list)
                            .is_some_and(|items| items.contains(column));
                        if ui.checkbox(&mut checked, "").clicked() {
                            toggle_grid_choice(&mut map, row, column, exclusive);
                            changed = true;
                        }
                    } else {
                        let checked = cell.and_then(Cell::as_text) == Some(column.as_str());
                        if ui.radio(checked, "").clicked() {
                            set_grid_choice(&mut map, row, column);
                            changed = true;
                        }
                    }
                }
                ui.end_row();
            }
        });
    });

    if changed {
        if map.is_empty() {
            flow.clear_answer(question.id);
        } else {
            flow.set_answer(question.id, Answer::Map(map));
        }
    }
}

fn slider(ui: &mut Ui, flow: &mut SurveyFlow, question: &Question, scale: &SliderScale) {
    let answered = flow.answer(question.id).and_then(Answer::as_number);
    let mut value = answered.unwrap_or(scale.min as f64);

    ui.horizontal(|ui| {
        ui.label(RichText::new(&scale.min_label).weak());
        let response = ui.add(
            Slider::new(&mut value, scale.min as f64..=scale.max as f64)
                .step_by(scale.step.max(1) as f64)
                .integer(),
        );
        ui.label(RichText::new(&scale.max_label).weak());
        if response.changed() || (answered.is_none() && response.clicked()) {
            flow.set_answer(question.id, Answer::Number(value));
        }
        if response.drag_stopped() {
            flow.blur(question.id);
        }
    });
    if answered.is_none() {
        ui.label(RichText::new("Move the slider to answer").weak().small());
    }
}
