use crate::answers::format_number;
use crate::api::analytics::{Dimension, Filter};
use crate::app::analytics::DimensionKind;
use crate::app::{AnalyticsView, SurveyApp};
use crate::model::{Question, QuestionId};
use crate::ui::helpers::error_text;
use crate::ui::layout::scroll_panel;
use egui::{ComboBox, Context, Grid, RichText, TextEdit, Ui};

fn bound(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

fn describe_filter(view: &AnalyticsView, filter: &Filter) -> String {
    let question = view.question_text(filter.question_id());
    match filter {
        Filter::Choice { values, .. } => format!("{question} is one of {}", values.join(", ")),
        Filter::NumericRange { min, max, .. } => {
            format!("{question} between {}..{}", bound(*min), bound(*max))
        }
    }
}

fn describe_dimension(view: &AnalyticsView, dimension: &Dimension) -> String {
    let question = view.question_text(dimension.question_id());
    let rules = match dimension {
        Dimension::NumericRange { ranges, .. } => ranges
            .iter()
            .map(|(segment, [min, max])| format!("{segment}: {}..{}", bound(*min), bound(*max)))
            .collect::<Vec<_>>(),
        Dimension::ChoiceMapping { mapping, .. } => mapping
            .iter()
            .map(|(answer, segment)| format!("{answer} → {segment}"))
            .collect(),
    };
    format!("{} by {question} ({})", dimension.name(), rules.join("; "))
}

fn question_picker(ui: &mut Ui, salt: &str, questions: &[Question], picked: &mut Option<QuestionId>) {
    let label = picked
        .and_then(|id| questions.iter().find(|q| q.id == id))
        .map_or_else(|| "Pick a question".to_string(), |q| q.text.clone());
    ComboBox::from_id_salt(salt)
        .selected_text(label)
        .width(ui.available_width().min(420.0))
        .show_ui(ui, |ui| {
            for question in questions {
                ui.selectable_value(picked, Some(question.id), &question.text);
            }
        });
}

fn filter_editor(ui: &mut Ui, view: &mut AnalyticsView) {
    ui.label(RichText::new("Filters").strong());
    let mut removed = None;
    for (idx, filter) in view.config.filters.iter().enumerate() {
        ui.horizontal(|ui| {
            if ui.small_button("✕").clicked() {
                removed = Some(idx);
            }
            ui.label(describe_filter(view, filter));
        });
    }
    if let Some(idx) = removed {
        view.remove_filter(idx);
    }

    question_picker(ui, "filter_question", &view.questions, &mut view.draft.filter_question);
    Grid::new("filter_inputs").num_columns(2).show(ui, |ui| {
        ui.label("Accepted answers");
        ui.add(TextEdit::singleline(&mut view.draft.filter_values).hint_text("A, B, C"));
        ui.end_row();
        ui.label("or range");
        ui.horizontal(|ui| {
            ui.add(TextEdit::singleline(&mut view.draft.filter_min).hint_text("min").desired_width(70.0));
            ui.label("to");
            ui.add(TextEdit::singleline(&mut view.draft.filter_max).hint_text("max").desired_width(70.0));
        });
        ui.end_row();
    });
    if ui.button("Add filter").clicked() {
        view.add_filter();
    }
}

fn segmentation_editor(ui: &mut Ui, view: &mut AnalyticsView) {
    ui.label(RichText::new("Segments").strong());
    let mut removed = None;
    for (idx, dimension) in view.config.segmentation.dimensions.iter().enumerate() {
        ui.horizontal_wrapped(|ui| {
            if ui.small_button("✕").clicked() {
                removed = Some(idx);
            }
            ui.label(describe_dimension(view, dimension));
        });
    }
    if let Some(idx) = removed {
        view.remove_dimension(idx);
    }

    ui.add(TextEdit::singleline(&mut view.draft.dimension_name).hint_text("Dimension name"));
    question_picker(ui, "dimension_question", &view.questions, &mut view.draft.dimension_question);
    ui.horizontal(|ui| {
        let kind = &mut view.draft.dimension_kind;
        ui.radio_value(kind, DimensionKind::NumericRange, "Numeric ranges");
        ui.radio_value(kind, DimensionKind::ChoiceMapping, "Answer mapping");
    });
    let hint = match view.draft.dimension_kind {
        DimensionKind::NumericRange => "Small: ..10\nMedium: 10..50\nLarge: 50..",
        DimensionKind::ChoiceMapping => "London => South\nLeeds => North",
    };
    ui.add(
        TextEdit::multiline(&mut view.draft.dimension_rules)
            .hint_text(hint)
            .desired_rows(3)
            .desired_width(ui.available_width().min(420.0)),
    );
    if ui.button("Add dimension").clicked() {
        view.add_dimension();
    }
}

fn preview_panel(ui: &mut Ui, view: &AnalyticsView) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Preview").strong());
        if view.is_previewing() {
            ui.spinner();
        }
    });
    if let Some(err) = &view.preview_error {
        error_text(ui, err);
    }
    let Some(preview) = &view.preview else {
        return;
    };

    let count = |n: Option<u64>| n.map_or_else(|| "–".to_string(), |n| n.to_string());
    ui.label(format!(
        "{} of {} responses match",
        count(preview.filtered_count()),
        count(preview.total_count())
    ));

    let order = preview.segment_order();
    if order.is_empty() {
        return;
    }
    Grid::new("segments").striped(true).num_columns(2).show(ui, |ui| {
        for segment in &order {
            ui.label(segment);
            ui.label(count(preview.segment_count(segment)));
            ui.end_row();
        }
    });
}

pub fn ui_analytics(app: &mut SurveyApp, ctx: &Context) {
    let mut back = false;
    let mut export = false;

    scroll_panel(ctx, 860.0, |ui| {
        let Some(view) = app.analytics.as_mut() else {
            back = true;
            return;
        };

        ui.horizontal(|ui| {
            if ui.button("⬅ Dashboard").clicked() {
                back = true;
            }
            ui.heading(format!("Analytics · {}", view.survey.title));
        });
        if view.questions_request.is_some() {
            ui.label(RichText::new("Loading questions…").weak());
        }
        ui.separator();

        filter_editor(ui, view);
        ui.add_space(10.0);
        segmentation_editor(ui, view);
        if let Some(err) = &view.draft.error {
            error_text(ui, err);
        }
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.add_enabled(!view.config.is_empty(), egui::Button::new("Clear all")).clicked() {
                view.clear_config();
            }
            if ui.button("Export CSV").clicked() {
                export = true;
            }
        });
        ui.separator();
        preview_panel(ui, view);
    });

    if export {
        app.export_analytics(ctx);
    }
    if back {
        app.back_to_dashboard();
    }
}
