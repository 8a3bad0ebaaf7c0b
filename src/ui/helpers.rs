use egui::{Button, Color32, RichText, Ui, Vec2};

pub const ERROR_COLOR: Color32 = Color32::from_rgb(0xd9, 0x3f, 0x3f);
pub const NOTICE_COLOR: Color32 = Color32::from_rgb(0x2e, 0x9e, 0x5b);

pub fn big_button(ui: &mut Ui, label: &str, width: f32, enabled: bool) -> bool {
    ui.add_enabled(enabled, Button::new(label).min_size(Vec2::new(width, 40.0)))
        .clicked()
}

pub fn error_text(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(message).color(ERROR_COLOR));
}

pub fn notice(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(message).color(NOTICE_COLOR));
}

/// Question text with a red asterisk when an answer is required.
pub fn question_label(ui: &mut Ui, text: &str, required: bool) {
    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new(text).strong());
        if required {
            ui.label(RichText::new("*").color(ERROR_COLOR));
        }
    });
}
