//! Per-question answer validation.
//!
//! Every check is a pure function of the question, its answer and the "Other"
//! free texts; the caller decides where the returned message is shown.

use crate::answers::{Answer, Cell, OtherTexts};
use crate::model::{
    NumberSign, OTHER_OPTION, Question, QuestionKind, SliderScale, SubfieldType,
    SubfieldValidation,
};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_NUMBER: &str = "Please enter a valid number";
pub const NOT_POSITIVE: &str = "Please enter a positive number";
pub const NOT_NEGATIVE: &str = "Please enter a negative number";
pub const OTHER_TEXT_MISSING: &str = "Please specify your 'Other' option";
pub const GRID_ROWS_MISSING: &str = "Please answer every row";
pub const GRID_MULTI_ROWS_MISSING: &str = "Please select at least one option for every row";
pub const INVALID_DATE: &str = "Please enter a valid date";
pub const INVALID_TIME: &str = "Please enter a valid time";

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Presence test shared by every kind: numbers (zero and negatives included)
/// count, strings must have non-blank content, lists must be non-empty, and any
/// object counts (its content is checked per kind).
pub fn is_present(value: Option<&Answer>) -> bool {
    match value {
        None => false,
        Some(Answer::Number(_)) => true,
        Some(Answer::Text(s)) => !s.trim().is_empty(),
        Some(Answer::List(items)) => !items.is_empty(),
        Some(Answer::Map(_)) => true,
    }
}

/// Returns the message to show for `value`, or `None` when it is acceptable.
pub fn validate(question: &Question, value: Option<&Answer>, other_texts: &OtherTexts) -> Option<String> {
    // Nothing is rendered for malformed questions, so nothing can be demanded
    if matches!(question.kind, QuestionKind::Malformed { .. }) {
        return None;
    }
    if !is_present(value) {
        return question.is_required.then(|| REQUIRED.to_string());
    }
    let value = value?;

    match &question.kind {
        QuestionKind::Text | QuestionKind::Malformed { .. } => None,
        QuestionKind::Email => check_email(value),
        QuestionKind::Number(sign) => check_number(value, *sign),
        QuestionKind::Choice { .. } => check_choice(question, value, other_texts),
        QuestionKind::MultiChoice { .. } => check_multi_choice(question, value, other_texts),
        QuestionKind::FormFields {
            subfields,
            validations,
        } => check_form_fields(question, value, subfields, validations),
        QuestionKind::Grid { multi, rows, .. } => check_grid(question, value, *multi, rows),
        QuestionKind::Slider(scale) => check_slider(value, scale),
        QuestionKind::Date => check_date(value),
        QuestionKind::Time => check_time(value),
    }
}

fn required_if(question: &Question) -> Option<String> {
    question.is_required.then(|| REQUIRED.to_string())
}

fn check_email(value: &Answer) -> Option<String> {
    match value.as_text() {
        Some(text) if is_valid_email(text.trim()) => None,
        _ => Some(INVALID_EMAIL.to_string()),
    }
}

fn number_message(n: Option<f64>, sign: NumberSign) -> Option<&'static str> {
    match (n, sign) {
        (None, _) => Some(INVALID_NUMBER),
        (Some(n), NumberSign::Positive) if n < 0.0 => Some(NOT_POSITIVE),
        (Some(n), NumberSign::Negative) if n > 0.0 => Some(NOT_NEGATIVE),
        _ => None,
    }
}

fn check_number(value: &Answer, sign: NumberSign) -> Option<String> {
    number_message(value.as_number(), sign).map(str::to_string)
}

fn other_text_missing(question: &Question, other_texts: &OtherTexts) -> bool {
    other_texts
        .get(&question.id)
        .is_none_or(|text| text.trim().is_empty())
}

fn check_choice(question: &Question, value: &Answer, other_texts: &OtherTexts) -> Option<String> {
    let Some(selected) = value.as_text().map(str::trim).filter(|s| !s.is_empty()) else {
        return required_if(question);
    };
    if selected == OTHER_OPTION && other_text_missing(question, other_texts) {
        return Some(OTHER_TEXT_MISSING.to_string());
    }
    None
}

fn check_multi_choice(question: &Question, value: &Answer, other_texts: &OtherTexts) -> Option<String> {
    let Some(selected) = value.as_list().filter(|items| !items.is_empty()) else {
        return required_if(question);
    };
    if selected.iter().any(|s| s == OTHER_OPTION) && other_text_missing(question, other_texts) {
        return Some(OTHER_TEXT_MISSING.to_string());
    }
    None
}

fn check_subfield(name: &str, cell: Option<&Cell>, rule: &SubfieldValidation) -> Option<String> {
    let cell = match cell.filter(|c| c.is_present()) {
        Some(cell) => cell,
        None if rule.required => return Some(format!("'{name}' is required")),
        None => return None,
    };

    let message = match rule.kind {
        SubfieldType::PositiveNumber => number_message(cell.as_number(), NumberSign::Positive),
        SubfieldType::NegativeNumber => number_message(cell.as_number(), NumberSign::Negative),
        SubfieldType::AllNumbers => number_message(cell.as_number(), NumberSign::Any),
        SubfieldType::Email => match cell.as_text() {
            Some(text) if is_valid_email(text.trim()) => None,
            _ => Some(INVALID_EMAIL),
        },
        SubfieldType::Text | SubfieldType::AutoCalculate => None,
    };
    message.map(|m| format!("'{name}': {m}"))
}

fn check_form_fields(
    question: &Question,
    value: &Answer,
    subfields: &[String],
    validations: &BTreeMap<String, SubfieldValidation>,
) -> Option<String> {
    let Some(map) = value.as_map() else {
        return required_if(question);
    };

    if map.is_empty() {
        let any_required = validations.values().any(|v| v.required);
        return (question.is_required && any_required).then(|| REQUIRED.to_string());
    }

    let default_rule = SubfieldValidation::default();
    subfields.iter().find_map(|name| {
        let rule = validations.get(name).unwrap_or(&default_rule);
        if rule.kind == SubfieldType::AutoCalculate {
            return None;
        }
        check_subfield(name, map.get(name), rule)
    })
}

fn check_grid(question: &Question, value: &Answer, multi: bool, rows: &[String]) -> Option<String> {
    let Some(map) = value.as_map() else {
        return required_if(question);
    };
    if !question.is_required {
        return None;
    }

    let answered = |row: &String| match map.get(row) {
        Some(Cell::Text(s)) if !multi => !s.trim().is_empty(),
        Some(Cell::List(items)) if multi => !items.is_empty(),
        _ => false,
    };
    if rows.iter().all(answered) {
        None
    } else if multi {
        Some(GRID_MULTI_ROWS_MISSING.to_string())
    } else {
        Some(GRID_ROWS_MISSING.to_string())
    }
}

fn check_slider(value: &Answer, scale: &SliderScale) -> Option<String> {
    match value.as_number() {
        None => Some(INVALID_NUMBER.to_string()),
        Some(n) if n < scale.min as f64 || n > scale.max as f64 => Some(format!(
            "Please choose a value between {} and {}",
            scale.min, scale.max
        )),
        Some(_) => None,
    }
}

fn check_date(value: &Answer) -> Option<String> {
    let ok = value
        .as_text()
        .is_some_and(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok());
    (!ok).then(|| INVALID_DATE.to_string())
}

fn check_time(value: &Answer) -> Option<String> {
    let ok = value.as_text().is_some_and(|s| {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M").is_ok() || NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
    });
    (!ok).then(|| INVALID_TIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionRecord;

    fn question(secondary: &str, required: bool) -> Question {
        Question::from(QuestionRecord {
            id: 1,
            secondary_type: Some(secondary.into()),
            is_required: required,
            options: Some(vec!["A".into(), "B".into()]),
            has_other_option: true,
            subfields: Some(vec!["full".into(), "part".into(), "total".into(), "email".into()]),
            subfield_validations: Some(
                serde_json::from_str(
                    r#"{"full": {"type": "positive_number", "required": true},
                        "part": {"type": "negative_number"},
                        "total": {"type": "auto_calculate", "required": true},
                        "email": {"type": "email"}}"#,
                )
                .unwrap(),
            ),
            rows: Some(vec!["r1".into(), "r2".into()]),
            columns: Some(vec!["c1".into(), "c2".into()]),
            ..Default::default()
        })
    }

    fn text(s: &str) -> Answer {
        Answer::Text(s.into())
    }

    fn check(q: &Question, value: Option<Answer>) -> Option<String> {
        validate(q, value.as_ref(), &OtherTexts::new())
    }

    fn map(json: &str) -> Answer {
        Answer::Map(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn required_questions_reject_missing_answers() {
        for kind in ["text", "email", "number", "radio", "dropdown", "multiple_choices", "date"] {
            let q = question(kind, true);
            assert_eq!(check(&q, None).as_deref(), Some(REQUIRED), "{kind}");
            assert_eq!(check(&q, Some(text("   "))).as_deref(), Some(REQUIRED), "{kind}");
        }
        let q = question("multiple_choices", true);
        assert_eq!(check(&q, Some(Answer::List(vec![]))).as_deref(), Some(REQUIRED));
    }

    #[test]
    fn optional_questions_skip_checks_when_empty() {
        let q = question("email", false);
        assert_eq!(check(&q, None), None);
        assert_eq!(check(&q, Some(text(""))), None);
        assert_eq!(check(&q, Some(text("nope"))).as_deref(), Some(INVALID_EMAIL));
    }

    #[test]
    fn email_format() {
        let q = question("email", true);
        assert_eq!(check(&q, Some(text("a@b.co"))), None);
        assert_eq!(check(&q, Some(text("a@b"))).as_deref(), Some(INVALID_EMAIL));
        assert_eq!(check(&q, Some(text("a b@c.de"))).as_deref(), Some(INVALID_EMAIL));
    }

    #[test]
    fn zero_and_negative_numbers_count_as_present() {
        let q = question("number", true);
        assert_eq!(check(&q, Some(Answer::Number(0.0))), None);
        assert_eq!(check(&q, Some(Answer::Number(-4.0))), None);
        assert_eq!(check(&q, Some(text("abc"))).as_deref(), Some(INVALID_NUMBER));

        let q = question("positive_number", true);
        assert_eq!(check(&q, Some(text("0"))), None);
        assert_eq!(check(&q, Some(text("-1"))).as_deref(), Some(NOT_POSITIVE));

        let q = question("negative_number", true);
        assert_eq!(check(&q, Some(Answer::Number(0.0))), None);
        assert_eq!(check(&q, Some(Answer::Number(2.0))).as_deref(), Some(NOT_NEGATIVE));
    }

    #[test]
    fn other_option_needs_free_text() {
        let q = question("radio", true);
        let mut others = OtherTexts::new();
        let other = text(OTHER_OPTION);
        assert_eq!(validate(&q, Some(&other), &others).as_deref(), Some(OTHER_TEXT_MISSING));
        others.insert(1, "Foo".into());
        assert_eq!(validate(&q, Some(&other), &others), None);

        let q = question("multiple_choices", true);
        let picked = Answer::List(vec!["A".into(), OTHER_OPTION.into()]);
        assert_eq!(validate(&q, Some(&picked), &OtherTexts::new()).as_deref(), Some(OTHER_TEXT_MISSING));
        assert_eq!(validate(&q, Some(&picked), &others), None);
    }

    #[test]
    fn form_fields_apply_subfield_rules() {
        let q = question("form_fields", true);
        assert_eq!(check(&q, Some(map("{}"))).as_deref(), Some(REQUIRED));
        assert_eq!(check(&q, Some(text("x"))).as_deref(), Some(REQUIRED));
        assert_eq!(
            check(&q, Some(map(r#"{"part": -1}"#))).as_deref(),
            Some("'full' is required")
        );
        assert_eq!(
            check(&q, Some(map(r#"{"full": -2}"#))).as_deref(),
            Some("'full': Please enter a positive number")
        );
        assert_eq!(
            check(&q, Some(map(r#"{"full": "3", "part": 1}"#))).as_deref(),
            Some("'part': Please enter a negative number")
        );
        assert_eq!(
            check(&q, Some(map(r#"{"full": 3, "email": "x"}"#))).as_deref(),
            Some("'email': Please enter a valid email address")
        );
        // auto_calculate subfields are never checked, even when marked required
        assert_eq!(check(&q, Some(map(r#"{"full": 3}"#))), None);
    }

    #[test]
    fn empty_form_passes_when_no_subfield_is_required() {
        let q = Question::from(QuestionRecord {
            id: 2,
            secondary_type: Some("form_fields".into()),
            subfields: Some(vec!["a".into()]),
            ..Default::default()
        });
        assert_eq!(check(&q, Some(map("{}"))), None);
    }

    #[test]
    fn required_grids_need_every_row() {
        let q = question("grid_radio", true);
        assert_eq!(check(&q, Some(map(r#"{"r1": "c1"}"#))).as_deref(), Some(GRID_ROWS_MISSING));
        assert_eq!(check(&q, Some(map(r#"{"r1": "c1", "r2": "c2"}"#))), None);

        let q = question("grid_multi", true);
        assert_eq!(
            check(&q, Some(map(r#"{"r1": ["c1"], "r2": []}"#))).as_deref(),
            Some(GRID_MULTI_ROWS_MISSING)
        );
        assert_eq!(check(&q, Some(map(r#"{"r1": ["c1"], "r2": ["c1", "c2"]}"#))), None);

        let q = question("grid_radio", false);
        assert_eq!(check(&q, Some(map(r#"{"r1": "c1"}"#))), None);
    }

    #[test]
    fn slider_date_and_time() {
        let q = question("slider", true);
        assert_eq!(check(&q, Some(Answer::Number(0.0))), None);
        assert_eq!(
            check(&q, Some(Answer::Number(11.0))).as_deref(),
            Some("Please choose a value between 0 and 10")
        );

        let q = question("date", true);
        assert_eq!(check(&q, Some(text("2024-02-29"))), None);
        assert_eq!(check(&q, Some(text("2023-02-29"))).as_deref(), Some(INVALID_DATE));

        let q = question("time", true);
        assert_eq!(check(&q, Some(text("09:30"))), None);
        assert_eq!(check(&q, Some(text("25:00"))).as_deref(), Some(INVALID_TIME));
    }

    #[test]
    fn malformed_questions_never_block() {
        let q = Question::from(QuestionRecord {
            id: 5,
            secondary_type: Some("grid_multi".into()),
            ..Default::default()
        });
        assert_eq!(check(&q, Some(text("anything"))), None);
        assert_eq!(check(&q, None), None);
    }
}
