//! Turns the answers collected in the UI into the payload sent on submit.
//!
//! Contract for "Other": a selected `Other` option is rewritten to
//! `Other: {text}`; when the free text is blank the selection is dropped
//! (a single choice disappears from the payload, a checkbox list loses the
//! entry). Running the sanitizer on its own output changes nothing.

use crate::answers::{Answer, Cell, OtherTexts, Responses, parse_number, recompute_auto_totals};
use crate::model::{OTHER_OPTION, Question, QuestionKind, SubfieldType, SubfieldValidation};
use std::collections::BTreeMap;

pub fn other_answer(text: &str) -> String {
    format!("{OTHER_OPTION}: {}", text.trim())
}

fn other_text<'a>(question: &Question, other_texts: &'a OtherTexts) -> Option<&'a str> {
    other_texts
        .get(&question.id)
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
}

/// Rewrites one answer for submission. `None` means "leave it out".
pub fn sanitize_answer(question: &Question, answer: &Answer, other_texts: &OtherTexts) -> Option<Answer> {
    match (&question.kind, answer) {
        (_, Answer::Text(s)) if s.trim().is_empty() => None,

        // typed numbers travel as numbers
        (QuestionKind::Number(_) | QuestionKind::Slider(_), Answer::Text(s)) => {
            Some(parse_number(s).map_or_else(|| Answer::Text(s.clone()), Answer::Number))
        }

        (QuestionKind::Choice { .. }, Answer::Text(selected)) if selected == OTHER_OPTION => {
            other_text(question, other_texts).map(|text| Answer::Text(other_answer(text)))
        }

        (QuestionKind::MultiChoice { .. }, Answer::List(selected)) => {
            let cleaned: Vec<String> = selected
                .iter()
                .filter_map(|s| {
                    if s == OTHER_OPTION {
                        other_text(question, other_texts).map(other_answer)
                    } else {
                        Some(s.clone())
                    }
                })
                .collect();
            (!cleaned.is_empty()).then_some(Answer::List(cleaned))
        }

        (QuestionKind::Grid { multi, .. }, Answer::Map(map)) => {
            let cleaned: BTreeMap<String, Cell> = map
                .iter()
                .filter(|(_, cell)| match cell {
                    Cell::Text(s) => !*multi && !s.trim().is_empty(),
                    Cell::List(items) => *multi && !items.is_empty(),
                    _ => false,
                })
                .map(|(row, cell)| (row.clone(), cell.clone()))
                .collect();
            (!cleaned.is_empty()).then_some(Answer::Map(cleaned))
        }

        (
            QuestionKind::FormFields {
                subfields,
                validations,
            },
            Answer::Map(map),
        ) => sanitize_form(map, subfields, validations).map(Answer::Map),

        (_, Answer::List(items)) if items.is_empty() => None,
        (_, other) => Some(other.clone()),
    }
}

fn sanitize_form(
    map: &BTreeMap<String, Cell>,
    subfields: &[String],
    validations: &BTreeMap<String, SubfieldValidation>,
) -> Option<BTreeMap<String, Cell>> {
    let kind_of = |name: &str| validations.get(name).map(|v| v.kind).unwrap_or_default();

    let mut cleaned: BTreeMap<String, Cell> = map
        .iter()
        .filter(|(_, cell)| cell.is_present())
        .filter_map(|(name, cell)| {
            let kind = kind_of(name);
            if kind == SubfieldType::AutoCalculate {
                // recomputed below
                return None;
            }
            if kind.is_numeric() {
                // zero means "not filled in"
                return cell
                    .as_number()
                    .filter(|n| *n != 0.0)
                    .map(|n| (name.clone(), Cell::Number(n)));
            }
            Some((name.clone(), cell.clone()))
        })
        .collect();

    recompute_auto_totals(&mut cleaned, subfields, validations);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Sanitizes every answer, keeping only those that survive.
pub fn sanitize_responses(questions: &[Question], responses: &Responses, other_texts: &OtherTexts) -> Responses {
    questions
        .iter()
        .filter_map(|q| {
            let answer = responses.get(&q.id)?;
            sanitize_answer(q, answer, other_texts).map(|a| (q.id, a))
        })
        .collect()
}
