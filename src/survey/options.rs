use crate::model::{OTHER_OPTION, Question, QuestionId, QuestionKind};

pub const MAX_OPTIONS_PER_COLUMN: usize = 6;

/// Options of a choice question in the order they are shown.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayOptions {
    pub options: Vec<String>,
    pub has_other_option: bool,
    pub has_none_option: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAxis {
    Rows,
    Columns,
}

impl GridAxis {
    fn as_str(self) -> &'static str {
        match self {
            GridAxis::Rows => "rows",
            GridAxis::Columns => "columns",
        }
    }
}

/// 32-bit rolling hash over UTF-16 code units (`h = h * 31 + unit`).
/// Only used to get a stable display order; not a secure hash.
pub fn seeded_hash(seed: &str, item: &str) -> i32 {
    seed.encode_utf16()
        .chain(item.encode_utf16())
        .fold(0i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
        })
}

/// Reorders `items` by their seeded hash; equal hashes keep their input order.
pub fn seeded_order(items: &[String], seed: &str) -> Vec<String> {
    let mut keyed: Vec<(i32, usize, &String)> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (seeded_hash(seed, item), idx, item))
        .collect();
    keyed.sort_by_key(|(hash, idx, _)| (*hash, *idx));
    keyed.into_iter().map(|(_, _, item)| item.clone()).collect()
}

pub fn option_seed(survey_id: &str, question_id: QuestionId, session_seed: &str) -> String {
    format!("{survey_id}-{question_id}-options-{session_seed}")
}

pub fn grid_seed(survey_id: &str, question_id: QuestionId, axis: GridAxis) -> String {
    format!("{survey_id}-{question_id}-{}", axis.as_str())
}

fn is_special(option: &str, question: &Question) -> bool {
    let trimmed = option.trim();
    (question.has_other_option && trimmed.eq_ignore_ascii_case(OTHER_OPTION))
        || (question.has_none_option && trimmed.eq_ignore_ascii_case(question.none_label()))
}

/// Builds the option list for display. Shuffling (when enabled) is seeded so the
/// order stays put for the whole session; "Other" and the none option always
/// come last, in that order.
pub fn options_for_display(question: &Question, seed: &str) -> DisplayOptions {
    let base: Vec<String> = question
        .options
        .iter()
        .filter(|opt| !is_special(opt, question))
        .cloned()
        .collect();

    let mut options = if question.randomize_options {
        seeded_order(&base, seed)
    } else {
        base
    };

    if question.has_other_option {
        options.push(OTHER_OPTION.to_string());
    }
    if question.has_none_option {
        options.push(question.none_label().to_string());
    }

    DisplayOptions {
        options,
        has_other_option: question.has_other_option,
        has_none_option: question.has_none_option,
    }
}

/// Rows and columns of a grid question, shuffled when the question asks for it.
pub fn grid_for_display(question: &Question, survey_id: &str) -> Option<(Vec<String>, Vec<String>)> {
    let QuestionKind::Grid { rows, columns, .. } = &question.kind else {
        return None;
    };

    let rows = if question.randomize_rows {
        seeded_order(rows, &grid_seed(survey_id, question.id, GridAxis::Rows))
    } else {
        rows.clone()
    };
    let columns = if question.randomize_columns {
        seeded_order(columns, &grid_seed(survey_id, question.id, GridAxis::Columns))
    } else {
        columns.clone()
    };
    Some((rows, columns))
}

/// One column when the list is short, otherwise two balanced columns
/// (the first one gets the extra option).
pub fn organize_options_into_columns(options: &[String], max_per_column: usize) -> Vec<Vec<String>> {
    if options.len() <= max_per_column {
        return vec![options.to_vec()];
    }
    let split = options.len().div_ceil(2);
    vec![options[..split].to_vec(), options[split..].to_vec()]
}
