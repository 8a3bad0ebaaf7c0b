use crate::model::{QuestionId, SubfieldType, SubfieldValidation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answer to one question. The JSON shape depends on the question kind:
/// free text and single choices are strings, checkbox questions are lists,
/// forms and grids are objects keyed by subfield or row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Number(f64),
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, Cell>),
}

/// One entry of a form or grid answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    List(Vec<String>),
}

pub type Responses = BTreeMap<QuestionId, Answer>;
pub type OtherTexts = BTreeMap<QuestionId, String>;

/// Parses user-typed numbers; thousands separators are tolerated.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', "").parse::<f64>())
        .ok()
        .filter(|n| n.is_finite())
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Answer::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Cell>> {
        match self {
            Answer::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(n) if n.is_finite() => Some(*n),
            Answer::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Text shown in a single-line input for this answer.
    pub fn display_text(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Number(n) => format_number(*n),
            _ => String::new(),
        }
    }
}

impl Cell {
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Number(_) => true,
            Cell::Text(s) => !s.trim().is_empty(),
            Cell::List(items) => !items.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Cell::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            _ => String::new(),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Flips `option` in a checkbox selection. An `exclusive` option (e.g. "None of
/// the Above") clears everything else, and anything else clears it.
pub fn toggle_choice(selected: &mut Vec<String>, option: &str, exclusive: Option<&str>) {
    if let Some(pos) = selected.iter().position(|s| s == option) {
        selected.remove(pos);
        return;
    }
    match exclusive {
        Some(ex) if ex == option => selected.clear(),
        Some(ex) => selected.retain(|s| s != ex),
        None => {}
    }
    selected.push(option.to_string());
}

/// Picks `column` for `row` of a single-select grid.
pub fn set_grid_choice(map: &mut BTreeMap<String, Cell>, row: &str, column: &str) {
    map.insert(row.to_string(), Cell::Text(column.to_string()));
}

/// Flips `column` for `row` of a multi-select grid, honouring the exclusive column.
pub fn toggle_grid_choice(
    map: &mut BTreeMap<String, Cell>,
    row: &str,
    column: &str,
    exclusive: Option<&str>,
) {
    let mut selected = map
        .get(row)
        .and_then(Cell::as_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    toggle_choice(&mut selected, column, exclusive);
    if selected.is_empty() {
        map.remove(row);
    } else {
        map.insert(row.to_string(), Cell::List(selected));
    }
}

/// Recomputes every `auto_calculate` subfield as the sum of the numeric
/// subfields declared before it. A total with nothing to add is removed.
pub fn recompute_auto_totals(
    map: &mut BTreeMap<String, Cell>,
    subfields: &[String],
    validations: &BTreeMap<String, SubfieldValidation>,
) {
    for (idx, subfield) in subfields.iter().enumerate() {
        let is_total = validations
            .get(subfield)
            .is_some_and(|v| v.kind == SubfieldType::AutoCalculate);
        if !is_total {
            continue;
        }

        let prior: Vec<f64> = subfields[..idx]
            .iter()
            .filter(|sf| validations.get(*sf).is_some_and(|v| v.kind.is_numeric()))
            .filter_map(|sf| map.get(sf).and_then(Cell::as_number))
            .collect();

        if prior.is_empty() {
            map.remove(subfield);
        } else {
            map.insert(subfield.clone(), Cell::Number(prior.iter().sum()));
        }
    }
}
