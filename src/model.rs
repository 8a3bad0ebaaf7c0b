use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type QuestionId = i64;

/// Value stored for the "Other, please specify" option.
pub const OTHER_OPTION: &str = "Other";
/// Default label of the "None of the Above" option.
pub const NONE_OPTION_DEFAULT: &str = "None of the Above";

pub const SLIDER_MIN_LABEL_DEFAULT: &str = "Not at all likely";
pub const SLIDER_MAX_LABEL_DEFAULT: &str = "Extremely likely";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryType {
    #[default]
    OpenText,
    Form,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberSign {
    Any,
    Positive,
    Negative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceStyle {
    Radio,
    Dropdown,
    YesNo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiChoiceStyle {
    MultipleChoices,
    Fields,
}

/// Per-subfield rule of a `form_fields` question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubfieldType {
    Email,
    PositiveNumber,
    NegativeNumber,
    AllNumbers,
    AutoCalculate,
    #[default]
    #[serde(other)]
    Text,
}

impl SubfieldType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SubfieldType::PositiveNumber | SubfieldType::NegativeNumber | SubfieldType::AllNumbers
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubfieldValidation {
    #[serde(rename = "type", default)]
    pub kind: SubfieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliderScale {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub min_label: String,
    pub max_label: String,
}

/// Everything that depends on the question type lives here, so validation,
/// rendering and sanitization all match on one enum.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionKind {
    Text,
    Email,
    Number(NumberSign),
    Choice {
        style: ChoiceStyle,
    },
    MultiChoice {
        style: MultiChoiceStyle,
    },
    FormFields {
        subfields: Vec<String>,
        validations: BTreeMap<String, SubfieldValidation>,
    },
    Grid {
        multi: bool,
        rows: Vec<String>,
        columns: Vec<String>,
    },
    Slider(SliderScale),
    Date,
    Time,
    /// The record names a type whose required data is missing. Rendered as nothing.
    Malformed {
        secondary_type: String,
    },
}

impl QuestionKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionKind::Number(_) | QuestionKind::Slider(_))
    }
}

/// A survey question, normalized from its wire record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "QuestionRecord")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub primary_type: PrimaryType,
    pub secondary_type: String,
    pub kind: QuestionKind,
    pub is_required: bool,
    pub order: i64,
    pub randomize_options: bool,
    pub has_none_option: bool,
    pub none_option_text: Option<String>,
    pub has_other_option: bool,
    pub exclusive_column: Option<String>,
    pub options: Vec<String>,
    pub section_title: Option<String>,
    pub randomize_rows: bool,
    pub randomize_columns: bool,
}

impl Question {
    pub fn none_label(&self) -> &str {
        self.none_option_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NONE_OPTION_DEFAULT)
    }
}

fn default_true() -> bool {
    true
}

/// Question exactly as the backend serializes it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub primary_type: Option<PrimaryType>,
    #[serde(default)]
    pub secondary_type: Option<String>,
    /// Legacy single-field type, only consulted when `secondary_type` is absent.
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub randomize_options: bool,
    #[serde(default)]
    pub has_none_option: bool,
    #[serde(default)]
    pub none_option_text: Option<String>,
    #[serde(default)]
    pub has_other_option: bool,
    #[serde(default)]
    pub exclusive_column: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub subfields: Option<Vec<String>>,
    #[serde(default)]
    pub subfield_validations: Option<BTreeMap<String, SubfieldValidation>>,
    #[serde(default)]
    pub rows: Option<Vec<String>>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub randomize_rows: Option<bool>,
    #[serde(default)]
    pub randomize_columns: Option<bool>,
    #[serde(default)]
    pub scale_min: Option<i64>,
    #[serde(default)]
    pub scale_max: Option<i64>,
    #[serde(default)]
    pub scale_step: Option<i64>,
    #[serde(default)]
    pub scale_min_label: Option<String>,
    #[serde(default)]
    pub scale_max_label: Option<String>,
}

/// Maps the legacy `question_type` vocabulary onto `secondary_type`.
pub fn secondary_type_from_legacy(question_type: &str) -> &str {
    match question_type {
        "text" => "text",
        "multiple_choice" => "radio",
        "checkbox" => "multiple_choices",
        "rating" => "slider",
        "email" => "email",
        "number" => "number",
        "matrix" => "form_fields",
        "cross_matrix" => "grid_radio",
        "cross_matrix_checkbox" => "grid_multi",
        other => other,
    }
}

fn non_empty(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.filter(|items| !items.is_empty())
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let secondary_type = match (&record.secondary_type, &record.question_type) {
            (Some(secondary), _) if !secondary.trim().is_empty() => secondary.trim().to_string(),
            (_, Some(legacy)) => secondary_type_from_legacy(legacy.trim()).to_string(),
            _ => "text".to_string(),
        };

        let mut options = record.options.clone().unwrap_or_default();
        let kind = match secondary_type.as_str() {
            "email" => QuestionKind::Email,
            "number" => QuestionKind::Number(NumberSign::Any),
            "positive_number" => QuestionKind::Number(NumberSign::Positive),
            "negative_number" => QuestionKind::Number(NumberSign::Negative),
            "date" => QuestionKind::Date,
            "time" => QuestionKind::Time,
            "yes_no" => {
                if options.is_empty() {
                    options = vec!["Yes".to_string(), "No".to_string()];
                }
                QuestionKind::Choice {
                    style: ChoiceStyle::YesNo,
                }
            }
            "radio" | "dropdown" | "multiple_choices" | "fields" => {
                if options.is_empty() && !record.has_other_option && !record.has_none_option {
                    QuestionKind::Malformed {
                        secondary_type: secondary_type.clone(),
                    }
                } else {
                    match secondary_type.as_str() {
                        "radio" => QuestionKind::Choice {
                            style: ChoiceStyle::Radio,
                        },
                        "dropdown" => QuestionKind::Choice {
                            style: ChoiceStyle::Dropdown,
                        },
                        "multiple_choices" => QuestionKind::MultiChoice {
                            style: MultiChoiceStyle::MultipleChoices,
                        },
                        _ => QuestionKind::MultiChoice {
                            style: MultiChoiceStyle::Fields,
                        },
                    }
                }
            }
            "form_fields" => match non_empty(record.subfields.clone()) {
                Some(subfields) => QuestionKind::FormFields {
                    subfields,
                    validations: record.subfield_validations.clone().unwrap_or_default(),
                },
                None => QuestionKind::Malformed {
                    secondary_type: secondary_type.clone(),
                },
            },
            "grid_radio" | "cross_matrix" | "grid_multi" | "cross_matrix_checkbox" => {
                match (non_empty(record.rows.clone()), non_empty(record.columns.clone())) {
                    (Some(rows), Some(columns)) => QuestionKind::Grid {
                        multi: matches!(
                            secondary_type.as_str(),
                            "grid_multi" | "cross_matrix_checkbox"
                        ),
                        rows,
                        columns,
                    },
                    _ => QuestionKind::Malformed {
                        secondary_type: secondary_type.clone(),
                    },
                }
            }
            "slider" => {
                let min = record.scale_min.unwrap_or(0);
                let max = record.scale_max.unwrap_or(10);
                if max <= min {
                    QuestionKind::Malformed {
                        secondary_type: secondary_type.clone(),
                    }
                } else {
                    QuestionKind::Slider(SliderScale {
                        min,
                        max,
                        step: record.scale_step.filter(|s| *s > 0).unwrap_or(1),
                        min_label: record
                            .scale_min_label
                            .clone()
                            .filter(|l| !l.trim().is_empty())
                            .unwrap_or_else(|| SLIDER_MIN_LABEL_DEFAULT.to_string()),
                        max_label: record
                            .scale_max_label
                            .clone()
                            .filter(|l| !l.trim().is_empty())
                            .unwrap_or_else(|| SLIDER_MAX_LABEL_DEFAULT.to_string()),
                    })
                }
            }
            // "text" and anything unknown render as free text
            _ => QuestionKind::Text,
        };

        Question {
            id: record.id,
            text: record.question_text,
            primary_type: record.primary_type.unwrap_or_default(),
            secondary_type,
            kind,
            is_required: record.is_required,
            order: record.order,
            randomize_options: record.randomize_options,
            has_none_option: record.has_none_option,
            none_option_text: record.none_option_text,
            has_other_option: record.has_other_option,
            exclusive_column: record.exclusive_column.filter(|c| !c.trim().is_empty()),
            options,
            section_title: record.section_title,
            randomize_rows: record.randomize_rows.unwrap_or(false),
            randomize_columns: record.randomize_columns.unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Survey {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Row of `GET /surveys/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub question_count: usize,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Home,
    Loading,
    LoadError,
    TakingSurvey,
    Submitted,
    AdminLogin,
    AdminDashboard,
    Analytics,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Question {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn grid_without_columns_is_malformed() {
        let q = parse(r#"{"id": 4, "secondary_type": "grid_radio", "rows": ["a"]}"#);
        assert_eq!(
            q.kind,
            QuestionKind::Malformed {
                secondary_type: "grid_radio".into()
            }
        );
    }

    #[test]
    fn legacy_question_type_is_mapped() {
        let q = parse(
            r#"{"id": 1, "question_text": "Pick", "question_type": "checkbox", "options": ["a", "b"]}"#,
        );
        assert_eq!(q.secondary_type, "multiple_choices");
        assert_eq!(
            q.kind,
            QuestionKind::MultiChoice {
                style: MultiChoiceStyle::MultipleChoices
            }
        );
        assert!(q.is_required);

        let q = parse(
            r#"{"id": 2, "question_type": "cross_matrix", "rows": ["r"], "columns": ["c"]}"#,
        );
        assert!(matches!(q.kind, QuestionKind::Grid { multi: false, .. }));
    }

    #[test]
    fn secondary_type_wins_over_legacy() {
        let q = parse(
            r#"{"id": 1, "primary_type": "form", "secondary_type": "positive_number", "question_type": "text"}"#,
        );
        assert_eq!(q.primary_type, PrimaryType::Form);
        assert_eq!(q.kind, QuestionKind::Number(NumberSign::Positive));
    }

    #[test]
    fn yes_no_gets_default_options() {
        let q = parse(r#"{"id": 1, "secondary_type": "yes_no"}"#);
        assert_eq!(q.options, vec!["Yes", "No"]);
    }

    #[test]
    fn slider_uses_backend_defaults() {
        let q = parse(r#"{"id": 9, "secondary_type": "slider"}"#);
        match q.kind {
            QuestionKind::Slider(scale) => {
                assert_eq!((scale.min, scale.max, scale.step), (0, 10, 1));
                assert_eq!(scale.min_label, SLIDER_MIN_LABEL_DEFAULT);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn subfield_validation_types_parse() {
        let q = parse(
            r#"{"id": 3, "secondary_type": "form_fields", "subfields": ["a", "total"],
                "subfield_validations": {"a": {"type": "positive_number", "required": true},
                                         "total": {"type": "auto_calculate", "formula": "sum"},
                                         "x": {"type": "something_new"}}}"#,
        );
        let QuestionKind::FormFields { validations, .. } = q.kind else {
            panic!("expected form fields");
        };
        assert_eq!(validations["a"].kind, SubfieldType::PositiveNumber);
        assert!(validations["a"].required);
        assert_eq!(validations["total"].kind, SubfieldType::AutoCalculate);
        assert_eq!(validations["x"].kind, SubfieldType::Text);
    }

    #[test]
    fn survey_ignores_branding_fields() {
        let survey: Survey = serde_json::from_str(
            r#"{"id": "s1", "title": "Team survey", "logo_url": "https://cdn.example/logo.png",
                "concierge_logo_url": null,
                "questions": [{"id": 1, "secondary_type": "text"}]}"#,
        )
        .unwrap();
        assert_eq!(survey.title, "Team survey");
        assert!(survey.is_active);
        assert_eq!(survey.questions.len(), 1);
    }
}
