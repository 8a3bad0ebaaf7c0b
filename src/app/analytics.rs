use super::*;
use crate::answers::parse_number;
use crate::api::analytics::{Dimension, Filter, Segmentation};
use crate::model::QuestionId;
use crate::persistence::progress::now_millis;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DimensionKind {
    #[default]
    NumericRange,
    ChoiceMapping,
}

/// Text typed into the filter and segmentation editors, not yet applied.
#[derive(Clone, Debug, Default)]
pub struct Draft {
    pub filter_question: Option<QuestionId>,
    /// Comma separated accepted answers.
    pub filter_values: String,
    pub filter_min: String,
    pub filter_max: String,
    pub dimension_name: String,
    pub dimension_question: Option<QuestionId>,
    pub dimension_kind: DimensionKind,
    /// One rule per line: `Segment: min..max` or `answer => Segment`.
    pub dimension_rules: String,
    pub error: Option<String>,
}

pub fn parse_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bound(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_number(raw)
        .map(Some)
        .ok_or_else(|| format!("'{raw}' is not a number"))
}

/// `Very small: ..5`, `Small: 5..10`, `Large: 10..`
pub fn parse_ranges(text: &str) -> Result<BTreeMap<String, [Option<f64>; 2]>, String> {
    let mut ranges = BTreeMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (name, range) = line
            .rsplit_once(':')
            .ok_or_else(|| format!("'{line}' should look like 'Segment: min..max'"))?;
        let (min, max) = range
            .split_once("..")
            .ok_or_else(|| format!("'{line}' needs a range such as 5..10"))?;
        let bounds = [parse_bound(min)?, parse_bound(max)?];
        if bounds == [None, None] {
            return Err(format!("'{line}' needs at least one bound"));
        }
        ranges.insert(name.trim().to_string(), bounds);
    }
    if ranges.is_empty() {
        return Err("Add at least one range".into());
    }
    Ok(ranges)
}

/// `London => London & SE`
pub fn parse_mapping(text: &str) -> Result<BTreeMap<String, String>, String> {
    let mut mapping = BTreeMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (answer, segment) = line
            .split_once("=>")
            .ok_or_else(|| format!("'{line}' should look like 'answer => Segment'"))?;
        let (answer, segment) = (answer.trim(), segment.trim());
        if answer.is_empty() || segment.is_empty() {
            return Err(format!("'{line}' is missing a side"));
        }
        mapping.insert(answer.to_string(), segment.to_string());
    }
    if mapping.is_empty() {
        return Err("Add at least one mapping".into());
    }
    Ok(mapping)
}

impl Draft {
    pub fn build_filter(&self) -> Result<Filter, String> {
        let question_id = self.filter_question.ok_or("Pick a question to filter on")?;
        let values = parse_values(&self.filter_values);
        if !values.is_empty() {
            return Ok(Filter::Choice { question_id, values });
        }
        let (min, max) = (parse_bound(&self.filter_min)?, parse_bound(&self.filter_max)?);
        if min.is_none() && max.is_none() {
            return Err("Enter accepted answers or a numeric range".into());
        }
        Ok(Filter::NumericRange { question_id, min, max })
    }

    pub fn build_dimension(&self) -> Result<Dimension, String> {
        let name = self.dimension_name.trim();
        if name.is_empty() {
            return Err("Name the dimension".into());
        }
        let question_id = self.dimension_question.ok_or("Pick a question to segment by")?;
        let name = name.to_string();
        Ok(match self.dimension_kind {
            DimensionKind::NumericRange => Dimension::NumericRange {
                name,
                question_id,
                ranges: parse_ranges(&self.dimension_rules)?,
            },
            DimensionKind::ChoiceMapping => Dimension::ChoiceMapping {
                name,
                question_id,
                mapping: parse_mapping(&self.dimension_rules)?,
            },
        })
    }

    fn clear_filter(&mut self) {
        self.filter_values.clear();
        self.filter_min.clear();
        self.filter_max.clear();
        self.error = None;
    }

    fn clear_dimension(&mut self) {
        self.dimension_name.clear();
        self.dimension_rules.clear();
        self.error = None;
    }
}

impl AnalyticsView {
    fn new(survey: SurveySummary) -> Self {
        Self {
            survey,
            questions: Vec::new(),
            questions_request: None,
            config: AnalyticsConfig::default(),
            debouncer: Debouncer::default(),
            preview: None,
            preview_request: None,
            preview_error: None,
            draft: Draft::default(),
        }
    }

    pub fn question_text(&self, question_id: QuestionId) -> String {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .map_or_else(|| format!("Question {question_id}"), |q| q.text.clone())
    }

    /// Restarts the preview timer; only the last edit in a burst is sent.
    fn config_changed(&mut self) {
        self.debouncer.schedule(now_millis());
    }

    pub fn add_filter(&mut self) {
        match self.draft.build_filter() {
            Ok(filter) => {
                self.config.filters.push(filter);
                self.draft.clear_filter();
                self.config_changed();
            }
            Err(err) => self.draft.error = Some(err),
        }
    }

    pub fn remove_filter(&mut self, index: usize) {
        if index < self.config.filters.len() {
            self.config.filters.remove(index);
            self.config_changed();
        }
    }

    pub fn add_dimension(&mut self) {
        match self.draft.build_dimension() {
            Ok(dimension) => {
                self.config.segmentation.dimensions.push(dimension);
                self.draft.clear_dimension();
                self.config_changed();
            }
            Err(err) => self.draft.error = Some(err),
        }
    }

    pub fn remove_dimension(&mut self, index: usize) {
        let Segmentation { dimensions } = &mut self.config.segmentation;
        if index < dimensions.len() {
            dimensions.remove(index);
            self.config_changed();
        }
    }

    pub fn clear_config(&mut self) {
        if !self.config.is_empty() {
            self.config = AnalyticsConfig::default();
            self.config_changed();
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.preview_request.is_some() || self.debouncer.is_pending()
    }
}

impl SurveyApp {
    pub fn open_analytics(&mut self, ctx: &egui::Context, survey: SurveySummary) {
        let mut view = AnalyticsView::new(survey);
        view.questions_request = Some(tasks::fetch(ctx, self.api.get_questions(&view.survey.id)));
        // the unfiltered preview goes out straight away
        match self.api.analytics_preview(&view.survey.id, &view.config) {
            Ok(request) => view.preview_request = Some(tasks::fetch(ctx, request)),
            Err(err) => view.preview_error = Some(err.to_string()),
        }
        self.analytics = Some(view);
        self.state = AppState::Analytics;
    }

    pub(super) fn poll_analytics(&mut self, ctx: &egui::Context) {
        let Some(view) = self.analytics.as_mut() else {
            return;
        };

        if let Some(result) = view.questions_request.as_ref().and_then(Pending::poll) {
            view.questions_request = None;
            match result {
                Ok(mut questions) => {
                    questions.sort_by_key(|q| q.order);
                    view.questions = questions;
                }
                Err(err) => log::warn!("questions of survey {} unavailable: {err}", view.survey.id),
            }
        }

        if let Some(result) = view.preview_request.as_ref().and_then(Pending::poll) {
            view.preview_request = None;
            match result {
                Ok(value) => {
                    view.preview = Some(AnalyticsPreview(value));
                    view.preview_error = None;
                }
                Err(err) => {
                    log::warn!("analytics preview failed: {err}");
                    view.preview_error = Some(format!("Preview failed. {err}"));
                }
            }
        }

        let now = now_millis();
        if view.debouncer.fire_if_due(now) {
            match self.api.analytics_preview(&view.survey.id, &view.config) {
                // replacing the receiver drops any older in-flight preview
                Ok(request) => view.preview_request = Some(tasks::fetch(ctx, request)),
                Err(err) => view.preview_error = Some(err.to_string()),
            }
        } else if let Some(wait) = view.debouncer.remaining_ms(now) {
            ctx.request_repaint_after(Duration::from_millis(wait as u64));
        }
    }

    pub fn export_analytics(&self, ctx: &egui::Context) {
        let Some(view) = self.analytics.as_ref() else {
            return;
        };
        match self.api.analytics_export_url(&view.survey.id, &view.config) {
            Ok(url) => ctx.open_url(egui::OpenUrl::new_tab(url)),
            Err(err) => log::warn!("analytics export unavailable: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_accept_open_bounds() {
        let ranges = parse_ranges("Very small: ..5\nSmall: 5..10\n\nLarge: 10..").unwrap();
        assert_eq!(ranges["Very small"], [None, Some(5.0)]);
        assert_eq!(ranges["Small"], [Some(5.0), Some(10.0)]);
        assert_eq!(ranges["Large"], [Some(10.0), None]);
        assert!(parse_ranges("Any: ..").is_err());
        assert!(parse_ranges("Small 5..10").is_err());
        assert!(parse_ranges("").is_err());
    }

    #[test]
    fn mappings_need_both_sides() {
        let mapping = parse_mapping("London => London & SE\nSouth East=>London & SE").unwrap();
        assert_eq!(mapping["South East"], "London & SE");
        assert!(parse_mapping("London =>").is_err());
    }

    #[test]
    fn draft_prefers_choice_filters() {
        let mut draft = Draft {
            filter_question: Some(3),
            filter_values: "A, B,".into(),
            filter_min: "1".into(),
            ..Draft::default()
        };
        assert_eq!(
            draft.build_filter(),
            Ok(Filter::Choice {
                question_id: 3,
                values: vec!["A".into(), "B".into()]
            })
        );
        draft.filter_values.clear();
        assert_eq!(
            draft.build_filter(),
            Ok(Filter::NumericRange {
                question_id: 3,
                min: Some(1.0),
                max: None
            })
        );
        draft.filter_min = "lots".into();
        assert!(draft.build_filter().is_err());
    }

    #[test]
    fn edits_restart_the_preview_timer() {
        let mut view = AnalyticsView::new(SurveySummary {
            id: "s".into(),
            title: "T".into(),
            description: String::new(),
            created_at: None,
            question_count: 0,
            is_active: true,
        });
        view.draft = Draft {
            dimension_name: "Region".into(),
            dimension_question: Some(2),
            dimension_kind: DimensionKind::ChoiceMapping,
            dimension_rules: "Leeds => North".into(),
            ..Draft::default()
        };
        view.add_dimension();
        assert!(view.debouncer.is_pending());
        assert_eq!(view.config.segmentation.dimensions[0].name(), "Region");
        assert!(view.draft.dimension_rules.is_empty());

        view.draft.dimension_name = "Broken".into();
        view.add_dimension();
        assert!(view.draft.error.is_some());
        assert_eq!(view.config.segmentation.dimensions.len(), 1);
    }
}
