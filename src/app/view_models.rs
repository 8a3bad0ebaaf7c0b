use super::*;
use crate::view_models::{SectionProgress, format_created};

impl SurveyRow {
    pub fn new(summary: &SurveySummary, config: &ClientConfig) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            description: summary.description.clone(),
            question_count: summary.question_count,
            created: format_created(summary.created_at.as_deref()),
            is_active: summary.is_active,
            link: config.survey_link(&summary.id),
        }
    }
}

impl SurveyApp {
    pub fn survey_rows(&self) -> Vec<SurveyRow> {
        self.surveys
            .iter()
            .map(|s| SurveyRow::new(s, &self.config))
            .collect()
    }

    pub fn section_progress(&self) -> Option<SectionProgress> {
        let (current, total) = self.flow.as_ref()?.section_progress();
        (total > 0).then_some(SectionProgress { current, total })
    }
}
