//! Section-by-section survey taking.
//!
//! `SurveyFlow` owns every answer of one survey-taking session. It never talks
//! to the network: operations that need the backend hand back a payload
//! (`Advance::Submit`, `Advance::Moved { partial_saves }`) and the caller
//! reports the outcome with `submission_succeeded` / `submission_failed`.

use super::options::{DisplayOptions, grid_for_display, option_seed, options_for_display};
use super::sanitize::{sanitize_answer, sanitize_responses};
use super::sections::{Section, group_into_sections, section_of};
use super::validation::validate;
use crate::answers::{Answer, OtherTexts, Responses, recompute_auto_totals};
use crate::api::{PartialSave, SubmitFailure, SubmitPayload};
use crate::model::{Question, QuestionId, QuestionKind, Survey};
use crate::persistence::progress::{new_session_id, now_millis};
use crate::persistence::{CookieJar, ProgressSnapshot, ProgressStore};
use std::collections::{BTreeMap, BTreeSet};

/// How long the "progress saved" notice stays up.
pub const SAVED_NOTICE_MS: i64 = 3_000;

#[derive(Clone, Debug, PartialEq)]
pub enum FlowPhase {
    Loading,
    Failed(String),
    Active,
    Submitted,
}

/// Memoized display order of a question, fixed for the session.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionDisplay {
    Options(DisplayOptions),
    Grid { rows: Vec<String>, columns: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
    /// Not in a state that accepts input (loading, submitting, submitted).
    Ignored,
    /// The current section has errors; nothing moved.
    Blocked,
    /// Moved to the next section and saved progress.
    Moved { partial_saves: Vec<PartialSave> },
    /// Last section passed; send this payload to the backend.
    Submit(SubmitPayload),
}

pub struct SurveyFlow {
    survey_id: String,
    survey: Option<Survey>,
    phase: FlowPhase,
    fetch_started: bool,
    sections: Vec<Section>,
    current_section: usize,
    responses: Responses,
    other_texts: OtherTexts,
    validation_errors: BTreeMap<QuestionId, String>,
    touched: BTreeSet<QuestionId>,
    submitting: bool,
    submit_error: Option<SubmitFailure>,
    restored: bool,
    saved_notice_at: Option<i64>,
    session_id: String,
    display: BTreeMap<QuestionId, QuestionDisplay>,
}

impl SurveyFlow {
    pub fn new(survey_id: impl Into<String>) -> Self {
        Self {
            survey_id: survey_id.into(),
            survey: None,
            phase: FlowPhase::Loading,
            fetch_started: false,
            sections: Vec::new(),
            current_section: 0,
            responses: Responses::new(),
            other_texts: OtherTexts::new(),
            validation_errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            submitting: false,
            submit_error: None,
            restored: false,
            saved_notice_at: None,
            session_id: String::new(),
            display: BTreeMap::new(),
        }
    }

    // ---- Loading -------------------------------------------------------

    /// True exactly once per flow; guards the initial survey fetch.
    pub fn begin_fetch(&mut self) -> bool {
        !std::mem::replace(&mut self.fetch_started, true)
    }

    pub fn survey_loaded<J: CookieJar>(&mut self, survey: Survey, store: &mut ProgressStore<J>) {
        if survey.questions.is_empty() {
            self.load_failed("This survey has no questions yet.");
            return;
        }
        self.sections = group_into_sections(&survey.questions);
        log::info!(
            "survey {} loaded: {} questions in {} sections",
            self.survey_id,
            survey.questions.len(),
            self.sections.len()
        );
        self.survey = Some(survey);

        match store.load(&self.survey_id) {
            Some(mut snapshot) => {
                self.session_id = store.ensure_session_id(&self.survey_id, &mut snapshot);
                self.responses = snapshot.responses;
                self.other_texts = snapshot.other_texts;
                self.current_section = snapshot
                    .current_section_index
                    .min(self.sections.len().saturating_sub(1));
                self.restored = true;
                log::info!(
                    "restored progress for survey {} at section {}",
                    self.survey_id,
                    self.current_section
                );
            }
            None => {
                self.session_id = new_session_id(now_millis());
                self.current_section = 0;
            }
        }

        self.compute_display();
        self.phase = FlowPhase::Active;
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("survey {} failed to load: {message}", self.survey_id);
        self.phase = FlowPhase::Failed(message);
    }

    /// Allows a manual retry after a failed load.
    pub fn reset_fetch(&mut self) {
        self.fetch_started = false;
        self.phase = FlowPhase::Loading;
    }

    fn compute_display(&mut self) {
        self.display.clear();
        for question in self.sections.iter().flat_map(|s| &s.questions) {
            let display = match &question.kind {
                QuestionKind::Choice { .. } | QuestionKind::MultiChoice { .. } => {
                    let seed = option_seed(&self.survey_id, question.id, &self.session_id);
                    QuestionDisplay::Options(options_for_display(question, &seed))
                }
                QuestionKind::Grid { .. } => match grid_for_display(question, &self.survey_id) {
                    Some((rows, columns)) => QuestionDisplay::Grid { rows, columns },
                    None => continue,
                },
                _ => continue,
            };
            self.display.insert(question.id, display);
        }
    }

    // ---- Accessors -----------------------------------------------------

    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    pub fn survey(&self) -> Option<&Survey> {
        self.survey.as_ref()
    }

    pub fn phase(&self) -> &FlowPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FlowPhase::Loading
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, FlowPhase::Failed(_))
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == FlowPhase::Submitted
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn current_section_index(&self) -> usize {
        self.current_section
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current_section)
    }

    pub fn is_first_section(&self) -> bool {
        self.current_section == 0
    }

    pub fn is_last_section(&self) -> bool {
        self.current_section + 1 >= self.sections.len()
    }

    /// `(1-based current section, section count)`
    pub fn section_progress(&self) -> (usize, usize) {
        (self.current_section + 1, self.sections.len())
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.responses.get(&question_id)
    }

    pub fn other_texts(&self) -> &OtherTexts {
        &self.other_texts
    }

    pub fn other_text(&self, question_id: QuestionId) -> &str {
        self.other_texts.get(&question_id).map_or("", String::as_str)
    }

    pub fn validation_errors(&self) -> &BTreeMap<QuestionId, String> {
        &self.validation_errors
    }

    pub fn error_for(&self, question_id: QuestionId) -> Option<&str> {
        self.validation_errors
            .get(&question_id)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    pub fn submit_error(&self) -> Option<&SubmitFailure> {
        self.submit_error.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn display(&self, question_id: QuestionId) -> Option<&QuestionDisplay> {
        self.display.get(&question_id)
    }

    pub fn was_restored(&self) -> bool {
        self.restored
    }

    pub fn dismiss_restored_notice(&mut self) {
        self.restored = false;
    }

    pub fn saved_notice_visible(&self, now_ms: i64) -> bool {
        self.saved_notice_at
            .is_some_and(|at| now_ms - at < SAVED_NOTICE_MS)
    }

    fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.sections
            .iter()
            .flat_map(|s| &s.questions)
            .find(|q| q.id == question_id)
    }

    fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| &s.questions)
    }

    // ---- Editing -------------------------------------------------------

    pub fn set_answer(&mut self, question_id: QuestionId, mut answer: Answer) {
        if let Some(QuestionKind::FormFields {
            subfields,
            validations,
        }) = self.question(question_id).map(|q| &q.kind)
        {
            if let Answer::Map(map) = &mut answer {
                recompute_auto_totals(map, subfields, validations);
            }
        }
        self.responses.insert(question_id, answer);
        self.revalidate_if_shown(question_id);
    }

    pub fn clear_answer(&mut self, question_id: QuestionId) {
        self.responses.remove(&question_id);
        self.revalidate_if_shown(question_id);
    }

    pub fn set_other_text(&mut self, question_id: QuestionId, text: impl Into<String>) {
        self.other_texts.insert(question_id, text.into());
        self.revalidate_if_shown(question_id);
    }

    /// Field lost focus: from now on its error follows every edit.
    pub fn blur(&mut self, question_id: QuestionId) {
        self.touched.insert(question_id);
        self.validate_question(question_id);
    }

    fn revalidate_if_shown(&mut self, question_id: QuestionId) {
        if self.touched.contains(&question_id) || self.validation_errors.contains_key(&question_id) {
            self.validate_question(question_id);
        }
    }

    /// Validates one question and records the outcome. Returns true when valid.
    fn validate_question(&mut self, question_id: QuestionId) -> bool {
        let Some(question) = self.question(question_id) else {
            return true;
        };
        match validate(question, self.responses.get(&question_id), &self.other_texts) {
            Some(message) => {
                self.validation_errors.insert(question_id, message);
                false
            }
            None => {
                self.validation_errors.remove(&question_id);
                true
            }
        }
    }

    fn validate_section(&mut self, index: usize) -> bool {
        let ids: Vec<QuestionId> = self
            .sections
            .get(index)
            .map(|s| s.questions.iter().map(|q| q.id).collect())
            .unwrap_or_default();
        // every question is checked so all messages show at once
        ids.into_iter()
            .map(|id| self.validate_question(id))
            .fold(true, |all, ok| all && ok)
    }

    // ---- Navigation ----------------------------------------------------

    fn accepts_input(&self) -> bool {
        self.phase == FlowPhase::Active && !self.submitting
    }

    /// Next / Save. Validates the current section only.
    pub fn advance<J: CookieJar>(&mut self, store: &mut ProgressStore<J>) -> Advance {
        if !self.accepts_input() {
            return Advance::Ignored;
        }
        if !self.validate_section(self.current_section) {
            log::debug!("section {} has validation errors", self.current_section);
            return Advance::Blocked;
        }
        if self.is_last_section() {
            return match self.prepare_submission() {
                Some(payload) => Advance::Submit(payload),
                None => Advance::Blocked,
            };
        }

        let completed = self.current_section;
        self.current_section += 1;
        self.persist(store);
        self.saved_notice_at = Some(now_millis());

        Advance::Moved {
            partial_saves: self.partial_saves(completed),
        }
    }

    pub fn back(&mut self) {
        if self.accepts_input() && self.current_section > 0 {
            self.current_section -= 1;
        }
    }

    fn persist<J: CookieJar>(&self, store: &mut ProgressStore<J>) {
        let snapshot = ProgressSnapshot {
            responses: self.responses.clone(),
            current_section_index: self.current_section,
            other_texts: self.other_texts.clone(),
            timestamp: now_millis(),
            session_id: Some(self.session_id.clone()),
        };
        store.save(&self.survey_id, &snapshot);
    }

    fn partial_saves(&self, section_index: usize) -> Vec<PartialSave> {
        let Some(section) = self.sections.get(section_index) else {
            return Vec::new();
        };
        section
            .questions
            .iter()
            .filter_map(|q| {
                let answer = self.responses.get(&q.id)?;
                let answer = sanitize_answer(q, answer, &self.other_texts)?;
                Some(PartialSave {
                    survey_id: self.survey_id.clone(),
                    question_id: q.id,
                    answer,
                    session_id: Some(self.session_id.clone()),
                })
            })
            .collect()
    }

    // ---- Submission ----------------------------------------------------

    /// Re-validates the whole survey. On the first failure the flow jumps to
    /// that question's section and returns `None`; otherwise the flow enters
    /// the submitting state and returns the sanitized payload.
    pub fn prepare_submission(&mut self) -> Option<SubmitPayload> {
        if !self.accepts_input() {
            return None;
        }

        let ids: Vec<QuestionId> = self.all_questions().map(|q| q.id).collect();
        let invalid: Vec<QuestionId> = ids
            .into_iter()
            .filter(|id| !self.validate_question(*id))
            .collect();

        if let Some(&question_id) = invalid.first() {
            if let Some(index) = section_of(&self.sections, question_id) {
                self.current_section = index;
            }
            log::debug!("submission blocked by question {question_id}");
            return None;
        }

        let questions: Vec<Question> = self.all_questions().cloned().collect();
        self.submitting = true;
        self.submit_error = None;
        Some(SubmitPayload {
            responses: sanitize_responses(&questions, &self.responses, &self.other_texts),
            session_id: Some(self.session_id.clone()),
        })
    }

    pub fn submission_succeeded<J: CookieJar>(&mut self, store: &mut ProgressStore<J>) {
        store.clear(&self.survey_id);
        self.submitting = false;
        self.submit_error = None;
        self.phase = FlowPhase::Submitted;
        log::info!("survey {} submitted", self.survey_id);
    }

    pub fn submission_failed(&mut self, failure: SubmitFailure) {
        log::warn!(
            "survey {} submission failed: {failure} ({})",
            self.survey_id,
            failure.detail()
        );
        self.submitting = false;
        self.submit_error = Some(failure);
    }

    /// Wipes every answer and the saved progress.
    pub fn start_over<J: CookieJar>(&mut self, store: &mut ProgressStore<J>) {
        if self.phase != FlowPhase::Active || self.submitting {
            return;
        }
        self.responses.clear();
        self.other_texts.clear();
        self.validation_errors.clear();
        self.touched.clear();
        self.submit_error = None;
        self.current_section = 0;
        self.restored = false;
        self.saved_notice_at = None;
        self.session_id = new_session_id(now_millis());
        self.compute_display();
        store.clear(&self.survey_id);
        log::info!("survey {} restarted", self.survey_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionRecord;
    use crate::persistence::MemoryCookieJar;

    fn two_section_survey() -> Survey {
        let radio = QuestionRecord {
            id: 1,
            question_text: "Favourite colour?".into(),
            secondary_type: Some("radio".into()),
            options: Some(vec!["Red".into(), "Blue".into()]),
            has_other_option: true,
            section_title: Some("About you".into()),
            order: 1,
            is_required: true,
            ..Default::default()
        };
        let number = QuestionRecord {
            id: 2,
            question_text: "How many staff?".into(),
            secondary_type: Some("number".into()),
            section_title: Some("Your team".into()),
            order: 2,
            is_required: true,
            ..Default::default()
        };
        Survey {
            id: "s-1".into(),
            title: "Team survey".into(),
            description: String::new(),
            created_at: None,
            updated_at: None,
            is_active: true,
            questions: vec![Question::from(number), Question::from(radio)],
        }
    }

    fn loaded(store: &mut ProgressStore<MemoryCookieJar>) -> SurveyFlow {
        let mut flow = SurveyFlow::new("s-1");
        assert!(flow.begin_fetch());
        assert!(!flow.begin_fetch());
        flow.survey_loaded(two_section_survey(), store);
        flow
    }

    #[test]
    fn two_section_survey_end_to_end() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        assert_eq!(flow.phase(), &FlowPhase::Active);
        assert_eq!(flow.sections().len(), 2);
        assert_eq!(flow.current_section_index(), 0);

        // submitting with nothing answered stops at section 1
        assert_eq!(flow.prepare_submission(), None);
        assert_eq!(flow.current_section_index(), 0);
        assert_eq!(flow.error_for(1), Some("This field is required"));
        assert_eq!(flow.advance(&mut store), Advance::Blocked);
        assert!(!store.exists("s-1"));

        flow.set_answer(1, Answer::Text("Blue".into()));
        assert_eq!(flow.error_for(1), None);
        let Advance::Moved { partial_saves } = flow.advance(&mut store) else {
            panic!("expected to move on");
        };
        assert_eq!(partial_saves.len(), 1);
        assert_eq!(partial_saves[0].question_id, 1);
        assert_eq!(flow.current_section_index(), 1);
        assert!(flow.saved_notice_visible(now_millis()));

        let saved = store.load("s-1").unwrap();
        assert_eq!(saved.current_section_index, 1);
        assert_eq!(saved.responses[&1], Answer::Text("Blue".into()));
        assert_eq!(saved.session_id.as_deref(), Some(flow.session_id()));

        assert_eq!(flow.advance(&mut store), Advance::Blocked);
        flow.set_answer(2, Answer::Number(0.0));
        let Advance::Submit(payload) = flow.advance(&mut store) else {
            panic!("expected submission");
        };
        assert!(flow.is_submitting());
        assert_eq!(payload.responses.len(), 2);
        assert_eq!(payload.responses[&2], Answer::Number(0.0));

        flow.submission_succeeded(&mut store);
        assert!(flow.is_submitted());
        assert!(!store.exists("s-1"));
        assert_eq!(flow.advance(&mut store), Advance::Ignored);
    }

    #[test]
    fn full_revalidation_jumps_to_failing_section() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        flow.set_answer(1, Answer::Text("Red".into()));
        assert!(matches!(flow.advance(&mut store), Advance::Moved { .. }));

        // answer in section 1 becomes invalid behind the respondent's back
        flow.set_answer(1, Answer::Text(crate::model::OTHER_OPTION.into()));
        flow.set_answer(2, Answer::Number(3.0));
        assert_eq!(flow.advance(&mut store), Advance::Blocked);
        assert_eq!(flow.current_section_index(), 0);
        assert_eq!(flow.error_for(1), Some("Please specify your 'Other' option"));

        flow.set_other_text(1, "Green");
        flow.current_section = 1;
        let Advance::Submit(payload) = flow.advance(&mut store) else {
            panic!("expected submission");
        };
        assert_eq!(payload.responses[&1], Answer::Text("Other: Green".into()));
    }

    #[test]
    fn yes_no_other_needs_text_then_submits() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut survey = two_section_survey();
        survey.questions = vec![Question::from(QuestionRecord {
            id: 9,
            question_text: "Would you recommend us?".into(),
            secondary_type: Some("yes_no".into()),
            has_other_option: true,
            order: 1,
            is_required: true,
            ..Default::default()
        })];
        let mut flow = SurveyFlow::new("s-1");
        flow.begin_fetch();
        flow.survey_loaded(survey, &mut store);

        flow.set_answer(9, Answer::Text(crate::model::OTHER_OPTION.into()));
        assert_eq!(flow.advance(&mut store), Advance::Blocked);
        assert_eq!(flow.error_for(9), Some("Please specify your 'Other' option"));

        flow.set_other_text(9, "Depends on the project");
        let Advance::Submit(payload) = flow.advance(&mut store) else {
            panic!("expected submission");
        };
        assert_eq!(
            payload.responses[&9],
            Answer::Text("Other: Depends on the project".into())
        );
    }

    #[test]
    fn survey_without_questions_fails_to_load() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut survey = two_section_survey();
        survey.questions.clear();
        let mut flow = SurveyFlow::new("s-1");
        flow.begin_fetch();
        flow.survey_loaded(survey, &mut store);

        assert!(flow.is_failed());
        assert!(flow.current_section().is_none());
        assert_eq!(flow.advance(&mut store), Advance::Ignored);
        assert!(!store.exists("s-1"));
    }

    #[test]
    fn restores_saved_progress() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        flow.set_answer(1, Answer::Text("Red".into()));
        flow.advance(&mut store);
        let session = flow.session_id().to_string();

        let resumed = loaded(&mut store);
        assert!(resumed.was_restored());
        assert_eq!(resumed.current_section_index(), 1);
        assert_eq!(resumed.answer(1), Some(&Answer::Text("Red".into())));
        assert_eq!(resumed.session_id(), session);
        assert_eq!(resumed.display(1), flow.display(1));
    }

    #[test]
    fn failed_submission_keeps_answers_for_retry() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        flow.set_answer(1, Answer::Text("Red".into()));
        flow.advance(&mut store);
        flow.set_answer(2, Answer::Number(7.0));
        assert!(matches!(flow.advance(&mut store), Advance::Submit(_)));
        assert_eq!(flow.advance(&mut store), Advance::Ignored);

        flow.submission_failed(SubmitFailure::Generic("boom".into()));
        assert!(!flow.is_submitting());
        assert_eq!(flow.current_section_index(), 1);
        assert_eq!(flow.answer(2), Some(&Answer::Number(7.0)));
        assert!(matches!(flow.advance(&mut store), Advance::Submit(_)));
    }

    #[test]
    fn back_and_start_over() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        flow.back();
        assert_eq!(flow.current_section_index(), 0);

        flow.set_answer(1, Answer::Text("Red".into()));
        flow.advance(&mut store);
        flow.back();
        assert_eq!(flow.current_section_index(), 0);
        assert!(store.exists("s-1"));

        flow.start_over(&mut store);
        assert_eq!(flow.current_section_index(), 0);
        assert!(flow.responses().is_empty());
        assert!(flow.validation_errors().is_empty());
        assert!(!store.exists("s-1"));
    }

    #[test]
    fn blur_enables_live_validation() {
        let mut store = ProgressStore::new(MemoryCookieJar::new());
        let mut flow = loaded(&mut store);
        flow.set_answer(2, Answer::Text("abc".into()));
        assert_eq!(flow.error_for(2), None);
        flow.blur(2);
        assert_eq!(flow.error_for(2), Some("Please enter a valid number"));
        flow.set_answer(2, Answer::Text("12".into()));
        assert_eq!(flow.error_for(2), None);
    }
}
