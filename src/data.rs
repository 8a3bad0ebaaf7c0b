use crate::model::Survey;

pub const DEMO_SURVEY_ID: &str = "demo";

/// Survey bundled into the binary, used by the offline demo.
pub fn demo_survey() -> Result<Survey, serde_yaml::Error> {
    serde_yaml::from_str(include_str!("data/demo_survey.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;
    use crate::survey::sections::group_into_sections;

    #[test]
    fn demo_survey_parses_without_malformed_questions() {
        let survey = demo_survey().unwrap();
        assert_eq!(survey.id, DEMO_SURVEY_ID);
        assert_eq!(survey.questions.len(), 13);
        assert!(
            survey
                .questions
                .iter()
                .all(|q| !matches!(q.kind, QuestionKind::Malformed { .. }))
        );
    }

    #[test]
    fn demo_survey_sections() {
        let survey = demo_survey().unwrap();
        let titles: Vec<String> = group_into_sections(&survey.questions)
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(
            titles,
            vec!["About your practice", "Your team", "Workload", "Other", "Follow up"]
        );
    }
}
