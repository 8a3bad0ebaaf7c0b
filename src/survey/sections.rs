use crate::model::{Question, QuestionId};

pub const OTHER_SECTION: &str = "Other";

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub title: String,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn contains(&self, question_id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }
}

/// Title a question is grouped under, or `None` when it stands alone.
fn effective_title(question: &Question) -> Option<&str> {
    question
        .section_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(OTHER_SECTION))
}

/// Groups questions into display sections in one pass over the order-sorted list.
///
/// Consecutive questions sharing a title form one section; a title that comes
/// back later opens a new section. Untitled questions (and ones titled "Other")
/// each get a singleton "Other" section.
pub fn group_into_sections(questions: &[Question]) -> Vec<Section> {
    let mut sorted: Vec<&Question> = questions.iter().collect();
    sorted.sort_by_key(|q| q.order);

    let mut sections: Vec<Section> = Vec::new();
    // Whether the last section can take more questions
    let mut last_open = false;

    for question in sorted {
        match effective_title(question) {
            None => {
                sections.push(Section {
                    title: OTHER_SECTION.to_string(),
                    questions: vec![question.clone()],
                });
                last_open = false;
            }
            Some(title) => match sections.last_mut() {
                Some(last) if last_open && last.title == title => {
                    last.questions.push(question.clone());
                }
                _ => {
                    sections.push(Section {
                        title: title.to_string(),
                        questions: vec![question.clone()],
                    });
                    last_open = true;
                }
            },
        }
    }

    sections
}

/// Index of the section holding `question_id`.
pub fn section_of(sections: &[Section], question_id: QuestionId) -> Option<usize> {
    sections.iter().position(|s| s.contains(question_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionRecord;

    fn q(id: i64, order: i64, section: Option<&str>) -> Question {
        Question::from(QuestionRecord {
            id,
            order,
            section_title: section.map(str::to_string),
            ..Default::default()
        })
    }

    fn shape(sections: &[Section]) -> Vec<(String, Vec<i64>)> {
        sections
            .iter()
            .map(|s| (s.title.clone(), s.questions.iter().map(|q| q.id).collect()))
            .collect()
    }

    #[test]
    fn groups_consecutive_titles_and_isolates_untitled() {
        let questions = vec![q(1, 1, Some("A")), q(2, 2, Some("A")), q(3, 3, None)];
        assert_eq!(
            shape(&group_into_sections(&questions)),
            vec![("A".into(), vec![1, 2]), ("Other".into(), vec![3])]
        );
    }

    #[test]
    fn other_titles_are_always_singletons() {
        let questions = vec![
            q(1, 1, Some("other")),
            q(2, 2, Some("OTHER")),
            q(3, 3, Some("  ")),
        ];
        assert_eq!(
            shape(&group_into_sections(&questions)),
            vec![
                ("Other".into(), vec![1]),
                ("Other".into(), vec![2]),
                ("Other".into(), vec![3]),
            ]
        );
    }

    #[test]
    fn sorts_by_order_and_splits_recurring_titles() {
        let questions = vec![
            q(10, 30, Some("A")),
            q(11, 10, Some("A")),
            q(12, 20, Some("B")),
            q(13, 20, Some("B")),
        ];
        let sections = group_into_sections(&questions);
        assert_eq!(
            shape(&sections),
            vec![
                ("A".into(), vec![11]),
                ("B".into(), vec![12, 13]),
                ("A".into(), vec![10]),
            ]
        );

        let flattened: Vec<i64> = sections.iter().flat_map(|s| s.questions.iter().map(|q| q.id)).collect();
        assert_eq!(flattened, vec![11, 12, 13, 10]);
        assert_eq!(section_of(&sections, 10), Some(2));
    }
}
