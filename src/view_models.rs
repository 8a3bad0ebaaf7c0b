use chrono::DateTime;

#[derive(Clone, Debug, PartialEq)]
pub struct SurveyRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub created: String,
    pub is_active: bool,
    pub link: String,
}

impl SurveyRow {
    pub fn label(&self) -> String {
        if self.is_active {
            self.title.clone()
        } else {
            format!("{} (inactive)", self.title)
        }
    }

    pub fn meta(&self) -> String {
        let questions = match self.question_count {
            1 => "1 question".to_string(),
            n => format!("{n} questions"),
        };
        if self.created.is_empty() {
            questions
        } else {
            format!("{questions} · created {}", self.created)
        }
    }
}

/// `2024-03-05T10:00:00Z` -> `05 Mar 2024`; anything unparsable is shown as is.
pub fn format_created(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionProgress {
    /// 1-based
    pub current: usize,
    pub total: usize,
}

impl SectionProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f32 / self.total as f32
        }
    }

    pub fn label(&self) -> String {
        format!("Section {} of {}", self.current, self.total)
    }
}
