//! Admin analytics: filter/segmentation config sent to the backend, and the
//! few top-level fields of its preview the dashboard reads.

use crate::model::QuestionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const PREVIEW_DEBOUNCE_MS: i64 = 500;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Keep sessions whose answer is one of `values`.
    Choice {
        question_id: QuestionId,
        values: Vec<String>,
    },
    /// Keep sessions whose numeric answer lies in `[min, max]`.
    NumericRange {
        question_id: QuestionId,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl Filter {
    pub fn question_id(&self) -> QuestionId {
        match self {
            Filter::Choice { question_id, .. } | Filter::NumericRange { question_id, .. } => *question_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dimension {
    NumericRange {
        name: String,
        question_id: QuestionId,
        /// segment name -> `[min, max]`, either bound open when null
        ranges: BTreeMap<String, [Option<f64>; 2]>,
    },
    ChoiceMapping {
        name: String,
        question_id: QuestionId,
        /// answer -> segment name
        mapping: BTreeMap<String, String>,
    },
}

impl Dimension {
    pub fn name(&self) -> &str {
        match self {
            Dimension::NumericRange { name, .. } | Dimension::ChoiceMapping { name, .. } => name,
        }
    }

    pub fn question_id(&self) -> QuestionId {
        match self {
            Dimension::NumericRange { question_id, .. } | Dimension::ChoiceMapping { question_id, .. } => {
                *question_id
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub segmentation: Segmentation,
}

impl AnalyticsConfig {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.segmentation.dimensions.is_empty()
    }
}

/// Untyped preview response; only a handful of fields are read.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsPreview(pub Value);

impl AnalyticsPreview {
    pub fn filtered_count(&self) -> Option<u64> {
        self.0.get("filtered_count").and_then(Value::as_u64)
    }

    pub fn total_count(&self) -> Option<u64> {
        self.0.get("total_count").and_then(Value::as_u64)
    }

    /// Segment names in the order the backend wants them shown.
    pub fn segment_order(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .0
            .get("segment_order")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        if !explicit.is_empty() {
            return explicit;
        }
        self.0
            .get("segments")
            .and_then(Value::as_object)
            .map(|segments| segments.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn segment(&self, name: &str) -> Option<&Value> {
        self.0.get("segments")?.get(name)
    }

    /// Respondent count of a segment, whichever shape the backend sent.
    pub fn segment_count(&self, name: &str) -> Option<u64> {
        let segment = self.segment(name)?;
        segment
            .as_u64()
            .or_else(|| segment.get("count").and_then(Value::as_u64))
            .or_else(|| segment.get("session_count").and_then(Value::as_u64))
    }
}

/// Restartable timer: each `schedule` pushes the deadline out, and only the
/// latest one fires.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay_ms: i64,
    deadline: Option<i64>,
}

impl Debouncer {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now_ms: i64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn remaining_ms(&self, now_ms: i64) -> Option<i64> {
        self.deadline.map(|d| (d - now_ms).max(0))
    }

    /// True once the deadline has passed; the timer is then disarmed.
    pub fn fire_if_due(&mut self, now_ms: i64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(PREVIEW_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_the_latest_schedule_fires() {
        let mut debouncer = Debouncer::default();
        debouncer.schedule(0);
        debouncer.schedule(300);
        assert!(!debouncer.fire_if_due(500));
        assert_eq!(debouncer.remaining_ms(500), Some(300));
        assert!(debouncer.fire_if_due(800));
        assert!(!debouncer.fire_if_due(900));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn config_serializes_like_the_segmentation_engine_expects() {
        let mut ranges = BTreeMap::new();
        ranges.insert("Small".to_string(), [None, Some(5.0)]);
        let config = AnalyticsConfig {
            filters: vec![Filter::Choice {
                question_id: 3,
                values: vec!["London".into()],
            }],
            segmentation: Segmentation {
                dimensions: vec![Dimension::NumericRange {
                    name: "Staff Size".into(),
                    question_id: 7,
                    ranges,
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "filters": [{"type": "choice", "question_id": 3, "values": ["London"]}],
                "segmentation": {"dimensions": [{
                    "type": "numeric_range",
                    "name": "Staff Size",
                    "question_id": 7,
                    "ranges": {"Small": [null, 5.0]}
                }]}
            })
        );
    }

    #[test]
    fn preview_reads_counts_and_segment_order() {
        let preview = AnalyticsPreview(json!({
            "filtered_count": 4,
            "total_count": 10,
            "segments": {"B": {"count": 1}, "A": 3},
            "segment_order": ["A", "B"]
        }));
        assert_eq!(preview.filtered_count(), Some(4));
        assert_eq!(preview.total_count(), Some(10));
        assert_eq!(preview.segment_order(), vec!["A", "B"]);
        assert_eq!(preview.segment_count("A"), Some(3));
        assert_eq!(preview.segment_count("B"), Some(1));

        let unordered = AnalyticsPreview(json!({"segments": {"Unknown": 2, "All responses": 5}}));
        assert_eq!(unordered.segment_order(), vec!["All responses", "Unknown"]);
        assert_eq!(unordered.filtered_count(), None);
    }
}
