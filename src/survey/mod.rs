//! Everything that happens between "survey loaded" and "survey submitted".

pub mod flow;
pub mod options;
pub mod sanitize;
pub mod sections;
pub mod validation;

pub use flow::{Advance, FlowPhase, QuestionDisplay, SurveyFlow};
pub use sections::Section;
