pub mod args;
pub mod rule;
pub mod subject;

pub use args::Args;
pub use rule::{Condition, Fields, Rule, RuleOptions};
pub use subject::{
    normalize_subject, normalize_subject_value, Record, Subject, SubjectName, SubjectRef,
    SubjectType,
};
