pub mod config;
pub mod error;
pub mod rules;
pub mod telemetry;

pub use rules::{
    evaluate, validate, CandidateRecord, CourseRequirementTree, EligibilityEngine,
    EligibilityError, EligibilityVerdict,
};
