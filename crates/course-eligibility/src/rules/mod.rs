//! Admission-eligibility rules for university courses.
//!
//! A course's entry requirements are a [`CourseRequirementTree`]: O/L
//! requirements, A/L subject baskets and logic rules between baskets. Trees
//! are checked once by [`validate`] and evaluated against a
//! [`CandidateRecord`] by the [`EligibilityEngine`], which returns an
//! [`EligibilityVerdict`] with a structured explanation trace. Evaluation is
//! pure; engines can be shared freely across threads.

pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod grade;
pub mod import;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{eligible_course_ids, CourseListing, CourseMatch, CourseMatchView};
pub use domain::{
    BasketId, BasketLogicRule, CandidateRecord, CourseRequirementTree, GradeRequirement, Level,
    LogicOperator, OlRequirement, QualificationTier, SubjectBasket, SubjectGradeRequirement,
    SubjectId, SubjectRecord,
};
pub use evaluation::{
    evaluate, EligibilityEngine, EligibilityVerdict, EngineConfig, EvaluationTrace, Reason, Stage,
    StageStatus,
};
pub use grade::{at_least, Grade, RecordedGrade};
pub use import::CandidateImportError;
pub use validation::{validate, EligibilityError, InvariantViolation, ValidTree};
