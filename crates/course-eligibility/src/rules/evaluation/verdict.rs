use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use super::super::domain::{BasketId, Level, LogicOperator, SubjectId};
use super::super::grade::Grade;

/// Pipeline stage of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    QualificationTierCheck,
    OlRequirementCheck,
    BasketEvaluation,
    LogicCombination,
    VerdictAssembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Failed,
    /// The course tier does not ask for this evidence.
    NotApplicable,
    /// Bypassed by the tier short-circuit.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
}

impl StageRecord {
    pub(crate) fn new(stage: Stage, status: StageStatus) -> Self {
        Self { stage, status }
    }

    pub(crate) fn outcome(stage: Stage, passed: bool) -> Self {
        let status = if passed {
            StageStatus::Passed
        } else {
            StageStatus::Failed
        };
        Self { stage, status }
    }
}

/// Which examination stage a not-applicable marker refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceStage {
    OrdinaryLevel,
    AdvancedLevel,
}

/// Structured explanation entry. Renders as a colon-separated code so a UI
/// can localize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    TierNoNeed,
    StageNotApplicable(EvidenceStage),
    UnrecognizedGrade {
        level: Level,
        subject: SubjectId,
    },
    OlSubjectMissing {
        subject: SubjectId,
    },
    OlSubjectGradeUnmet {
        subject: SubjectId,
        required: Grade,
    },
    OlCountUnmet {
        min_grade: Grade,
        required: u32,
        actual: usize,
    },
    OlGroupUnmet {
        group: String,
    },
    BasketEmpty {
        basket: BasketId,
    },
    BasketSubjectMissing {
        basket: BasketId,
        subject: SubjectId,
    },
    BasketSubjectGradeUnmet {
        basket: BasketId,
        subject: SubjectId,
    },
    BasketMinSubjectsUnmet {
        basket: BasketId,
    },
    BasketGradeCountUnmet {
        basket: BasketId,
    },
    RuleUnmet {
        rule: usize,
        logic: LogicOperator,
    },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::TierNoNeed => f.write_str("tier:no_need"),
            Reason::StageNotApplicable(EvidenceStage::OrdinaryLevel) => {
                f.write_str("stage:ordinary_level:not_applicable")
            }
            Reason::StageNotApplicable(EvidenceStage::AdvancedLevel) => {
                f.write_str("stage:advanced_level:not_applicable")
            }
            Reason::UnrecognizedGrade { level, subject } => {
                write!(f, "record:{}:{subject}:grade_unrecognized", level.code())
            }
            Reason::OlSubjectMissing { subject } => write!(f, "ol:subject:{subject}:missing"),
            Reason::OlSubjectGradeUnmet { subject, required } => {
                write!(f, "ol:subject:{subject}:grade_unmet:{required}")
            }
            Reason::OlCountUnmet {
                min_grade,
                required,
                actual,
            } => write!(f, "ol:count:{min_grade}:required_{required}:actual_{actual}"),
            Reason::OlGroupUnmet { group } => write!(f, "ol:group:{group}:unmet"),
            Reason::BasketEmpty { basket } => write!(f, "basket:{basket}:no_subjects"),
            Reason::BasketSubjectMissing { basket, subject } => {
                write!(f, "basket:{basket}:subject_missing:{subject}")
            }
            Reason::BasketSubjectGradeUnmet { basket, subject } => {
                write!(f, "basket:{basket}:subject_grade_unmet:{subject}")
            }
            Reason::BasketMinSubjectsUnmet { basket } => {
                write!(f, "basket:{basket}:min_subjects_unmet")
            }
            Reason::BasketGradeCountUnmet { basket } => {
                write!(f, "basket:{basket}:grade_count_unmet")
            }
            Reason::RuleUnmet { rule, logic } => write!(f, "rule:{rule}:{}_unmet", logic.code()),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A subject placed into one grade bucket of a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAssignment {
    pub subject_id: SubjectId,
    pub grade: Grade,
    pub bucket: Grade,
}

/// Per-basket part of the explanation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketTrace {
    pub basket_id: BasketId,
    pub satisfied: bool,
    pub optional: bool,
    pub selected_subjects: Vec<SubjectId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<BucketAssignment>,
}

/// Outcome of one basket logic rule, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub rule: usize,
    pub logic: LogicOperator,
    pub primary_basket_id: BasketId,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTrace {
    pub stages: Vec<StageRecord>,
    pub baskets: Vec<BasketTrace>,
    pub rules: Vec<RuleOutcome>,
    /// Final contribution of each basket after logic rules are applied.
    pub contributions: BTreeMap<BasketId, bool>,
}

/// The engine's single output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub satisfied_baskets: BTreeSet<BasketId>,
    pub failed_baskets: BTreeSet<BasketId>,
    pub ol_satisfied: bool,
    pub reasons: Vec<Reason>,
    pub trace: EvaluationTrace,
}

impl EligibilityVerdict {
    /// Reason codes as rendered in the JSON output.
    pub fn reason_codes(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    pub fn stage_status(&self, stage: Stage) -> Option<StageStatus> {
        self.trace
            .stages
            .iter()
            .find(|record| record.stage == stage)
            .map(|record| record.status)
    }

    pub fn summary(&self) -> String {
        if self.eligible {
            "eligible".to_string()
        } else if self.reasons.is_empty() {
            "not eligible".to_string()
        } else {
            format!("not eligible: {}", self.reason_codes().join(", "))
        }
    }
}
