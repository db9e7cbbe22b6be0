use crate::rules::domain::{
    BasketId, BasketLogicRule, CandidateRecord, CourseRequirementTree, GradeRequirement, Level,
    LogicOperator, OlRequirement, QualificationTier, SubjectBasket, SubjectGradeRequirement,
    SubjectId, SubjectRecord,
};
use crate::rules::grade::Grade;

pub(super) const PHYSICS: u32 = 101;
pub(super) const CHEMISTRY: u32 = 102;
pub(super) const BIOLOGY: u32 = 103;
pub(super) const COMBINED_MATHS: u32 = 104;
pub(super) const ICT: u32 = 105;

pub(super) const MATHEMATICS: u32 = 1;
pub(super) const SCIENCE: u32 = 2;
pub(super) const ENGLISH: u32 = 3;
pub(super) const SINHALA: u32 = 4;
pub(super) const TAMIL: u32 = 5;
pub(super) const HISTORY: u32 = 6;
pub(super) const RELIGION: u32 = 7;
pub(super) const GEOGRAPHY: u32 = 8;

pub(super) fn al(subject: u32, grade: Grade) -> SubjectRecord {
    SubjectRecord::new(subject, Level::Advanced, grade)
}

pub(super) fn ol(subject: u32, grade: Grade) -> SubjectRecord {
    SubjectRecord::new(subject, Level::Ordinary, grade)
}

pub(super) fn candidate(records: impl IntoIterator<Item = SubjectRecord>) -> CandidateRecord {
    CandidateRecord::new(records)
}

pub(super) fn basket(
    id: &str,
    subjects: &[u32],
    min_required: u32,
    max_allowed: u32,
    internal_logic: LogicOperator,
    grade_requirements: &[(Grade, u32)],
) -> SubjectBasket {
    SubjectBasket {
        id: BasketId::new(id),
        name: format!("{id} subjects"),
        subject_ids: subjects.iter().copied().map(SubjectId).collect(),
        min_required,
        max_allowed,
        internal_logic,
        grade_requirements: grade_requirements
            .iter()
            .map(|(grade, count)| GradeRequirement {
                grade: *grade,
                count: *count,
            })
            .collect(),
        subject_specific_grades: Vec::new(),
    }
}

pub(super) fn with_subject_grade(
    mut basket: SubjectBasket,
    subject: u32,
    min_grade: Grade,
) -> SubjectBasket {
    basket.subject_specific_grades.push(SubjectGradeRequirement {
        subject_id: SubjectId(subject),
        min_grade,
    });
    basket
}

/// The physical science basket: Physics, Chemistry, Biology with two passes
/// at C or better.
pub(super) fn science_basket(logic: LogicOperator) -> SubjectBasket {
    basket(
        "basket_science",
        &[PHYSICS, CHEMISTRY, BIOLOGY],
        2,
        3,
        logic,
        &[(Grade::C, 2)],
    )
}

pub(super) fn rule(logic: LogicOperator, primary: &str, targets: &[&str]) -> BasketLogicRule {
    BasketLogicRule {
        logic,
        primary_basket_id: BasketId::new(primary),
        target_basket_ids: targets.iter().map(|id| BasketId::new(*id)).collect(),
    }
}

pub(super) fn count_rule(min_grade: Grade, required_count: u32) -> OlRequirement {
    OlRequirement::CountRule {
        min_grade,
        required_count,
    }
}

pub(super) fn tree(
    tier: QualificationTier,
    ol_requirements: Vec<OlRequirement>,
    baskets: Vec<SubjectBasket>,
    rules: Vec<BasketLogicRule>,
) -> CourseRequirementTree {
    CourseRequirementTree {
        min_qualification_tier: tier,
        ol_requirements,
        baskets,
        basket_logic_rules: rules,
    }
}

/// A typical O/L sheet: six passes at S or better plus English at C.
pub(super) fn ol_passes() -> Vec<SubjectRecord> {
    vec![
        ol(MATHEMATICS, Grade::B),
        ol(SCIENCE, Grade::C),
        ol(ENGLISH, Grade::C),
        ol(SINHALA, Grade::A),
        ol(HISTORY, Grade::S),
        ol(RELIGION, Grade::S),
        ol(GEOGRAPHY, Grade::F),
    ]
}
