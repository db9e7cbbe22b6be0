use super::common::*;
use crate::rules::domain::{OlRequirement, SubjectId};
use crate::rules::evaluation::{evaluate_ordinary_level, Reason};
use crate::rules::grade::Grade;

#[test]
fn six_passes_satisfy_count_rule() {
    let outcome = evaluate_ordinary_level(&[count_rule(Grade::S, 6)], &candidate(ol_passes()));

    assert!(outcome.satisfied);
    assert!(outcome.reasons.is_empty());
}

#[test]
fn five_passes_fail_count_rule_citing_shortfall() {
    let mut records = ol_passes();
    records.retain(|record| record.subject_id != SubjectId(RELIGION));

    let outcome = evaluate_ordinary_level(&[count_rule(Grade::S, 6)], &candidate(records));

    assert!(!outcome.satisfied);
    assert_eq!(
        outcome.reasons,
        vec![Reason::OlCountUnmet {
            min_grade: Grade::S,
            required: 6,
            actual: 5,
        }]
    );
    assert_eq!(
        outcome.reasons[0].to_string(),
        "ol:count:S:required_6:actual_5"
    );
}

#[test]
fn count_rules_share_subjects() {
    let requirements = [count_rule(Grade::S, 6), count_rule(Grade::C, 3)];
    let outcome = evaluate_ordinary_level(&requirements, &candidate(ol_passes()));

    assert!(outcome.satisfied);
    assert_eq!(outcome.requirements, vec![true, true]);
}

#[test]
fn subject_grade_requirements_report_missing_and_low_grades() {
    let requirements = [
        OlRequirement::SubjectGrade {
            subject_id: SubjectId(ENGLISH),
            min_grade: Grade::C,
        },
        OlRequirement::SubjectGrade {
            subject_id: SubjectId(MATHEMATICS),
            min_grade: Grade::A,
        },
        OlRequirement::SubjectGrade {
            subject_id: SubjectId(TAMIL),
            min_grade: Grade::S,
        },
    ];

    let outcome = evaluate_ordinary_level(&requirements, &candidate(ol_passes()));

    assert!(!outcome.satisfied);
    assert_eq!(outcome.requirements, vec![true, false, false]);
    assert_eq!(
        outcome.reasons,
        vec![
            Reason::OlSubjectGradeUnmet {
                subject: SubjectId(MATHEMATICS),
                required: Grade::A,
            },
            Reason::OlSubjectMissing {
                subject: SubjectId(TAMIL),
            },
        ]
    );
}

#[test]
fn or_group_passes_when_any_member_meets_grade() {
    let language = OlRequirement::OrGroup {
        group_id: Some("language".to_string()),
        subject_ids: [SubjectId(SINHALA), SubjectId(TAMIL), SubjectId(ENGLISH)].into(),
        min_grade: Grade::B,
        required_count: 1,
    };

    let outcome = evaluate_ordinary_level(&[language], &candidate(ol_passes()));
    assert!(outcome.satisfied);
}

#[test]
fn unmet_or_group_is_labelled_by_position_without_id() {
    let requirements = [
        count_rule(Grade::S, 1),
        OlRequirement::OrGroup {
            group_id: None,
            subject_ids: [SubjectId(TAMIL), SubjectId(GEOGRAPHY)].into(),
            min_grade: Grade::S,
            required_count: 1,
        },
    ];

    let outcome = evaluate_ordinary_level(&requirements, &candidate(ol_passes()));

    assert!(!outcome.satisfied);
    assert_eq!(outcome.reasons[0].to_string(), "ol:group:1:unmet");
}

#[test]
fn no_records_is_an_ordinary_failure() {
    let outcome = evaluate_ordinary_level(&[count_rule(Grade::S, 1)], &candidate([]));
    assert!(!outcome.satisfied);
}

#[test]
fn advanced_level_results_are_ignored() {
    let outcome = evaluate_ordinary_level(
        &[count_rule(Grade::S, 1)],
        &candidate([al(PHYSICS, Grade::A)]),
    );
    assert!(!outcome.satisfied);
}
