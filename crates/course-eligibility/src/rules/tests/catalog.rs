use super::common::*;
use crate::rules::catalog::{eligible_course_ids, CourseListing};
use crate::rules::domain::{CourseRequirementTree, LogicOperator, QualificationTier};
use crate::rules::evaluation::EligibilityEngine;
use crate::rules::grade::Grade;

fn listing(course_id: &str, requirements: CourseRequirementTree) -> CourseListing {
    CourseListing {
        course_id: course_id.to_string(),
        title: format!("Course {course_id}"),
        university: None,
        requirements,
    }
}

fn catalog() -> Vec<CourseListing> {
    vec![
        listing(
            "physical-science",
            tree(
                QualificationTier::AlPass,
                vec![count_rule(Grade::S, 6)],
                vec![science_basket(LogicOperator::And)],
                Vec::new(),
            ),
        ),
        listing(
            "broken",
            tree(
                QualificationTier::AlPass,
                Vec::new(),
                vec![basket("b", &[PHYSICS], 2, 1, LogicOperator::Or, &[])],
                Vec::new(),
            ),
        ),
        listing("open", CourseRequirementTree::open_entry()),
        listing(
            "ict",
            tree(
                QualificationTier::AlPass,
                Vec::new(),
                vec![basket("ict", &[ICT], 1, 1, LogicOperator::Or, &[(Grade::B, 1)])],
                Vec::new(),
            ),
        ),
    ]
}

#[test]
fn matches_follow_catalog_order() {
    let mut records = ol_passes();
    records.extend([
        al(PHYSICS, Grade::B),
        al(CHEMISTRY, Grade::C),
        al(BIOLOGY, Grade::S),
    ]);

    let matches = EligibilityEngine::default().match_courses(&catalog(), &candidate(records));

    let ids: Vec<&str> = matches.iter().map(|m| m.course_id.as_str()).collect();
    assert_eq!(ids, vec!["physical-science", "broken", "open", "ict"]);
    assert_eq!(eligible_course_ids(&matches), vec!["physical-science", "open"]);
}

#[test]
fn malformed_course_becomes_an_error_entry() {
    let matches = EligibilityEngine::default().match_courses(&catalog(), &candidate([]));

    let broken = &matches[1];
    assert!(!broken.is_eligible());
    assert!(broken.outcome.is_err());

    let view = serde_json::to_value(broken.view()).expect("serializes");
    assert_eq!(view["eligible"], false);
    assert_eq!(view["error"]["code"], "structural_invariant_violation");
    assert!(view.get("verdict").is_none());
}

#[test]
fn view_carries_verdict_for_evaluated_courses() {
    let matches = EligibilityEngine::default().match_courses(&catalog(), &candidate([]));

    let view = serde_json::to_value(matches[2].view()).expect("serializes");
    assert_eq!(view["courseId"], "open");
    assert_eq!(view["eligible"], true);
    assert_eq!(view["verdict"]["reasons"], serde_json::json!(["tier:no_need"]));
    assert!(view.get("error").is_none());
}

#[test]
fn empty_catalog_yields_no_matches() {
    let matches = EligibilityEngine::default().match_courses(&[], &candidate(ol_passes()));
    assert!(matches.is_empty());
    assert!(eligible_course_ids(&matches).is_empty());
}
