use std::path::PathBuf;

use course_eligibility::rules::{
    eligible_course_ids, evaluate, validate, BasketId, CandidateRecord, CourseListing,
    CourseRequirementTree, EligibilityEngine, EligibilityError, InvariantViolation,
};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn load_tree(name: &str) -> CourseRequirementTree {
    let data = std::fs::read_to_string(fixture(name)).expect("fixture readable");
    serde_json::from_str(&data).expect("fixture is a requirement tree")
}

fn tree_from(value: serde_json::Value) -> CourseRequirementTree {
    serde_json::from_value(value).expect("requirement tree parses")
}

fn candidate_from(value: serde_json::Value) -> CandidateRecord {
    serde_json::from_value(value).expect("candidate parses")
}

fn science_course(internal_logic: &str) -> CourseRequirementTree {
    tree_from(json!({
        "minQualificationTier": "ALPass",
        "baskets": [{
            "id": "basket_science",
            "subjectIds": [101, 102, 103],
            "minRequired": 2,
            "maxAllowed": 3,
            "internalLogic": internal_logic,
            "gradeRequirements": [{ "grade": "C", "count": 2 }]
        }]
    }))
}

#[test]
fn two_credit_passes_fill_the_science_basket() {
    let candidate = candidate_from(json!([
        { "subjectId": 101, "level": "AL", "grade": "B" },
        { "subjectId": 102, "level": "AL", "grade": "C" },
        { "subjectId": 103, "level": "AL", "grade": "F" }
    ]));

    let verdict = evaluate(&science_course("AND"), &candidate).expect("valid tree");

    assert!(verdict.eligible);
    assert!(verdict.satisfied_baskets.contains(&BasketId::new("basket_science")));
}

#[test]
fn one_credit_pass_leaves_the_science_basket_short() {
    let candidate = candidate_from(json!([
        { "subjectId": 101, "level": "AL", "grade": "B" },
        { "subjectId": 102, "level": "AL", "grade": "S" },
        { "subjectId": 103, "level": "AL", "grade": "F" }
    ]));

    let verdict = evaluate(&science_course("AND"), &candidate).expect("valid tree");

    assert!(!verdict.eligible);
    assert_eq!(
        verdict.reason_codes(),
        vec!["basket:basket_science:grade_count_unmet"]
    );
}

#[test]
fn or_rule_between_baskets_admits_on_primary_alone() {
    let course = tree_from(json!({
        "minQualificationTier": "ALPass",
        "baskets": [
            {
                "id": "X",
                "subjectIds": [101],
                "minRequired": 1,
                "maxAllowed": 1,
                "internalLogic": "OR"
            },
            {
                "id": "Y",
                "subjectIds": [104],
                "minRequired": 1,
                "maxAllowed": 1,
                "internalLogic": "OR"
            }
        ],
        "basketLogicRules": [
            { "logic": "OR", "primaryBasketId": "X", "targetBasketIds": ["Y"] }
        ]
    }));
    let candidate = candidate_from(json!({
        "records": [{ "subjectId": 101, "level": "AL", "grade": "A" }]
    }));

    let verdict = evaluate(&course, &candidate).expect("valid tree");

    assert!(verdict.eligible);
    assert!(verdict.trace.rules[0].satisfied);
    assert!(verdict.failed_baskets.contains(&BasketId::new("Y")));
}

#[test]
fn ordinary_level_count_cites_the_shortfall() {
    let course = tree_from(json!({
        "minQualificationTier": "OLPass",
        "olRequirements": [{ "kind": "count_rule", "minGrade": "S", "requiredCount": 6 }]
    }));
    let mut records: Vec<serde_json::Value> = (1..=6)
        .map(|subject| json!({ "subjectId": subject, "level": "OL", "grade": "S" }))
        .collect();

    let six = candidate_from(json!(records.clone()));
    assert!(evaluate(&course, &six).expect("valid tree").eligible);

    records.pop();
    let five = candidate_from(json!(records));
    let verdict = evaluate(&course, &five).expect("valid tree");
    assert!(!verdict.eligible);
    assert!(verdict
        .reason_codes()
        .contains(&"ol:count:S:required_6:actual_5".to_string()));
}

#[test]
fn min_above_max_is_reported_instead_of_a_verdict() {
    let course = tree_from(json!({
        "minQualificationTier": "ALPass",
        "baskets": [{
            "id": "b1",
            "subjectIds": [101, 102, 103],
            "minRequired": 3,
            "maxAllowed": 2,
            "internalLogic": "OR"
        }]
    }));

    let err = evaluate(&course, &CandidateRecord::default()).expect_err("tree rejected");

    assert_eq!(err.code(), "structural_invariant_violation");
    assert!(matches!(
        err.violations(),
        [InvariantViolation::MinExceedsMax { .. }]
    ));
}

#[test]
fn conflicting_rules_surface_as_an_error() {
    let course = tree_from(json!({
        "minQualificationTier": "ALPass",
        "baskets": [
            { "id": "X", "subjectIds": [101], "minRequired": 1, "maxAllowed": 1, "internalLogic": "OR" },
            { "id": "Y", "subjectIds": [104], "minRequired": 1, "maxAllowed": 1, "internalLogic": "OR" }
        ],
        "basketLogicRules": [
            { "logic": "OR", "primaryBasketId": "X", "targetBasketIds": ["Y"] },
            { "logic": "AND", "primaryBasketId": "X", "targetBasketIds": ["Y"] }
        ]
    }));

    assert!(matches!(
        validate(course),
        Err(EligibilityError::ConflictingRule { first_rule: 0, second_rule: 1, .. })
    ));
}

#[test]
fn fixture_course_admits_fixture_candidate() {
    let course = load_tree("physical_science.json");
    let candidate = CandidateRecord::from_path(fixture("candidate.json")).expect("candidate loads");

    let verdict = evaluate(&course, &candidate).expect("valid tree");

    assert!(verdict.eligible);
    assert!(verdict.ol_satisfied);
    assert_eq!(
        verdict.reason_codes(),
        vec![
            "record:ol:8:grade_unrecognized",
            "basket:basket_maths:subject_grade_unmet:104",
            "basket:basket_maths:min_subjects_unmet",
            "basket:basket_maths:grade_count_unmet",
        ]
    );
}

#[test]
fn verdict_serializes_in_camel_case() {
    let course = load_tree("physical_science.json");
    let candidate = CandidateRecord::from_path(fixture("candidate.json")).expect("candidate loads");

    let verdict = evaluate(&course, &candidate).expect("valid tree");
    let value = serde_json::to_value(&verdict).expect("serializes");

    assert_eq!(value["eligible"], true);
    assert_eq!(value["olSatisfied"], true);
    assert_eq!(value["satisfiedBaskets"], json!(["basket_science"]));
    assert_eq!(value["failedBaskets"], json!(["basket_maths"]));
    assert_eq!(value["trace"]["stages"][0]["stage"], "qualification_tier_check");
    assert_eq!(value["trace"]["baskets"][0]["selectedSubjects"], json!([101, 102, 103]));
}

#[test]
fn catalog_fixture_matches_in_order() {
    let data = std::fs::read_to_string(fixture("catalog.json")).expect("fixture readable");
    let courses: Vec<CourseListing> = serde_json::from_str(&data).expect("catalog parses");
    let candidate = CandidateRecord::from_path(fixture("candidate.csv")).expect("candidate loads");

    let matches = EligibilityEngine::default().match_courses(&courses, &candidate);

    assert_eq!(matches.len(), 4);
    assert_eq!(eligible_course_ids(&matches), vec!["BSC-PHYS", "CERT-ENG"]);
    let draft = matches[3].outcome.as_ref().expect_err("draft course is malformed");
    assert_eq!(draft.violations().len(), 2);
}
