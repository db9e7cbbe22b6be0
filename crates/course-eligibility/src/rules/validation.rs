use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::domain::{
    BasketId, BasketLogicRule, CourseRequirementTree, OlRequirement, QualificationTier,
    SubjectBasket, SubjectId,
};

/// A structural defect in a requirement tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "violation", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum InvariantViolation {
    #[error("basket id '{basket}' is used more than once")]
    DuplicateBasketId { basket: BasketId },
    #[error("basket '{basket}' requires {min_required} subjects but allows at most {max_allowed}")]
    MinExceedsMax {
        basket: BasketId,
        min_required: u32,
        max_allowed: u32,
    },
    #[error("basket '{basket}' allows {max_allowed} subjects but only lists {subject_count}")]
    MaxExceedsSubjects {
        basket: BasketId,
        max_allowed: u32,
        subject_count: usize,
    },
    #[error("basket '{basket}' constrains subject {subject} which it does not contain")]
    ConstraintOutsideBasket { basket: BasketId, subject: SubjectId },
    #[error("basket '{basket}' grade requirements need {total} subjects, above its maximum of {max_allowed}")]
    GradeCountsExceedMax {
        basket: BasketId,
        total: u64,
        max_allowed: u32,
    },
    #[error("logic rule {rule} references unknown basket '{basket}'")]
    UnknownBasket { rule: usize, basket: BasketId },
    #[error("logic rule {rule} must relate at least two distinct baskets")]
    RuleTooNarrow { rule: usize },
    #[error("O/L requirement {requirement} is an OR-group without subjects")]
    EmptyOrGroup { requirement: usize },
    #[error("O/L requirement {requirement} needs {required_count} of {subject_count} subjects")]
    OrGroupCountOutOfRange {
        requirement: usize,
        required_count: u32,
        subject_count: usize,
    },
    #[error("O/L requirement {requirement} reuses OR-group id '{group}'")]
    DuplicateOrGroupId { requirement: usize, group: String },
}

/// Errors raised for malformed rule definitions. Candidate data never
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("requirement tree is malformed: {}", describe(.0))]
    StructuralInvariantViolation(Vec<InvariantViolation>),
    #[error("logic rules {first_rule} and {second_rule} relate baskets including '{basket}' with conflicting logic")]
    ConflictingRule {
        basket: BasketId,
        first_rule: usize,
        second_rule: usize,
    },
}

impl EligibilityError {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            EligibilityError::StructuralInvariantViolation(_) => "structural_invariant_violation",
            EligibilityError::ConflictingRule { .. } => "conflicting_rule",
        }
    }

    pub fn violations(&self) -> &[InvariantViolation] {
        match self {
            EligibilityError::StructuralInvariantViolation(violations) => violations,
            EligibilityError::ConflictingRule { .. } => &[],
        }
    }
}

fn describe(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A requirement tree that passed [`validate`]. Baskets are held in an arena
/// indexed by id; logic rules refer to them by id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTree {
    tier: QualificationTier,
    ol_requirements: Vec<OlRequirement>,
    baskets: Vec<SubjectBasket>,
    index: BTreeMap<BasketId, usize>,
    rules: Vec<BasketLogicRule>,
}

impl ValidTree {
    pub fn tier(&self) -> QualificationTier {
        self.tier
    }

    pub fn ol_requirements(&self) -> &[OlRequirement] {
        &self.ol_requirements
    }

    /// Baskets in declaration order.
    pub fn baskets(&self) -> &[SubjectBasket] {
        &self.baskets
    }

    pub fn basket(&self, id: &BasketId) -> Option<&SubjectBasket> {
        self.index.get(id).map(|position| &self.baskets[*position])
    }

    pub fn rules(&self) -> &[BasketLogicRule] {
        &self.rules
    }
}

impl TryFrom<CourseRequirementTree> for ValidTree {
    type Error = EligibilityError;

    fn try_from(tree: CourseRequirementTree) -> Result<Self, Self::Error> {
        validate(tree)
    }
}

/// Checks every structural invariant of the tree and, when they all hold,
/// rejects conflicting logic rules.
pub fn validate(tree: CourseRequirementTree) -> Result<ValidTree, EligibilityError> {
    let mut violations = Vec::new();

    let mut index = BTreeMap::new();
    for (position, basket) in tree.baskets.iter().enumerate() {
        if index.insert(basket.id.clone(), position).is_some() {
            violations.push(InvariantViolation::DuplicateBasketId {
                basket: basket.id.clone(),
            });
        }
        check_basket(basket, &mut violations);
    }

    for (rule_index, rule) in tree.basket_logic_rules.iter().enumerate() {
        for basket in rule.participants() {
            if !index.contains_key(basket) {
                violations.push(InvariantViolation::UnknownBasket {
                    rule: rule_index,
                    basket: basket.clone(),
                });
            }
        }
        if rule.participants().len() < 2 {
            violations.push(InvariantViolation::RuleTooNarrow { rule: rule_index });
        }
    }

    let mut group_ids = BTreeSet::new();
    for (position, requirement) in tree.ol_requirements.iter().enumerate() {
        if let OlRequirement::OrGroup {
            group_id,
            subject_ids,
            required_count,
            ..
        } = requirement
        {
            if let Some(group) = group_id {
                if !group_ids.insert(group.clone()) {
                    violations.push(InvariantViolation::DuplicateOrGroupId {
                        requirement: position,
                        group: group.clone(),
                    });
                }
            }
            if subject_ids.is_empty() {
                violations.push(InvariantViolation::EmptyOrGroup {
                    requirement: position,
                });
            } else if *required_count == 0 || *required_count as usize > subject_ids.len() {
                violations.push(InvariantViolation::OrGroupCountOutOfRange {
                    requirement: position,
                    required_count: *required_count,
                    subject_count: subject_ids.len(),
                });
            }
        }
    }

    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "requirement tree rejected");
        return Err(EligibilityError::StructuralInvariantViolation(violations));
    }

    detect_conflicts(&tree.basket_logic_rules)?;

    Ok(ValidTree {
        tier: tree.min_qualification_tier,
        ol_requirements: tree.ol_requirements,
        baskets: tree.baskets,
        index,
        rules: tree.basket_logic_rules,
    })
}

fn check_basket(basket: &SubjectBasket, violations: &mut Vec<InvariantViolation>) {
    if basket.min_required > basket.max_allowed {
        violations.push(InvariantViolation::MinExceedsMax {
            basket: basket.id.clone(),
            min_required: basket.min_required,
            max_allowed: basket.max_allowed,
        });
    }

    if basket.max_allowed as usize > basket.subject_ids.len() {
        violations.push(InvariantViolation::MaxExceedsSubjects {
            basket: basket.id.clone(),
            max_allowed: basket.max_allowed,
            subject_count: basket.subject_ids.len(),
        });
    }

    let mut reported = BTreeSet::new();
    for constraint in &basket.subject_specific_grades {
        if !basket.subject_ids.contains(&constraint.subject_id)
            && reported.insert(constraint.subject_id)
        {
            violations.push(InvariantViolation::ConstraintOutsideBasket {
                basket: basket.id.clone(),
                subject: constraint.subject_id,
            });
        }
    }

    let total = basket.required_grade_total();
    if total > u64::from(basket.max_allowed) {
        violations.push(InvariantViolation::GradeCountsExceedMax {
            basket: basket.id.clone(),
            total,
            max_allowed: basket.max_allowed,
        });
    }
}

/// Two rules conflict when they relate at least two of the same baskets with
/// different logic. Which basket is primary does not matter: AND and OR treat
/// the primary like any target.
fn detect_conflicts(rules: &[BasketLogicRule]) -> Result<(), EligibilityError> {
    for (first_index, first) in rules.iter().enumerate() {
        let first_participants = first.participants();
        for (offset, second) in rules[first_index + 1..].iter().enumerate() {
            if first.logic == second.logic {
                continue;
            }
            let second_participants = second.participants();
            let mut shared = first_participants.intersection(&second_participants);
            if let (Some(basket), Some(_)) = (shared.next(), shared.next()) {
                return Err(EligibilityError::ConflictingRule {
                    basket: (*basket).clone(),
                    first_rule: first_index,
                    second_rule: first_index + 1 + offset,
                });
            }
        }
    }
    Ok(())
}
