use std::cmp::Reverse;

use super::super::domain::{
    BasketId, CandidateRecord, GradeRequirement, Level, LogicOperator, SubjectBasket, SubjectId,
};
use super::super::grade::{at_least, Grade};
use super::verdict::{BasketTrace, BucketAssignment, Reason};

/// Verdict for one basket plus the subjects it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketOutcome {
    pub basket_id: BasketId,
    pub satisfied: bool,
    pub optional: bool,
    pub selected: Vec<SubjectId>,
    pub assignments: Vec<BucketAssignment>,
    /// Empty when the basket is satisfied.
    pub reasons: Vec<Reason>,
}

impl BasketOutcome {
    fn passed(
        basket: &SubjectBasket,
        selected: Vec<SubjectId>,
        assignments: Vec<BucketAssignment>,
    ) -> Self {
        Self {
            basket_id: basket.id.clone(),
            satisfied: true,
            optional: basket.is_optional(),
            selected,
            assignments,
            reasons: Vec::new(),
        }
    }

    fn failed(basket: &SubjectBasket, selected: Vec<SubjectId>, reasons: Vec<Reason>) -> Self {
        Self {
            basket_id: basket.id.clone(),
            satisfied: false,
            optional: basket.is_optional(),
            selected,
            assignments: Vec::new(),
            reasons,
        }
    }

    pub(crate) fn trace(&self, include_assignments: bool) -> BasketTrace {
        BasketTrace {
            basket_id: self.basket_id.clone(),
            satisfied: self.satisfied,
            optional: self.optional,
            selected_subjects: self.selected.clone(),
            assignments: if include_assignments {
                self.assignments.clone()
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolEntry {
    subject: SubjectId,
    grade: Grade,
}

/// First grade bucket that could not be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BucketShortfall {
    pub grade: Grade,
    pub required: u32,
    pub filled: u32,
}

/// Evaluates one basket against the candidate's A/L results.
pub fn evaluate_basket(basket: &SubjectBasket, candidate: &CandidateRecord) -> BasketOutcome {
    if basket.subject_ids.is_empty() {
        return BasketOutcome::failed(
            basket,
            Vec::new(),
            vec![Reason::BasketEmpty {
                basket: basket.id.clone(),
            }],
        );
    }

    if basket.is_optional() {
        return BasketOutcome::passed(basket, Vec::new(), Vec::new());
    }

    let mut pool = Vec::new();
    let mut missing = Vec::new();
    let mut below_constraint = Vec::new();

    for subject in &basket.subject_ids {
        let Some(recorded) = candidate.grade(Level::Advanced, *subject) else {
            missing.push(*subject);
            continue;
        };
        let grade = recorded.effective();
        let meets_constraints = basket
            .subject_specific_grades
            .iter()
            .filter(|constraint| constraint.subject_id == *subject)
            .all(|constraint| at_least(grade, constraint.min_grade));
        if meets_constraints {
            pool.push(PoolEntry {
                subject: *subject,
                grade,
            });
        } else {
            below_constraint.push(*subject);
        }
    }

    // Best grades first; subject id breaks ties so selection is reproducible.
    pool.sort_by_key(|entry| (Reverse(entry.grade), entry.subject));

    let mut reasons: Vec<Reason> = below_constraint
        .iter()
        .map(|subject| Reason::BasketSubjectGradeUnmet {
            basket: basket.id.clone(),
            subject: *subject,
        })
        .collect();

    let selection_ok = match basket.internal_logic {
        LogicOperator::And => {
            reasons.extend(missing.iter().map(|subject| Reason::BasketSubjectMissing {
                basket: basket.id.clone(),
                subject: *subject,
            }));
            missing.is_empty() && below_constraint.is_empty()
        }
        LogicOperator::Or => {
            pool.truncate(basket.max_allowed as usize);
            let enough = pool.len() >= basket.min_required as usize;
            if !enough {
                reasons.push(Reason::BasketMinSubjectsUnmet {
                    basket: basket.id.clone(),
                });
            }
            enough
        }
    };

    let selected: Vec<SubjectId> = pool.iter().map(|entry| entry.subject).collect();
    let assignment = assign_buckets(&pool, &basket.grade_requirements);

    match (selection_ok, assignment) {
        (true, Ok(assignments)) => {
            tracing::debug!(basket = %basket.id, selected = selected.len(), "basket satisfied");
            BasketOutcome::passed(basket, selected, assignments)
        }
        (_, assignment) => {
            if let Err(shortfall) = assignment {
                tracing::debug!(
                    basket = %basket.id,
                    grade = %shortfall.grade,
                    required = shortfall.required,
                    filled = shortfall.filled,
                    "grade bucket unfilled"
                );
                reasons.push(Reason::BasketGradeCountUnmet {
                    basket: basket.id.clone(),
                });
            }
            BasketOutcome::failed(basket, selected, reasons)
        }
    }
}

/// Greedy bucket filling: buckets from the highest grade down, each taking
/// the best remaining subjects that reach its grade. A subject fills at most
/// one bucket. Because any subject reaching a higher bucket also reaches every
/// lower one, this finds an assignment whenever one exists.
fn assign_buckets(
    pool: &[PoolEntry],
    requirements: &[GradeRequirement],
) -> Result<Vec<BucketAssignment>, BucketShortfall> {
    let mut buckets: Vec<&GradeRequirement> = requirements
        .iter()
        .filter(|requirement| requirement.count > 0)
        .collect();
    buckets.sort_by_key(|requirement| Reverse(requirement.grade));

    let mut used = vec![false; pool.len()];
    let mut assignments = Vec::new();

    for bucket in buckets {
        let mut filled = 0;
        for (position, entry) in pool.iter().enumerate() {
            if filled == bucket.count {
                break;
            }
            if !used[position] && at_least(entry.grade, bucket.grade) {
                used[position] = true;
                filled += 1;
                assignments.push(BucketAssignment {
                    subject_id: entry.subject,
                    grade: entry.grade,
                    bucket: bucket.grade,
                });
            }
        }
        if filled < bucket.count {
            return Err(BucketShortfall {
                grade: bucket.grade,
                required: bucket.count,
                filled,
            });
        }
    }

    Ok(assignments)
}
