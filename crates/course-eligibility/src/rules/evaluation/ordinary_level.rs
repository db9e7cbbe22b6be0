use super::super::domain::{CandidateRecord, Level, OlRequirement};
use super::verdict::Reason;

/// Result of the O/L stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OlOutcome {
    pub satisfied: bool,
    /// One flag per requirement, in declaration order.
    pub requirements: Vec<bool>,
    pub reasons: Vec<Reason>,
}

/// Evaluates every O/L requirement independently; all must pass.
///
/// Count rules look at the whole O/L record and do not consume subjects, so
/// one result can count towards several thresholds at once.
pub fn evaluate_ordinary_level(
    requirements: &[OlRequirement],
    candidate: &CandidateRecord,
) -> OlOutcome {
    let mut flags = Vec::with_capacity(requirements.len());
    let mut reasons = Vec::new();

    for (position, requirement) in requirements.iter().enumerate() {
        let passed = match requirement {
            OlRequirement::SubjectGrade {
                subject_id,
                min_grade,
            } => match candidate.grade(Level::Ordinary, *subject_id) {
                None => {
                    reasons.push(Reason::OlSubjectMissing {
                        subject: *subject_id,
                    });
                    false
                }
                Some(recorded) if !recorded.meets(*min_grade) => {
                    reasons.push(Reason::OlSubjectGradeUnmet {
                        subject: *subject_id,
                        required: *min_grade,
                    });
                    false
                }
                Some(_) => true,
            },
            OlRequirement::CountRule {
                min_grade,
                required_count,
            } => {
                let actual = candidate
                    .at_level(Level::Ordinary)
                    .filter(|(_, grade)| grade.meets(*min_grade))
                    .count();
                let passed = actual >= *required_count as usize;
                if !passed {
                    reasons.push(Reason::OlCountUnmet {
                        min_grade: *min_grade,
                        required: *required_count,
                        actual,
                    });
                }
                passed
            }
            OlRequirement::OrGroup {
                group_id,
                subject_ids,
                min_grade,
                required_count,
            } => {
                let meeting = subject_ids
                    .iter()
                    .filter(|subject| {
                        candidate
                            .grade(Level::Ordinary, **subject)
                            .is_some_and(|grade| grade.meets(*min_grade))
                    })
                    .count();
                let passed = meeting >= *required_count as usize;
                if !passed {
                    reasons.push(Reason::OlGroupUnmet {
                        group: group_id
                            .clone()
                            .unwrap_or_else(|| position.to_string()),
                    });
                }
                passed
            }
        };
        flags.push(passed);
    }

    let satisfied = flags.iter().all(|passed| *passed);
    tracing::debug!(
        requirements = requirements.len(),
        satisfied,
        "O/L requirements evaluated"
    );

    OlOutcome {
        satisfied,
        requirements: flags,
        reasons,
    }
}
