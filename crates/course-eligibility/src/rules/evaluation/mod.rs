mod basket;
mod combinator;
mod ordinary_level;
mod verdict;

pub use basket::{evaluate_basket, BasketOutcome};
pub use combinator::{combine, CombinationOutcome};
pub use ordinary_level::{evaluate_ordinary_level, OlOutcome};
pub use verdict::{
    BasketTrace, BucketAssignment, EligibilityVerdict, EvaluationTrace, EvidenceStage, Reason,
    RuleOutcome, Stage, StageRecord, StageStatus,
};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{CandidateRecord, CourseRequirementTree, QualificationTier};
use super::validation::{validate, EligibilityError, ValidTree};

/// Knobs for the evaluation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Keep per-basket grade bucket assignments in the trace.
    pub include_assignments: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_assignments: true,
        }
    }
}

/// Stateless evaluator running the fixed stage pipeline
/// `QualificationTierCheck -> OlRequirementCheck -> BasketEvaluation ->
/// LogicCombination -> VerdictAssembly`.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: EngineConfig,
}

impl EligibilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Evaluates a course's requirements against a candidate.
    ///
    /// A `noNeed` course is eligible before the tree is even validated;
    /// otherwise a malformed tree is an error, never an ineligible verdict.
    pub fn evaluate(
        &self,
        tree: &CourseRequirementTree,
        candidate: &CandidateRecord,
    ) -> Result<EligibilityVerdict, EligibilityError> {
        if tree.min_qualification_tier == QualificationTier::NoNeed {
            return Ok(open_entry_verdict());
        }
        let valid = validate(tree.clone())?;
        Ok(self.evaluate_valid(&valid, candidate))
    }

    /// Evaluates an already validated tree. Every applicable stage runs in
    /// full so the reasons list is exhaustive.
    pub fn evaluate_valid(
        &self,
        tree: &ValidTree,
        candidate: &CandidateRecord,
    ) -> EligibilityVerdict {
        let tier = tree.tier();
        if tier == QualificationTier::NoNeed {
            return open_entry_verdict();
        }

        let mut stages = vec![StageRecord::new(
            Stage::QualificationTierCheck,
            StageStatus::Passed,
        )];
        let mut reasons: Vec<Reason> = candidate
            .unrecognized()
            .filter(|(level, _, _)| tier.examines(*level))
            .map(|(level, subject, raw)| {
                tracing::debug!(%level, %subject, raw, "grade outside the scale, ranking as F");
                Reason::UnrecognizedGrade { level, subject }
            })
            .collect();

        let ol_satisfied = if tier.requires_ordinary_level() {
            let outcome = evaluate_ordinary_level(tree.ol_requirements(), candidate);
            stages.push(StageRecord::outcome(
                Stage::OlRequirementCheck,
                outcome.satisfied,
            ));
            reasons.extend(outcome.reasons);
            outcome.satisfied
        } else {
            stages.push(StageRecord::new(
                Stage::OlRequirementCheck,
                StageStatus::NotApplicable,
            ));
            reasons.push(Reason::StageNotApplicable(EvidenceStage::OrdinaryLevel));
            true
        };

        let mut satisfied_baskets = BTreeSet::new();
        let mut failed_baskets = BTreeSet::new();
        let mut basket_traces = Vec::new();
        let mut rule_outcomes = Vec::new();
        let mut contributions = BTreeMap::new();

        let baskets_satisfied = if tier.requires_advanced_level() {
            let mut standalone = BTreeMap::new();
            for basket in tree.baskets() {
                let outcome = evaluate_basket(basket, candidate);
                if outcome.satisfied {
                    satisfied_baskets.insert(outcome.basket_id.clone());
                } else {
                    failed_baskets.insert(outcome.basket_id.clone());
                }
                standalone.insert(outcome.basket_id.clone(), outcome.satisfied);
                basket_traces.push(outcome.trace(self.config.include_assignments));
                reasons.extend(outcome.reasons);
            }
            stages.push(StageRecord::outcome(
                Stage::BasketEvaluation,
                failed_baskets.is_empty(),
            ));

            let combination = combine(&standalone, tree.rules());
            stages.push(StageRecord::outcome(
                Stage::LogicCombination,
                combination.satisfied,
            ));
            reasons.extend(combination.reasons);
            rule_outcomes = combination.rules;
            contributions = combination.contributions;
            combination.satisfied
        } else {
            stages.push(StageRecord::new(
                Stage::BasketEvaluation,
                StageStatus::NotApplicable,
            ));
            stages.push(StageRecord::new(
                Stage::LogicCombination,
                StageStatus::NotApplicable,
            ));
            reasons.push(Reason::StageNotApplicable(EvidenceStage::AdvancedLevel));
            true
        };

        let eligible = ol_satisfied && baskets_satisfied;
        stages.push(StageRecord::outcome(Stage::VerdictAssembly, eligible));
        tracing::debug!(?tier, eligible, reasons = reasons.len(), "eligibility evaluated");

        EligibilityVerdict {
            eligible,
            satisfied_baskets,
            failed_baskets,
            ol_satisfied,
            reasons,
            trace: EvaluationTrace {
                stages,
                baskets: basket_traces,
                rules: rule_outcomes,
                contributions,
            },
        }
    }
}

/// Evaluates with the default engine configuration.
pub fn evaluate(
    tree: &CourseRequirementTree,
    candidate: &CandidateRecord,
) -> Result<EligibilityVerdict, EligibilityError> {
    EligibilityEngine::default().evaluate(tree, candidate)
}

fn open_entry_verdict() -> EligibilityVerdict {
    let mut stages = vec![StageRecord::new(
        Stage::QualificationTierCheck,
        StageStatus::Passed,
    )];
    stages.extend(
        [
            Stage::OlRequirementCheck,
            Stage::BasketEvaluation,
            Stage::LogicCombination,
        ]
        .into_iter()
        .map(|stage| StageRecord::new(stage, StageStatus::Skipped)),
    );
    stages.push(StageRecord::new(Stage::VerdictAssembly, StageStatus::Passed));

    EligibilityVerdict {
        eligible: true,
        satisfied_baskets: BTreeSet::new(),
        failed_baskets: BTreeSet::new(),
        ol_satisfied: true,
        reasons: vec![Reason::TierNoNeed],
        trace: EvaluationTrace {
            stages,
            ..EvaluationTrace::default()
        },
    }
}
