use std::collections::{BTreeMap, BTreeSet};

use super::super::domain::{BasketId, BasketLogicRule, LogicOperator};
use super::verdict::{Reason, RuleOutcome};

/// Course-level result of combining basket verdicts through logic rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationOutcome {
    pub satisfied: bool,
    pub rules: Vec<RuleOutcome>,
    /// Baskets outside every rule that failed on their own.
    pub uncovered_failures: Vec<BasketId>,
    pub contributions: BTreeMap<BasketId, bool>,
    pub reasons: Vec<Reason>,
}

/// Combines standalone basket verdicts.
///
/// A basket covered by rules contributes the conjunction of those rules; a
/// basket outside every rule contributes its own verdict. The course passes
/// only when every contribution holds. Unknown ids count as unsatisfied.
pub fn combine(
    standalone: &BTreeMap<BasketId, bool>,
    rules: &[BasketLogicRule],
) -> CombinationOutcome {
    let is_satisfied = |id: &BasketId| standalone.get(id).copied().unwrap_or(false);

    let mut outcomes = Vec::with_capacity(rules.len());
    let mut reasons = Vec::new();
    let mut covered: BTreeMap<BasketId, bool> = BTreeMap::new();

    for (index, rule) in rules.iter().enumerate() {
        let primary = is_satisfied(&rule.primary_basket_id);
        let satisfied = match rule.logic {
            LogicOperator::And => primary && rule.target_basket_ids.iter().all(is_satisfied),
            LogicOperator::Or => primary || rule.target_basket_ids.iter().any(is_satisfied),
        };

        for basket in rule.participants() {
            let contribution = covered.entry(basket.clone()).or_insert(true);
            *contribution = *contribution && satisfied;
        }

        if !satisfied {
            reasons.push(Reason::RuleUnmet {
                rule: index,
                logic: rule.logic,
            });
        }
        outcomes.push(RuleOutcome {
            rule: index,
            logic: rule.logic,
            primary_basket_id: rule.primary_basket_id.clone(),
            satisfied,
        });
    }

    let covered_ids: BTreeSet<&BasketId> = covered.keys().collect();
    let uncovered_failures: Vec<BasketId> = standalone
        .iter()
        .filter(|(id, passed)| !covered_ids.contains(id) && !**passed)
        .map(|(id, _)| id.clone())
        .collect();

    let mut contributions = covered.clone();
    for (id, passed) in standalone {
        contributions.entry(id.clone()).or_insert(*passed);
    }

    let satisfied = uncovered_failures.is_empty() && outcomes.iter().all(|rule| rule.satisfied);
    tracing::debug!(
        rules = rules.len(),
        uncovered_failures = uncovered_failures.len(),
        satisfied,
        "basket logic combined"
    );

    CombinationOutcome {
        satisfied,
        rules: outcomes,
        uncovered_failures,
        contributions,
        reasons,
    }
}
