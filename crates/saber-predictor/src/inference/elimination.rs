use super::factor::Factor;
use super::network::DiscreteBayesNet;
use super::{Distribution, IgnoredEvidence, InferenceError, InferenceModel};
use crate::prediction::evidence::Evidence;
use tracing::{debug, trace};

/// Exact marginal of `target` given `evidence`.
///
/// Evidence naming a variable outside the network, or a state the variable does not
/// have, is skipped and reported through [`Distribution::ignored`].
pub(crate) fn query(
    network: &DiscreteBayesNet,
    target: &str,
    evidence: &Evidence,
) -> Result<Distribution, InferenceError> {
    let target_var = network
        .variable_index(target)
        .ok_or_else(|| InferenceError::UnknownTarget(target.to_string()))?;
    let states = network.states(target_var).to_vec();

    let (observed, ignored) = resolve_evidence(network, evidence);
    for entry in &ignored {
        debug!(
            model = network.name(),
            variable = %entry.variable,
            reason = entry.reason.as_str(),
            "evidence ignored"
        );
    }

    if let Some((_, state)) = observed.iter().find(|(var, _)| *var == target_var) {
        let mut probabilities = vec![0.0; states.len()];
        probabilities[*state] = 1.0;
        return Ok(Distribution {
            states,
            probabilities,
            ignored,
        });
    }

    let relevant = relevant_variables(network, target_var, &observed);
    let mut factors: Vec<Factor> = relevant
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(var, _)| network.factor(var))
        .collect();

    for (var, state) in &observed {
        for factor in factors.iter_mut() {
            if factor.contains(*var) {
                *factor = factor.reduce(*var, *state);
            }
        }
    }

    let mut pending: Vec<usize> = relevant
        .iter()
        .enumerate()
        .filter(|(var, keep)| {
            **keep && *var != target_var && !observed.iter().any(|(seen, _)| seen == var)
        })
        .map(|(var, _)| var)
        .collect();

    while !pending.is_empty() {
        let (slot, var) = cheapest_variable(&factors, &pending);
        pending.swap_remove(slot);
        trace!(variable = var, "eliminating");

        let (touching, rest): (Vec<Factor>, Vec<Factor>) =
            factors.into_iter().partition(|factor| factor.contains(var));
        factors = rest;

        if let Some(merged) = touching
            .into_iter()
            .reduce(|left, right| left.product(&right))
        {
            factors.push(merged.sum_out(var));
        }
    }

    let joint = factors
        .iter()
        .fold(Factor::unit(target_var, states.len()), |acc, factor| {
            acc.product(factor)
        });

    // Scope is exactly the target after elimination and reduction.
    let unnormalized = joint.values();
    let total: f64 = unnormalized.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(InferenceError::InconsistentEvidence {
            target: target.to_string(),
        });
    }

    Ok(Distribution {
        states,
        probabilities: unnormalized.into_iter().map(|value| value / total).collect(),
        ignored,
    })
}

fn resolve_evidence(
    network: &DiscreteBayesNet,
    evidence: &Evidence,
) -> (Vec<(usize, usize)>, Vec<IgnoredEvidence>) {
    let mut observed = Vec::new();
    let mut ignored = Vec::new();

    for (variable, value) in evidence.iter() {
        let Some(var) = network.variable_index(variable) else {
            ignored.push(IgnoredEvidence::unknown_variable(variable, value));
            continue;
        };
        match network.state_index(var, value) {
            Some(state) => observed.push((var, state)),
            None => ignored.push(IgnoredEvidence::unknown_state(variable, value)),
        }
    }

    (observed, ignored)
}

/// Target, observed variables, and their ancestors; everything else is barren.
fn relevant_variables(
    network: &DiscreteBayesNet,
    target: usize,
    observed: &[(usize, usize)],
) -> Vec<bool> {
    let mut keep = vec![false; network.variable_count()];
    let mut frontier: Vec<usize> = observed.iter().map(|(var, _)| *var).collect();
    frontier.push(target);

    while let Some(var) = frontier.pop() {
        if keep[var] {
            continue;
        }
        keep[var] = true;
        frontier.extend(network.parents(var).iter().copied().filter(|p| !keep[*p]));
    }

    keep
}

/// Greedy min-size heuristic: eliminate the variable whose merged factor is smallest.
/// Ties go to the earliest pending entry so the order is deterministic.
fn cheapest_variable(factors: &[Factor], pending: &[usize]) -> (usize, usize) {
    let mut best = (0, pending[0], usize::MAX);
    for (slot, var) in pending.iter().enumerate() {
        let size = Factor::joint_size(factors.iter().filter(|factor| factor.contains(*var)));
        if size < best.2 {
            best = (slot, *var, size);
        }
    }
    (best.0, best.1)
}
