//! Probabilistic inference: persisted Bayesian networks, exact variable elimination,
//! and the per-area model registry that dispatches queries.

mod elimination;
mod factor;
pub mod network;
pub mod registry;

pub use network::{CpdDocument, DiscreteBayesNet, ModelLoadError, NetworkDocument, VariableDocument};
pub use registry::{DispatchError, ModelRegistry, ModelSlot, ModelStatusView, ResolvedModel};

use crate::prediction::evidence::Evidence;
use serde::Serialize;

/// Pre-trained model answering marginal queries over one of its variables.
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Ordered states of `target`, or `None` when the model lacks the variable.
    fn target_states(&self, target: &str) -> Option<Vec<String>>;

    fn query(&self, target: &str, evidence: &Evidence) -> Result<Distribution, InferenceError>;
}

/// Posterior over the target's states, in the model's state order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub states: Vec<String>,
    pub probabilities: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<IgnoredEvidence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    UnknownVariable,
    UnknownState,
}

impl IgnoredReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownVariable => "unknown_variable",
            Self::UnknownState => "unknown_state",
        }
    }
}

/// Evidence entry the model could not use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredEvidence {
    pub variable: String,
    pub value: String,
    pub reason: IgnoredReason,
}

impl IgnoredEvidence {
    pub(crate) fn unknown_variable(variable: &str, value: &str) -> Self {
        Self {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: IgnoredReason::UnknownVariable,
        }
    }

    pub(crate) fn unknown_state(variable: &str, value: &str) -> Self {
        Self {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: IgnoredReason::UnknownState,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model has no variable named '{0}'")]
    UnknownTarget(String),
    #[error("evidence has zero probability under the model (target '{target}')")]
    InconsistentEvidence { target: String },
}
