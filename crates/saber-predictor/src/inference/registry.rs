use super::network::DiscreteBayesNet;
use super::InferenceModel;
use crate::prediction::area::KnowledgeArea;
use crate::prediction::catalog::ParameterCatalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Load outcome for one area's model, fixed for the life of the process.
#[derive(Clone)]
pub enum ModelSlot {
    Loaded {
        model: Arc<dyn InferenceModel>,
        model_id: String,
        target: String,
        loaded_at: DateTime<Utc>,
    },
    Unavailable {
        model_id: String,
        target: String,
        reason: String,
    },
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSlot::Loaded {
                model_id, target, ..
            } => f
                .debug_struct("Loaded")
                .field("model_id", model_id)
                .field("target", target)
                .finish(),
            ModelSlot::Unavailable {
                model_id,
                target,
                reason,
            } => f
                .debug_struct("Unavailable")
                .field("model_id", model_id)
                .field("target", target)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Model and target variable selected for a knowledge area.
#[derive(Clone)]
pub struct ResolvedModel {
    pub area: KnowledgeArea,
    pub model: Arc<dyn InferenceModel>,
    pub target: String,
}

impl fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModel")
            .field("area", &self.area)
            .field("model", &self.model.name())
            .field("target", &self.target)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no knowledge area selected")]
    NoAreaSelected,
    #[error("model for area '{area}' is unavailable: {reason}")]
    ModelUnavailable { area: KnowledgeArea, reason: String },
}

/// Per-area status exposed to operators.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatusView {
    pub area: KnowledgeArea,
    pub area_label: &'static str,
    pub available: bool,
    pub model: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Read-only set of inference models keyed by knowledge area.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    slots: BTreeMap<KnowledgeArea, ModelSlot>,
}

impl ModelRegistry {
    /// Loads `<model_dir>/<model>.json` once per distinct model named in the catalog.
    /// Failures leave the affected areas unavailable instead of aborting startup.
    pub fn load<P: AsRef<Path>>(catalog: &ParameterCatalog, model_dir: P) -> Self {
        let model_dir = model_dir.as_ref();
        let mut loaded: HashMap<String, Result<Arc<dyn InferenceModel>, String>> = HashMap::new();

        for (_, binding) in catalog.bindings() {
            if loaded.contains_key(&binding.model) {
                continue;
            }

            let outcome = load_model_file(model_dir, &binding.model);
            if let Ok(model) = &outcome {
                info!(model = %binding.model, name = model.name(), "inference model loaded");
            }
            loaded.insert(binding.model.clone(), outcome);
        }

        Self::assemble(catalog, |model_id| match loaded.get(model_id) {
            Some(Ok(model)) => Ok(model.clone()),
            Some(Err(reason)) => Err(reason.clone()),
            None => Err(format!("model '{model_id}' was not loaded")),
        })
    }

    /// Builds a registry from already constructed models keyed by model identifier.
    pub fn from_models(
        catalog: &ParameterCatalog,
        models: HashMap<String, Arc<dyn InferenceModel>>,
    ) -> Self {
        Self::assemble(catalog, |model_id| {
            models
                .get(model_id)
                .cloned()
                .ok_or_else(|| format!("model '{model_id}' was not provided"))
        })
    }

    fn assemble<F>(catalog: &ParameterCatalog, mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Result<Arc<dyn InferenceModel>, String>,
    {
        let loaded_at = Utc::now();
        let mut slots = BTreeMap::new();

        for (area, binding) in catalog.bindings() {
            let slot = match lookup(&binding.model)
                .and_then(|model| check_target(area, &binding.target, model))
            {
                Ok(model) => ModelSlot::Loaded {
                    model,
                    model_id: binding.model.clone(),
                    target: binding.target.clone(),
                    loaded_at,
                },
                Err(reason) => {
                    warn!(
                        area = area.slug(),
                        model = %binding.model,
                        %reason,
                        "model unavailable; predictions for this area are disabled"
                    );
                    ModelSlot::Unavailable {
                        model_id: binding.model.clone(),
                        target: binding.target.clone(),
                        reason,
                    }
                }
            };
            slots.insert(area, slot);
        }

        Self { slots }
    }

    /// Resolves the model and target variable for the selected area.
    pub fn dispatch(&self, area: Option<KnowledgeArea>) -> Result<ResolvedModel, DispatchError> {
        let area = area.ok_or(DispatchError::NoAreaSelected)?;

        match self.slots.get(&area) {
            Some(ModelSlot::Loaded { model, target, .. }) => Ok(ResolvedModel {
                area,
                model: model.clone(),
                target: target.clone(),
            }),
            Some(ModelSlot::Unavailable { reason, .. }) => Err(DispatchError::ModelUnavailable {
                area,
                reason: reason.clone(),
            }),
            None => Err(DispatchError::ModelUnavailable {
                area,
                reason: "area has no model binding".to_string(),
            }),
        }
    }

    pub fn slot(&self, area: KnowledgeArea) -> Option<&ModelSlot> {
        self.slots.get(&area)
    }

    pub fn available_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, ModelSlot::Loaded { .. }))
            .count()
    }

    pub fn status(&self) -> Vec<ModelStatusView> {
        self.slots
            .iter()
            .map(|(area, slot)| match slot {
                ModelSlot::Loaded {
                    model_id,
                    target,
                    loaded_at,
                    ..
                } => ModelStatusView {
                    area: *area,
                    area_label: area.label(),
                    available: true,
                    model: model_id.clone(),
                    target: target.clone(),
                    loaded_at: Some(*loaded_at),
                    reason: None,
                },
                ModelSlot::Unavailable {
                    model_id,
                    target,
                    reason,
                } => ModelStatusView {
                    area: *area,
                    area_label: area.label(),
                    available: false,
                    model: model_id.clone(),
                    target: target.clone(),
                    loaded_at: None,
                    reason: Some(reason.clone()),
                },
            })
            .collect()
    }
}

fn load_model_file(model_dir: &Path, model_id: &str) -> Result<Arc<dyn InferenceModel>, String> {
    if model_id.contains(['/', '\\']) || model_id.contains("..") {
        return Err(format!("model identifier '{model_id}' is not a plain file name"));
    }

    let path = model_dir.join(format!("{model_id}.json"));
    DiscreteBayesNet::from_path(&path)
        .map(|network| Arc::new(network) as Arc<dyn InferenceModel>)
        .map_err(|err| format!("{}: {err}", path.display()))
}

fn check_target(
    area: KnowledgeArea,
    target: &str,
    model: Arc<dyn InferenceModel>,
) -> Result<Arc<dyn InferenceModel>, String> {
    let states = model
        .target_states(target)
        .ok_or_else(|| format!("model '{}' has no target variable '{target}'", model.name()))?;

    let expected = usize::from(area.max_level());
    if states.len() != expected {
        return Err(format!(
            "target '{target}' has {} states but area '{area}' reports {expected} levels",
            states.len()
        ));
    }

    Ok(model)
}
