use super::area::KnowledgeArea;
use super::bands::ScoreBands;
use super::catalog::ParameterCatalog;
use super::evidence::{build_evidence, Evidence, FormState};
use super::interpretation::{interpret, Interpretation};
use super::level::{select_level, LevelChart, PerformanceLevel};
use super::progress::FormProgress;
use crate::config::AssetsConfig;
use crate::error::AppError;
use crate::inference::{DispatchError, IgnoredEvidence, InferenceError, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Form state and selected area submitted by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub fields: FormState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Predicted,
    NoAreaSelected,
    EmptyEvidence,
    ModelUnavailable,
    InconsistentEvidence,
}

impl PredictionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Predicted => "Predicted",
            Self::NoAreaSelected => "No area selected",
            Self::EmptyEvidence => "No answers yet",
            Self::ModelUnavailable => "Model unavailable",
            Self::InconsistentEvidence => "Inconsistent answers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProbability {
    pub level: u8,
    pub label: String,
    pub state: String,
    pub probability: f64,
}

/// Everything the dashboard renders for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<KnowledgeArea>,
    pub status: PredictionStatus,
    pub level: PerformanceLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<LevelProbability>,
    /// Probability of the selected level as a percentage, two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub chart: LevelChart,
    pub interpretation: Interpretation,
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped_fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_evidence: Vec<IgnoredEvidence>,
    pub progress: FormProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Immutable catalog, models, and score bands shared by every prediction.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    catalog: Arc<ParameterCatalog>,
    models: Arc<ModelRegistry>,
    bands: Arc<ScoreBands>,
}

impl PredictionContext {
    pub fn new(catalog: ParameterCatalog, models: ModelRegistry, bands: ScoreBands) -> Self {
        Self {
            catalog: Arc::new(catalog),
            models: Arc::new(models),
            bands: Arc::new(bands),
        }
    }

    /// Loads the catalog and score bands (both fatal on error), then the models.
    /// Models that fail to load only disable their areas.
    pub fn load(assets: &AssetsConfig) -> Result<Self, AppError> {
        let catalog = ParameterCatalog::from_path(&assets.catalog_path)?;
        let bands = match &assets.score_bands_path {
            Some(path) => ScoreBands::from_path(path)?,
            None => ScoreBands::default(),
        };
        let models = ModelRegistry::load(&catalog, &assets.model_dir);

        info!(
            fields = catalog.field_count(),
            available_models = models.available_count(),
            "prediction context loaded"
        );

        Ok(Self::new(catalog, models, bands))
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn bands(&self) -> &ScoreBands {
        &self.bands
    }

    /// Unrecognized area strings are treated as no selection.
    pub fn predict(&self, request: &PredictionRequest) -> PredictionOutcome {
        let area = request.area.as_deref().and_then(KnowledgeArea::from_slug);
        self.predict_for(area, &request.fields)
    }

    pub fn predict_for(&self, area: Option<KnowledgeArea>, form: &FormState) -> PredictionOutcome {
        let build = build_evidence(form, &self.catalog);
        let progress = FormProgress::measure(form, &self.catalog);
        let neutral = NeutralOutcome {
            area,
            evidence: build.evidence.clone(),
            unmapped: build.unmapped.clone(),
            progress: progress.clone(),
        };

        if area.is_none() {
            debug!("prediction skipped: no area selected");
            return neutral.finish(PredictionStatus::NoAreaSelected, &self.bands, None);
        }
        if build.evidence.is_empty() {
            debug!("prediction skipped: no answered fields");
            return neutral.finish(PredictionStatus::EmptyEvidence, &self.bands, None);
        }

        let resolved = match self.models.dispatch(area) {
            Ok(resolved) => resolved,
            Err(DispatchError::NoAreaSelected) => {
                return neutral.finish(PredictionStatus::NoAreaSelected, &self.bands, None)
            }
            Err(err @ DispatchError::ModelUnavailable { .. }) => {
                debug!(error = %err, "prediction skipped");
                return neutral.finish(
                    PredictionStatus::ModelUnavailable,
                    &self.bands,
                    Some(err.to_string()),
                );
            }
        };

        let distribution = match resolved.model.query(&resolved.target, &build.evidence) {
            Ok(distribution) => distribution,
            Err(err @ InferenceError::InconsistentEvidence { .. }) => {
                warn!(area = resolved.area.slug(), error = %err, "inference rejected evidence");
                return neutral.finish(
                    PredictionStatus::InconsistentEvidence,
                    &self.bands,
                    Some(err.to_string()),
                );
            }
            Err(err) => {
                warn!(area = resolved.area.slug(), error = %err, "inference failed");
                return neutral.finish(
                    PredictionStatus::ModelUnavailable,
                    &self.bands,
                    Some(err.to_string()),
                );
            }
        };

        let level = select_level(&distribution.probabilities);
        let area = resolved.area;
        let confidence = usize::from(level.get())
            .checked_sub(1)
            .and_then(|index| distribution.probabilities.get(index))
            .map(|probability| (probability * 10_000.0).round() / 100.0);
        let labels = area.level_labels();
        let levels = distribution
            .states
            .iter()
            .zip(&distribution.probabilities)
            .enumerate()
            .map(|(index, (state, probability))| LevelProbability {
                level: u8::try_from(index + 1).unwrap_or(u8::MAX),
                label: labels.get(index).cloned().unwrap_or_else(|| state.clone()),
                state: state.clone(),
                probability: *probability,
            })
            .collect();

        debug!(area = area.slug(), %level, evidence = build.evidence.len(), "prediction ready");

        PredictionOutcome {
            area: Some(area),
            status: PredictionStatus::Predicted,
            level,
            distribution: levels,
            confidence,
            chart: LevelChart::for_level(Some(area), level),
            interpretation: interpret(Some(area), level, &self.bands),
            evidence: build.evidence,
            unmapped_fields: build.unmapped,
            ignored_evidence: distribution.ignored,
            progress,
            detail: None,
        }
    }
}

struct NeutralOutcome {
    area: Option<KnowledgeArea>,
    evidence: Evidence,
    unmapped: Vec<String>,
    progress: FormProgress,
}

impl NeutralOutcome {
    fn finish(
        self,
        status: PredictionStatus,
        bands: &ScoreBands,
        detail: Option<String>,
    ) -> PredictionOutcome {
        PredictionOutcome {
            area: self.area,
            status,
            level: PerformanceLevel::NONE,
            distribution: Vec::new(),
            confidence: None,
            chart: LevelChart::empty(self.area),
            interpretation: interpret(self.area, PerformanceLevel::NONE, bands),
            evidence: self.evidence,
            unmapped_fields: self.unmapped,
            ignored_evidence: Vec::new(),
            progress: self.progress,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{Distribution, InferenceModel};
    use crate::prediction::catalog::fixtures::catalog;
    use crate::prediction::evidence::FieldValue;
    use crate::prediction::interpretation::{SELECT_AREA_PLACEHOLDER, SELECT_LEVEL_PLACEHOLDER};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedModel {
        probabilities: Vec<f64>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(probabilities: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                probabilities,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InferenceModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn target_states(&self, _: &str) -> Option<Vec<String>> {
            Some(
                (1..=self.probabilities.len())
                    .map(|n| n.to_string())
                    .collect(),
            )
        }

        fn query(&self, _: &str, _: &Evidence) -> Result<Distribution, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Distribution {
                states: (1..=self.probabilities.len())
                    .map(|n| n.to_string())
                    .collect(),
                probabilities: self.probabilities.clone(),
                ignored: Vec::new(),
            })
        }
    }

    fn context_with(model: Arc<ScriptedModel>) -> PredictionContext {
        let mut models: HashMap<String, Arc<dyn InferenceModel>> = HashMap::new();
        models.insert("saber11".to_string(), model);
        let catalog = catalog();
        let registry = ModelRegistry::from_models(&catalog, models);
        PredictionContext::new(catalog, registry, ScoreBands::default())
    }

    fn answered_form() -> FormState {
        FormState::new()
            .with("gender", FieldValue::Choice("F".to_string()))
            .with("stratum", FieldValue::Choice("3".to_string()))
    }

    #[test]
    fn predicts_level_and_interpretation() {
        let model = ScriptedModel::new(vec![0.1, 0.2, 0.5, 0.2]);
        let context = context_with(model.clone());

        let outcome = context.predict(&PredictionRequest {
            area: Some("mathematics".to_string()),
            fields: answered_form(),
        });

        assert_eq!(outcome.status, PredictionStatus::Predicted);
        assert_eq!(outcome.level, PerformanceLevel(3));
        assert_eq!(outcome.confidence, Some(50.0));
        assert_eq!(outcome.chart.filled_blocks, 3);
        assert_eq!(outcome.distribution.len(), 4);
        assert!(outcome.interpretation.text.contains("proporcionalidad"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_area_short_circuits_without_inference() {
        let model = ScriptedModel::new(vec![0.1, 0.2, 0.5, 0.2]);
        let context = context_with(model.clone());

        for area in [None, Some("astronomy".to_string())] {
            let outcome = context.predict(&PredictionRequest {
                area,
                fields: answered_form(),
            });
            assert_eq!(outcome.status, PredictionStatus::NoAreaSelected);
            assert_eq!(outcome.level, PerformanceLevel::NONE);
            assert_eq!(outcome.interpretation.text, SELECT_AREA_PLACEHOLDER);
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_evidence_short_circuits_without_inference() {
        let model = ScriptedModel::new(vec![0.1, 0.2, 0.5, 0.2]);
        let context = context_with(model.clone());

        let outcome = context.predict_for(Some(KnowledgeArea::Mathematics), &FormState::new());

        assert_eq!(outcome.status, PredictionStatus::EmptyEvidence);
        assert_eq!(outcome.level, PerformanceLevel::NONE);
        assert_eq!(outcome.chart.filled_blocks, 0);
        assert_eq!(outcome.interpretation.text, SELECT_LEVEL_PLACEHOLDER);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unavailable_model_returns_neutral_outcome() {
        // Four states cannot serve the five English levels, so English is unavailable.
        let model = ScriptedModel::new(vec![0.1, 0.2, 0.5, 0.2]);
        let context = context_with(model.clone());

        let outcome = context.predict_for(Some(KnowledgeArea::English), &answered_form());

        assert_eq!(outcome.status, PredictionStatus::ModelUnavailable);
        assert_eq!(outcome.level, PerformanceLevel::NONE);
        assert_eq!(outcome.chart.total_blocks, 5);
        assert!(outcome.detail.is_some());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unmapped_fields_are_reported_but_do_not_block_prediction() {
        let model = ScriptedModel::new(vec![0.4, 0.3, 0.2, 0.1]);
        let context = context_with(model);

        let form = answered_form().with("school_shift", FieldValue::Choice("TARDE".to_string()));
        let outcome = context.predict_for(Some(KnowledgeArea::NaturalSciences), &form);

        assert_eq!(outcome.level, PerformanceLevel(1));
        assert_eq!(outcome.unmapped_fields, vec!["school_shift".to_string()]);
        assert_eq!(
            outcome.evidence.get("Unknown parameter: school_shift"),
            Some("TARDE")
        );
        assert_eq!(outcome.progress.filled, 3);
    }
}
