use saber_predictor::config::AssetsConfig;
use saber_predictor::inference::IgnoredReason;
use saber_predictor::prediction::{
    FieldValue, FormState, KnowledgeArea, PerformanceLevel, PredictionContext, PredictionRequest,
    PredictionStatus,
};
use std::path::PathBuf;

fn assets() -> AssetsConfig {
    let root = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets"));
    AssetsConfig {
        catalog_path: root.join("parameter_options.json"),
        model_dir: root.join("models"),
        score_bands_path: Some(root.join("score_bands.csv")),
    }
}

fn choice(value: &str) -> FieldValue {
    FieldValue::Choice(value.to_string())
}

fn advantaged_student() -> FormState {
    FormState::new()
        .with("stratum", choice("6"))
        .with("mother_education", choice("postgrado"))
        .with("school_type", choice("NO OFICIAL"))
        .with(
            "household_resources",
            FieldValue::Checklist(
                ["internet", "computer", "washing_machine", "car"]
                    .iter()
                    .map(|option| option.to_string())
                    .collect(),
            ),
        )
}

#[test]
fn advantaged_profile_predicts_top_mathematics_level() {
    let context = PredictionContext::load(&assets()).expect("context loads");

    let outcome = context.predict_for(Some(KnowledgeArea::Mathematics), &advantaged_student());

    assert_eq!(outcome.status, PredictionStatus::Predicted);
    assert_eq!(outcome.level, PerformanceLevel(4));
    assert_eq!(outcome.evidence.get("FAMI_RECURSOS"), Some("4"));
    assert_eq!(outcome.chart.filled_blocks, 4);
    assert!(outcome.interpretation.heading.starts_with("Nivel 4"));
    let confidence = outcome.confidence.expect("confidence reported");
    assert!((50.0..65.0).contains(&confidence), "confidence {confidence}");
    assert_eq!(outcome.progress.filled, 4);
    assert_eq!(outcome.progress.percent, 57);
}

#[test]
fn english_predictions_use_cefr_levels() {
    let context = PredictionContext::load(&assets()).expect("context loads");

    let outcome = context.predict(&PredictionRequest {
        area: Some("ingles".to_string()),
        fields: advantaged_student(),
    });

    assert_eq!(outcome.area, Some(KnowledgeArea::English));
    assert_eq!(outcome.level, PerformanceLevel(5));
    assert_eq!(outcome.distribution.len(), 5);
    assert_eq!(outcome.distribution[4].label, "B+");
    let total: f64 = outcome
        .distribution
        .iter()
        .map(|entry| entry.probability)
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn unknown_option_values_are_ignored_by_the_model() {
    let context = PredictionContext::load(&assets()).expect("context loads");
    let form = FormState::new()
        .with("stratum", choice("9"))
        .with("gender", choice("F"));

    let outcome = context.predict_for(Some(KnowledgeArea::CriticalReading), &form);

    assert_eq!(outcome.status, PredictionStatus::Predicted);
    assert_eq!(outcome.ignored_evidence.len(), 1);
    assert_eq!(outcome.ignored_evidence[0].variable, "FAMI_ESTRATOVIVIENDA");
    assert_eq!(outcome.ignored_evidence[0].reason, IgnoredReason::UnknownState);
    assert!(outcome.level.within(KnowledgeArea::CriticalReading));
}

#[test]
fn cleared_form_returns_to_the_neutral_state() {
    let context = PredictionContext::load(&assets()).expect("context loads");
    let mut form = advantaged_student();
    form.clear();

    let outcome = context.predict_for(Some(KnowledgeArea::Global), &form);

    assert_eq!(outcome.status, PredictionStatus::EmptyEvidence);
    assert_eq!(outcome.level, PerformanceLevel::NONE);
    assert!(outcome.interpretation.placeholder);
    assert_eq!(outcome.progress.percent, 0);
    assert!(outcome.progress.label.is_empty());
}

#[test]
fn missing_model_directory_disables_prediction_but_not_startup() {
    let mut assets = assets();
    assets.model_dir = PathBuf::from("/nonexistent/saber11/models");
    let context = PredictionContext::load(&assets).expect("context loads without models");

    let outcome = context.predict_for(Some(KnowledgeArea::Mathematics), &advantaged_student());

    assert_eq!(outcome.status, PredictionStatus::ModelUnavailable);
    assert_eq!(outcome.level, PerformanceLevel::NONE);
    assert_eq!(context.models().available_count(), 0);
}

#[test]
fn missing_catalog_is_fatal() {
    let mut assets = assets();
    assets.catalog_path = PathBuf::from("/nonexistent/parameter_options.json");

    let err = PredictionContext::load(&assets).expect_err("catalog is required");
    assert!(err.to_string().starts_with("parameter catalog error"));
}
