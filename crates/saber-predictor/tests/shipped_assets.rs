use saber_predictor::inference::{DiscreteBayesNet, InferenceModel, ModelRegistry};
use saber_predictor::prediction::{Evidence, KnowledgeArea, ParameterCatalog, ScoreBands};

const CATALOG_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../assets/parameter_options.json"
);
const MODEL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/models");
const BANDS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/score_bands.csv");

#[test]
fn shipped_catalog_maps_every_declared_field() {
    let catalog = ParameterCatalog::from_path(CATALOG_PATH).expect("catalog loads");

    assert_eq!(catalog.field_count(), 7);
    for field in catalog.field_keys() {
        assert!(
            catalog.variable_for(field).is_some(),
            "field '{field}' should map to a model variable"
        );
    }
    assert!(catalog.is_checklist("household_resources"));
    assert_eq!(
        catalog
            .binding(KnowledgeArea::CriticalReading)
            .map(|binding| binding.target.as_str()),
        Some("DESEMP_LECTURA_CRITICA")
    );
}

#[test]
fn shipped_score_bands_match_embedded_defaults() {
    let bands = ScoreBands::from_path(BANDS_PATH).expect("score bands load");
    assert_eq!(bands, ScoreBands::default());
}

#[test]
fn shipped_model_serves_every_area() {
    let catalog = ParameterCatalog::from_path(CATALOG_PATH).expect("catalog loads");
    let registry = ModelRegistry::load(&catalog, MODEL_DIR);

    assert_eq!(registry.available_count(), KnowledgeArea::ALL.len());
    for view in registry.status() {
        assert!(view.available, "{:?} unavailable: {:?}", view.area, view.reason);
        assert!(view.loaded_at.is_some());
    }
}

#[test]
fn shipped_model_priors_are_normalised() {
    let network = DiscreteBayesNet::from_path(format!("{MODEL_DIR}/saber11.json"))
        .expect("model loads");

    for target in [
        "DESEMP_MATEMATICAS",
        "DESEMP_C_NATURALES",
        "DESEMP_SOCIALES_CIUDADANAS",
        "DESEMP_LECTURA_CRITICA",
        "DESEMP_INGLES",
        "DESEMP_GLOBAL",
    ] {
        let distribution = network
            .query(target, &Evidence::new())
            .expect("prior query succeeds");
        let total: f64 = distribution.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "{target} sums to {total}");
        assert!(distribution.ignored.is_empty());
    }
}

#[test]
fn socioeconomic_evidence_shifts_the_global_posterior() {
    let network = DiscreteBayesNet::from_path(format!("{MODEL_DIR}/saber11.json"))
        .expect("model loads");

    let advantaged = Evidence::new()
        .with("FAMI_ESTRATOVIVIENDA", "6")
        .with("FAMI_RECURSOS", "4")
        .with("COLE_NATURALEZA", "NO OFICIAL")
        .with("FAMI_EDUCACIONMADRE", "postgrado");
    let disadvantaged = Evidence::new()
        .with("FAMI_ESTRATOVIVIENDA", "1")
        .with("FAMI_RECURSOS", "0")
        .with("COLE_AREA_UBICACION", "RURAL")
        .with("FAMI_EDUCACIONMADRE", "primaria");

    let high = network
        .query("DESEMP_GLOBAL", &advantaged)
        .expect("query succeeds");
    let low = network
        .query("DESEMP_GLOBAL", &disadvantaged)
        .expect("query succeeds");

    assert!(high.probabilities[4] > 0.5, "{:?}", high.probabilities);
    assert!(low.probabilities[0] > 0.5, "{:?}", low.probabilities);
    assert!(high.probabilities[4] > low.probabilities[4]);
}
