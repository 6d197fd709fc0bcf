use metrics_exporter_prometheus::PrometheusHandle;
use saber_predictor::prediction::{FieldValue, FormState, ParameterCatalog};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("field name missing in '{raw}'"));
    }

    Ok((key.to_string(), value.trim().to_string()))
}

/// Checklist fields split their value on commas; everything else is a single choice.
pub(crate) fn form_from_pairs(pairs: Vec<(String, String)>, catalog: &ParameterCatalog) -> FormState {
    let mut form = FormState::new();

    for (key, value) in pairs {
        let field = if catalog.is_checklist(&key) {
            FieldValue::Checklist(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|option| !option.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            FieldValue::Choice(value)
        };
        form.set(key, Some(field));
    }

    form
}
