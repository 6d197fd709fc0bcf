use super::catalog::ParameterCatalog;
use super::evidence::FormState;
use serde::Serialize;

const LABEL_THRESHOLD_PCT: u8 = 5;

/// Share of the declared form fields that currently hold an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormProgress {
    pub filled: usize,
    pub total: usize,
    pub percent: u8,
    /// Empty below 5 % so the bar does not render a clipped label.
    pub label: String,
}

impl FormProgress {
    pub fn measure(form: &FormState, catalog: &ParameterCatalog) -> Self {
        let total = catalog.field_count();
        let filled = catalog
            .field_keys()
            .filter(|field| form.is_answered(field))
            .count();

        let percent = if total == 0 {
            0
        } else {
            ((filled as f64 / total as f64) * 100.0).round() as u8
        };

        let label = if percent >= LABEL_THRESHOLD_PCT {
            format!("{percent} %")
        } else {
            String::new()
        };

        Self {
            filled,
            total,
            percent,
            label,
        }
    }
}
