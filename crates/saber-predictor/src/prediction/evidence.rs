use super::catalog::ParameterCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const UNKNOWN_PARAMETER_PREFIX: &str = "Unknown parameter: ";

/// Raw answer for one form field as submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Choice(String),
    Integer(i64),
    Checklist(Vec<String>),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Choice(value) => value.trim().is_empty(),
            FieldValue::Integer(_) => false,
            FieldValue::Checklist(values) => values.iter().all(|value| value.trim().is_empty()),
        }
    }
}

/// Current state of the form: every field key with its answer, `None` when unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Option<FieldValue>) {
        self.fields.insert(field.into(), value);
    }

    /// Answered fields only; blank strings and empty selections count as unanswered.
    pub fn answered(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().filter_map(|(field, value)| match value {
            Some(value) if !value.is_blank() => Some((field.as_str(), value)),
            _ => None,
        })
    }

    pub fn is_answered(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Some(value)) if !value.is_blank())
    }

    /// Resets every answer while keeping the declared keys.
    pub fn clear(&mut self) {
        for value in self.fields.values_mut() {
            *value = None;
        }
    }
}

/// Observed model variables keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence {
    values: BTreeMap<String, String>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.values.insert(variable.into(), value.into());
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(variable, value)| (variable.as_str(), value.as_str()))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Evidence plus the fields that had no catalog mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceBuild {
    pub evidence: Evidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped: Vec<String>,
}

pub fn unknown_parameter_key(field: &str) -> String {
    format!("{UNKNOWN_PARAMETER_PREFIX}{field}")
}

pub fn is_unknown_parameter_key(variable: &str) -> bool {
    variable.starts_with(UNKNOWN_PARAMETER_PREFIX)
}

/// Translates answered form fields into model evidence.
pub fn build_evidence(form: &FormState, catalog: &ParameterCatalog) -> EvidenceBuild {
    let mut build = EvidenceBuild::default();

    for (field, value) in form.answered() {
        let Some(value) = evidence_value(field, value, catalog) else {
            continue;
        };

        let variable = match catalog.variable_for(field) {
            Some(variable) => variable.to_string(),
            None => {
                debug!(field, "form field has no catalog mapping");
                build.unmapped.push(field.to_string());
                unknown_parameter_key(field)
            }
        };

        build.evidence.insert(variable, value);
    }

    build
}

fn evidence_value(field: &str, value: &FieldValue, catalog: &ParameterCatalog) -> Option<String> {
    match value {
        // A lone option for a checklist field is a one-item selection.
        FieldValue::Choice(choice) if catalog.is_checklist(field) => {
            checklist_total(field, std::slice::from_ref(choice), catalog)
                .map(|total| total.to_string())
        }
        FieldValue::Choice(choice) => Some(choice.trim().to_string()),
        FieldValue::Integer(number) => Some(number.to_string()),
        FieldValue::Checklist(selected) => checklist_total(field, selected, catalog)
            .map(|total| total.to_string()),
    }
}

/// Sum of the selected option weights; `None` for an empty selection.
pub(crate) fn checklist_total(
    field: &str,
    selected: &[String],
    catalog: &ParameterCatalog,
) -> Option<u32> {
    let mut picked = selected
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .peekable();

    picked.peek()?;

    let total = picked
        .map(|value| match catalog.checklist_weight(field, value) {
            Some(weight) => weight,
            None => {
                debug!(field, option = value, "checklist option not in catalog");
                0
            }
        })
        .fold(0u32, u32::saturating_add);

    Some(total)
}
