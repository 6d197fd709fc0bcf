use super::area::KnowledgeArea;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Single selectable value in a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// Checklist entry; selected entries contribute their weight to one aggregate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistOption {
    pub label: String,
    pub value: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Model identifier and target variable consulted for one knowledge area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaBinding {
    pub model: String,
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read parameter catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid parameter catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no model binding declared for area '{0}'")]
    MissingArea(KnowledgeArea),
    #[error("field '{field}' lists option '{value}' more than once")]
    DuplicateOption { field: String, value: String },
    #[error("field '{0}' is declared both as a dropdown and as a checklist")]
    AmbiguousField(String),
    #[error("area '{area}' binding must name a model and a target variable")]
    IncompleteBinding { area: KnowledgeArea },
}

/// Static catalog of form fields, model variable names, and per-area model bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCatalog {
    #[serde(default)]
    dropdown_params: BTreeMap<String, Vec<FieldOption>>,
    #[serde(default)]
    checklist_params: BTreeMap<String, Vec<ChecklistOption>>,
    #[serde(default)]
    param_name_mapping: BTreeMap<String, String>,
    areas: BTreeMap<KnowledgeArea, AreaBinding>,
}

impl ParameterCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: ParameterCatalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Self::from_reader(raw.as_bytes())
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for area in KnowledgeArea::ALL {
            let binding = self.areas.get(&area).ok_or(CatalogError::MissingArea(area))?;
            if binding.model.trim().is_empty() || binding.target.trim().is_empty() {
                return Err(CatalogError::IncompleteBinding { area });
            }
        }

        for (field, options) in &self.dropdown_params {
            if self.checklist_params.contains_key(field) {
                return Err(CatalogError::AmbiguousField(field.clone()));
            }
            ensure_unique(field, options.iter().map(|option| option.value.as_str()))?;
        }

        for (field, options) in &self.checklist_params {
            ensure_unique(field, options.iter().map(|option| option.value.as_str()))?;
        }

        Ok(())
    }

    /// Model variable name for a form field, if the catalog maps it.
    pub fn variable_for(&self, field: &str) -> Option<&str> {
        self.param_name_mapping.get(field).map(String::as_str)
    }

    pub fn binding(&self, area: KnowledgeArea) -> Option<&AreaBinding> {
        self.areas.get(&area)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (KnowledgeArea, &AreaBinding)> {
        self.areas.iter().map(|(area, binding)| (*area, binding))
    }

    /// Declared dropdown and checklist keys, dropdowns first.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.dropdown_params
            .keys()
            .chain(self.checklist_params.keys())
            .map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.dropdown_params.len() + self.checklist_params.len()
    }

    pub fn is_declared(&self, field: &str) -> bool {
        self.dropdown_params.contains_key(field) || self.checklist_params.contains_key(field)
    }

    pub fn is_checklist(&self, field: &str) -> bool {
        self.checklist_params.contains_key(field)
    }

    pub fn options(&self, field: &str) -> Option<&[FieldOption]> {
        self.dropdown_params.get(field).map(Vec::as_slice)
    }

    pub fn checklist_options(&self, field: &str) -> Option<&[ChecklistOption]> {
        self.checklist_params.get(field).map(Vec::as_slice)
    }

    pub fn checklist_weight(&self, field: &str, value: &str) -> Option<u32> {
        self.checklist_params
            .get(field)?
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.weight)
    }

    /// Public listing of the form, used by the catalog endpoint.
    pub fn field_views(&self) -> Vec<FieldView> {
        let dropdowns = self.dropdown_params.iter().map(|(key, options)| FieldView {
            key: key.clone(),
            kind: FieldKind::Dropdown,
            variable: self.param_name_mapping.get(key).cloned(),
            options: options
                .iter()
                .map(|option| OptionView {
                    label: option.label.clone(),
                    value: option.value.clone(),
                    weight: None,
                })
                .collect(),
        });

        let checklists = self.checklist_params.iter().map(|(key, options)| FieldView {
            key: key.clone(),
            kind: FieldKind::Checklist,
            variable: self.param_name_mapping.get(key).cloned(),
            options: options
                .iter()
                .map(|option| OptionView {
                    label: option.label.clone(),
                    value: option.value.clone(),
                    weight: Some(option.weight),
                })
                .collect(),
        });

        dropdowns.chain(checklists).collect()
    }
}

fn ensure_unique<'a>(
    field: &str,
    values: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(CatalogError::DuplicateOption {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Dropdown,
    Checklist,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub key: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ParameterCatalog;

    /// Small catalog shared by the prediction unit tests.
    pub(crate) fn catalog() -> ParameterCatalog {
        ParameterCatalog::from_json(
            r#"{
                "dropdown_params": {
                    "gender": [
                        {"label": "Femenino", "value": "F"},
                        {"label": "Masculino", "value": "M"}
                    ],
                    "stratum": [
                        {"label": "Estrato 1", "value": "1"},
                        {"label": "Estrato 2", "value": "2"},
                        {"label": "Estrato 3", "value": "3"}
                    ],
                    "school_type": [
                        {"label": "Oficial", "value": "OFICIAL"},
                        {"label": "No oficial", "value": "NO OFICIAL"}
                    ],
                    "school_shift": [
                        {"label": "Mañana", "value": "MAÑANA"},
                        {"label": "Tarde", "value": "TARDE"}
                    ]
                },
                "checklist_params": {
                    "household_resources": [
                        {"label": "Internet", "value": "internet", "weight": 1},
                        {"label": "Computador", "value": "computer", "weight": 1},
                        {"label": "Automóvil", "value": "car", "weight": 2}
                    ]
                },
                "param_name_mapping": {
                    "gender": "ESTU_GENERO",
                    "stratum": "FAMI_ESTRATOVIVIENDA",
                    "school_type": "COLE_NATURALEZA",
                    "household_resources": "FAMI_RECURSOS"
                },
                "areas": {
                    "mathematics": {"model": "saber11", "target": "DESEMP_MATEMATICAS"},
                    "natural_sciences": {"model": "saber11", "target": "DESEMP_C_NATURALES"},
                    "social_sciences": {"model": "saber11", "target": "DESEMP_SOCIALES_CIUDADANAS"},
                    "critical_reading": {"model": "saber11", "target": "DESEMP_LECTURA_CRITICA"},
                    "english": {"model": "saber11", "target": "DESEMP_INGLES"},
                    "global": {"model": "saber11", "target": "DESEMP_GLOBAL"}
                }
            }"#,
        )
        .expect("fixture catalog is valid")
    }
}
