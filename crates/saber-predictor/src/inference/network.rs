use super::factor::Factor;
use super::{Distribution, InferenceError, InferenceModel};
use crate::prediction::evidence::Evidence;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

const COLUMN_TOLERANCE: f64 = 1e-6;

/// Persisted form of a discrete Bayesian network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub name: String,
    pub variables: Vec<VariableDocument>,
    pub cpds: Vec<CpdDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDocument {
    pub name: String,
    pub states: Vec<String>,
}

/// Conditional table `values[state][column]`; columns enumerate parent assignments
/// with the last parent varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpdDocument {
    pub variable: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model '{model}' is invalid: {detail}")]
    Invalid { model: String, detail: String },
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    states: Vec<String>,
}

#[derive(Debug, Clone)]
struct Cpd {
    parents: Vec<usize>,
    /// One axis for the variable, then one per parent.
    values: ArrayD<f64>,
}

/// Validated discrete Bayesian network queried by exact variable elimination.
#[derive(Debug, Clone)]
pub struct DiscreteBayesNet {
    name: String,
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    cpds: Vec<Cpd>,
}

impl DiscreteBayesNet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let document: NetworkDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_document(document: NetworkDocument) -> Result<Self, ModelLoadError> {
        let NetworkDocument {
            name,
            variables: declared,
            cpds: tables,
        } = document;
        let invalid = |detail: String| ModelLoadError::Invalid {
            model: name.clone(),
            detail,
        };

        let mut index = HashMap::new();
        let mut variables = Vec::with_capacity(declared.len());
        for variable in declared {
            if variable.states.is_empty() {
                return Err(invalid(format!("variable '{}' has no states", variable.name)));
            }
            let unique: HashSet<&String> = variable.states.iter().collect();
            if unique.len() != variable.states.len() {
                return Err(invalid(format!(
                    "variable '{}' repeats a state",
                    variable.name
                )));
            }
            if index.insert(variable.name.clone(), variables.len()).is_some() {
                return Err(invalid(format!("variable '{}' declared twice", variable.name)));
            }
            variables.push(Variable {
                name: variable.name,
                states: variable.states,
            });
        }

        let mut slots: Vec<Option<Cpd>> = vec![None; variables.len()];
        for table in tables {
            let &var = index
                .get(&table.variable)
                .ok_or_else(|| invalid(format!("CPD for unknown variable '{}'", table.variable)))?;
            if slots[var].is_some() {
                return Err(invalid(format!("variable '{}' has two CPDs", table.variable)));
            }

            let mut parents = Vec::with_capacity(table.parents.len());
            for parent in &table.parents {
                let &parent_index = index.get(parent).ok_or_else(|| {
                    invalid(format!(
                        "CPD for '{}' references unknown parent '{}'",
                        table.variable, parent
                    ))
                })?;
                parents.push(parent_index);
            }

            let card = variables[var].states.len();
            let columns: usize = parents
                .iter()
                .map(|parent| variables[*parent].states.len())
                .product();

            if table.values.len() != card || table.values.iter().any(|row| row.len() != columns) {
                return Err(invalid(format!(
                    "CPD for '{}' must be {} x {}",
                    table.variable, card, columns
                )));
            }

            for column in 0..columns {
                let mut total = 0.0;
                for row in &table.values {
                    let value = row[column];
                    if !value.is_finite() || value < 0.0 {
                        return Err(invalid(format!(
                            "CPD for '{}' has a negative or non-finite entry",
                            table.variable
                        )));
                    }
                    total += value;
                }
                if (total - 1.0).abs() > COLUMN_TOLERANCE {
                    return Err(invalid(format!(
                        "CPD for '{}' column {} sums to {:.6}",
                        table.variable, column, total
                    )));
                }
            }

            let mut shape = Vec::with_capacity(parents.len() + 1);
            shape.push(card);
            shape.extend(parents.iter().map(|parent| variables[*parent].states.len()));
            let values = ArrayD::from_shape_vec(
                IxDyn(&shape),
                table.values.into_iter().flatten().collect(),
            )
            .map_err(|err| invalid(format!("CPD for '{}': {err}", table.variable)))?;

            slots[var] = Some(Cpd { parents, values });
        }

        let mut cpds = Vec::with_capacity(slots.len());
        for (var, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(cpd) => cpds.push(cpd),
                None => {
                    return Err(invalid(format!(
                        "variable '{}' has no CPD",
                        variables[var].name
                    )))
                }
            }
        }

        let network = Self {
            name: name.clone(),
            variables,
            index,
            cpds,
        };

        if network.has_cycle() {
            return Err(invalid("parent structure contains a cycle".to_string()));
        }

        Ok(network)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|variable| variable.name.as_str())
    }

    pub(crate) fn variable_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn state_index(&self, var: usize, state: &str) -> Option<usize> {
        self.variables[var]
            .states
            .iter()
            .position(|candidate| candidate == state)
    }

    pub(crate) fn states(&self, var: usize) -> &[String] {
        &self.variables[var].states
    }

    pub(crate) fn cardinality(&self, var: usize) -> usize {
        self.variables[var].states.len()
    }

    pub(crate) fn parents(&self, var: usize) -> &[usize] {
        &self.cpds[var].parents
    }

    /// CPD of `var` as a factor over `[var, parents...]`.
    pub(crate) fn factor(&self, var: usize) -> Factor {
        let cpd = &self.cpds[var];
        let mut vars = Vec::with_capacity(cpd.parents.len() + 1);
        vars.push(var);
        vars.extend_from_slice(&cpd.parents);
        Factor::from_array(vars, cpd.values.clone())
    }

    fn has_cycle(&self) -> bool {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut marks = vec![0u8; self.variables.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.variables.len() {
            if marks[start] != 0 {
                continue;
            }
            marks[start] = 1;
            stack.push((start, 0));

            while let Some((var, next)) = stack.pop() {
                let parents = self.parents(var);
                if next < parents.len() {
                    stack.push((var, next + 1));
                    let parent = parents[next];
                    match marks[parent] {
                        0 => {
                            marks[parent] = 1;
                            stack.push((parent, 0));
                        }
                        1 => return true,
                        _ => {}
                    }
                } else {
                    marks[var] = 2;
                }
            }
        }

        false
    }
}

impl InferenceModel for DiscreteBayesNet {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_states(&self, target: &str) -> Option<Vec<String>> {
        self.variable_index(target)
            .map(|var| self.variables[var].states.clone())
    }

    fn query(&self, target: &str, evidence: &Evidence) -> Result<Distribution, InferenceError> {
        super::elimination::query(self, target, evidence)
    }
}
