//! Dense discrete factors over model variables.
//!
//! Each factor is an `ndarray` with one axis per variable in `vars`, so CPD tables
//! (variable first, then parents, last parent varying fastest) load without reshuffling.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Factor {
    vars: Vec<usize>,
    values: ArrayD<f64>,
}

impl Factor {
    pub(crate) fn from_array(vars: Vec<usize>, values: ArrayD<f64>) -> Self {
        debug_assert_eq!(vars.len(), values.ndim());
        Self { vars, values }
    }

    /// Factor over `var` with every entry set to one.
    pub(crate) fn unit(var: usize, card: usize) -> Self {
        Self::from_array(vec![var], ArrayD::ones(IxDyn(&[card])))
    }

    #[cfg(test)]
    pub(crate) fn vars(&self) -> &[usize] {
        &self.vars
    }

    /// Entries in row-major order over `vars`.
    pub(crate) fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub(crate) fn contains(&self, var: usize) -> bool {
        self.vars.contains(&var)
    }

    fn axis_of(&self, var: usize) -> Option<Axis> {
        self.vars
            .iter()
            .position(|candidate| *candidate == var)
            .map(Axis)
    }

    pub(crate) fn product(&self, other: &Factor) -> Factor {
        let mut vars = self.vars.clone();
        vars.extend(other.vars.iter().filter(|var| !self.vars.contains(var)));

        let values = &self.aligned_to(&vars) * &other.aligned_to(&vars);
        Factor::from_array(vars, values)
    }

    /// View with axes permuted into `scope` order and unit axes for missing variables,
    /// ready to broadcast against any other factor aligned to the same scope.
    fn aligned_to(&self, scope: &[usize]) -> ArrayViewD<'_, f64> {
        let rank = |var: &usize| {
            scope
                .iter()
                .position(|candidate| candidate == var)
                .unwrap_or(scope.len())
        };
        let mut order: Vec<usize> = (0..self.vars.len()).collect();
        order.sort_by_key(|axis| rank(&self.vars[*axis]));

        let mut view = self.values.view().permuted_axes(order.as_slice());
        for (position, var) in scope.iter().enumerate() {
            if !self.vars.contains(var) {
                view = view.insert_axis(Axis(position));
            }
        }
        view
    }

    /// Marginalizes `var` out of the factor.
    pub(crate) fn sum_out(&self, var: usize) -> Factor {
        let Some(axis) = self.axis_of(var) else {
            return self.clone();
        };
        let mut vars = self.vars.clone();
        vars.remove(axis.index());
        Factor::from_array(vars, self.values.sum_axis(axis))
    }

    /// Conditions on `var = state`, dropping `var` from the scope.
    pub(crate) fn reduce(&self, var: usize, state: usize) -> Factor {
        let Some(axis) = self.axis_of(var) else {
            return self.clone();
        };
        let mut vars = self.vars.clone();
        vars.remove(axis.index());
        Factor::from_array(vars, self.values.index_axis(axis, state).to_owned())
    }

    /// Entry count of the product of `factors`, used to order elimination.
    pub(crate) fn joint_size<'a>(factors: impl Iterator<Item = &'a Factor>) -> usize {
        let mut seen: Vec<(usize, usize)> = Vec::new();
        for factor in factors {
            for (var, card) in factor.vars.iter().zip(factor.values.shape()) {
                if !seen.iter().any(|(candidate, _)| candidate == var) {
                    seen.push((*var, *card));
                }
            }
        }
        seen.iter().map(|(_, card)| *card).product()
    }
}
