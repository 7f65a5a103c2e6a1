// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Engine-neutral description of a mixed-integer linear program.
//!
//! Formulations write into a [`MilpModel`]; engines translate it into their
//! own representation. Keeping the model here lets the same instance be
//! checked, dumped to LP text and cut down for conflict analysis without
//! touching the engine.

pub mod lp_format;

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
    pub hint: Option<f64>,
}

impl VarDef {
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper
    }

    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self.kind, VarKind::Integer | VarKind::Binary)
    }

    #[inline]
    pub fn admits(&self, value: f64, tol: f64) -> bool {
        if value < self.lower - tol || value > self.upper + tol {
            return false;
        }
        !self.is_integral() || (value - value.round()).abs() <= tol
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl std::fmt::Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "="),
        }
    }
}

/// A linear expression `Σ coef · var + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    #[inline]
    pub fn term(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    #[inline]
    pub fn plus(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    #[inline]
    pub fn add_term(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    #[inline]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[inline]
    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    #[inline]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(v, c)| c * values[v.index()])
                .sum::<f64>()
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        LinExpr::new().term(var, 1.0)
    }
}

impl FromIterator<(VarId, f64)> for LinExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

impl Extend<(VarId, f64)> for LinExpr {
    fn extend<I: IntoIterator<Item = (VarId, f64)>>(&mut self, iter: I) {
        self.terms.extend(iter);
    }
}

/// A named row `Σ coef · var (sense) rhs`. Terms are merged per variable and
/// never carry a zero coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    family: &'static str,
    name: String,
    terms: Vec<(VarId, f64)>,
    sense: Sense,
    rhs: f64,
}

impl LinearConstraint {
    #[inline]
    pub fn family(&self) -> &'static str {
        self.family
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[inline]
    pub fn sense(&self) -> Sense {
        self.sense
    }

    #[inline]
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    #[inline]
    pub fn lhs_value(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * values[v.index()]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.lhs_value(values);
        let slack = tol * (1.0 + self.rhs.abs());
        match self.sense {
            Sense::Le => lhs <= self.rhs + slack,
            Sense::Ge => lhs >= self.rhs - slack,
            Sense::Eq => (lhs - self.rhs).abs() <= slack,
        }
    }
}

/// A minimisation problem over bounded variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilpModel {
    name: String,
    vars: Vec<VarDef>,
    constraints: Vec<LinearConstraint>,
    objective: LinExpr,
}

impl MilpModel {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_var(&mut self, name: impl Into<String>, kind: VarKind, lower: f64, upper: f64) -> VarId {
        let (lower, upper) = match kind {
            VarKind::Binary => (lower.max(0.0), upper.min(1.0)),
            _ => (lower, upper),
        };
        let id = VarId(self.vars.len());
        self.vars.push(VarDef {
            name: name.into(),
            kind,
            lower,
            upper,
            hint: None,
        });
        id
    }

    #[inline]
    pub fn binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name, VarKind::Binary, 0.0, 1.0)
    }

    #[inline]
    pub fn integer(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(name, VarKind::Integer, lower, upper)
    }

    #[inline]
    pub fn continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(name, VarKind::Continuous, lower, upper)
    }

    /// Adds `expr (sense) rhs`. The constant part of `expr` moves to the
    /// right-hand side.
    pub fn add_constraint(
        &mut self,
        family: &'static str,
        name: impl Into<String>,
        expr: LinExpr,
        sense: Sense,
        rhs: f64,
    ) -> usize {
        let LinExpr { mut terms, constant } = expr;
        terms.sort_by_key(|(v, _)| *v);
        let mut merged: Vec<(VarId, f64)> = Vec::with_capacity(terms.len());
        for (v, c) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == v => *acc += c,
                _ => merged.push((v, c)),
            }
        }
        merged.retain(|(_, c)| *c != 0.0);

        self.constraints.push(LinearConstraint {
            family,
            name: name.into(),
            terms: merged,
            sense,
            rhs: rhs - constant,
        });
        self.constraints.len() - 1
    }

    #[inline]
    pub fn set_objective(&mut self, objective: LinExpr) {
        self.objective = objective;
    }

    #[inline]
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    #[inline]
    pub fn var(&self, id: VarId) -> &VarDef {
        &self.vars[id.index()]
    }

    #[inline]
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    #[inline]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    #[inline]
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn set_hint(&mut self, id: VarId, value: f64) {
        self.vars[id.index()].hint = Some(value);
    }

    /// Collapses the bounds of `id` onto `value`.
    #[inline]
    pub fn fix(&mut self, id: VarId, value: f64) {
        let v = &mut self.vars[id.index()];
        v.lower = value;
        v.upper = value;
        v.hint = Some(value);
    }

    #[inline]
    pub fn set_lower(&mut self, id: VarId, value: f64) {
        self.vars[id.index()].lower = value;
    }

    #[inline]
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Whether `values` respects every bound, integrality requirement and
    /// row of the model.
    pub fn is_feasible_point(&self, values: &[f64], tol: f64) -> bool {
        values.len() == self.vars.len()
            && self
                .vars
                .iter()
                .zip(values)
                .all(|(def, &v)| v.is_finite() && def.admits(v, tol))
            && self.constraints.iter().all(|c| c.is_satisfied(values, tol))
    }

    /// Copy of the model that keeps only the rows at `indices`.
    pub fn with_constraints(&self, indices: &[usize]) -> MilpModel {
        MilpModel {
            name: self.name.clone(),
            vars: self.vars.clone(),
            constraints: indices.iter().map(|&k| self.constraints[k].clone()).collect(),
            objective: self.objective.clone(),
        }
    }

    pub fn family_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.constraints {
            *counts.entry(c.family).or_insert(0) += 1;
        }
        counts
    }

    /// Constraint families in order of first appearance.
    pub fn families(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for c in &self.constraints {
            if !out.contains(&c.family) {
                out.push(c.family);
            }
        }
        out
    }
}
