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

use crate::{
    config::EngineParams,
    engine::{EngineError, EngineStatus, MilpEngine},
    milp::MilpModel,
};
use serde::Serialize;

/// A subset of constraints that is infeasible on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    constraints: Vec<usize>,
    probes: usize,
}

impl Diagnosis {
    /// Indices into [`MilpModel::constraints`] of the diagnosed model.
    #[inline]
    pub fn constraints(&self) -> &[usize] {
        &self.constraints
    }

    /// Number of engine calls spent.
    #[inline]
    pub fn probes(&self) -> usize {
        self.probes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The conflicting rows as a model of their own.
    #[inline]
    pub fn subset(&self, model: &MilpModel) -> MilpModel {
        model.with_constraints(&self.constraints)
    }
}

/// Deletion filter over constraint families, then over single rows.
///
/// A constraint is dropped when the model without it is still proven
/// infeasible. Probes that end on the time limit keep the constraint, so the
/// result is always infeasible but not necessarily irreducible.
#[derive(Debug, Clone)]
pub struct InfeasibilityDiagnoser<'e, E: MilpEngine> {
    engine: &'e E,
    params: EngineParams,
}

impl<'e, E: MilpEngine> InfeasibilityDiagnoser<'e, E> {
    #[inline]
    pub fn new(engine: &'e E, params: EngineParams) -> Self {
        Self { engine, params }
    }

    pub fn diagnose(&self, model: &MilpModel) -> Result<Diagnosis, EngineError> {
        let mut kept: Vec<usize> = (0..model.n_constraints()).collect();
        let mut probes = 0;

        for family in model.families() {
            let candidate: Vec<usize> = kept
                .iter()
                .copied()
                .filter(|&k| model.constraints()[k].family() != family)
                .collect();
            if candidate.len() == kept.len() {
                continue;
            }
            probes += 1;
            if self.still_infeasible(model, &candidate)? {
                tracing::debug!("Family {} is not needed for infeasibility", family);
                kept = candidate;
            }
        }

        let mut at = 0;
        while at < kept.len() {
            let mut candidate = kept.clone();
            let removed = candidate.remove(at);
            probes += 1;
            if self.still_infeasible(model, &candidate)? {
                tracing::debug!("Dropped {}", model.constraints()[removed].name());
                kept = candidate;
            } else {
                at += 1;
            }
        }

        tracing::debug!(
            "Diagnosis kept {} of {} constraints after {} probes",
            kept.len(),
            model.n_constraints(),
            probes
        );
        Ok(Diagnosis {
            constraints: kept,
            probes,
        })
    }

    fn still_infeasible(&self, model: &MilpModel, subset: &[usize]) -> Result<bool, EngineError> {
        let outcome = self
            .engine
            .solve(&model.with_constraints(subset), &self.params)?;
        Ok(outcome.status == EngineStatus::Infeasible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FormulationConfig,
        engine::{EngineOutcome, highs::HighsEngine},
        formulation::{Formulation, relative_position::RelativePosition, test_support::tiny},
        milp::{LinExpr, Sense},
        warm_start::WarmStartMode,
    };
    use berth_milp_model::solution::{ShipMooring, SolutionRecord};
    use std::{cell::Cell, time::Duration};

    /// Infeasible exactly when both `need` and `cap` rows are present.
    struct RuleEngine {
        calls: Cell<usize>,
    }

    impl MilpEngine for RuleEngine {
        fn name(&self) -> &str {
            "rule"
        }

        fn solve(&self, model: &MilpModel, _: &EngineParams) -> Result<EngineOutcome, EngineError> {
            self.calls.set(self.calls.get() + 1);
            let has = |name: &str| model.constraints().iter().any(|c| c.name() == name);
            let status = if has("need") && has("cap") {
                EngineStatus::Infeasible
            } else {
                EngineStatus::TimeLimitWithoutIncumbent
            };
            Ok(EngineOutcome::without_point(status, Duration::ZERO))
        }
    }

    fn conflicting_model() -> MilpModel {
        let mut m = MilpModel::new("conflict");
        let x = m.binary("x");
        let y = m.binary("y");
        m.add_constraint("demand", "need", LinExpr::from(x).term(y, 1.0), Sense::Ge, 2.0);
        m.add_constraint("demand", "other", LinExpr::from(x), Sense::Ge, 0.0);
        m.add_constraint("limit", "cap", LinExpr::from(x).term(y, 1.0), Sense::Le, 1.0);
        m.add_constraint("free", "free", LinExpr::from(y), Sense::Le, 1.0);
        m.set_objective(LinExpr::from(x));
        m
    }

    #[test]
    fn test_filter_keeps_only_the_conflict() {
        let model = conflicting_model();
        let engine = RuleEngine { calls: Cell::new(0) };
        let d = InfeasibilityDiagnoser::new(&engine, EngineParams::default())
            .diagnose(&model)
            .unwrap();
        assert_eq!(d.constraints(), &[0, 2]);
        assert_eq!(d.probes(), engine.calls.get());
        let subset = d.subset(&model);
        let names: Vec<&str> = subset.constraints().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["need", "cap"]);
    }

    #[test]
    fn test_highs_finds_conflict() {
        let model = conflicting_model();
        let d = InfeasibilityDiagnoser::new(&HighsEngine, EngineParams::default())
            .diagnose(&model)
            .unwrap();
        assert_eq!(d.constraints(), &[0, 2]);
    }

    #[test]
    fn test_overlapping_fixed_schedule() {
        let inst = tiny();
        let f = RelativePosition::new(FormulationConfig::default());
        let mut built = f.build(&inst).unwrap();
        let mooring = |id: usize, p: i64, len: f64| ShipMooring {
            data_ship_id: id,
            data_arrival_time: 0,
            data_handling_time: p,
            data_ship_length: len,
            data_ship_length_in_berths: len as usize,
            mooring_time: 0,
            completion_time: p - 1,
            mooring_position: 0.0,
            mooring_berth: 0,
        };
        let record =
            SolutionRecord::with_schedule(2.0, 0.0, 0.0, 0.0, vec![mooring(0, 2, 2.0), mooring(1, 3, 1.0)]);
        f.load_warm_start(&mut built, &inst, &record, WarmStartMode::Fix);

        let params = EngineParams::default().with_time_limit(Duration::from_secs(10));
        let full = HighsEngine.solve(&built.model, &params).unwrap();
        assert_eq!(full.status, EngineStatus::Infeasible);

        let d = InfeasibilityDiagnoser::new(&HighsEngine, params.clone())
            .diagnose(&built.model)
            .unwrap();
        assert!(!d.is_empty());
        assert!(d.len() < built.model.n_constraints());
        let sub = HighsEngine.solve(&d.subset(&built.model), &params).unwrap();
        assert_eq!(sub.status, EngineStatus::Infeasible);
    }
}
