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

//! Start time and leftmost berth as integers, separated pairwise by
//! big-M disjunctions in time (`sigma`) and in space (`delta`).

use crate::{
    config::FormulationConfig,
    err::{ExtractionError, SolverError},
    extract::{mooring, read_integer},
    formulation::{Built, Formulation, FormulationKind, add_completions, add_makespan, bounds::Bounds},
    milp::{LinExpr, MilpModel, Sense, VarId},
    warm_start::{self, WarmStartMode, WarmStartReport},
};
use berth_milp_model::{
    instance::Instance,
    solution::{ShipMooring, SolutionRecord},
};
use fxhash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct RelativePositionVars {
    u: Vec<VarId>,
    v: Vec<VarId>,
    c: Vec<VarId>,
    sigma: FxHashMap<(usize, usize), VarId>,
    delta: FxHashMap<(usize, usize), VarId>,
}

impl RelativePositionVars {
    #[inline]
    pub fn start(&self, ship: usize) -> VarId {
        self.u[ship]
    }

    #[inline]
    pub fn berth(&self, ship: usize) -> VarId {
        self.v[ship]
    }

    #[inline]
    pub fn completion(&self, ship: usize) -> VarId {
        self.c[ship]
    }

    /// `i` completes before `j` starts.
    #[inline]
    pub fn before(&self, i: usize, j: usize) -> Option<VarId> {
        self.sigma.get(&(i, j)).copied()
    }

    /// `i` lies entirely left of `j`.
    #[inline]
    pub fn left_of(&self, i: usize, j: usize) -> Option<VarId> {
        self.delta.get(&(i, j)).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelativePosition {
    config: FormulationConfig,
}

impl RelativePosition {
    #[inline]
    pub fn new(config: FormulationConfig) -> Self {
        Self { config }
    }
}

impl Formulation for RelativePosition {
    type Vars = RelativePositionVars;

    fn kind(&self) -> FormulationKind {
        FormulationKind::RelativePosition
    }

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError> {
        let bounds = Bounds::new(instance, &self.config)?;
        let n = bounds.n_ships();
        let mut model = MilpModel::new(format!("{}-rp", instance.basename()));
        let mut vars = RelativePositionVars::default();

        for i in 0..n {
            let id = bounds.ship_label(i);
            vars.u.push(model.integer(
                format!("u({})", id),
                bounds.start_lb(i) as f64,
                bounds.start_ub(i) as f64,
            ));
            vars.v.push(model.integer(format!("v({})", id), 0.0, bounds.offset_ub(i) as f64));
        }
        vars.c = add_completions(&mut model, &bounds);

        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
                vars.sigma.insert((i, j), model.binary(format!("sigma({},{})", a, b)));
                vars.delta.insert((i, j), model.binary(format!("delta({},{})", a, b)));
            }
        }

        for i in 0..n {
            model.add_constraint(
                "set_c",
                format!("set_c({})", bounds.ship_label(i)),
                LinExpr::from(vars.c[i]).term(vars.u[i], -1.0),
                Sense::Eq,
                (bounds.processing(i) - 1) as f64,
            );
        }

        let space_m = bounds.space_big_m();
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
                let time_m = bounds.time_big_m(j);
                model.add_constraint(
                    "time_order",
                    format!("time_order({},{})", a, b),
                    LinExpr::from(vars.u[j])
                        .term(vars.u[i], -1.0)
                        .term(vars.sigma[&(i, j)], -time_m),
                    Sense::Ge,
                    bounds.processing(i) as f64 - time_m,
                );
                model.add_constraint(
                    "space_order",
                    format!("space_order({},{})", a, b),
                    LinExpr::from(vars.v[j])
                        .term(vars.v[i], -1.0)
                        .term(vars.delta[&(i, j)], -space_m),
                    Sense::Ge,
                    bounds.footprint(i) as f64 - space_m,
                );
            }
        }

        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
                let (sij, sji) = (vars.sigma[&(i, j)], vars.sigma[&(j, i)]);
                let (dij, dji) = (vars.delta[&(i, j)], vars.delta[&(j, i)]);
                model.add_constraint(
                    "separated",
                    format!("separated({},{})", a, b),
                    [(sij, 1.0), (sji, 1.0), (dij, 1.0), (dji, 1.0)].into_iter().collect(),
                    Sense::Ge,
                    1.0,
                );
                model.add_constraint(
                    "time_exclusive",
                    format!("time_exclusive({},{})", a, b),
                    LinExpr::from(sij).term(sji, 1.0),
                    Sense::Le,
                    1.0,
                );
                model.add_constraint(
                    "space_exclusive",
                    format!("space_exclusive({},{})", a, b),
                    LinExpr::from(dij).term(dji, 1.0),
                    Sense::Le,
                    1.0,
                );
            }
        }

        let makespan = add_makespan(&mut model, &bounds, &vars.c);
        tracing::debug!(
            "Built {} model with {} variables and {} constraints",
            self.kind(),
            model.n_vars(),
            model.n_constraints()
        );

        Ok(Built {
            model,
            vars,
            bounds,
            makespan,
        })
    }

    fn load_warm_start(
        &self,
        built: &mut Built<Self::Vars>,
        instance: &Instance,
        solution: &SolutionRecord,
        mode: WarmStartMode,
    ) -> WarmStartReport {
        let mut report = WarmStartReport::default();
        for target in warm_start::resolve_targets(instance, solution, &mut report) {
            let assignments = [
                (built.vars.start(target.index), target.start as f64),
                (built.vars.berth(target.index), target.berth as f64),
            ];
            report.record(warm_start::apply_all(&mut built.model, &assignments, mode));
        }
        warm_start::log_report(self.kind().long_name(), &report);
        report
    }

    fn extract(
        &self,
        built: &Built<Self::Vars>,
        instance: &Instance,
        values: &[f64],
    ) -> Result<Vec<ShipMooring>, SolverError> {
        let bounds = &built.bounds;
        (0..bounds.n_ships())
            .map(|i| {
                let id = bounds.ship_id(i);
                let start = read_integer(values, built.vars.start(i), id)?;
                let berth = read_integer(values, built.vars.berth(i), id)?;
                let berth = usize::try_from(berth).map_err(|_| {
                    ExtractionError::new(id, format!("negative berth {}", berth))
                })?;
                Ok(mooring(instance, bounds, i, start, berth)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BigMPolicy,
        formulation::test_support::{assert_valid, distinct, params, solve_optimal, tiny},
    };

    #[test]
    fn test_pair_rows() {
        let built = RelativePosition::default().build(&tiny()).unwrap();
        let counts = built.model.family_counts();
        assert_eq!(counts["time_order"], 6);
        assert_eq!(counts["space_order"], 6);
        assert_eq!(counts["separated"], 3);
        assert_eq!(counts["time_exclusive"], 3);
        assert_eq!(counts["space_exclusive"], 3);
        assert_eq!(built.model.n_vars(), 3 * 3 + 12 + 1);
        assert!(built.vars.before(0, 0).is_none());
        assert!(built.vars.left_of(2, 1).is_some());
    }

    #[test]
    fn test_variable_bounds() {
        let built = RelativePosition::default().build(&tiny()).unwrap();
        let v0 = built.model.var(built.vars.berth(0));
        assert_eq!((v0.lower, v0.upper), (0.0, 0.0));
        let u1 = built.model.var(built.vars.start(1));
        assert_eq!((u1.lower, u1.upper), (0.0, 7.0));
    }

    #[test]
    fn test_solves_tiny_to_known_optimum() {
        let inst = tiny();
        let (makespan, ships) = solve_optimal(&RelativePosition::default(), &inst);
        assert!((makespan - 4.0).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_constant_big_m_gives_same_optimum() {
        let inst = distinct();
        let (derived, _) = solve_optimal(&RelativePosition::default(), &inst);
        let mut config = FormulationConfig::default();
        config.big_m = BigMPolicy::Constant(1e4);
        let (constant, ships) = solve_optimal(&RelativePosition::new(config), &inst);
        assert!((derived - constant).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_fixed_warm_start_reproduces_schedule() {
        let inst = distinct();
        let f = RelativePosition::default();
        let (_, ships) = solve_optimal(&f, &inst);
        let record = SolutionRecord::with_schedule(0.0, 0.0, 0.0, 0.0, ships.clone());

        let mut built = f.build(&inst).unwrap();
        let report = f.load_warm_start(&mut built, &inst, &record, WarmStartMode::Fix);
        assert_eq!(report.applied, inst.n_ships());

        let out = crate::engine::MilpEngine::solve(
            &crate::engine::highs::HighsEngine,
            &built.model,
            &params(),
        )
        .unwrap();
        assert_eq!(f.extract(&built, &inst, &out.values).unwrap(), ships);
    }
}
