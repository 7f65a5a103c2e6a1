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

//! Sequencing core extended with started-by indicators.
//!
//! `q(i,t) = 1` iff ship `i` has started by period `t`. A ship is active in
//! `t` when `q(i,t) - q(i,t-p_i) = 1`, which gives one quay capacity row per
//! period.

use crate::{
    config::FormulationConfig,
    err::SolverError,
    formulation::{
        Built, Formulation, FormulationKind, add_makespan,
        bounds::Bounds,
        sequencing::{SequencingVars, build_core, extract_core, load_core_warm_start},
    },
    milp::{LinExpr, MilpModel, Sense, VarId},
    warm_start::{self, WarmStartMode, WarmStartReport},
};
use berth_milp_model::{
    instance::Instance,
    solution::{ShipMooring, SolutionRecord},
};
use fxhash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct TimeIndexedVars {
    core: SequencingVars,
    q: FxHashMap<(usize, i64), VarId>,
}

impl TimeIndexedVars {
    #[inline]
    pub fn core(&self) -> &SequencingVars {
        &self.core
    }

    /// `None` before the ship's arrival.
    #[inline]
    pub fn started_by(&self, ship: usize, t: i64) -> Option<VarId> {
        self.q.get(&(ship, t)).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeIndexed {
    config: FormulationConfig,
}

impl TimeIndexed {
    #[inline]
    pub fn new(config: FormulationConfig) -> Self {
        Self { config }
    }
}

impl Formulation for TimeIndexed {
    type Vars = TimeIndexedVars;

    fn kind(&self) -> FormulationKind {
        FormulationKind::TimeIndexed
    }

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError> {
        let bounds = Bounds::new(instance, &self.config)?;
        let horizon = bounds.horizon();
        let n = bounds.n_ships();
        let mut model = MilpModel::new(format!("{}-ti", instance.basename()));
        let core = build_core(
            &mut model,
            &bounds,
            self.config.symmetry_breaking,
            self.config.valid_inequalities_or(false),
        );

        let mut q = FxHashMap::default();
        for i in 0..n {
            let id = bounds.ship_label(i);
            let latest_start = bounds.start_ub(i);
            for t in bounds.start_lb(i)..horizon {
                let v = model.binary(format!("q({},{})", id, t));
                if t >= latest_start {
                    model.set_lower(v, 1.0);
                }
                q.insert((i, t), v);
            }
        }
        let vars = TimeIndexedVars { core, q };

        for i in 0..n {
            let id = bounds.ship_label(i);
            for t in bounds.start_lb(i)..horizon - 1 {
                if let (Some(now), Some(next)) = (vars.started_by(i, t), vars.started_by(i, t + 1)) {
                    model.add_constraint(
                        "nondecreasing_q",
                        format!("nondecreasing_q({},{})", id, t),
                        LinExpr::from(next).term(now, -1.0),
                        Sense::Ge,
                        0.0,
                    );
                }
            }
        }

        for i in 0..n {
            let id = bounds.ship_label(i);
            let mut expr = LinExpr::from(vars.core.completion(i));
            expr.extend((bounds.start_lb(i)..horizon).filter_map(|t| vars.started_by(i, t).map(|v| (v, 1.0))));
            model.add_constraint(
                "link_c_q",
                format!("link_c_q({})", id),
                expr,
                Sense::Eq,
                (horizon + bounds.processing(i) - 1) as f64,
            );
        }

        let n_berths = bounds.n_berths() as f64;
        for t in bounds.min_arrival().max(0)..horizon {
            let mut expr = LinExpr::new();
            for i in 0..n {
                let p = bounds.processing(i);
                if p <= 0 {
                    continue;
                }
                let width = bounds.footprint(i) as f64;
                if let Some(now) = vars.started_by(i, t) {
                    expr.add_term(now, width);
                    if let Some(before) = vars.started_by(i, t - p) {
                        expr.add_term(before, -width);
                    }
                }
            }
            if !expr.terms().is_empty() {
                model.add_constraint("capacity", format!("capacity({})", t), expr, Sense::Le, n_berths);
            }
        }

        let makespan = add_makespan(&mut model, &bounds, vars.core.completions());
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
        let report = load_core_warm_start(&mut built.model, &built.vars.core, instance, solution, mode);
        warm_start::log_report(self.kind().long_name(), &report);
        report
    }

    fn extract(
        &self,
        built: &Built<Self::Vars>,
        instance: &Instance,
        values: &[f64],
    ) -> Result<Vec<ShipMooring>, SolverError> {
        extract_core(&built.vars.core, &built.bounds, instance, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::{
        sequencing::tests::twins,
        test_support::{assert_valid, distinct, params, solve_optimal, tiny},
    };

    #[test]
    fn test_started_by_indicators() {
        let built = TimeIndexed::default().build(&tiny()).unwrap();
        let vars = &built.vars;
        assert!(vars.started_by(2, 0).is_none());
        let q = built.model.var(vars.started_by(1, 7).unwrap());
        assert_eq!(q.lower, 1.0);
        let q = built.model.var(vars.started_by(1, 6).unwrap());
        assert_eq!(q.lower, 0.0);
        // final period is always pinned
        for i in 0..3 {
            assert_eq!(built.model.var(vars.started_by(i, 9).unwrap()).lower, 1.0);
        }
    }

    #[test]
    fn test_constraint_families() {
        let built = TimeIndexed::default().build(&tiny()).unwrap();
        let counts = built.model.family_counts();
        assert_eq!(counts["nondecreasing_q"], 9 + 9 + 8);
        assert_eq!(counts["link_c_q"], 3);
        assert_eq!(counts["capacity"], 10);
        assert!(!counts.contains_key("vi_s_x_1"));

        let mut config = FormulationConfig::default();
        config.valid_inequalities = Some(true);
        let built = TimeIndexed::new(config).build(&tiny()).unwrap();
        assert!(built.model.family_counts().contains_key("vi_s_x_1"));
    }

    #[test]
    fn test_solves_tiny_to_known_optimum() {
        let inst = tiny();
        let (makespan, ships) = solve_optimal(&TimeIndexed::default(), &inst);
        assert!((makespan - 4.0).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_solves_twins() {
        let inst = twins();
        let (makespan, ships) = solve_optimal(&TimeIndexed::default(), &inst);
        assert!((makespan - 3.0).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_fixed_warm_start_reproduces_schedule() {
        let inst = distinct();
        let f = TimeIndexed::default();
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
