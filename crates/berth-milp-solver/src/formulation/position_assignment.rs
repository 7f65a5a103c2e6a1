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

//! Time and position indexed model.
//!
//! `x(i,j,t)` marks ship `i` covering berth `j` in period `t`, `y(i,j,t)`
//! marks its start with leftmost berth `j` in period `t`. Every cell of the
//! quay/time grid holds at most one ship.

use crate::{
    config::FormulationConfig,
    err::{ExtractionError, SolverError},
    extract::mooring,
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
pub struct PositionAssignmentVars {
    x: FxHashMap<(usize, usize, i64), VarId>,
    y: FxHashMap<(usize, usize, i64), VarId>,
    starts: Vec<Vec<(usize, i64, VarId)>>,
    c: Vec<VarId>,
}

impl PositionAssignmentVars {
    #[inline]
    pub fn occupancy(&self, ship: usize, berth: usize, t: i64) -> Option<VarId> {
        self.x.get(&(ship, berth, t)).copied()
    }

    #[inline]
    pub fn start(&self, ship: usize, berth: usize, t: i64) -> Option<VarId> {
        self.y.get(&(ship, berth, t)).copied()
    }

    /// Start indicators of one ship as `(berth, period, var)`.
    #[inline]
    pub fn starts_of(&self, ship: usize) -> &[(usize, i64, VarId)] {
        &self.starts[ship]
    }

    #[inline]
    pub fn completion(&self, ship: usize) -> VarId {
        self.c[ship]
    }

    #[inline]
    pub fn n_occupancy(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn n_starts(&self) -> usize {
        self.y.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionAssignment {
    config: FormulationConfig,
}

impl PositionAssignment {
    #[inline]
    pub fn new(config: FormulationConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &FormulationConfig {
        &self.config
    }
}

impl Formulation for PositionAssignment {
    type Vars = PositionAssignmentVars;

    fn kind(&self) -> FormulationKind {
        FormulationKind::PositionAssignment
    }

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError> {
        let bounds = Bounds::new(instance, &self.config)?;
        let horizon = bounds.horizon();
        let n_berths = bounds.n_berths();
        let mut model = MilpModel::new(format!("{}-pa", instance.basename()));
        let mut vars = PositionAssignmentVars::default();

        for i in 0..bounds.n_ships() {
            let id = bounds.ship_label(i);
            for j in 0..n_berths {
                for t in bounds.start_lb(i)..horizon {
                    let v = model.binary(format!("x({},{},{})", id, j, t));
                    vars.x.insert((i, j, t), v);
                }
            }
        }

        for i in 0..bounds.n_ships() {
            let id = bounds.ship_label(i);
            let mut starts = Vec::new();
            for j in 0..=bounds.offset_ub(i) {
                for t in bounds.start_range(i) {
                    let v = model.binary(format!("y({},{},{})", id, j, t));
                    vars.y.insert((i, j, t), v);
                    starts.push((j, t, v));
                }
            }
            vars.starts.push(starts);
        }

        vars.c = add_completions(&mut model, &bounds);

        for i in 0..bounds.n_ships() {
            let id = bounds.ship_label(i);
            let p = bounds.processing(i);

            let mut set_c = LinExpr::from(vars.c[i]);
            set_c.extend(vars.starts[i].iter().map(|&(_, t, y)| (y, -(t as f64))));
            model.add_constraint("set_c", format!("set_c({})", id), set_c, Sense::Eq, (p - 1) as f64);

            let one_start: LinExpr = vars.starts[i].iter().map(|&(_, _, y)| (y, 1.0)).collect();
            model.add_constraint("one_start", format!("one_start({})", id), one_start, Sense::Eq, 1.0);
        }

        for i in 0..bounds.n_ships() {
            let id = bounds.ship_label(i);
            let p = bounds.processing(i);
            if p <= 0 {
                continue;
            }
            let footprint = bounds.footprint(i);
            let big_m = bounds.link_big_m(i);
            let cells = (p * footprint as i64) as f64;
            for &(j, t, y) in &vars.starts[i] {
                let mut expr = LinExpr::new();
                for m in j..j + footprint {
                    for n in t..t + p {
                        if let Some(x) = vars.occupancy(i, m, n) {
                            expr.add_term(x, 1.0);
                        }
                    }
                }
                expr.add_term(y, -big_m);
                model.add_constraint(
                    "link_x_y",
                    format!("link_x_y({},{},{})", id, j, t),
                    expr,
                    Sense::Ge,
                    cells - big_m,
                );
            }
        }

        for t in bounds.min_arrival().max(0)..horizon {
            let present: Vec<usize> = (0..bounds.n_ships())
                .filter(|&i| bounds.start_lb(i) <= t)
                .collect();
            if present.len() < 2 {
                continue;
            }
            for j in 0..n_berths {
                let expr: LinExpr = present
                    .iter()
                    .filter_map(|&i| vars.occupancy(i, j, t))
                    .map(|x| (x, 1.0))
                    .collect();
                model.add_constraint("no_overlap", format!("no_overlap({},{})", j, t), expr, Sense::Le, 1.0);
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
            let applied = match built.vars.start(target.index, target.berth, target.start) {
                Some(y) => warm_start::apply_all(&mut built.model, &[(y, 1.0)], mode),
                None => false,
            };
            report.record(applied);
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
        let mut ships = Vec::with_capacity(instance.n_ships());
        for i in 0..built.bounds.n_ships() {
            let chosen = built.vars.starts_of(i).iter().find(|&&(_, _, y)| {
                values.get(y.index()).is_some_and(|v| *v > 0.5)
            });
            let Some(&(j, t, _)) = chosen else {
                return Err(ExtractionError::new(
                    built.bounds.ship_id(i),
                    "no start indicator is set",
                )
                .into());
            };
            ships.push(mooring(instance, &built.bounds, i, t, j)?);
        }
        Ok(ships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::test_support::{assert_valid, distinct, solve_optimal, tiny};

    #[test]
    fn test_variables_respect_arrival_and_fit() {
        let f = PositionAssignment::default();
        let built = f.build(&tiny()).unwrap();
        let vars = &built.vars;

        // ship 2 arrives in period 1
        assert!(vars.occupancy(2, 0, 0).is_none());
        assert!(vars.occupancy(2, 0, 1).is_some());
        // ship 0 spans both berths, so it can only start on berth 0
        assert!(vars.start(0, 1, 0).is_none());
        assert!(vars.start(0, 0, 8).is_some());
        assert!(vars.start(0, 0, 9).is_none());
        // ship 1 needs three periods
        assert!(vars.start(1, 1, 7).is_some());
        assert!(vars.start(1, 1, 8).is_none());

        assert_eq!(vars.n_occupancy(), 20 + 20 + 18);
        assert_eq!(vars.n_starts(), 9 + 16 + 16);
    }

    #[test]
    fn test_constraint_families() {
        let built = PositionAssignment::default().build(&tiny()).unwrap();
        let counts = built.model.family_counts();
        assert_eq!(counts["one_start"], 3);
        assert_eq!(counts["set_c"], 3);
        assert_eq!(counts["link_x_y"], 41);
        assert_eq!(counts["set_makespan"], 3);
        // period 0 has two ships present, periods 1..10 all three
        assert_eq!(counts["no_overlap"], 2 * 10);
    }

    #[test]
    fn test_solves_tiny_to_known_optimum() {
        let inst = tiny();
        let (makespan, ships) = solve_optimal(&PositionAssignment::default(), &inst);
        assert!((makespan - 4.0).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_fixed_warm_start_reproduces_schedule() {
        let inst = distinct();
        let f = PositionAssignment::default();
        let (_, ships) = solve_optimal(&f, &inst);
        let record = SolutionRecord::with_schedule(0.0, 0.0, 0.0, 0.0, ships.clone());

        let mut built = f.build(&inst).unwrap();
        let report = f.load_warm_start(&mut built, &inst, &record, WarmStartMode::Fix);
        assert_eq!(report.applied, inst.n_ships());
        assert_eq!(report.skipped, 0);

        let out = crate::engine::MilpEngine::solve(
            &crate::engine::highs::HighsEngine,
            &built.model,
            &crate::formulation::test_support::params(),
        )
        .unwrap();
        let again = f.extract(&built, &inst, &out.values).unwrap();
        assert_eq!(again, ships);
    }

    #[test]
    fn test_warm_start_skips_pruned_start() {
        let inst = tiny();
        let f = PositionAssignment::default();
        let mut built = f.build(&inst).unwrap();
        let m = ShipMooring {
            data_ship_id: 0,
            data_arrival_time: 0,
            data_handling_time: 2,
            data_ship_length: 2.0,
            data_ship_length_in_berths: 2,
            mooring_time: 0,
            completion_time: 1,
            mooring_position: 1.0,
            mooring_berth: 1,
        };
        let record = SolutionRecord::with_schedule(1.0, 1.0, 0.0, 0.0, vec![m]);
        let report = f.load_warm_start(&mut built, &inst, &record, WarmStartMode::Hint);
        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped, 1);
    }
}
