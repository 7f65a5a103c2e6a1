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

//! Disjunctive sequencing model.
//!
//! Every pair of ships is separated in exactly one way: one precedes the
//! other in time (`x`) or one lies left of the other (`I`). The
//! `SequencingVars` core is shared with the time indexed model.

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
pub struct SequencingVars {
    s: Vec<VarId>,
    c: Vec<VarId>,
    y: Vec<VarId>,
    x: FxHashMap<(usize, usize), VarId>,
    inter: FxHashMap<(usize, usize), VarId>,
}

impl SequencingVars {
    #[inline]
    pub fn start(&self, ship: usize) -> VarId {
        self.s[ship]
    }

    #[inline]
    pub fn completion(&self, ship: usize) -> VarId {
        self.c[ship]
    }

    /// Leftmost berth.
    #[inline]
    pub fn berth(&self, ship: usize) -> VarId {
        self.y[ship]
    }

    #[inline]
    pub fn completions(&self) -> &[VarId] {
        &self.c
    }

    /// `i` precedes `j` in time.
    #[inline]
    pub fn precedes(&self, i: usize, j: usize) -> Option<VarId> {
        self.x.get(&(i, j)).copied()
    }

    /// `i` lies left of `j`.
    #[inline]
    pub fn left_of(&self, i: usize, j: usize) -> Option<VarId> {
        self.inter.get(&(i, j)).copied()
    }

    fn x(&self, i: usize, j: usize) -> VarId {
        self.x[&(i, j)]
    }

    fn inter(&self, i: usize, j: usize) -> VarId {
        self.inter[&(i, j)]
    }
}

/// Interchangeable ships: same processing time and footprint, with `i`
/// arriving no later than `j`.
#[inline]
fn interchangeable(bounds: &Bounds, i: usize, j: usize) -> bool {
    i < j
        && bounds.arrival(i) <= bounds.arrival(j)
        && bounds.processing(i) == bounds.processing(j)
        && bounds.footprint(i) == bounds.footprint(j)
}

/// Adds `s`, `c`, `y`, `x`, `I` and their linking rows. Symmetry breaking
/// and valid inequalities are added on request.
pub(crate) fn build_core(
    model: &mut MilpModel,
    bounds: &Bounds,
    symmetry_breaking: bool,
    valid_inequalities: bool,
) -> SequencingVars {
    let n = bounds.n_ships();
    let mut vars = SequencingVars::default();

    for i in 0..n {
        let id = bounds.ship_label(i);
        vars.s.push(model.integer(
            format!("s({})", id),
            bounds.start_lb(i) as f64,
            bounds.start_ub(i) as f64,
        ));
    }
    vars.c = add_completions(model, bounds);
    for i in 0..n {
        let id = bounds.ship_label(i);
        vars.y.push(model.integer(format!("y({})", id), 0.0, bounds.offset_ub(i) as f64));
    }
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
            vars.x.insert((i, j), model.binary(format!("x({},{})", a, b)));
            vars.inter.insert((i, j), model.binary(format!("I({},{})", a, b)));
        }
    }

    for i in 0..n {
        model.add_constraint(
            "set_c",
            format!("set_c({})", bounds.ship_label(i)),
            LinExpr::from(vars.c[i]).term(vars.s[i], -1.0),
            Sense::Eq,
            (bounds.processing(i) - 1) as f64,
        );
    }

    for i in 0..n {
        for j in i + 1..n {
            let expr: LinExpr = [
                (vars.x(i, j), 1.0),
                (vars.x(j, i), 1.0),
                (vars.inter(i, j), 1.0),
                (vars.inter(j, i), 1.0),
            ]
            .into_iter()
            .collect();
            model.add_constraint(
                "one_relation",
                format!("one_relation({},{})", bounds.ship_label(i), bounds.ship_label(j)),
                expr,
                Sense::Eq,
                1.0,
            );
        }
    }

    let space_m = bounds.space_big_m();
    for i in 0..n {
        for j in (0..n).filter(|&j| j != i) {
            let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
            let time_m = bounds.time_big_m(j);
            model.add_constraint(
                "link_sc_x",
                format!("link_sc_x({},{})", a, b),
                LinExpr::from(vars.s[j])
                    .term(vars.c[i], -1.0)
                    .term(vars.x(i, j), -time_m),
                Sense::Ge,
                1.0 - time_m,
            );
            model.add_constraint(
                "link_y_i",
                format!("link_y_i({},{})", a, b),
                LinExpr::from(vars.y[j])
                    .term(vars.y[i], -1.0)
                    .term(vars.inter(i, j), -space_m),
                Sense::Ge,
                bounds.footprint(i) as f64 - space_m,
            );
        }
    }

    if symmetry_breaking {
        add_symmetry_breaking(model, bounds, &vars);
    }
    if valid_inequalities {
        add_valid_inequalities(model, bounds, &vars);
    }
    vars
}

fn add_symmetry_breaking(model: &mut MilpModel, bounds: &Bounds, vars: &SequencingVars) {
    let n = bounds.n_ships();
    for i in 0..n {
        for j in (0..n).filter(|&j| interchangeable(bounds, i, j)) {
            let (a, b) = (bounds.ship_label(i), bounds.ship_label(j));
            model.add_constraint(
                "symmetric_c",
                format!("symmetric_c({},{})", a, b),
                LinExpr::from(vars.c[i]).term(vars.c[j], -1.0),
                Sense::Le,
                0.0,
            );
            model.add_constraint(
                "symmetric_x",
                format!("symmetric_x({},{})", a, b),
                LinExpr::from(vars.x(j, i)),
                Sense::Eq,
                0.0,
            );
        }
    }
}

fn add_valid_inequalities(model: &mut MilpModel, bounds: &Bounds, vars: &SequencingVars) {
    let n = bounds.n_ships();
    let n_berths = bounds.n_berths();
    let min_arrival = bounds.min_arrival() as f64;

    // Ships too wide to stand side by side.
    for i in 0..n {
        let expr: LinExpr = (0..n)
            .filter(|&j| j != i && bounds.footprint(i) + bounds.footprint(j) > n_berths)
            .map(|j| (vars.inter(i, j), 1.0))
            .collect();
        if !expr.terms().is_empty() {
            model.add_constraint(
                "incompatible_i",
                format!("incompatible_i({})", bounds.ship_label(i)),
                expr,
                Sense::Eq,
                0.0,
            );
        }
    }

    // A shorter ship is only preceded by an equally long twin when a third
    // ship stands beside it.
    for i in 0..n {
        for j in (0..n).filter(|&j| {
            i < j
                && bounds.arrival(i) <= bounds.arrival(j)
                && bounds.processing(i) == bounds.processing(j)
                && bounds.footprint(i) < bounds.footprint(j)
        }) {
            let mut expr = LinExpr::from(vars.x(j, i));
            for k in (0..n).filter(|&k| k != i && k != j) {
                expr.add_term(vars.inter(k, i), -1.0);
                expr.add_term(vars.inter(i, k), -1.0);
            }
            model.add_constraint(
                "vi_x_i",
                format!("vi_x_i({},{})", bounds.ship_label(i), bounds.ship_label(j)),
                expr,
                Sense::Le,
                0.0,
            );
        }
    }

    // Ships preceding `i` occupy at least their area of the quay before it
    // starts.
    let b = n_berths as f64;
    for i in 0..n {
        let mut expr = LinExpr::new().term(vars.s[i], b);
        let mut any = false;
        for j in (0..n).filter(|&j| j != i) {
            let area = (bounds.processing(j) * bounds.footprint(j) as i64) as f64;
            if area > 0.0 {
                expr.add_term(vars.x(j, i), -area);
                any = true;
            }
        }
        if any {
            model.add_constraint(
                "vi_s_x_1",
                format!("vi_s_x_1({})", bounds.ship_label(i)),
                expr,
                Sense::Ge,
                b * min_arrival,
            );
        }
    }

    // At most `k` ships wider than `B / (k + 1)` moor side by side.
    for i in 0..n {
        for k in 1..=3usize {
            let mut expr = LinExpr::from(vars.s[i]);
            let mut any = false;
            for j in (0..n).filter(|&j| j != i && (k + 1) * bounds.footprint(j) > n_berths) {
                let p = bounds.processing(j) as f64;
                if p > 0.0 {
                    expr.add_term(vars.x(j, i), -p / k as f64);
                    any = true;
                }
            }
            if any {
                model.add_constraint(
                    "vi_s_x_2",
                    format!("vi_s_x_2({},{})", bounds.ship_label(i), k),
                    expr,
                    Sense::Ge,
                    min_arrival,
                );
            }
        }
    }

    // Offsets are left justified against the ships to the left.
    for i in 0..n {
        let mut expr = LinExpr::from(vars.y[i]);
        for j in (0..n).filter(|&j| j != i) {
            expr.add_term(vars.inter(j, i), -(bounds.footprint(j) as f64));
        }
        model.add_constraint(
            "vi_y_i",
            format!("vi_y_i({})", bounds.ship_label(i)),
            expr,
            Sense::Le,
            0.0,
        );
    }
}

pub(crate) fn load_core_warm_start(
    model: &mut MilpModel,
    vars: &SequencingVars,
    instance: &Instance,
    solution: &SolutionRecord,
    mode: WarmStartMode,
) -> WarmStartReport {
    let mut report = WarmStartReport::default();
    for target in warm_start::resolve_targets(instance, solution, &mut report) {
        let assignments = [
            (vars.start(target.index), target.start as f64),
            (vars.berth(target.index), target.berth as f64),
        ];
        report.record(warm_start::apply_all(model, &assignments, mode));
    }
    report
}

pub(crate) fn extract_core(
    vars: &SequencingVars,
    bounds: &Bounds,
    instance: &Instance,
    values: &[f64],
) -> Result<Vec<ShipMooring>, SolverError> {
    (0..bounds.n_ships())
        .map(|i| {
            let id = bounds.ship_id(i);
            let start = read_integer(values, vars.start(i), id)?;
            let berth = read_integer(values, vars.berth(i), id)?;
            let berth = usize::try_from(berth)
                .map_err(|_| ExtractionError::new(id, format!("negative berth {}", berth)))?;
            Ok(mooring(instance, bounds, i, start, berth)?)
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Sequencing {
    config: FormulationConfig,
}

impl Sequencing {
    #[inline]
    pub fn new(config: FormulationConfig) -> Self {
        Self { config }
    }
}

impl Formulation for Sequencing {
    type Vars = SequencingVars;

    fn kind(&self) -> FormulationKind {
        FormulationKind::Sequencing
    }

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError> {
        let bounds = Bounds::new(instance, &self.config)?;
        let mut model = MilpModel::new(format!("{}-s", instance.basename()));
        let vars = build_core(
            &mut model,
            &bounds,
            self.config.symmetry_breaking,
            self.config.valid_inequalities_or(true),
        );
        let makespan = add_makespan(&mut model, &bounds, vars.completions());
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
        let report = load_core_warm_start(&mut built.model, &built.vars, instance, solution, mode);
        warm_start::log_report(self.kind().long_name(), &report);
        report
    }

    fn extract(
        &self,
        built: &Built<Self::Vars>,
        instance: &Instance,
        values: &[f64],
    ) -> Result<Vec<ShipMooring>, SolverError> {
        extract_core(&built.vars, &built.bounds, instance, values)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::formulation::test_support::{assert_valid, distinct, params, solve_optimal, tiny};
    use berth_milp_model::instance::builder::InstanceBuilder;

    /// Ships 0 and 1 are interchangeable and share the quay, ship 2 needs
    /// all of it. Optimal makespan 3.
    pub(crate) fn twins() -> Instance {
        InstanceBuilder::new()
            .with_name("twins.txt")
            .with_uniform_berths(2, 1.0)
            .with_periods(10)
            .with_ship(0, 0, 2, 1.0)
            .with_ship(1, 0, 2, 1.0)
            .with_ship(2, 1, 2, 2.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_symmetry_rows_only_for_interchangeable_ships() {
        let built = Sequencing::default().build(&twins()).unwrap();
        let counts = built.model.family_counts();
        assert_eq!(counts["symmetric_c"], 1);
        assert_eq!(counts["symmetric_x"], 1);
        assert_eq!(counts["vi_x_i"], 2);
        assert_eq!(counts["one_relation"], 3);
        assert_eq!(counts["link_sc_x"], 6);

        let built = Sequencing::default().build(&distinct()).unwrap();
        assert!(!built.model.family_counts().contains_key("symmetric_c"));
    }

    #[test]
    fn test_incompatible_pairs() {
        let built = Sequencing::default().build(&twins()).unwrap();
        // ship 2 is as wide as the quay, so nobody stands beside it
        assert_eq!(built.model.family_counts()["incompatible_i"], 3);
    }

    #[test]
    fn test_toggles_remove_families() {
        let mut config = FormulationConfig::default();
        config.symmetry_breaking = false;
        config.valid_inequalities = Some(false);
        let built = Sequencing::new(config).build(&twins()).unwrap();
        let families = built.model.families();
        for gone in [
            "symmetric_c",
            "symmetric_x",
            "incompatible_i",
            "vi_x_i",
            "vi_s_x_1",
            "vi_s_x_2",
            "vi_y_i",
        ] {
            assert!(!families.contains(&gone), "{} still present", gone);
        }
        assert_eq!(
            families,
            vec!["set_c", "one_relation", "link_sc_x", "link_y_i", "set_makespan"]
        );
    }

    #[test]
    fn test_solves_tiny_to_known_optimum() {
        let inst = tiny();
        let (makespan, ships) = solve_optimal(&Sequencing::default(), &inst);
        assert!((makespan - 4.0).abs() < 1e-6);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_symmetry_breaking_keeps_optimum() {
        let inst = twins();
        let (with, ships) = solve_optimal(&Sequencing::default(), &inst);
        let mut config = FormulationConfig::default();
        config.symmetry_breaking = false;
        config.valid_inequalities = Some(false);
        let (without, _) = solve_optimal(&Sequencing::new(config), &inst);
        assert!((with - 3.0).abs() < 1e-6);
        assert!((without - 3.0).abs() < 1e-6);
        let c0 = ships[0].completion_time;
        let c1 = ships[1].completion_time;
        assert!(c0 <= c1);
        assert_valid(&inst, ships);
    }

    #[test]
    fn test_fixed_warm_start_reproduces_schedule() {
        let inst = distinct();
        let f = Sequencing::default();
        let (_, ships) = solve_optimal(&f, &inst);
        let record = SolutionRecord::with_schedule(0.0, 0.0, 0.0, 0.0, ships.clone());

        let mut built = f.build(&inst).unwrap();
        let report = f.load_warm_start(&mut built, &inst, &record, WarmStartMode::Fix);
        assert_eq!(report.applied, inst.n_ships());
        let s0 = built.model.var(built.vars.start(0));
        assert_eq!(s0.lower, s0.upper);

        let out = crate::engine::MilpEngine::solve(
            &crate::engine::highs::HighsEngine,
            &built.model,
            &params(),
        )
        .unwrap();
        assert_eq!(f.extract(&built, &inst, &out.values).unwrap(), ships);
    }
}
