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
    engine::{EngineError, EngineOutcome, EngineStatus, FEASIBILITY_TOLERANCE, MilpEngine},
    milp::{MilpModel, Sense, VarKind},
};
use good_lp::solvers::WithInitialSolution;
use good_lp::solvers::highs::highs;
use good_lp::*;
use std::time::{Duration, Instant};

const INTEGRALITY_SNAP: f64 = 1e-5;

/// Runs models through HiGHS via `good_lp`.
///
/// HiGHS reports a time-limit stop as a successful solve, so the returned
/// point is checked against the model before it is trusted as an incumbent.
/// Optimality is assumed when the engine returns before the time limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsEngine;

impl HighsEngine {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl MilpEngine for HighsEngine {
    fn name(&self) -> &str {
        "HiGHS"
    }

    fn solve(&self, model: &MilpModel, params: &EngineParams) -> Result<EngineOutcome, EngineError> {
        let started = Instant::now();

        let mut vars = variables!();
        let handles: Vec<Variable> = model
            .vars()
            .iter()
            .map(|def| {
                let mut v = variable().name(def.name.clone());
                v = match def.kind {
                    VarKind::Binary => v.binary(),
                    VarKind::Integer => v.integer(),
                    VarKind::Continuous => v,
                };
                if def.lower.is_finite() {
                    v = v.min(def.lower);
                }
                if def.upper.is_finite() {
                    v = v.max(def.upper);
                }
                vars.add(v)
            })
            .collect();

        let objective = model
            .objective()
            .terms()
            .iter()
            .fold(Expression::from(model.objective().constant_part()), |acc, (v, c)| {
                acc + *c * handles[v.index()]
            });

        let time_limit = params.time_limit.as_secs_f64();
        let mut prob = vars
            .minimise(objective)
            .using(highs)
            .set_option("threads", params.threads.max(1) as i32)
            .set_option("random_seed", params.random_seed as i32)
            .with_time_limit(time_limit);
        prob.set_verbose(params.verbose);

        let hints: Vec<(Variable, f64)> = model
            .vars()
            .iter()
            .zip(&handles)
            .filter_map(|(def, h)| def.hint.map(|value| (*h, value)))
            .collect();
        if !hints.is_empty() {
            prob = prob.with_initial_solution(hints);
        }

        for c in model.constraints() {
            let lhs = c
                .terms()
                .iter()
                .fold(Expression::from(0.0), |acc, (v, coef)| acc + *coef * handles[v.index()]);
            match c.sense() {
                Sense::Le => prob.add_constraint(lhs.leq(c.rhs())),
                Sense::Ge => prob.add_constraint(lhs.geq(c.rhs())),
                Sense::Eq => prob.add_constraint(lhs.eq(c.rhs())),
            };
        }

        let result = prob.solve();
        let runtime = started.elapsed();
        let timed_out = runtime + Duration::from_millis(50) >= params.time_limit;

        match result {
            Ok(sol) => {
                let values: Vec<f64> = model
                    .vars()
                    .iter()
                    .zip(&handles)
                    .map(|(def, h)| snap(def.is_integral(), sol.value(*h)))
                    .collect();
                if model.is_feasible_point(&values, FEASIBILITY_TOLERANCE) {
                    let objective = model.objective_value(&values);
                    let (status, bound) = if timed_out {
                        (EngineStatus::TimeLimitWithIncumbent, None)
                    } else {
                        (EngineStatus::Optimal, Some(objective))
                    };
                    Ok(EngineOutcome {
                        status,
                        values,
                        objective: Some(objective),
                        bound,
                        runtime,
                    })
                } else {
                    if !timed_out {
                        tracing::warn!(
                            "{} stopped before the time limit without a usable point",
                            self.name()
                        );
                    }
                    Ok(EngineOutcome::without_point(
                        EngineStatus::TimeLimitWithoutIncumbent,
                        runtime,
                    ))
                }
            }
            Err(ResolutionError::Infeasible) => Ok(EngineOutcome::without_point(
                EngineStatus::Infeasible,
                runtime,
            )),
            Err(e) if timed_out => {
                tracing::debug!("{} hit the time limit: {}", self.name(), e);
                Ok(EngineOutcome::without_point(
                    EngineStatus::TimeLimitWithoutIncumbent,
                    runtime,
                ))
            }
            Err(e) => Err(EngineError::new(self.name(), e.to_string())),
        }
    }
}

/// Rounds integer values HiGHS left within its feasibility tolerance.
#[inline]
fn snap(integral: bool, value: f64) -> f64 {
    if integral && (value - value.round()).abs() <= INTEGRALITY_SNAP {
        value.round()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::LinExpr;

    fn params() -> EngineParams {
        EngineParams::default().with_time_limit(Duration::from_secs(30))
    }

    #[test]
    fn test_solves_small_knapsack_to_optimality() {
        // min -(3a + 2b + 2c) s.t. 2a + b + c <= 2
        let mut m = MilpModel::new("knapsack");
        let a = m.binary("a");
        let b = m.binary("b");
        let c = m.binary("c");
        m.add_constraint(
            "cap",
            "cap",
            LinExpr::new().term(a, 2.0).term(b, 1.0).term(c, 1.0),
            Sense::Le,
            2.0,
        );
        m.set_objective(LinExpr::new().term(a, -3.0).term(b, -2.0).term(c, -2.0));

        let out = HighsEngine.solve(&m, &params()).unwrap();
        assert_eq!(out.status, EngineStatus::Optimal);
        let obj = out.objective.unwrap();
        assert!((obj + 4.0).abs() < 1e-6);
        assert_eq!(out.bound, out.objective);
        assert!(out.values[b.index()] > 0.5 && out.values[c.index()] > 0.5);
    }

    #[test]
    fn test_reports_infeasible_models() {
        let mut m = MilpModel::new("bad");
        let x = m.integer("x", 0.0, 3.0);
        m.add_constraint("lo", "lo", LinExpr::from(x), Sense::Ge, 5.0);
        m.set_objective(LinExpr::from(x));

        let out = HighsEngine.solve(&m, &params()).unwrap();
        assert_eq!(out.status, EngineStatus::Infeasible);
        assert!(out.values.is_empty());
    }

    #[test]
    fn test_respects_fixed_bounds_and_hints() {
        let mut m = MilpModel::new("fixed");
        let x = m.integer("x", 0.0, 10.0);
        let y = m.integer("y", 0.0, 10.0);
        m.add_constraint("sum", "sum", LinExpr::from(x).term(y, 1.0), Sense::Ge, 6.0);
        m.set_objective(LinExpr::from(x).term(y, 1.0));
        m.fix(x, 5.0);
        m.set_hint(y, 1.0);

        let out = HighsEngine.solve(&m, &params()).unwrap();
        assert_eq!(out.status, EngineStatus::Optimal);
        assert_eq!(out.values[x.index()].round(), 5.0);
        assert_eq!(out.values[y.index()].round(), 1.0);
    }
}
