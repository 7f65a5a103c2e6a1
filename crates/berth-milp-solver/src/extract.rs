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
    engine::{EngineOutcome, EngineStatus},
    err::{ExtractionError, SolverError},
    formulation::{Built, Formulation, FormulationKind, bounds::Bounds},
    milp::VarId,
};
use berth_milp_model::{
    common::ShipIdentifier,
    instance::Instance,
    solution::{ShipMooring, SolutionRecord},
};
use num_traits::ToPrimitive;
use std::time::Duration;

/// `results-<instance stem>-<tag>solver.json`
#[inline]
pub fn results_file_name(instance: &Instance, kind: FormulationKind) -> String {
    format!(
        "results-{}-{}solver.json",
        instance.basename(),
        kind.short_name()
    )
}

/// Rounds the value of an integral variable.
pub(crate) fn read_integer(
    values: &[f64],
    var: VarId,
    ship: ShipIdentifier,
) -> Result<i64, ExtractionError> {
    let raw = values
        .get(var.index())
        .copied()
        .ok_or_else(|| ExtractionError::new(ship, format!("no value for {}", var)))?;
    raw.round()
        .to_i64()
        .ok_or_else(|| ExtractionError::new(ship, format!("value {} is not an integer", raw)))
}

pub(crate) fn mooring(
    instance: &Instance,
    bounds: &Bounds,
    index: usize,
    start: i64,
    berth: usize,
) -> Result<ShipMooring, ExtractionError> {
    let ship = &instance.ships()[index];
    if berth >= instance.n_berths() {
        return Err(ExtractionError::new(
            ship.id(),
            format!("berth {} does not exist", berth),
        ));
    }
    Ok(ShipMooring {
        data_ship_id: ship.id().into_inner(),
        data_arrival_time: ship.arrival_time(),
        data_handling_time: ship.processing_time(),
        data_ship_length: ship.length(),
        data_ship_length_in_berths: bounds.footprint(index),
        mooring_time: start,
        completion_time: start + ship.processing_time() - 1,
        mooring_position: instance.berth_start(berth),
        mooring_berth: berth,
    })
}

/// Turns an engine outcome into the persisted record.
///
/// The dual bound is the engine's when it proved optimality and otherwise
/// the makespan lower bound derived from arrivals and processing times.
pub fn extract_record<F: Formulation>(
    formulation: &F,
    built: &Built<F::Vars>,
    instance: &Instance,
    outcome: &EngineOutcome,
    total_time: Duration,
) -> Result<SolutionRecord, SolverError> {
    let solve_time = outcome.runtime.as_secs_f64();
    let total_time = total_time.as_secs_f64();
    let fallback_bound = built.bounds.makespan_lb() as f64;

    match outcome.status {
        EngineStatus::Optimal | EngineStatus::TimeLimitWithIncumbent => {
            let ships = formulation.extract(built, instance, &outcome.values)?;
            let makespan = ships
                .iter()
                .map(|m| m.completion_time)
                .max()
                .map(|c| c as f64)
                .or(outcome.objective)
                .unwrap_or(fallback_bound);
            let bound = outcome.bound.unwrap_or(fallback_bound).min(makespan);
            Ok(SolutionRecord::with_schedule(
                makespan, bound, solve_time, total_time, ships,
            ))
        }
        EngineStatus::TimeLimitWithoutIncumbent => Ok(SolutionRecord::without_incumbent(
            Some(fallback_bound),
            solve_time,
            total_time,
        )),
        EngineStatus::Infeasible => Ok(SolutionRecord::infeasible(solve_time, total_time)),
    }
}
