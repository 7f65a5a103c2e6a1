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

use crate::milp::{MilpModel, VarId};
use berth_milp_model::{common::ShipIdentifier, instance::Instance, solution::SolutionRecord};
use serde::{Deserialize, Serialize};

const WARM_START_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WarmStartMode {
    /// Initial values the engine may move away from.
    #[default]
    Hint,
    /// Lower and upper bounds collapse onto the recorded values.
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WarmStartReport {
    pub applied: usize,
    pub skipped: usize,
}

impl WarmStartReport {
    #[inline]
    pub fn record(&mut self, applied: bool) {
        if applied {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

impl std::fmt::Display for WarmStartReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} applied, {} skipped", self.applied, self.skipped)
    }
}

/// A recorded mooring translated onto the instance: ship position in
/// [`Instance::ships`], start period and leftmost berth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MooringTarget {
    pub index: usize,
    pub start: i64,
    pub berth: usize,
}

/// Maps every recorded mooring onto the instance. Unknown ships and
/// positions off the quay count as skipped.
pub fn resolve_targets(
    instance: &Instance,
    solution: &SolutionRecord,
    report: &mut WarmStartReport,
) -> Vec<MooringTarget> {
    let mut targets = Vec::with_capacity(solution.moorings().len());
    for m in solution.moorings() {
        let id = ShipIdentifier::new(m.data_ship_id);
        let Some(index) = instance.index_of(id) else {
            tracing::debug!("Warm start mentions {} which is not in the instance", id);
            report.record(false);
            continue;
        };
        match instance.rightmost_berth_containing_position(m.mooring_position) {
            Ok(berth) => targets.push(MooringTarget {
                index,
                start: m.mooring_time,
                berth,
            }),
            Err(e) => {
                tracing::debug!("Warm start entry for {} ignored: {}", id, e);
                report.record(false);
            }
        }
    }
    targets
}

/// Applies all assignments or none of them. Returns `false` when some value
/// lies outside the variable's domain.
pub fn apply_all(model: &mut MilpModel, assignments: &[(VarId, f64)], mode: WarmStartMode) -> bool {
    if !assignments
        .iter()
        .all(|(v, value)| model.var(*v).admits(*value, WARM_START_TOLERANCE))
    {
        return false;
    }
    for &(v, value) in assignments {
        match mode {
            WarmStartMode::Hint => model.set_hint(v, value),
            WarmStartMode::Fix => model.fix(v, value),
        }
    }
    true
}

pub(crate) fn log_report(kind: &str, report: &WarmStartReport) {
    if report.skipped > 0 {
        tracing::warn!("Warm start for {} model: {}", kind, report);
    } else {
        tracing::info!("Warm start for {} model: {}", kind, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_milp_model::{instance::builder::InstanceBuilder, solution::ShipMooring};

    fn mooring(id: usize, t: i64, pos: f64) -> ShipMooring {
        ShipMooring {
            data_ship_id: id,
            data_arrival_time: 0,
            data_handling_time: 1,
            data_ship_length: 0.25,
            data_ship_length_in_berths: 1,
            mooring_time: t,
            completion_time: t,
            mooring_position: pos,
            mooring_berth: 0,
        }
    }

    #[test]
    fn test_resolve_uses_position_not_recorded_berth() {
        let inst = InstanceBuilder::new()
            .with_uniform_berths(4, 0.25)
            .with_ship(0, 0, 1, 0.25)
            .with_ship(1, 0, 1, 0.25)
            .build()
            .unwrap();
        let rec = SolutionRecord::with_schedule(
            0.0,
            0.0,
            0.0,
            0.0,
            vec![mooring(1, 3, 0.5), mooring(7, 0, 0.0), mooring(0, 2, 4.0)],
        );
        let mut report = WarmStartReport::default();
        let targets = resolve_targets(&inst, &rec, &mut report);
        assert_eq!(
            targets,
            vec![MooringTarget {
                index: 1,
                start: 3,
                berth: 2
            }]
        );
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_apply_all_is_atomic() {
        let mut m = MilpModel::new("t");
        let s = m.integer("s", 0.0, 5.0);
        let y = m.integer("y", 0.0, 2.0);
        assert!(!apply_all(&mut m, &[(s, 3.0), (y, 4.0)], WarmStartMode::Fix));
        assert!(!m.var(s).is_fixed());

        assert!(apply_all(&mut m, &[(s, 3.0), (y, 1.0)], WarmStartMode::Fix));
        assert!(m.var(s).is_fixed() && m.var(y).is_fixed());

        let z = m.binary("z");
        assert!(apply_all(&mut m, &[(z, 1.0)], WarmStartMode::Hint));
        assert_eq!(m.var(z).hint, Some(1.0));
        assert!(!m.var(z).is_fixed());
    }
}
