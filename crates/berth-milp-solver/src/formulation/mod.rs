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

pub mod bounds;
pub mod position_assignment;
pub mod relative_position;
pub mod sequencing;
pub mod time_indexed;

use crate::{
    err::SolverError,
    formulation::bounds::Bounds,
    milp::{LinExpr, MilpModel, Sense, VarId},
    warm_start::{WarmStartMode, WarmStartReport},
};
use berth_milp_model::{
    instance::Instance,
    solution::{ShipMooring, SolutionRecord},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormulationKind {
    PositionAssignment,
    RelativePosition,
    Sequencing,
    TimeIndexed,
}

impl FormulationKind {
    pub const ALL: [FormulationKind; 4] = [
        FormulationKind::PositionAssignment,
        FormulationKind::RelativePosition,
        FormulationKind::Sequencing,
        FormulationKind::TimeIndexed,
    ];

    /// Tag used in output file names.
    #[inline]
    pub fn short_name(self) -> &'static str {
        match self {
            FormulationKind::PositionAssignment => "pa",
            FormulationKind::RelativePosition => "rp",
            FormulationKind::Sequencing => "s",
            FormulationKind::TimeIndexed => "ti",
        }
    }

    #[inline]
    pub fn long_name(self) -> &'static str {
        match self {
            FormulationKind::PositionAssignment => "position-assignment",
            FormulationKind::RelativePosition => "relative-position",
            FormulationKind::Sequencing => "sequencing",
            FormulationKind::TimeIndexed => "time-indexed",
        }
    }
}

impl std::fmt::Display for FormulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownFormulationError {
    name: String,
}

impl UnknownFormulationError {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UnknownFormulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unknown formulation `{}` (expected pa, rp, s or ti)",
            self.name
        )
    }
}

impl std::error::Error for UnknownFormulationError {}

impl std::str::FromStr for FormulationKind {
    type Err = UnknownFormulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        FormulationKind::ALL
            .into_iter()
            .find(|k| key == k.short_name() || key == k.long_name())
            .ok_or(UnknownFormulationError {
                name: s.to_string(),
            })
    }
}

/// A formulation instantiated for one instance.
#[derive(Debug, Clone)]
pub struct Built<V> {
    pub model: MilpModel,
    pub vars: V,
    pub bounds: Bounds,
    pub makespan: VarId,
}

/// One way of writing the berth allocation problem as a MILP.
pub trait Formulation {
    type Vars;

    fn kind(&self) -> FormulationKind;

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError>;

    /// Transfers a recorded schedule onto the model, either as hints or by
    /// fixing variables. Entries that do not map onto an existing variable
    /// are skipped.
    fn load_warm_start(
        &self,
        built: &mut Built<Self::Vars>,
        instance: &Instance,
        solution: &SolutionRecord,
        mode: WarmStartMode,
    ) -> WarmStartReport;

    /// Reads the schedule out of a point that is feasible for `built.model`.
    fn extract(
        &self,
        built: &Built<Self::Vars>,
        instance: &Instance,
        values: &[f64],
    ) -> Result<Vec<ShipMooring>, SolverError>;
}

impl<F: Formulation + ?Sized> Formulation for &F {
    type Vars = F::Vars;

    fn kind(&self) -> FormulationKind {
        (**self).kind()
    }

    fn build(&self, instance: &Instance) -> Result<Built<Self::Vars>, SolverError> {
        (**self).build(instance)
    }

    fn load_warm_start(
        &self,
        built: &mut Built<Self::Vars>,
        instance: &Instance,
        solution: &SolutionRecord,
        mode: WarmStartMode,
    ) -> WarmStartReport {
        (**self).load_warm_start(built, instance, solution, mode)
    }

    fn extract(
        &self,
        built: &Built<Self::Vars>,
        instance: &Instance,
        values: &[f64],
    ) -> Result<Vec<ShipMooring>, SolverError> {
        (**self).extract(built, instance, values)
    }
}

/// Adds the makespan variable, ties it above every completion and makes it
/// the objective.
pub(crate) fn add_makespan(model: &mut MilpModel, bounds: &Bounds, completions: &[VarId]) -> VarId {
    let makespan = model.continuous(
        "makespan",
        bounds.makespan_lb() as f64,
        bounds.makespan_ub() as f64,
    );
    for (i, &c) in completions.iter().enumerate() {
        model.add_constraint(
            "set_makespan",
            format!("set_makespan({})", bounds.ship_label(i)),
            LinExpr::from(makespan).term(c, -1.0),
            Sense::Ge,
            0.0,
        );
    }
    model.set_objective(LinExpr::from(makespan));
    makespan
}

/// Completion variables `c(i)` over `[a + p - 1, T - 1]`.
pub(crate) fn add_completions(model: &mut MilpModel, bounds: &Bounds) -> Vec<VarId> {
    (0..bounds.n_ships())
        .map(|i| {
            model.continuous(
                format!("c({})", bounds.ship_label(i)),
                bounds.completion_lb(i) as f64,
                bounds.completion_ub(i) as f64,
            )
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::{
        position_assignment::PositionAssignment,
        relative_position::RelativePosition,
        sequencing::Sequencing,
        test_support::{assert_valid, distinct, solve_optimal},
        time_indexed::TimeIndexed,
    };

    #[test]
    fn test_kind_parsing() {
        assert_eq!("pa".parse::<FormulationKind>().unwrap(), FormulationKind::PositionAssignment);
        assert_eq!(
            "Relative_Position".parse::<FormulationKind>().unwrap(),
            FormulationKind::RelativePosition
        );
        assert_eq!("time indexed".parse::<FormulationKind>().unwrap(), FormulationKind::TimeIndexed);
        let err = "gantt".parse::<FormulationKind>().unwrap_err();
        assert_eq!(err.name(), "gantt");
        for kind in FormulationKind::ALL {
            assert_eq!(kind.to_string().parse::<FormulationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_formulations_agree_on_optimum() {
        let inst = distinct();
        let (pa, pa_ships) = solve_optimal(&PositionAssignment::default(), &inst);
        let (rp, rp_ships) = solve_optimal(&RelativePosition::default(), &inst);
        let (s, s_ships) = solve_optimal(&Sequencing::default(), &inst);
        let (ti, ti_ships) = solve_optimal(&TimeIndexed::default(), &inst);

        for value in [rp, s, ti] {
            assert!((pa - value).abs() < 1e-6, "{} vs {}", pa, value);
        }
        for ships in [pa_ships, rp_ships, s_ships, ti_ships] {
            assert_valid(&inst, ships);
        }
    }

    #[test]
    fn test_build_rejects_ship_wider_than_quay() {
        let inst = berth_milp_model::instance::builder::InstanceBuilder::new()
            .with_uniform_berths(2, 1.0)
            .with_periods(5)
            .with_ship(0, 0, 1, 2.5)
            .build()
            .unwrap();
        let err = Sequencing::default().build(&inst).unwrap_err();
        assert!(matches!(err, SolverError::ShipExceedsQuay(_)));
    }
}
