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

pub mod config;
pub mod diagnose;
pub mod engine;
pub mod err;
pub mod extract;
pub mod formulation;
pub mod milp;
pub mod runner;
pub mod warm_start;

pub mod prelude {
    pub use crate::config::{BigMPolicy, EngineParams, FormulationConfig, RunnerConfig};
    pub use crate::diagnose::{Diagnosis, InfeasibilityDiagnoser};
    pub use crate::engine::{
        EngineError, EngineOutcome, EngineStatus, MilpEngine, highs::HighsEngine,
    };
    pub use crate::err::SolverError;
    pub use crate::extract::{extract_record, results_file_name};
    pub use crate::formulation::{
        Built, Formulation, FormulationKind, bounds::Bounds,
        position_assignment::PositionAssignment, relative_position::RelativePosition,
        sequencing::Sequencing, time_indexed::TimeIndexed,
    };
    pub use crate::milp::{
        LinExpr, LinearConstraint, MilpModel, Sense, VarDef, VarId, VarKind, lp_format::write_lp,
    };
    pub use crate::runner::{DiagnosisReport, SolveReport, SolveRunner};
    pub use crate::warm_start::{WarmStartMode, WarmStartReport};
}
