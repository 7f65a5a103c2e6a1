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

pub mod highs;

use crate::{config::EngineParams, milp::MilpModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tolerance used to decide whether an engine answer satisfies the model.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineStatus {
    Optimal,
    TimeLimitWithIncumbent,
    TimeLimitWithoutIncumbent,
    Infeasible,
}

impl EngineStatus {
    #[inline]
    pub fn has_incumbent(self) -> bool {
        matches!(
            self,
            EngineStatus::Optimal | EngineStatus::TimeLimitWithIncumbent
        )
    }
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineStatus::Optimal => write!(f, "optimal"),
            EngineStatus::TimeLimitWithIncumbent => write!(f, "time limit (incumbent)"),
            EngineStatus::TimeLimitWithoutIncumbent => write!(f, "time limit (no incumbent)"),
            EngineStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// What an engine reports back. `values` is indexed by
/// [`VarId::index`](crate::milp::VarId::index) and is empty when there is no
/// incumbent.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub status: EngineStatus,
    pub values: Vec<f64>,
    pub objective: Option<f64>,
    pub bound: Option<f64>,
    pub runtime: Duration,
}

impl EngineOutcome {
    #[inline]
    pub fn without_point(status: EngineStatus, runtime: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            bound: None,
            runtime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    engine: String,
    message: String,
}

impl EngineError {
    #[inline]
    pub fn new(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn engine(&self) -> &str {
        &self.engine
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.engine, self.message)
    }
}

impl std::error::Error for EngineError {}

pub trait MilpEngine {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel, params: &EngineParams) -> Result<EngineOutcome, EngineError>;
}

impl<E: MilpEngine + ?Sized> MilpEngine for &E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &MilpModel, params: &EngineParams) -> Result<EngineOutcome, EngineError> {
        (**self).solve(model, params)
    }
}
