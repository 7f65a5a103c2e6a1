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

use berth_milp_model::instance::horizon::HorizonPolicy;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// How big-M coefficients of disjunctive constraints are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BigMPolicy {
    /// Smallest value that keeps each relaxed row redundant, computed from
    /// the horizon, the quay and the ship involved.
    #[default]
    Derived,
    /// A single constant for every disjunctive row.
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormulationConfig {
    pub horizon: HorizonPolicy,
    pub big_m: BigMPolicy,
    /// `None` keeps the formulation's own default: on for sequencing, off
    /// for time-indexed.
    pub valid_inequalities: Option<bool>,
    pub symmetry_breaking: bool,
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            horizon: HorizonPolicy::default(),
            big_m: BigMPolicy::default(),
            valid_inequalities: None,
            symmetry_breaking: true,
        }
    }
}

impl FormulationConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn valid_inequalities_or(&self, default: bool) -> bool {
        self.valid_inequalities.unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    pub time_limit: Duration,
    pub threads: u32,
    pub random_seed: u32,
    pub verbose: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(3600),
            threads: 1,
            random_seed: 0,
            verbose: false,
        }
    }
}

impl EngineParams {
    #[inline]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub output_dir: PathBuf,
    pub engine: EngineParams,
    pub diagnose_infeasibility: bool,
    /// Time limit of each engine call made while isolating a conflict.
    pub probe_time_limit: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            engine: EngineParams::default(),
            diagnose_infeasibility: false,
            probe_time_limit: Duration::from_secs(10),
        }
    }
}
