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
    config::{BigMPolicy, FormulationConfig},
    err::{ShipExceedsQuayError, SolverError},
};
use berth_milp_model::{common::ShipIdentifier, instance::Instance};

/// Horizon, footprints, variable ranges and big-M values shared by every
/// formulation. Ships are addressed by their position in
/// [`Instance::ships`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    horizon: i64,
    n_berths: usize,
    ids: Vec<ShipIdentifier>,
    arrivals: Vec<i64>,
    processing: Vec<i64>,
    footprints: Vec<usize>,
    big_m: BigMPolicy,
}

impl Bounds {
    pub fn new(instance: &Instance, config: &FormulationConfig) -> Result<Self, SolverError> {
        let footprints = instance.berth_footprints()?;
        let n_berths = instance.n_berths();
        for (ship, &footprint) in instance.ships().iter().zip(&footprints) {
            if footprint > n_berths {
                return Err(ShipExceedsQuayError::new(ship.id(), footprint, n_berths).into());
            }
        }

        let nominal = instance.nominal_horizon(&config.horizon);
        let required = instance.required_horizon();
        if nominal < required {
            tracing::warn!(
                "Horizon of {} periods cannot host every ship of {}, widening to {}",
                nominal,
                instance.name(),
                required
            );
        }

        Ok(Self {
            horizon: nominal.max(required),
            n_berths,
            ids: instance.ship_ids().collect(),
            arrivals: instance.ships().iter().map(|s| s.arrival_time()).collect(),
            processing: instance
                .ships()
                .iter()
                .map(|s| s.processing_time())
                .collect(),
            footprints,
            big_m: config.big_m,
        })
    }

    /// Number of periods `T`; valid times are `0..T`.
    #[inline]
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    #[inline]
    pub fn n_berths(&self) -> usize {
        self.n_berths
    }

    #[inline]
    pub fn n_ships(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn ship_id(&self, i: usize) -> ShipIdentifier {
        self.ids[i]
    }

    /// Ship id as used in variable and row names.
    #[inline]
    pub fn ship_label(&self, i: usize) -> usize {
        self.ids[i].into_inner()
    }

    #[inline]
    pub fn arrival(&self, i: usize) -> i64 {
        self.arrivals[i]
    }

    #[inline]
    pub fn processing(&self, i: usize) -> i64 {
        self.processing[i]
    }

    #[inline]
    pub fn footprint(&self, i: usize) -> usize {
        self.footprints[i]
    }

    #[inline]
    pub fn min_arrival(&self) -> i64 {
        self.arrivals.iter().copied().min().unwrap_or(0)
    }

    #[inline]
    pub fn start_lb(&self, i: usize) -> i64 {
        self.arrivals[i]
    }

    /// Latest start that still fits the whole processing before the horizon.
    #[inline]
    pub fn start_ub(&self, i: usize) -> i64 {
        self.horizon - self.processing[i].max(1)
    }

    #[inline]
    pub fn completion_lb(&self, i: usize) -> i64 {
        self.arrivals[i] + self.processing[i] - 1
    }

    #[inline]
    pub fn completion_ub(&self, _i: usize) -> i64 {
        self.horizon - 1
    }

    /// Rightmost berth the ship may start on.
    #[inline]
    pub fn offset_ub(&self, i: usize) -> usize {
        self.n_berths - self.footprints[i]
    }

    #[inline]
    pub fn start_range(&self, i: usize) -> std::ops::RangeInclusive<i64> {
        self.start_lb(i)..=self.start_ub(i)
    }

    #[inline]
    pub fn makespan_lb(&self) -> i64 {
        (0..self.n_ships())
            .map(|i| self.completion_lb(i))
            .max()
            .unwrap_or(0)
            .max(0)
    }

    #[inline]
    pub fn makespan_ub(&self) -> i64 {
        self.horizon - 1
    }

    /// Big-M of "ship `i` ends before ship `j` starts": `T - a_j`.
    #[inline]
    pub fn time_big_m(&self, j: usize) -> f64 {
        match self.big_m {
            BigMPolicy::Derived => (self.horizon - self.arrivals[j]) as f64,
            BigMPolicy::Constant(m) => m,
        }
    }

    /// Big-M of "ship `i` lies left of ship `j`": the berth count.
    #[inline]
    pub fn space_big_m(&self) -> f64 {
        match self.big_m {
            BigMPolicy::Derived => self.n_berths as f64,
            BigMPolicy::Constant(m) => m,
        }
    }

    /// Big-M linking a start indicator to the cells it covers: `p_i · L_i`.
    #[inline]
    pub fn link_big_m(&self, i: usize) -> f64 {
        match self.big_m {
            BigMPolicy::Derived => (self.processing[i] * self.footprints[i] as i64) as f64,
            BigMPolicy::Constant(m) => m,
        }
    }
}
