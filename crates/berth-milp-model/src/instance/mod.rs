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

pub mod builder;
pub mod err;
pub mod horizon;
pub mod loader;
pub mod writer;

use crate::{
    common::ShipIdentifier,
    instance::{
        err::{
            InstanceError, InvalidGranularityError, MalformedInstanceError, NonUniformBerthsError,
            PositionOutsideQuayError, UnknownShipError,
        },
        horizon::HorizonPolicy,
    },
};
use std::collections::{BTreeSet, HashSet};

/// Tolerance used when comparing quay positions and lengths.
pub const LENGTH_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    id: ShipIdentifier,
    arrival_time: i64,
    processing_time: i64,
    length: f64,
}

impl Ship {
    #[inline]
    pub fn new(id: ShipIdentifier, arrival_time: i64, processing_time: i64, length: f64) -> Self {
        Self {
            id,
            arrival_time,
            processing_time,
            length,
        }
    }

    #[inline]
    pub fn id(&self) -> ShipIdentifier {
        self.id
    }

    /// Earliest period in which processing may begin.
    #[inline]
    pub fn arrival_time(&self) -> i64 {
        self.arrival_time
    }

    #[inline]
    pub fn processing_time(&self) -> i64 {
        self.processing_time
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Last occupied period when the ship starts on arrival.
    #[inline]
    pub fn earliest_completion(&self) -> i64 {
        self.arrival_time + self.processing_time - 1
    }

    /// Number of periods needed from time zero until the ship can be done.
    /// Zero-duration ships still need one period to be placed in.
    #[inline]
    pub fn release(&self) -> i64 {
        self.arrival_time + self.processing_time.max(1)
    }
}

/// Rounding direction used when coarsening the time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discretization {
    /// Arrivals and durations round up, the horizon rounds down. No ship can
    /// start earlier or finish sooner than it truly could.
    Conservative,
    /// Arrivals and durations round down, the horizon rounds up. Yields a
    /// relaxation of the original instance.
    Aggressive,
}

impl std::fmt::Display for Discretization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discretization::Conservative => write!(f, "conservative"),
            Discretization::Aggressive => write!(f, "aggressive"),
        }
    }
}

#[inline]
fn floor_div(value: i64, granularity: i64) -> i64 {
    value.div_euclid(granularity)
}

#[inline]
fn ceil_div(value: i64, granularity: i64) -> i64 {
    let q = value.div_euclid(granularity);
    if value.rem_euclid(granularity) == 0 {
        q
    } else {
        q + 1
    }
}

/// A berth allocation instance: ships waiting to be moored along a linear
/// quay that is split into berths placed left to right without gaps.
///
/// Instances are immutable. Reduction and discretization return new
/// instances and leave the source untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    ships: Vec<Ship>,
    berth_lengths: Vec<f64>,
    berth_starts: Vec<f64>,
    quay_length: f64,
    n_periods: Option<i64>,
}

impl Instance {
    /// Creates an instance. When `quay_length` is `None` it is the sum of the
    /// berth lengths.
    pub fn new(
        name: impl Into<String>,
        ships: Vec<Ship>,
        berth_lengths: Vec<f64>,
        quay_length: Option<f64>,
        n_periods: Option<i64>,
    ) -> Result<Self, InstanceError> {
        if berth_lengths.is_empty() {
            return Err(MalformedInstanceError::new(None, "an instance needs at least one berth").into());
        }
        if let Some(j) = berth_lengths
            .iter()
            .position(|l| !l.is_finite() || *l <= 0.0)
        {
            return Err(MalformedInstanceError::new(
                None,
                format!("berth {} has non-positive length {}", j, berth_lengths[j]),
            )
            .into());
        }

        let mut seen = HashSet::with_capacity(ships.len());
        for ship in &ships {
            if !seen.insert(ship.id()) {
                return Err(MalformedInstanceError::new(
                    None,
                    format!("{} appears more than once", ship.id()),
                )
                .into());
            }
            if ship.arrival_time() < 0 || ship.processing_time() < 0 {
                return Err(MalformedInstanceError::new(
                    None,
                    format!("{} has a negative arrival or processing time", ship.id()),
                )
                .into());
            }
            if !ship.length().is_finite() || ship.length() <= 0.0 {
                return Err(MalformedInstanceError::new(
                    None,
                    format!("{} has non-positive length {}", ship.id(), ship.length()),
                )
                .into());
            }
        }

        if let Some(n) = n_periods.filter(|n| *n < 0) {
            return Err(MalformedInstanceError::new(None, format!("negative horizon {}", n)).into());
        }

        let mut berth_starts = Vec::with_capacity(berth_lengths.len() + 1);
        let mut acc = 0.0;
        berth_starts.push(acc);
        for l in &berth_lengths {
            acc += l;
            berth_starts.push(acc);
        }

        let quay_length = quay_length.unwrap_or(acc);
        if !quay_length.is_finite() || quay_length <= 0.0 {
            return Err(
                MalformedInstanceError::new(None, format!("invalid quay length {}", quay_length)).into(),
            );
        }

        Ok(Self {
            name: name.into(),
            ships,
            berth_lengths,
            berth_starts,
            quay_length,
            n_periods,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File stem of the instance name, used to label output files.
    pub fn basename(&self) -> String {
        let stem = std::path::Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name);
        stem.to_string()
    }

    #[inline]
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    #[inline]
    pub fn ship(&self, index: usize) -> Option<&Ship> {
        self.ships.get(index)
    }

    #[inline]
    pub fn n_ships(&self) -> usize {
        self.ships.len()
    }

    #[inline]
    pub fn ship_ids(&self) -> impl Iterator<Item = ShipIdentifier> + '_ {
        self.ships.iter().map(Ship::id)
    }

    /// Position of the ship with the given id inside [`Instance::ships`].
    #[inline]
    pub fn index_of(&self, id: ShipIdentifier) -> Option<usize> {
        self.ships.iter().position(|s| s.id() == id)
    }

    #[inline]
    pub fn ship_by_id(&self, id: ShipIdentifier) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id() == id)
    }

    #[inline]
    pub fn n_berths(&self) -> usize {
        self.berth_lengths.len()
    }

    #[inline]
    pub fn berth_lengths(&self) -> &[f64] {
        &self.berth_lengths
    }

    #[inline]
    pub fn quay_length(&self) -> f64 {
        self.quay_length
    }

    /// Declared number of periods, `None` for an open horizon.
    #[inline]
    pub fn n_periods(&self) -> Option<i64> {
        self.n_periods
    }

    /// Periods `0..n_periods` when the horizon is bounded.
    #[inline]
    pub fn time_horizon(&self) -> Option<std::ops::Range<i64>> {
        self.n_periods.map(|n| 0..n)
    }

    /// Quay offset of the left end of `berth`.
    ///
    /// # Panics
    ///
    /// Panics if `berth > n_berths()`. `berth == n_berths()` yields the end
    /// of the last berth.
    #[inline]
    pub fn berth_start(&self, berth: usize) -> f64 {
        self.berth_starts[berth]
    }

    /// Greatest berth index whose start lies at or before `position`.
    pub fn rightmost_berth_containing_position(&self, position: f64) -> Result<usize, InstanceError> {
        let n = self.n_berths();
        let end = self.berth_starts[n];
        if !position.is_finite() || position < -LENGTH_EPSILON || position >= end - LENGTH_EPSILON {
            return Err(PositionOutsideQuayError::new(position, self.quay_length).into());
        }
        let after = self.berth_starts[..n].partition_point(|&s| s <= position + LENGTH_EPSILON);
        Ok(after.saturating_sub(1))
    }

    /// Common berth length, or `None` when berths differ in length.
    pub fn uniform_berth_length(&self) -> Option<f64> {
        self.validate_uniform_berths().ok()
    }

    /// Checks that every berth has the same length and returns it.
    pub fn validate_uniform_berths(&self) -> Result<f64, NonUniformBerthsError> {
        let reference = self.berth_lengths[0];
        for (j, &l) in self.berth_lengths.iter().enumerate().skip(1) {
            if (l - reference).abs() > LENGTH_EPSILON {
                return Err(NonUniformBerthsError::new(reference, j, l));
            }
        }
        Ok(reference)
    }

    /// Number of contiguous berths the ship at `index` occupies. Requires
    /// uniform berths.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn ship_length_in_n_berths(&self, index: usize) -> Result<usize, InstanceError> {
        let berth_length = self.validate_uniform_berths()?;
        Ok(footprint(self.ships[index].length(), berth_length))
    }

    /// Berth footprints of all ships, in ship order.
    pub fn berth_footprints(&self) -> Result<Vec<usize>, InstanceError> {
        let berth_length = self.validate_uniform_berths()?;
        Ok(self
            .ships
            .iter()
            .map(|s| footprint(s.length(), berth_length))
            .collect())
    }

    #[inline]
    pub fn min_arrival(&self) -> i64 {
        self.ships.iter().map(Ship::arrival_time).min().unwrap_or(0)
    }

    /// Smallest number of periods in which every ship can complete.
    #[inline]
    pub fn required_horizon(&self) -> i64 {
        self.ships.iter().map(Ship::release).max().unwrap_or(1)
    }

    /// Declared horizon or, for open horizons, the policy's guess.
    pub fn nominal_horizon(&self, policy: &HorizonPolicy) -> i64 {
        self.n_periods.unwrap_or_else(|| {
            let latest = self
                .ships
                .iter()
                .map(|s| s.arrival_time() + s.processing_time())
                .max()
                .unwrap_or(1);
            policy.open_horizon(latest)
        })
    }

    /// Horizon to build models with: the nominal horizon, widened so that
    /// `arrival + processing - 1 <= horizon - 1` holds for every ship.
    #[inline]
    pub fn planning_horizon(&self, policy: &HorizonPolicy) -> i64 {
        self.nominal_horizon(policy).max(self.required_horizon())
    }

    /// Restricts the instance to the given ships. Every id must already be
    /// present; ship order and ids are preserved.
    pub fn reduce<I>(&self, ids: I) -> Result<Instance, InstanceError>
    where
        I: IntoIterator<Item = ShipIdentifier>,
    {
        let mut keep = BTreeSet::new();
        for id in ids {
            if self.ship_by_id(id).is_none() {
                return Err(UnknownShipError::new(id).into());
            }
            keep.insert(id);
        }

        Ok(Instance {
            ships: self
                .ships
                .iter()
                .filter(|s| keep.contains(&s.id()))
                .cloned()
                .collect(),
            ..self.clone()
        })
    }

    /// Keeps the ships with ids `0..n_ships`.
    #[inline]
    pub fn truncate(&self, n_ships: usize) -> Result<Instance, InstanceError> {
        self.reduce((0..n_ships).map(ShipIdentifier::new))
    }

    /// Rescales every time quantity by `granularity` periods per new period.
    pub fn discretize(&self, granularity: i64, mode: Discretization) -> Result<Instance, InstanceError> {
        if granularity < 1 {
            return Err(InvalidGranularityError::new(granularity).into());
        }

        let (time, horizon): (fn(i64, i64) -> i64, fn(i64, i64) -> i64) = match mode {
            Discretization::Conservative => (ceil_div, floor_div),
            Discretization::Aggressive => (floor_div, ceil_div),
        };

        let ships = self
            .ships
            .iter()
            .map(|s| {
                Ship::new(
                    s.id(),
                    time(s.arrival_time(), granularity),
                    time(s.processing_time(), granularity),
                    s.length(),
                )
            })
            .collect();

        Ok(Instance {
            name: format!("{} - Granularity: {}", self.name, granularity),
            ships,
            berth_lengths: self.berth_lengths.clone(),
            berth_starts: self.berth_starts.clone(),
            quay_length: self.quay_length,
            n_periods: self.n_periods.map(|n| horizon(n, granularity)),
        })
    }
}

#[inline]
fn footprint(length: f64, berth_length: f64) -> usize {
    ((length / berth_length) - LENGTH_EPSILON).ceil().max(1.0) as usize
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "Number of ships: {}", self.n_ships())?;
        writeln!(f, "Number of berths: {}", self.n_berths())?;
        writeln!(f, "Quay length: {}", self.quay_length)?;
        if let Some(n) = self.n_periods {
            writeln!(f, "Number of periods: {}", n)?;
        }

        let uniform = self.uniform_berth_length();
        for ship in &self.ships {
            writeln!(f)?;
            writeln!(f, "=== {} ===", ship.id())?;
            writeln!(f, "\tArrival time = {}", ship.arrival_time())?;
            match uniform {
                Some(bl) => writeln!(
                    f,
                    "\tLength = {} ({} berths)",
                    ship.length(),
                    footprint(ship.length(), bl)
                )?,
                None => writeln!(f, "\tLength = {}", ship.length())?,
            }
            writeln!(f, "\tHandling time = {}", ship.processing_time())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::builder::InstanceBuilder;

    fn sid(n: usize) -> ShipIdentifier {
        ShipIdentifier::new(n)
    }

    fn sample() -> Instance {
        InstanceBuilder::new()
            .with_name("sample.txt")
            .with_uniform_berths(4, 0.25)
            .with_ship(0, 0, 5, 0.5)
            .with_ship(1, 3, 7, 0.25)
            .with_ship(2, 9, 4, 0.6)
            .with_ship(3, 10, 2, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_berth_starts_are_prefix_sums() {
        let inst = InstanceBuilder::new()
            .with_berth(1.0)
            .with_berth(2.0)
            .with_berth(0.5)
            .build()
            .unwrap();
        assert_eq!(inst.berth_start(0), 0.0);
        assert_eq!(inst.berth_start(1), 1.0);
        assert_eq!(inst.berth_start(2), 3.0);
        assert_eq!(inst.berth_start(3), 3.5);
        assert_eq!(inst.quay_length(), 3.5);
    }

    #[test]
    fn test_rightmost_berth_containing_position() {
        let inst = sample();
        assert_eq!(inst.rightmost_berth_containing_position(0.0).unwrap(), 0);
        assert_eq!(inst.rightmost_berth_containing_position(0.1).unwrap(), 0);
        assert_eq!(inst.rightmost_berth_containing_position(0.25).unwrap(), 1);
        assert_eq!(inst.rightmost_berth_containing_position(0.5).unwrap(), 2);
        assert_eq!(inst.rightmost_berth_containing_position(0.99).unwrap(), 3);
    }

    #[test]
    fn test_rightmost_berth_rejects_positions_beyond_quay() {
        let inst = sample();
        assert!(matches!(
            inst.rightmost_berth_containing_position(1.0),
            Err(InstanceError::PositionOutsideQuay(_))
        ));
        assert!(inst.rightmost_berth_containing_position(-0.5).is_err());
        assert!(inst.rightmost_berth_containing_position(f64::NAN).is_err());
    }

    #[test]
    fn test_ship_length_in_n_berths_rounds_up() {
        let inst = sample();
        assert_eq!(inst.ship_length_in_n_berths(0).unwrap(), 2);
        assert_eq!(inst.ship_length_in_n_berths(1).unwrap(), 1);
        assert_eq!(inst.ship_length_in_n_berths(2).unwrap(), 3);
        assert_eq!(inst.ship_length_in_n_berths(3).unwrap(), 4);
        assert_eq!(inst.berth_footprints().unwrap(), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_ship_length_in_n_berths_requires_uniform_berths() {
        let inst = InstanceBuilder::new()
            .with_berth(1.0)
            .with_berth(2.0)
            .with_ship(0, 0, 1, 1.5)
            .build()
            .unwrap();
        let err = inst.ship_length_in_n_berths(0).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(inst.uniform_berth_length().is_none());
    }

    #[test]
    fn test_reduce_keeps_ids_and_order() {
        let inst = sample();
        let r = inst.reduce([sid(3), sid(1)]).unwrap();
        assert_eq!(r.n_ships(), 2);
        let ids: Vec<_> = r.ship_ids().map(|i| i.into_inner()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(r.n_berths(), inst.n_berths());
        assert_eq!(inst.n_ships(), 4);
    }

    #[test]
    fn test_reduce_rejects_unknown_ids() {
        let inst = sample();
        let err = inst.reduce([sid(0), sid(42)]).unwrap_err();
        assert!(matches!(err, InstanceError::UnknownShip(e) if e.id() == sid(42)));
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let inst = sample();
        let subset = [sid(0), sid(2)];
        let once = inst.reduce(subset).unwrap();
        let twice = once.reduce(subset).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_truncate_equals_reduce_prefix() {
        let inst = sample();
        let t = inst.truncate(3).unwrap();
        let r = inst.reduce((0..3).map(sid)).unwrap();
        assert_eq!(t, r);
        assert!(inst.truncate(10).is_err());
    }

    #[test]
    fn test_conservative_discretization_never_gains_time() {
        let inst = sample().with_periods_for_test(50);
        let g = 4;
        let d = inst.discretize(g, Discretization::Conservative).unwrap();
        for (orig, new) in inst.ships().iter().zip(d.ships()) {
            assert!(new.arrival_time() * g >= orig.arrival_time());
            assert!(new.processing_time() * g >= orig.processing_time());
            assert_eq!(new.length(), orig.length());
        }
        assert_eq!(d.n_periods(), Some(12));
        assert!(d.name().ends_with("Granularity: 4"));
    }

    #[test]
    fn test_aggressive_discretization_never_loses_time() {
        let inst = sample().with_periods_for_test(50);
        let g = 4;
        let d = inst.discretize(g, Discretization::Aggressive).unwrap();
        for (orig, new) in inst.ships().iter().zip(d.ships()) {
            assert!(new.arrival_time() * g <= orig.arrival_time());
            assert!(new.processing_time() * g <= orig.processing_time());
        }
        assert_eq!(d.n_periods(), Some(13));
    }

    #[test]
    fn test_discretization_does_not_mutate_source() {
        let inst = sample();
        let before = inst.clone();
        let _ = inst.discretize(3, Discretization::Conservative).unwrap();
        assert_eq!(inst, before);
        assert!(matches!(
            inst.discretize(0, Discretization::Aggressive),
            Err(InstanceError::InvalidGranularity(_))
        ));
    }

    #[test]
    fn test_planning_horizon_widens_undershooting_heuristic() {
        // Declared horizon of 8 cannot host ship 3 (arrives at 10, needs 2).
        let inst = sample().with_periods_for_test(8);
        let policy = HorizonPolicy::default();
        let t = inst.planning_horizon(&policy);
        assert_eq!(t, 13);
        for s in inst.ships() {
            assert!(s.arrival_time() + s.processing_time() - 1 <= t - 1);
        }
    }

    #[test]
    fn test_open_horizon_uses_policy_factor() {
        let inst = sample();
        assert_eq!(inst.n_periods(), None);
        let policy = HorizonPolicy::default();
        // max(a + p) = 13 → ceil(13 * 1.5) = 20
        assert_eq!(inst.planning_horizon(&policy), 20);
    }

    #[test]
    fn test_display_lists_every_ship() {
        let text = sample().to_string();
        assert!(text.contains("Number of ships: 4"));
        assert!(text.contains("=== Ship(2) ==="));
        assert!(text.contains("(3 berths)"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let res = InstanceBuilder::new()
            .with_uniform_berths(2, 1.0)
            .with_ship(0, 0, 1, 1.0)
            .with_ship(0, 1, 1, 1.0)
            .build();
        assert!(matches!(res, Err(InstanceError::Malformed(_))));
    }

    impl Instance {
        fn with_periods_for_test(mut self, n: i64) -> Self {
            self.n_periods = Some(n);
            self
        }
    }
}
