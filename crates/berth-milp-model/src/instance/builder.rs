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
    common::ShipIdentifier,
    instance::{Instance, Ship, err::InstanceError},
};

#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    name: String,
    ships: Vec<Ship>,
    berth_lengths: Vec<f64>,
    quay_length: Option<f64>,
    n_periods: Option<i64>,
}

impl InstanceBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacities(ships: usize, berths: usize) -> Self {
        Self {
            ships: Vec::with_capacity(ships),
            berth_lengths: Vec::with_capacity(berths),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn with_ship(mut self, id: usize, arrival_time: i64, processing_time: i64, length: f64) -> Self {
        self.add_ship(Ship::new(
            ShipIdentifier::new(id),
            arrival_time,
            processing_time,
            length,
        ));
        self
    }

    #[inline]
    pub fn with_ships<I>(mut self, ships: I) -> Self
    where
        I: IntoIterator<Item = Ship>,
    {
        self.ships.clear();
        self.ships.extend(ships);
        self
    }

    #[inline]
    pub fn with_berth(mut self, length: f64) -> Self {
        self.add_berth(length);
        self
    }

    /// Replaces all berths with `n` berths of equal `length`.
    #[inline]
    pub fn with_uniform_berths(mut self, n: usize, length: f64) -> Self {
        self.berth_lengths = vec![length; n];
        self
    }

    #[inline]
    pub fn with_quay_length(mut self, quay_length: f64) -> Self {
        self.quay_length = Some(quay_length);
        self
    }

    #[inline]
    pub fn with_periods(mut self, n_periods: i64) -> Self {
        self.n_periods = Some(n_periods);
        self
    }

    #[inline]
    pub fn add_ship(&mut self, ship: Ship) -> &mut Self {
        self.ships.push(ship);
        self
    }

    #[inline]
    pub fn add_berth(&mut self, length: f64) -> &mut Self {
        self.berth_lengths.push(length);
        self
    }

    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn set_quay_length(&mut self, quay_length: f64) -> &mut Self {
        self.quay_length = Some(quay_length);
        self
    }

    #[inline]
    pub fn set_periods(&mut self, n_periods: i64) -> &mut Self {
        self.n_periods = Some(n_periods);
        self
    }

    #[inline]
    pub fn build(self) -> Result<Instance, InstanceError> {
        Instance::new(
            self.name,
            self.ships,
            self.berth_lengths,
            self.quay_length,
            self.n_periods,
        )
    }
}
