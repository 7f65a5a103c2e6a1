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

use crate::generator::err::{
    FootprintRangeError, GeneratorConfigError, ProcessingDistributionError,
};

/// Parameters for synthetic instances over uniform berths.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub n_ships: usize,
    pub n_berths: usize,
    pub berth_length: f64,
    /// Smallest ship size in whole berths.
    pub min_footprint: usize,
    /// Largest ship size in whole berths.
    pub max_footprint: usize,
    /// Mean of the exponential gap between consecutive arrivals.
    pub mean_interarrival: f64,
    pub processing_mean: f64,
    pub processing_sigma: f64,
    pub min_processing: i64,
    pub max_processing: Option<i64>,
    /// Declared horizon; `None` writes an open-horizon instance.
    pub n_periods: Option<i64>,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_ships: 10,
            n_berths: 12,
            berth_length: 0.25,
            min_footprint: 1,
            max_footprint: 3,
            mean_interarrival: 4.0,
            processing_mean: 12.0,
            processing_sigma: 4.0,
            min_processing: 1,
            max_processing: Some(48),
            n_periods: None,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_ships(mut self, n_ships: usize) -> Self {
        self.n_ships = n_ships;
        self
    }

    #[inline]
    pub fn with_berths(mut self, n_berths: usize, berth_length: f64) -> Self {
        self.n_berths = n_berths;
        self.berth_length = berth_length;
        self
    }

    #[inline]
    pub fn with_footprints(mut self, min_footprint: usize, max_footprint: usize) -> Self {
        self.min_footprint = min_footprint;
        self.max_footprint = max_footprint;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn with_periods(mut self, n_periods: Option<i64>) -> Self {
        self.n_periods = n_periods;
        self
    }

    pub fn validate(&self) -> Result<(), GeneratorConfigError> {
        if self.n_berths == 0 {
            return Err(GeneratorConfigError::NoBerths);
        }
        if !self.berth_length.is_finite() || self.berth_length <= 0.0 {
            return Err(GeneratorConfigError::InvalidBerthLength(self.berth_length));
        }
        if self.min_footprint == 0
            || self.min_footprint > self.max_footprint
            || self.max_footprint > self.n_berths
        {
            return Err(FootprintRangeError::new(
                self.min_footprint,
                self.max_footprint,
                self.n_berths,
            )
            .into());
        }
        if !self.mean_interarrival.is_finite() || self.mean_interarrival <= 0.0 {
            return Err(GeneratorConfigError::InvalidInterarrival(self.mean_interarrival));
        }
        let processing_ok = self.processing_mean.is_finite()
            && self.processing_sigma.is_finite()
            && self.processing_sigma >= 0.0
            && self.min_processing >= 0
            && self.max_processing.is_none_or(|m| m >= self.min_processing);
        if !processing_ok {
            return Err(ProcessingDistributionError::new(
                self.processing_mean,
                self.processing_sigma,
                self.min_processing,
                self.max_processing,
            )
            .into());
        }
        if let Some(n) = self.n_periods.filter(|n| *n < 0) {
            return Err(GeneratorConfigError::NegativeHorizon(n));
        }
        Ok(())
    }
}
