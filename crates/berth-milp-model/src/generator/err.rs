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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintRangeError {
    min_footprint: usize,
    max_footprint: usize,
    n_berths: usize,
}

impl FootprintRangeError {
    pub fn new(min_footprint: usize, max_footprint: usize, n_berths: usize) -> Self {
        Self {
            min_footprint,
            max_footprint,
            n_berths,
        }
    }

    pub fn min_footprint(&self) -> usize {
        self.min_footprint
    }

    pub fn max_footprint(&self) -> usize {
        self.max_footprint
    }

    pub fn n_berths(&self) -> usize {
        self.n_berths
    }
}

impl std::fmt::Display for FootprintRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FootprintRangeError: footprints [{}, {}] do not fit on {} berths",
            self.min_footprint, self.max_footprint, self.n_berths
        )
    }
}

impl std::error::Error for FootprintRangeError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingDistributionError {
    mean: f64,
    sigma: f64,
    min_processing: i64,
    max_processing: Option<i64>,
}

impl ProcessingDistributionError {
    pub fn new(mean: f64, sigma: f64, min_processing: i64, max_processing: Option<i64>) -> Self {
        Self {
            mean,
            sigma,
            min_processing,
            max_processing,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn min_processing(&self) -> i64 {
        self.min_processing
    }

    pub fn max_processing(&self) -> Option<i64> {
        self.max_processing
    }
}

impl std::fmt::Display for ProcessingDistributionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProcessingDistributionError: N({}, {}) clamped to [{}, {:?}] is not a valid distribution",
            self.mean, self.sigma, self.min_processing, self.max_processing
        )
    }
}

impl std::error::Error for ProcessingDistributionError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorConfigError {
    NoBerths,
    InvalidBerthLength(f64),
    InvalidFootprintRange(FootprintRangeError),
    InvalidInterarrival(f64),
    InvalidProcessing(ProcessingDistributionError),
    NegativeHorizon(i64),
}

impl std::fmt::Display for GeneratorConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GeneratorConfigError::*;
        match self {
            NoBerths => write!(f, "At least one berth is required"),
            InvalidBerthLength(l) => write!(f, "Berth length must be positive, got {}", l),
            InvalidFootprintRange(e) => write!(f, "{}", e),
            InvalidInterarrival(m) => {
                write!(f, "Mean inter-arrival time must be positive, got {}", m)
            }
            InvalidProcessing(e) => write!(f, "{}", e),
            NegativeHorizon(n) => write!(f, "Horizon must not be negative, got {}", n),
        }
    }
}

impl std::error::Error for GeneratorConfigError {}

impl From<FootprintRangeError> for GeneratorConfigError {
    fn from(err: FootprintRangeError) -> Self {
        Self::InvalidFootprintRange(err)
    }
}

impl From<ProcessingDistributionError> for GeneratorConfigError {
    fn from(err: ProcessingDistributionError) -> Self {
        Self::InvalidProcessing(err)
    }
}
