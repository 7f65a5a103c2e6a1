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

use crate::engine::EngineError;
use berth_milp_model::{
    common::ShipIdentifier, instance::err::InstanceError, solution::err::SolutionFileError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipExceedsQuayError {
    ship: ShipIdentifier,
    footprint: usize,
    n_berths: usize,
}

impl ShipExceedsQuayError {
    #[inline]
    pub fn new(ship: ShipIdentifier, footprint: usize, n_berths: usize) -> Self {
        Self {
            ship,
            footprint,
            n_berths,
        }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }

    #[inline]
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    #[inline]
    pub fn n_berths(&self) -> usize {
        self.n_berths
    }
}

impl std::fmt::Display for ShipExceedsQuayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} needs {} berths but the quay only has {}",
            self.ship, self.footprint, self.n_berths
        )
    }
}

impl std::error::Error for ShipExceedsQuayError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionError {
    ship: ShipIdentifier,
    reason: String,
}

impl ExtractionError {
    #[inline]
    pub fn new(ship: ShipIdentifier, reason: impl Into<String>) -> Self {
        Self {
            ship,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot read back {}: {}", self.ship, self.reason)
    }
}

impl std::error::Error for ExtractionError {}

#[derive(Debug)]
pub enum SolverError {
    Instance(InstanceError),
    ShipExceedsQuay(ShipExceedsQuayError),
    Engine(EngineError),
    Extraction(ExtractionError),
    SolutionFile(SolutionFileError),
    Io(std::io::Error),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::Instance(e) => write!(f, "{}", e),
            SolverError::ShipExceedsQuay(e) => write!(f, "{}", e),
            SolverError::Engine(e) => write!(f, "{}", e),
            SolverError::Extraction(e) => write!(f, "{}", e),
            SolverError::SolutionFile(e) => write!(f, "{}", e),
            SolverError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Instance(e) => Some(e),
            SolverError::ShipExceedsQuay(e) => Some(e),
            SolverError::Engine(e) => Some(e),
            SolverError::Extraction(e) => Some(e),
            SolverError::SolutionFile(e) => Some(e),
            SolverError::Io(e) => Some(e),
        }
    }
}

impl From<InstanceError> for SolverError {
    fn from(err: InstanceError) -> Self {
        SolverError::Instance(err)
    }
}

impl From<ShipExceedsQuayError> for SolverError {
    fn from(err: ShipExceedsQuayError) -> Self {
        SolverError::ShipExceedsQuay(err)
    }
}

impl From<EngineError> for SolverError {
    fn from(err: EngineError) -> Self {
        SolverError::Engine(err)
    }
}

impl From<ExtractionError> for SolverError {
    fn from(err: ExtractionError) -> Self {
        SolverError::Extraction(err)
    }
}

impl From<SolutionFileError> for SolverError {
    fn from(err: SolutionFileError) -> Self {
        SolverError::SolutionFile(err)
    }
}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Io(err)
    }
}
