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

use crate::common::ShipIdentifier;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnrecognizedExtensionError {
    path: PathBuf,
}

impl UnrecognizedExtensionError {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for UnrecognizedExtensionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "File format not recognised for {}", self.path.display())
    }
}

impl std::error::Error for UnrecognizedExtensionError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MalformedInstanceError {
    line: Option<usize>,
    reason: String,
}

impl MalformedInstanceError {
    pub fn new(line: Option<usize>, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }

    pub fn at_line(line: usize, reason: impl Into<String>) -> Self {
        Self::new(Some(line), reason)
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Display for MalformedInstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "Malformed instance at line {}: {}", line, self.reason),
            None => write!(f, "Malformed instance: {}", self.reason),
        }
    }
}

impl std::error::Error for MalformedInstanceError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceNotFoundError {
    path: PathBuf,
}

impl InstanceNotFoundError {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for InstanceNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance file not found: {}", self.path.display())
    }
}

impl std::error::Error for InstanceNotFoundError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonUniformBerthsError {
    reference_length: f64,
    berth: usize,
    berth_length: f64,
}

impl NonUniformBerthsError {
    pub fn new(reference_length: f64, berth: usize, berth_length: f64) -> Self {
        Self {
            reference_length,
            berth,
            berth_length,
        }
    }

    pub fn reference_length(&self) -> f64 {
        self.reference_length
    }

    pub fn berth(&self) -> usize {
        self.berth
    }

    pub fn berth_length(&self) -> f64 {
        self.berth_length
    }
}

impl std::fmt::Display for NonUniformBerthsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Berth {} has length {} but berth 0 has length {}; measuring ships in berths requires uniform berths",
            self.berth, self.berth_length, self.reference_length
        )
    }
}

impl std::error::Error for NonUniformBerthsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownShipError {
    id: ShipIdentifier,
}

impl UnknownShipError {
    pub fn new(id: ShipIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ShipIdentifier {
        self.id
    }
}

impl std::fmt::Display for UnknownShipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not part of the instance", self.id)
    }
}

impl std::error::Error for UnknownShipError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOutsideQuayError {
    position: f64,
    quay_length: f64,
}

impl PositionOutsideQuayError {
    pub fn new(position: f64, quay_length: f64) -> Self {
        Self {
            position,
            quay_length,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn quay_length(&self) -> f64 {
        self.quay_length
    }
}

impl std::fmt::Display for PositionOutsideQuayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot find rightmost berth for position {} on a quay of length {}",
            self.position, self.quay_length
        )
    }
}

impl std::error::Error for PositionOutsideQuayError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidGranularityError {
    granularity: i64,
}

impl InvalidGranularityError {
    pub fn new(granularity: i64) -> Self {
        Self { granularity }
    }

    pub fn granularity(&self) -> i64 {
        self.granularity
    }
}

impl std::fmt::Display for InvalidGranularityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Time granularity must be a positive integer, got {}",
            self.granularity
        )
    }
}

impl std::error::Error for InvalidGranularityError {}

#[derive(Debug)]
pub enum InstanceError {
    UnrecognizedExtension(UnrecognizedExtensionError),
    Malformed(MalformedInstanceError),
    NotFound(InstanceNotFoundError),
    NonUniformBerths(NonUniformBerthsError),
    UnknownShip(UnknownShipError),
    PositionOutsideQuay(PositionOutsideQuayError),
    InvalidGranularity(InvalidGranularityError),
    Io(std::io::Error),
}

impl InstanceError {
    /// Unrecognised file extension or a structurally broken file.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            InstanceError::UnrecognizedExtension(_) | InstanceError::Malformed(_)
        )
    }

    #[inline]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, InstanceError::NonUniformBerths(_))
    }
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::UnrecognizedExtension(e) => write!(f, "{}", e),
            InstanceError::Malformed(e) => write!(f, "{}", e),
            InstanceError::NotFound(e) => write!(f, "{}", e),
            InstanceError::NonUniformBerths(e) => write!(f, "{}", e),
            InstanceError::UnknownShip(e) => write!(f, "{}", e),
            InstanceError::PositionOutsideQuay(e) => write!(f, "{}", e),
            InstanceError::InvalidGranularity(e) => write!(f, "{}", e),
            InstanceError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for InstanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstanceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnrecognizedExtensionError> for InstanceError {
    fn from(err: UnrecognizedExtensionError) -> Self {
        InstanceError::UnrecognizedExtension(err)
    }
}

impl From<MalformedInstanceError> for InstanceError {
    fn from(err: MalformedInstanceError) -> Self {
        InstanceError::Malformed(err)
    }
}

impl From<InstanceNotFoundError> for InstanceError {
    fn from(err: InstanceNotFoundError) -> Self {
        InstanceError::NotFound(err)
    }
}

impl From<NonUniformBerthsError> for InstanceError {
    fn from(err: NonUniformBerthsError) -> Self {
        InstanceError::NonUniformBerths(err)
    }
}

impl From<UnknownShipError> for InstanceError {
    fn from(err: UnknownShipError) -> Self {
        InstanceError::UnknownShip(err)
    }
}

impl From<PositionOutsideQuayError> for InstanceError {
    fn from(err: PositionOutsideQuayError) -> Self {
        InstanceError::PositionOutsideQuay(err)
    }
}

impl From<InvalidGranularityError> for InstanceError {
    fn from(err: InvalidGranularityError) -> Self {
        InstanceError::InvalidGranularity(err)
    }
}

impl From<std::io::Error> for InstanceError {
    fn from(err: std::io::Error) -> Self {
        InstanceError::Io(err)
    }
}
