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

#[derive(Debug, Clone, PartialEq)]
pub struct EarlyMooringError {
    ship: ShipIdentifier,
    mooring_time: i64,
    arrival_time: i64,
}

impl EarlyMooringError {
    #[inline]
    pub fn new(ship: ShipIdentifier, mooring_time: i64, arrival_time: i64) -> Self {
        Self {
            ship,
            mooring_time,
            arrival_time,
        }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }

    #[inline]
    pub fn mooring_time(&self) -> i64 {
        self.mooring_time
    }

    #[inline]
    pub fn arrival_time(&self) -> i64 {
        self.arrival_time
    }
}

impl std::fmt::Display for EarlyMooringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}. Invalid berthing time {} < {} arrival time.",
            self.ship, self.mooring_time, self.arrival_time
        )
    }
}

impl std::error::Error for EarlyMooringError {}

#[derive(Debug, Clone, PartialEq)]
pub struct OutsideQuayError {
    ship: ShipIdentifier,
    position: f64,
    ship_length: f64,
    quay_length: f64,
}

impl OutsideQuayError {
    #[inline]
    pub fn new(ship: ShipIdentifier, position: f64, ship_length: f64, quay_length: f64) -> Self {
        Self {
            ship,
            position,
            ship_length,
            quay_length,
        }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn ship_length(&self) -> f64 {
        self.ship_length
    }

    #[inline]
    pub fn quay_length(&self) -> f64 {
        self.quay_length
    }
}

impl std::fmt::Display for OutsideQuayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}. Invalid berthing position {} outside [0, {} (quay length) - {} (ship length)].",
            self.ship, self.position, self.quay_length, self.ship_length
        )
    }
}

impl std::error::Error for OutsideQuayError {}

/// Occupied rectangle of one moored ship, half open in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupation {
    pub ship: ShipIdentifier,
    pub mooring_time: i64,
    pub departure_time: i64,
    pub position: f64,
    pub end_position: f64,
}

impl std::fmt::Display for Occupation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: time [{}, {}), quay [{}, {})",
            self.ship, self.mooring_time, self.departure_time, self.position, self.end_position
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MooringOverlapError {
    first: Occupation,
    second: Occupation,
}

impl MooringOverlapError {
    #[inline]
    pub fn new(first: Occupation, second: Occupation) -> Self {
        Self { first, second }
    }

    #[inline]
    pub fn first(&self) -> &Occupation {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &Occupation {
        &self.second
    }
}

impl std::fmt::Display for MooringOverlapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} and {} overlap. {}; {}.",
            self.first.ship, self.second.ship, self.first, self.second
        )
    }
}

impl std::error::Error for MooringOverlapError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownMooredShipError {
    ship: ShipIdentifier,
}

impl UnknownMooredShipError {
    #[inline]
    pub fn new(ship: ShipIdentifier) -> Self {
        Self { ship }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }
}

impl std::fmt::Display for UnknownMooredShipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is moored but not part of the instance.", self.ship)
    }
}

impl std::error::Error for UnknownMooredShipError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateMooringError {
    ship: ShipIdentifier,
}

impl DuplicateMooringError {
    #[inline]
    pub fn new(ship: ShipIdentifier) -> Self {
        Self { ship }
    }

    #[inline]
    pub fn ship(&self) -> ShipIdentifier {
        self.ship
    }
}

impl std::fmt::Display for DuplicateMooringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is moored more than once.", self.ship)
    }
}

impl std::error::Error for DuplicateMooringError {}

/// A single problem found by the verifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    EarlyMooring(EarlyMooringError),
    OutsideQuay(OutsideQuayError),
    Overlap(MooringOverlapError),
    UnknownShip(UnknownMooredShipError),
    DuplicateShip(DuplicateMooringError),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::EarlyMooring(e) => write!(f, "{}", e),
            Violation::OutsideQuay(e) => write!(f, "{}", e),
            Violation::Overlap(e) => write!(f, "{}", e),
            Violation::UnknownShip(e) => write!(f, "{}", e),
            Violation::DuplicateShip(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Violation {}

impl From<EarlyMooringError> for Violation {
    fn from(err: EarlyMooringError) -> Self {
        Violation::EarlyMooring(err)
    }
}

impl From<OutsideQuayError> for Violation {
    fn from(err: OutsideQuayError) -> Self {
        Violation::OutsideQuay(err)
    }
}

impl From<MooringOverlapError> for Violation {
    fn from(err: MooringOverlapError) -> Self {
        Violation::Overlap(err)
    }
}

impl From<UnknownMooredShipError> for Violation {
    fn from(err: UnknownMooredShipError) -> Self {
        Violation::UnknownShip(err)
    }
}

impl From<DuplicateMooringError> for Violation {
    fn from(err: DuplicateMooringError) -> Self {
        Violation::DuplicateShip(err)
    }
}
