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

pub mod err;

use crate::{
    common::ShipIdentifier,
    instance::{Instance, LENGTH_EPSILON},
    solution::SolutionRecord,
    validation::err::{
        DuplicateMooringError, EarlyMooringError, MooringOverlapError, Occupation,
        OutsideQuayError, UnknownMooredShipError, Violation,
    },
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    violations: Vec<Violation>,
}

impl VerificationReport {
    #[inline]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    #[inline]
    pub fn overlaps(&self) -> impl Iterator<Item = &MooringOverlapError> {
        self.violations.iter().filter_map(|v| match v {
            Violation::Overlap(e) => Some(e),
            _ => None,
        })
    }
}

impl std::fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for v in &self.violations {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Audits a solution record against an instance. Arrival times, lengths and
/// processing times are taken from the instance; only the mooring time and
/// position are read from the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionVerifier;

impl SolutionVerifier {
    pub fn verify(instance: &Instance, record: &SolutionRecord) -> VerificationReport {
        let mut violations = Vec::new();
        let mut seen = BTreeSet::new();
        let mut placed: Vec<Occupation> = Vec::with_capacity(record.moorings().len());

        for m in record.moorings() {
            let id = ShipIdentifier::new(m.data_ship_id);
            let Some(ship) = instance.ship_by_id(id) else {
                violations.push(UnknownMooredShipError::new(id).into());
                continue;
            };
            if !seen.insert(id) {
                violations.push(DuplicateMooringError::new(id).into());
                continue;
            }

            if m.mooring_time < ship.arrival_time() {
                violations
                    .push(EarlyMooringError::new(id, m.mooring_time, ship.arrival_time()).into());
            }

            let max_position = instance.quay_length() - ship.length();
            if m.mooring_position < -LENGTH_EPSILON
                || m.mooring_position > max_position + LENGTH_EPSILON
            {
                violations.push(
                    OutsideQuayError::new(
                        id,
                        m.mooring_position,
                        ship.length(),
                        instance.quay_length(),
                    )
                    .into(),
                );
            }

            placed.push(Occupation {
                ship: id,
                mooring_time: m.mooring_time,
                departure_time: m.mooring_time + ship.processing_time(),
                position: m.mooring_position,
                end_position: m.mooring_position + ship.length(),
            });
        }

        for (k, a) in placed.iter().enumerate() {
            for b in &placed[k + 1..] {
                if overlaps(a, b) {
                    violations.push(MooringOverlapError::new(*a, *b).into());
                }
            }
        }

        VerificationReport { violations }
    }
}

#[inline]
fn overlaps(a: &Occupation, b: &Occupation) -> bool {
    let in_time = a.mooring_time < b.departure_time && b.mooring_time < a.departure_time;
    let in_space = a.position < b.end_position - LENGTH_EPSILON
        && b.position < a.end_position - LENGTH_EPSILON;
    in_time && in_space
}
