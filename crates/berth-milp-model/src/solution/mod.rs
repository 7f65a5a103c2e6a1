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
    solution::err::{SolutionFileError, SolutionNotFoundError},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Where and when a single ship was moored, together with the instance data
/// it was solved against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipMooring {
    pub data_ship_id: usize,
    pub data_arrival_time: i64,
    pub data_handling_time: i64,
    pub data_ship_length: f64,
    pub data_ship_length_in_berths: usize,
    pub mooring_time: i64,
    /// Last occupied period, `mooring_time + handling_time - 1`.
    pub completion_time: i64,
    pub mooring_position: f64,
    pub mooring_berth: usize,
}

impl ShipMooring {
    #[inline]
    pub fn ship_id(&self) -> ShipIdentifier {
        ShipIdentifier::new(self.data_ship_id)
    }
}

/// Outcome of one solve as written to and read from JSON.
///
/// `feasible = true` with `makespan = None` means the time limit ran out
/// before any schedule was found; the instance is not known to be
/// infeasible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub feasible: bool,
    pub makespan: Option<f64>,
    pub dual_bound: Option<f64>,
    pub solve_time: f64,
    pub total_time: f64,
    pub ships: Option<Vec<ShipMooring>>,
}

impl SolutionRecord {
    pub fn with_schedule(
        makespan: f64,
        dual_bound: f64,
        solve_time: f64,
        total_time: f64,
        ships: Vec<ShipMooring>,
    ) -> Self {
        Self {
            feasible: true,
            makespan: Some(makespan),
            dual_bound: Some(dual_bound),
            solve_time,
            total_time,
            ships: Some(ships),
        }
    }

    pub fn without_incumbent(dual_bound: Option<f64>, solve_time: f64, total_time: f64) -> Self {
        Self {
            feasible: true,
            makespan: None,
            dual_bound,
            solve_time,
            total_time,
            ships: None,
        }
    }

    pub fn infeasible(solve_time: f64, total_time: f64) -> Self {
        Self {
            feasible: false,
            makespan: None,
            dual_bound: None,
            solve_time,
            total_time,
            ships: None,
        }
    }

    #[inline]
    pub fn has_schedule(&self) -> bool {
        self.ships.is_some()
    }

    #[inline]
    pub fn moorings(&self) -> &[ShipMooring] {
        self.ships.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn from_json_str(s: &str) -> Result<Self, SolutionFileError> {
        Ok(serde_json::from_str(s)?)
    }

    #[inline]
    pub fn to_json_string(&self) -> Result<String, SolutionFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SolutionFileError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SolutionNotFoundError::new(path).into());
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SolutionFileError> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, self)?;
        writeln!(w)?;
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mooring(id: usize, t: i64, pos: f64) -> ShipMooring {
        ShipMooring {
            data_ship_id: id,
            data_arrival_time: 0,
            data_handling_time: 3,
            data_ship_length: 0.5,
            data_ship_length_in_berths: 2,
            mooring_time: t,
            completion_time: t + 2,
            mooring_position: pos,
            mooring_berth: (pos / 0.25) as usize,
        }
    }

    #[test]
    fn test_nulls_serialize_as_json_null() {
        let rec = SolutionRecord::infeasible(1.5, 2.0);
        let v: serde_json::Value = serde_json::from_str(&rec.to_json_string().unwrap()).unwrap();
        assert_eq!(v["feasible"], serde_json::Value::Bool(false));
        assert!(v["makespan"].is_null());
        assert!(v["dual_bound"].is_null());
        assert!(v["ships"].is_null());
        assert_eq!(v["solve_time"], serde_json::json!(1.5));
    }

    #[test]
    fn test_reads_integral_positions_written_by_other_tools() {
        let text = r#"{
            "feasible": true, "makespan": 9.0, "dual_bound": 8, "solve_time": 0.1,
            "total_time": 0.2,
            "ships": [{"data_ship_id": 0, "data_arrival_time": 1, "data_handling_time": 4,
                       "data_ship_length": 1, "data_ship_length_in_berths": 4,
                       "mooring_time": 1, "completion_time": 4, "mooring_position": 0,
                       "mooring_berth": 0}]
        }"#;
        let rec = SolutionRecord::from_json_str(text).unwrap();
        assert_eq!(rec.dual_bound, Some(8.0));
        assert_eq!(rec.moorings()[0].mooring_position, 0.0);
        assert_eq!(rec.moorings()[0].ship_id(), ShipIdentifier::new(0));
    }

    #[test]
    fn test_save_and_load_file() {
        let rec = SolutionRecord::with_schedule(
            5.0,
            5.0,
            0.3,
            0.4,
            vec![mooring(0, 0, 0.0), mooring(1, 3, 0.5)],
        );
        let path = std::env::temp_dir().join(format!("berth-milp-sol-{}.json", std::process::id()));
        rec.save(&path).unwrap();
        let back = SolutionRecord::load(&path).unwrap();
        assert_eq!(back, rec);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SolutionRecord::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SolutionFileError::NotFound(_)));
    }

    #[test]
    fn test_without_incumbent_has_no_schedule() {
        let rec = SolutionRecord::without_incumbent(Some(4.0), 10.0, 10.5);
        assert!(rec.feasible);
        assert!(!rec.has_schedule());
        assert!(rec.moorings().is_empty());
    }
}
