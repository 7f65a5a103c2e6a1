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
    instance::{
        Instance, Ship,
        builder::InstanceBuilder,
        err::{
            InstanceError, InstanceNotFoundError, MalformedInstanceError, UnrecognizedExtensionError,
        },
        horizon::HorizonPolicy,
    },
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

/// Number of berths assumed by the column layout.
pub const COLUMN_FORM_BERTHS: usize = 12;
/// Length of each berth in the column layout.
pub const COLUMN_FORM_BERTH_LENGTH: f64 = 0.25;
/// Quay length in the column layout.
pub const COLUMN_FORM_QUAY_LENGTH: f64 = 3.0;

/// Physical layout of an instance file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceFormat {
    /// Whitespace separated, one ship per line, berth lengths at the end.
    Row,
    /// Comma separated, processing/length/arrival as parallel rows.
    Column,
}

impl InstanceFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(InstanceFormat::Column),
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Ok(InstanceFormat::Row),
            _ => Err(UnrecognizedExtensionError::new(path).into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceLoader {
    instance_dir: PathBuf,
    horizon: HorizonPolicy,
}

impl Default for InstanceLoader {
    fn default() -> Self {
        Self {
            instance_dir: PathBuf::from("instances"),
            horizon: HorizonPolicy::default(),
        }
    }
}

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn instance_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.instance_dir = dir.into();
        self
    }

    #[inline]
    pub fn horizon_policy(mut self, policy: HorizonPolicy) -> Self {
        self.horizon = policy;
        self
    }

    /// Maps a user supplied name to an existing file. An existing path is
    /// taken as is. Otherwise `.csv` is appended when there is no extension
    /// and the instance directory is prefixed unless the path already lives
    /// under it.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, InstanceError> {
        let path = path.as_ref();
        if path.is_file() {
            return Ok(path.to_path_buf());
        }

        let mut candidate = path.to_path_buf();
        if candidate.extension().is_none() {
            candidate.set_extension("csv");
        }
        if !candidate.starts_with(&self.instance_dir) {
            candidate = self.instance_dir.join(candidate);
        }

        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(InstanceNotFoundError::new(candidate).into())
        }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Instance, InstanceError> {
        let resolved = self.resolve(path)?;
        let format = InstanceFormat::from_path(&resolved)?;
        let file = File::open(&resolved)?;
        let name = resolved.to_string_lossy().into_owned();
        self.from_bufread(format, name, BufReader::new(file))
    }

    pub fn from_bufread<R: BufRead>(
        &self,
        format: InstanceFormat,
        name: impl Into<String>,
        br: R,
    ) -> Result<Instance, InstanceError> {
        match format {
            InstanceFormat::Row => self.read_row_form(name.into(), br),
            InstanceFormat::Column => self.read_column_form(name.into(), br),
        }
    }

    #[inline]
    pub fn from_reader<R: Read>(
        &self,
        format: InstanceFormat,
        name: impl Into<String>,
        r: R,
    ) -> Result<Instance, InstanceError> {
        self.from_bufread(format, name, BufReader::new(r))
    }

    #[inline]
    pub fn from_row_str(&self, name: impl Into<String>, s: &str) -> Result<Instance, InstanceError> {
        self.from_reader(InstanceFormat::Row, name, s.as_bytes())
    }

    #[inline]
    pub fn from_column_str(&self, name: impl Into<String>, s: &str) -> Result<Instance, InstanceError> {
        self.from_reader(InstanceFormat::Column, name, s.as_bytes())
    }

    fn read_row_form<R: BufRead>(&self, name: String, br: R) -> Result<Instance, InstanceError> {
        let mut sc = Scanner::new(br);
        let n = sc.next_usize()?;
        let m = sc.next_usize()?;

        let mut builder = InstanceBuilder::with_capacities(n, m);
        builder.set_name(name);

        for _ in 0..n {
            let id = sc.next_usize()?;
            let arrival = sc.next_i64()?;
            let length = sc.next_f64()?;
            let processing = sc.next_i64()?;
            sc.next_token()?;
            sc.next_token()?;
            builder.add_ship(Ship::new(ShipIdentifier::new(id), arrival, processing, length));
        }

        let repeated = sc.next_usize()?;
        if repeated != m {
            return Err(MalformedInstanceError::at_line(
                sc.line(),
                format!("berth count {} does not match declared {}", repeated, m),
            )
            .into());
        }

        let record = sc.next_record()?;
        let line = sc.line();
        let mut lengths = Vec::with_capacity(m);
        for tok in record.split_whitespace() {
            lengths.push(parse_f64(tok, line)?);
        }
        if lengths.len() != m {
            return Err(MalformedInstanceError::at_line(
                line,
                format!("expected {} berth lengths, found {}", m, lengths.len()),
            )
            .into());
        }
        for l in lengths {
            builder.add_berth(l);
        }

        builder.build()
    }

    fn read_column_form<R: BufRead>(&self, name: String, br: R) -> Result<Instance, InstanceError> {
        let mut sc = Scanner::new(br);

        let header = sc.next_record()?;
        let n = header
            .split(',')
            .nth(1)
            .map(str::trim)
            .ok_or_else(|| MalformedInstanceError::at_line(sc.line(), "missing ship count"))?;
        let n = parse_usize(n, sc.line())?;

        for marker in ["Begin", "End"] {
            let row = sc.next_record()?;
            if !row.contains(marker) {
                return Err(MalformedInstanceError::at_line(
                    sc.line(),
                    format!("expected a `{}` marker row", marker),
                )
                .into());
            }
        }

        let processing = column_row(&mut sc, n, |t, l| parse_i64(t, l))?;
        let lengths = column_row(&mut sc, n, |t, l| parse_f64(t, l))?;
        let arrivals = column_row(&mut sc, n, |t, l| parse_i64(t, l))?;

        let latest = arrivals
            .iter()
            .zip(&processing)
            .map(|(a, p)| a + p)
            .max()
            .unwrap_or(0);
        let n_periods = self.horizon.synthesize_periods(n).max(latest);

        let mut builder = InstanceBuilder::with_capacities(n, COLUMN_FORM_BERTHS)
            .with_name(name)
            .with_uniform_berths(COLUMN_FORM_BERTHS, COLUMN_FORM_BERTH_LENGTH)
            .with_quay_length(COLUMN_FORM_QUAY_LENGTH)
            .with_periods(n_periods);
        for i in 0..n {
            builder.add_ship(Ship::new(
                ShipIdentifier::new(i),
                arrivals[i],
                processing[i],
                lengths[i],
            ));
        }

        builder.build()
    }
}

fn column_row<R, T, F>(sc: &mut Scanner<R>, n: usize, parse: F) -> Result<Vec<T>, InstanceError>
where
    R: BufRead,
    F: Fn(&str, usize) -> Result<T, InstanceError>,
{
    let row = sc.next_record()?;
    let line = sc.line();
    let values = row
        .split(',')
        .skip(1)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| parse(t, line))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != n {
        return Err(MalformedInstanceError::at_line(
            line,
            format!("expected {} values, found {}", n, values.len()),
        )
        .into());
    }
    Ok(values)
}

#[inline]
fn parse_i64(tok: &str, line: usize) -> Result<i64, InstanceError> {
    tok.parse::<i64>()
        .map_err(|e| MalformedInstanceError::at_line(line, format!("`{}`: {}", tok, e)).into())
}

#[inline]
fn parse_usize(tok: &str, line: usize) -> Result<usize, InstanceError> {
    tok.parse::<usize>()
        .map_err(|e| MalformedInstanceError::at_line(line, format!("`{}`: {}", tok, e)).into())
}

#[inline]
fn parse_f64(tok: &str, line: usize) -> Result<f64, InstanceError> {
    tok.parse::<f64>()
        .map_err(|e| MalformedInstanceError::at_line(line, format!("`{}`: {}", tok, e)).into())
}

#[derive(Debug)]
struct Scanner<R: BufRead> {
    rdr: R,
    buf: String,
    pos: usize,
    line: usize,
}

impl<R: BufRead> Scanner<R> {
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
            line: 0,
        }
    }

    /// One-based number of the line last read.
    #[inline]
    fn line(&self) -> usize {
        self.line
    }

    #[inline]
    fn fill_line(&mut self) -> Result<(), InstanceError> {
        self.buf.clear();
        self.pos = 0;
        let n = self.rdr.read_line(&mut self.buf)?;
        if n == 0 {
            return Err(MalformedInstanceError::at_line(self.line, "unexpected end of file").into());
        }
        self.line += 1;
        Ok(())
    }

    #[inline]
    fn skip_ws(&mut self) -> Result<(), InstanceError> {
        loop {
            if self.pos >= self.buf.len() {
                self.fill_line()?;
                continue;
            }
            while self.pos < self.buf.len() && self.buf.as_bytes()[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.buf.len() {
                continue;
            }
            return Ok(());
        }
    }

    #[inline]
    fn next_token(&mut self) -> Result<&str, InstanceError> {
        self.skip_ws()?;
        let start = self.pos;
        while self.pos < self.buf.len() && !self.buf.as_bytes()[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        Ok(&self.buf[start..self.pos])
    }

    #[inline]
    fn next_i64(&mut self) -> Result<i64, InstanceError> {
        self.skip_ws()?;
        let line = self.line;
        parse_i64(self.next_token()?, line)
    }

    #[inline]
    fn next_usize(&mut self) -> Result<usize, InstanceError> {
        self.skip_ws()?;
        let line = self.line;
        parse_usize(self.next_token()?, line)
    }

    #[inline]
    fn next_f64(&mut self) -> Result<f64, InstanceError> {
        self.skip_ws()?;
        let line = self.line;
        parse_f64(self.next_token()?, line)
    }

    /// Remainder of the current line if it holds anything, otherwise the
    /// next non-blank line.
    fn next_record(&mut self) -> Result<String, InstanceError> {
        self.skip_ws()?;
        let record = self.buf[self.pos..].trim().to_string();
        self.pos = self.buf.len();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::writer::write_row_form;

    const ROW_OK: &str = r#"3
4
0 2 0.5 6 0 0
1 0 0.25 3 0 0
2 5 1.0 2 0 0
4
0.25 0.25 0.25 0.25
"#;

    const COLUMN_OK: &str = "Ships,3\n\
        Begin,,,\n\
        End,,,\n\
        Processing,10,12,8\n\
        Length,0.5,0.75,0.25\n\
        Arrival,0,4,9\n";

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "berth-milp-loader-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_row_form() {
        let inst = InstanceLoader::new().from_row_str("row.txt", ROW_OK).unwrap();
        assert_eq!(inst.n_ships(), 3);
        assert_eq!(inst.n_berths(), 4);
        assert_eq!(inst.n_periods(), None);
        let s = inst.ship(0).unwrap();
        assert_eq!(s.arrival_time(), 2);
        assert_eq!(s.length(), 0.5);
        assert_eq!(s.processing_time(), 6);
        assert_eq!(inst.ship_length_in_n_berths(2).unwrap(), 4);
    }

    #[test]
    fn test_row_form_rejects_mismatched_berth_count() {
        let bad = ROW_OK.replacen("\n4\n0.25", "\n3\n0.25", 1);
        let err = InstanceLoader::new().from_row_str("row.txt", &bad).unwrap_err();
        assert!(matches!(err, InstanceError::Malformed(ref e) if e.line() == Some(6)));
    }

    #[test]
    fn test_row_form_rejects_wrong_number_of_lengths() {
        let bad = ROW_OK.replace("0.25 0.25 0.25 0.25", "0.25 0.25 0.25");
        let err = InstanceLoader::new().from_row_str("row.txt", &bad).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_row_form_reports_truncated_input() {
        let err = InstanceLoader::new()
            .from_row_str("row.txt", "2\n4\n0 1 0.5 3 0 0\n")
            .unwrap_err();
        assert!(matches!(err, InstanceError::Malformed(_)));
    }

    #[test]
    fn test_loads_column_form_with_fixed_geometry() {
        let inst = InstanceLoader::new()
            .from_column_str("col.csv", COLUMN_OK)
            .unwrap();
        assert_eq!(inst.n_ships(), 3);
        assert_eq!(inst.n_berths(), COLUMN_FORM_BERTHS);
        assert_eq!(inst.quay_length(), COLUMN_FORM_QUAY_LENGTH);
        assert_eq!(inst.uniform_berth_length(), Some(COLUMN_FORM_BERTH_LENGTH));
        assert_eq!(inst.n_periods(), Some(210));
        assert_eq!(inst.ship(1).unwrap().arrival_time(), 4);
        assert_eq!(inst.ship(1).unwrap().processing_time(), 12);
        assert_eq!(inst.ship_length_in_n_berths(1).unwrap(), 3);
    }

    #[test]
    fn test_column_form_horizon_covers_latest_release() {
        let text = COLUMN_OK.replace("Arrival,0,4,9", "Arrival,0,4,400");
        let inst = InstanceLoader::new().from_column_str("col.csv", &text).unwrap();
        assert_eq!(inst.n_periods(), Some(408));
    }

    #[test]
    fn test_column_form_requires_markers() {
        let text = COLUMN_OK.replace("Begin", "Start");
        let err = InstanceLoader::new()
            .from_column_str("col.csv", &text)
            .unwrap_err();
        assert!(matches!(err, InstanceError::Malformed(ref e) if e.line() == Some(2)));
    }

    #[test]
    fn test_unrecognized_extension() {
        assert!(matches!(
            InstanceFormat::from_path("foo.json"),
            Err(InstanceError::UnrecognizedExtension(_))
        ));
        assert_eq!(InstanceFormat::from_path("a.TXT").unwrap(), InstanceFormat::Row);
        assert_eq!(InstanceFormat::from_path("a.csv").unwrap(), InstanceFormat::Column);
    }

    #[test]
    fn test_resolve_applies_search_convention() {
        let dir = scratch_dir("resolve");
        std::fs::write(dir.join("tiny.csv"), COLUMN_OK).unwrap();
        let loader = InstanceLoader::new().instance_dir(&dir);

        let found = loader.resolve("tiny").unwrap();
        assert_eq!(found, dir.join("tiny.csv"));
        let inst = loader.load("tiny").unwrap();
        assert_eq!(inst.basename(), "tiny");

        assert!(matches!(
            loader.resolve("missing"),
            Err(InstanceError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_rejects_unknown_extension_of_existing_file() {
        let dir = scratch_dir("ext");
        let path = dir.join("inst.dat");
        std::fs::write(&path, ROW_OK).unwrap();
        let err = InstanceLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, InstanceError::UnrecognizedExtension(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_written_row_form_loads_back() {
        let inst = InstanceLoader::new().from_row_str("row.txt", ROW_OK).unwrap();
        let mut out = Vec::new();
        write_row_form(&inst, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let back = InstanceLoader::new().from_row_str("row.txt", &text).unwrap();
        assert_eq!(back, inst);
    }
}
