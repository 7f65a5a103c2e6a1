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

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolutionNotFoundError {
    path: PathBuf,
}

impl SolutionNotFoundError {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for SolutionNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Solution file not found: {}", self.path.display())
    }
}

impl std::error::Error for SolutionNotFoundError {}

#[derive(Debug)]
pub enum SolutionFileError {
    NotFound(SolutionNotFoundError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for SolutionFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionFileError::NotFound(e) => write!(f, "{}", e),
            SolutionFileError::Io(e) => write!(f, "I/O error: {}", e),
            SolutionFileError::Json(e) => write!(f, "Invalid solution record: {}", e),
        }
    }
}

impl std::error::Error for SolutionFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolutionFileError::NotFound(e) => Some(e),
            SolutionFileError::Io(e) => Some(e),
            SolutionFileError::Json(e) => Some(e),
        }
    }
}

impl From<SolutionNotFoundError> for SolutionFileError {
    fn from(err: SolutionNotFoundError) -> Self {
        SolutionFileError::NotFound(err)
    }
}

impl From<std::io::Error> for SolutionFileError {
    fn from(err: std::io::Error) -> Self {
        SolutionFileError::Io(err)
    }
}

impl From<serde_json::Error> for SolutionFileError {
    fn from(err: serde_json::Error) -> Self {
        SolutionFileError::Json(err)
    }
}
