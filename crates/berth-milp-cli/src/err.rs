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

use berth_milp_model::{
    generator::err::GeneratorConfigError, instance::err::InstanceError,
    solution::err::SolutionFileError,
};
use berth_milp_solver::err::SolverError;

#[derive(Debug)]
pub enum CliError {
    Instance(InstanceError),
    Solver(SolverError),
    SolutionFile(SolutionFileError),
    Generator(GeneratorConfigError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Instance(e) => write!(f, "{}", e),
            CliError::Solver(e) => write!(f, "{}", e),
            CliError::SolutionFile(e) => write!(f, "{}", e),
            CliError::Generator(e) => write!(f, "Invalid generator settings: {}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<InstanceError> for CliError {
    fn from(e: InstanceError) -> Self {
        CliError::Instance(e)
    }
}

impl From<SolverError> for CliError {
    fn from(e: SolverError) -> Self {
        CliError::Solver(e)
    }
}

impl From<SolutionFileError> for CliError {
    fn from(e: SolutionFileError) -> Self {
        CliError::SolutionFile(e)
    }
}

impl From<GeneratorConfigError> for CliError {
    fn from(e: GeneratorConfigError) -> Self {
        CliError::Generator(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
