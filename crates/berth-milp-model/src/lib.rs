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

pub mod common;
pub mod generator;
pub mod instance;
pub mod solution;
pub mod validation;

pub mod prelude {
    pub use crate::common::{Identifier, IdentifierMarkerName, ShipIdentifier};
    pub use crate::generator::{GeneratorConfig, InstanceGenerator};
    pub use crate::instance::{
        Discretization, Instance, Ship,
        builder::InstanceBuilder,
        err::InstanceError,
        horizon::HorizonPolicy,
        loader::{InstanceFormat, InstanceLoader},
        writer::write_row_form,
    };
    pub use crate::solution::{ShipMooring, SolutionRecord, err::SolutionFileError};
    pub use crate::validation::{SolutionVerifier, VerificationReport, err::Violation};
}
