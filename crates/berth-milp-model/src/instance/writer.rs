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

use crate::instance::Instance;
use std::io::Write;

/// Writes `instance` in the whitespace separated row layout understood by
/// [`InstanceLoader`](crate::instance::loader::InstanceLoader). The horizon is
/// not part of that layout and is dropped.
pub fn write_row_form<W: Write>(instance: &Instance, mut w: W) -> std::io::Result<()> {
    writeln!(w, "{}", instance.n_ships())?;
    writeln!(w, "{}", instance.n_berths())?;
    for ship in instance.ships() {
        writeln!(
            w,
            "{} {} {} {} 0 0",
            ship.id().into_inner(),
            ship.arrival_time(),
            ship.length(),
            ship.processing_time()
        )?;
    }
    writeln!(w, "{}", instance.n_berths())?;
    let lengths: Vec<String> = instance.berth_lengths().iter().map(f64::to_string).collect();
    writeln!(w, "{}", lengths.join(" "))?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::builder::InstanceBuilder;

    #[test]
    fn writes_expected_layout() {
        let inst = InstanceBuilder::new()
            .with_uniform_berths(2, 0.5)
            .with_ship(7, 3, 4, 0.75)
            .build()
            .unwrap();
        let mut out = Vec::new();
        write_row_form(&inst, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n2\n7 3 0.75 4 0 0\n2\n0.5 0.5\n");
    }
}
