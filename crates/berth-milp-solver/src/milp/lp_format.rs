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

use crate::milp::{LinearConstraint, MilpModel, Sense, VarId, VarKind};
use std::io::Write;

fn fmt_bound(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}

fn write_terms<W: Write>(w: &mut W, model: &MilpModel, terms: &[(VarId, f64)]) -> std::io::Result<()> {
    if terms.is_empty() {
        // LP text needs at least one term per row.
        if let Some(first) = model.vars().first() {
            write!(w, " 0 {}", first.name)?;
        }
        return Ok(());
    }
    for (v, c) in terms {
        let sign = if *c < 0.0 { '-' } else { '+' };
        write!(w, " {} {} {}", sign, c.abs(), model.var(*v).name)?;
    }
    Ok(())
}

fn write_row<W: Write>(w: &mut W, model: &MilpModel, c: &LinearConstraint) -> std::io::Result<()> {
    write!(w, " {}:", c.name())?;
    write_terms(w, model, c.terms())?;
    let sense = match c.sense() {
        Sense::Le => "<=",
        Sense::Ge => ">=",
        Sense::Eq => "=",
    };
    writeln!(w, " {} {}", sense, c.rhs())
}

/// Writes `model` in CPLEX LP text form.
pub fn write_lp<W: Write>(model: &MilpModel, mut w: W) -> std::io::Result<()> {
    writeln!(w, "\\ Model {}", model.name())?;
    writeln!(w, "Minimize")?;
    write!(w, " obj:")?;
    write_terms(&mut w, model, model.objective().terms())?;
    let constant = model.objective().constant_part();
    if constant != 0.0 {
        write!(w, " + {} __constant", constant)?;
    }
    writeln!(w)?;

    writeln!(w, "Subject To")?;
    for c in model.constraints() {
        write_row(&mut w, model, c)?;
    }

    writeln!(w, "Bounds")?;
    for def in model.vars() {
        match def.kind {
            VarKind::Binary if !def.is_fixed() => {}
            _ if def.is_fixed() => writeln!(w, " {} = {}", def.name, def.lower)?,
            _ => writeln!(
                w,
                " {} <= {} <= {}",
                fmt_bound(def.lower),
                def.name,
                fmt_bound(def.upper)
            )?,
        }
    }
    if constant != 0.0 {
        writeln!(w, " __constant = 1")?;
    }

    let generals: Vec<&str> = model
        .vars()
        .iter()
        .filter(|d| d.kind == VarKind::Integer)
        .map(|d| d.name.as_str())
        .collect();
    if !generals.is_empty() {
        writeln!(w, "General")?;
        for name in generals {
            writeln!(w, " {}", name)?;
        }
    }

    let binaries: Vec<&str> = model
        .vars()
        .iter()
        .filter(|d| d.kind == VarKind::Binary)
        .map(|d| d.name.as_str())
        .collect();
    if !binaries.is_empty() {
        writeln!(w, "Binary")?;
        for name in binaries {
            writeln!(w, " {}", name)?;
        }
    }

    writeln!(w, "End")?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::LinExpr;

    #[test]
    fn writes_sections_in_order() {
        let mut m = MilpModel::new("demo");
        let x = m.binary("x(0,1)");
        let s = m.integer("s(0)", 2.0, 9.0);
        let c = m.continuous("c(0)", 1.0, f64::INFINITY);
        m.add_constraint(
            "set_c",
            "set_c(0)",
            LinExpr::from(c).term(s, -1.0),
            Sense::Eq,
            3.0,
        );
        m.add_constraint("cap", "cap(0)", LinExpr::from(x), Sense::Le, 1.0);
        m.set_objective(LinExpr::from(c));
        m.fix(x, 1.0);

        let mut out = Vec::new();
        write_lp(&m, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\\ Model demo\n\
            Minimize\n obj: + 1 c(0)\n\
            Subject To\n set_c(0): - 1 s(0) + 1 c(0) = 3\n cap(0): + 1 x(0,1) <= 1\n\
            Bounds\n x(0,1) = 1\n 2 <= s(0) <= 9\n 1 <= c(0) <= +inf\n\
            General\n s(0)\n\
            Binary\n x(0,1)\n\
            End\n";
        assert_eq!(text, expected);
    }
}
