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

use berth_milp_model::prelude::*;
use berth_milp_solver::prelude::*;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn generated(n_ships: usize, seed: u64) -> Instance {
    let config = GeneratorConfig::new()
        .with_ships(n_ships)
        .with_berths(8, 0.25)
        .with_footprints(1, 3)
        .with_periods(Some(60))
        .with_seed(seed);
    InstanceGenerator::new(config)
        .expect("generator config ok")
        .generate()
        .expect("instance ok")
}

fn bench_build<F: Formulation>(c: &mut Criterion, label: &str, f: F, instance: &Instance) {
    c.bench_function(label, |b| {
        b.iter(|| {
            let built = f.build(black_box(instance)).expect("build ok");
            black_box(built.model.n_constraints())
        })
    });
}

fn bench_formulations(c: &mut Criterion) {
    let small = generated(8, 7);
    let medium = generated(20, 11);
    let config = FormulationConfig::default();

    bench_build(c, "PositionAssignment build (8 ships)", PositionAssignment::new(config.clone()), &small);
    bench_build(c, "RelativePosition build (20 ships)", RelativePosition::new(config.clone()), &medium);
    bench_build(c, "Sequencing build (20 ships)", Sequencing::new(config.clone()), &medium);
    bench_build(c, "TimeIndexed build (20 ships)", TimeIndexed::new(config), &medium);
}

fn bench_lp_export(c: &mut Criterion) {
    let instance = generated(20, 3);
    let built = Sequencing::default().build(&instance).expect("build ok");
    c.bench_function("write_lp Sequencing (20 ships)", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1 << 16);
            write_lp(black_box(&built.model), &mut out).expect("write ok");
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_formulations, bench_lp_export);
criterion_main!(benches);
