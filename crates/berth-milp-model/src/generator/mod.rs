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

pub mod config;
pub mod err;

pub use config::GeneratorConfig;

use crate::{
    common::ShipIdentifier,
    generator::err::{GeneratorConfigError, ProcessingDistributionError},
    instance::{Instance, Ship, builder::InstanceBuilder, err::InstanceError},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal};

/// Draws random instances: exponential inter-arrival gaps, clamped normal
/// processing times and uniform berth footprints.
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
    interarrival: Exp<f64>,
    processing: Normal<f64>,
    rng: ChaCha8Rng,
}

impl InstanceGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorConfigError> {
        config.validate()?;
        let interarrival = Exp::new(1.0 / config.mean_interarrival)
            .map_err(|_| GeneratorConfigError::InvalidInterarrival(config.mean_interarrival))?;
        let processing = Normal::new(config.processing_mean, config.processing_sigma).map_err(|_| {
            ProcessingDistributionError::new(
                config.processing_mean,
                config.processing_sigma,
                config.min_processing,
                config.max_processing,
            )
        })?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            interarrival,
            processing,
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Result<Instance, InstanceError> {
        let cfg = &self.config;
        let mut builder = InstanceBuilder::with_capacities(cfg.n_ships, cfg.n_berths)
            .with_name(format!("generated-n{}-s{}", cfg.n_ships, cfg.seed))
            .with_uniform_berths(cfg.n_berths, cfg.berth_length);
        if let Some(n) = cfg.n_periods {
            builder.set_periods(n);
        }

        let mut clock = 0.0_f64;
        for i in 0..cfg.n_ships {
            if i > 0 {
                clock += self.interarrival.sample(&mut self.rng);
            }
            let arrival = clock.floor() as i64;
            let processing = self.sample_processing();
            let footprint = self
                .rng
                .random_range(self.config.min_footprint..=self.config.max_footprint);
            let length = footprint as f64 * self.config.berth_length;
            builder.add_ship(Ship::new(ShipIdentifier::new(i), arrival, processing, length));
        }

        builder.build()
    }

    fn sample_processing(&mut self) -> i64 {
        let draw = self.processing.sample(&mut self.rng).round() as i64;
        let lower = draw.max(self.config.min_processing);
        match self.config.max_processing {
            Some(upper) => lower.min(upper),
            None => lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{loader::InstanceLoader, writer::write_row_form};

    #[test]
    fn same_seed_same_instance() {
        let cfg = GeneratorConfig::new().with_ships(15).with_seed(7);
        let a = InstanceGenerator::new(cfg.clone()).unwrap().generate().unwrap();
        let b = InstanceGenerator::new(cfg).unwrap().generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn respects_configured_ranges() {
        let cfg = GeneratorConfig {
            n_ships: 40,
            min_processing: 3,
            max_processing: Some(20),
            ..GeneratorConfig::default()
        };
        let inst = InstanceGenerator::new(cfg.clone()).unwrap().generate().unwrap();
        assert_eq!(inst.n_ships(), 40);
        assert_eq!(inst.n_berths(), cfg.n_berths);

        let footprints = inst.berth_footprints().unwrap();
        assert!(footprints.iter().all(|f| (1..=3).contains(f)));

        let mut last = 0;
        for s in inst.ships() {
            assert!(s.arrival_time() >= last);
            last = s.arrival_time();
            assert!((3..=20).contains(&s.processing_time()));
        }
        assert_eq!(inst.ship(0).unwrap().arrival_time(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = GeneratorConfig::new().with_berths(0, 1.0);
        assert!(matches!(
            InstanceGenerator::new(cfg),
            Err(GeneratorConfigError::NoBerths)
        ));
    }

    #[test]
    fn generated_instance_survives_row_form() {
        let inst = InstanceGenerator::new(GeneratorConfig::default())
            .unwrap()
            .generate()
            .unwrap();
        let mut out = Vec::new();
        write_row_form(&inst, &mut out).unwrap();
        let back = InstanceLoader::new()
            .from_row_str(inst.name(), std::str::from_utf8(&out).unwrap())
            .unwrap();
        assert_eq!(back, inst);
    }
}
