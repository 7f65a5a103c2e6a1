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
    config::{FormulationConfig, RunnerConfig},
    diagnose::{Diagnosis, InfeasibilityDiagnoser},
    engine::{EngineStatus, MilpEngine},
    err::SolverError,
    extract::{extract_record, results_file_name},
    formulation::{
        Formulation, FormulationKind, position_assignment::PositionAssignment,
        relative_position::RelativePosition, sequencing::Sequencing, time_indexed::TimeIndexed,
    },
    milp::{MilpModel, lp_format::write_lp},
    warm_start::{WarmStartMode, WarmStartReport},
};
use berth_milp_model::{instance::Instance, solution::SolutionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

/// Files written for an infeasible model.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub diagnosis: Diagnosis,
    pub model_path: PathBuf,
    pub iis_path: PathBuf,
    pub instance_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub kind: FormulationKind,
    pub status: EngineStatus,
    pub record: SolutionRecord,
    pub results_path: PathBuf,
    pub warm_start: Option<WarmStartReport>,
    pub n_vars: usize,
    pub n_constraints: usize,
    pub diagnosis: Option<DiagnosisReport>,
}

/// Build, warm start, solve, extract and persist one formulation.
#[derive(Debug, Clone)]
pub struct SolveRunner<E: MilpEngine> {
    engine: E,
    config: RunnerConfig,
}

impl<E: MilpEngine> SolveRunner<E> {
    #[inline]
    pub fn new(engine: E, config: RunnerConfig) -> Self {
        Self { engine, config }
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn run<F: Formulation>(
        &self,
        formulation: &F,
        instance: &Instance,
        warm_start: Option<(&SolutionRecord, WarmStartMode)>,
    ) -> Result<SolveReport, SolverError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let kind = formulation.kind();

        let mut built = formulation.build(instance)?;
        tracing::info!(
            "Built {} model for {}: {} variables, {} constraints, horizon {}",
            kind,
            instance.name(),
            built.model.n_vars(),
            built.model.n_constraints(),
            built.bounds.horizon()
        );

        let warm_start =
            warm_start.map(|(solution, mode)| formulation.load_warm_start(&mut built, instance, solution, mode));

        let outcome = self.engine.solve(&built.model, &self.config.engine)?;
        tracing::info!(
            "{} finished with status {} in {:.2}s",
            self.engine.name(),
            outcome.status,
            outcome.runtime.as_secs_f64()
        );

        let record = extract_record(formulation, &built, instance, &outcome, clock.elapsed())?;
        fs::create_dir_all(&self.config.output_dir)?;
        let results_path = self
            .config
            .output_dir
            .join(results_file_name(instance, kind));
        record.save(&results_path)?;
        tracing::info!("Results written to {}", results_path.display());

        let diagnosis = if outcome.status == EngineStatus::Infeasible && self.config.diagnose_infeasibility {
            Some(self.diagnose(&built.model, instance, kind)?)
        } else {
            None
        };

        Ok(SolveReport {
            started_at,
            finished_at: Utc::now(),
            kind,
            status: outcome.status,
            record,
            results_path,
            warm_start,
            n_vars: built.model.n_vars(),
            n_constraints: built.model.n_constraints(),
            diagnosis,
        })
    }

    /// Runs the formulation named by `kind`.
    pub fn run_kind(
        &self,
        kind: FormulationKind,
        config: &FormulationConfig,
        instance: &Instance,
        warm_start: Option<(&SolutionRecord, WarmStartMode)>,
    ) -> Result<SolveReport, SolverError> {
        let config = config.clone();
        match kind {
            FormulationKind::PositionAssignment => {
                self.run(&PositionAssignment::new(config), instance, warm_start)
            }
            FormulationKind::RelativePosition => {
                self.run(&RelativePosition::new(config), instance, warm_start)
            }
            FormulationKind::Sequencing => self.run(&Sequencing::new(config), instance, warm_start),
            FormulationKind::TimeIndexed => self.run(&TimeIndexed::new(config), instance, warm_start),
        }
    }

    fn diagnose(
        &self,
        model: &MilpModel,
        instance: &Instance,
        kind: FormulationKind,
    ) -> Result<DiagnosisReport, SolverError> {
        let mut params = self.config.engine.clone();
        params.time_limit = self.config.probe_time_limit;
        let diagnosis = InfeasibilityDiagnoser::new(&self.engine, params).diagnose(model)?;

        let dir = &self.config.output_dir;
        let stem = instance.basename();
        let tag = kind.short_name();
        let model_path = dir.join(format!("infeas-{}-{}model.lp", stem, tag));
        let iis_path = dir.join(format!("infeas-{}-{}iis.ilp", stem, tag));
        let instance_path = dir.join(format!("infeas-{}-instance.txt", stem));

        write_model(&model_path, model)?;
        write_model(&iis_path, &diagnosis.subset(model))?;
        fs::write(&instance_path, instance.to_string())?;

        tracing::info!(
            "Infeasible model. Model written to {}. Conflicting subset of {} constraints written to {}.",
            model_path.display(),
            diagnosis.len(),
            iis_path.display()
        );

        Ok(DiagnosisReport {
            diagnosis,
            model_path,
            iis_path,
            instance_path,
        })
    }
}

fn write_model(path: &Path, model: &MilpModel) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_lp(model, &mut w)?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineParams,
        engine::highs::HighsEngine,
        formulation::test_support::tiny,
    };
    use berth_milp_model::solution::ShipMooring;
    use std::time::Duration;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "berth-milp-runner-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn runner(dir: &Path, diagnose: bool) -> SolveRunner<HighsEngine> {
        SolveRunner::new(
            HighsEngine,
            RunnerConfig {
                output_dir: dir.to_path_buf(),
                engine: EngineParams::default().with_time_limit(Duration::from_secs(60)),
                diagnose_infeasibility: diagnose,
                probe_time_limit: Duration::from_secs(10),
            },
        )
    }

    #[test]
    fn test_run_persists_record() {
        let dir = scratch_dir("persist");
        let inst = tiny();
        let report = runner(&dir, false)
            .run_kind(FormulationKind::Sequencing, &FormulationConfig::default(), &inst, None)
            .unwrap();

        assert_eq!(report.status, EngineStatus::Optimal);
        assert_eq!(report.results_path, dir.join("results-tiny-ssolver.json"));
        assert_eq!(report.record.makespan, Some(4.0));
        assert!(report.diagnosis.is_none());
        assert!(report.record.solve_time <= report.record.total_time);

        let loaded = SolutionRecord::load(&report.results_path).unwrap();
        assert_eq!(loaded, report.record);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_warm_start_from_other_formulation() {
        let dir = scratch_dir("warm");
        let inst = tiny();
        let r = runner(&dir, false);
        let first = r
            .run_kind(FormulationKind::RelativePosition, &FormulationConfig::default(), &inst, None)
            .unwrap();
        let second = r
            .run_kind(
                FormulationKind::PositionAssignment,
                &FormulationConfig::default(),
                &inst,
                Some((&first.record, WarmStartMode::Hint)),
            )
            .unwrap();
        let ws = second.warm_start.unwrap();
        assert_eq!(ws.applied, 3);
        assert_eq!(second.record.makespan, Some(4.0));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_infeasible_fixed_start_is_diagnosed() {
        let dir = scratch_dir("infeasible");
        let inst = tiny();
        let overlapping = SolutionRecord::with_schedule(
            2.0,
            0.0,
            0.0,
            0.0,
            vec![
                ShipMooring {
                    data_ship_id: 0,
                    data_arrival_time: 0,
                    data_handling_time: 2,
                    data_ship_length: 2.0,
                    data_ship_length_in_berths: 2,
                    mooring_time: 0,
                    completion_time: 1,
                    mooring_position: 0.0,
                    mooring_berth: 0,
                },
                ShipMooring {
                    data_ship_id: 1,
                    data_arrival_time: 0,
                    data_handling_time: 3,
                    data_ship_length: 1.0,
                    data_ship_length_in_berths: 1,
                    mooring_time: 1,
                    completion_time: 3,
                    mooring_position: 1.0,
                    mooring_berth: 1,
                },
            ],
        );

        let report = runner(&dir, true)
            .run_kind(
                FormulationKind::RelativePosition,
                &FormulationConfig::default(),
                &inst,
                Some((&overlapping, WarmStartMode::Fix)),
            )
            .unwrap();

        assert_eq!(report.status, EngineStatus::Infeasible);
        assert!(!report.record.feasible);
        let d = report.diagnosis.unwrap();
        assert_eq!(d.model_path, dir.join("infeas-tiny-rpmodel.lp"));
        assert_eq!(d.iis_path, dir.join("infeas-tiny-rpiis.ilp"));
        assert!(d.model_path.is_file() && d.iis_path.is_file());
        let dump = fs::read_to_string(&d.instance_path).unwrap();
        assert!(dump.contains("Number of ships: 3"));
        let _ = fs::remove_dir_all(&dir);
    }
}
