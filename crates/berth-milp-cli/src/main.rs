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

mod err;

use berth_milp_model::{
    common::ShipIdentifier,
    generator::{GeneratorConfig, InstanceGenerator},
    instance::{Discretization, Instance, loader::InstanceLoader, writer::write_row_form},
    solution::SolutionRecord,
    validation::SolutionVerifier,
};
use berth_milp_solver::{
    config::{EngineParams, FormulationConfig, RunnerConfig},
    engine::highs::HighsEngine,
    formulation::FormulationKind,
    runner::SolveRunner,
    warm_start::WarmStartMode,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use err::CliError;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Parser)]
#[command(name = "berth-milp", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct BerthMilp {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build one of the MILP models for an instance and solve it
    Solve(SolveArgs),
    /// Check a solution file against its instance
    Verify(VerifyArgs),
    /// Draw a random instance in row form
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    #[value(alias = "position-assignment")]
    Pa,
    #[value(alias = "relative-position")]
    Rp,
    #[value(alias = "sequencing")]
    S,
    #[value(alias = "time-indexed")]
    Ti,
}

impl From<ModelArg> for FormulationKind {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::Pa => FormulationKind::PositionAssignment,
            ModelArg::Rp => FormulationKind::RelativePosition,
            ModelArg::S => FormulationKind::Sequencing,
            ModelArg::Ti => FormulationKind::TimeIndexed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiscretizationArg {
    Conservative,
    Aggressive,
}

impl From<DiscretizationArg> for Discretization {
    fn from(d: DiscretizationArg) -> Self {
        match d {
            DiscretizationArg::Conservative => Discretization::Conservative,
            DiscretizationArg::Aggressive => Discretization::Aggressive,
        }
    }
}

#[derive(Debug, Args)]
struct SolveArgs {
    /// Path to the instance file
    #[arg(short, long)]
    instance: PathBuf,
    /// Model to use
    #[arg(short, long, value_enum)]
    model: ModelArg,
    /// Truncate the instance to the first n ships
    #[arg(short, long)]
    truncate: Option<usize>,
    /// Comma separated ids of the ships to retain
    #[arg(short = 'x', long = "cut", value_delimiter = ',')]
    cut: Option<Vec<usize>>,
    /// Solution file used as a starting point
    #[arg(short = 's', long)]
    starting_solution: Option<PathBuf>,
    /// Fix the starting solution instead of passing it as a hint
    #[arg(short = 'f', long, requires = "starting_solution")]
    fix_starting: bool,
    /// Isolate a conflicting constraint subset when the model is infeasible
    #[arg(short = 'z', long)]
    compute_iis: bool,
    /// Print the instance before solving
    #[arg(short, long)]
    print: bool,
    /// Directory receiving results and diagnosis files
    #[arg(short, long = "output-folder", default_value = "results")]
    output_folder: PathBuf,
    /// Wall clock limit of the engine in seconds
    #[arg(long, default_value_t = 3600)]
    time_limit: u64,
    /// Directory searched for instances given by bare name
    #[arg(long, default_value = "instances")]
    instance_dir: PathBuf,
    #[arg(long)]
    no_symmetry_breaking: bool,
    /// Drop the valid inequalities of the sequencing core
    #[arg(long, conflicts_with = "valid_inequalities")]
    no_valid_inequalities: bool,
    /// Add the valid inequalities of the sequencing core (off by default for ti)
    #[arg(long)]
    valid_inequalities: bool,
    /// Coarsen time by this many periods per step
    #[arg(long)]
    granularity: Option<i64>,
    #[arg(long, value_enum, default_value_t = DiscretizationArg::Conservative)]
    discretization: DiscretizationArg,
    /// Also write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl SolveArgs {
    fn formulation_config(&self) -> FormulationConfig {
        let mut config = FormulationConfig::default();
        config.symmetry_breaking = !self.no_symmetry_breaking;
        config.valid_inequalities = match (self.valid_inequalities, self.no_valid_inequalities) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        config
    }

    fn prepare_instance(&self) -> Result<Instance, CliError> {
        let mut instance = InstanceLoader::new()
            .instance_dir(&self.instance_dir)
            .load(&self.instance)?;
        if let Some(n) = self.truncate {
            instance = instance.truncate(n)?;
        }
        if let Some(ids) = &self.cut {
            instance = instance.reduce(ids.iter().map(|&id| ShipIdentifier::new(id)))?;
        }
        if let Some(g) = self.granularity {
            instance = instance.discretize(g, self.discretization.into())?;
        }
        Ok(instance)
    }

    fn run(&self) -> Result<(), CliError> {
        let instance = self.prepare_instance()?;
        if self.print {
            println!("{}", instance);
        }

        let starting = match &self.starting_solution {
            Some(path) => {
                tracing::info!("Using a starting solution. Fix = {}.", self.fix_starting);
                let mode = if self.fix_starting {
                    WarmStartMode::Fix
                } else {
                    WarmStartMode::Hint
                };
                Some((SolutionRecord::load(path)?, mode))
            }
            None => None,
        };

        let runner = SolveRunner::new(
            HighsEngine,
            RunnerConfig {
                output_dir: self.output_folder.clone(),
                engine: EngineParams::default().with_time_limit(Duration::from_secs(self.time_limit)),
                diagnose_infeasibility: self.compute_iis,
                ..RunnerConfig::default()
            },
        );
        let report = runner.run_kind(
            self.model.into(),
            &self.formulation_config(),
            &instance,
            starting.as_ref().map(|(record, mode)| (record, *mode)),
        )?;

        let record = &report.record;
        match (record.makespan, record.dual_bound) {
            (Some(makespan), bound) => tracing::info!(
                "{} on {}: makespan={}, bound={:?}, status={}",
                report.kind,
                instance.name(),
                makespan,
                bound,
                report.status
            ),
            (None, _) if record.feasible => {
                tracing::warn!("No schedule found for {} within the time limit", instance.name())
            }
            _ => tracing::warn!("{} model of {} is infeasible", report.kind, instance.name()),
        }
        tracing::info!(
            "Finished in {} ms",
            (report.finished_at - report.started_at).num_milliseconds()
        );

        if let Some(path) = &self.report {
            let mut w = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut w, &report)?;
            w.flush()?;
            tracing::info!("Wrote run report to {}", path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// Path to the instance file
    #[arg(short, long)]
    instance: PathBuf,
    /// Path to the solution file
    #[arg(short, long)]
    solution: PathBuf,
    #[arg(long, default_value = "instances")]
    instance_dir: PathBuf,
}

impl VerifyArgs {
    fn run(&self) -> Result<(), CliError> {
        let instance = InstanceLoader::new()
            .instance_dir(&self.instance_dir)
            .load(&self.instance)?;
        let record = SolutionRecord::load(&self.solution)?;
        if !record.has_schedule() {
            println!("Solution file contains no schedule.");
            return Ok(());
        }
        let report = SolutionVerifier::verify(&instance, &record);
        if report.is_valid() {
            println!("No violations found.");
        } else {
            print!("{}", report);
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Number of ships
    #[arg(short = 'n', long, default_value_t = 10)]
    ships: usize,
    /// Number of uniform berths
    #[arg(short = 'b', long, default_value_t = 12)]
    berths: usize,
    #[arg(long, default_value_t = 0.25)]
    berth_length: f64,
    /// Smallest ship footprint in berths
    #[arg(long, default_value_t = 1)]
    min_footprint: usize,
    /// Largest ship footprint in berths
    #[arg(long, default_value_t = 3)]
    max_footprint: usize,
    /// Average time between two arrivals
    #[arg(long, default_value_t = 4.0)]
    mean_interarrival: f64,
    #[arg(long, default_value_t = 12.0)]
    processing_mean: f64,
    #[arg(long, default_value_t = 4.0)]
    processing_sigma: f64,
    /// Horizon written into the instance
    #[arg(long)]
    periods: Option<i64>,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// File to write; stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl GenerateArgs {
    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new()
            .with_ships(self.ships)
            .with_berths(self.berths, self.berth_length)
            .with_footprints(self.min_footprint, self.max_footprint)
            .with_periods(self.periods)
            .with_seed(self.seed);
        config.mean_interarrival = self.mean_interarrival;
        config.processing_mean = self.processing_mean;
        config.processing_sigma = self.processing_sigma;
        config
    }

    fn run(&self) -> Result<(), CliError> {
        let instance = InstanceGenerator::new(self.config())?.generate()?;
        match &self.output {
            Some(path) => {
                let mut w = BufWriter::new(File::create(path)?);
                write_row_form(&instance, &mut w)?;
                w.flush()?;
                tracing::info!(
                    "Wrote {} ships on {} berths to {}",
                    instance.n_ships(),
                    instance.n_berths(),
                    path.display()
                );
            }
            None => write_row_form(&instance, std::io::stdout().lock())?,
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    enable_tracing();

    let cli = BerthMilp::parse();
    let result = match &cli.command {
        Command::Solve(args) => args.run(),
        Command::Verify(args) => args.run(),
        Command::Generate(args) => args.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> BerthMilp {
        BerthMilp::try_parse_from(std::iter::once("berth-milp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_consistent() {
        BerthMilp::command().debug_assert();
    }

    #[test]
    fn test_solve_arguments() {
        let cli = parse(&[
            "solve", "-i", "inst.txt", "-m", "ti", "-t", "5", "-x", "0,3,4", "-s", "start.json", "-f",
            "--no-symmetry-breaking",
        ]);
        let Command::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(FormulationKind::from(args.model), FormulationKind::TimeIndexed);
        assert_eq!(args.truncate, Some(5));
        assert_eq!(args.cut, Some(vec![0, 3, 4]));
        assert!(args.fix_starting);
        assert_eq!(args.output_folder, PathBuf::from("results"));
        let config = args.formulation_config();
        assert!(!config.symmetry_breaking);
        assert_eq!(config.valid_inequalities, None);
    }

    #[test]
    fn test_long_model_names_and_toggles() {
        let cli = parse(&["solve", "-i", "a", "-m", "relative-position", "--no-valid-inequalities"]);
        let Command::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(args.model, ModelArg::Rp);
        assert_eq!(args.formulation_config().valid_inequalities, Some(false));
    }

    #[test]
    fn test_fix_requires_starting_solution() {
        let res = BerthMilp::try_parse_from(["berth-milp", "solve", "-i", "a", "-m", "s", "-f"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["generate", "-n", "6"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.config();
        assert_eq!(config.n_ships, 6);
        assert_eq!(config.n_berths, 12);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }
}
