//! Closed-loop empirical research cycle runner.
//!
//! Drives a controller described by a TOML descriptor. Each `step`
//! invocation restores persisted state, advances one step, and persists
//! the result, so a cycle can span many process invocations (cron jobs,
//! manual sessions) without losing position.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use aer::controller::{Controller, StepOutcome};
use aer::core::planner::Planner;
use aer::core::record::{DataTable, Payload, RecordKind, Theory};
use aer::core::state::CycleState;
use aer::io::descriptor::{StepCatalog, StepSpec, load_controller};
use aer::io::snapshot;
use aer::logging;
use aer::registry::StepExecutor;

#[derive(Parser)]
#[command(
    name = "aer",
    version,
    about = "Resumable closed-loop empirical research cycle runner"
)]
struct Cli {
    /// Log progress at info level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log internals at debug level.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run exactly one cycle step and persist the updated state.
    Step {
        /// Controller descriptor (TOML).
        descriptor: PathBuf,
        /// Directory holding the state snapshot.
        directory: PathBuf,
        /// Run this registered step instead of the planned one.
        #[arg(long)]
        step_name: Option<String>,
    },
    /// Advance several steps, persisting state after each one.
    Run {
        /// Controller descriptor (TOML).
        descriptor: PathBuf,
        /// Directory holding the state snapshot.
        directory: PathBuf,
        /// Number of steps to run.
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Print a summary of the persisted state.
    Show {
        /// Directory holding the state snapshot.
        directory: PathBuf,
        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.verbose);

    match cli.command {
        Command::Step {
            descriptor,
            directory,
            step_name,
        } => cmd_step(&descriptor, &directory, step_name),
        Command::Run {
            descriptor,
            directory,
            steps,
        } => cmd_run(&descriptor, &directory, steps),
        Command::Show { directory, json } => cmd_show(&directory, json),
    }
}

fn cmd_step(descriptor: &Path, directory: &Path, step_name: Option<String>) -> Result<()> {
    let mut controller = restore_controller(descriptor, directory)?;
    if let Some(step) = step_name {
        info!(step = %step, "forcing next step");
        controller.planner = Planner::fixed(step);
    }
    let outcome = controller.advance().context("advance cycle")?;
    controller.dump(directory).context("dump state")?;
    print_outcome(&outcome);
    Ok(())
}

fn cmd_run(descriptor: &Path, directory: &Path, steps: u32) -> Result<()> {
    let mut controller = restore_controller(descriptor, directory)?;
    for _ in 0..steps {
        let outcome = controller.advance().context("advance cycle")?;
        // Checkpoint after every step so an interruption loses at most the
        // step in flight.
        controller.dump(directory).context("dump state")?;
        print_outcome(&outcome);
    }
    Ok(())
}

fn cmd_show(directory: &Path, json: bool) -> Result<()> {
    let state = snapshot::load_state(directory).context("load state")?;
    let summary = StateSummary::from_state(&state);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!(
        "show: records={} steps_completed={} cycles={}",
        summary.records, summary.steps_completed, summary.cycles
    );
    let kind_counts = RecordKind::ALL
        .iter()
        .map(|kind| format!("{}={}", kind.name(), summary.kinds[kind.name()]))
        .collect::<Vec<_>>()
        .join(" ");
    println!("show: {kind_counts}");
    if let Some(last) = &summary.last_step {
        println!("show: last_step={last}");
    }
    Ok(())
}

/// Build the controller from the descriptor, then restore the snapshot if
/// one exists. A missing snapshot means a fresh cycle, not an error.
fn restore_controller(descriptor: &Path, directory: &Path) -> Result<Controller> {
    let mut controller =
        load_controller(descriptor, &builtin_catalog()).context("load descriptor")?;
    debug!(
        steps = %controller.registry().names().collect::<Vec<_>>().join(", "),
        "controller built"
    );
    if snapshot::snapshot_path(directory).exists() {
        controller.load(directory).context("load state")?;
    } else {
        info!(directory = %directory.display(), "no snapshot found, starting fresh");
    }
    Ok(controller)
}

fn print_outcome(outcome: &StepOutcome) {
    if outcome.records.is_empty() {
        println!("step: step={} records=0", outcome.step);
        return;
    }
    for record in &outcome.records {
        match record.payload() {
            Payload::Conditions(table) | Payload::Observations(table) => println!(
                "step: step={} record={} kind={} rows={}",
                outcome.step,
                record.index(),
                record.kind().name(),
                table.num_rows()
            ),
            _ => println!(
                "step: step={} record={} kind={}",
                outcome.step,
                record.index(),
                record.kind().name()
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct StateSummary {
    records: usize,
    steps_completed: u64,
    last_step: Option<String>,
    cycles: usize,
    kinds: BTreeMap<&'static str, usize>,
}

impl StateSummary {
    fn from_state(state: &CycleState) -> Self {
        let history = state.history();
        let kinds = RecordKind::ALL
            .iter()
            .map(|kind| (kind.name(), history.by_kind(*kind).count()))
            .collect();
        Self {
            records: history.len(),
            steps_completed: state.steps_completed(),
            last_step: state.last_step().map(str::to_string),
            cycles: history.cycle_count(),
            kinds,
        }
    }
}

/// Step implementations the CLI registers for descriptor resolution.
///
/// These are data plumbing, not modeling: inline tables from descriptor
/// params, observation replay from JSON files dropped by an external lab
/// process, and labeled theory stamps for wiring up cycles end to end.
fn builtin_catalog() -> StepCatalog {
    StepCatalog::new()
        .with_builder("inline_conditions", |spec| {
            let table = table_from_params(spec)?;
            Ok(Box::new(InlineTableStep {
                payload: Payload::Conditions(table),
            }) as Box<dyn StepExecutor>)
        })
        .with_builder("inline_observations", |spec| {
            let table = table_from_params(spec)?;
            Ok(Box::new(InlineTableStep {
                payload: Payload::Observations(table),
            }) as Box<dyn StepExecutor>)
        })
        .with_builder("observations_file", |spec| {
            let params: FileParams = parse_params(spec)?;
            Ok(Box::new(ObservationsFileStep { path: params.path }) as Box<dyn StepExecutor>)
        })
        .with_builder("label_theory", |spec| {
            let params: LabelParams = parse_params(spec)?;
            Ok(Box::new(LabelTheoryStep {
                label: params.label,
            }) as Box<dyn StepExecutor>)
        })
}

fn parse_params<T: serde::de::DeserializeOwned>(spec: &StepSpec) -> Result<T> {
    toml::Value::Table(spec.params.clone())
        .try_into()
        .context("parse step params")
}

#[derive(Debug, Deserialize)]
struct TableParams {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct FileParams {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct LabelParams {
    label: String,
}

fn table_from_params(spec: &StepSpec) -> Result<DataTable> {
    let params: TableParams = parse_params(spec)?;
    Ok(DataTable {
        columns: params.columns,
        rows: params.rows,
    })
}

/// Emits one fixed payload built from descriptor params.
struct InlineTableStep {
    payload: Payload,
}

impl StepExecutor for InlineTableStep {
    fn execute(&self, _state: &CycleState) -> Result<Vec<Payload>> {
        Ok(vec![self.payload.clone()])
    }
}

/// Replays observation rows from a JSON file written by an external
/// collector.
struct ObservationsFileStep {
    path: PathBuf,
}

impl StepExecutor for ObservationsFileStep {
    fn execute(&self, _state: &CycleState) -> Result<Vec<Payload>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read observations {}", self.path.display()))?;
        let table: DataTable = serde_json::from_str(&contents)
            .with_context(|| format!("parse observations {}", self.path.display()))?;
        Ok(vec![Payload::Observations(table)])
    }
}

/// Stamps a theory record noting how many observation batches it covers.
struct LabelTheoryStep {
    label: String,
}

impl StepExecutor for LabelTheoryStep {
    fn execute(&self, state: &CycleState) -> Result<Vec<Payload>> {
        let batches = state.history().by_kind(RecordKind::Observation).count();
        Ok(vec![Payload::Theory(Theory {
            label: format!("{} (over {} observation batches)", self.label, batches),
            blob: Vec::new(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use clap::Parser;

    use super::{Cli, Command, StateSummary, builtin_catalog, table_from_params};
    use aer::core::planner::Planner;
    use aer::core::record::Payload;
    use aer::core::state::CycleState;
    use aer::io::descriptor::{Descriptor, StepSpec, build_controller};
    use aer::test_support::{observation, theory};

    #[test]
    fn parses_step_with_override() {
        let cli = Cli::parse_from([
            "aer",
            "step",
            "cycle.toml",
            "state/",
            "--step-name",
            "collect",
        ]);
        match cli.command {
            Command::Step {
                descriptor,
                directory,
                step_name,
            } => {
                assert_eq!(descriptor.to_str(), Some("cycle.toml"));
                assert_eq!(directory.to_str(), Some("state/"));
                assert_eq!(step_name.as_deref(), Some("collect"));
            }
            _ => panic!("expected step command"),
        }
    }

    #[test]
    fn run_defaults_to_one_step() {
        let cli = Cli::parse_from(["aer", "run", "cycle.toml", "state/"]);
        match cli.command {
            Command::Run { steps, .. } => assert_eq!(steps, 1),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn verbose_flag_is_global() {
        let cli = Cli::parse_from(["aer", "show", "state/", "--verbose"]);
        assert!(cli.verbose);
        assert!(!cli.debug);
    }

    #[test]
    fn summary_counts_every_kind() {
        let state = CycleState::seeded(vec![
            observation(1.0, 2.0),
            observation(3.0, 4.0),
            theory("linear", vec![1]),
        ]);
        let summary = StateSummary::from_state(&state);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.kinds["observation"], 2);
        assert_eq!(summary.kinds["theory"], 1);
        assert_eq!(summary.kinds["condition"], 0);
        assert_eq!(summary.kinds["metadata"], 0);
    }

    fn spec(implementation: &str, params: &str) -> StepSpec {
        StepSpec {
            implementation: implementation.to_string(),
            params: toml::from_str(params).expect("parse params"),
        }
    }

    #[test]
    fn inline_table_params_accept_integer_rows() {
        let spec = spec("inline_conditions", "columns = [\"x\", \"y\"]\nrows = [[1, 2.5], [3, 4]]");
        let table = table_from_params(&spec).expect("table");
        assert_eq!(table.columns, vec!["x", "y"]);
        assert_eq!(table.rows, vec![vec![1.0, 2.5], vec![3.0, 4.0]]);
    }

    #[test]
    fn missing_columns_fail_to_build() {
        let spec = spec("inline_conditions", "rows = [[1.0]]");
        let mut steps = BTreeMap::new();
        steps.insert("propose".to_string(), spec);
        let descriptor = Descriptor {
            planner: Planner::fixed("propose"),
            steps,
        };
        assert!(build_controller(&descriptor, &builtin_catalog()).is_err());
    }

    #[test]
    fn label_theory_counts_observation_batches() {
        let mut steps = BTreeMap::new();
        steps.insert(
            "collect".to_string(),
            spec(
                "inline_observations",
                "columns = [\"x\", \"y\"]\nrows = [[1.0, 2.0]]",
            ),
        );
        steps.insert("fit".to_string(), spec("label_theory", "label = \"linear\""));
        let descriptor = Descriptor {
            planner: Planner::Schedule {
                steps: vec![
                    "collect".to_string(),
                    "collect".to_string(),
                    "fit".to_string(),
                ],
            },
            steps,
        };

        let mut controller = build_controller(&descriptor, &builtin_catalog()).expect("build");
        controller.advance().expect("first collect");
        controller.advance().expect("second collect");
        let outcome = controller.advance().expect("fit");
        match outcome.records[0].payload() {
            Payload::Theory(theory) => {
                assert!(theory.label.contains("linear"));
                assert!(theory.label.contains("2 observation batches"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn observations_file_replays_json_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let data_path = temp.path().join("batch.json");
        std::fs::write(
            &data_path,
            "{\"columns\": [\"x\", \"y\"], \"rows\": [[0.5, 1.5]]}",
        )
        .expect("write data");

        let mut steps = BTreeMap::new();
        steps.insert(
            "collect".to_string(),
            spec(
                "observations_file",
                &format!("path = {:?}", data_path.to_str().expect("utf-8 path")),
            ),
        );
        let descriptor = Descriptor {
            planner: Planner::fixed("collect"),
            steps,
        };

        let mut controller = build_controller(&descriptor, &builtin_catalog()).expect("build");
        let outcome = controller.advance().expect("collect");
        match outcome.records[0].payload() {
            Payload::Observations(table) => {
                assert_eq!(table.columns, vec!["x", "y"]);
                assert_eq!(table.rows, vec![vec![0.5, 1.5]]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
