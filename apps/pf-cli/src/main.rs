use clap::{Parser, Subcommand};
use pf_core::UnitSystem;
use pf_engine::{
    BatchEntry, Conditions, ConditionsSpec, DocumentError, EngineError, Operation, Property, Request,
    StateSpec, execute, execute_batch, load_batch, load_request,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "psychroflow")]
#[command(about = "Psychroflow CLI - psychrometric states and HVAC processes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a full air state from two properties
    Resolve {
        #[command(flatten)]
        conditions: ConditionsArgs,
        /// First property, e.g. dry_bulb=75 or Tdb=75
        #[arg(value_parser = parse_assignment)]
        first: (Property, f64),
        /// Second property, e.g. relative_humidity=0.5 or RH=0.5
        #[arg(value_parser = parse_assignment)]
        second: (Property, f64),
    },
    /// Execute one request document (YAML, or JSON by extension)
    Run {
        /// Path to the request file
        path: PathBuf,
    },
    /// Execute a list of requests in parallel
    Batch {
        /// Path to the batch file
        path: PathBuf,
    },
    /// Standard-atmosphere pressure at an altitude
    Atmosphere {
        /// Unit system (IP or SI)
        #[arg(long, default_value = "IP")]
        units: UnitSystem,
        /// Altitude in ft (IP) or m (SI)
        #[arg(allow_hyphen_values = true)]
        altitude: f64,
    },
}

#[derive(clap::Args)]
struct ConditionsArgs {
    /// Unit system (IP or SI)
    #[arg(long, default_value = "IP")]
    units: UnitSystem,
    /// Barometric pressure in psia (IP) or Pa (SI)
    #[arg(long, conflicts_with = "altitude")]
    pressure: Option<f64>,
    /// Altitude in ft (IP) or m (SI)
    #[arg(long)]
    altitude: Option<f64>,
}

impl From<ConditionsArgs> for ConditionsSpec {
    fn from(args: ConditionsArgs) -> Self {
        ConditionsSpec {
            units: args.units,
            pressure: args.pressure,
            altitude: args.altitude,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{failed} of {total} batch requests failed")]
    BatchFailures { failed: usize, total: usize },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Resolve {
            conditions,
            first,
            second,
        } => cmd_resolve(conditions.into(), first, second),
        Commands::Run { path } => cmd_run(&path),
        Commands::Batch { path } => cmd_batch(&path),
        Commands::Atmosphere { units, altitude } => cmd_atmosphere(units, altitude),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_resolve(conditions: ConditionsSpec, first: (Property, f64), second: (Property, f64)) -> CliResult<()> {
    let request = Request {
        conditions,
        operation: Operation::ResolveState {
            state: StateSpec::new(first, second),
        },
    };
    print_json(&execute(&request)?)
}

fn cmd_run(path: &Path) -> CliResult<()> {
    let request = load_request(path)?;
    print_json(&execute(&request)?)
}

fn cmd_batch(path: &Path) -> CliResult<()> {
    let requests = load_batch(path)?;
    let entries: Vec<BatchEntry> = execute_batch(&requests).into_iter().map(BatchEntry::from).collect();
    print_json(&entries)?;

    let failed = entries
        .iter()
        .filter(|e| matches!(e, BatchEntry::Error { .. }))
        .count();
    if failed > 0 {
        return Err(CliError::BatchFailures {
            failed,
            total: entries.len(),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct Atmosphere {
    units: UnitSystem,
    altitude: f64,
    pressure: f64,
    pressure_unit: &'static str,
}

fn cmd_atmosphere(units: UnitSystem, altitude: f64) -> CliResult<()> {
    let conditions = Conditions::from_altitude(units, altitude)?;
    print_json(&Atmosphere {
        units,
        altitude,
        pressure: conditions.pressure(),
        pressure_unit: units.pressure_unit(),
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses `property=value`; the property may be a symbol (`Tdb`) or a field name.
fn parse_assignment(s: &str) -> Result<(Property, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected property=value, got '{s}'"))?;
    let property: Property = name.trim().parse().map_err(|e: EngineError| e.to_string())?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((property, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignments_accept_symbols_and_names() {
        assert_eq!(parse_assignment("Tdb=75").unwrap(), (Property::DryBulb, 75.0));
        assert_eq!(
            parse_assignment("relative_humidity = 0.5").unwrap(),
            (Property::RelativeHumidity, 0.5)
        );
        assert!(parse_assignment("Tdb").is_err());
        assert!(parse_assignment("Tdb=warm").is_err());
        assert!(parse_assignment("grains=50").is_err());
    }

    #[test]
    fn resolve_arguments_parse() {
        let cli = Cli::try_parse_from(["psychroflow", "resolve", "--units", "SI", "--altitude", "1500", "Tdb=24", "RH=0.5"])
            .unwrap();
        let Commands::Resolve {
            conditions,
            first,
            second,
        } = cli.command
        else {
            panic!("expected resolve");
        };
        assert_eq!(conditions.units, UnitSystem::Si);
        assert_eq!(conditions.altitude, Some(1500.0));
        assert_eq!(first, (Property::DryBulb, 24.0));
        assert_eq!(second, (Property::RelativeHumidity, 0.5));

        assert!(
            Cli::try_parse_from(["psychroflow", "resolve", "--pressure", "14.7", "--altitude", "10", "Tdb=70", "RH=0.5"])
                .is_err()
        );

        let err = Cli::try_parse_from(["psychroflow", "atmosphere", "--units", "metric", "1000"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unknown unit system 'metric'"), "{err}");
    }
}
