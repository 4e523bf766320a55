use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::action::{AssignError, PairingError};
use crate::config::{parse_max_per_bundle, parse_seats, Config, ConfigError};
use crate::export::{self, ExportError, Summary};
use crate::greedy::Greedy;
use crate::loader::{self, LoadError};
use crate::model::entity::Seats;
use crate::registry::Registry;
use crate::synth::{self, SynthParams};

pub const USAGE: &str = "usage: slot-bundle <assign|demo|help> [--data DIR] [--demand N] [--max N] [--weekday DAY] [--out FILE] [--json]
  assign              book bundles for the venues and performers in DIR
  demo [VENUES] [SEED]  book bundles for a generated registry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Assign,
    Demo,
    Help,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("assign") => Some(Command::Assign),
        Some("demo") => Some(Command::Demo),
        Some("help" | "--help" | "-h") => Some(Command::Help),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Pairing(#[from] PairingError),
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("cannot write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub data_dir: Option<PathBuf>,
    pub demand: Option<Seats>,
    pub max_per_bundle: Option<Seats>,
    pub weekday: Option<String>,
    pub out: Option<PathBuf>,
    pub json: bool,
    pub positional: Vec<String>,
}

impl Options {
    /// Flags win over the environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(demand) = self.demand {
            config.demand = Some(demand);
        }
        if let Some(max) = self.max_per_bundle {
            config.max_per_bundle = max;
        }
        if let Some(weekday) = &self.weekday {
            config.weekday = weekday.clone();
        }
    }
}

pub fn parse_options(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
        };
        match arg.as_str() {
            "--data" => options.data_dir = Some(PathBuf::from(value("--data")?)),
            "--demand" => options.demand = Some(parse_seats("--demand", &value("--demand")?)?),
            "--max" => options.max_per_bundle = Some(parse_max_per_bundle("--max", &value("--max")?)?),
            "--weekday" => options.weekday = Some(value("--weekday")?),
            "--out" => options.out = Some(PathBuf::from(value("--out")?)),
            "--json" => options.json = true,
            flag if flag.starts_with("--") => return Err(CliError::Usage(format!("unknown flag {flag}"))),
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let result = match parse_command(args) {
        Some(Command::Assign) => handle_assign(&args[2..]),
        Some(Command::Demo) => handle_demo(&args[2..]),
        Some(Command::Help) => {
            println!("{USAGE}");
            Ok(())
        }
        None => Err(CliError::Usage(USAGE.to_string())),
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}

fn handle_assign(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args)?;
    let mut config = Config::from_env()?;
    options.apply(&mut config);
    info!(data_dir = %config.data_dir.display(), "loading registry");
    let loaded = loader::load_dir(&config.data_dir)?;
    let demand = config.demand.unwrap_or(loaded.total_demand);
    run(loaded.registry, demand, &config, &options)
}

fn handle_demo(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args)?;
    let mut config = Config::from_env()?;
    options.apply(&mut config);
    let mut params = SynthParams::default();
    if let Some(venues) = options.positional.first() {
        params.venues = venues
            .parse()
            .map_err(|_| CliError::Usage(format!("venue count must be a number, got {venues:?}")))?;
    }
    if let Some(seed) = options.positional.get(1) {
        params.seed = seed
            .parse()
            .map_err(|_| CliError::Usage(format!("seed must be a number, got {seed:?}")))?;
    }
    info!(venues = params.venues, seed = params.seed, "generating registry");
    let registry = synth::generate(&params)?;
    let demand = match config.demand {
        Some(demand) => demand,
        None => registry.total_capacity().ok_or(AssignError::CapacityOverflow)?,
    };
    run(registry, demand, &config, &options)
}

fn run(mut registry: Registry, demand: Seats, config: &Config, options: &Options) -> Result<(), CliError> {
    let assignment = Greedy::new(config.params()).assign_all_bundles(&mut registry, demand)?;
    let summary = Summary::of(&assignment);
    info!(
        bundles = summary.bundles,
        seats_sold = summary.seats_sold,
        remaining_demand = summary.remaining_demand,
        "run complete"
    );

    if let Some(path) = &options.out {
        let file = File::create(path).map_err(|source| CliError::Output { path: path.clone(), source })?;
        export::write_csv(file, &registry, &assignment.tickets)?;
        info!(path = %path.display(), "tickets written");
    }
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    if options.json {
        export::write_json(&mut stdout, &registry, &assignment)?;
        writeln!(stdout).map_err(ExportError::from)?;
    } else if options.out.is_none() {
        export::write_csv(&mut stdout, &registry, &assignment.tickets)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command(&args(&["slot-bundle", "assign"])), Some(Command::Assign));
        assert_eq!(parse_command(&args(&["slot-bundle", "demo", "8"])), Some(Command::Demo));
        assert_eq!(parse_command(&args(&["slot-bundle", "-h"])), Some(Command::Help));
        assert_eq!(parse_command(&args(&["slot-bundle", "optimize"])), None);
        assert_eq!(parse_command(&args(&["slot-bundle"])), None);
    }

    #[test]
    fn parses_flags_and_positionals() {
        let options = parse_options(&args(&["16", "--max", "4", "--json", "--demand", "30", "9"])).unwrap();
        assert_eq!(options.max_per_bundle, Some(4));
        assert_eq!(options.demand, Some(30));
        assert!(options.json);
        assert_eq!(options.positional, vec!["16".to_string(), "9".to_string()]);
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(parse_options(&args(&["--max"])), Err(CliError::Usage(_))));
        assert!(matches!(parse_options(&args(&["--max", "0"])), Err(CliError::Config(_))));
        assert!(matches!(parse_options(&args(&["--fast"])), Err(CliError::Usage(_))));
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let options = parse_options(&args(&["--weekday", "Sunday", "--data", "/tmp/x"])).unwrap();
        options.apply(&mut config);
        assert_eq!(config.weekday, "Sunday");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
        assert_eq!(config.demand, None);
    }
}
