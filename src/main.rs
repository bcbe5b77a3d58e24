//! Multiversal -- command-line adjudicator for multiversal Diplomacy.
//!
//! Usage:
//!   multiversal new [--output FILE]
//!   multiversal adjudicate WORLD.json [--strict] [--seed N] [--output FILE]
//!   multiversal save WORLD.json [--strict] [--output FILE]
//!   multiversal replay SAVE.json... [--seed N]
//!
//! Worlds are read and written as JSON records. Logging goes to stderr and is
//! controlled by `RUST_LOG` (default: info).

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use multiversal::board::{MapError, RegionMap, World, WorldError, WorldFactory};
use multiversal::engine::{Adjudicator, AdjudicatorOptions};
use multiversal::protocol::{RecordError, SaveError, SaveFile, WorldRecord};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("{path}: {source}")]
    Record { path: String, source: RecordError },
    #[error("{path}: {source}")]
    Save { path: String, source: SaveError },
}

#[derive(Debug, Default)]
struct Args {
    command: String,
    inputs: Vec<String>,
    output: Option<String>,
    strict: bool,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut parsed = Args::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--strict" => parsed.strict = true,
                "--seed" => {
                    i += 1;
                    let value = args.get(i).ok_or_else(|| usage("--seed needs a value"))?;
                    parsed.seed = Some(value.parse().map_err(|_| usage("invalid --seed value"))?);
                }
                "--output" => {
                    i += 1;
                    parsed.output = Some(args.get(i).ok_or_else(|| usage("--output needs a path"))?.clone());
                }
                "--help" | "-h" => parsed.command = "help".to_string(),
                flag if flag.starts_with("--") => return Err(usage(&format!("unknown argument: {flag}"))),
                word if parsed.command.is_empty() => parsed.command = word.to_string(),
                path => parsed.inputs.push(path.to_string()),
            }
            i += 1;
        }
        Ok(parsed)
    }

    fn single_input(&self) -> Result<&str, CliError> {
        match self.inputs.as_slice() {
            [path] => Ok(path),
            _ => Err(usage(&format!("{} takes exactly one file", self.command))),
        }
    }
}

fn usage(message: &str) -> CliError {
    CliError::Usage(message.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        error!("{e}");
        if matches!(e, CliError::Usage(_)) {
            print_usage();
        }
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let args = Args::parse(args)?;
    let map = RegionMap::standard()?;
    let factory = WorldFactory::standard(&map)?;

    match args.command.as_str() {
        "new" => {
            let world = factory.default_world();
            write_world(&world, &map, args.output.as_deref())
        }
        "adjudicate" => {
            let path = args.single_input()?;
            let mut world = read_world(path, &map)?;
            let options = AdjudicatorOptions {
                strict_adjacencies: args.strict,
                ..AdjudicatorOptions::default()
            };
            let adjudicator = Adjudicator::new(&map, &factory, options);
            let report = match args.seed {
                Some(seed) => adjudicator.adjudicate(&mut world, &mut SmallRng::seed_from_u64(seed)),
                None => adjudicator.adjudicate_with_rng(&mut world),
            };
            if report.forced > 0 {
                info!(forced = report.forced, "some orders were left undecided");
            }
            write_world(&world, &map, args.output.as_deref())
        }
        "save" => {
            let path = args.single_input()?;
            let world = read_world(path, &map)?;
            let save = SaveFile::from_world(&world, &map, args.strict);
            let json = save.to_json().map_err(|source| CliError::Save {
                path: path.to_string(),
                source,
            })?;
            write_output(&json, args.output.as_deref())
        }
        "replay" => {
            if args.inputs.is_empty() {
                return Err(usage("replay needs at least one save file"));
            }
            let results: Vec<Result<(String, World), CliError>> = args
                .inputs
                .par_iter()
                .map(|path| replay(path, &map, &factory, args.seed).map(|world| (path.clone(), world)))
                .collect();

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for result in results {
                let (path, world) = result?;
                let winner = world.winner.map_or_else(|| "none".to_string(), |n| n.to_string());
                writeln!(
                    out,
                    "{path}: iteration {}, {} boards, winner {winner}",
                    world.iteration,
                    world.boards.len()
                )
                .map_err(|source| CliError::Io {
                    path: "stdout".to_string(),
                    source,
                })?;
            }
            Ok(())
        }
        "help" => {
            print_usage();
            Ok(())
        }
        "" => Err(usage("missing command")),
        other => Err(usage(&format!("unknown command: {other}"))),
    }
}

fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })
}

fn read_world(path: &str, map: &RegionMap) -> Result<World, CliError> {
    let json = read_file(path)?;
    WorldRecord::from_json(&json)
        .and_then(|record| record.to_world(map))
        .map_err(|source| CliError::Record {
            path: path.to_string(),
            source,
        })
}

fn write_world(world: &World, map: &RegionMap, output: Option<&str>) -> Result<(), CliError> {
    let json = WorldRecord::from_world(world, map)
        .to_json()
        .map_err(|source| CliError::Record {
            path: output.unwrap_or("stdout").to_string(),
            source,
        })?;
    write_output(&json, output)
}

fn write_output(json: &str, output: Option<&str>) -> Result<(), CliError> {
    match output {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Io {
            path: path.to_string(),
            source,
        }),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{json}").map_err(|source| CliError::Io {
                path: "stdout".to_string(),
                source,
            })
        }
    }
}

fn replay(path: &str, map: &RegionMap, factory: &WorldFactory, seed: Option<u64>) -> Result<World, CliError> {
    let json = read_file(path)?;
    let wrap = |source: SaveError| CliError::Save {
        path: path.to_string(),
        source,
    };
    let save = SaveFile::from_json(&json).map_err(wrap)?;
    let world = match seed {
        Some(seed) => save.replay(map, factory, &mut SmallRng::seed_from_u64(seed)),
        None => save.replay(map, factory, &mut rand::thread_rng()),
    }
    .map_err(wrap)?;
    info!(path, iteration = world.iteration, "replayed");
    Ok(world)
}

fn print_usage() {
    eprintln!("Usage: multiversal COMMAND [OPTIONS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  new                      Print the starting world");
    eprintln!("  adjudicate WORLD.json    Adjudicate the world's pending orders");
    eprintln!("  save WORLD.json          Convert a world into a save file");
    eprintln!("  replay SAVE.json...      Rebuild saved games and summarize them");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strict         Moves between boards must keep their region");
    eprintln!("  --seed N         Seed for adjustment choices (default: entropy)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --help           Show this help");
}
