//! Finite-state controller tool
//!
//! Loads a synthesized strategy (line-oriented `.aut` or `tulipcon` `.xml`),
//! optionally reduces it, exports it, and replays a sequence of environment
//! observations through it.
//!
//! Run with:
//! ```bash
//! cargo run --example controller -- strategy.aut --collapse bisim --dot strategy.dot \
//!     --env park=0 --env park=1 --env park=1
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;

use hysyn::automaton::dot::DotConfig;
use hysyn::automaton::Automaton;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Collapse {
    /// Merge states with equal valuations, unioning successors (may add behaviour).
    Lossy,
    /// Merge bisimilar states only.
    Bisim,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Automaton file (`.aut` or `.xml`).
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Expected variable names, checked when loading `.aut` files.
    #[clap(long, value_name = "NAME", value_delimiter = ',')]
    vars: Vec<String>,

    /// Reduce the automaton after loading.
    #[clap(long, value_enum)]
    collapse: Option<Collapse>,

    /// Write the automaton as a DOT graph.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Write the automaton as tulipcon XML.
    #[clap(long, value_name = "FILE")]
    xml: Option<PathBuf>,

    /// Indent the XML output.
    #[clap(long)]
    pretty: bool,

    /// Environment observation, e.g. `x=1,y=0`. Repeat for a sequence.
    #[clap(long, value_name = "VALUATION")]
    env: Vec<Observation>,
}

/// One environment observation, as `name=value` pairs.
#[derive(Debug, Clone)]
struct Observation(Vec<(String, i64)>);

impl FromStr for Observation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let (name, value) = part
                    .split_once('=')
                    .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", part))?;
                let value = value
                    .trim()
                    .parse()
                    .map_err(|e| format!("invalid value for '{}': {}", name.trim(), e))?;
                Ok((name.trim().to_string(), value))
            })
            .collect::<Result<_, _>>()
            .map(Observation)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let is_xml = args.input.extension().is_some_and(|ext| ext == "xml");
    let (mut aut, warnings) = if is_xml {
        Automaton::read_xml_file(&args.input)?
    } else {
        let vars: Vec<&str> = args.vars.iter().map(String::as_str).collect();
        Automaton::read_aut_file(&args.input, &vars)?
    };
    println!("Loaded {} states ({} warnings)", aut.len(), warnings.len());

    if let Some(mode) = args.collapse {
        let removed = match mode {
            Collapse::Lossy => aut.collapse_lossy(),
            Collapse::Bisim => aut.minimize(),
        };
        println!("Removed {} states ({:?}), {} left", removed, mode, aut.len());
    }

    if let Some(path) = &args.dot {
        aut.write_dot_file(path, &DotConfig::default())?;
        println!("Wrote DOT to {}", path.display());
    }
    if let Some(path) = &args.xml {
        aut.write_xml_file(path, args.pretty)?;
        println!("Wrote XML to {}", path.display());
    }

    if !args.env.is_empty() {
        println!("Replaying {} observations", args.env.len());
        let mut current = None;
        for (step, observation) in args.env.iter().enumerate() {
            let env: Vec<(&str, i64)> = observation.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            let next = aut
                .find_next_state(current, &env)
                .ok_or_else(|| eyre!("step {}: no successor agrees with {:?}", step, observation.0))?;
            println!("  step {}: state {} [{}]", step, next.id(), aut.format_valuation(next.valuation()));
            current = Some(next);
        }
    }

    Ok(())
}
