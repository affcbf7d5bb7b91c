//! Modal Guard CLI - Command-line interface for the modal reasoning engine

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use modal_core::{parse, AgentId, Assumptions, Engine, EngineConfig, WorldId};
use modal_logic::to_hex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modalguard")]
#[command(about = "Modal Guard - Kripke-semantics guardrail for agent hypotheses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Load a configuration and report what it defines
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "demos/diagnostics.toml")]
        config: PathBuf,
    },
    /// Print a formula in canonical form
    Fmt {
        /// Formula text
        formula: String,
        /// Also print the structural fingerprint
        #[arg(long)]
        fingerprint: bool,
    },
    /// Evaluate a formula at one world
    Eval {
        #[arg(short, long, default_value = "demos/diagnostics.toml")]
        config: PathBuf,
        /// World to evaluate at
        #[arg(short, long)]
        world: String,
        /// Formula text
        formula: String,
    },
    /// Ask whether an agent may adopt a hypothesis; prints a JSON verdict
    Admit {
        #[arg(short, long, default_value = "demos/diagnostics.toml")]
        config: PathBuf,
        /// Agent adopting the hypothesis
        #[arg(short, long)]
        agent: String,
        /// Reading recorded at the agent's world first, as `name=true|false`
        #[arg(long = "observe", value_parser = parse_reading)]
        observations: Vec<(String, bool)>,
        /// Pending reading assumed for this verdict only, as `name=true|false`
        #[arg(long = "assume", value_parser = parse_reading)]
        assumptions: Vec<(String, bool)>,
        /// Hypothesis text
        formula: String,
    },
    /// List the rule set and each rule's value at the agents' worlds
    Rules {
        #[arg(short, long, default_value = "demos/diagnostics.toml")]
        config: PathBuf,
        /// Evaluate at this world instead
        #[arg(short, long)]
        world: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Check { config }) => {
            let engine = load(&config)?;
            let model = engine.model();
            println!("Config OK: {}", config.display());
            println!("  worlds:  {}", model.world_count());
            println!("  edges:   {}", model.edge_count());
            println!("  agents:  {}", engine.agents().count());
            println!("  rules:   {}", engine.rules().len());
            println!("  digest:  {}", engine.rules().digest_hex());
        }
        Some(Commands::Fmt {
            formula,
            fingerprint,
        }) => {
            let formula = parse(&formula)?;
            println!("{}", formula);
            if fingerprint {
                println!("{}", to_hex(&formula.fingerprint()));
            }
        }
        Some(Commands::Eval {
            config,
            world,
            formula,
        }) => {
            let mut engine = load(&config)?;
            let value = engine.evaluate(&formula, world.as_str())?;
            println!("{}", value);
        }
        Some(Commands::Admit {
            config,
            agent,
            observations,
            assumptions,
            formula,
        }) => {
            let mut engine = load(&config)?;
            let agent = AgentId::new(agent);
            for (proposition, value) in &observations {
                engine.observe(&agent, proposition, *value)?;
            }

            let world = engine.current_world(&agent)?.clone();
            let mut pending = Assumptions::new();
            for (proposition, value) in assumptions {
                pending.assume(world.clone(), proposition, value);
            }

            let verdict = engine.admit_assuming(&formula, &agent, &pending)?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Some(Commands::Rules { config, world }) => {
            let engine = load(&config)?;
            for rule in engine.rules() {
                println!("{}: {}", rule.name(), rule.formula());
            }
            println!("digest: {}", engine.rules().digest_hex());

            let worlds: Vec<WorldId> = match world {
                Some(world) => vec![world.into()],
                None => {
                    let mut worlds = engine
                        .agents()
                        .map(|agent| engine.current_world(agent).cloned())
                        .collect::<modal_core::Result<Vec<_>>>()?;
                    worlds.sort();
                    worlds.dedup();
                    worlds
                }
            };
            for world in &worlds {
                println!();
                println!("at {}:", world);
                for outcome in engine.rule_outcomes(world) {
                    let status = match outcome.result {
                        Ok(true) => "holds".to_string(),
                        Ok(false) => "VIOLATED".to_string(),
                        Err(err) => format!("error: {}", err),
                    };
                    println!("  {}: {}", outcome.rule.name(), status);
                }
            }
        }
        None => {
            println!("Modal Guard v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Engine> {
    debug!(path = %path.display(), "loading configuration");
    let config = EngineConfig::from_file(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Engine::new(config).with_context(|| format!("building engine from {}", path.display()))
}

fn parse_reading(arg: &str) -> std::result::Result<(String, bool), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=true|false, got '{}'", arg))?;
    let value = value
        .trim()
        .parse::<bool>()
        .map_err(|_| format!("'{}' is not true or false", value))?;
    Ok((name.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading("p=true"), Ok(("p".to_string(), true)));
        assert_eq!(parse_reading(" q = false "), Ok(("q".to_string(), false)));
        assert!(parse_reading("p").is_err());
        assert!(parse_reading("p=yes").is_err());
    }

    #[test]
    fn test_cli_parses_admit() {
        let cli = Cli::try_parse_from([
            "modalguard",
            "admit",
            "--config",
            "demo.toml",
            "--agent",
            "RF_Agent",
            "--observe",
            "klystron_fault_reported=true",
            "--assume",
            "cooling_fault_reported=true",
            "rf_power_fault_reported",
        ])
        .unwrap();
        let Some(Commands::Admit {
            observations,
            assumptions,
            formula,
            ..
        }) = cli.command
        else {
            panic!("expected admit");
        };
        assert_eq!(observations, vec![("klystron_fault_reported".to_string(), true)]);
        assert_eq!(assumptions.len(), 1);
        assert_eq!(formula, "rf_power_fault_reported");
    }
}
