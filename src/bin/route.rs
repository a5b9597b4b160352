//! Procurement routing CLI
//!
//! Runs the routing engine over a request file and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Risk assessment only
//! route assess request.yaml
//!
//! # Assessment plus workflow graph
//! route graph request.json --pretty
//!
//! # Step states of a stored request
//! route resolve request.yaml --current it_review --renegotiated
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use procurement_routing::procurement_types::{RequestAttributes, StepId};
use procurement_routing::{AssessmentSkips, ConfigLoader, CurrentStep, RoutingEngine};

#[derive(Parser)]
#[command(name = "route")]
#[command(version = "0.1.0")]
#[command(about = "Approval routing for procurement requests")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding routing_policy.yaml
    #[arg(long, global = true, env = "PROCUREMENT_CONFIG_DIR")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the risk assessment for a request
    Assess {
        /// Request file (.yaml, .yml or .json)
        request: PathBuf,
    },

    /// Print the assessment and workflow graph for a request
    Graph {
        /// Request file (.yaml, .yml or .json)
        request: PathBuf,
    },

    /// Print the status of every step of a stored request
    Resolve {
        /// Request file (.yaml, .yml or .json)
        request: PathBuf,

        /// Current step id, or "finished"
        #[arg(long)]
        current: String,

        /// Negotiation changed the price, so the department approves again
        #[arg(long)]
        renegotiated: bool,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(dir) => ConfigLoader::new(dir),
        None => ConfigLoader::from_env(),
    };
    let policy = loader.load_policy().with_context(|| {
        format!(
            "Failed to load routing policy from {}",
            loader.config_dir().display()
        )
    })?;
    let engine = RoutingEngine::new(Arc::new(policy));

    let output = match &cli.command {
        Commands::Assess { request } => {
            let attrs = read_request(request)?;
            serde_json::to_value(engine.assess_risk(&attrs))?
        }
        Commands::Graph { request } => {
            let attrs = read_request(request)?;
            serde_json::to_value(engine.evaluate(&attrs))?
        }
        Commands::Resolve {
            request,
            current,
            renegotiated,
        } => {
            let attrs = read_request(request)?;
            let current: CurrentStep = current
                .parse()
                .with_context(|| format!("Invalid --current value '{}'", current))?;

            let assessment = engine.assess_risk(&attrs);
            let skips = AssessmentSkips::new(engine.policy(), &assessment)
                .with_price_renegotiated(*renegotiated);
            let resolved = engine.resolve_step_states(&StepId::CANONICAL, current, &skips);
            serde_json::to_value(resolved)?
        }
    };

    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);

    Ok(())
}

// =============================================================================
// INPUT
// =============================================================================

fn read_request(path: &Path) -> Result<RequestAttributes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let attrs = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON request in {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML request in {}", path.display()))?
    };

    Ok(attrs)
}
