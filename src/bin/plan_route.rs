//! Plan a walking route for a list of waypoints and print it as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tour_planner::{
    ElevationService, ElevationStore, HttpElevationSource, HttpRoutingClient, PlannerConfig, RouteAssembler,
    RouteGeometryProvider, RouteSession, Waypoint,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Optimize and assemble a walking route", long_about = None)]
struct Cli {
    /// Waypoints JSON array (`-` for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Walking-route endpoint (overrides TOUR_ROUTING_URL)
    #[arg(long)]
    routing_url: Option<String>,

    /// Elevation endpoint; empty for estimate-only (overrides TOUR_ELEVATION_URL)
    #[arg(long)]
    elevation_url: Option<String>,

    /// Persistent elevation cache file (overrides TOUR_ELEVATION_CACHE)
    #[arg(long)]
    elevation_cache: Option<PathBuf>,

    /// Keep the input order
    #[arg(long, action = ArgAction::SetTrue)]
    no_optimize: bool,

    /// Id of the waypoint to pin as the start
    #[arg(long)]
    pinned_start: Option<String>,

    /// Print route statistics instead of the full plan
    #[arg(long, action = ArgAction::SetTrue)]
    statistics: bool,
}

fn read_waypoints(input: &Path) -> Result<Vec<Waypoint>> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading waypoints from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };
    serde_json::from_str(&raw).context("parsing waypoints JSON")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PlannerConfig::from_env();
    if let Some(url) = cli.routing_url {
        config.routing.endpoint = url;
    }
    if let Some(url) = cli.elevation_url {
        config.elevation_source.endpoint = url;
    }
    if cli.elevation_cache.is_some() {
        config.elevation_cache = cli.elevation_cache;
    }
    if cli.no_optimize {
        config.optimize = false;
    }

    let waypoints = read_waypoints(&cli.input)?;
    info!(waypoints = waypoints.len(), routing = %config.routing.endpoint, "planning route");

    let routing = HttpRoutingClient::new(config.routing.clone()).context("building routing client")?;
    let source = HttpElevationSource::new(config.elevation_source.clone()).context("building elevation client")?;
    let mut elevation = ElevationService::new(source, config.elevation.clone());
    if let Some(path) = &config.elevation_cache {
        elevation = elevation.with_store(ElevationStore::new(path));
    }

    let mut session = RouteSession::new(elevation, config.debounce);
    session.set_waypoints(waypoints);
    if let Some(id) = &cli.pinned_start {
        anyhow::ensure!(session.set_pinned_start(id), "no waypoint with id {id}");
    }

    let assembler = RouteAssembler::new(RouteGeometryProvider::network(routing), config.assembler_options());
    let plan = assembler.recompute(&mut session).await;

    let out = if cli.statistics {
        serde_json::to_string_pretty(&plan.statistics())?
    } else {
        serde_json::to_string_pretty(&plan)?
    };
    println!("{out}");
    Ok(())
}
