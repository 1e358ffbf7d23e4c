//! Command line front end for the FPL optimizer client
//!
//! Wires the real API client into the cache, accessors and mutation
//! controller, runs one command and prints the derived view models.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};

use client::{
    core::{bar_series, group_by_position, pie_series, squad_summary},
    ClientConfig, FplClient, QueryResult,
};
use shared::{
    logging, parse_exclude_ids, parse_exclude_ids_strict, OptimizationRequest, Player, Position,
    DEFAULT_BUDGET,
};

const COMPONENT: &str = "fpl-client";

/// Client for the FPL team optimizer service
#[derive(Parser)]
#[command(name = "fpl-client")]
#[command(about = "Query and optimize FPL squads through the optimizer service")]
pub struct Args {
    /// Service base URL (overrides FPL_API_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides FPL_API_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check service health
    Health,
    /// List all players grouped by position
    Players,
    /// Per-position points and price statistics
    Analytics,
    /// Top players for a position
    Top {
        /// GKP, DEF, MID or FWD
        position: Position,
        /// Number of players to request (overrides FPL_TOP_PLAYERS_LIMIT)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Build an optimal squad within a budget
    Optimize {
        /// Budget in millions
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        budget: f64,
        /// Player ids to exclude, separated by commas or spaces
        #[arg(long, default_value = "")]
        exclude: String,
        /// Reject malformed exclude ids instead of skipping them
        #[arg(long)]
        strict_exclude: bool,
        /// Preferred formation, e.g. 3-4-3
        #[arg(long)]
        formation: Option<String>,
    },
    /// Ask the service to reload player data and predictions
    Refresh,
    /// Describe the prediction model
    ModelInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Command::Top { limit: Some(limit), .. } = &args.command {
        config = config.with_top_players_limit(*limit);
    }

    logging::log_startup(COMPONENT, &config.base_url);
    let mut fpl = FplClient::new(config).context("Failed to create client")?;
    fpl.start_sweeper();

    if let Err(err) = run(&fpl, args.command).await {
        logging::log_error(COMPONENT, "Command", &err);
        return Err(err);
    }
    Ok(())
}

async fn run(fpl: &FplClient, command: Command) -> Result<()> {
    match command {
        Command::Health => {
            let health = fpl.queries().health().await?;
            println!("Status:      {}", health.status);
            if let Some(model_status) = &health.model_status {
                println!("Model:       {model_status}");
            }
            if let Some(count) = health.predictions_available {
                println!("Predictions: {count}");
            }
            if !health.is_healthy() {
                bail!("service reports status {:?}", health.status);
            }
        }
        Command::Players => {
            let players = require(fpl.queries().players().await, "players")?;
            print_groups(&players);
        }
        Command::Analytics => {
            let stats = require(fpl.queries().analytics().await, "analytics")?;
            println!("{:<5} {:>10} {:>10} {:>10}", "Pos", "Avg pts", "Max pts", "Avg price");
            for bar in bar_series(&stats) {
                println!(
                    "{:<5} {:>10.2} {:>10.2} {:>10.1}",
                    bar.position.code(),
                    bar.avg_points,
                    bar.max_points,
                    bar.avg_price
                );
            }
            println!();
            for slice in pie_series(&stats) {
                println!("{:<5} {:>3}%  {}", slice.name.code(), slice.percent, slice.color);
            }
        }
        Command::Top { position, .. } => {
            let top = require(fpl.queries().top_players(Some(position)).await, "top players")?;
            println!("Top {} ({})", position.label(), top.len());
            for player in top.iter() {
                println!(
                    "{:>5}  {:<20} {:>6} {:>6}",
                    player.id,
                    player.web_name,
                    player.price().map(|p| format!("{p:.1}")).unwrap_or_default(),
                    player.total_points.map(|p| format!("{p:.0}")).unwrap_or_default()
                );
            }
        }
        Command::Optimize {
            budget,
            exclude,
            strict_exclude,
            formation,
        } => {
            let excluded = if strict_exclude {
                parse_exclude_ids_strict(&exclude)?
            } else {
                parse_exclude_ids(&exclude)
            };
            let mut request = OptimizationRequest::new(budget).with_excluded(excluded);
            if let Some(formation) = formation {
                request = request.with_formation(formation);
            }

            logging::log_progress(COMPONENT, "Optimizing", &format!("budget {budget}"));
            let result = fpl.mutations().optimize(request).await?;
            let summary = squad_summary(&result);

            logging::log_success(COMPONENT, "Squad optimized");
            if let Some(status) = &summary.status {
                println!("Solver:     {status}");
            }
            println!("Players:    {}", summary.player_count);
            println!("Total cost: {:.1}", summary.total_cost);
            println!("Points:     {:.1}", summary.total_predicted_points);
            println!("Remaining:  {:.1}", summary.remaining_budget);
            println!();
            print_groups(&result.players);
        }
        Command::Refresh => {
            let summary = fpl.mutations().refresh_data().await?;
            logging::log_success(COMPONENT, &summary.message);
            println!("Players updated:     {}", summary.players_updated);
            println!("Predictions updated: {}", summary.predictions_updated);
        }
        Command::ModelInfo => {
            let model = require(fpl.queries().model_info().await, "model info")?;
            println!("Model:    {}", model.model_type);
            if let Some(version) = &model.version {
                println!("Version:  {version}");
            }
            println!("Features: {}", model.features_used);
            for (position, details) in &model.position_models {
                println!("  {position:<4} trained={}", details.trained);
            }
        }
    }

    let entries = fpl.cache().len().await;
    info!(entries, "Done");
    Ok(())
}

/// Data from a query, or its error
fn require<T>(result: QueryResult<T>, what: &str) -> Result<std::sync::Arc<T>> {
    if let (Some(data), Some(err)) = (&result.data, &result.error) {
        warn!(what, error = %err, "Showing last known data");
        return Ok(data.clone());
    }
    match (result.data, result.error) {
        (Some(data), _) => Ok(data),
        (None, Some(err)) => Err(err).with_context(|| format!("Failed to load {what}")),
        (None, None) => bail!("no {what} available"),
    }
}

fn print_groups(players: &[Player]) {
    for group in group_by_position(players) {
        println!("{} ({})", group.position.label(), group.len());
        for player in &group.players {
            println!(
                "  {:>5}  {:<20} {:<6} {:>5.1} {:>6.1}",
                player.id, player.name, player.team, player.price, player.predicted_points
            );
        }
    }
}
