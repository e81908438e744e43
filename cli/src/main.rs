mod logging;
mod report;
mod tui;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use storeops_core::repository::load_forecast;
use storeops_core::{
    compute_model, FileScenarioRepository, ModelAction, ModelState, OverrideScope, ScenarioService,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "storeops")]
#[command(about = "Store operating model allocation and benefit calculator", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding saved scenarios (default ~/.storeops/scenarios)
    #[arg(long, global = true)]
    scenario_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Compute hours and benefit (usage: compute cartons:15000 demand:60% late)
    Compute {
        /// Start from a saved scenario instead of the defaults
        #[arg(long)]
        scenario: Option<String>,
        /// Forecast workbook or CSV whose hours replace computed ones
        #[arg(long)]
        forecast: Option<PathBuf>,
        /// Which model the forecast applies to (current, new, both)
        #[arg(long, default_value = "current")]
        scope: String,
        /// Print the computed totals as JSON
        #[arg(long)]
        json: bool,
        /// Overrides (key:value) and issue ids to enable
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show the process hours read from a forecast workbook or CSV
    Import { file: PathBuf },
    /// List allocation presets and their routing
    Presets,
    /// Save a scenario (usage: save north cartons:9000 preset:refined)
    Save {
        name: String,
        /// Start from a saved scenario instead of the defaults
        #[arg(long)]
        from: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List saved scenarios
    Scenarios,
    /// Open the Terminal User Interface
    Tui {
        #[arg(long)]
        scenario: Option<String>,
    },
}

fn with_forecast(state: ModelState, path: &Path, scope: &str) -> Result<ModelState> {
    let scope: OverrideScope = scope.parse().map_err(|e: String| anyhow!(e))?;
    let forecast = load_forecast(path)?.with_scope(scope);
    Ok(state.apply(ModelAction::ImportForecast(forecast))?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let repo = FileScenarioRepository::new(cli.scenario_dir)?;
    let service = ScenarioService::new(repo);

    match cli.command {
        Some(Commands::Compute { scenario, forecast, scope, json, args }) => {
            let base = service.base_state(scenario.as_deref())?;
            let mut state = service.apply_overrides(&base, &args)?;
            if let Some(path) = forecast {
                state = with_forecast(state, &path, &scope)
                    .with_context(|| format!("Failed to import {}", path.display()))?;
            }
            let totals = compute_model(&state);
            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                report::print_compute(&state, &totals);
            }
        }
        Some(Commands::Import { file }) => {
            let forecast = load_forecast(&file)?;
            report::print_forecast(&forecast);
        }
        Some(Commands::Presets) => {
            report::print_presets();
        }
        Some(Commands::Save { name, from, args }) => {
            let base = service.base_state(from.as_deref())?;
            let state = service.apply_overrides(&base, &args)?;
            let snapshot = service.save(&name, &state)?;
            info!(name = %snapshot.name, "Scenario saved");
            println!("Scenario saved: {}", snapshot.name);
        }
        Some(Commands::Scenarios) => {
            report::print_scenarios(&service.list()?);
        }
        Some(Commands::Tui { scenario }) => {
            tui::run(service, scenario)?;
        }
        None => {
            tui::run(service, None)?;
        }
    }
    Ok(())
}
