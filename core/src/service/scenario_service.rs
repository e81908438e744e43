use anyhow::Result;
use tracing::info;

use std::path::Path;

use crate::input::{overrides_to_actions, parse_args};
use crate::model::state::{ModelAction, ModelState};
use crate::repository::forecast::load_forecast;
use crate::repository::scenario::{ScenarioRepository, ScenarioSnapshot};
use crate::service::dto::ComputedTotals;
use crate::service::engine::compute_model;

/// Loads stored scenarios, applies command-line edits and runs the engine.
pub struct ScenarioService<R: ScenarioRepository> {
    repo: R,
}

impl<R: ScenarioRepository> ScenarioService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The named scenario's state, or the defaults when `name` is `None`.
    pub fn base_state(&self, name: Option<&str>) -> Result<ModelState> {
        match name {
            Some(name) => Ok(self.repo.load(name)?.state),
            None => Ok(ModelState::default()),
        }
    }

    /// Applies `key:value` overrides and bare issue ids to `state`.
    pub fn apply_overrides(&self, state: &ModelState, args: &[String]) -> Result<ModelState> {
        let parsed = parse_args(args);
        let actions = overrides_to_actions(&parsed, state)?;
        Ok(state.apply_all(actions)?)
    }

    /// Replaces the forecast override with the contents of `path`. On error
    /// the caller still holds the unchanged `state`.
    pub fn import_forecast(&self, state: &ModelState, path: &Path) -> Result<ModelState> {
        let forecast = load_forecast(path)?;
        info!(path = %path.display(), processes = forecast.hours.len(), "Forecast override loaded");
        Ok(state.apply(ModelAction::ImportForecast(forecast))?)
    }

    pub fn compute(&self, state: &ModelState) -> ComputedTotals {
        compute_model(state)
    }

    pub fn save(&self, name: &str, state: &ModelState) -> Result<ScenarioSnapshot> {
        self.repo.save(name, state)
    }

    pub fn list(&self) -> Result<Vec<ScenarioSnapshot>> {
        self.repo.list()
    }
}
