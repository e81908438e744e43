use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::allocation::{AllocationPreset, AllocationTable};
use crate::model::category::{Category, CategorySplit, SplitNormalization};
use crate::model::error::{ModelError, ModelResult};
use crate::model::forecast::ForecastOverride;
use crate::model::inputs::{store_count, ModelInputs};
use crate::model::issue::{IssueCatalog, IssueToggles};
use crate::model::options::{BenefitMode, EngineOptions};
use crate::model::process::{OperatingModel, ProcessKey, ProcessTable, Unit};
use crate::model::{clamp_unit, non_negative};

pub const DEFAULT_MITIGATION: f64 = 0.5;

fn default_mitigation() -> f64 {
    DEFAULT_MITIGATION
}

/// Everything the engine reads, in one record. Changes go through
/// [`ModelState::apply`], which returns a new state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelState {
    #[serde(default)]
    pub inputs: ModelInputs,
    #[serde(default)]
    pub split: CategorySplit,
    #[serde(default = "ProcessTable::default_current")]
    pub current: ProcessTable,
    #[serde(default = "ProcessTable::default_new")]
    pub new: ProcessTable,
    #[serde(default)]
    pub issues: IssueCatalog,
    #[serde(default)]
    pub toggles: IssueToggles,
    #[serde(default = "default_mitigation")]
    pub mitigation: f64,
    #[serde(default)]
    pub allocation: AllocationTable,
    #[serde(default)]
    pub forecast: Option<ForecastOverride>,
    #[serde(default)]
    pub options: EngineOptions,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            inputs: ModelInputs::default(),
            split: CategorySplit::default(),
            current: ProcessTable::default_current(),
            new: ProcessTable::default_new(),
            issues: IssueCatalog::default(),
            toggles: IssueToggles::default(),
            mitigation: DEFAULT_MITIGATION,
            allocation: AllocationTable::default(),
            forecast: None,
            options: EngineOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelAction {
    SetCartons(f64),
    SetOnlineUnits(f64),
    SetHourlyRate(f64),
    SetStores(f64),
    SetWeeksPerYear(f64),
    SetShare(Category, f64),
    SetUnit(OperatingModel, ProcessKey, Unit),
    SetUseRoster(OperatingModel, ProcessKey, bool),
    SetRate(OperatingModel, ProcessKey, f64),
    SetRosterHours(OperatingModel, ProcessKey, f64),
    ToggleIssue(String, bool),
    SetMitigation(f64),
    AddImpact { issue: String, process: ProcessKey, delta: f64 },
    RemoveImpact { issue: String, process: ProcessKey },
    AddIssue(String),
    RemoveIssue(String),
    SelectPreset(AllocationPreset),
    SetAllocation(AllocationTable),
    SetBenefitMode(BenefitMode),
    SetNormalization(SplitNormalization),
    ImportForecast(ForecastOverride),
    ClearForecast,
    Reset,
}

impl ModelState {
    pub fn table(&self, model: OperatingModel) -> &ProcessTable {
        match model {
            OperatingModel::Current => &self.current,
            OperatingModel::New => &self.new,
        }
    }

    fn with_table(mut self, model: OperatingModel, table: ProcessTable) -> Self {
        match model {
            OperatingModel::Current => self.current = table,
            OperatingModel::New => self.new = table,
        }
        self
    }

    /// Pulls every numeric field back into range. Used on states read from
    /// disk, which never went through [`ModelState::apply`].
    pub fn sanitized(&self) -> Self {
        let mut next = self.clone();
        next.inputs = self.inputs.sanitized();
        next.split = CategorySplit::new(Category::ALL.map(|c| (c, self.split.share(c))));
        next.mitigation = clamp_unit(self.mitigation);
        if let Err(e) = self.allocation.validate() {
            warn!(error = %e, "Discarding invalid allocation table");
            next.allocation = self.allocation.preset.unwrap_or_default().table();
        }
        for model in OperatingModel::BOTH {
            let mut table = next.table(model).clone();
            for p in ProcessKey::ALL {
                table = table.with(p, |_| {});
            }
            next = next.with_table(model, table);
        }
        next
    }

    /// Applies one edit. Numeric edits are clamped silently; catalog edits
    /// naming an unknown issue fail and leave `self` as it was.
    pub fn apply(&self, action: ModelAction) -> ModelResult<ModelState> {
        debug!(?action, "Applying model action");
        let mut next = self.clone();
        match action {
            ModelAction::SetCartons(v) => next.inputs.cartons_delivered = non_negative(v),
            ModelAction::SetOnlineUnits(v) => next.inputs.online_units = non_negative(v),
            ModelAction::SetHourlyRate(v) => next.inputs.hourly_rate = non_negative(v),
            ModelAction::SetStores(v) => next.inputs.stores = store_count(v),
            ModelAction::SetWeeksPerYear(v) => next.inputs.weeks_per_year = non_negative(v),
            ModelAction::SetShare(category, v) => next.split = self.split.with_share(category, v),
            ModelAction::SetUnit(model, process, unit) => {
                let table = self.table(model).with(process, |c| c.unit = unit);
                next = next.with_table(model, table);
            }
            ModelAction::SetUseRoster(model, process, on) => {
                let table = self.table(model).with(process, |c| c.use_roster = on);
                next = next.with_table(model, table);
            }
            ModelAction::SetRate(model, process, v) => {
                let table = self.table(model).with(process, |c| c.rate_per_thousand = v);
                next = next.with_table(model, table);
            }
            ModelAction::SetRosterHours(model, process, v) => {
                let table = self.table(model).with(process, |c| c.roster_hours = v);
                next = next.with_table(model, table);
            }
            ModelAction::ToggleIssue(id, on) => {
                if self.issues.get(&id).is_none() {
                    return Err(ModelError::UnknownIssue(id));
                }
                next.toggles = self.toggles.with(&id, on);
            }
            ModelAction::SetMitigation(v) => next.mitigation = clamp_unit(v),
            ModelAction::AddImpact { issue, process, delta } => {
                next.issues = self.issues.with_impact(&issue, process, delta)?;
            }
            ModelAction::RemoveImpact { issue, process } => {
                next.issues = self.issues.without_impact(&issue, process)?;
            }
            ModelAction::AddIssue(name) => {
                let (issues, id) = self.issues.with_issue(&name);
                debug!(%id, "Added issue scenario");
                next.issues = issues;
            }
            ModelAction::RemoveIssue(id) => {
                next.issues = self.issues.without_issue(&id)?;
                next.toggles = self.toggles.without(&id);
            }
            ModelAction::SelectPreset(preset) => next.allocation = preset.table(),
            ModelAction::SetAllocation(table) => {
                table.validate()?;
                next.allocation = table;
            }
            ModelAction::SetBenefitMode(mode) => next.options.benefit = mode,
            ModelAction::SetNormalization(mode) => next.options.normalization = mode,
            ModelAction::ImportForecast(forecast) => next.forecast = Some(forecast),
            ModelAction::ClearForecast => next.forecast = None,
            ModelAction::Reset => next = ModelState::default(),
        }
        Ok(next)
    }

    pub fn apply_all(&self, actions: impl IntoIterator<Item = ModelAction>) -> ModelResult<ModelState> {
        actions
            .into_iter()
            .try_fold(self.clone(), |state, action| state.apply(action))
    }
}
