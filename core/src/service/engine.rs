//! Allocation & benefit engine.
//!
//! Pure functions from a [`ModelState`] to [`ComputedTotals`]:
//! split normalisation, category cartons, routing, hours per process, issue
//! multipliers and aggregation. Nothing here allocates beyond the result
//! maps, touches I/O or returns a non-finite number, so the whole pipeline
//! can be re-run on every edit.

use std::collections::BTreeMap;
use tracing::trace;

use crate::model::allocation::ModelAllocation;
use crate::model::category::{Category, CategorySplit, SplitNormalization};
use crate::model::forecast::ForecastOverride;
use crate::model::inputs::ModelInputs;
use crate::model::issue::{IssueCatalog, IssueToggles};
use crate::model::options::BenefitMode;
use crate::model::process::{OperatingModel, ProcessConfig, ProcessKey};
use crate::model::state::ModelState;
use crate::model::{clamp_unit, non_negative, to_finite_or_zero};
use crate::service::dto::{ComputedTotals, ProcessRow, ProcessVolumes};

pub fn effective_shares(
    split: &CategorySplit,
    normalization: SplitNormalization,
) -> BTreeMap<Category, f64> {
    split.effective_shares(normalization)
}

pub fn category_cartons(cartons: f64, shares: &BTreeMap<Category, f64>) -> BTreeMap<Category, f64> {
    let cartons = non_negative(cartons);
    Category::ALL
        .iter()
        .map(|k| {
            let share = shares.get(k).copied().map(non_negative).unwrap_or(0.0);
            (*k, cartons * share)
        })
        .collect()
}

/// Routes category cartons to processes. Decant always takes every inbound
/// carton; the online stream passes through untouched.
pub fn allocate(
    cartons: f64,
    online_units: f64,
    category_cartons: &BTreeMap<Category, f64>,
    routing: &ModelAllocation,
) -> ProcessVolumes {
    let mut volumes: BTreeMap<ProcessKey, f64> =
        ProcessKey::ALL.iter().map(|p| (*p, 0.0)).collect();
    volumes.insert(ProcessKey::Decant, non_negative(cartons));

    for (category, amount) in category_cartons {
        let Some(route) = routing.route(*category) else {
            continue;
        };
        for (process, fraction) in route {
            if *process == ProcessKey::Decant {
                continue;
            }
            *volumes.entry(*process).or_insert(0.0) += non_negative(*amount) * non_negative(*fraction);
        }
    }

    ProcessVolumes {
        cartons: volumes,
        online_units: non_negative(online_units),
    }
}

/// Hours before issues. Roster mode wins, then a forecast value, then
/// rate × volume / 1000.
pub fn base_hours(cfg: &ProcessConfig, volume: f64, forecast: Option<f64>) -> f64 {
    if cfg.use_roster {
        return non_negative(cfg.roster_hours);
    }
    if let Some(hours) = forecast {
        return non_negative(hours);
    }
    non_negative(cfg.rate_per_thousand * volume / 1000.0)
}

/// Product of `(1 + δ)` over enabled issues. In the new model each δ is
/// scaled by `1 - mitigation`. Factors are floored at 0.
pub fn issue_multiplier(
    catalog: &IssueCatalog,
    toggles: &IssueToggles,
    process: ProcessKey,
    model: OperatingModel,
    mitigation: f64,
) -> f64 {
    let damping = match model {
        OperatingModel::Current => 1.0,
        OperatingModel::New => 1.0 - clamp_unit(mitigation),
    };
    catalog
        .issues()
        .iter()
        .filter(|issue| toggles.is_enabled(&issue.id))
        .fold(1.0, |m, issue| {
            m * (1.0 + issue.impact_on(process) * damping).max(0.0)
        })
}

struct ModelHours {
    base: BTreeMap<ProcessKey, f64>,
    multiplier: BTreeMap<ProcessKey, f64>,
}

fn model_hours(
    state: &ModelState,
    model: OperatingModel,
    volumes: &ProcessVolumes,
    forecast: Option<&ForecastOverride>,
) -> ModelHours {
    let table = state.table(model);
    let mut base = BTreeMap::new();
    let mut multiplier = BTreeMap::new();
    for process in ProcessKey::ALL {
        let cfg = table.get(process);
        let volume = volumes.volume_for(process, cfg.unit);
        let forecast_hours = forecast.and_then(|f| f.hours_for(process, model));
        base.insert(process, base_hours(&cfg, volume, forecast_hours));
        multiplier.insert(
            process,
            issue_multiplier(&state.issues, &state.toggles, process, model, state.mitigation),
        );
    }
    ModelHours { base, multiplier }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub total_current_hours: f64,
    pub total_new_hours: f64,
    pub benefit_hours: f64,
    pub weekly_savings: f64,
    pub network_weekly_hours: f64,
    pub network_weekly_savings: f64,
    pub network_annual_hours: f64,
    pub network_annual_savings: f64,
}

pub fn aggregate(rows: &[ProcessRow], inputs: &ModelInputs, mode: BenefitMode) -> Aggregate {
    let total_current_hours: f64 = rows.iter().map(|r| r.current_hours).sum();
    let total_new_hours: f64 = rows.iter().map(|r| r.new_hours).sum();
    let signed = to_finite_or_zero(total_current_hours - total_new_hours);
    let benefit_hours = match mode {
        BenefitMode::Signed => signed,
        BenefitMode::Clamped => signed.max(0.0),
    };
    let stores = inputs.stores.max(1) as f64;
    let weeks = non_negative(inputs.weeks_per_year);
    let weekly_savings = to_finite_or_zero(benefit_hours * non_negative(inputs.hourly_rate));
    Aggregate {
        total_current_hours: to_finite_or_zero(total_current_hours),
        total_new_hours: to_finite_or_zero(total_new_hours),
        benefit_hours,
        weekly_savings,
        network_weekly_hours: to_finite_or_zero(benefit_hours * stores),
        network_weekly_savings: to_finite_or_zero(weekly_savings * stores),
        network_annual_hours: to_finite_or_zero(benefit_hours * stores * weeks),
        network_annual_savings: to_finite_or_zero(weekly_savings * stores * weeks),
    }
}

pub fn compute_model(state: &ModelState) -> ComputedTotals {
    let cartons = non_negative(state.inputs.cartons_delivered);
    let online_units = non_negative(state.inputs.online_units);

    let shares = effective_shares(&state.split, state.options.normalization);
    let by_category = category_cartons(cartons, &shares);

    let current_volumes = allocate(
        cartons,
        online_units,
        &by_category,
        state.allocation.for_model(OperatingModel::Current),
    );
    let new_volumes = allocate(
        cartons,
        online_units,
        &by_category,
        state.allocation.for_model(OperatingModel::New),
    );

    let forecast = state.forecast.as_ref();
    let current = model_hours(state, OperatingModel::Current, &current_volumes, forecast);
    let new = model_hours(state, OperatingModel::New, &new_volumes, forecast);

    let rows: Vec<ProcessRow> = ProcessKey::ALL
        .iter()
        .map(|p| {
            let current_base_hours = current.base[p];
            let new_base_hours = new.base[p];
            let current_multiplier = current.multiplier[p];
            let new_multiplier = new.multiplier[p];
            ProcessRow {
                process: *p,
                current_base_hours,
                new_base_hours,
                current_multiplier,
                new_multiplier,
                current_hours: to_finite_or_zero(current_base_hours * current_multiplier),
                new_hours: to_finite_or_zero(new_base_hours * new_multiplier),
            }
        })
        .collect();

    let totals = aggregate(&rows, &state.inputs, state.options.benefit);
    trace!(
        current = totals.total_current_hours,
        new = totals.total_new_hours,
        benefit = totals.benefit_hours,
        "Computed model"
    );

    ComputedTotals {
        cartons,
        online_units,
        effective_shares: shares,
        category_cartons: by_category,
        current_volumes,
        new_volumes,
        rows,
        total_current_hours: totals.total_current_hours,
        total_new_hours: totals.total_new_hours,
        benefit_hours: totals.benefit_hours,
        weekly_savings: totals.weekly_savings,
        network_weekly_hours: totals.network_weekly_hours,
        network_weekly_savings: totals.network_weekly_savings,
        network_annual_hours: totals.network_annual_hours,
        network_annual_savings: totals.network_annual_savings,
    }
}
