use serde::Serialize;

use crate::model::category::Category;
use crate::model::process::{OperatingModel, ProcessKey, Unit};
use crate::model::state::ModelState;
use crate::model::to_finite_or_zero;
use crate::service::dto::{ComputedTotals, ProcessRow};
use crate::service::engine::issue_multiplier;

/// Processes shown in the per-thousand rate comparison. Decant is left out
/// since every model decants the full inbound volume.
pub const RATE_PROCESSES: [ProcessKey; 5] = [
    ProcessKey::Loadfill,
    ProcessKey::Packaway,
    ProcessKey::Digital,
    ProcessKey::Online,
    ProcessKey::Backfill,
];

/// Rows ordered by hours saved, largest saving first.
pub fn benefit_by_process(totals: &ComputedTotals) -> Vec<ProcessRow> {
    let mut rows = totals.rows.clone();
    rows.sort_by(|a, b| {
        b.delta()
            .partial_cmp(&a.delta())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// New-model hours per thousand cartons delivered, issue multipliers
/// included. Online-unit rates are rescaled by online units per carton.
pub fn new_hours_per_thousand(state: &ModelState) -> Vec<(ProcessKey, f64)> {
    let cartons = state.inputs.cartons_delivered.max(1.0);
    let online_per_carton = state.inputs.online_units.max(0.0) / cartons;

    RATE_PROCESSES
        .iter()
        .map(|&process| {
            let cfg = state.new.get(process);
            let unit_scale = match cfg.unit {
                Unit::Online => online_per_carton,
                Unit::Cartons => 1.0,
            };
            let multiplier = issue_multiplier(
                &state.issues,
                &state.toggles,
                process,
                OperatingModel::New,
                state.mitigation,
            );
            (process, to_finite_or_zero(cfg.rate_per_thousand * unit_scale * multiplier))
        })
        .collect()
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum FlowNode {
    Process(ProcessKey),
    Category(Category),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FlowLink {
    pub source: FlowNode,
    pub target: FlowNode,
    pub cartons: f64,
}

/// Carton flow for one model: Decant into each category, then each category
/// into the processes its routing names. Zero-volume links are omitted.
pub fn carton_flow(state: &ModelState, totals: &ComputedTotals, model: OperatingModel) -> Vec<FlowLink> {
    let allocation = state.allocation.for_model(model);
    let mut links = Vec::new();

    for category in Category::ALL {
        let volume = totals.category(category);
        if volume <= 0.0 {
            continue;
        }
        links.push(FlowLink {
            source: FlowNode::Process(ProcessKey::Decant),
            target: FlowNode::Category(category),
            cartons: volume,
        });
        let Some(routing) = allocation.route(category) else {
            continue;
        };
        for (&process, &fraction) in routing {
            let cartons = volume * fraction;
            if cartons > 0.0 {
                links.push(FlowLink {
                    source: FlowNode::Category(category),
                    target: FlowNode::Process(process),
                    cartons,
                });
            }
        }
    }

    links
}
