use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::category::Category;
use crate::model::process::{ProcessKey, Unit};

/// Volume reaching each process under one operating model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProcessVolumes {
    /// Cartons per process. Decant holds every inbound carton; the other
    /// entries hold cartons routed from the category split.
    pub cartons: BTreeMap<ProcessKey, f64>,
    /// The online order stream, independent of the split.
    pub online_units: f64,
}

impl ProcessVolumes {
    pub fn cartons_for(&self, process: ProcessKey) -> f64 {
        self.cartons.get(&process).copied().unwrap_or(0.0)
    }

    /// The volume a process's rate applies to. The Online process always
    /// carries the online order stream, plus any cartons routed to it when
    /// it is rated per carton.
    pub fn volume_for(&self, process: ProcessKey, unit: Unit) -> f64 {
        match (unit, process) {
            (Unit::Online, _) => self.online_units,
            (Unit::Cartons, ProcessKey::Online) => self.online_units + self.cartons_for(process),
            (Unit::Cartons, _) => self.cartons_for(process),
        }
    }

    /// Cartons routed out of the category split, Decant excluded.
    pub fn routed_total(&self) -> f64 {
        ProcessKey::DESTINATIONS
            .iter()
            .map(|p| self.cartons_for(*p))
            .sum()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ProcessRow {
    pub process: ProcessKey,
    /// Hours before issue multipliers.
    pub current_base_hours: f64,
    pub new_base_hours: f64,
    pub current_multiplier: f64,
    pub new_multiplier: f64,
    pub current_hours: f64,
    pub new_hours: f64,
}

impl ProcessRow {
    /// Hours saved by the new model; negative when it costs more.
    pub fn delta(&self) -> f64 {
        self.current_hours - self.new_hours
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComputedTotals {
    pub cartons: f64,
    pub online_units: f64,
    pub effective_shares: BTreeMap<Category, f64>,
    pub category_cartons: BTreeMap<Category, f64>,
    pub current_volumes: ProcessVolumes,
    pub new_volumes: ProcessVolumes,
    pub rows: Vec<ProcessRow>,
    pub total_current_hours: f64,
    pub total_new_hours: f64,
    pub benefit_hours: f64,
    pub weekly_savings: f64,
    pub network_weekly_hours: f64,
    pub network_weekly_savings: f64,
    pub network_annual_hours: f64,
    pub network_annual_savings: f64,
}

impl ComputedTotals {
    pub fn row(&self, process: ProcessKey) -> Option<&ProcessRow> {
        self.rows.iter().find(|r| r.process == process)
    }

    pub fn category(&self, category: Category) -> f64 {
        self.category_cartons.get(&category).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volumes() -> ProcessVolumes {
        ProcessVolumes {
            cartons: [(ProcessKey::Decant, 1000.0), (ProcessKey::Online, 50.0), (ProcessKey::Loadfill, 950.0)]
                .into_iter()
                .collect(),
            online_units: 200.0,
        }
    }

    #[test]
    fn test_online_process_keeps_order_stream_in_cartons_unit() {
        let v = volumes();
        assert_eq!(v.volume_for(ProcessKey::Online, Unit::Cartons), 250.0);
        assert_eq!(v.volume_for(ProcessKey::Online, Unit::Online), 200.0);
        assert_eq!(v.volume_for(ProcessKey::Loadfill, Unit::Cartons), 950.0);
        assert_eq!(v.volume_for(ProcessKey::Backfill, Unit::Online), 200.0);
    }

    #[test]
    fn test_routed_total_excludes_order_stream() {
        assert_eq!(volumes().routed_total(), 1000.0);
    }
}
