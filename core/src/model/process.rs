use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::non_negative;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessKey {
    Decant,
    Loadfill,
    Packaway,
    Digital,
    Online,
    Backfill,
}

impl ProcessKey {
    pub const ALL: [ProcessKey; 6] = [
        ProcessKey::Decant,
        ProcessKey::Loadfill,
        ProcessKey::Packaway,
        ProcessKey::Digital,
        ProcessKey::Online,
        ProcessKey::Backfill,
    ];

    /// Processes that receive routed cartons. Decant handles every inbound
    /// carton and is never a routing destination.
    pub const DESTINATIONS: [ProcessKey; 5] = [
        ProcessKey::Loadfill,
        ProcessKey::Packaway,
        ProcessKey::Digital,
        ProcessKey::Online,
        ProcessKey::Backfill,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProcessKey::Decant => "Decant",
            ProcessKey::Loadfill => "Loadfill",
            ProcessKey::Packaway => "Packaway",
            ProcessKey::Digital => "Digital Shopkeeping",
            ProcessKey::Online => "Online",
            ProcessKey::Backfill => "Backfill",
        }
    }
}

impl fmt::Display for ProcessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which volume stream drives a process's hours.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Cartons,
    Online,
}

impl Unit {
    pub fn toggled(self) -> Self {
        match self {
            Unit::Cartons => Unit::Online,
            Unit::Online => Unit::Cartons,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ProcessConfig {
    pub unit: Unit,
    pub use_roster: bool,
    pub rate_per_thousand: f64,
    pub roster_hours: f64,
}

impl ProcessConfig {
    pub fn rate(unit: Unit, rate_per_thousand: f64) -> Self {
        Self {
            unit,
            use_roster: false,
            rate_per_thousand: non_negative(rate_per_thousand),
            roster_hours: 0.0,
        }
    }
}

/// The current or the proposed operating model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OperatingModel {
    Current,
    New,
}

impl OperatingModel {
    pub const BOTH: [OperatingModel; 2] = [OperatingModel::Current, OperatingModel::New];
}

impl fmt::Display for OperatingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingModel::Current => f.write_str("Current"),
            OperatingModel::New => f.write_str("New"),
        }
    }
}

/// Per-process configuration for one operating model. Missing entries read
/// as an all-zero config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct ProcessTable {
    entries: BTreeMap<ProcessKey, ProcessConfig>,
}

impl ProcessTable {
    pub fn new(entries: impl IntoIterator<Item = (ProcessKey, ProcessConfig)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn default_current() -> Self {
        Self::new([
            (ProcessKey::Decant, ProcessConfig::rate(Unit::Cartons, 13.0)),
            (ProcessKey::Loadfill, ProcessConfig::rate(Unit::Cartons, 40.0)),
            (ProcessKey::Packaway, ProcessConfig::rate(Unit::Cartons, 30.0)),
            (ProcessKey::Digital, ProcessConfig::rate(Unit::Online, 88.0)),
            (ProcessKey::Online, ProcessConfig::rate(Unit::Online, 55.0)),
            (ProcessKey::Backfill, ProcessConfig::rate(Unit::Cartons, 15.0)),
        ])
    }

    pub fn default_new() -> Self {
        Self::new([
            (ProcessKey::Decant, ProcessConfig::rate(Unit::Cartons, 12.0)),
            (ProcessKey::Loadfill, ProcessConfig::rate(Unit::Cartons, 36.0)),
            (ProcessKey::Packaway, ProcessConfig::rate(Unit::Cartons, 32.0)),
            (ProcessKey::Digital, ProcessConfig::rate(Unit::Online, 92.0)),
            (ProcessKey::Online, ProcessConfig::rate(Unit::Online, 50.0)),
            (ProcessKey::Backfill, ProcessConfig::rate(Unit::Cartons, 15.0)),
        ])
    }

    pub fn get(&self, process: ProcessKey) -> ProcessConfig {
        self.entries.get(&process).copied().unwrap_or_default()
    }

    /// Returns a copy with `process` rewritten by `f`. Rates and roster hours
    /// are floored at zero afterwards.
    pub fn with(&self, process: ProcessKey, f: impl FnOnce(&mut ProcessConfig)) -> Self {
        let mut next = self.clone();
        let mut cfg = next.get(process);
        f(&mut cfg);
        cfg.rate_per_thousand = non_negative(cfg.rate_per_thousand);
        cfg.roster_hours = non_negative(cfg.roster_hours);
        next.entries.insert(process, cfg);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_every_process() {
        for table in [ProcessTable::default_current(), ProcessTable::default_new()] {
            for p in ProcessKey::ALL {
                assert!(table.get(p).rate_per_thousand > 0.0, "{} has no rate", p);
                assert!(!table.get(p).use_roster);
            }
        }
        assert_eq!(ProcessTable::default_current().get(ProcessKey::Digital).unit, Unit::Online);
    }

    #[test]
    fn test_with_clamps_negative_values() {
        let table = ProcessTable::default_current()
            .with(ProcessKey::Decant, |c| {
                c.rate_per_thousand = -4.0;
                c.roster_hours = f64::NAN;
            });
        let cfg = table.get(ProcessKey::Decant);
        assert_eq!(cfg.rate_per_thousand, 0.0);
        assert_eq!(cfg.roster_hours, 0.0);
        // untouched entries survive
        assert_eq!(table.get(ProcessKey::Loadfill).rate_per_thousand, 40.0);
    }

    #[test]
    fn test_serializes_digital_key_and_units() {
        let json = serde_json::to_string(&ProcessTable::default_new()).unwrap();
        assert!(json.contains("\"Digital\""));
        assert!(json.contains("\"online\""));
        let back: ProcessTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProcessTable::default_new());
    }
}
