use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::model::non_negative;
use crate::model::process::{OperatingModel, ProcessKey};

/// Which operating model imported forecast hours replace.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverrideScope {
    #[default]
    Current,
    New,
    Both,
}

impl OverrideScope {
    pub fn covers(&self, model: OperatingModel) -> bool {
        matches!(
            (self, model),
            (OverrideScope::Both, _)
                | (OverrideScope::Current, OperatingModel::Current)
                | (OverrideScope::New, OperatingModel::New)
        )
    }
}

impl FromStr for OverrideScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "cur" => Ok(OverrideScope::Current),
            "new" => Ok(OverrideScope::New),
            "both" | "all" => Ok(OverrideScope::Both),
            _ => Err(format!("Unknown override scope: '{}'", s)),
        }
    }
}

/// Forecast weekly hours for some processes, usually from a roster workbook.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ForecastOverride {
    pub hours: BTreeMap<ProcessKey, f64>,
    #[serde(default)]
    pub scope: OverrideScope,
}

impl ForecastOverride {
    pub fn new(hours: impl IntoIterator<Item = (ProcessKey, f64)>) -> Self {
        Self {
            hours: hours
                .into_iter()
                .map(|(p, h)| (p, non_negative(h)))
                .collect(),
            scope: OverrideScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: OverrideScope) -> Self {
        self.scope = scope;
        self
    }

    /// Forecast hours for `process` when this override applies to `model`.
    pub fn hours_for(&self, process: ProcessKey, model: OperatingModel) -> Option<f64> {
        if !self.scope.covers(model) {
            return None;
        }
        self.hours.get(&process).copied().map(non_negative)
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_defaults_to_current() {
        let forecast = ForecastOverride::new([(ProcessKey::Decant, 150.0)]);
        assert_eq!(forecast.hours_for(ProcessKey::Decant, OperatingModel::Current), Some(150.0));
        assert_eq!(forecast.hours_for(ProcessKey::Decant, OperatingModel::New), None);
        assert_eq!(forecast.hours_for(ProcessKey::Online, OperatingModel::Current), None);
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("Both".parse::<OverrideScope>(), Ok(OverrideScope::Both));
        assert_eq!("cur".parse::<OverrideScope>(), Ok(OverrideScope::Current));
        assert!("later".parse::<OverrideScope>().is_err());
    }

    #[test]
    fn test_scope_both() {
        let forecast = ForecastOverride::new([(ProcessKey::Online, -3.0)]).with_scope(OverrideScope::Both);
        for model in OperatingModel::BOTH {
            assert_eq!(forecast.hours_for(ProcessKey::Online, model), Some(0.0));
        }
    }
}
