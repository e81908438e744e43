use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::error::{ModelError, ModelResult};
use crate::model::process::ProcessKey;
use crate::model::to_finite_or_zero;

/// A named operational problem that inflates hours for some processes.
/// Impacts are fractional deltas; 0.08 means +8% hours.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IssueScenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub impact: BTreeMap<ProcessKey, f64>,
}

impl IssueScenario {
    pub fn new(id: &str, name: &str, impact: impl IntoIterator<Item = (ProcessKey, f64)>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            impact: impact.into_iter().collect(),
        }
    }

    pub fn impact_on(&self, process: ProcessKey) -> f64 {
        self.impact
            .get(&process)
            .copied()
            .map(to_finite_or_zero)
            .unwrap_or(0.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct IssueCatalog {
    issues: Vec<IssueScenario>,
}

impl Default for IssueCatalog {
    fn default() -> Self {
        Self {
            issues: vec![
                IssueScenario::new(
                    "late",
                    "Late DC Delivery",
                    [(ProcessKey::Decant, 0.08), (ProcessKey::Loadfill, 0.04)],
                ),
                IssueScenario::new(
                    "non_dem",
                    "High Non-demand Mix",
                    [(ProcessKey::Packaway, 0.08), (ProcessKey::Loadfill, 0.03)],
                ),
                IssueScenario::new(
                    "roster",
                    "Roster Gaps",
                    [
                        (ProcessKey::Decant, 0.07),
                        (ProcessKey::Loadfill, 0.07),
                        (ProcessKey::Online, 0.07),
                    ],
                ),
            ],
        }
    }
}

impl IssueCatalog {
    pub fn new(issues: Vec<IssueScenario>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[IssueScenario] {
        &self.issues
    }

    pub fn get(&self, id: &str) -> Option<&IssueScenario> {
        self.issues.iter().find(|i| i.id == id)
    }

    fn position(&self, id: &str) -> ModelResult<usize> {
        self.issues
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| ModelError::UnknownIssue(id.to_string()))
    }

    /// Adds or replaces the impact of `issue_id` on `process`.
    pub fn with_impact(&self, issue_id: &str, process: ProcessKey, delta: f64) -> ModelResult<Self> {
        let pos = self.position(issue_id)?;
        let mut next = self.clone();
        next.issues[pos]
            .impact
            .insert(process, to_finite_or_zero(delta));
        Ok(next)
    }

    /// Removing an impact the issue never had leaves the catalog unchanged.
    pub fn without_impact(&self, issue_id: &str, process: ProcessKey) -> ModelResult<Self> {
        let pos = self.position(issue_id)?;
        let mut next = self.clone();
        next.issues[pos].impact.remove(&process);
        Ok(next)
    }

    /// Appends an issue with no impacts yet. Returns the new catalog and the
    /// generated id.
    pub fn with_issue(&self, name: &str) -> (Self, String) {
        let id = Uuid::new_v4().simple().to_string();
        let mut next = self.clone();
        next.issues.push(IssueScenario::new(&id, name.trim(), []));
        (next, id)
    }

    pub fn without_issue(&self, issue_id: &str) -> ModelResult<Self> {
        let pos = self.position(issue_id)?;
        let mut next = self.clone();
        next.issues.remove(pos);
        Ok(next)
    }
}

/// Which issues are switched on. Ids absent from the map are off.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct IssueToggles {
    enabled: BTreeMap<String, bool>,
}

impl IssueToggles {
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.get(id).copied().unwrap_or(false)
    }

    pub fn with(&self, id: &str, on: bool) -> Self {
        let mut next = self.clone();
        next.enabled.insert(id.to_string(), on);
        next
    }

    pub fn without(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.enabled.remove(id);
        next
    }

    pub fn enabled_ids(&self) -> impl Iterator<Item = &str> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(id, _)| id.as_str())
    }
}
