//! Category → process routing tables.
//!
//! The fractions are business assumptions that changed as the operating model
//! was reworked, so each revision is kept as a named preset. A table routes
//! every category to one or more destination processes per operating model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::model::category::Category;
use crate::model::error::{ModelError, ModelResult};
use crate::model::process::{OperatingModel, ProcessKey};

const ROUTING_TOLERANCE: f64 = 1e-9;

/// Destination process → fraction of a category's cartons.
pub type Routing = BTreeMap<ProcessKey, f64>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPreset {
    /// Ratios of the first published calculator.
    #[default]
    Prototype,
    /// Intermediate revision with OMS already routed to Online.
    Staged,
    /// Latest revision: the new model sends each category to one process.
    Refined,
}

impl AllocationPreset {
    pub const ALL: [AllocationPreset; 3] = [
        AllocationPreset::Prototype,
        AllocationPreset::Staged,
        AllocationPreset::Refined,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AllocationPreset::Prototype => "prototype",
            AllocationPreset::Staged => "staged",
            AllocationPreset::Refined => "refined",
        }
    }

    pub fn table(&self) -> AllocationTable {
        use ProcessKey::*;
        match self {
            AllocationPreset::Prototype => AllocationTable::from_parts(
                *self,
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 0.6), (Backfill, 0.4)]),
                    (Category::Oms, vec![(Loadfill, 0.8), (Packaway, 0.2)]),
                ],
                vec![(Loadfill, 0.7), (Digital, 0.3)],
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 0.8), (Loadfill, 0.2)]),
                    (Category::Oms, vec![(Digital, 1.0)]),
                ],
                vec![(Digital, 0.7), (Loadfill, 0.3)],
            ),
            AllocationPreset::Staged => AllocationTable::from_parts(
                *self,
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 0.7), (Backfill, 0.3)]),
                    (Category::Oms, vec![(Online, 1.0)]),
                ],
                vec![(Loadfill, 0.6), (Digital, 0.4)],
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 1.0)]),
                    (Category::Oms, vec![(Online, 1.0)]),
                ],
                vec![(Digital, 0.7), (Loadfill, 0.3)],
            ),
            AllocationPreset::Refined => AllocationTable::from_parts(
                *self,
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 0.8), (Backfill, 0.2)]),
                    (Category::Oms, vec![(Online, 0.8), (Packaway, 0.2)]),
                ],
                vec![(Loadfill, 0.7), (Digital, 0.3)],
                [
                    (Category::Demand, vec![(Loadfill, 1.0)]),
                    (Category::NonDemand, vec![(Packaway, 1.0)]),
                    (Category::Oms, vec![(Online, 1.0)]),
                ],
                vec![(Digital, 1.0)],
            ),
        }
    }
}

impl fmt::Display for AllocationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocationPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AllocationPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown allocation preset: '{}'", s))
    }
}

/// Routing of every category for one operating model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ModelAllocation {
    routes: BTreeMap<Category, Routing>,
}

impl ModelAllocation {
    pub fn route(&self, category: Category) -> Option<&Routing> {
        self.routes.get(&category)
    }

    fn validate(&self) -> ModelResult<()> {
        for category in Category::ALL {
            let routing = self.routes.get(&category);
            let sum: f64 = routing.map(|r| r.values().sum()).unwrap_or(0.0);
            if let Some(routing) = routing {
                if routing.contains_key(&ProcessKey::Decant) {
                    return Err(ModelError::DecantDestination { category });
                }
                if let Some((process, _)) = routing.iter().find(|(_, f)| !(**f >= 0.0)) {
                    return Err(ModelError::NegativeFraction {
                        category,
                        process: *process,
                    });
                }
            }
            if (sum - 1.0).abs() > ROUTING_TOLERANCE {
                return Err(ModelError::InvalidRouting { category, sum });
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AllocationTable {
    /// Preset the table came from, `None` for a custom table.
    pub preset: Option<AllocationPreset>,
    current: ModelAllocation,
    new: ModelAllocation,
}

impl Default for AllocationTable {
    fn default() -> Self {
        AllocationPreset::default().table()
    }
}

impl AllocationTable {
    /// Builds a custom table. Every category needs a routing whose
    /// non-negative fractions sum to 1, and Decant can't be a destination.
    pub fn new(
        current: BTreeMap<Category, Routing>,
        new: BTreeMap<Category, Routing>,
    ) -> ModelResult<Self> {
        let table = Self {
            preset: None,
            current: ModelAllocation { routes: current },
            new: ModelAllocation { routes: new },
        };
        table.validate()?;
        Ok(table)
    }

    fn from_parts<const N: usize>(
        preset: AllocationPreset,
        current: [(Category, Vec<(ProcessKey, f64)>); N],
        current_extras: Vec<(ProcessKey, f64)>,
        new: [(Category, Vec<(ProcessKey, f64)>); N],
        new_extras: Vec<(ProcessKey, f64)>,
    ) -> Self {
        let build = |fixed: [(Category, Vec<(ProcessKey, f64)>); N], extras: Vec<(ProcessKey, f64)>| {
            let mut routes: BTreeMap<Category, Routing> = fixed
                .into_iter()
                .map(|(c, r)| (c, r.into_iter().collect()))
                .collect();
            for c in Category::EXTRAS {
                routes.insert(c, extras.iter().copied().collect());
            }
            ModelAllocation { routes }
        };
        Self {
            preset: Some(preset),
            current: build(current, current_extras),
            new: build(new, new_extras),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.current.validate()?;
        self.new.validate()
    }

    pub fn for_model(&self, model: OperatingModel) -> &ModelAllocation {
        match model {
            OperatingModel::Current => &self.current,
            OperatingModel::New => &self.new,
        }
    }

    pub fn label(&self) -> String {
        self.preset
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "custom".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in AllocationPreset::ALL {
            assert_eq!(preset.table().validate(), Ok(()), "{}", preset);
            assert_eq!(preset.table().preset, Some(preset));
        }
    }

    #[test]
    fn test_new_model_concentrates_extras_in_digital() {
        for preset in AllocationPreset::ALL {
            let table = preset.table();
            for c in Category::EXTRAS {
                let cur = table.for_model(OperatingModel::Current).route(c).unwrap();
                let new = table.for_model(OperatingModel::New).route(c).unwrap();
                let digital = |r: &Routing| r.get(&ProcessKey::Digital).copied().unwrap_or(0.0);
                assert!(digital(new) > digital(cur), "{} {}", preset, c);
            }
        }
    }

    #[test]
    fn test_current_model_spreads_load_wider() {
        for preset in AllocationPreset::ALL {
            let table = preset.table();
            let destinations = |m: OperatingModel| {
                let mut used: Vec<ProcessKey> = Category::ALL
                    .iter()
                    .flat_map(|c| table.for_model(m).route(*c).unwrap().keys().copied())
                    .collect();
                used.sort();
                used.dedup();
                used.len()
            };
            assert!(destinations(OperatingModel::Current) >= destinations(OperatingModel::New));
        }
    }

    #[test]
    fn test_custom_table_validation() {
        let mut good: BTreeMap<Category, Routing> = Category::ALL
            .iter()
            .map(|c| (*c, Routing::from([(ProcessKey::Loadfill, 1.0)])))
            .collect();
        assert!(AllocationTable::new(good.clone(), good.clone()).is_ok());

        let mut short = good.clone();
        short.insert(Category::Oms, Routing::from([(ProcessKey::Online, 0.5)]));
        assert!(matches!(
            AllocationTable::new(short, good.clone()),
            Err(ModelError::InvalidRouting { category: Category::Oms, .. })
        ));

        let mut missing = good.clone();
        missing.remove(&Category::Lp);
        assert!(AllocationTable::new(good.clone(), missing).is_err());

        good.insert(
            Category::Demand,
            Routing::from([(ProcessKey::Decant, 0.5), (ProcessKey::Loadfill, 0.5)]),
        );
        assert_eq!(
            AllocationTable::new(good.clone(), good),
            Err(ModelError::DecantDestination { category: Category::Demand })
        );
    }

    #[test]
    fn test_negative_fraction_rejected() {
        let mut routes: BTreeMap<Category, Routing> = Category::ALL
            .iter()
            .map(|c| (*c, Routing::from([(ProcessKey::Loadfill, 1.0)])))
            .collect();
        routes.insert(
            Category::Markup,
            Routing::from([(ProcessKey::Loadfill, 1.5), (ProcessKey::Digital, -0.5)]),
        );
        assert!(matches!(
            AllocationTable::new(routes.clone(), routes),
            Err(ModelError::NegativeFraction { process: ProcessKey::Digital, .. })
        ));
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Refined".parse::<AllocationPreset>(), Ok(AllocationPreset::Refined));
        assert!("lean".parse::<AllocationPreset>().is_err());
    }
}
