use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{non_negative, to_finite_or_zero};

pub const DEFAULT_WEEKS_PER_YEAR: f64 = 52.0;

fn default_weeks() -> f64 {
    DEFAULT_WEEKS_PER_YEAR
}

/// Weekly volume inputs for one store plus the network scaling figures.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelInputs {
    pub cartons_delivered: f64,
    pub online_units: f64,
    pub hourly_rate: f64,
    #[serde(deserialize_with = "deserialize_stores")]
    pub stores: u32,
    #[serde(default = "default_weeks")]
    pub weeks_per_year: f64,
}

impl Default for ModelInputs {
    fn default() -> Self {
        Self {
            cartons_delivered: 12000.0,
            online_units: 1600.0,
            hourly_rate: 32.0,
            stores: 270,
            weeks_per_year: DEFAULT_WEEKS_PER_YEAR,
        }
    }
}

/// Rounds a raw store count and keeps it at one or more.
pub fn store_count(raw: f64) -> u32 {
    let rounded = to_finite_or_zero(raw).round();
    if rounded < 1.0 {
        1
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

// Hand-edited files may hold fractional or negative counts.
fn deserialize_stores<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(store_count)
}

impl ModelInputs {
    /// Returns a copy with every field pulled back into its valid range.
    /// Deserialized scenario files go through this before use.
    pub fn sanitized(&self) -> Self {
        Self {
            cartons_delivered: non_negative(self.cartons_delivered),
            online_units: non_negative(self.online_units),
            hourly_rate: non_negative(self.hourly_rate),
            stores: self.stores.max(1),
            weeks_per_year: non_negative(self.weeks_per_year),
        }
    }
}
