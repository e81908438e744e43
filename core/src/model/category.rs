use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{clamp_unit, non_negative, to_finite_or_zero};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Demand,
    #[serde(rename = "Non-demand")]
    NonDemand,
    Markup,
    Clearance,
    #[serde(rename = "New lines")]
    NewLines,
    #[serde(rename = "LP")]
    Lp,
    #[serde(rename = "OMS")]
    Oms,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Demand,
        Category::NonDemand,
        Category::Markup,
        Category::Clearance,
        Category::NewLines,
        Category::Lp,
        Category::Oms,
    ];

    /// Markup, Clearance, New lines and LP share a routing in every preset.
    pub const EXTRAS: [Category; 4] = [
        Category::Markup,
        Category::Clearance,
        Category::NewLines,
        Category::Lp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Demand => "Demand",
            Category::NonDemand => "Non-demand",
            Category::Markup => "Markup",
            Category::Clearance => "Clearance",
            Category::NewLines => "New lines",
            Category::Lp => "LP",
            Category::Oms => "OMS",
        }
    }

    /// Key used for `key:value` overrides on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Demand => "demand",
            Category::NonDemand => "non-demand",
            Category::Markup => "markup",
            Category::Clearance => "clearance",
            Category::NewLines => "new-lines",
            Category::Lp => "lp",
            Category::Oms => "oms",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How raw category shares become the shares used for routing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitNormalization {
    /// Divide by the raw total only when it exceeds 1, so effective shares
    /// sum to `min(total, 1)`.
    #[default]
    CapAtOne,
    /// Always divide by the raw total, so any positive split sums to 1.
    /// Reproduces the legacy web calculator's split handling.
    Proportional,
}

/// Category shares of inbound cartons, each in `[0, 1]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct CategorySplit {
    shares: BTreeMap<Category, f64>,
}

impl Default for CategorySplit {
    fn default() -> Self {
        Self::new([
            (Category::Demand, 0.68),
            (Category::NonDemand, 0.10),
            (Category::Markup, 0.02),
            (Category::Clearance, 0.02),
            (Category::NewLines, 0.11),
            (Category::Lp, 0.02),
            (Category::Oms, 0.05),
        ])
    }
}

impl CategorySplit {
    /// Builds a split from raw shares. Values are clamped to `[0, 1]` one by
    /// one; the total is not enforced here, see [`CategorySplit::with_share`].
    pub fn new(shares: impl IntoIterator<Item = (Category, f64)>) -> Self {
        Self {
            shares: shares
                .into_iter()
                .map(|(k, v)| (k, clamp_unit(v)))
                .collect(),
        }
    }

    pub fn zero() -> Self {
        Self::new(Category::ALL.map(|k| (k, 0.0)))
    }

    pub fn share(&self, category: Category) -> f64 {
        self.shares.get(&category).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|k| non_negative(self.share(*k))).sum()
    }

    pub fn remaining(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    /// Largest value `category` may take without pushing the total past 1.
    pub fn max_for(&self, category: Category) -> f64 {
        clamp_unit(1.0 - (self.total() - self.share(category)))
    }

    pub fn with_share(&self, category: Category, value: f64) -> Self {
        let max = self.max_for(category);
        let mut next = self.clone();
        next.shares
            .insert(category, to_finite_or_zero(value).clamp(0.0, max));
        next
    }

    pub fn effective_shares(&self, normalization: SplitNormalization) -> BTreeMap<Category, f64> {
        let total = self.total();
        let divisor = match normalization {
            SplitNormalization::CapAtOne if total > 1.0 => total,
            SplitNormalization::Proportional if total > 0.0 => total,
            _ => 1.0,
        };
        Category::ALL
            .iter()
            .map(|k| (*k, non_negative(self.share(*k)) / divisor))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(shares: &BTreeMap<Category, f64>) -> f64 {
        shares.values().sum()
    }

    #[test]
    fn test_default_split_sums_to_one() {
        assert!((CategorySplit::default().total() - 1.0).abs() < 1e-9);
        assert!(CategorySplit::default().remaining() < 1e-9);
    }

    #[test]
    fn test_with_share_clamps_to_remaining() {
        let split = CategorySplit::default().with_share(Category::Demand, 0.5);
        assert!((split.remaining() - 0.18).abs() < 1e-9);

        // Markup can grow by the 18 points left, not more.
        let grown = split.with_share(Category::Markup, 0.9);
        assert!((grown.share(Category::Markup) - 0.20).abs() < 1e-9);
        assert!((grown.total() - 1.0).abs() < 1e-9);

        let negative = split.with_share(Category::Oms, -0.3);
        assert_eq!(negative.share(Category::Oms), 0.0);
    }

    #[test]
    fn test_cap_at_one_keeps_partial_total() {
        let split = CategorySplit::new([(Category::Demand, 0.3), (Category::Oms, 0.2)]);
        let shares = split.effective_shares(SplitNormalization::CapAtOne);
        assert!((sum(&shares) - 0.5).abs() < 1e-12);
        assert!((shares[&Category::Demand] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_over_allocated_split_is_normalized() {
        let split = CategorySplit::new([(Category::Demand, 0.9), (Category::NonDemand, 0.6)]);
        for mode in [SplitNormalization::CapAtOne, SplitNormalization::Proportional] {
            let shares = split.effective_shares(mode);
            assert!((sum(&shares) - 1.0).abs() < 1e-12);
            assert!((shares[&Category::Demand] - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn test_proportional_rescales_partial_total() {
        let split = CategorySplit::new([(Category::Demand, 0.3), (Category::Oms, 0.2)]);
        let shares = split.effective_shares(SplitNormalization::Proportional);
        assert!((shares[&Category::Demand] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_split_yields_zero_shares() {
        for mode in [SplitNormalization::CapAtOne, SplitNormalization::Proportional] {
            let shares = CategorySplit::zero().effective_shares(mode);
            assert!(shares.values().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_serde_uses_display_labels() {
        let json = serde_json::to_string(&CategorySplit::default()).unwrap();
        assert!(json.contains("\"Non-demand\""));
        assert!(json.contains("\"New lines\""));
        assert!(json.contains("\"OMS\""));
    }
}
