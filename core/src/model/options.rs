use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::category::SplitNormalization;

/// Whether a negative benefit (new model worse than current) is reported.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BenefitMode {
    #[default]
    Signed,
    /// Floor the benefit at zero.
    Clamped,
}

impl FromStr for BenefitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signed" | "s" => Ok(BenefitMode::Signed),
            "clamped" | "clamp" | "c" => Ok(BenefitMode::Clamped),
            _ => Err(format!("Unknown benefit mode: '{}'", s)),
        }
    }
}

impl FromStr for SplitNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cap_at_one" | "cap" => Ok(SplitNormalization::CapAtOne),
            "proportional" | "prop" => Ok(SplitNormalization::Proportional),
            _ => Err(format!("Unknown split normalization: '{}'", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineOptions {
    #[serde(default)]
    pub benefit: BenefitMode,
    #[serde(default)]
    pub normalization: SplitNormalization,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("Clamped".parse::<BenefitMode>(), Ok(BenefitMode::Clamped));
        assert_eq!("signed".parse::<BenefitMode>(), Ok(BenefitMode::Signed));
        assert!("maybe".parse::<BenefitMode>().is_err());
        assert_eq!("cap-at-one".parse::<SplitNormalization>(), Ok(SplitNormalization::CapAtOne));
        assert_eq!("prop".parse::<SplitNormalization>(), Ok(SplitNormalization::Proportional));
    }

    #[test]
    fn test_defaults() {
        let options: EngineOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.benefit, BenefitMode::Signed);
        assert_eq!(options.normalization, SplitNormalization::CapAtOne);
    }
}
