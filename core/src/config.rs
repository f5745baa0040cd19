use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_K1: f64 = 0.5;
pub const DEFAULT_B: f64 = 1.0;
pub const DEFAULT_PASSAGES_PER_UNIT: u32 = 500;

/// How a term that occurs several times in a query contributes to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatedTerms {
    /// Every occurrence adds its term weight again.
    #[default]
    PerOccurrence,
    /// Each distinct term is weighted once.
    Distinct,
}

/// BM25 tuning. Passed to the ranker at construction, never read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length-normalization strength, 0 disables it.
    pub b: f64,
    pub repeated_terms: RepeatedTerms,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { k1: DEFAULT_K1, b: DEFAULT_B, repeated_terms: RepeatedTerms::default() }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(SearchError::InvalidConfig(format!("k1 must be a finite value >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SearchError::InvalidConfig(format!("b must be within [0, 1], got {}", self.b)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranking: RankingConfig,
    /// Maximum passages per source unit, used to lay out doc ids.
    pub passages_per_unit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { ranking: RankingConfig::default(), passages_per_unit: DEFAULT_PASSAGES_PER_UNIT }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.passages_per_unit == 0 {
            return Err(SearchError::InvalidConfig("passages_per_unit must be at least 1".into()));
        }
        self.ranking.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.ranking.k1, 0.5);
        assert_eq!(cfg.ranking.b, 1.0);
        assert_eq!(cfg.ranking.repeated_terms, RepeatedTerms::PerOccurrence);
        assert_eq!(cfg.passages_per_unit, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"ranking": {"k1": 1.2, "repeated_terms": "distinct"}}"#).unwrap();
        assert_eq!(cfg.ranking.k1, 1.2);
        assert_eq!(cfg.ranking.b, 1.0);
        assert_eq!(cfg.ranking.repeated_terms, RepeatedTerms::Distinct);
        assert_eq!(cfg.passages_per_unit, 500);
    }

    #[test]
    fn rejects_out_of_range_tuning() {
        let bad_b = RankingConfig { b: 1.5, ..RankingConfig::default() };
        assert!(matches!(bad_b.validate(), Err(SearchError::InvalidConfig(_))));
        let bad_k1 = RankingConfig { k1: f64::NAN, ..RankingConfig::default() };
        assert!(bad_k1.validate().is_err());
        let zero_cap = EngineConfig { passages_per_unit: 0, ..EngineConfig::default() };
        assert!(zero_cap.validate().is_err());
    }
}
