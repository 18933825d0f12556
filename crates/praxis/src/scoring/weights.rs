use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Weights applied to the four sub-scores when computing the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightVector {
    pub time: f64,
    pub cost: f64,
    pub environment: f64,
    pub risk: f64,
}

impl WeightVector {
    pub fn for_strategy(strategy: Strategy) -> Self {
        let (time, cost, environment, risk) = match strategy {
            Strategy::Balanced => (0.3, 0.3, 0.2, 0.2),
            Strategy::CarbonReduction => (0.2, 0.2, 0.4, 0.2),
            Strategy::CostEfficiency => (0.2, 0.4, 0.2, 0.2),
            Strategy::Reliability => (0.3, 0.2, 0.1, 0.4),
        };

        Self {
            time,
            cost,
            environment,
            risk,
        }
    }

    pub fn total(&self) -> f64 {
        self.time + self.cost + self.environment + self.risk
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

impl From<Strategy> for WeightVector {
    fn from(strategy: Strategy) -> Self {
        Self::for_strategy(strategy)
    }
}

/// Named preset selecting one of the fixed weight vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Balanced,
    CarbonReduction,
    CostEfficiency,
    Reliability,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Balanced,
        Strategy::CarbonReduction,
        Strategy::CostEfficiency,
        Strategy::Reliability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::CarbonReduction => "carbon_reduction",
            Strategy::CostEfficiency => "cost_efficiency",
            Strategy::Reliability => "reliability",
        }
    }

    pub fn weights(self) -> WeightVector {
        WeightVector::for_strategy(self)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected balanced, carbon_reduction, cost_efficiency or reliability)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == normalized)
            .ok_or_else(|| UnknownStrategy(value.to_string()))
    }
}
