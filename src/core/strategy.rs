//! Built-in investment strategies

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Number of securities in every strategy basket.
pub const BASKET_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    Ethical,
    Growth,
    Index,
    Quality,
    Value,
}

impl StrategyName {
    pub const ALL: [StrategyName; 5] = [
        StrategyName::Ethical,
        StrategyName::Growth,
        StrategyName::Index,
        StrategyName::Quality,
        StrategyName::Value,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Ethical => "ethical",
            StrategyName::Growth => "growth",
            StrategyName::Index => "index",
            StrategyName::Quality => "quality",
            StrategyName::Value => "value",
        }
    }
}

impl Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| anyhow!("Invalid strategy: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub name: StrategyName,
    pub description: &'static str,
    pub tickers: [&'static str; BASKET_SIZE],
}

static STRATEGIES: [Strategy; 5] = [
    Strategy {
        name: StrategyName::Ethical,
        description: "Ethical Investing focuses on companies with strong environmental, social, and governance (ESG) practices, promoting sustainability and ethical operations.",
        tickers: ["AAPL", "ADBE", "NSRGY"],
    },
    Strategy {
        name: StrategyName::Growth,
        description: "Growth Investing targets companies with high growth potential, typically in technology or innovative sectors, with strong revenue and earnings growth.",
        tickers: ["NVDA", "TSLA", "AMZN"],
    },
    Strategy {
        name: StrategyName::Index,
        description: "Index Investing tracks broad market indices for diversified, low-cost exposure to equities or bonds, aiming for steady long-term returns.",
        tickers: ["VTI", "IXUS", "ILTB"],
    },
    Strategy {
        name: StrategyName::Quality,
        description: "Quality Investing selects financially stable companies with high return on equity, low debt, and consistent earnings for reliable performance.",
        tickers: ["MSFT", "JNJ", "PG"],
    },
    Strategy {
        name: StrategyName::Value,
        description: "Value Investing targets undervalued stocks with low price-to-earnings or price-to-book ratios, expected to appreciate over time.",
        tickers: ["BRK-B", "INTC", "JPM"],
    },
];

/// Read-only lookup over the built-in strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyRegistry;

impl StrategyRegistry {
    pub fn get(&self, name: &str) -> Option<&'static Strategy> {
        let name = name.parse::<StrategyName>().ok()?;
        STRATEGIES.iter().find(|s| s.name == name)
    }

    pub fn all(&self) -> &'static [Strategy] {
        &STRATEGIES
    }
}
