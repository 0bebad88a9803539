//! Strategies: non-empty subsets of the indicator set.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::domain::error::StratsearchError;
use crate::domain::indicator::IndicatorName;

/// A non-empty set of indicators, stored as a bitset over
/// [`IndicatorName::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    bits: u8,
}

impl Strategy {
    const FULL: u8 = (1 << IndicatorName::ALL.len()) - 1;

    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits == 0 || bits & !Self::FULL != 0 {
            None
        } else {
            Some(Strategy { bits })
        }
    }

    pub fn from_names(names: &[IndicatorName]) -> Option<Self> {
        let bits = names.iter().fold(0u8, |acc, n| acc | (1 << n.ordinal()));
        Self::from_bits(bits)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn contains(&self, name: IndicatorName) -> bool {
        self.bits & (1 << name.ordinal()) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in canonical order.
    pub fn indicators(&self) -> impl Iterator<Item = IndicatorName> + '_ {
        IndicatorName::ALL
            .into_iter()
            .filter(move |name| self.contains(*name))
    }

    /// Lexicographic key over canonical ordinals, used for enumeration order.
    fn ordinal_key(&self) -> Vec<usize> {
        self.indicators().map(IndicatorName::ordinal).collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.indicators().map(IndicatorName::as_str).collect();
        f.write_str(&names.join("+"))
    }
}

impl FromStr for Strategy {
    type Err = StratsearchError;

    /// Parses `rsi+roc`, `rsi,roc` or `rsi roc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names = s
            .split(|c: char| c == '+' || c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<IndicatorName>, _>>()?;
        Strategy::from_names(&names).ok_or_else(|| StratsearchError::InvalidParameter {
            name: "strategy".into(),
            reason: "a strategy needs at least one indicator".into(),
        })
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.indicators())
    }
}

/// Every non-empty subset of the indicator set, by increasing size and then
/// lexicographically within a size.
pub fn powerset() -> Vec<Strategy> {
    let mut all: Vec<Strategy> = (1..=Strategy::FULL).filter_map(Strategy::from_bits).collect();
    all.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| a.ordinal_key().cmp(&b.ordinal_key()))
    });
    all
}
