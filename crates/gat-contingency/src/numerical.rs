//! Single-variable numeric filters used for nominal voltage criteria.
//!
//! A [`NumericalFilter`] is validated when it is built (or deserialized) and
//! resolves to a [`VoltageInterval`]. Comparisons are exact: no tolerance is
//! applied at the boundaries.

use gat_core::{GatError, GatResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumericalFilterOperator {
    #[serde(alias = "EQ")]
    Equality,
    #[serde(alias = "LT")]
    LessThan,
    #[serde(alias = "LE")]
    LessOrEqual,
    #[serde(alias = "GT")]
    GreaterThan,
    #[serde(alias = "GE")]
    GreaterOrEqual,
    Range,
}

impl FromStr for NumericalFilterOperator {
    type Err = GatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUALITY" | "EQ" => Ok(Self::Equality),
            "LESS_THAN" | "LT" => Ok(Self::LessThan),
            "LESS_OR_EQUAL" | "LE" => Ok(Self::LessOrEqual),
            "GREATER_THAN" | "GT" => Ok(Self::GreaterThan),
            "GREATER_OR_EQUAL" | "GE" => Ok(Self::GreaterOrEqual),
            "RANGE" => Ok(Self::Range),
            other => Err(GatError::InvalidDefinition(format!(
                "unknown numerical filter operator '{other}'"
            ))),
        }
    }
}

/// Interval a filter resolves to. Infinite bounds stand for "no bound".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageInterval {
    pub low: f64,
    pub high: f64,
    pub low_inclusive: bool,
    pub high_inclusive: bool,
}

impl VoltageInterval {
    pub const UNBOUNDED: VoltageInterval = VoltageInterval {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
        low_inclusive: true,
        high_inclusive: true,
    };

    pub fn contains(&self, value: f64) -> bool {
        let above_low = if self.low_inclusive {
            value >= self.low
        } else {
            value > self.low
        };
        let below_high = if self.high_inclusive {
            value <= self.high
        } else {
            value < self.high
        };
        above_low && below_high
    }
}

/// Numeric comparison on one variable.
///
/// `value1` absent means the filter places no constraint. `RANGE` needs both
/// values with `value1 <= value2`; other operators only read `value1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NumericalFilterDto", into = "NumericalFilterDto")]
pub struct NumericalFilter {
    operator: NumericalFilterOperator,
    value1: Option<f64>,
    value2: Option<f64>,
}

impl NumericalFilter {
    pub fn new(
        operator: NumericalFilterOperator,
        value1: Option<f64>,
        value2: Option<f64>,
    ) -> GatResult<Self> {
        for value in [value1, value2].into_iter().flatten() {
            if !value.is_finite() {
                return Err(GatError::InvalidDefinition(format!(
                    "numerical filter value {value} is not a finite number"
                )));
            }
        }

        match operator {
            NumericalFilterOperator::Range => match (value1, value2) {
                (Some(low), Some(high)) if low <= high => Ok(Self {
                    operator,
                    value1,
                    value2,
                }),
                (Some(low), Some(high)) => Err(GatError::InvalidDefinition(format!(
                    "range lower bound {low} is greater than upper bound {high}"
                ))),
                _ => Err(GatError::InvalidDefinition(
                    "range filter requires both value1 and value2".to_string(),
                )),
            },
            // value2 carries no meaning outside RANGE
            _ => Ok(Self {
                operator,
                value1,
                value2: None,
            }),
        }
    }

    /// Inclusive `[low, high]` filter.
    pub fn range(low: f64, high: f64) -> GatResult<Self> {
        Self::new(NumericalFilterOperator::Range, Some(low), Some(high))
    }

    pub fn operator(&self) -> NumericalFilterOperator {
        self.operator
    }

    pub fn value1(&self) -> Option<f64> {
        self.value1
    }

    pub fn value2(&self) -> Option<f64> {
        self.value2
    }

    pub fn is_unconstrained(&self) -> bool {
        self.value1.is_none()
    }

    pub fn to_interval(&self) -> VoltageInterval {
        let Some(v1) = self.value1 else {
            return VoltageInterval::UNBOUNDED;
        };
        let (low, low_inclusive, high, high_inclusive) = match self.operator {
            NumericalFilterOperator::Equality => (v1, true, v1, true),
            NumericalFilterOperator::LessThan => (f64::NEG_INFINITY, true, v1, false),
            NumericalFilterOperator::LessOrEqual => (f64::NEG_INFINITY, true, v1, true),
            NumericalFilterOperator::GreaterThan => (v1, false, f64::INFINITY, true),
            NumericalFilterOperator::GreaterOrEqual => (v1, true, f64::INFINITY, true),
            NumericalFilterOperator::Range => (v1, true, self.value2.unwrap_or(v1), true),
        };
        VoltageInterval {
            low,
            high,
            low_inclusive,
            high_inclusive,
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        self.is_unconstrained() || self.to_interval().contains(value)
    }

    pub fn operator_symbol(&self) -> &'static str {
        match self.operator {
            NumericalFilterOperator::Equality => "==",
            NumericalFilterOperator::LessThan => "<",
            NumericalFilterOperator::LessOrEqual => "<=",
            NumericalFilterOperator::GreaterThan => ">",
            NumericalFilterOperator::GreaterOrEqual => ">=",
            NumericalFilterOperator::Range => "range",
        }
    }
}

impl fmt::Display for NumericalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operator, self.value1, self.value2) {
            (_, None, _) => f.write_str("any"),
            (NumericalFilterOperator::Range, Some(low), Some(high)) => {
                write!(f, "[{low}, {high}]")
            }
            (_, Some(v1), _) => write!(f, "{} {}", self.operator_symbol(), v1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NumericalFilterDto {
    #[serde(rename = "type")]
    operator: NumericalFilterOperator,
    #[serde(default)]
    value1: Option<f64>,
    #[serde(default)]
    value2: Option<f64>,
}

impl TryFrom<NumericalFilterDto> for NumericalFilter {
    type Error = GatError;

    fn try_from(dto: NumericalFilterDto) -> Result<Self, Self::Error> {
        NumericalFilter::new(dto.operator, dto.value1, dto.value2)
    }
}

impl From<NumericalFilter> for NumericalFilterDto {
    fn from(filter: NumericalFilter) -> Self {
        Self {
            operator: filter.operator,
            value1: filter.value1,
            value2: filter.value2,
        }
    }
}
