use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

use super::{DateRange, IsoDate, Symbol};

/// Portfolio-optimization policy selected by the user and passed through to
/// the backend verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskProfile {
    pub const ALL: [Self; 3] = [Self::Low, Self::Moderate, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl Display for RiskProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            other => Err(ValidationError::InvalidRiskProfile {
                value: other.to_owned(),
            }),
        }
    }
}

/// User-selectable correlation lag, bounded to 1..=5 periods.
///
/// Out-of-domain input is clamped rather than rejected so the selection is
/// never left in an unrenderable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LagWindow(u8);

impl LagWindow {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(5);

    pub fn clamped(value: u8) -> Self {
        Self(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for LagWindow {
    fn default() -> Self {
        Self::MIN
    }
}

impl Display for LagWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observation of a date-keyed series, ordered ascending by date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: IsoDate,
    pub value: f64,
}

/// One observation of a year-keyed series, ordered ascending by year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: u16,
    pub value: f64,
}

/// Correlation measured at one lag offset; `None` when the backend had
/// insufficient data at that offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSample {
    pub lag: u32,
    pub correlation: Option<f64>,
}

/// One active portfolio constituent. Weight and volatility are percentages;
/// the weight keeps full precision for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAllocation {
    pub symbol: Symbol,
    pub weight_pct: f64,
    pub volatility_pct: f64,
}

/// Qualitative sentiment band reported by the backend per ticker and per
/// date. Strings outside the known bands are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Bearish,
    SomewhatBearish,
    Neutral,
    SomewhatBullish,
    Bullish,
    Other(String),
}

impl SentimentLabel {
    pub fn parse(input: &str) -> Self {
        match input {
            "Bearish" => Self::Bearish,
            "Somewhat-Bearish" => Self::SomewhatBearish,
            "Neutral" => Self::Neutral,
            "Somewhat-Bullish" => Self::SomewhatBullish,
            "Bullish" => Self::Bullish,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bearish => "Bearish",
            Self::SomewhatBearish => "Somewhat-Bearish",
            Self::Neutral => "Neutral",
            Self::SomewhatBullish => "Somewhat-Bullish",
            Self::Bullish => "Bullish",
            Self::Other(raw) => raw,
        }
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SentimentLabel> for String {
    fn from(value: SentimentLabel) -> Self {
        value.as_str().to_owned()
    }
}

/// The authoritative user selection. Created once at dashboard start and
/// mutated in place, field by field, for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_company: Option<Symbol>,
    pub date_range: DateRange,
    pub risk_profile: RiskProfile,
    pub lag: LagWindow,
}
