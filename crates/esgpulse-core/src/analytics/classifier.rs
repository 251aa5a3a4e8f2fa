use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Qualitative correlation band. Band boundaries are half-open on the upper
/// side: 0.7 is moderate, 0.71 is strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationLabel {
    StrongPositive,
    ModeratePositive,
    WeakPositive,
    NoCorrelation,
    WeakNegative,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongPositive => "Strong Positive",
            Self::ModeratePositive => "Moderate Positive",
            Self::WeakPositive => "Weak Positive",
            Self::NoCorrelation => "No Correlation",
            Self::WeakNegative => "Weak Negative",
            Self::ModerateNegative => "Moderate Negative",
            Self::StrongNegative => "Strong Negative",
        }
    }

    pub const fn explanation(self) -> &'static str {
        match self {
            Self::StrongPositive => {
                "Strong positive relationship; the series move together closely."
            }
            Self::ModeratePositive => {
                "Moderate positive relationship; the series tend to move together."
            }
            Self::WeakPositive => {
                "Weak positive relationship; the series move together only loosely."
            }
            Self::NoCorrelation => "No meaningful relationship between the series.",
            Self::WeakNegative => {
                "Weak inverse relationship; the series move apart only loosely."
            }
            Self::ModerateNegative => {
                "Moderate inverse relationship; the series tend to move in opposite directions."
            }
            Self::StrongNegative => {
                "Strong inverse relationship; the series move in opposite directions closely."
            }
        }
    }
}

impl Display for CorrelationLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus its fixed human-readable explanation. The same mapping serves
/// per-company and aggregate correlations, so the two call sites cannot
/// drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: CorrelationLabel,
    pub explanation: &'static str,
}

/// Buckets a correlation coefficient. Pure and deterministic; the band table
/// is evaluated top-down with exclusive upper boundaries.
pub fn classify(r: f64) -> Classification {
    let label = if r > 0.7 {
        CorrelationLabel::StrongPositive
    } else if r > 0.4 {
        CorrelationLabel::ModeratePositive
    } else if r > 0.1 {
        CorrelationLabel::WeakPositive
    } else if r > -0.1 {
        CorrelationLabel::NoCorrelation
    } else if r > -0.4 {
        CorrelationLabel::WeakNegative
    } else if r > -0.7 {
        CorrelationLabel::ModerateNegative
    } else {
        CorrelationLabel::StrongNegative
    };

    Classification {
        label,
        explanation: label.explanation(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_exclusive_on_the_upper_side() {
        assert_eq!(classify(0.71).label, CorrelationLabel::StrongPositive);
        assert_eq!(classify(0.7).label, CorrelationLabel::ModeratePositive);
        assert_eq!(classify(0.4).label, CorrelationLabel::WeakPositive);
        assert_eq!(classify(0.1).label, CorrelationLabel::NoCorrelation);
        assert_eq!(classify(-0.1).label, CorrelationLabel::WeakNegative);
        assert_eq!(classify(-0.4).label, CorrelationLabel::ModerateNegative);
        assert_eq!(classify(-0.7).label, CorrelationLabel::StrongNegative);
    }

    #[test]
    fn extremes_and_zero_land_in_expected_bands() {
        assert_eq!(classify(1.0).label, CorrelationLabel::StrongPositive);
        assert_eq!(classify(0.0).label, CorrelationLabel::NoCorrelation);
        assert_eq!(classify(-1.0).label, CorrelationLabel::StrongNegative);
    }
}
