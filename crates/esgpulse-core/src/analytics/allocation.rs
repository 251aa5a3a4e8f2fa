use indexmap::IndexMap;

use crate::domain::{PortfolioAllocation, Symbol};

use super::AnalyticsError;

/// Total, disjoint partition of one portfolio query's symbols. Symbols whose
/// weight rounds to a whole 0% carry no allocation detail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationBuckets {
    pub active: Vec<PortfolioAllocation>,
    pub zero_allocation: Vec<Symbol>,
}

/// Converts weight/volatility fractions into percentage buckets.
///
/// Rounding applies to the activity test only; active entries keep the
/// full-precision percentage for display. Malformed weights are an error,
/// never silently dropped.
pub fn bucketize(
    weights: &IndexMap<Symbol, f64>,
    volatilities: &IndexMap<Symbol, f64>,
) -> Result<AllocationBuckets, AnalyticsError> {
    let mut buckets = AllocationBuckets::default();

    for (symbol, weight) in weights {
        if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
            return Err(AnalyticsError::InvalidWeight {
                symbol: symbol.clone(),
                value: *weight,
            });
        }

        let weight_pct = weight * 100.0;
        if weight_pct.round() > 0.0 {
            let volatility = volatilities.get(symbol).copied().ok_or_else(|| {
                AnalyticsError::MissingVolatility {
                    symbol: symbol.clone(),
                }
            })?;
            if !volatility.is_finite() || volatility < 0.0 {
                return Err(AnalyticsError::InvalidVolatility {
                    symbol: symbol.clone(),
                    value: volatility,
                });
            }
            buckets.active.push(PortfolioAllocation {
                symbol: symbol.clone(),
                weight_pct,
                volatility_pct: volatility * 100.0,
            });
        } else {
            buckets.zero_allocation.push(symbol.clone());
        }
    }

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn map(entries: &[(&str, f64)]) -> IndexMap<Symbol, f64> {
        entries
            .iter()
            .map(|(raw, value)| (symbol(raw), *value))
            .collect()
    }

    #[test]
    fn rounding_decides_activity_but_display_keeps_precision() {
        let weights = map(&[("XOM", 0.006), ("CVX", 0.004), ("NEE", 0.99)]);
        let volatilities = map(&[("XOM", 0.02), ("CVX", 0.03), ("NEE", 0.04)]);

        let buckets = bucketize(&weights, &volatilities).expect("well-formed input");
        let active: Vec<&str> = buckets
            .active
            .iter()
            .map(|entry| entry.symbol.as_str())
            .collect();
        assert_eq!(active, vec!["XOM", "NEE"]);
        assert_eq!(buckets.zero_allocation, vec![symbol("CVX")]);

        // 0.006 rounds to 1% for the split but displays as 0.6%.
        assert!((buckets.active[0].weight_pct - 0.6).abs() < 1e-12);
        assert!((buckets.active[0].volatility_pct - 2.0).abs() < 1e-12);
    }

    #[test]
    fn partition_is_total_and_disjoint() {
        let weights = map(&[("XOM", 0.5), ("CVX", 0.5), ("BP", 0.0)]);
        let volatilities = map(&[("XOM", 0.1), ("CVX", 0.1), ("BP", 0.1)]);

        let buckets = bucketize(&weights, &volatilities).expect("well-formed input");
        assert_eq!(buckets.active.len() + buckets.zero_allocation.len(), 3);
        for entry in &buckets.active {
            assert!(!buckets.zero_allocation.contains(&entry.symbol));
        }
    }

    #[test]
    fn negative_weight_is_rejected() {
        let weights = map(&[("XOM", -0.2)]);
        let volatilities = map(&[("XOM", 0.1)]);
        let err = bucketize(&weights, &volatilities).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::InvalidWeight { .. }));
    }

    #[test]
    fn active_symbol_without_volatility_is_rejected() {
        let weights = map(&[("XOM", 0.8)]);
        let volatilities = map(&[("CVX", 0.1)]);
        let err = bucketize(&weights, &volatilities).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::MissingVolatility { .. }));
    }
}
