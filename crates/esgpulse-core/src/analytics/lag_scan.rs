use crate::domain::CorrelationSample;

use super::AnalyticsError;

/// A lag scan with its optimum resolved: the lag whose correlation has the
/// greatest absolute value, ties broken by the smallest lag.
#[derive(Debug, Clone, PartialEq)]
pub struct LagScan {
    /// All samples sorted ascending by lag; undefined correlations are
    /// retained so the chart can show gaps.
    pub samples: Vec<CorrelationSample>,
    pub optimal_lag: u32,
    pub optimal_correlation: f64,
}

/// Resolves the optimum of a lag scan. Undefined samples are skipped in the
/// optimum search; a scan with no defined sample at all is `EmptyScan`.
pub fn aggregate_scan<I>(samples: I) -> Result<LagScan, AnalyticsError>
where
    I: IntoIterator<Item = CorrelationSample>,
{
    let mut samples: Vec<CorrelationSample> = samples.into_iter().collect();
    samples.sort_by_key(|sample| sample.lag);

    let mut best: Option<(u32, f64)> = None;
    for sample in &samples {
        if let Some(correlation) = sample.correlation {
            // Strict comparison keeps the earlier (smaller) lag on ties.
            let replace = match best {
                None => true,
                Some((_, current)) => correlation.abs() > current.abs(),
            };
            if replace {
                best = Some((sample.lag, correlation));
            }
        }
    }

    let (optimal_lag, optimal_correlation) = best.ok_or(AnalyticsError::EmptyScan)?;
    Ok(LagScan {
        samples,
        optimal_lag,
        optimal_correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lag: u32, correlation: Option<f64>) -> CorrelationSample {
        CorrelationSample { lag, correlation }
    }

    #[test]
    fn optimum_is_greatest_absolute_value() {
        let scan = aggregate_scan([
            sample(1, Some(0.2)),
            sample(2, Some(-0.5)),
            sample(3, Some(0.1)),
        ])
        .expect("scan has defined samples");
        assert_eq!(scan.optimal_lag, 2);
        assert_eq!(scan.optimal_correlation, -0.5);
    }

    #[test]
    fn ties_break_toward_the_smallest_lag() {
        let scan = aggregate_scan([sample(1, Some(0.3)), sample(2, Some(-0.3))])
            .expect("scan has defined samples");
        assert_eq!(scan.optimal_lag, 1);
        assert_eq!(scan.optimal_correlation, 0.3);
    }

    #[test]
    fn undefined_samples_are_kept_but_never_win() {
        let scan = aggregate_scan([sample(1, None), sample(2, Some(0.2)), sample(3, None)])
            .expect("scan has one defined sample");
        assert_eq!(scan.optimal_lag, 2);
        assert_eq!(scan.samples.len(), 3);
        assert_eq!(scan.samples[0].correlation, None);
    }

    #[test]
    fn all_undefined_scan_is_empty() {
        let err = aggregate_scan([sample(1, None), sample(2, None)]).expect_err("must fail");
        assert_eq!(err, AnalyticsError::EmptyScan);
    }

    #[test]
    fn samples_are_reordered_ascending_by_lag() {
        let scan = aggregate_scan([sample(3, Some(0.1)), sample(1, Some(0.9))])
            .expect("scan has defined samples");
        assert_eq!(scan.samples[0].lag, 1);
        assert_eq!(scan.samples[1].lag, 3);
    }
}
