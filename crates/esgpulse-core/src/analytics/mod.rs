//! Pure derived analytics. Everything here is computed from fetched numeric
//! payloads alone; nothing touches the network or the selection.

mod allocation;
mod classifier;
mod lag_scan;

pub use allocation::{bucketize, AllocationBuckets};
pub use classifier::{classify, Classification, CorrelationLabel};
pub use lag_scan::{aggregate_scan, LagScan};

use indexmap::IndexMap;
use thiserror::Error;

use crate::domain::Symbol;
use crate::gateway::{
    CompanyLagScanPayload, CompanySentimentPayload, EsgBundlePayload, LaggedEsgScanPayload,
    PortfolioInsightPayload, SentimentSummaryPayload, SourceKind, SourcePayload,
    StockSeriesPayload,
};

/// Derivation failures. These surface as malformed-payload errors at commit
/// time since they are payload-invariant violations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("lag scan has no defined correlation samples")]
    EmptyScan,
    #[error("weight for '{symbol}' is not a finite fraction in [0, 1]: {value}")]
    InvalidWeight { symbol: Symbol, value: f64 },
    #[error("volatility for '{symbol}' is negative or not finite: {value}")]
    InvalidVolatility { symbol: Symbol, value: f64 },
    #[error("no volatility reported for allocated symbol '{symbol}'")]
    MissingVolatility { symbol: Symbol },
}

/// The last accepted payload of one source plus its derived analytics.
/// Replaced wholesale on every commit; observers never see a torn value.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedResult {
    StockSeries {
        payload: StockSeriesPayload,
        /// Distinct symbols in first-seen order, for the company selector.
        companies: Vec<Symbol>,
    },
    EsgBundle {
        payload: EsgBundlePayload,
        classifications: IndexMap<Symbol, Classification>,
    },
    LaggedEsgScan {
        payload: LaggedEsgScanPayload,
    },
    SentimentSummary {
        payload: SentimentSummaryPayload,
        overall: Option<Classification>,
    },
    CompanySentiment {
        payload: CompanySentimentPayload,
        classification: Option<Classification>,
    },
    CompanyLagScan {
        payload: CompanyLagScanPayload,
        /// `None` when every sample was undefined; rendered as "N/A".
        scan: Option<LagScan>,
    },
    PortfolioInsight {
        payload: PortfolioInsightPayload,
        allocation: AllocationBuckets,
    },
}

impl DerivedResult {
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::StockSeries { .. } => SourceKind::StockSeries,
            Self::EsgBundle { .. } => SourceKind::EsgBundle,
            Self::LaggedEsgScan { .. } => SourceKind::LaggedEsgScan,
            Self::SentimentSummary { .. } => SourceKind::SentimentSummary,
            Self::CompanySentiment { .. } => SourceKind::CompanySentiment,
            Self::CompanyLagScan { .. } => SourceKind::CompanyLagScan,
            Self::PortfolioInsight { .. } => SourceKind::PortfolioInsight,
        }
    }
}

/// Runs the derivation that belongs to a payload's source kind.
pub fn derive(payload: SourcePayload) -> Result<DerivedResult, AnalyticsError> {
    match payload {
        SourcePayload::StockSeries(payload) => {
            let mut companies: Vec<Symbol> = Vec::new();
            for point in &payload.points {
                if !companies.contains(&point.symbol) {
                    companies.push(point.symbol.clone());
                }
            }
            Ok(DerivedResult::StockSeries { payload, companies })
        }
        SourcePayload::EsgBundle(payload) => {
            let classifications = payload
                .correlations
                .iter()
                .map(|(symbol, correlation)| (symbol.clone(), classify(*correlation)))
                .collect();
            Ok(DerivedResult::EsgBundle {
                payload,
                classifications,
            })
        }
        SourcePayload::LaggedEsgScan(payload) => Ok(DerivedResult::LaggedEsgScan { payload }),
        SourcePayload::SentimentSummary(payload) => {
            let overall = payload.overall_correlation.map(classify);
            Ok(DerivedResult::SentimentSummary { payload, overall })
        }
        SourcePayload::CompanySentiment(payload) => {
            let classification = payload.correlation.map(classify);
            Ok(DerivedResult::CompanySentiment {
                payload,
                classification,
            })
        }
        SourcePayload::CompanyLagScan(payload) => {
            let scan = match aggregate_scan(payload.correlations_by_lag.iter().copied()) {
                Ok(scan) => Some(scan),
                Err(AnalyticsError::EmptyScan) => None,
                Err(err) => return Err(err),
            };
            Ok(DerivedResult::CompanyLagScan { payload, scan })
        }
        SourcePayload::PortfolioInsight(payload) => {
            let allocation = bucketize(&payload.weights, &payload.volatilities)?;
            Ok(DerivedResult::PortfolioInsight {
                payload,
                allocation,
            })
        }
    }
}
