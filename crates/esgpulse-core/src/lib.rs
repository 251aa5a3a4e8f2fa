//! Selection-driven data synchronization and derived analytics for the
//! esgpulse dashboard.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The analytics-backend gateway and its wire contract
//! - Generation-guarded fetch synchronization (last-issued-wins)
//! - Pure derived analytics: correlation classification, lag-scan optima,
//!   and portfolio allocation buckets
//!
//! The rendering layer consumes the [`controller::DashboardController`]
//! mutators plus its read-only committed view and never talks to the
//! network directly.

pub mod analytics;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod staleness;

pub use analytics::{
    aggregate_scan, bucketize, classify, AllocationBuckets, AnalyticsError, Classification,
    CorrelationLabel, DerivedResult, LagScan,
};
pub use config::{default_watchlist, GatewayConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use controller::DashboardController;
pub use domain::{
    CorrelationSample, DateRange, IsoDate, LagWindow, PortfolioAllocation, RiskProfile,
    SelectionState, SentimentLabel, Symbol, TimeSeriesPoint, YearValue,
};
pub use error::{FetchError, FetchErrorKind, ValidationError};
pub use gateway::{
    AnalyticsGateway, CompanyLagScanPayload, CompanySentimentPayload, EsgBundlePayload,
    FetchParams, LaggedEsgScanPayload, PortfolioInsightPayload, SentimentPoint,
    SentimentSummaryPayload, SourceKind, SourcePayload, StockPoint, StockSeriesPayload,
};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use staleness::{SourceState, StalenessGuard};
