use std::fmt::{Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::GatewayConfig;
use crate::domain::{
    CorrelationSample, DateRange, IsoDate, LagWindow, RiskProfile, SentimentLabel, Symbol,
    TimeSeriesPoint, YearValue,
};
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};

/// The seven data sources feeding the dashboard. Calls for different kinds
/// have no ordering relationship with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StockSeries,
    EsgBundle,
    LaggedEsgScan,
    SentimentSummary,
    CompanySentiment,
    CompanyLagScan,
    PortfolioInsight,
}

impl SourceKind {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::StockSeries,
        Self::EsgBundle,
        Self::LaggedEsgScan,
        Self::SentimentSummary,
        Self::CompanySentiment,
        Self::CompanyLagScan,
        Self::PortfolioInsight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StockSeries => "stock_series",
            Self::EsgBundle => "esg_bundle",
            Self::LaggedEsgScan => "lagged_esg_scan",
            Self::SentimentSummary => "sentiment_summary",
            Self::CompanySentiment => "company_sentiment",
            Self::CompanyLagScan => "company_lag_scan",
            Self::PortfolioInsight => "portfolio_insight",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one outbound call: the subset of the selection the source
/// depends on, captured at issue time.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchParams {
    StockSeries,
    EsgBundle,
    LaggedEsgScan {
        lag: LagWindow,
    },
    SentimentSummary {
        tickers: Vec<Symbol>,
    },
    CompanySentiment {
        ticker: Symbol,
    },
    CompanyLagScan {
        ticker: Symbol,
    },
    PortfolioInsight {
        risk_profile: RiskProfile,
        range: DateRange,
    },
}

impl FetchParams {
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::StockSeries => SourceKind::StockSeries,
            Self::EsgBundle => SourceKind::EsgBundle,
            Self::LaggedEsgScan { .. } => SourceKind::LaggedEsgScan,
            Self::SentimentSummary { .. } => SourceKind::SentimentSummary,
            Self::CompanySentiment { .. } => SourceKind::CompanySentiment,
            Self::CompanyLagScan { .. } => SourceKind::CompanyLagScan,
            Self::PortfolioInsight { .. } => SourceKind::PortfolioInsight,
        }
    }
}

/// One close-price observation of the full multi-symbol series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPoint {
    pub symbol: Symbol,
    pub date: IsoDate,
    pub close: f64,
}

/// Full stock series, sorted ascending by date (stable, so symbols keep
/// their response order within a date).
#[derive(Debug, Clone, PartialEq)]
pub struct StockSeriesPayload {
    pub points: Vec<StockPoint>,
}

/// ESG scores, yearly prices, and per-symbol ESG/price correlations.
#[derive(Debug, Clone, PartialEq)]
pub struct EsgBundlePayload {
    pub esg_scores: IndexMap<Symbol, Vec<YearValue>>,
    pub stock_prices: IndexMap<Symbol, Vec<YearValue>>,
    pub correlations: IndexMap<Symbol, f64>,
}

/// Per-symbol ESG/price correlations at one user-selected lag.
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedEsgScanPayload {
    pub lag: LagWindow,
    pub correlations: IndexMap<Symbol, Option<f64>>,
}

/// Qualitative sentiment per watched ticker plus the aggregate
/// sentiment/price correlation across the set.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSummaryPayload {
    pub sentiments: IndexMap<Symbol, SentimentLabel>,
    pub overall_correlation: Option<f64>,
}

/// One dated sentiment observation for the selected company.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPoint {
    pub date: IsoDate,
    pub score: f64,
    pub label: SentimentLabel,
}

/// Sentiment and price series for the selected company, with their
/// correlation and the price volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySentimentPayload {
    pub ticker: Symbol,
    pub sentiment_series: Vec<SentimentPoint>,
    pub price_series: Vec<TimeSeriesPoint>,
    pub correlation: Option<f64>,
    pub volatility: Option<f64>,
}

/// Sentiment/price correlation of the selected company at each lag offset.
/// The backend-reported optimum is carried for display; the locally derived
/// optimum is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyLagScanPayload {
    pub ticker: Symbol,
    pub correlations_by_lag: Vec<CorrelationSample>,
    pub reported_optimal_lag: Option<u32>,
    pub reported_optimal_correlation: Option<f64>,
}

/// Optimized portfolio weights and volatilities per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioInsightPayload {
    pub weights: IndexMap<Symbol, f64>,
    pub volatilities: IndexMap<Symbol, f64>,
    pub investment_growth: Option<f64>,
}

/// Validated payload of one resolved fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    StockSeries(StockSeriesPayload),
    EsgBundle(EsgBundlePayload),
    LaggedEsgScan(LaggedEsgScanPayload),
    SentimentSummary(SentimentSummaryPayload),
    CompanySentiment(CompanySentimentPayload),
    CompanyLagScan(CompanyLagScanPayload),
    PortfolioInsight(PortfolioInsightPayload),
}

impl SourcePayload {
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::StockSeries(_) => SourceKind::StockSeries,
            Self::EsgBundle(_) => SourceKind::EsgBundle,
            Self::LaggedEsgScan(_) => SourceKind::LaggedEsgScan,
            Self::SentimentSummary(_) => SourceKind::SentimentSummary,
            Self::CompanySentiment(_) => SourceKind::CompanySentiment,
            Self::CompanyLagScan(_) => SourceKind::CompanyLagScan,
            Self::PortfolioInsight(_) => SourceKind::PortfolioInsight,
        }
    }
}

// Wire DTOs. Field names are the backend contract and must not drift.

#[derive(Debug, Deserialize)]
struct StockPointDto {
    symbol: String,
    date: String,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct EsgBundleDto {
    esg_data: IndexMap<String, IndexMap<String, f64>>,
    stock_data: IndexMap<String, IndexMap<String, f64>>,
    correlations: IndexMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct LaggedScanDto {
    correlations: IndexMap<String, Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct TickerSentimentDto {
    sentiment: String,
}

#[derive(Debug, Deserialize)]
struct SentimentSummaryDto {
    sentiment_data: IndexMap<String, TickerSentimentDto>,
    #[serde(default)]
    overall_correlation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SentimentPointDto {
    date: String,
    #[serde(rename = "Sentiment_Score")]
    sentiment_score: f64,
    #[serde(rename = "Sentiment_Label")]
    sentiment_label: String,
}

#[derive(Debug, Deserialize)]
struct ClosePointDto {
    date: String,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct CompanySentimentDto {
    #[serde(rename = "sentimentData")]
    sentiment_data: Vec<SentimentPointDto>,
    #[serde(rename = "stockData")]
    stock_data: Vec<ClosePointDto>,
    #[serde(default)]
    correlation: Option<f64>,
    #[serde(default)]
    volatility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CompanyLagScanDto {
    correlations_by_lag: IndexMap<String, Option<f64>>,
    #[serde(default)]
    optimal_lag: Option<u32>,
    #[serde(default)]
    optimal_correlation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PortfolioInsightDto {
    weights: IndexMap<String, f64>,
    volatilities: IndexMap<String, f64>,
    #[serde(default)]
    investment_growth: Option<f64>,
}

/// Translates `(source kind, params)` into exactly one backend GET and
/// returns either a validated payload or a classified failure. No retries,
/// no caching; callers own supersession.
pub struct AnalyticsGateway {
    http: Arc<dyn HttpClient>,
    config: GatewayConfig,
}

impl AnalyticsGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: GatewayConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { http, config }
    }

    /// Issues the single network call for `params` and validates the
    /// response against the wire contract. Never panics past this boundary.
    pub async fn fetch(&self, params: &FetchParams) -> Result<SourcePayload, FetchError> {
        let kind = params.kind();
        let request =
            HttpRequest::get(self.request_url(params)).with_timeout_ms(self.config.timeout_ms);

        let response = self.http.execute(request).await.map_err(|err| {
            warn!(source = kind.as_str(), error = %err, "transport failure");
            FetchError::network(err.message())
        })?;

        if !response.is_success() {
            warn!(
                source = kind.as_str(),
                status = response.status,
                "backend returned non-success status"
            );
            return Err(FetchError::NonSuccessStatus {
                status: response.status,
            });
        }

        self.parse_payload(params, &response.body).map_err(|err| {
            warn!(source = kind.as_str(), error = %err, "payload failed validation");
            err
        })
    }

    fn request_url(&self, params: &FetchParams) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match params {
            FetchParams::StockSeries => format!("{base}/api/stock-data/"),
            FetchParams::EsgBundle => format!("{base}/api/get-esg-data/"),
            FetchParams::LaggedEsgScan { lag } => {
                format!("{base}/api/get-lagged-esg-correlation/?lag={lag}")
            }
            FetchParams::SentimentSummary { tickers } => {
                let joined = tickers
                    .iter()
                    .map(Symbol::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "{base}/api/process-sentiment/?tickers={}",
                    urlencoding::encode(&joined)
                )
            }
            FetchParams::CompanySentiment { ticker } => {
                format!(
                    "{base}/api/sentiment-data/?ticker={}",
                    urlencoding::encode(ticker.as_str())
                )
            }
            FetchParams::CompanyLagScan { ticker } => {
                format!(
                    "{base}/api/get-sentiment-correlation-with-lag/{}",
                    urlencoding::encode(ticker.as_str())
                )
            }
            FetchParams::PortfolioInsight { risk_profile, range } => {
                format!(
                    "{base}/api/portfolio-insights/?risk_profile={}&start_date={}&end_date={}",
                    risk_profile.as_str(),
                    range.start(),
                    range.end()
                )
            }
        }
    }

    fn parse_payload(&self, params: &FetchParams, body: &str) -> Result<SourcePayload, FetchError> {
        match params {
            FetchParams::StockSeries => {
                let rows: Vec<StockPointDto> = decode(body)?;
                let mut points = Vec::with_capacity(rows.len());
                for row in rows {
                    points.push(StockPoint {
                        symbol: parse_symbol(&row.symbol)?,
                        date: parse_date(&row.date)?,
                        close: row.close,
                    });
                }
                points.sort_by_key(|point| point.date);
                Ok(SourcePayload::StockSeries(StockSeriesPayload { points }))
            }
            FetchParams::EsgBundle => {
                let dto: EsgBundleDto = decode(body)?;
                let mut correlations = IndexMap::with_capacity(dto.correlations.len());
                for (symbol, value) in dto.correlations {
                    correlations.insert(parse_symbol(&symbol)?, validated_correlation(value)?);
                }
                Ok(SourcePayload::EsgBundle(EsgBundlePayload {
                    esg_scores: parse_year_map(dto.esg_data)?,
                    stock_prices: parse_year_map(dto.stock_data)?,
                    correlations,
                }))
            }
            FetchParams::LaggedEsgScan { lag } => {
                let dto: LaggedScanDto = decode(body)?;
                let mut correlations = IndexMap::with_capacity(dto.correlations.len());
                for (symbol, value) in dto.correlations {
                    let value = value.map(validated_correlation).transpose()?;
                    correlations.insert(parse_symbol(&symbol)?, value);
                }
                Ok(SourcePayload::LaggedEsgScan(LaggedEsgScanPayload {
                    lag: *lag,
                    correlations,
                }))
            }
            FetchParams::SentimentSummary { .. } => {
                let dto: SentimentSummaryDto = decode(body)?;
                let mut sentiments = IndexMap::with_capacity(dto.sentiment_data.len());
                for (symbol, entry) in dto.sentiment_data {
                    sentiments
                        .insert(parse_symbol(&symbol)?, SentimentLabel::parse(&entry.sentiment));
                }
                let overall_correlation = dto
                    .overall_correlation
                    .map(validated_correlation)
                    .transpose()?;
                Ok(SourcePayload::SentimentSummary(SentimentSummaryPayload {
                    sentiments,
                    overall_correlation,
                }))
            }
            FetchParams::CompanySentiment { ticker } => {
                let dto: CompanySentimentDto = decode(body)?;
                let mut sentiment_series = Vec::with_capacity(dto.sentiment_data.len());
                for row in dto.sentiment_data {
                    sentiment_series.push(SentimentPoint {
                        date: parse_date(&row.date)?,
                        score: row.sentiment_score,
                        label: SentimentLabel::parse(&row.sentiment_label),
                    });
                }
                sentiment_series.sort_by_key(|point| point.date);

                let mut price_series = Vec::with_capacity(dto.stock_data.len());
                for row in dto.stock_data {
                    price_series.push(TimeSeriesPoint {
                        date: parse_date(&row.date)?,
                        value: row.close,
                    });
                }
                price_series.sort_by_key(|point| point.date);

                Ok(SourcePayload::CompanySentiment(CompanySentimentPayload {
                    ticker: ticker.clone(),
                    sentiment_series,
                    price_series,
                    correlation: dto.correlation.map(validated_correlation).transpose()?,
                    volatility: dto.volatility,
                }))
            }
            FetchParams::CompanyLagScan { ticker } => {
                let dto: CompanyLagScanDto = decode(body)?;
                let mut correlations_by_lag = Vec::with_capacity(dto.correlations_by_lag.len());
                for (lag, value) in dto.correlations_by_lag {
                    let lag: u32 = lag.parse().map_err(|_| {
                        FetchError::malformed(format!("invalid lag key '{lag}'"))
                    })?;
                    let correlation = value.map(validated_correlation).transpose()?;
                    correlations_by_lag.push(CorrelationSample { lag, correlation });
                }
                Ok(SourcePayload::CompanyLagScan(CompanyLagScanPayload {
                    ticker: ticker.clone(),
                    correlations_by_lag,
                    reported_optimal_lag: dto.optimal_lag,
                    reported_optimal_correlation: dto
                        .optimal_correlation
                        .map(validated_correlation)
                        .transpose()?,
                }))
            }
            FetchParams::PortfolioInsight { .. } => {
                let dto: PortfolioInsightDto = decode(body)?;
                Ok(SourcePayload::PortfolioInsight(PortfolioInsightPayload {
                    weights: parse_symbol_map(dto.weights)?,
                    volatilities: parse_symbol_map(dto.volatilities)?,
                    investment_growth: dto.investment_growth,
                }))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body)
        .map_err(|err| FetchError::malformed(format!("payload did not match contract: {err}")))
}

fn parse_symbol(raw: &str) -> Result<Symbol, FetchError> {
    Symbol::parse(raw).map_err(|err| FetchError::malformed(format!("invalid symbol '{raw}': {err}")))
}

fn parse_date(raw: &str) -> Result<IsoDate, FetchError> {
    IsoDate::parse(raw).map_err(|err| FetchError::malformed(format!("invalid date '{raw}': {err}")))
}

fn validated_correlation(value: f64) -> Result<f64, FetchError> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(FetchError::malformed(format!(
            "correlation {value} outside [-1, 1]"
        )));
    }
    Ok(value)
}

fn parse_symbol_map(map: IndexMap<String, f64>) -> Result<IndexMap<Symbol, f64>, FetchError> {
    let mut parsed = IndexMap::with_capacity(map.len());
    for (symbol, value) in map {
        parsed.insert(parse_symbol(&symbol)?, value);
    }
    Ok(parsed)
}

fn parse_year_map(
    map: IndexMap<String, IndexMap<String, f64>>,
) -> Result<IndexMap<Symbol, Vec<YearValue>>, FetchError> {
    let mut parsed = IndexMap::with_capacity(map.len());
    for (symbol, years) in map {
        let mut series = Vec::with_capacity(years.len());
        for (year, value) in years {
            let year: u16 = year
                .parse()
                .map_err(|_| FetchError::malformed(format!("invalid year key '{year}'")))?;
            series.push(YearValue { year, value });
        }
        series.sort_by_key(|point| point.year);
        parsed.insert(parse_symbol(&symbol)?, series);
    }
    Ok(parsed)
}
