use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::analytics::DerivedResult;
use crate::config::default_watchlist;
use crate::domain::{
    DateRange, IsoDate, LagWindow, RiskProfile, SelectionState, Symbol, TimeSeriesPoint,
};
use crate::gateway::{AnalyticsGateway, FetchParams, SourceKind};
use crate::staleness::{SourceState, StalenessGuard};

/// Single owner of the selection and of the committed per-source results;
/// the only component the rendering layer talks to.
///
/// Every setter validates or clamps its input, mutates the selection, and
/// issues fresh-generation fetches for exactly the sources whose parameters
/// depend on the changed field. The selection lock is held across issuance,
/// so two setters never interleave their side effects. Setters must be
/// called within a tokio runtime.
pub struct DashboardController {
    guard: Arc<StalenessGuard>,
    selection: Mutex<SelectionState>,
    watchlist: Vec<Symbol>,
}

impl DashboardController {
    pub fn new(gateway: AnalyticsGateway) -> Self {
        Self::with_watchlist(gateway, default_watchlist())
    }

    pub fn with_watchlist(gateway: AnalyticsGateway, watchlist: Vec<Symbol>) -> Self {
        Self {
            guard: Arc::new(StalenessGuard::new(Arc::new(gateway))),
            selection: Mutex::new(SelectionState::default()),
            watchlist,
        }
    }

    /// Snapshot of the current selection.
    pub fn selection(&self) -> SelectionState {
        self.selection.lock().unwrap().clone()
    }

    /// The latest committed state for one source. Replaced wholesale on
    /// commit; never partially mutated.
    pub fn committed(&self, kind: SourceKind) -> SourceState {
        self.guard.committed(kind)
    }

    /// Issues every source once. Called at dashboard start; also serves as
    /// the explicit full-recompute trigger.
    pub fn refresh_all(&self) {
        let selection = self.selection.lock().unwrap();
        self.guard.issue(FetchParams::StockSeries);
        self.guard.issue(FetchParams::EsgBundle);
        self.guard.issue(FetchParams::LaggedEsgScan { lag: selection.lag });
        self.guard.issue(FetchParams::SentimentSummary {
            tickers: self.watchlist.clone(),
        });
        if let Some(ticker) = selection.selected_company.clone() {
            self.issue_company_sources(ticker);
        }
        self.guard.issue(FetchParams::PortfolioInsight {
            risk_profile: selection.risk_profile,
            range: selection.date_range,
        });
    }

    pub fn set_company(&self, symbol: Symbol) {
        let mut selection = self.selection.lock().unwrap();
        debug!(company = %symbol, "selection changed");
        selection.selected_company = Some(symbol.clone());
        self.issue_company_sources(symbol);
    }

    /// Both bounds move together; an `end` before `start` is clamped up to
    /// `start` so the selection is never inconsistent.
    pub fn set_date_range(&self, start: IsoDate, end: IsoDate) {
        let mut selection = self.selection.lock().unwrap();
        let range = DateRange::new(start, end);
        debug!(start = %range.start(), end = %range.end(), "selection changed");
        selection.date_range = range;
        self.guard.issue(FetchParams::PortfolioInsight {
            risk_profile: selection.risk_profile,
            range,
        });
    }

    pub fn set_risk_profile(&self, profile: RiskProfile) {
        let mut selection = self.selection.lock().unwrap();
        debug!(risk_profile = %profile, "selection changed");
        selection.risk_profile = profile;
        self.guard.issue(FetchParams::PortfolioInsight {
            risk_profile: profile,
            range: selection.date_range,
        });
    }

    /// Out-of-domain lags are clamped into 1..=5.
    pub fn set_lag(&self, lag: u8) {
        let mut selection = self.selection.lock().unwrap();
        let lag = LagWindow::clamped(lag);
        debug!(lag = %lag, "selection changed");
        selection.lag = lag;
        self.guard.issue(FetchParams::LaggedEsgScan { lag });
    }

    /// Selects the first company of the committed stock series when nothing
    /// is selected yet. Returns the resulting selection, if any.
    pub fn select_default_company(&self) -> Option<Symbol> {
        let mut selection = self.selection.lock().unwrap();
        if let Some(current) = &selection.selected_company {
            return Some(current.clone());
        }

        let state = self.guard.committed(SourceKind::StockSeries);
        let result = state.as_ready()?;
        let DerivedResult::StockSeries { companies, .. } = result.as_ref() else {
            return None;
        };
        let first = companies.first()?.clone();

        debug!(company = %first, "defaulting to first listed company");
        selection.selected_company = Some(first.clone());
        self.issue_company_sources(first.clone());
        Some(first)
    }

    /// The committed stock series filtered to the selected company, as one
    /// close-price time series.
    pub fn company_series(&self) -> Vec<TimeSeriesPoint> {
        let company = {
            let selection = self.selection.lock().unwrap();
            match selection.selected_company.clone() {
                Some(company) => company,
                None => return Vec::new(),
            }
        };

        let state = self.guard.committed(SourceKind::StockSeries);
        let Some(result) = state.as_ready() else {
            return Vec::new();
        };
        let DerivedResult::StockSeries { payload, .. } = result.as_ref() else {
            return Vec::new();
        };

        payload
            .points
            .iter()
            .filter(|point| point.symbol == company)
            .map(|point| TimeSeriesPoint {
                date: point.date,
                value: point.close,
            })
            .collect()
    }

    fn issue_company_sources(&self, ticker: Symbol) {
        self.guard.issue(FetchParams::CompanySentiment {
            ticker: ticker.clone(),
        });
        self.guard.issue(FetchParams::CompanyLagScan { ticker });
    }
}
