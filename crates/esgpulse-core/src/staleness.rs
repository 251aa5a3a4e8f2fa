use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::analytics::{self, DerivedResult};
use crate::error::{FetchError, FetchErrorKind};
use crate::gateway::{AnalyticsGateway, FetchParams, SourceKind, SourcePayload};

/// Presentation-facing state of one data source. Only ever replaced
/// wholesale, so observers never see a torn value.
#[derive(Debug, Clone)]
pub enum SourceState {
    /// Nothing accepted yet; the rendering layer shows a placeholder.
    Pending,
    Ready(Arc<DerivedResult>),
    Errored(FetchErrorKind),
}

impl SourceState {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&Arc<DerivedResult>> {
        match self {
            Self::Ready(result) => Some(result),
            _ => None,
        }
    }
}

struct SourceSlot {
    generation: u64,
    committed: SourceState,
}

/// Prevents a slow, superseded fetch from overwriting state produced by a
/// newer selection.
///
/// Each source kind carries a monotonically increasing generation counter.
/// `issue` captures the next generation and starts the gateway call;
/// `commit` applies the eventual result only if no later issue has occurred
/// for that kind in the meantime. Last-issued-wins, regardless of which
/// network call completes first. Superseded calls are never interrupted;
/// their results are simply void on arrival.
pub struct StalenessGuard {
    gateway: Arc<AnalyticsGateway>,
    slots: [Mutex<SourceSlot>; SourceKind::COUNT],
}

impl StalenessGuard {
    pub fn new(gateway: Arc<AnalyticsGateway>) -> Self {
        Self {
            gateway,
            slots: std::array::from_fn(|_| {
                Mutex::new(SourceSlot {
                    generation: 0,
                    committed: SourceState::Pending,
                })
            }),
        }
    }

    fn slot(&self, kind: SourceKind) -> &Mutex<SourceSlot> {
        &self.slots[kind.index()]
    }

    /// Starts a fresh-generation fetch for the params' source kind and
    /// returns the captured generation. Must be called within a tokio
    /// runtime; the in-flight call commits itself on resolution.
    pub fn issue(self: &Arc<Self>, params: FetchParams) -> u64 {
        let kind = params.kind();
        let generation = {
            let mut slot = self.slot(kind).lock().unwrap();
            slot.generation += 1;
            slot.generation
        };
        debug!(source = kind.as_str(), generation, "issuing fetch");

        let guard = Arc::clone(self);
        tokio::spawn(async move {
            let result = guard.gateway.fetch(&params).await;
            guard.commit(kind, generation, result);
        });

        generation
    }

    /// Applies a resolved fetch if `generation` is still the latest issuance
    /// for `kind`; otherwise the result is discarded silently. Returns
    /// whether the result was committed.
    pub fn commit(
        &self,
        kind: SourceKind,
        generation: u64,
        result: Result<SourcePayload, FetchError>,
    ) -> bool {
        let mut slot = self.slot(kind).lock().unwrap();
        if generation != slot.generation {
            debug!(
                source = kind.as_str(),
                generation,
                latest = slot.generation,
                "discarding stale response"
            );
            return false;
        }

        // Derivation is pure and non-suspending, so holding the slot lock
        // here also keeps derivations for one source from interleaving.
        slot.committed = match result {
            Ok(payload) => match analytics::derive(payload) {
                Ok(derived) => SourceState::Ready(Arc::new(derived)),
                Err(err) => {
                    warn!(source = kind.as_str(), error = %err, "payload failed derivation");
                    SourceState::Errored(FetchErrorKind::MalformedPayload)
                }
            },
            Err(err) => SourceState::Errored(err.kind()),
        };
        true
    }

    /// The latest committed state for `kind`.
    pub fn committed(&self, kind: SourceKind) -> SourceState {
        self.slot(kind).lock().unwrap().committed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::domain::LagWindow;
    use crate::gateway::LaggedEsgScanPayload;
    use crate::http_client::NoopHttpClient;
    use indexmap::IndexMap;

    fn guard() -> Arc<StalenessGuard> {
        let gateway = AnalyticsGateway::with_http_client(
            GatewayConfig::default(),
            Arc::new(NoopHttpClient),
        );
        Arc::new(StalenessGuard::new(Arc::new(gateway)))
    }

    fn scan_payload() -> SourcePayload {
        SourcePayload::LaggedEsgScan(LaggedEsgScanPayload {
            lag: LagWindow::MIN,
            correlations: IndexMap::new(),
        })
    }

    #[test]
    fn commit_with_superseded_generation_is_a_no_op() {
        let guard = guard();
        // Nothing was issued, so any generation is stale.
        let committed = guard.commit(SourceKind::LaggedEsgScan, 1, Ok(scan_payload()));
        assert!(!committed);
        assert!(matches!(
            guard.committed(SourceKind::LaggedEsgScan),
            SourceState::Pending
        ));
    }

    #[test]
    fn failed_fetch_marks_the_source_errored() {
        let guard = guard();
        {
            let mut slot = guard.slot(SourceKind::PortfolioInsight).lock().unwrap();
            slot.generation = 1;
        }
        let committed = guard.commit(
            SourceKind::PortfolioInsight,
            1,
            Err(FetchError::NonSuccessStatus { status: 502 }),
        );
        assert!(committed);
        assert!(matches!(
            guard.committed(SourceKind::PortfolioInsight),
            SourceState::Errored(FetchErrorKind::NonSuccessStatus)
        ));
    }
}
