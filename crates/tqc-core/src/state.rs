//! Per-request state machine and cancellation
//!
//! One request moves strictly forward through these states; transitions
//! happen only at declared suspension boundaries. Cancellation is a token
//! checked at the same boundaries, never a forced abort.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tqc_domain::RequestId;

/// Pipeline states for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Request accepted
    Received,
    /// Cache lookup in flight
    CacheCheck,
    /// Producer call in flight
    Producing,
    /// Quality gate call in flight
    Validating,
    /// Result admitted to the cache
    Admitted,
    /// Recovery cascade in flight
    Recovering,
    /// Terminal
    Returned,
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: RequestState) -> Vec<RequestState> {
    use RequestState::*;
    match from {
        Received => vec![CacheCheck],
        CacheCheck => vec![Producing, Returned],
        Producing => vec![Validating, Recovering, Returned],
        Validating => vec![Admitted, Recovering],
        Admitted => vec![Returned],
        Recovering => vec![Returned],
        Returned => vec![],
    }
}

/// Whether `from -> to` is a legal transition
#[must_use]
pub fn allowed(from: RequestState, to: RequestState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

/// Tracks one request's journey through the pipeline
#[derive(Debug)]
pub struct RequestJourney {
    request_id: RequestId,
    state: RequestState,
}

impl RequestJourney {
    /// Start a journey in `Received`
    #[must_use]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            state: RequestState::Received,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Advance to `to`
    ///
    /// The orchestrator only issues legal transitions; an illegal one is
    /// logged and still taken so a request can never wedge mid-pipeline.
    pub fn advance(&mut self, to: RequestState) {
        if !allowed(self.state, to) {
            tracing::warn!(
                request = %self.request_id,
                from = ?self.state,
                to = ?to,
                "illegal state transition requested"
            );
        } else {
            tracing::debug!(request = %self.request_id, from = ?self.state, to = ?to, "state transition");
        }
        self.state = to;
    }
}

/// Cooperative cancellation token checked at suspension boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a live token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        use RequestState::*;
        for (from, to) in [
            (Received, CacheCheck),
            (CacheCheck, Producing),
            (Producing, Validating),
            (Validating, Admitted),
            (Admitted, Returned),
        ] {
            assert!(allowed(from, to), "{from:?} -> {to:?}");
        }
    }

    #[test]
    fn recovery_paths_are_legal() {
        use RequestState::*;
        assert!(allowed(Producing, Recovering));
        assert!(allowed(Validating, Recovering));
        assert!(allowed(Recovering, Returned));
        assert!(allowed(CacheCheck, Returned));
    }

    #[test]
    fn returned_is_terminal() {
        assert!(allowed_transitions(RequestState::Returned).is_empty());
    }

    #[test]
    fn backwards_transitions_are_illegal() {
        use RequestState::*;
        assert!(!allowed(Validating, Producing));
        assert!(!allowed(Returned, CacheCheck));
        assert!(!allowed(Recovering, Validating));
    }

    #[test]
    fn journey_tracks_state() {
        let mut journey = RequestJourney::new(RequestId::new());
        assert_eq!(journey.state(), RequestState::Received);
        journey.advance(RequestState::CacheCheck);
        journey.advance(RequestState::Producing);
        assert_eq!(journey.state(), RequestState::Producing);
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
