//! In-memory probers for engine tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::config::EndpointTarget;
use crate::probe::{ProbeResult, Prober, TransportError};

pub(crate) fn target() -> EndpointTarget {
    EndpointTarget::build("example.com/health", None, false).unwrap()
}

/// Replays queued results, then repeats a fallback forever
pub(crate) struct ScriptedProber {
    script: Mutex<VecDeque<Result<ProbeResult, TransportError>>>,
    fallback: Result<ProbeResult, TransportError>,
    calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl ScriptedProber {
    pub(crate) fn always(status: u16) -> Self {
        Self::with_fallback(Ok(ProbeResult::new(status, "")))
    }

    pub(crate) fn with_fallback(fallback: Result<ProbeResult, TransportError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
        }
    }

    pub(crate) fn then(self, result: Result<ProbeResult, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _target: &EndpointTarget) -> Result<ProbeResult, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::task::yield_now().await;
        let next = self.script.lock().unwrap().pop_front();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Never answers
pub(crate) struct HangingProber {
    calls: AtomicU32,
}

impl HangingProber {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for HangingProber {
    async fn probe(&self, _target: &EndpointTarget) -> Result<ProbeResult, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
