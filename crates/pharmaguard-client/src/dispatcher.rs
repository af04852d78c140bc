//! Analysis dispatch: composes the request, performs the single POST, and
//! owns the busy flag, the user-visible error and the stored result.
//!
//! `busy` works as a mutex on the user-triggered action: a second `run`
//! while one is in flight is rejected without touching the network. It is
//! released by [`BusyGuard`] on every exit path, including the future being
//! dropped mid-request.
//!
//! File changes advance an epoch. A run that finishes after the epoch moved
//! drops its result instead of showing output for a file that is no longer
//! active. The request itself is never cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pharmaguard_common::{AnalysisResult, PharmaGuardError, Result};
use tracing::{debug, error, info, warn};

use crate::history::{AnalysisRecord, HistoryRepository};
use crate::intake::{FileChangeListener, GenomicFile};
use crate::normalizer::decode_body;
use crate::request::AnalysisRequest;
use crate::selector::DrugSelection;
use crate::transport::AnalysisTransport;

/// How a call to [`AnalysisDispatcher::run`] ended, failures aside.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No file or no drugs; nothing was sent.
    Skipped,
    /// Another run is in flight; nothing was sent.
    Rejected,
    /// Result stored and returned.
    Completed(Arc<AnalysisResult>),
    /// The active file changed while the request was in flight.
    Discarded,
}

#[derive(Debug, Default)]
struct DispatchState {
    busy: bool,
    error: Option<&'static str>,
    result: Option<Arc<AnalysisResult>>,
    epoch: u64,
}

/// Clears `busy` when dropped unless [`BusyGuard::finish`] already did.
struct BusyGuard<'a> {
    state: &'a Mutex<DispatchState>,
    armed: bool,
}

impl BusyGuard<'_> {
    fn finish(mut self, update: impl FnOnce(&mut DispatchState)) {
        let mut st = lock(self.state);
        update(&mut st);
        st.busy = false;
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).busy = false;
        }
    }
}

fn lock(state: &Mutex<DispatchState>) -> MutexGuard<'_, DispatchState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AnalysisDispatcher {
    transport: Arc<dyn AnalysisTransport>,
    history: Option<Arc<dyn HistoryRepository>>,
    user_id: Option<String>,
    state: Mutex<DispatchState>,
}

impl AnalysisDispatcher {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            history: None,
            user_id: None,
            state: Mutex::new(DispatchState::default()),
        }
    }

    /// Record every stored result in `history`, tagged with `user_id`.
    pub fn with_history(
        mut self,
        history: Arc<dyn HistoryRepository>,
        user_id: Option<String>,
    ) -> Self {
        self.history = Some(history);
        self.user_id = user_id;
        self
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.state).busy
    }

    pub fn error_message(&self) -> Option<&'static str> {
        lock(&self.state).error
    }

    /// Read-only handle on the stored result.
    pub fn result(&self) -> Option<Arc<AnalysisResult>> {
        lock(&self.state).result.clone()
    }

    /// Drop the stored result and invalidate any in-flight run's result.
    pub fn clear_result(&self) {
        let mut st = lock(&self.state);
        st.result = None;
        st.epoch += 1;
    }

    /// Run one analysis of `file` against `drugs`.
    ///
    /// Every failure surfaces the same generic message through
    /// [`AnalysisDispatcher::error_message`]; the returned error keeps the
    /// specific kind.
    pub async fn run(&self, file: Option<&GenomicFile>, drugs: &DrugSelection) -> Result<RunOutcome> {
        let Some(request) = AnalysisRequest::compose(file, drugs) else {
            debug!(file = file.is_some(), drugs = drugs.len(), "Analysis preconditions not met");
            return Ok(RunOutcome::Skipped);
        };

        let epoch = {
            let mut st = lock(&self.state);
            if st.busy {
                warn!("Analysis already running, rejecting new run");
                return Ok(RunOutcome::Rejected);
            }
            st.busy = true;
            st.error = None;
            st.result = None;
            st.epoch
        };
        let guard = BusyGuard { state: &self.state, armed: true };

        info!(
            file = request.file().name(),
            size_bytes = request.file().size_bytes(),
            drugs = request.drugs().len(),
            "Starting analysis"
        );

        match self.execute(&request).await {
            Ok(result) => {
                let result = Arc::new(result);
                let mut stored = false;
                guard.finish(|st| {
                    if st.epoch == epoch {
                        st.result = Some(result.clone());
                        stored = true;
                    }
                });
                if !stored {
                    warn!("Active file changed during analysis, discarding result");
                    return Ok(RunOutcome::Discarded);
                }
                info!(assessments = result.len(), "Analysis complete");
                self.record_history(&request, &result).await;
                Ok(RunOutcome::Completed(result))
            }
            Err(e) => {
                error!(error = %e, "Analysis failed");
                guard.finish(|st| st.error = Some(e.user_message()));
                Err(e)
            }
        }
    }

    async fn execute(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let response = self.transport.submit(request).await?;
        if !response.is_success() {
            return Err(PharmaGuardError::Request { status: response.status });
        }
        decode_body(&response.body)
    }

    async fn record_history(&self, request: &AnalysisRequest, result: &AnalysisResult) {
        let Some(history) = &self.history else { return };
        let record = AnalysisRecord::new(
            self.user_id.clone(),
            request.file().name(),
            request.drugs().to_vec(),
            result.clone(),
        );
        if let Err(e) = history.append(&record).await {
            warn!(error = %e, "Failed to record analysis history");
        }
    }
}

impl FileChangeListener for AnalysisDispatcher {
    fn file_changed(&self) {
        self.clear_result();
    }
}
