//! Dashboard: the composition root of the analysis screen.
//!
//! Owns the intake, the selector and the browser for the current result, and
//! shares the dispatcher with in-flight analysis tasks. UI events are routed
//! through [`Dashboard::handle`]; the analysis itself runs as a detached
//! future so events keep flowing while the request is outstanding.

use std::future::Future;
use std::sync::Arc;

use pharmaguard_common::{DrugCode, Result, ValidationError};

use crate::browser::{ResultsBrowser, ResultsView};
use crate::dispatcher::{AnalysisDispatcher, RunOutcome};
use crate::intake::{FileIntake, GenomicFile, IntakeStatus};
use crate::selector::{CatalogEntry, MedicationSelector, PointerTarget};

/// Everything the screen can receive from the user.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SelectFile(GenomicFile),
    RemoveFile,
    StartUpload,
    UploadTick,
    ToggleDrug(DrugCode),
    ToggleSelector,
    PointerDown(PointerTarget),
    ToggleExpand(usize),
}

/// Snapshot of the screen for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub intake_status: IntakeStatus,
    pub intake_error: Option<&'static str>,
    pub upload_progress: u8,
    pub selector_summary: String,
    pub selector_open: bool,
    pub catalog: Vec<CatalogEntry>,
    pub submit_hint: &'static str,
    pub busy: bool,
    pub analysis_error: Option<&'static str>,
    pub results: Option<ResultsView>,
}

pub struct Dashboard {
    intake: FileIntake,
    selector: MedicationSelector,
    dispatcher: Arc<AnalysisDispatcher>,
    browser: Option<ResultsBrowser>,
}

impl Dashboard {
    pub fn new(dispatcher: Arc<AnalysisDispatcher>) -> Self {
        Self {
            intake: FileIntake::new().with_listener(dispatcher.clone()),
            selector: MedicationSelector::new(),
            dispatcher,
            browser: None,
        }
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn intake_mut(&mut self) -> &mut FileIntake {
        &mut self.intake
    }

    pub fn selector(&self) -> &MedicationSelector {
        &self.selector
    }

    pub fn dispatcher(&self) -> &Arc<AnalysisDispatcher> {
        &self.dispatcher
    }

    /// Browser over the dispatcher's current result. None while a request
    /// is in flight, even if [`Dashboard::sync_results`] has not run yet.
    pub fn browser(&self) -> Option<&ResultsBrowser> {
        let current = self.dispatcher.result()?;
        self.browser
            .as_ref()
            .filter(|b| Arc::ptr_eq(b.result(), &current))
    }

    /// Apply one UI event. Only file selection can fail, and its message is
    /// also kept on the intake for display.
    pub fn handle(&mut self, event: UiEvent) -> std::result::Result<(), ValidationError> {
        let mut outcome = Ok(());
        match event {
            UiEvent::SelectFile(file) => {
                outcome = self.intake.select_file(file).map(|_| ());
            }
            UiEvent::RemoveFile => self.intake.remove_file(),
            UiEvent::StartUpload => {
                self.intake.start_upload();
            }
            UiEvent::UploadTick => {
                self.intake.advance_upload();
            }
            UiEvent::ToggleDrug(code) => {
                self.selector.toggle_drug(code);
            }
            UiEvent::ToggleSelector => self.selector.toggle_open(),
            UiEvent::PointerDown(target) => {
                self.selector.on_pointer_down(&target);
            }
            UiEvent::ToggleExpand(index) => {
                if let Some(browser) = self.browser.as_mut() {
                    browser.toggle(index);
                }
            }
        }
        self.sync_results();
        outcome
    }

    /// Future running one analysis over a snapshot of the current file and
    /// selection. It does not borrow the dashboard, so events can still be
    /// handled while it is pending; call [`Dashboard::sync_results`] once it
    /// resolves.
    pub fn analysis_task(&self) -> impl Future<Output = Result<RunOutcome>> + Send + 'static {
        let dispatcher = self.dispatcher.clone();
        let file = self.intake.file().cloned();
        let drugs = self.selector.selection().clone();
        async move { dispatcher.run(file.as_ref(), &drugs).await }
    }

    /// Run an analysis to completion and pick up its result.
    pub async fn analyze(&mut self) -> Result<RunOutcome> {
        let outcome = self.analysis_task().await;
        self.sync_results();
        outcome
    }

    /// Align the browser with the dispatcher's stored result. A new result
    /// gets a fresh browser; no result drops it.
    pub fn sync_results(&mut self) {
        match self.dispatcher.result() {
            None => self.browser = None,
            Some(result) => {
                let stale = self
                    .browser
                    .as_ref()
                    .map_or(true, |b| !Arc::ptr_eq(b.result(), &result));
                if stale {
                    self.browser = Some(ResultsBrowser::new(result));
                }
            }
        }
    }

    pub fn view(&self) -> DashboardView {
        let file = self.intake.file();
        let busy = self.dispatcher.is_busy();
        DashboardView {
            file_name: file.map(|f| f.name().to_string()),
            file_size: file.map(GenomicFile::display_size),
            intake_status: self.intake.status(),
            intake_error: self.intake.error_message(),
            upload_progress: self.intake.progress(),
            selector_summary: self.selector.summary(),
            selector_open: self.selector.is_open(),
            catalog: self.selector.catalog(),
            submit_hint: self.selector.submit_hint(file.is_some(), busy),
            busy,
            analysis_error: self.dispatcher.error_message(),
            results: self.browser().map(ResultsBrowser::render),
        }
    }
}
