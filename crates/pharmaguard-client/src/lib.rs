//! pharmaguard-client — Pharmacogenomic analysis client.
//! Covers the analysis screen end to end:
//! - VCF intake and validation
//! - Medication selection with outside-click disclosure
//! - Multipart request composition and the HTTP transport
//! - Response normalisation
//! - Dispatch with busy/error/result ownership
//! - Results browsing and JSON export
//! - History persistence and the session route guard

pub mod intake;
pub mod selector;
pub mod request;
pub mod transport;
pub mod normalizer;
pub mod dispatcher;
pub mod browser;
pub mod history;
pub mod session;
pub mod dashboard;

pub use browser::{ResultsBrowser, ResultsView, REPORT_FILE_NAME};
pub use dashboard::{Dashboard, DashboardView, UiEvent};
pub use dispatcher::{AnalysisDispatcher, RunOutcome};
pub use history::{AnalysisRecord, HistoryRepository, InMemoryHistory, JsonFileHistory};
pub use intake::{FileIntake, GenomicFile, IntakeStatus};
pub use selector::{DrugSelection, MedicationSelector};
pub use session::{resolve_route, Route, RouteDecision, SessionProvider, StaticSession};
pub use transport::{AnalysisTransport, HttpAnalysisClient, TransportResponse};
