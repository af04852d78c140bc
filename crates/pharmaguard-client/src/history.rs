//! Analysis history repository.
//!
//! History is an injected dependency, never read from ambient storage.
//! Records are listed oldest first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pharmaguard_common::{AnalysisResult, DrugCode, PharmaGuardError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub file_name: String,
    pub drugs: Vec<DrugCode>,
    pub result: AnalysisResult,
}

impl AnalysisRecord {
    pub fn new(
        user_id: Option<String>,
        file_name: impl Into<String>,
        drugs: Vec<DrugCode>,
        result: AnalysisResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            file_name: file_name.into(),
            drugs,
            result,
        }
    }
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a record at the end of the history.
    async fn append(&self, record: &AnalysisRecord) -> Result<()>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<AnalysisRecord>>;
}

/// Process-local history, mainly for tests and one-shot sessions.
#[derive(Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistory {
    async fn append(&self, record: &AnalysisRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalysisRecord>> {
        Ok(self.records.read().await.clone())
    }
}

/// History kept as one JSON array on disk.
pub struct JsonFileHistory {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<AnalysisRecord>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&content).map_err(|e| {
            PharmaGuardError::History(format!("corrupt history file {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl HistoryRepository for JsonFileHistory {
    async fn append(&self, record: &AnalysisRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        records.push(record.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, content).await?;

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "Appended analysis record"
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalysisRecord>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }
}
