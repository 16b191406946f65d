//! In-memory record of completed engine runs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything captured from one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Short id, also embedded in the report file name
    pub id: String,
    pub config_path: String,
    /// Full command line, space separated
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the engine was terminated by a signal
    pub return_code: Option<i32>,
    pub report_path: String,
    /// Whether the engine actually wrote the HTML report
    pub report_written: bool,
}

impl TestRecord {
    pub fn succeeded(&self) -> bool {
        self.return_code == Some(0)
    }
}

/// Run results keyed by test id; lives as long as the server process
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: Arc<RwLock<HashMap<String, TestRecord>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: TestRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, id: &str) -> Option<TestRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Ids of all stored runs, sorted
    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
