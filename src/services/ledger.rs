//! Record of submitted oracle requests, persisted as JSON.
//!
//! Keeps a re-run of the submit script from paying twice for the same
//! request hash.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy_primitives::{B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{OracleError, Result};
use crate::models::RequestHash;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub tx_hash: B256,
    pub block_number: u64,
    pub value: U256,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    submissions: BTreeMap<RequestHash, LedgerEntry>,
}

#[derive(Debug, Clone)]
pub struct SubmissionLedger {
    path: PathBuf,
}

impl SubmissionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn lookup(&self, request_hash: &RequestHash) -> Result<Option<LedgerEntry>> {
        Ok(self.read().await?.submissions.get(request_hash).cloned())
    }

    pub async fn record(&self, request_hash: RequestHash, entry: LedgerEntry) -> Result<()> {
        let mut ledger = self.read().await?;
        ledger.submissions.insert(request_hash, entry);
        self.persist(&ledger).await?;
        info!(%request_hash, path = %self.path.display(), "submission recorded");
        Ok(())
    }

    async fn read(&self) -> Result<LedgerFile> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LedgerFile::default())
            }
            Err(err) => return Err(self.io_error(err)),
        };
        serde_json::from_str(&content).map_err(|err| {
            OracleError::config(format!(
                "corrupt submission ledger {}: {err}",
                self.path.display()
            ))
        })
    }

    async fn persist(&self, ledger: &LedgerFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.io_error(err))?;
        }
        let payload = serde_json::to_string_pretty(ledger)
            .map_err(|err| OracleError::config(format!("cannot encode ledger: {err}")))?;
        tokio::fs::write(&self.path, payload)
            .await
            .map_err(|err| self.io_error(err))
    }

    fn io_error(&self, err: std::io::Error) -> OracleError {
        OracleError::config(format!(
            "submission ledger {} is unusable: {err}",
            self.path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LedgerEntry {
        LedgerEntry {
            tx_hash: B256::repeat_byte(0x22),
            block_number: 42,
            value: U256::from(12_500u64),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SubmissionLedger::new(dir.path().join("submissions.json"));
        assert_eq!(ledger.lookup(&RequestHash([1u8; 32])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn records_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("submissions.json");
        let hash = RequestHash([1u8; 32]);
        let recorded = entry();

        SubmissionLedger::new(&path).record(hash, recorded.clone()).await.unwrap();

        let reopened = SubmissionLedger::new(&path);
        assert_eq!(reopened.lookup(&hash).await.unwrap(), Some(recorded));
        assert_eq!(reopened.lookup(&RequestHash([2u8; 32])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        let err = SubmissionLedger::new(&path)
            .lookup(&RequestHash([1u8; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::Configuration(_)));
    }
}
