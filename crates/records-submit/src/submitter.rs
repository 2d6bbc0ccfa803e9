use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use records_core::RequestBatch;
use records_core::RuntimeAction;

use crate::contracts::SubmissionReceipt;
use crate::contracts::SubmissionStatus;

pub trait RequestSubmitter {
    fn submit(&self, batch: &RequestBatch) -> SubmissionReceipt;

    fn label(&self) -> &'static str;
}

/// Accepts every batch without contacting a backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSubmitter;

impl RequestSubmitter for SimulatedSubmitter {
    fn submit(&self, batch: &RequestBatch) -> SubmissionReceipt {
        tracing::info!(batch_id = batch.batch_id, "simulated submission");
        accepted(
            batch,
            format!("sim-{}", batch.batch_id),
            "simulated submission accepted".to_string(),
        )
    }

    fn label(&self) -> &'static str {
        "simulated"
    }
}

/// Writes each batch as `batch-<id>.json` into a directory watched by the
/// request-processing backend.
#[derive(Debug, Clone)]
pub struct DropDirSubmitter {
    dir: PathBuf,
}

impl DropDirSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn batch_path(&self, batch_id: u64) -> PathBuf {
        self.dir.join(format!("batch-{batch_id}.json"))
    }

    fn write_batch(&self, batch: &RequestBatch) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.batch_path(batch.batch_id);
        if target.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            ));
        }
        let encoded = serde_json::to_vec_pretty(batch)
            .map_err(|err| std::io::Error::other(format!("serialize batch: {err}")))?;
        let staging = self.dir.join(format!(".batch-{}.json.tmp", batch.batch_id));
        let mut file = std::fs::File::create(&staging)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        std::fs::rename(&staging, &target)?;
        Ok(target)
    }
}

impl RequestSubmitter for DropDirSubmitter {
    fn submit(&self, batch: &RequestBatch) -> SubmissionReceipt {
        match self.write_batch(batch) {
            Ok(path) => {
                tracing::info!(
                    batch_id = batch.batch_id,
                    path = %path.display(),
                    "batch written to drop directory"
                );
                let reference = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                accepted(batch, reference, format!("written to {}", path.display()))
            }
            Err(err) => {
                tracing::warn!(batch_id = batch.batch_id, error = %err, "drop directory write failed");
                SubmissionReceipt {
                    batch_id: batch.batch_id,
                    status: SubmissionStatus::Rejected,
                    record_count: batch.records.len(),
                    reference: None,
                    message: err.to_string(),
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        "drop-dir"
    }
}

/// The runtime action that reports `receipt` back to the reducer.
pub fn outcome_action(receipt: &SubmissionReceipt) -> RuntimeAction {
    match receipt.status {
        SubmissionStatus::Accepted => RuntimeAction::SubmissionAccepted {
            batch_id: receipt.batch_id,
            reference: receipt.reference.clone(),
        },
        SubmissionStatus::Rejected => RuntimeAction::SubmissionRejected {
            batch_id: receipt.batch_id,
            reason: receipt.message.clone(),
        },
    }
}

fn accepted(batch: &RequestBatch, reference: String, message: String) -> SubmissionReceipt {
    SubmissionReceipt {
        batch_id: batch.batch_id,
        status: SubmissionStatus::Accepted,
        record_count: batch.records.len(),
        reference: Some(reference),
        message,
    }
}
