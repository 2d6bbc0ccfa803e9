use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::catalog::FolderRecord;
use super::catalog::InMemoryCatalog;
use super::request_builder::RequestRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    FolderCreated {
        folder: FolderRecord,
    },
    BatchSubmitted {
        batch_id: u64,
        records: Vec<RequestRecord>,
        reference: Option<String>,
    },
    BatchRejected {
        batch_id: u64,
        record_count: usize,
        reason: String,
    },
}

impl JournalEvent {
    fn batch_id(&self) -> Option<u64> {
        match self {
            Self::BatchSubmitted { batch_id, .. } | Self::BatchRejected { batch_id, .. } => {
                Some(*batch_id)
            }
            Self::FolderCreated { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub ts_ms: i64,
    #[serde(flatten)]
    pub event: JournalEvent,
}

/// Append-only JSONL log of folders created and batches handed off.
#[derive(Debug)]
pub struct RequestJournal {
    path: PathBuf,
    next_seq: u64,
}

impl RequestJournal {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let existing = load_records(path.as_path())?;
        let next_seq = existing
            .iter()
            .map(|record| record.seq)
            .max()
            .map_or(1, |seq| seq.saturating_add(1));
        Ok(Self { path, next_seq })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, event: JournalEvent) -> std::io::Result<u64> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        let record = JournalRecord {
            seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            event,
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| std::io::Error::other(format!("serialize: {err}")))?;
        append_line(self.path.as_path(), line.as_str())?;
        Ok(seq)
    }

    pub fn load(&self) -> std::io::Result<Vec<JournalRecord>> {
        load_records(self.path.as_path())
    }
}

/// Re-inserts journaled folders into `catalog` in `seq` order. Returns how
/// many were added; folders whose box is no longer in the catalog are
/// skipped.
pub fn replay_created_folders(records: &[JournalRecord], catalog: &mut InMemoryCatalog) -> usize {
    let mut sorted: Vec<&JournalRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.seq);

    let mut restored = 0;
    for record in sorted {
        let JournalEvent::FolderCreated { folder } = &record.event else {
            continue;
        };
        match catalog.restore_folder(folder.clone()) {
            Ok(true) => restored += 1,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(seq = record.seq, error = %err, "skipping journaled folder");
            }
        }
    }
    restored
}

/// First batch id not used by any journaled batch.
pub fn next_batch_id(records: &[JournalRecord]) -> u64 {
    records
        .iter()
        .filter_map(|record| record.event.batch_id())
        .max()
        .map_or(1, |id| id.saturating_add(1))
}

fn load_records(path: &Path) -> std::io::Result<Vec<JournalRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(error = %err, "skipping unreadable journal line"),
        }
    }
    Ok(records)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    Ok(())
}
