use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// One pass/fail outcome for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub batch_id: u64,
    pub status: SubmissionStatus,
    pub record_count: usize,
    pub reference: Option<String>,
    pub message: String,
}

impl SubmissionReceipt {
    pub fn is_accepted(&self) -> bool {
        self.status == SubmissionStatus::Accepted
    }
}
