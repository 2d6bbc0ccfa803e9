use std::io;

use records_core::config::Config;
use records_core::next_batch_id;
use records_core::reduce;
use records_core::replay_created_folders;
use records_core::ActionError;
use records_core::InMemoryCatalog;
use records_core::JournalEvent;
use records_core::RecordsAction;
use records_core::RecordsEffect;
use records_core::RequestBatch;
use records_core::RequestJournal;
use records_core::RequestState;
use records_core::RuntimeAction;
use records_core::UserAction;
use records_submit::outcome_action;
use records_submit::DropDirSubmitter;
use records_submit::RequestSubmitter;
use records_submit::SimulatedSubmitter;
use records_submit::SubmissionReceipt;

/// Owns the core state and its collaborators, and carries out the effects
/// the reducer asks for.
pub struct Session {
    state: RequestState,
    catalog: InMemoryCatalog,
    journal: Option<RequestJournal>,
    submitter: Box<dyn RequestSubmitter>,
    last_receipt: Option<SubmissionReceipt>,
}

impl Session {
    pub fn new(
        state: RequestState,
        catalog: InMemoryCatalog,
        journal: Option<RequestJournal>,
        submitter: Box<dyn RequestSubmitter>,
    ) -> io::Result<Self> {
        let mut session = Self {
            state,
            catalog,
            journal,
            submitter,
            last_receipt: None,
        };
        session.replay_journal()?;
        Ok(session)
    }

    /// Builds a session from resolved configuration.
    pub fn from_config(
        config: &Config,
        catalog: InMemoryCatalog,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let journal = RequestJournal::open(&config.journal.path)?;
        let submitter: Box<dyn RequestSubmitter> = match &config.submission.drop_dir {
            Some(dir) => Box::new(DropDirSubmitter::new(dir)),
            None => Box::new(SimulatedSubmitter),
        };
        tracing::info!(
            submitter = submitter.label(),
            journal = %journal.path().display(),
            "session starting"
        );
        let state = RequestState::new(config.requester(), config.default_delivery());
        Ok(Self::new(state, catalog, Some(journal), submitter)?)
    }

    fn replay_journal(&mut self) -> io::Result<()> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };
        let records = journal.load()?;
        let restored = replay_created_folders(&records, &mut self.catalog);
        let next = next_batch_id(&records);
        if restored > 0 || next > 1 {
            tracing::info!(restored, next_batch_id = next, "journal replayed");
        }
        self.dispatch(RecordsAction::Runtime(RuntimeAction::SetNextBatchId(next)))?;
        Ok(())
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub fn submitter_label(&self) -> &'static str {
        self.submitter.label()
    }

    pub fn last_receipt(&self) -> Option<&SubmissionReceipt> {
        self.last_receipt.as_ref()
    }

    /// Runs `action` through the reducer and handles every effect before
    /// returning. Returns whether a redraw was requested.
    pub fn dispatch(&mut self, action: RecordsAction) -> io::Result<bool> {
        let mut pending = vec![action];
        let mut redraw = false;
        while let Some(action) = pending.pop() {
            for effect in reduce(&mut self.state, &mut self.catalog, action) {
                match effect {
                    RecordsEffect::RequestFrame => redraw = true,
                    RecordsEffect::FolderCreated(folder) => {
                        self.journal_event(JournalEvent::FolderCreated { folder })?;
                    }
                    RecordsEffect::SubmitBatch(batch) => {
                        let outcome = self.submit(&batch);
                        pending.push(RecordsAction::Runtime(outcome));
                    }
                }
            }
        }
        Ok(redraw)
    }

    /// Dispatches a user action and reports the error it left behind, if any.
    pub fn apply(&mut self, action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
        self.dispatch(RecordsAction::User(action))?;
        match self.state.error() {
            Some(ActionError { message, .. }) => Err(message.to_string().into()),
            None => Ok(()),
        }
    }

    /// Hands `batch` to the submitter. The receipt decides the outcome; a
    /// journal write failure after that is logged and does not change it.
    fn submit(&mut self, batch: &RequestBatch) -> RuntimeAction {
        let receipt = self.submitter.submit(batch);
        let event = if receipt.is_accepted() {
            JournalEvent::BatchSubmitted {
                batch_id: batch.batch_id,
                records: batch.records.clone(),
                reference: receipt.reference.clone(),
            }
        } else {
            JournalEvent::BatchRejected {
                batch_id: batch.batch_id,
                record_count: receipt.record_count,
                reason: receipt.message.clone(),
            }
        };
        if let Err(err) = self.journal_event(event) {
            tracing::warn!(
                batch_id = batch.batch_id,
                error = %err,
                "submission outcome not journaled"
            );
        }
        let outcome = outcome_action(&receipt);
        self.last_receipt = Some(receipt);
        outcome
    }

    fn journal_event(&mut self, event: JournalEvent) -> io::Result<()> {
        if let Some(journal) = self.journal.as_mut() {
            journal.append(event)?;
        }
        Ok(())
    }
}
