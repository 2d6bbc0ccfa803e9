use super::actions::RecordsAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::catalog::BoxId;
use super::catalog::Catalog;
use super::catalog::FolderRecord;
use super::error::RecordsError;
use super::folder_factory::create_folder;
use super::folder_factory::FolderDraft;
use super::request_builder::build_requests;
use super::request_builder::RequestBatch;
use super::selection::SelectionEntry;
use super::state::ActionError;
use super::state::RequestState;
use super::state::SubmittedBatch;
use super::workflow::next_state;
use super::workflow::TransitionGuard;
use super::workflow::WorkflowEvent;
use super::workflow::WorkflowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordsEffect {
    RequestFrame,
    /// A folder was appended to the catalog and should be journaled.
    FolderCreated(FolderRecord),
    /// Hand the batch to the submission collaborator, then dispatch
    /// [`RuntimeAction::SubmissionAccepted`] or
    /// [`RuntimeAction::SubmissionRejected`].
    SubmitBatch(RequestBatch),
}

pub fn reduce<C: Catalog + ?Sized>(
    state: &mut RequestState,
    catalog: &mut C,
    action: RecordsAction,
) -> Vec<RecordsEffect> {
    match action {
        RecordsAction::User(user) => reduce_user(state, catalog, user),
        RecordsAction::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            vec![RecordsEffect::RequestFrame]
        }
    }
}

fn reduce_user<C: Catalog + ?Sized>(
    state: &mut RequestState,
    catalog: &mut C,
    action: UserAction,
) -> Vec<RecordsEffect> {
    tracing::debug!(
        action = action.label(),
        workflow = state.workflow.label(),
        "dispatch"
    );
    state.error = None;

    if !action.scope().permits(state.workflow) {
        state.record_error(&RecordsError::NotPermitted {
            state: state.workflow,
            action: action.label(),
        });
        return vec![RecordsEffect::RequestFrame];
    }

    match apply_user(state, catalog, action) {
        Ok(mut effects) => {
            effects.push(RecordsEffect::RequestFrame);
            effects
        }
        Err(err) => {
            if !err.is_recoverable() {
                tracing::warn!(error = %err, "catalog inconsistency");
            }
            state.record_error(&err);
            vec![RecordsEffect::RequestFrame]
        }
    }
}

fn apply_user<C: Catalog + ?Sized>(
    state: &mut RequestState,
    catalog: &mut C,
    action: UserAction,
) -> Result<Vec<RecordsEffect>, RecordsError> {
    match action {
        UserAction::SelectDepartment(department_id) => {
            state.navigation.select_department(department_id);
        }
        UserAction::OpenBox(box_id) => open_box(state, catalog, box_id)?,
        UserAction::CloseBox => {
            state.navigation.selected_box = None;
        }
        UserAction::SelectBox(box_id) => {
            let record = catalog
                .view()
                .box_by_id(box_id)
                .cloned()
                .ok_or(RecordsError::BoxNotFound(box_id))?;
            state.selection.add(SelectionEntry::Box(record));
        }
        UserAction::SelectFolder(folder_id) => {
            let record = catalog
                .view()
                .folder_by_id(folder_id)
                .cloned()
                .ok_or(RecordsError::FolderNotFound(folder_id))?;
            state.selection.add(SelectionEntry::Folder(record));
        }
        UserAction::Deselect(key) => {
            state.selection.remove(&key);
        }
        UserAction::ClearSelection => state.selection.clear(),
        UserAction::OpenFolderCreation => {
            state.workflow = transition(state, WorkflowEvent::OpenFolderCreation)?;
            state.folder_draft = FolderDraft::default();
        }
        UserAction::SetFolderName(name) => state.folder_draft.name = name,
        UserAction::SetFolderDescription(description) => {
            state.folder_draft.description = description;
        }
        UserAction::CreateFolder => {
            let parent_box_id = state
                .navigation
                .selected_box
                .ok_or(RecordsError::NoOpenBox)?;
            let record = create_folder(
                catalog,
                parent_box_id,
                &state.folder_draft.name,
                &state.folder_draft.description,
            )?;
            state.workflow = transition(state, WorkflowEvent::FolderCreated)?;
            state.folder_draft = FolderDraft::default();
            return Ok(vec![RecordsEffect::FolderCreated(record)]);
        }
        UserAction::OpenSubmitConfirmation => {
            state.workflow = transition(state, WorkflowEvent::OpenSubmitConfirmation)?;
            state.delivery = state.default_delivery.clone();
        }
        UserAction::ToggleRequestType => {
            state.delivery.request_type = state.delivery.request_type.toggled();
        }
        UserAction::TogglePriority => {
            state.delivery.priority = state.delivery.priority.toggled();
        }
        UserAction::SetRequestType(request_type) => state.delivery.request_type = request_type,
        UserAction::SetPriority(priority) => state.delivery.priority = priority,
        UserAction::SetInstructions(instructions) => state.delivery.instructions = instructions,
        UserAction::ConfirmSubmit => {
            if let Some(batch) = &state.in_flight {
                tracing::debug!(batch_id = batch.batch_id, "submission already in flight");
                return Ok(Vec::new());
            }
            let records = build_requests(&state.selection, &state.delivery, &catalog.view())?;
            let batch = RequestBatch {
                batch_id: state.next_batch_id,
                records,
            };
            state.next_batch_id = state.next_batch_id.saturating_add(1);
            tracing::info!(
                batch_id = batch.batch_id,
                records = batch.records.len(),
                "request batch built"
            );
            state.in_flight = Some(batch.clone());
            return Ok(vec![RecordsEffect::SubmitBatch(batch)]);
        }
        UserAction::CloseOverlay => {
            if let Some(batch) = &state.in_flight {
                tracing::debug!(batch_id = batch.batch_id, "close ignored while submitting");
                return Ok(Vec::new());
            }
            let closing = state.workflow;
            state.workflow = transition(state, WorkflowEvent::Close)?;
            match closing {
                WorkflowState::CreatingFolder => state.folder_draft = FolderDraft::default(),
                WorkflowState::ConfirmingSubmit => {
                    state.delivery = state.default_delivery.clone();
                }
                WorkflowState::Idle => {}
            }
        }
        UserAction::DismissError => {}
    }
    Ok(Vec::new())
}

fn open_box<C: Catalog + ?Sized>(
    state: &mut RequestState,
    catalog: &C,
    box_id: BoxId,
) -> Result<(), RecordsError> {
    let department_id = state
        .navigation
        .selected_department
        .ok_or(RecordsError::NoDepartment)?;
    let view = catalog.view();
    let record = view.owner_of_box(box_id)?;
    if record.department_id != department_id {
        return Err(RecordsError::BoxOutsideDepartment {
            box_id,
            owner: record.department_id,
        });
    }
    state.navigation.selected_box = Some(box_id);
    Ok(())
}

fn transition(state: &RequestState, event: WorkflowEvent) -> Result<WorkflowState, RecordsError> {
    next_state(
        state.workflow,
        event,
        TransitionGuard {
            box_open: state.navigation.has_open_box(),
        },
    )
}

fn reduce_runtime(state: &mut RequestState, action: RuntimeAction) {
    match action {
        RuntimeAction::SubmissionAccepted {
            batch_id,
            reference,
        } => {
            let Some(batch) = take_in_flight(state, batch_id) else {
                return;
            };
            tracing::info!(batch_id, records = batch.records.len(), "batch accepted");
            state.selection.clear();
            state.delivery = state.default_delivery.clone();
            state.workflow = transition(state, WorkflowEvent::SubmissionCompleted)
                .unwrap_or(WorkflowState::Idle);
            state.last_batch = Some(SubmittedBatch { batch, reference });
        }
        RuntimeAction::SubmissionRejected { batch_id, reason } => {
            if take_in_flight(state, batch_id).is_none() {
                return;
            }
            tracing::warn!(batch_id, %reason, "batch rejected");
            state.error = Some(ActionError::external(format!(
                "request {batch_id} was rejected: {reason}"
            )));
        }
        RuntimeAction::SetNextBatchId(batch_id) => {
            state.next_batch_id = state.next_batch_id.max(batch_id);
        }
    }
}

fn take_in_flight(state: &mut RequestState, batch_id: u64) -> Option<RequestBatch> {
    match state.in_flight.as_ref().map(|batch| batch.batch_id) {
        Some(in_flight) if in_flight == batch_id => state.in_flight.take(),
        Some(in_flight) => {
            tracing::warn!(batch_id, in_flight, "outcome for a batch that is not in flight");
            None
        }
        None => {
            tracing::warn!(batch_id, "outcome with no batch in flight");
            None
        }
    }
}

#[cfg(test)]
mod tests;
