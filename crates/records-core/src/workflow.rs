use serde::Deserialize;
use serde::Serialize;

use super::error::RecordsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    CreatingFolder,
    ConfirmingSubmit,
}

impl WorkflowState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CreatingFolder => "creating a folder",
            Self::ConfirmingSubmit => "confirming the request",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    OpenFolderCreation,
    OpenSubmitConfirmation,
    Close,
    FolderCreated,
    SubmissionCompleted,
}

impl WorkflowEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenFolderCreation => "open folder creation",
            Self::OpenSubmitConfirmation => "open submit confirmation",
            Self::Close => "close",
            Self::FolderCreated => "finish folder creation",
            Self::SubmissionCompleted => "finish submission",
        }
    }
}

/// Facts outside the state machine that guard a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionGuard {
    pub box_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTransition {
    pub from: WorkflowState,
    pub event: WorkflowEvent,
    pub to: WorkflowState,
}

const WORKFLOW_TRANSITIONS: [WorkflowTransition; 6] = [
    WorkflowTransition {
        from: WorkflowState::Idle,
        event: WorkflowEvent::OpenFolderCreation,
        to: WorkflowState::CreatingFolder,
    },
    WorkflowTransition {
        from: WorkflowState::Idle,
        event: WorkflowEvent::OpenSubmitConfirmation,
        to: WorkflowState::ConfirmingSubmit,
    },
    WorkflowTransition {
        from: WorkflowState::CreatingFolder,
        event: WorkflowEvent::Close,
        to: WorkflowState::Idle,
    },
    WorkflowTransition {
        from: WorkflowState::CreatingFolder,
        event: WorkflowEvent::FolderCreated,
        to: WorkflowState::Idle,
    },
    WorkflowTransition {
        from: WorkflowState::ConfirmingSubmit,
        event: WorkflowEvent::Close,
        to: WorkflowState::Idle,
    },
    WorkflowTransition {
        from: WorkflowState::ConfirmingSubmit,
        event: WorkflowEvent::SubmissionCompleted,
        to: WorkflowState::Idle,
    },
];

pub fn workflow_transitions() -> &'static [WorkflowTransition] {
    &WORKFLOW_TRANSITIONS
}

pub fn allowed_events(from: WorkflowState) -> Vec<WorkflowEvent> {
    WORKFLOW_TRANSITIONS
        .iter()
        .filter(|transition| transition.from == from)
        .map(|transition| transition.event)
        .collect()
}

pub fn next_state(
    from: WorkflowState,
    event: WorkflowEvent,
    guard: TransitionGuard,
) -> Result<WorkflowState, RecordsError> {
    let Some(transition) = WORKFLOW_TRANSITIONS
        .iter()
        .find(|transition| transition.from == from && transition.event == event)
    else {
        return Err(RecordsError::IllegalTransition { from, event });
    };

    if event == WorkflowEvent::OpenFolderCreation && !guard.box_open {
        return Err(RecordsError::NoOpenBox);
    }

    Ok(transition.to)
}
