use super::catalog::BoxId;
use super::catalog::DepartmentId;
use super::catalog::FolderId;
use super::request_builder::Priority;
use super::request_builder::RequestType;
use super::selection::SelectionKey;
use super::workflow::WorkflowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordsAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SelectDepartment(DepartmentId),
    OpenBox(BoxId),
    CloseBox,
    SelectBox(BoxId),
    SelectFolder(FolderId),
    Deselect(SelectionKey),
    ClearSelection,
    OpenFolderCreation,
    SetFolderName(String),
    SetFolderDescription(String),
    CreateFolder,
    OpenSubmitConfirmation,
    ToggleRequestType,
    TogglePriority,
    SetRequestType(RequestType),
    SetPriority(Priority),
    SetInstructions(String),
    ConfirmSubmit,
    CloseOverlay,
    DismissError,
}

/// Outcomes reported back by the shell after it handled an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeAction {
    SubmissionAccepted {
        batch_id: u64,
        reference: Option<String>,
    },
    SubmissionRejected {
        batch_id: u64,
        reason: String,
    },
    SetNextBatchId(u64),
}

/// Which workflow state an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    Idle,
    FolderDraft,
    Delivery,
    /// Checked against the transition table instead.
    Transition,
    Any,
}

impl ActionScope {
    pub fn permits(self, workflow: WorkflowState) -> bool {
        match self {
            Self::Idle => workflow == WorkflowState::Idle,
            Self::FolderDraft => workflow == WorkflowState::CreatingFolder,
            Self::Delivery => workflow == WorkflowState::ConfirmingSubmit,
            Self::Transition | Self::Any => true,
        }
    }
}

impl UserAction {
    pub fn scope(&self) -> ActionScope {
        match self {
            Self::SelectDepartment(_)
            | Self::OpenBox(_)
            | Self::CloseBox
            | Self::SelectBox(_)
            | Self::SelectFolder(_)
            | Self::Deselect(_)
            | Self::ClearSelection => ActionScope::Idle,
            Self::SetFolderName(_) | Self::SetFolderDescription(_) | Self::CreateFolder => {
                ActionScope::FolderDraft
            }
            Self::ToggleRequestType
            | Self::TogglePriority
            | Self::SetRequestType(_)
            | Self::SetPriority(_)
            | Self::SetInstructions(_)
            | Self::ConfirmSubmit => ActionScope::Delivery,
            Self::OpenFolderCreation | Self::OpenSubmitConfirmation | Self::CloseOverlay => {
                ActionScope::Transition
            }
            Self::DismissError => ActionScope::Any,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectDepartment(_) => "select department",
            Self::OpenBox(_) => "open box",
            Self::CloseBox => "close box",
            Self::SelectBox(_) => "select box",
            Self::SelectFolder(_) => "select folder",
            Self::Deselect(_) => "deselect",
            Self::ClearSelection => "clear selection",
            Self::OpenFolderCreation => "open folder creation",
            Self::SetFolderName(_) => "edit folder name",
            Self::SetFolderDescription(_) => "edit folder description",
            Self::CreateFolder => "create folder",
            Self::OpenSubmitConfirmation => "open submit confirmation",
            Self::ToggleRequestType => "toggle request type",
            Self::TogglePriority => "toggle priority",
            Self::SetRequestType(_) => "set request type",
            Self::SetPriority(_) => "set priority",
            Self::SetInstructions(_) => "edit instructions",
            Self::ConfirmSubmit => "confirm submit",
            Self::CloseOverlay => "close",
            Self::DismissError => "dismiss error",
        }
    }
}
