use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::catalog::BoxId;
use super::catalog::DepartmentId;
use super::catalog::FolderId;
use super::workflow::WorkflowEvent;
use super::workflow::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderField {
    Name,
    Description,
}

impl FolderField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordsError {
    #[error("folder {} must not be empty", join_fields(.missing))]
    ValidationFailed { missing: Vec<FolderField> },
    #[error("box {0} not found in catalog")]
    BoxNotFound(BoxId),
    #[error("folder {0} not found in catalog")]
    FolderNotFound(FolderId),
    #[error("folder {folder_id} references box {parent_box_id}, which is not in the catalog")]
    DanglingReference {
        folder_id: FolderId,
        parent_box_id: BoxId,
    },
    #[error("box {box_id} belongs to department {owner}, not the selected department")]
    BoxOutsideDepartment { box_id: BoxId, owner: DepartmentId },
    #[error("no folder identifiers left in catalog")]
    FolderIdsExhausted,
    #[error("no department selected")]
    NoDepartment,
    #[error("open a box before creating a folder")]
    NoOpenBox,
    #[error("cannot {} while {}", .event.label(), .from.label())]
    IllegalTransition {
        from: WorkflowState,
        event: WorkflowEvent,
    },
    #[error("{action} is not available while {}", .state.label())]
    NotPermitted {
        state: WorkflowState,
        action: &'static str,
    },
}

impl RecordsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed { .. } => ErrorKind::UserInput,
            Self::BoxNotFound(_)
            | Self::FolderNotFound(_)
            | Self::DanglingReference { .. }
            | Self::FolderIdsExhausted => ErrorKind::Catalog,
            Self::BoxOutsideDepartment { .. } | Self::NoDepartment => ErrorKind::Navigation,
            Self::NoOpenBox | Self::IllegalTransition { .. } | Self::NotPermitted { .. } => {
                ErrorKind::Workflow
            }
        }
    }

    /// Whether the user can fix this by editing input and retrying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Catalog)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserInput,
    Navigation,
    Workflow,
    Catalog,
    External,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::UserInput => "user-input",
            Self::Navigation => "navigation",
            Self::Workflow => "workflow",
            Self::Catalog => "catalog",
            Self::External => "external",
        }
    }
}

fn join_fields(fields: &[FolderField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(" and ")
}
