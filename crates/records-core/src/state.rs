use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::catalog::BoxId;
use super::catalog::CatalogView;
use super::catalog::DepartmentId;
use super::error::ErrorKind;
use super::error::RecordsError;
use super::folder_factory::FolderDraft;
use super::request_builder::DeliveryOptions;
use super::request_builder::RequestBatch;
use super::selection::SelectionEntry;
use super::selection::SelectionSet;
use super::workflow::WorkflowState;

/// Department and box currently being browsed. An open box always belongs to
/// the selected department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationContext {
    pub selected_department: Option<DepartmentId>,
    pub selected_box: Option<BoxId>,
}

impl NavigationContext {
    /// Switching to another department closes the open box.
    pub fn select_department(&mut self, department_id: DepartmentId) {
        if self.selected_department != Some(department_id) {
            self.selected_box = None;
        }
        self.selected_department = Some(department_id);
    }

    pub fn has_open_box(&self) -> bool {
        self.selected_box.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: Arc<str>,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn external(message: impl Into<Arc<str>>) -> Self {
        Self::new(ErrorKind::External, message)
    }
}

impl From<&RecordsError> for ActionError {
    fn from(err: &RecordsError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requester {
    pub name: String,
    /// Departments offered in the picker. Empty means every department in
    /// the catalog.
    pub departments: Vec<DepartmentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedBatch {
    pub batch: RequestBatch,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestState {
    pub(crate) requester: Requester,
    pub(crate) navigation: NavigationContext,
    pub(crate) selection: SelectionSet,
    pub(crate) workflow: WorkflowState,
    pub(crate) folder_draft: FolderDraft,
    pub(crate) delivery: DeliveryOptions,
    pub(crate) default_delivery: DeliveryOptions,
    pub(crate) in_flight: Option<RequestBatch>,
    pub(crate) last_batch: Option<SubmittedBatch>,
    pub(crate) next_batch_id: u64,
    pub(crate) error: Option<ActionError>,
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new(Requester::default(), DeliveryOptions::default())
    }
}

impl RequestState {
    pub fn new(requester: Requester, default_delivery: DeliveryOptions) -> Self {
        Self {
            requester,
            navigation: NavigationContext::default(),
            selection: SelectionSet::new(),
            workflow: WorkflowState::Idle,
            folder_draft: FolderDraft::default(),
            delivery: default_delivery.clone(),
            default_delivery,
            in_flight: None,
            last_batch: None,
            next_batch_id: 1,
            error: None,
        }
    }

    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    pub fn navigation(&self) -> NavigationContext {
        self.navigation
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn workflow(&self) -> WorkflowState {
        self.workflow
    }

    pub fn folder_draft(&self) -> &FolderDraft {
        &self.folder_draft
    }

    pub fn delivery(&self) -> &DeliveryOptions {
        &self.delivery
    }

    pub fn default_delivery(&self) -> &DeliveryOptions {
        &self.default_delivery
    }

    pub fn in_flight(&self) -> Option<&RequestBatch> {
        self.in_flight.as_ref()
    }

    pub fn last_batch(&self) -> Option<&SubmittedBatch> {
        self.last_batch.as_ref()
    }

    pub fn next_batch_id(&self) -> u64 {
        self.next_batch_id
    }

    pub fn error(&self) -> Option<&ActionError> {
        self.error.as_ref()
    }

    pub fn department_choices(&self, view: &CatalogView<'_>) -> Vec<DepartmentId> {
        if self.requester.departments.is_empty() {
            view.departments()
        } else {
            self.requester.departments.clone()
        }
    }

    pub(crate) fn record_error(&mut self, err: &RecordsError) {
        self.error = Some(ActionError::from(err));
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            requester: self.requester.name.clone(),
            navigation: self.navigation,
            workflow: self.workflow,
            selection: self.selection.entries().cloned().collect(),
            folder_draft: self.folder_draft.clone(),
            delivery: self.delivery.clone(),
            in_flight_batch_id: self.in_flight.as_ref().map(|batch| batch.batch_id),
            last_batch: self.last_batch.clone(),
            next_batch_id: self.next_batch_id,
            error: self.error.clone(),
        }
    }
}

/// Read-only copy of [`RequestState`] for printing and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub requester: String,
    pub navigation: NavigationContext,
    pub workflow: WorkflowState,
    pub selection: Vec<SelectionEntry>,
    pub folder_draft: FolderDraft,
    pub delivery: DeliveryOptions,
    pub in_flight_batch_id: Option<u64>,
    pub last_batch: Option<SubmittedBatch>,
    pub next_batch_id: u64,
    pub error: Option<ActionError>,
}
