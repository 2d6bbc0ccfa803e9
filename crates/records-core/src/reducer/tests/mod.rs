use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use crate::actions::RecordsAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::catalog::BoxId;
pub(super) use crate::catalog::BoxRecord;
pub(super) use crate::catalog::Catalog;
pub(super) use crate::catalog::DepartmentId;
pub(super) use crate::catalog::FolderId;
pub(super) use crate::catalog::FolderRecord;
pub(super) use crate::catalog::InMemoryCatalog;
pub(super) use crate::error::ErrorKind;
pub(super) use crate::reducer::RecordsEffect;
pub(super) use crate::request_builder::DeliveryOptions;
pub(super) use crate::request_builder::Priority;
pub(super) use crate::request_builder::RequestBatch;
pub(super) use crate::request_builder::RequestType;
pub(super) use crate::selection::SelectionKey;
pub(super) use crate::state::RequestState;
pub(super) use crate::state::Requester;
pub(super) use crate::workflow::WorkflowState;

mod invariants;

fn state() -> RequestState {
    RequestState::new(
        Requester {
            name: "Ada".to_string(),
            departments: vec![DepartmentId(1), DepartmentId(2)],
        },
        DeliveryOptions::default(),
    )
}

fn boxed(id: u64, department: u64, location: &str) -> BoxRecord {
    BoxRecord {
        box_id: BoxId(id),
        department_id: DepartmentId(department),
        location: location.to_string(),
    }
}

fn folder(id: u64, parent: u64, name: &str) -> FolderRecord {
    FolderRecord {
        folder_id: FolderId(id),
        name: name.to_string(),
        parent_box_id: BoxId(parent),
        description: format!("{name} records"),
    }
}

/// Two departments, three boxes, three folders.
fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(
        vec![
            boxed(500, 1, "Rack A"),
            boxed(501, 1, "Rack B"),
            boxed(600, 2, "Basement"),
        ],
        vec![
            folder(700, 500, "Payroll"),
            folder(701, 500, "Audits"),
            folder(800, 600, "Leases"),
        ],
    )
}

fn user(
    state: &mut RequestState,
    catalog: &mut InMemoryCatalog,
    action: UserAction,
) -> Vec<RecordsEffect> {
    reduce(state, catalog, RecordsAction::User(action))
}

fn run_runtime(state: &mut RequestState, catalog: &mut InMemoryCatalog, action: RuntimeAction) {
    let effects = reduce(state, catalog, RecordsAction::Runtime(action));
    assert!(matches!(effects.as_slice(), [RecordsEffect::RequestFrame]));
}

/// Selects department 1 and opens box 500.
fn browse_rack_a(state: &mut RequestState, catalog: &mut InMemoryCatalog) {
    user(state, catalog, UserAction::SelectDepartment(DepartmentId(1)));
    user(state, catalog, UserAction::OpenBox(BoxId(500)));
    assert_eq!(state.error(), None);
}

/// Opens the submit overlay, confirms, and returns the emitted batch.
fn confirm(state: &mut RequestState, catalog: &mut InMemoryCatalog) -> RequestBatch {
    user(state, catalog, UserAction::OpenSubmitConfirmation);
    let effects = user(state, catalog, UserAction::ConfirmSubmit);
    match effects.as_slice() {
        [RecordsEffect::SubmitBatch(batch), RecordsEffect::RequestFrame] => batch.clone(),
        other => panic!("expected a batch, got {other:?}"),
    }
}

fn error_kind(state: &RequestState) -> Option<ErrorKind> {
    state.error().map(|err| err.kind)
}
