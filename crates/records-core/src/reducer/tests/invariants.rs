use proptest::prelude::*;

use super::*;
use pretty_assertions::assert_eq;

fn any_action() -> impl Strategy<Value = UserAction> {
    prop_oneof![
        (1u64..4).prop_map(|id| UserAction::SelectDepartment(DepartmentId(id))),
        prop_oneof![Just(500u64), Just(501), Just(600), Just(999)]
            .prop_map(|id| UserAction::OpenBox(BoxId(id))),
        Just(UserAction::CloseBox),
        prop_oneof![Just(500u64), Just(600), Just(700)]
            .prop_map(|id| UserAction::SelectBox(BoxId(id))),
        prop_oneof![Just(700u64), Just(701), Just(800), Just(500)]
            .prop_map(|id| UserAction::SelectFolder(FolderId(id))),
        Just(UserAction::Deselect(SelectionKey::Folder(FolderId(700)))),
        Just(UserAction::ClearSelection),
        Just(UserAction::OpenFolderCreation),
        prop_oneof![Just(""), Just("  "), Just("Minutes")]
            .prop_map(|name| UserAction::SetFolderName(name.to_string())),
        prop_oneof![Just(""), Just("Board")]
            .prop_map(|text| UserAction::SetFolderDescription(text.to_string())),
        Just(UserAction::CreateFolder),
        Just(UserAction::OpenSubmitConfirmation),
        Just(UserAction::ToggleRequestType),
        Just(UserAction::TogglePriority),
        Just(UserAction::ConfirmSubmit),
        Just(UserAction::CloseOverlay),
        Just(UserAction::DismissError),
    ]
}

fn assert_consistent(state: &RequestState, catalog: &InMemoryCatalog) {
    let navigation = state.navigation();
    if let Some(box_id) = navigation.selected_box {
        let owner = catalog.view().owner_of_box(box_id).map(|record| record.department_id);
        assert_eq!(owner.ok(), navigation.selected_department);
    }
    if state.in_flight().is_some() {
        assert_eq!(state.workflow(), WorkflowState::ConfirmingSubmit);
    }
    if state.workflow() != WorkflowState::CreatingFolder {
        assert!(state.folder_draft().is_empty());
    }
    let keys: Vec<SelectionKey> = state.selection().keys().collect();
    let entry_keys: Vec<SelectionKey> =
        state.selection().entries().map(|entry| entry.key()).collect();
    assert_eq!(keys, entry_keys);
}

proptest! {
    #[test]
    fn random_sessions_keep_state_consistent(
        actions in proptest::collection::vec(any_action(), 0..48),
        accept in any::<bool>(),
    ) {
        let mut state = state();
        let mut catalog = catalog();
        for action in actions {
            let effects = user(&mut state, &mut catalog, action);
            prop_assert!(matches!(effects.last(), Some(RecordsEffect::RequestFrame)));
            for effect in effects {
                if let RecordsEffect::SubmitBatch(batch) = effect {
                    let outcome = if accept {
                        RuntimeAction::SubmissionAccepted {
                            batch_id: batch.batch_id,
                            reference: None,
                        }
                    } else {
                        RuntimeAction::SubmissionRejected {
                            batch_id: batch.batch_id,
                            reason: "offline".to_string(),
                        }
                    };
                    run_runtime(&mut state, &mut catalog, outcome);
                }
            }
            assert_consistent(&state, &catalog);
        }
    }

    #[test]
    fn rejected_actions_change_nothing_but_the_error(
        setup in proptest::collection::vec(any_action(), 0..24),
        action in any_action(),
    ) {
        let mut state = state();
        let mut catalog = catalog();
        for step in setup {
            user(&mut state, &mut catalog, step);
        }
        let before = state.snapshot();
        let folders_before = catalog.folders().len();

        user(&mut state, &mut catalog, action);

        if state.error().is_some() {
            let mut after = state.snapshot();
            after.error = before.error.clone();
            prop_assert_eq!(after, before);
            prop_assert_eq!(catalog.folders().len(), folders_before);
        }
    }
}

#[test]
fn failed_folder_creation_never_changes_workflow() {
    let mut state = state();
    let mut catalog = catalog();
    browse_rack_a(&mut state, &mut catalog);
    user(&mut state, &mut catalog, UserAction::OpenFolderCreation);

    for (name, description) in [("", ""), ("Minutes", ""), ("", "Board"), (" ", " ")] {
        user(&mut state, &mut catalog, UserAction::SetFolderName(name.to_string()));
        user(
            &mut state,
            &mut catalog,
            UserAction::SetFolderDescription(description.to_string()),
        );
        user(&mut state, &mut catalog, UserAction::CreateFolder);
        assert_eq!(state.workflow(), WorkflowState::CreatingFolder);
        assert_eq!(catalog.folders().len(), 3);
    }
}

#[test]
fn runtime_outcomes_always_request_a_frame() {
    let mut state = state();
    let mut catalog = catalog();
    run_runtime(
        &mut state,
        &mut catalog,
        RuntimeAction::SubmissionRejected {
            batch_id: 1,
            reason: "nothing in flight".to_string(),
        },
    );
    assert_eq!(state.error(), None);
}
