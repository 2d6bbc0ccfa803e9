//! Turns the current selection into submission-ready request records.

use serde::Deserialize;
use serde::Serialize;

use super::catalog::BoxId;
use super::catalog::CatalogView;
use super::catalog::DepartmentId;
use super::error::RecordsError;
use super::selection::ItemType;
use super::selection::SelectionEntry;
use super::selection::SelectionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestType {
    #[default]
    #[serde(alias = "temporary")]
    Temporary,
    #[serde(alias = "permanent")]
    Permanent,
}

impl RequestType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Temporary => "Temporary",
            Self::Permanent => "Permanent",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Temporary => Self::Permanent,
            Self::Permanent => Self::Temporary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(alias = "standard")]
    Standard,
    #[serde(alias = "urgent")]
    Urgent,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Urgent => "Urgent",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Standard => Self::Urgent,
            Self::Urgent => Self::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryOptions {
    pub request_type: RequestType,
    pub priority: Priority,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub item_type: ItemType,
    pub item_identifier: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_box_id: Option<BoxId>,
    pub requesting_department_id: DepartmentId,
    pub location: String,
    pub request_type: RequestType,
    pub priority: Priority,
    pub request_status: RequestStatus,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBatch {
    pub batch_id: u64,
    pub records: Vec<RequestRecord>,
}

/// Builds one record per selected entry, in selection order. Fails as a
/// whole when any folder's parent box is missing from the catalog.
pub fn build_requests(
    selection: &SelectionSet,
    options: &DeliveryOptions,
    catalog: &CatalogView<'_>,
) -> Result<Vec<RequestRecord>, RecordsError> {
    selection
        .entries()
        .map(|entry| build_request(entry, options, catalog))
        .collect()
}

fn build_request(
    entry: &SelectionEntry,
    options: &DeliveryOptions,
    catalog: &CatalogView<'_>,
) -> Result<RequestRecord, RecordsError> {
    let (item_type, item_identifier, parent_box_id, requesting_department_id, location) =
        match entry {
            SelectionEntry::Folder(folder) => {
                let owner = catalog.owner_of_box(folder.parent_box_id).map_err(|_| {
                    RecordsError::DanglingReference {
                        folder_id: folder.folder_id,
                        parent_box_id: folder.parent_box_id,
                    }
                })?;
                (
                    ItemType::Folder,
                    folder.folder_id.0,
                    Some(folder.parent_box_id),
                    owner.department_id,
                    owner.location.clone(),
                )
            }
            SelectionEntry::Box(record) => (
                ItemType::Box,
                record.box_id.0,
                None,
                record.department_id,
                record.location.clone(),
            ),
        };

    Ok(RequestRecord {
        item_type,
        item_identifier,
        parent_box_id,
        requesting_department_id,
        location,
        request_type: options.request_type,
        priority: options.priority,
        request_status: RequestStatus::New,
        instructions: options.instructions.clone(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::BoxRecord;
    use crate::catalog::FolderId;
    use crate::catalog::FolderRecord;

    fn rack_a() -> BoxRecord {
        BoxRecord {
            box_id: BoxId(500),
            department_id: DepartmentId(1),
            location: "Rack A".to_string(),
        }
    }

    fn payroll() -> FolderRecord {
        FolderRecord {
            folder_id: FolderId(700),
            name: "Payroll".to_string(),
            parent_box_id: BoxId(500),
            description: "2019 payroll".to_string(),
        }
    }

    fn rush() -> DeliveryOptions {
        DeliveryOptions {
            request_type: RequestType::Permanent,
            priority: Priority::Urgent,
            instructions: "rush".to_string(),
        }
    }

    #[test]
    fn box_and_its_folder_become_two_records() {
        let boxes = vec![rack_a()];
        let folders = vec![payroll()];
        let view = CatalogView::new(&boxes, &folders);
        let mut selection = SelectionSet::new();
        selection.add(SelectionEntry::Box(rack_a()));
        selection.add(SelectionEntry::Folder(payroll()));

        let records = build_requests(&selection, &rush(), &view).expect("build");

        assert_eq!(
            records,
            vec![
                RequestRecord {
                    item_type: ItemType::Box,
                    item_identifier: 500,
                    parent_box_id: None,
                    requesting_department_id: DepartmentId(1),
                    location: "Rack A".to_string(),
                    request_type: RequestType::Permanent,
                    priority: Priority::Urgent,
                    request_status: RequestStatus::New,
                    instructions: "rush".to_string(),
                },
                RequestRecord {
                    item_type: ItemType::Folder,
                    item_identifier: 700,
                    parent_box_id: Some(BoxId(500)),
                    requesting_department_id: DepartmentId(1),
                    location: "Rack A".to_string(),
                    request_type: RequestType::Permanent,
                    priority: Priority::Urgent,
                    request_status: RequestStatus::New,
                    instructions: "rush".to_string(),
                },
            ]
        );
    }

    #[test]
    fn folder_location_comes_from_parent_box_not_selection_order() {
        let boxes = vec![rack_a()];
        let folders = vec![payroll()];
        let view = CatalogView::new(&boxes, &folders);
        let mut selection = SelectionSet::new();
        selection.add(SelectionEntry::Folder(payroll()));

        let records = build_requests(&selection, &DeliveryOptions::default(), &view)
            .expect("build");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "Rack A");
        assert_eq!(records[0].request_type, RequestType::Temporary);
        assert_eq!(records[0].priority, Priority::Standard);
    }

    #[test]
    fn dangling_folder_fails_the_whole_batch() {
        let boxes = vec![rack_a()];
        let folders = Vec::new();
        let view = CatalogView::new(&boxes, &folders);
        let mut selection = SelectionSet::new();
        selection.add(SelectionEntry::Box(rack_a()));
        selection.add(SelectionEntry::Folder(FolderRecord {
            parent_box_id: BoxId(404),
            ..payroll()
        }));

        assert_eq!(
            build_requests(&selection, &rush(), &view),
            Err(RecordsError::DanglingReference {
                folder_id: FolderId(700),
                parent_box_id: BoxId(404),
            })
        );
    }

    #[test]
    fn empty_selection_builds_empty_sequence() {
        let view = CatalogView::new(&[], &[]);
        let records = build_requests(&SelectionSet::new(), &rush(), &view).expect("build");
        assert!(records.is_empty());
    }

    #[test]
    fn output_length_matches_selection_size() {
        let boxes: Vec<BoxRecord> = (0..5)
            .map(|id| BoxRecord {
                box_id: BoxId(id),
                department_id: DepartmentId(id % 2),
                location: format!("Shelf {id}"),
            })
            .collect();
        let folders: Vec<FolderRecord> = (0..5)
            .map(|id| FolderRecord {
                folder_id: FolderId(id),
                name: format!("F{id}"),
                parent_box_id: BoxId(4 - id),
                description: String::new(),
            })
            .collect();
        let view = CatalogView::new(&boxes, &folders);
        let mut selection = SelectionSet::new();
        for record in &boxes {
            selection.add(SelectionEntry::Box(record.clone()));
        }
        for record in &folders {
            selection.add(SelectionEntry::Folder(record.clone()));
        }

        let records = build_requests(&selection, &rush(), &view).expect("build");
        assert_eq!(records.len(), selection.len());
        assert_eq!(records[5].requesting_department_id, DepartmentId(0));
        assert_eq!(records[5].location, "Shelf 4");
    }

    #[test]
    fn records_serialize_with_external_labels() {
        let boxes = vec![rack_a()];
        let folders = vec![payroll()];
        let view = CatalogView::new(&boxes, &folders);
        let mut selection = SelectionSet::new();
        selection.add(SelectionEntry::Box(rack_a()));
        let records = build_requests(&selection, &rush(), &view).expect("build");

        let json = serde_json::to_value(&records[0]).expect("json");
        assert_eq!(json["item_type"], "Box");
        assert_eq!(json["request_type"], "Permanent");
        assert_eq!(json["priority"], "Urgent");
        assert_eq!(json["request_status"], "New");
        assert!(json.get("parent_box_id").is_none());
    }
}
