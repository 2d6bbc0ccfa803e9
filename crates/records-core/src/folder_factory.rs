use serde::Deserialize;
use serde::Serialize;

use super::catalog::BoxId;
use super::catalog::Catalog;
use super::catalog::FolderRecord;
use super::catalog::NewFolder;
use super::error::FolderField;
use super::error::RecordsError;

/// Text typed into the folder-creation overlay so far.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderDraft {
    pub name: String,
    pub description: String,
}

impl FolderDraft {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }

    pub fn missing_fields(&self) -> Vec<FolderField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(FolderField::Name);
        }
        if self.description.trim().is_empty() {
            missing.push(FolderField::Description);
        }
        missing
    }
}

/// Validates the draft fields and appends the folder under `parent_box_id`.
/// The catalog assigns the identifier. Nothing is mutated on failure.
pub fn create_folder<C: Catalog + ?Sized>(
    catalog: &mut C,
    parent_box_id: BoxId,
    name: &str,
    description: &str,
) -> Result<FolderRecord, RecordsError> {
    let draft = FolderDraft {
        name: name.to_string(),
        description: description.to_string(),
    };
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(RecordsError::ValidationFailed { missing });
    }
    catalog.view().owner_of_box(parent_box_id)?;

    let record = catalog.append_folder(NewFolder {
        parent_box_id,
        name: name.trim().to_string(),
        description: description.trim().to_string(),
    })?;
    tracing::info!(
        folder_id = record.folder_id.0,
        parent_box_id = parent_box_id.0,
        "folder created"
    );
    Ok(record)
}
