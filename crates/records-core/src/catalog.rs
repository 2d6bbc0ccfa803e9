//! Catalog collaborator and the read-only views the core derives from it.
//!
//! The catalog owns every [`BoxRecord`] and [`FolderRecord`]. The core only
//! reads through [`CatalogView`] and grows the folder list through
//! [`Catalog::append_folder`], which is also where folder identifiers are
//! assigned.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::error::RecordsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub u64);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub box_id: BoxId,
    pub department_id: DepartmentId,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub folder_id: FolderId,
    pub name: String,
    pub parent_box_id: BoxId,
    #[serde(default)]
    pub description: String,
}

/// A validated folder waiting for the catalog to assign its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub parent_box_id: BoxId,
    pub name: String,
    pub description: String,
}

pub trait Catalog {
    fn boxes(&self) -> &[BoxRecord];

    fn folders(&self) -> &[FolderRecord];

    /// Appends a folder under an existing box and returns it with the
    /// identifier the catalog chose. Must fail without mutation when the
    /// parent box is unknown.
    fn append_folder(&mut self, folder: NewFolder) -> Result<FolderRecord, RecordsError>;

    fn view(&self) -> CatalogView<'_> {
        CatalogView::new(self.boxes(), self.folders())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogView<'a> {
    boxes: &'a [BoxRecord],
    folders: &'a [FolderRecord],
}

impl<'a> CatalogView<'a> {
    pub fn new(boxes: &'a [BoxRecord], folders: &'a [FolderRecord]) -> Self {
        Self { boxes, folders }
    }

    pub fn boxes_in_department(
        &self,
        department_id: DepartmentId,
    ) -> impl Iterator<Item = &'a BoxRecord> + 'a {
        self.boxes
            .iter()
            .filter(move |record| record.department_id == department_id)
    }

    /// Folders stored in `box_id`; empty when no box is open.
    pub fn folders_in_box(
        &self,
        box_id: Option<BoxId>,
    ) -> impl Iterator<Item = &'a FolderRecord> + 'a {
        self.folders
            .iter()
            .filter(move |record| Some(record.parent_box_id) == box_id)
    }

    pub fn owner_of_box(&self, box_id: BoxId) -> Result<&'a BoxRecord, RecordsError> {
        self.box_by_id(box_id)
            .ok_or(RecordsError::BoxNotFound(box_id))
    }

    pub fn box_by_id(&self, box_id: BoxId) -> Option<&'a BoxRecord> {
        self.boxes.iter().find(|record| record.box_id == box_id)
    }

    pub fn folder_by_id(&self, folder_id: FolderId) -> Option<&'a FolderRecord> {
        self.folders
            .iter()
            .find(|record| record.folder_id == folder_id)
    }

    /// Distinct departments in the order they first appear in the box list.
    pub fn departments(&self) -> Vec<DepartmentId> {
        let mut seen = Vec::new();
        for record in self.boxes {
            if !seen.contains(&record.department_id) {
                seen.push(record.department_id);
            }
        }
        seen
    }
}

/// Arena-style catalog held in memory. Folder identifiers grow from the
/// highest one seen and are never handed out twice.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    boxes: Vec<BoxRecord>,
    folders: Vec<FolderRecord>,
    /// `None` once `u64::MAX` has been handed out.
    next_folder_id: Option<u64>,
}

impl InMemoryCatalog {
    pub fn new(boxes: Vec<BoxRecord>, folders: Vec<FolderRecord>) -> Self {
        let next_folder_id = folders
            .iter()
            .map(|folder| folder.folder_id.0)
            .max()
            .map_or(Some(1), |id| id.checked_add(1));
        Self {
            boxes,
            folders,
            next_folder_id,
        }
    }

    /// Re-inserts a folder created in an earlier session. Returns `false`
    /// when a folder with the same identifier is already present.
    pub fn restore_folder(&mut self, folder: FolderRecord) -> Result<bool, RecordsError> {
        if self
            .folders
            .iter()
            .any(|existing| existing.folder_id == folder.folder_id)
        {
            return Ok(false);
        }
        if !self
            .boxes
            .iter()
            .any(|record| record.box_id == folder.parent_box_id)
        {
            return Err(RecordsError::BoxNotFound(folder.parent_box_id));
        }
        let after = folder.folder_id.0.checked_add(1);
        self.next_folder_id = match (self.next_folder_id, after) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
        self.folders.push(folder);
        Ok(true)
    }
}

impl Catalog for InMemoryCatalog {
    fn boxes(&self) -> &[BoxRecord] {
        &self.boxes
    }

    fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    fn append_folder(&mut self, folder: NewFolder) -> Result<FolderRecord, RecordsError> {
        if !self
            .boxes
            .iter()
            .any(|record| record.box_id == folder.parent_box_id)
        {
            return Err(RecordsError::BoxNotFound(folder.parent_box_id));
        }
        let folder_id = self.next_folder_id.ok_or(RecordsError::FolderIdsExhausted)?;
        let record = FolderRecord {
            folder_id: FolderId(folder_id),
            name: folder.name,
            parent_box_id: folder.parent_box_id,
            description: folder.description,
        };
        self.next_folder_id = folder_id.checked_add(1);
        self.folders.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::ErrorKind;

    use super::*;

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
            description: format!("{name} papers"),
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(
            vec![
                boxed(500, 1, "Rack A"),
                boxed(501, 2, "Rack B"),
                boxed(502, 1, "Rack C"),
            ],
            vec![
                folder(700, 500, "Payroll"),
                folder(701, 501, "Leases"),
                folder(702, 500, "Audits"),
            ],
        )
    }

    #[test]
    fn boxes_in_department_keeps_catalog_order() {
        let catalog = catalog();
        let ids: Vec<u64> = catalog
            .view()
            .boxes_in_department(DepartmentId(1))
            .map(|record| record.box_id.0)
            .collect();
        assert_eq!(ids, vec![500, 502]);
    }

    #[test]
    fn folders_in_box_is_empty_without_open_box() {
        let catalog = catalog();
        let view = catalog.view();
        assert_eq!(view.folders_in_box(None).count(), 0);
        let names: Vec<&str> = view
            .folders_in_box(Some(BoxId(500)))
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, vec!["Payroll", "Audits"]);
    }

    #[test]
    fn owner_of_unknown_box_is_not_found() {
        let catalog = catalog();
        assert_eq!(
            catalog.view().owner_of_box(BoxId(999)),
            Err(RecordsError::BoxNotFound(BoxId(999)))
        );
        assert_eq!(
            catalog.view().owner_of_box(BoxId(501)).map(|b| b.location.as_str()),
            Ok("Rack B")
        );
    }

    #[test]
    fn departments_are_distinct_in_first_seen_order() {
        assert_eq!(
            catalog().view().departments(),
            vec![DepartmentId(1), DepartmentId(2)]
        );
    }

    #[test]
    fn append_assigns_fresh_ids() {
        let mut catalog = catalog();
        let first = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(502),
                name: "Minutes".to_string(),
                description: "Board minutes".to_string(),
            })
            .expect("append");
        let second = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(502),
                name: "Minutes".to_string(),
                description: "Board minutes".to_string(),
            })
            .expect("append");
        assert_eq!(first.folder_id, FolderId(703));
        assert_eq!(second.folder_id, FolderId(704));
        assert_eq!(catalog.folders().len(), 5);
    }

    #[test]
    fn append_under_unknown_box_does_not_mutate() {
        let mut catalog = catalog();
        let err = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(9),
                name: "x".to_string(),
                description: "y".to_string(),
            })
            .expect_err("unknown parent");
        assert_eq!(err, RecordsError::BoxNotFound(BoxId(9)));
        assert_eq!(catalog.folders().len(), 3);
    }

    #[test]
    fn restore_skips_known_ids_and_advances_next_id() {
        let mut catalog = catalog();
        assert_eq!(catalog.restore_folder(folder(700, 500, "Payroll")), Ok(false));
        assert_eq!(catalog.restore_folder(folder(900, 501, "Archive")), Ok(true));
        let next = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(500),
                name: "New".to_string(),
                description: "New".to_string(),
            })
            .expect("append");
        assert_eq!(next.folder_id, FolderId(901));
    }

    #[test]
    fn empty_catalog_starts_ids_at_one() {
        let mut catalog = InMemoryCatalog::new(vec![boxed(1, 1, "Shelf")], Vec::new());
        let record = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(1),
                name: "First".to_string(),
                description: "First".to_string(),
            })
            .expect("append");
        assert_eq!(record.folder_id, FolderId(1));
    }

    #[test]
    fn exhausted_folder_ids_fail_without_mutation() {
        let mut catalog = InMemoryCatalog::new(
            vec![boxed(1, 1, "Shelf")],
            vec![folder(u64::MAX, 1, "Last")],
        );
        let err = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(1),
                name: "Overflow".to_string(),
                description: "Overflow".to_string(),
            })
            .expect_err("ids exhausted");
        assert_eq!(err, RecordsError::FolderIdsExhausted);
        assert_eq!(err.kind(), ErrorKind::Catalog);
        assert_eq!(catalog.folders().len(), 1);
    }

    #[test]
    fn restoring_the_last_id_exhausts_the_counter() {
        let mut catalog = InMemoryCatalog::new(vec![boxed(1, 1, "Shelf")], Vec::new());
        assert_eq!(catalog.restore_folder(folder(u64::MAX, 1, "Last")), Ok(true));
        let err = catalog
            .append_folder(NewFolder {
                parent_box_id: BoxId(1),
                name: "Next".to_string(),
                description: "Next".to_string(),
            })
            .expect_err("ids exhausted");
        assert_eq!(err, RecordsError::FolderIdsExhausted);
        assert_eq!(catalog.folders().len(), 1);
    }
}
