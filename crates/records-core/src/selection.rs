use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::catalog::BoxId;
use super::catalog::BoxRecord;
use super::catalog::FolderId;
use super::catalog::FolderRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Box,
    Folder,
}

impl ItemType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Folder => "Folder",
        }
    }
}

/// Identity of a selected item. The variant is part of the key, so a box
/// and a folder sharing a numeric identifier never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SelectionKey {
    Box(BoxId),
    Folder(FolderId),
}

impl SelectionKey {
    pub fn item_type(self) -> ItemType {
        match self {
            Self::Box(_) => ItemType::Box,
            Self::Folder(_) => ItemType::Folder,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box(id) => write!(f, "box:{id}"),
            Self::Folder(id) => write!(f, "folder:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectionKeyError(String);

impl fmt::Display for ParseSelectionKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid selection `{}` (expected box:<id> or folder:<id>)",
            self.0
        )
    }
}

impl std::error::Error for ParseSelectionKeyError {}

impl FromStr for SelectionKey {
    type Err = ParseSelectionKeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSelectionKeyError(input.to_string());
        let (kind, id) = input.trim().split_once(':').ok_or_else(invalid)?;
        let id = id.trim().parse::<u64>().map_err(|_| invalid())?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "box" | "b" => Ok(Self::Box(BoxId(id))),
            "folder" | "f" => Ok(Self::Folder(FolderId(id))),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionEntry {
    Box(BoxRecord),
    Folder(FolderRecord),
}

impl SelectionEntry {
    /// The only key derivation used by [`SelectionSet`].
    pub fn key(&self) -> SelectionKey {
        match self {
            Self::Box(record) => SelectionKey::Box(record.box_id),
            Self::Folder(record) => SelectionKey::Folder(record.folder_id),
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.key().item_type()
    }

    pub fn label(&self) -> String {
        match self {
            Self::Box(record) => format!("Box {} ({})", record.box_id, record.location),
            Self::Folder(record) => format!(
                "Folder {} {} (box {})",
                record.folder_id, record.name, record.parent_box_id
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: IndexMap<SelectionKey, SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites by key. An overwritten entry keeps its original
    /// position. Returns `true` when the key was not present before.
    pub fn add(&mut self, entry: SelectionEntry) -> bool {
        self.entries.insert(entry.key(), entry).is_none()
    }

    pub fn remove(&mut self, key: &SelectionKey) -> Option<SelectionEntry> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &SelectionKey) -> Option<&SelectionEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = SelectionKey> + '_ {
        self.entries.keys().copied()
    }
}
