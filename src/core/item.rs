//! Item records
//!
//! The catalog file stores [`ItemRecord`]s only. An [`Item`] is a record
//! paired with its positional id, which is never persisted: the id of the
//! record at index `i` is `i + 1` at read time.

use serde::{Deserialize, Serialize};

/// Persisted shape of a catalog entry
///
/// Serialized as `{"name", "category", "image_name"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,

    pub category: String,

    /// Content-addressed image file name (`<sha256-hex>.jpg`), or empty
    /// when no image is associated.
    #[serde(default)]
    pub image_name: String,
}

impl ItemRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image_name: image_name.into(),
        }
    }

    /// Attach the positional id this record holds in the catalog
    pub fn with_id(self, id: u64) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
            image_name: self.image_name,
        }
    }
}

/// Catalog entry as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// 1-based position in the catalog
    pub id: u64,
    pub name: String,
    pub category: String,
    pub image_name: String,
}

impl Item {
    /// Drop the positional id, leaving the persisted shape
    pub fn into_record(self) -> ItemRecord {
        ItemRecord {
            name: self.name,
            category: self.category,
            image_name: self.image_name,
        }
    }
}

/// Assign positional ids to records in catalog order
pub(crate) fn number_records(records: Vec<ItemRecord>) -> Vec<Item> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| record.with_id(idx as u64 + 1))
        .collect()
}
