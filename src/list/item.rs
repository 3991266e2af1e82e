//! Todo items and the persisted snapshot format
//!
//! A snapshot is a JSON array of `{id, text, completed}` objects in list
//! order. There is no version field.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Item identifier: creation time in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub completed: bool,
}

impl Item {
    /// Create a fresh, not-yet-completed item
    pub fn new(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Reasons a stored snapshot is rejected
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate item id {0} in snapshot")]
    DuplicateId(ItemId),
}

/// Serialize the collection in its current order
pub fn encode_items(items: &[Item]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Parse a snapshot, rejecting anything that is not a list of items with
/// distinct ids
pub fn decode_items(json: &str) -> Result<Vec<Item>, SnapshotError> {
    let items: Vec<Item> = serde_json::from_str(json)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(item.id) {
            return Err(SnapshotError::DuplicateId(item.id));
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let items = vec![Item {
            id: ItemId(1_700_000_000_000),
            text: "Buy milk".to_string(),
            completed: true,
        }];
        let json = encode_items(&items).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1700000000000,"text":"Buy milk","completed":true}]"#
        );
    }

    #[test]
    fn test_decode_preserves_order() {
        let json = r#"[
            {"id": 3, "text": "c", "completed": false},
            {"id": 1, "text": "a", "completed": true},
            {"id": 2, "text": "b", "completed": false}
        ]"#;
        let items = decode_items(json).unwrap();
        let ids: Vec<i64> = items.iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(items[1].completed);
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_items("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_items("not json").is_err());
        assert!(decode_items(r#"{"id": 1}"#).is_err());
        assert!(decode_items(r#"[{"id": 1, "text": "a"}]"#).is_err());
        assert!(decode_items(r#"[{"id": "1", "text": "a", "completed": false}]"#).is_err());
        assert!(decode_items("null").is_err());
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let json = r#"[
            {"id": 7, "text": "a", "completed": false},
            {"id": 7, "text": "b", "completed": false}
        ]"#;
        assert!(matches!(
            decode_items(json),
            Err(SnapshotError::DuplicateId(ItemId(7)))
        ));
    }
}
