//! Sync bridge: wire types exchanged with the persistence collaborator.
//!
//! DESIGN
//! ======
//! The engine never talks to storage. Upward it emits
//! [`crate::engine::Action`] intents; downward it accepts a full snapshot of
//! persisted boxes, which always wins over any optimistic local edit. This
//! module holds the snapshot entry type, the record shape the external store
//! uses, and the small pure helpers a host needs to turn intents into record
//! writes (flattening records into a snapshot, planning a box deletion).

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use serde::{Deserialize, Serialize};

use crate::doc::{OwnerId, PageBox};
use crate::geometry::BBox;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("non-finite bbox for box {index_in_owner} of record {owner_id}")]
    NonFiniteBox { owner_id: OwnerId, index_in_owner: usize },
}

/// One entry of a persisted-box snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBoxRecord {
    pub page: usize,
    #[serde(alias = "bbox_pdf")]
    pub bbox: BBox,
    pub owner_id: OwnerId,
    pub index_in_owner: usize,
}

impl PersistedBoxRecord {
    #[must_use]
    pub fn into_page_box(self) -> PageBox {
        PageBox::persisted(self.page, self.bbox, self.owner_id, self.index_in_owner)
    }
}

/// A box as the external store keeps it: page and rectangle only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub page: usize,
    #[serde(alias = "bbox_pdf")]
    pub bbox: BBox,
}

impl From<&PageBox> for BoxRecord {
    fn from(b: &PageBox) -> Self {
        Self { page: b.page, bbox: b.bbox }
    }
}

/// An annotation record owning one or more boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationRecord {
    pub eq_uid: OwnerId,
    pub paper_id: String,
    #[serde(default)]
    pub latex: String,
    #[serde(default)]
    pub notes: String,
    pub boxes: Vec<BoxRecord>,
}

/// A region proposed by automatic detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    #[serde(alias = "bbox_pdf")]
    pub bbox: BBox,
    #[serde(default)]
    pub latex: String,
    #[serde(default)]
    pub score: f64,
}

/// Record write that removes one box from its record.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletePlan {
    /// The record keeps other boxes; store this updated record.
    UpdateRecord(EquationRecord),
    /// The box was the record's last one; delete the whole record.
    DeleteRecord(OwnerId),
}

impl DeletePlan {
    /// Plan the removal of box `index` from `record`. `None` if the index is out of range.
    #[must_use]
    pub fn for_box(record: &EquationRecord, index: usize) -> Option<Self> {
        if index >= record.boxes.len() {
            return None;
        }
        if record.boxes.len() == 1 {
            return Some(Self::DeleteRecord(record.eq_uid.clone()));
        }
        let mut updated = record.clone();
        updated.boxes.remove(index);
        Some(Self::UpdateRecord(updated))
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Flatten records into a persisted-box snapshot, keeping record order and
/// each record's box order.
#[must_use]
pub fn flatten_records(records: &[EquationRecord]) -> Vec<PersistedBoxRecord> {
    records
        .iter()
        .flat_map(|r| {
            r.boxes.iter().enumerate().map(|(index_in_owner, b)| PersistedBoxRecord {
                page: b.page,
                bbox: b.bbox,
                owner_id: r.eq_uid.clone(),
                index_in_owner,
            })
        })
        .collect()
}

/// Reject snapshot entries whose coordinates are not finite numbers.
///
/// # Errors
///
/// Returns `NonFiniteBox` for the first offending entry.
pub fn validate_snapshot(entries: &[PersistedBoxRecord]) -> Result<(), BridgeError> {
    match entries.iter().find(|e| !e.bbox.is_finite()) {
        Some(e) => Err(BridgeError::NonFiniteBox { owner_id: e.owner_id.clone(), index_in_owner: e.index_in_owner }),
        None => Ok(()),
    }
}

/// Decode a JSON array of snapshot entries.
///
/// # Errors
///
/// Returns `Json` if the payload does not parse, `NonFiniteBox` if an entry
/// carries a non-finite coordinate.
pub fn parse_snapshot(json: &str) -> Result<Vec<PersistedBoxRecord>, BridgeError> {
    let entries: Vec<PersistedBoxRecord> = serde_json::from_str(json)?;
    validate_snapshot(&entries)?;
    Ok(entries)
}

/// Decode a JSON array of records and flatten it into a snapshot.
///
/// # Errors
///
/// Same as [`parse_snapshot`].
pub fn parse_records(json: &str) -> Result<Vec<PersistedBoxRecord>, BridgeError> {
    let records: Vec<EquationRecord> = serde_json::from_str(json)?;
    let entries = flatten_records(&records);
    validate_snapshot(&entries)?;
    Ok(entries)
}
