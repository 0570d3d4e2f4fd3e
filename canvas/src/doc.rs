//! Document model: page boxes, their ownership, and the in-memory store.
//!
//! Every box lives in one [`BoxStore`] keyed by [`BoxId`]. Ownership is a tag
//! on the box ([`Origin`]) rather than a separate collection type: ephemeral
//! boxes are drawn locally and owned by the engine, persisted boxes mirror a
//! rectangle of an external record and are only ever replaced wholesale by a
//! snapshot.
//!
//! The store keeps two ordered id lists so iteration follows list order:
//! persisted boxes in snapshot order, then ephemeral boxes in creation order.
//! A revision counter bumps on every mutation; the layout memo keys on it.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::BBox;

/// Unique identifier for a page box.
pub type BoxId = Uuid;

/// Identifier of the external record that owns persisted boxes.
pub type OwnerId = String;

/// Namespace for deriving persisted box ids from `(owner, index)`.
const PERSISTED_NAMESPACE: Uuid = Uuid::from_u128(0x6a8e_2c41_93d7_4f0b_b5e2_1c7d_0f93_a4e6);

/// Deterministic id of the `index`-th box of record `owner_id`.
///
/// Repeated snapshots of the same logical box map to the same id, which keeps
/// the selection stable across reloads.
#[must_use]
pub fn persisted_id(owner_id: &str, index: usize) -> BoxId {
    Uuid::new_v5(&PERSISTED_NAMESPACE, format!("{owner_id}/{index}").as_bytes())
}

/// Who owns a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Drawn locally, not yet saved.
    Ephemeral,
    /// Rectangle number `index_in_owner` of an external record.
    Persisted { owner_id: OwnerId, index_in_owner: usize },
}

/// A page-scoped rectangle in point space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub id: BoxId,
    /// Zero-based page index.
    pub page: usize,
    pub bbox: BBox,
    pub origin: Origin,
}

impl PageBox {
    /// A fresh ephemeral box with a random id.
    #[must_use]
    pub fn ephemeral(page: usize, bbox: BBox) -> Self {
        Self { id: Uuid::new_v4(), page, bbox, origin: Origin::Ephemeral }
    }

    /// A persisted box with its id derived from the owner and index.
    #[must_use]
    pub fn persisted(page: usize, bbox: BBox, owner_id: OwnerId, index_in_owner: usize) -> Self {
        Self { id: persisted_id(&owner_id, index_in_owner), page, bbox, origin: Origin::Persisted { owner_id, index_in_owner } }
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self.origin, Origin::Persisted { .. })
    }

    /// Owning record id for persisted boxes.
    #[must_use]
    pub fn owner_id(&self) -> Option<&str> {
        match &self.origin {
            Origin::Persisted { owner_id, .. } => Some(owner_id),
            Origin::Ephemeral => None,
        }
    }
}

/// In-memory store of page boxes.
#[derive(Debug, Default)]
pub struct BoxStore {
    boxes: HashMap<BoxId, PageBox>,
    persisted: Vec<BoxId>,
    ephemeral: Vec<BoxId>,
    revision: u64,
}

impl BoxStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &BoxId) -> Option<&PageBox> {
        self.boxes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &BoxId) -> bool {
        self.boxes.contains_key(id)
    }

    /// Add an ephemeral box at the end of the ephemeral list. Returns its id.
    pub fn insert_ephemeral(&mut self, page: usize, bbox: BBox) -> BoxId {
        let b = PageBox::ephemeral(page, bbox);
        let id = b.id;
        self.ephemeral.push(id);
        self.boxes.insert(id, b);
        self.bump();
        id
    }

    /// Overwrite the geometry of an existing box. Returns false if the box is gone.
    pub fn set_bbox(&mut self, id: &BoxId, bbox: BBox) -> bool {
        let Some(b) = self.boxes.get_mut(id) else {
            return false;
        };
        b.bbox = bbox;
        self.bump();
        true
    }

    /// Remove an ephemeral box. Persisted boxes are left alone; they only
    /// disappear through [`BoxStore::replace_persisted`].
    pub fn remove_ephemeral(&mut self, id: &BoxId) -> Option<PageBox> {
        if !self.boxes.get(id).is_some_and(|b| !b.is_persisted()) {
            return None;
        }
        self.ephemeral.retain(|e| e != id);
        self.bump();
        self.boxes.remove(id)
    }

    /// Take every ephemeral box out of the store, in creation order.
    pub fn drain_ephemeral(&mut self) -> Vec<PageBox> {
        if self.ephemeral.is_empty() {
            return Vec::new();
        }
        let ids = std::mem::take(&mut self.ephemeral);
        self.bump();
        ids.iter().filter_map(|id| self.boxes.remove(id)).collect()
    }

    /// Swap the full persisted list for `boxes`, in the given order.
    ///
    /// Ephemeral boxes are untouched. A repeated id keeps its first entry.
    pub fn replace_persisted(&mut self, boxes: Vec<PageBox>) {
        for id in self.persisted.drain(..) {
            self.boxes.remove(&id);
        }
        for b in boxes {
            if self.boxes.contains_key(&b.id) {
                tracing::warn!(id = %b.id, "duplicate persisted box in snapshot; keeping first");
                continue;
            }
            self.persisted.push(b.id);
            self.boxes.insert(b.id, b);
        }
        self.bump();
    }

    /// Boxes on `page`: persisted first, then ephemeral, each in list order.
    #[must_use]
    pub fn on_page(&self, page: usize) -> Vec<&PageBox> {
        self.persisted
            .iter()
            .chain(self.ephemeral.iter())
            .filter_map(|id| self.boxes.get(id))
            .filter(|b| b.page == page)
            .collect()
    }

    /// Ephemeral boxes on every page, in creation order.
    #[must_use]
    pub fn ephemeral_boxes(&self) -> Vec<&PageBox> {
        self.ephemeral.iter().filter_map(|id| self.boxes.get(id)).collect()
    }

    /// Persisted boxes of one record, ordered by their index in it.
    #[must_use]
    pub fn owner_boxes(&self, owner_id: &str) -> Vec<&PageBox> {
        let mut out: Vec<&PageBox> = self
            .persisted
            .iter()
            .filter_map(|id| self.boxes.get(id))
            .filter(|b| b.owner_id() == Some(owner_id))
            .collect();
        out.sort_by_key(|b| match b.origin {
            Origin::Persisted { index_in_owner, .. } => index_in_owner,
            Origin::Ephemeral => usize::MAX,
        });
        out
    }

    /// Monotonic mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of boxes currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if the store contains no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
