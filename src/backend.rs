//! In-memory persistence collaborator.
//!
//! Plays the external record store for `--auto-persist` replays: it applies
//! the engine's geometry and delete intents to its records and hands back the
//! flattened snapshot, which the session feeds into the engine.

use canvas::bridge::{self, BoxRecord, DeletePlan, EquationRecord, PersistedBoxRecord};
use canvas::doc::{OwnerId, PageBox};
use canvas::engine::{Action, EngineCore};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    paper_id: String,
    records: Vec<EquationRecord>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new(paper_id: impl Into<String>) -> Self {
        Self { paper_id: paper_id.into(), records: Vec::new() }
    }

    #[must_use]
    pub fn records(&self) -> &[EquationRecord] {
        &self.records
    }

    /// Replace every stored record.
    pub fn load(&mut self, records: Vec<EquationRecord>) {
        tracing::info!(records = records.len(), "backend records loaded");
        self.records = records;
    }

    /// Flattened snapshot of every stored box.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PersistedBoxRecord> {
        bridge::flatten_records(&self.records)
    }

    /// Store `boxes` as a new record. Returns its id, or `None` if there is nothing to save.
    pub fn save_new(&mut self, boxes: Vec<BoxRecord>, latex: String, notes: String) -> Option<OwnerId> {
        if boxes.is_empty() {
            tracing::info!("nothing to save");
            return None;
        }
        let eq_uid = Uuid::new_v4().to_string();
        tracing::info!(%eq_uid, boxes = boxes.len(), "record saved");
        self.records.push(EquationRecord { eq_uid: eq_uid.clone(), paper_id: self.paper_id.clone(), latex, notes, boxes });
        Some(eq_uid)
    }

    /// Overwrite the box list of one record. Returns false for an unknown record.
    pub fn update_boxes(&mut self, owner_id: &str, boxes: Vec<BoxRecord>) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.eq_uid == owner_id) else {
            tracing::warn!(%owner_id, "update for unknown record ignored");
            return false;
        };
        record.boxes = boxes;
        true
    }

    /// Overwrite the text of one record, keeping its boxes. Returns false for an unknown record.
    pub fn update_text(&mut self, owner_id: &str, latex: String, notes: String) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.eq_uid == owner_id) else {
            tracing::warn!(%owner_id, "text update for unknown record ignored");
            return false;
        };
        record.latex = latex;
        record.notes = notes;
        tracing::info!(%owner_id, "record text updated");
        true
    }

    /// Remove one box from a record, deleting the record with its last box.
    pub fn delete_box(&mut self, owner_id: &str, index: usize) -> bool {
        let Some(pos) = self.records.iter().position(|r| r.eq_uid == owner_id) else {
            tracing::warn!(%owner_id, "delete for unknown record ignored");
            return false;
        };
        match DeletePlan::for_box(&self.records[pos], index) {
            Some(DeletePlan::UpdateRecord(updated)) => self.records[pos] = updated,
            Some(DeletePlan::DeleteRecord(_)) => {
                self.records.remove(pos);
            }
            None => {
                tracing::warn!(%owner_id, index, "delete for unknown box ignored");
                return false;
            }
        }
        tracing::info!(%owner_id, index, "box deleted");
        true
    }

    /// Apply one engine intent. Returns true if the stored records changed.
    pub fn apply(&mut self, core: &EngineCore, action: &Action) -> bool {
        match action {
            Action::BoxGeometryChanged { id, .. } => match core.get_box(id).and_then(PageBox::owner_id) {
                Some(owner_id) => self.update_boxes(owner_id, core.record_boxes(owner_id)),
                None => false,
            },
            Action::BoxDeleteRequested { owner_id, index_in_owner, .. } => self.delete_box(owner_id, *index_in_owner),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
