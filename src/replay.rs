//! Replay session: drives the engine from script events and writes every
//! emitted intent as a JSON line.

use std::io::{BufRead, Write};

use canvas::bridge::{self, BoxRecord};
use canvas::calibration::Point;
use canvas::config::EngineConfig;
use canvas::doc::{OwnerId, PageBox};
use canvas::engine::{Action, EngineCore};
use canvas::input::Key;
use serde::Serialize;

use crate::backend::MemoryBackend;
use crate::script::{self, ScriptError, ScriptOp};

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Emitted {
    Action(Action),
    /// Result of a save request: the saved boxes and the record they belong to.
    /// A new record has no id without a backend.
    Saved { saved: Vec<BoxRecord>, owner_id: Option<OwnerId> },
}

pub struct Session {
    pub core: EngineCore,
    pub backend: Option<MemoryBackend>,
}

impl Session {
    #[must_use]
    pub fn new(config: EngineConfig, backend: Option<MemoryBackend>) -> Self {
        Self { core: EngineCore::with_config(config), backend }
    }

    /// Run a whole script, writing one JSON line per emitted item.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable or invalid line, or the first write failure.
    pub fn run(&mut self, reader: impl BufRead, mut out: impl Write) -> Result<(), ScriptError> {
        for (idx, line) in reader.lines().enumerate() {
            let Some(op) = script::parse_line(idx + 1, &line?)? else {
                continue;
            };
            for item in self.apply(op)? {
                serde_json::to_writer(&mut out, &item).map_err(ScriptError::Encode)?;
                out.write_all(b"\n")?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Apply one event and collect what it emitted.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Bridge`] if a snapshot or record payload carries a non-finite coordinate.
    pub fn apply(&mut self, op: ScriptOp) -> Result<Vec<Emitted>, ScriptError> {
        tracing::debug!(?op, "event");
        let actions = match op {
            ScriptOp::Open { page_count } => self.core.open_document(page_count),
            ScriptOp::PageReady(ev) => self.core.page_ready(ev),
            ScriptOp::Snapshot { entries } => {
                bridge::validate_snapshot(&entries)?;
                self.core.replace_snapshot(entries)
            }
            ScriptOp::Records { records } => {
                let entries = bridge::flatten_records(&records);
                bridge::validate_snapshot(&entries)?;
                if let Some(backend) = &mut self.backend {
                    backend.load(records);
                }
                self.core.replace_snapshot(entries)
            }
            ScriptOp::SetPage { page } => self.core.set_page(page),
            ScriptOp::NextPage => self.core.next_page(),
            ScriptOp::PrevPage => self.core.prev_page(),
            ScriptOp::ZoomIn => self.core.zoom_in(),
            ScriptOp::ZoomOut => self.core.zoom_out(),
            ScriptOp::PointerDown { x, y, target, button } => {
                let pt = Point::new(x, y);
                let target = target.unwrap_or_else(|| self.core.classify(pt));
                self.core.on_pointer_down(pt, target, button)
            }
            ScriptOp::PointerMove { x, y } => self.core.on_pointer_move(Point::new(x, y)),
            ScriptOp::PointerUp { x, y } => self.core.on_pointer_up(Point::new(x, y)),
            ScriptOp::Click { x, y, target } => {
                let pt = Point::new(x, y);
                let target = target.unwrap_or_else(|| self.core.classify(pt));
                self.core.on_click(pt, target)
            }
            ScriptOp::Key { key } => self.core.on_key_down(&Key(key)),
            ScriptOp::NodeFrame { id, mut frame } => self.core.apply_node_frame(&id, &mut frame),
            ScriptOp::Save { latex, notes } => return Ok(self.save(latex, notes)),
            ScriptOp::Clear => self.core.clear_ephemeral(),
            ScriptOp::Candidates { page, candidates } => self.core.import_candidates(page, &candidates),
        };
        Ok(self.persist(actions))
    }

    fn persist(&mut self, actions: Vec<Action>) -> Vec<Emitted> {
        let mut changed = false;
        if let Some(backend) = &mut self.backend {
            for action in &actions {
                changed |= backend.apply(&self.core, action);
            }
        }
        let mut out: Vec<Emitted> = actions.into_iter().map(Emitted::Action).collect();
        if changed {
            self.sync(&mut out);
        }
        out
    }

    /// Save the editor text. With a persisted box selected, its record gets the
    /// new text and keeps its boxes; otherwise the ephemeral boxes become a new record.
    fn save(&mut self, latex: String, notes: String) -> Vec<Emitted> {
        let selected_owner = self.core.selected_box().and_then(PageBox::owner_id).map(str::to_owned);
        if let Some(owner_id) = selected_owner {
            return self.update_record(owner_id, latex, notes);
        }
        let commit = self.core.commit_ephemeral();
        let mut out: Vec<Emitted> = commit.actions.into_iter().map(Emitted::Action).collect();
        let owner_id = self.backend.as_mut().and_then(|b| b.save_new(commit.boxes.clone(), latex, notes));
        let saved = owner_id.is_some();
        out.push(Emitted::Saved { saved: commit.boxes, owner_id });
        if saved {
            self.sync(&mut out);
        }
        out
    }

    fn update_record(&mut self, owner_id: OwnerId, latex: String, notes: String) -> Vec<Emitted> {
        let updated = self.backend.as_mut().is_some_and(|b| b.update_text(&owner_id, latex, notes));
        let saved = match self.backend.as_ref().and_then(|b| b.records().iter().find(|r| r.eq_uid == owner_id)) {
            Some(record) => record.boxes.clone(),
            None => self.core.record_boxes(&owner_id),
        };
        let mut out = vec![Emitted::Saved { saved, owner_id: Some(owner_id) }];
        if updated {
            self.sync(&mut out);
        }
        out
    }

    /// Feed the backend's snapshot back into the engine.
    fn sync(&mut self, out: &mut Vec<Emitted>) {
        let Some(backend) = &self.backend else {
            return;
        };
        let snapshot = backend.snapshot();
        out.extend(self.core.replace_snapshot(snapshot).into_iter().map(Emitted::Action));
    }
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
