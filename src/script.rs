//! Replay scripts: one JSON host event per line.
//!
//! Blank lines and lines starting with `#` are skipped. Pointer events may
//! carry an explicit `target`; without one the engine classifies the pixel
//! itself, the way the browser wrapper does.

use canvas::bridge::{BridgeError, DetectionCandidate, EquationRecord, PersistedBoxRecord};
use canvas::calibration::PageReady;
use canvas::doc::BoxId;
use canvas::geometry::NodeFrame;
use canvas::input::{Button, Target};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid event: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    Open {
        page_count: usize,
    },
    PageReady(PageReady),
    Snapshot {
        entries: Vec<PersistedBoxRecord>,
    },
    Records {
        records: Vec<EquationRecord>,
    },
    SetPage {
        page: usize,
    },
    NextPage,
    PrevPage,
    ZoomIn,
    ZoomOut,
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        button: Button,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<Target>,
    },
    Key {
        key: String,
    },
    /// Final frame of a box node reported by a host that runs its own drag/transform.
    NodeFrame {
        id: BoxId,
        frame: NodeFrame,
    },
    /// Save every ephemeral box as one new record.
    Save {
        #[serde(default)]
        latex: String,
        #[serde(default)]
        notes: String,
    },
    Clear,
    Candidates {
        page: usize,
        candidates: Vec<DetectionCandidate>,
    },
}

/// Parse one script line. `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns [`ScriptError::Parse`] carrying the 1-based line number.
pub fn parse_line(line: usize, text: &str) -> Result<Option<ScriptOp>, ScriptError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some).map_err(|source| ScriptError::Parse { line, source })
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
