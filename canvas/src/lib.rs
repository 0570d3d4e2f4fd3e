//! Annotation overlay engine for marking regions on rendered document pages.
//!
//! This crate is compiled to WebAssembly and runs in the browser on top of a
//! rasterized page image. It owns the geometry of every box on the page:
//! calibrating between page pixels and document points, turning raw pointer
//! and key events into draw, drag, resize, selection and delete gestures, and
//! drawing the overlay. The host JavaScript layer wires DOM events to the
//! engine, rasterizes pages on [`engine::Action::PageRequested`], and persists
//! the other [`engine::Action`]s; persisted state comes back as a snapshot.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`calibration`] | Pixel/point scale and coordinate conversions |
//! | [`geometry`] | Canonical point-space boxes, screen projection, layout memo |
//! | [`doc`] | Box identity, ownership and the in-memory store |
//! | [`input`] | Pointer targets and the gesture state machine |
//! | [`hit`] | Handle and box hit-testing, click-through selection |
//! | [`bridge`] | Snapshot and record wire types for the persistence host |
//! | [`nav`] | Page index and rasterization zoom |
//! | [`render`] | Overlay rendering |
//! | [`config`] | Tunable thresholds |
//! | [`consts`] | Shared numeric defaults |

pub mod bridge;
pub mod calibration;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod nav;
pub mod render;
