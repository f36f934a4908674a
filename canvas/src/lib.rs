//! Element-state engine for the floor-plan editor.
//!
//! This crate owns everything about a floor plan that does not touch I/O: the
//! placed elements (tables, doors, windows, separators), the canvas-wide
//! configuration, the pure reducer that applies [`engine::Action`]s, the
//! geometry behind drag/resize/rotate/scale, and the registry of named areas.
//! Persistence and image probing live in the host crate, which feeds results
//! back in as actions.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Element types, table presets, and the in-memory element store |
//! | [`engine`] | `Action`, `CanvasState`, the reducer, and the pointer-driven [`engine::Editor`] |
//! | [`geometry`] | Points, sizes, placement, drag clamp, resize-by-handle, rotate, scale |
//! | [`input`] | Gesture state tracked between pointer-down and pointer-up |
//! | [`hit`] | Hit-testing elements and resize handles |
//! | [`config`] | Canvas config, aspect ratio, background patches, corner labels |
//! | [`registry`] | Named collection of independent canvases ("areas") |
//! | [`consts`] | Shared numeric constants (minimum size, scale factors, etc.) |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod registry;
