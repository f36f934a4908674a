//! Host side of the floor-plan editor: persistence, sessions, background
//! images, and configuration around the pure [`canvas`] engine.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `canvas` crate owns state and geometry and performs no I/O. This crate
//! wires it to storage. A [`session::CanvasSession`] holds one canvas for its
//! lifetime, hydrates it from a [`store::CanvasStore`], and writes it back
//! either on every change (local files) or on an explicit save (remote API).

pub mod background;
pub mod session;
pub mod settings;
pub mod store;

pub use canvas;
