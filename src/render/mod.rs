//! DOM rendering adapter
//!
//! The simulation core knows nothing about the page; this module turns the
//! core's event stream into positioned elements inside the game area. All of
//! it is wasm32-only.

mod dom;

pub use dom::{DomRenderer, TIER_EMOJI, tier_class};
