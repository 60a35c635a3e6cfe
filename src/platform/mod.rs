//! Platform hosts
//!
//! The engine itself is host-agnostic. The browser host (wasm32 only) binds it
//! to `setInterval`, a Canvas2D context and the page's DOM.

#[cfg(target_arch = "wasm32")]
pub mod web;
