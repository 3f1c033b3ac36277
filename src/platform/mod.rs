//! Platform bindings
//!
//! The simulation itself is platform-free. This module adapts it to hosts:
//! - `web`: wasm-bindgen wrapper driven by the browser shell

#[cfg(target_arch = "wasm32")]
pub mod web;
