//! Shader programs and the uniforms they read.
//!
//! - `basic` compiles the GLSL stages and links them into the one render
//!   pipeline every demo draws with
//! - `uniforms` holds the bind group layouts and the per-object/per-draw
//!   uniform buffers

pub mod basic;
pub mod uniforms;
