//! shape-ngin
//!
//! Small real-time geometry demos (a rectangle, a triangle, a cube, several
//! cubes and a free-look camera scene) on top of wgpu, running natively and
//! in the browser. The shared boilerplate (context acquisition, shader
//! loading, program compile/link, mesh upload and the render loop) lives in
//! this crate once; each demo is a thin flow that builds its meshes, computes
//! its matrices and describes its draws.
//!
//! High-level modules
//! - `camera`: camera, key state, per-frame camera update and projection
//! - `context`: GPU and window context plus the application config
//! - `data_structures`: meshes, transforms, animated objects, depth texture
//! - `demos`: the demo flows
//! - `error`: the startup error type
//! - `flow`: the event loop and the flow trait
//! - `pipelines`: shader compilation, program linking and uniforms
//! - `resources`: shader loading from disk or over HTTP
//! - `render`: draw descriptions
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod demos;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use context::AppConfig;
pub use error::DemoError;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point: runs the demo called `name` in the configured canvas.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn run_demo(name: &str) -> Result<(), JsValue> {
    let flows = demos::by_name(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown demo {name}")))?;
    flow::run(flows, AppConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
