//! Startup failures.
//!
//! Only two things can go wrong in a demo: the rendering context cannot be
//! acquired, or the shaders cannot be fetched, compiled or linked. Both are
//! fatal and stop the application before the first frame is drawn.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    /// No surface, adapter or device could be created for the window.
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// A shader source was reachable but the response was not OK.
    #[error("shader loading error: {path} responded with status {status}")]
    ShaderFetch { path: String, status: u16 },

    /// A shader source could not be read at all (IO or network failure).
    #[error("could not read shader {path}: {reason}")]
    ShaderRead { path: String, reason: String },

    #[error("{stage} shader failed to compile: {message}")]
    ShaderCompile {
        stage: &'static str,
        message: String,
    },

    #[error("program failed to link: {0}")]
    ProgramLink(String),
}

impl DemoError {
    /// True for failures of the shader stage (fetch, compile or link).
    pub fn is_shader_error(&self) -> bool {
        !matches!(self, DemoError::ContextUnavailable(_))
    }
}
