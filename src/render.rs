//! Draw descriptions.
//!
//! Flows describe what they want drawn each frame with a [`Render`]. The
//! event loop flattens it into a list of [`Instanced`] draws and issues them
//! with the linked shader program.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum flows return from `on_render`
//! - [`Instanced<'a>`] is one (instanced) draw of a mesh with its uniforms
//!

use crate::data_structures::mesh::{DrawMesh, Mesh};

/// One draw call: a mesh, its model uniform, the per-draw scene uniform and
/// how many instances to emit.
///
/// Indexed meshes are drawn with `draw_indexed`, the others with `draw`.
#[derive(Debug, Clone, Copy)]
pub struct Instanced<'a> {
    pub mesh: &'a Mesh,
    pub model: &'a wgpu::BindGroup,
    pub scene: &'a wgpu::BindGroup,
    pub amount: u32,
}

/// Specifies what a flow draws this frame.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single object
/// - `Defaults(Vec<Instanced>)` renders several objects
///
#[derive(Debug)]
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
}

impl<'a> Render<'a> {
    /// Flattens `self` into its draws, in order.
    pub fn into_draws(self) -> Vec<Instanced<'a>> {
        match self {
            Render::None => Vec::new(),
            Render::Default(instanced) => vec![instanced],
            Render::Defaults(vec) => vec,
        }
    }

    pub fn draw_count(&self) -> usize {
        match self {
            Render::None => 0,
            Render::Default(_) => 1,
            Render::Defaults(vec) => vec.len(),
        }
    }
}

impl<'a> From<Instanced<'a>> for Render<'a> {
    fn from(instanced: Instanced<'a>) -> Self {
        Render::Default(instanced)
    }
}

impl<'a> From<Vec<Instanced<'a>>> for Render<'a> {
    fn from(vec: Vec<Instanced<'a>>) -> Self {
        Render::Defaults(vec)
    }
}

/// Issues `draws` with the program already bound to `render_pass`.
///
/// Bind group 0 (camera) must be set by the caller.
pub fn draw_all<'a, 'b>(render_pass: &mut wgpu::RenderPass<'a>, draws: Vec<Instanced<'b>>)
where
    'b: 'a,
{
    for instanced in draws {
        if instanced.amount == 0 {
            log::warn!("attempted to render {} with zero instances", instanced.mesh.name);
            continue;
        }
        render_pass.set_bind_group(1, instanced.model, &[]);
        render_pass.set_bind_group(2, instanced.scene, &[]);
        render_pass.draw_mesh_instanced(instanced.mesh, 0..instanced.amount);
    }
}
