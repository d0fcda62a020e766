//! Animated mesh objects.
//!
//! A [`SceneObject`] is the mesh-object record every demo is built from: its
//! GPU mesh, a model transform with the uniform buffer backing it, and how
//! many instances one draw produces.

use cgmath::Rad;

use crate::{
    data_structures::{
        mesh::{Mesh, MeshData},
        transform::{ModelUniform, Transform},
    },
    pipelines::uniforms::UniformBinding,
    render::Instanced,
};

/// Fixed tilt around the x axis applied on top of the spin.
pub const TILT: Rad<f32> = Rad(0.25);
pub const ANGLE_STEP: f32 = 0.01;
pub const TIME_STEP: f32 = 0.02;
pub const START_TIME: f32 = 0.1;

/// Accumulated spin angle and animation time, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub angle: f32,
    pub time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            time: START_TIME,
        }
    }

    pub fn tick(&mut self) {
        self.angle += ANGLE_STEP;
        self.time += TIME_STEP;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SceneObject {
    pub mesh: Mesh,
    pub position: cgmath::Vector3<f32>,
    pub transform: Transform,
    pub model: UniformBinding<ModelUniform>,
    pub instances: u32,
}

impl SceneObject {
    pub fn new(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        data: &MeshData,
        name: &str,
        position: cgmath::Vector3<f32>,
        instances: u32,
    ) -> Self {
        let transform = Transform::spinning(position, Rad(0.0), TILT);
        let model = UniformBinding::new(device, model_layout, &transform.to_raw(), name);
        Self {
            mesh: Mesh::new(device, data, name),
            position,
            transform,
            model,
            instances,
        }
    }

    /// Recomputes the model transform for the accumulated spin `angle`.
    pub fn advance(&mut self, angle: f32) {
        self.transform = Transform::spinning(self.position, Rad(angle), TILT);
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        self.model.write(queue, &self.transform.to_raw());
    }

    /// Draw description for this object with the per-draw `scene` bind group.
    pub fn instanced<'a>(&'a self, scene: &'a wgpu::BindGroup) -> Instanced<'a> {
        Instanced {
            mesh: &self.mesh,
            model: &self.model.bind_group,
            scene,
            amount: self.instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_rest() {
        let clock = FrameClock::default();
        assert_eq!(clock.angle, 0.0);
        assert!((clock.time - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn clock_advances_per_tick() {
        let mut clock = FrameClock::new();
        for _ in 0..100 {
            clock.tick();
        }
        assert!((clock.angle - 1.0).abs() < 1e-4);
        assert!((clock.time - 2.1).abs() < 1e-4);
    }
}
