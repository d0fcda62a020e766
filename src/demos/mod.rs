//! The demos: one flow per scene.
//!
//! - `rectangle`: indexed, three instances tinted red/green/blue
//! - `triangle`: one triangle with per-vertex colours
//! - `cube`: non-indexed cube, three instances
//! - `cubes`: several cubes with their own spin
//! - `camera`: a grid of cubes explored with the free-look camera

pub mod camera;
pub mod cube;
pub mod cubes;
pub mod rectangle;
pub mod triangle;

use crate::{
    data_structures::object::FrameClock,
    flow::FlowConstructor,
    pipelines::{
        basic::Program,
        uniforms::{SceneUniform, UniformBinding},
    },
};

pub const NAMES: [&str; 5] = ["rectangle", "triangle", "cube", "cubes", "camera"];

/// Constructors for the demo called `name`.
pub fn by_name(name: &str) -> Option<Vec<FlowConstructor>> {
    let constructor = match name {
        "rectangle" => rectangle::constructor(),
        "triangle" => triangle::constructor(),
        "cube" => cube::constructor(),
        "cubes" => cubes::constructor(),
        "camera" => camera::constructor(),
        _ => return None,
    };
    Some(vec![constructor])
}

/// The frame clock of a demo and the scene uniform its time feeds.
#[derive(Debug)]
pub struct Animation {
    pub clock: FrameClock,
    pub scene: SceneUniform,
    pub binding: UniformBinding<SceneUniform>,
}

impl Animation {
    pub fn new(device: &wgpu::Device, program: &Program, mut scene: SceneUniform) -> Self {
        let clock = FrameClock::new();
        scene.time = clock.time;
        let binding = UniformBinding::new(device, &program.scene_layout, &scene, "Scene");
        Self {
            clock,
            scene,
            binding,
        }
    }

    /// Advances the clock one frame and uploads the new time.
    pub fn tick(&mut self, queue: &wgpu::Queue) {
        self.clock.tick();
        self.scene.time = self.clock.time;
        self.binding.write(queue, &self.scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).is_some_and(|flows| flows.len() == 1), "{name}");
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(by_name("teapot").is_none());
    }
}
