//! Free-look camera demo.
//!
//! A grid of spinning cubes in front of the camera. `w`/`s` move along the
//! view direction, `a`/`d` strafe, `g`/`j` turn left/right and `y`/`h` look
//! up/down.

use cgmath::Vector3;
use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::MeshData, object::SceneObject},
    demos::Animation,
    flow::{FlowConstructor, GraphicsFlow, Out, Render},
    pipelines::uniforms::SceneUniform,
};

pub const GRID_SIZE: usize = 3;
pub const SPACING: f32 = 2.5;
/// Distance from the camera start to the first row.
pub const NEAREST_ROW: f32 = 3.0;

/// Cube positions: `size × size` on the y = 0 plane, centred on x = 0 and
/// receding from z = -`NEAREST_ROW`.
pub fn grid(size: usize, spacing: f32) -> Vec<Vector3<f32>> {
    let offset = (size as f32 - 1.0) / 2.0;
    (0..size * size)
        .map(|i| {
            let x = (i % size) as f32 - offset;
            let z = (i / size) as f32;
            Vector3::new(x * spacing, 0.0, -NEAREST_ROW - z * spacing)
        })
        .collect()
}

pub struct CameraDemo {
    cubes: Vec<SceneObject>,
    animation: Animation,
}

impl CameraDemo {
    pub fn new(init: &InitContext) -> Self {
        let mesh = MeshData::cube();
        let cubes = grid(GRID_SIZE, SPACING)
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                SceneObject::new(
                    &init.device,
                    &init.program.model_layout,
                    &mesh,
                    &format!("Grid Cube {i}"),
                    position,
                    1,
                )
            })
            .collect();
        let animation = Animation::new(&init.device, &init.program, SceneUniform::single());
        Self { cubes, animation }
    }
}

impl GraphicsFlow for CameraDemo {
    fn on_init(&mut self, _: &mut Context) -> Out {
        Out::Configure(Box::new(|ctx| {
            log::info!("free-look camera enabled");
            ctx.camera.free_look = true;
        }))
    }

    fn on_update(&mut self, ctx: &Context, _: Duration) -> Out {
        self.animation.tick(&ctx.queue);
        for cube in self.cubes.iter_mut() {
            cube.advance(self.animation.clock.angle);
            cube.write_to_buffer(&ctx.queue);
        }
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        let scene = &self.animation.binding.bind_group;
        Render::Defaults(self.cubes.iter().map(|cube| cube.instanced(scene)).collect())
    }
}

pub fn constructor() -> FlowConstructor {
    Box::new(|init| {
        Box::pin(async move { Box::new(CameraDemo::new(&init)) as Box<dyn GraphicsFlow> })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_centred_and_in_front_of_the_camera() {
        let cubes = grid(3, 2.5);
        assert_eq!(cubes.len(), 9);
        let mean_x: f32 = cubes.iter().map(|c| c.x).sum::<f32>() / 9.0;
        assert!(mean_x.abs() < 1e-6);
        assert!(cubes.iter().all(|c| c.z <= -NEAREST_ROW && c.y == 0.0));
    }

    #[test]
    fn grid_stays_inside_the_far_plane() {
        let farthest = grid(GRID_SIZE, SPACING)
            .iter()
            .map(|c| -c.z)
            .fold(0.0, f32::max);
        assert!(farthest + 1.0 < 10.0);
    }
}
