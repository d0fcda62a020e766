//! Several cubes, each with its own model matrix and spin rate.

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

/// Where each cube sits and how fast it spins relative to the frame clock.
pub fn layout() -> Vec<(Vector3<f32>, f32)> {
    vec![
        (Vector3::new(-1.5, 0.0, -6.0), 1.0),
        (Vector3::new(1.5, 0.0, -6.0), -1.5),
        (Vector3::new(0.0, 1.5, -7.0), 2.0),
        (Vector3::new(0.0, -1.5, -7.0), 0.5),
    ]
}

pub struct CubesDemo {
    cubes: Vec<(SceneObject, f32)>,
    animation: Animation,
}

impl CubesDemo {
    pub fn new(init: &InitContext) -> Self {
        let mesh = MeshData::cube();
        let cubes = layout()
            .into_iter()
            .enumerate()
            .map(|(i, (position, rate))| {
                let cube = SceneObject::new(
                    &init.device,
                    &init.program.model_layout,
                    &mesh,
                    &format!("Cube {i}"),
                    position,
                    1,
                );
                (cube, rate)
            })
            .collect();
        let animation = Animation::new(&init.device, &init.program, SceneUniform::single());
        Self { cubes, animation }
    }
}

impl GraphicsFlow for CubesDemo {
    fn on_init(&mut self, _: &mut Context) -> Out {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: Duration) -> Out {
        self.animation.tick(&ctx.queue);
        let angle = self.animation.clock.angle;
        for (cube, rate) in self.cubes.iter_mut() {
            cube.advance(angle * *rate);
            cube.write_to_buffer(&ctx.queue);
        }
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        let scene = &self.animation.binding.bind_group;
        Render::Defaults(
            self.cubes
                .iter()
                .map(|(cube, _)| cube.instanced(scene))
                .collect(),
        )
    }
}

pub fn constructor() -> FlowConstructor {
    Box::new(|init| {
        Box::pin(async move { Box::new(CubesDemo::new(&init)) as Box<dyn GraphicsFlow> })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubes_do_not_overlap() {
        let cubes = layout();
        // a unit cube spinning freely fits in a sphere of diameter sqrt(3)
        let min_gap = 3f32.sqrt();
        for (i, (a, _)) in cubes.iter().enumerate() {
            for (b, _) in &cubes[i + 1..] {
                let d = *a - *b;
                let distance = (d.x * d.x + d.y * d.y + d.z * d.z).sqrt();
                assert!(distance >= min_gap, "{a:?} and {b:?} too close");
            }
        }
    }

    #[test]
    fn cubes_spin_at_distinct_rates() {
        let rates: Vec<f32> = layout().into_iter().map(|(_, rate)| rate).collect();
        for (i, a) in rates.iter().enumerate() {
            assert!(rates[i + 1..].iter().all(|b| b != a));
        }
    }
}
