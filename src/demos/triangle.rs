use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::MeshData, object::SceneObject},
    demos::Animation,
    flow::{FlowConstructor, GraphicsFlow, Out, Render},
    pipelines::uniforms::SceneUniform,
};

/// One spinning triangle with red, green and blue corners.
pub struct TriangleDemo {
    triangle: SceneObject,
    animation: Animation,
}

impl TriangleDemo {
    pub fn new(init: &InitContext) -> Self {
        Self {
            triangle: SceneObject::new(
                &init.device,
                &init.program.model_layout,
                &MeshData::triangle(),
                "Triangle",
                (0.0, 0.0, -5.0).into(),
                1,
            ),
            animation: Animation::new(&init.device, &init.program, SceneUniform::single()),
        }
    }
}

impl GraphicsFlow for TriangleDemo {
    fn on_init(&mut self, _: &mut Context) -> Out {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: Duration) -> Out {
        self.animation.tick(&ctx.queue);
        self.triangle.advance(self.animation.clock.angle);
        self.triangle.write_to_buffer(&ctx.queue);
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        self.triangle
            .instanced(&self.animation.binding.bind_group)
            .into()
    }
}

pub fn constructor() -> FlowConstructor {
    Box::new(|init| {
        Box::pin(async move { Box::new(TriangleDemo::new(&init)) as Box<dyn GraphicsFlow> })
    })
}
