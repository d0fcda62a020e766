//! A red rectangle drawn three times in one indexed, instanced draw. Each
//! instance picks its colour and x offset from the scene uniform.

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::MeshData, object::SceneObject},
    demos::Animation,
    flow::{FlowConstructor, GraphicsFlow, Out, Render},
    pipelines::uniforms::{INSTANCE_SLOTS, SceneUniform},
};

pub struct RectangleDemo {
    rectangle: SceneObject,
    animation: Animation,
}

impl RectangleDemo {
    pub fn new(init: &InitContext) -> Self {
        let rectangle = SceneObject::new(
            &init.device,
            &init.program.model_layout,
            &MeshData::rectangle(),
            "Rectangle",
            (0.0, 0.0, -5.0).into(),
            INSTANCE_SLOTS as u32,
        );
        let animation = Animation::new(&init.device, &init.program, SceneUniform::default());
        Self {
            rectangle,
            animation,
        }
    }
}

impl GraphicsFlow for RectangleDemo {
    fn on_init(&mut self, _: &mut Context) -> Out {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: Duration) -> Out {
        self.animation.tick(&ctx.queue);
        self.rectangle.advance(self.animation.clock.angle);
        self.rectangle.write_to_buffer(&ctx.queue);
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Default(self.rectangle.instanced(&self.animation.binding.bind_group))
    }
}

pub fn constructor() -> FlowConstructor {
    Box::new(|init| {
        Box::pin(async move { Box::new(RectangleDemo::new(&init)) as Box<dyn GraphicsFlow> })
    })
}
