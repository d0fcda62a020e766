//! A cube with one colour per face, drawn three times in one non-indexed,
//! instanced draw.

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::MeshData, object::SceneObject},
    demos::Animation,
    flow::{FlowConstructor, GraphicsFlow, Out, Render},
    pipelines::uniforms::{INSTANCE_SLOTS, SceneUniform},
};

pub struct CubeDemo {
    cube: SceneObject,
    animation: Animation,
}

impl CubeDemo {
    pub fn new(init: &InitContext) -> Self {
        let cube = SceneObject::new(
            &init.device,
            &init.program.model_layout,
            &MeshData::cube(),
            "Cube",
            (0.0, 0.0, -5.0).into(),
            INSTANCE_SLOTS as u32,
        );
        let animation = Animation::new(&init.device, &init.program, SceneUniform::default());
        Self { cube, animation }
    }
}

impl GraphicsFlow for CubeDemo {
    fn on_init(&mut self, _: &mut Context) -> Out {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: Duration) -> Out {
        self.animation.tick(&ctx.queue);
        self.cube.advance(self.animation.clock.angle);
        self.cube.write_to_buffer(&ctx.queue);
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Default(self.cube.instanced(&self.animation.binding.bind_group))
    }
}

pub fn constructor() -> FlowConstructor {
    Box::new(|init| Box::pin(async move { Box::new(CubeDemo::new(&init)) as Box<dyn GraphicsFlow> }))
}
