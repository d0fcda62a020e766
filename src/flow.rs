//! Flow control and application event loop.
//!
//! A "flow" is one demo: it builds its meshes when the program is ready,
//! advances its animation every frame and describes what to draw. The event
//! loop owns the rendering context, distributes window events and draws all
//! flows into one render pass per frame.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow`] is the trait every demo implements
//! - [`Out`] is the output of lifecycle hooks, used to reconfigure the context
//!
//! # Lifecycle Flow
//!
//! Startup is strictly ordered and any failure is fatal:
//! 1. Acquire the rendering context (surface, adapter, device)
//! 2. Load both shader sources concurrently
//! 3. Compile and link them into the program
//! 4. Construct the flows and call `on_init`
//!
//! Then each frame:
//! 1. Collect window events and pass them to the camera and all flows
//! 2. Update the camera uniform
//! 3. Call `on_update` on all flows
//! 4. Collect every flow's `on_render` and draw it
//! 5. Present the frame and request the next one

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{AppConfig, Context, InitContext},
    error::DemoError,
    pipelines::basic::Program,
    render::{Instanced, draw_all},
    resources::{load_shaders, platform_source},
};

pub use crate::render::Render;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

///
/// This is the output type of every lifecycle hook.
///
/// `Out::Configure` can be used to modify the Context during runtime, for
/// instance to change the clear colour or to hand the camera to the keyboard.
///
/// `Empty` is the default output used when nothing needs to change.
///
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

impl Debug for Out {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configure(_) => f.write_str("Configure(|&mut Context| -> {...})"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Trait for implementing a demo.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after the flow is constructed
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame
/// 4. `on_render()` is called every frame and specifies what to draw
///
pub trait GraphicsFlow {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context) -> Out;

    /// Update state every frame.
    ///
    /// `dt` is the wall time since the previous frame. The demos ignore it
    /// and advance by fixed per-frame steps.
    fn on_update(&mut self, ctx: &Context, dt: Duration) -> Out;

    /// Handle window events (keyboard, resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent) -> Out;

    /// Return what this flow draws this frame.
    fn on_render(&self) -> Render<'_>;
}

// Dummy impl to make wasm work
impl Debug for dyn GraphicsFlow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` once the program is linked and
/// asynchronously returns a boxed `GraphicsFlow`.
pub type FlowConstructor =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow>>>>>;

/// Application state bundle: GPU context, linked program and surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    pub(crate) program: Program,
    is_surface_configured: bool,
}

/// Outcome of drawing one frame.
enum Frame {
    Presented,
    Skipped,
    Reconfigure,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self, DemoError> {
        let ctx = Context::new(window, config).await?;
        let source = platform_source()?;
        let sources = load_shaders(&source, &config.shader_dir).await?;
        let program = Program::new(
            &ctx.device,
            ctx.config.format,
            &ctx.camera.bind_group_layout,
            &sources,
        )
        .await?;
        Ok(Self {
            ctx,
            program,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    fn render(&self, graphics_flows: &[Box<dyn GraphicsFlow>]) -> Frame {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Frame::Skipped;
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => output,
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => {
                log::debug!("surface texture is suboptimal");
                output
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                return Frame::Skipped;
            }
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                return Frame::Reconfigure;
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                log::warn!("Unable to acquire the surface texture");
                return Frame::Skipped;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws: Vec<Instanced> = graphics_flows
            .iter()
            .flat_map(|flow| flow.on_render().into_draws())
            .collect();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.program.pipeline);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            draw_all(&mut render_pass, draws);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Frame::Presented
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: AppConfig,
    state: Option<AppState>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    // This holds the constructors at the start.
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConstructor>>,
    last_time: Instant,
    failure: Option<DemoError>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        constructors: Vec<FlowConstructor>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            failure: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DemoError) {
        log::error!("Startup failed: {}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, mut state: AppState, flows: Vec<Box<dyn GraphicsFlow>>) {
        self.graphics_flows = flows;
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        self.graphics_flows.iter_mut().for_each(|flow| {
            let out = flow.on_init(&mut state.ctx);
            handle_flow_output(&mut state.ctx, out);
        });
        log::info!("Starting render loop with {} flows", self.graphics_flows.len());
        self.last_time = Instant::now();
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn window_attributes(&self) -> Result<winit::window::WindowAttributes, DemoError> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas_id = &self.config.canvas_id;
            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(canvas_id))
                .ok_or_else(|| {
                    DemoError::ContextUnavailable(format!("no canvas with id {canvas_id}"))
                })?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(window_attributes)
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized {
        state: AppState,
        flows: Vec<Box<dyn GraphicsFlow>>,
    },
    #[allow(dead_code)]
    Failed(DemoError),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Some platforms resume more than once
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        let window = match self
            .window_attributes()
            .and_then(|attributes| {
                event_loop
                    .create_window(attributes)
                    .map_err(|e| DemoError::ContextUnavailable(e.to_string()))
            }) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };

        let config = self.config.clone();
        let init_future = async move {
            let app_state = AppState::new(window, &config).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // Device and Queue are reference counted so every flow gets a cheap handle
                .map(|constructor| constructor(app_state.ctx.init_context(&app_state.program)))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            Ok::<_, DemoError>((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.start(app_state, flows),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => FlowEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop closed before startup finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized { state, flows } => self.start(state, flows),
            FlowEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => {
                if let WindowEvent::CloseRequested = event {
                    event_loop.exit();
                }
                return;
            }
        };

        // general stuff
        state.ctx.camera.controller.handle_window_events(&event);

        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_window_events(&state.ctx, &event);
            handle_flow_output(&mut state.ctx, out);
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                // Update the camera
                state
                    .ctx
                    .camera
                    .update(&state.ctx.projection, &state.ctx.queue);
                // Update custom stuff
                self.graphics_flows.iter_mut().for_each(|f| {
                    let out = f.on_update(&state.ctx, dt);
                    handle_flow_output(&mut state.ctx, out);
                });

                match state.render(&self.graphics_flows) {
                    Frame::Presented | Frame::Skipped => (),
                    // Reconfigure the surface if it's lost or outdated
                    Frame::Reconfigure => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output(ctx: &mut Context, out: Out) {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Opens the window and runs `constructors` until the window closes.
///
/// Returns the startup error if the context, the shaders or the program
/// could not be created.
pub fn run(constructors: Vec<FlowConstructor>, config: AppConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, constructors, config)?;

    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
