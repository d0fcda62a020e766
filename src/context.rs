use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{self, CameraResources, CameraUniform, Projection},
    data_structures::texture::DepthTexture,
    error::DemoError,
    pipelines::{basic::Program, uniforms::uniform_layout},
    resources::DEFAULT_SHADER_DIR,
};

/// Startup settings of a demo application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Id of the canvas element the web build renders into.
    pub canvas_id: String,
    /// Directory holding `vertex.glsl` and `fragment.glsl`.
    pub shader_dir: String,
    pub clear_colour: wgpu::Color,
    /// Distance moved per frame while a movement key is held.
    pub camera_step: f32,
    /// Yaw/pitch change per frame while a rotation key is held.
    pub camera_turn: cgmath::Deg<f32>,
    pub fovy: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "shape-ngin".to_string(),
            canvas_id: "renderCanvas".to_string(),
            shader_dir: DEFAULT_SHADER_DIR.to_string(),
            clear_colour: wgpu::Color::BLACK,
            camera_step: 0.05,
            camera_turn: cgmath::Deg(1.0),
            fovy: cgmath::Deg(45.0),
            znear: 0.1,
            zfar: 10.0,
        }
    }
}

/// Everything a flow needs to create its GPU resources.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub program: Program,
}

/// The rendering context: window surface, device, queue, depth target and
/// the camera shared by all flows.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: DepthTexture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub clear_colour: wgpu::Color,
}

impl Context {
    /// Acquires surface, adapter and device for `window`.
    ///
    /// Any failure here is [`DemoError::ContextUnavailable`]; there is no
    /// fallback.
    pub async fn new(window: Arc<Window>, app: &AppConfig) -> Result<Self, DemoError> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| DemoError::ContextUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| DemoError::ContextUnavailable(e.to_string()))?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .map_err(|e| DemoError::ContextUnavailable(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                DemoError::ContextUnavailable("surface reports no texture formats".into())
            })?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // origin, looking down -z
        let camera = camera::Camera::default();
        let projection =
            Projection::new(config.width, config.height, app.fovy, app.znear, app.zfar);
        let controller = camera::CameraController::new(app.camera_step, app.camera_turn);

        let mut uniform = CameraUniform::new();
        uniform.update_projection(&projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = uniform_layout(&device, "camera_bind_group_layout");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let camera = CameraResources {
            camera,
            controller,
            uniform,
            free_look: false,
            buffer,
            bind_group,
            bind_group_layout,
        };

        let depth_texture =
            DepthTexture::new(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            clear_colour: app.clear_colour,
            window,
            depth_texture,
        })
    }

    /// Reconfigures the surface, depth target and projection for a new size.
    ///
    /// Returns `false` for zero-sized (minimised) windows, which are ignored.
    pub(crate) fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            DepthTexture::new(&self.device, [width, height], "depth_texture");
        true
    }

    pub fn init_context(&self, program: &Program) -> InitContext {
        // Device and Queue are internally reference counted
        InitContext {
            device: self.device.clone(),
            queue: self.queue.clone(),
            program: program.clone(),
        }
    }
}
