use crate::{
    data_structures::{
        mesh::{ColourVertex, PositionVertex, Vertex},
        texture::DepthTexture,
    },
    error::DemoError,
    pipelines::uniforms::uniform_layout,
    resources::ShaderSources,
};

/// The two programmable stages the demos use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl From<ShaderStage> for wgpu::naga::ShaderStage {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => wgpu::naga::ShaderStage::Vertex,
            ShaderStage::Fragment => wgpu::naga::ShaderStage::Fragment,
        }
    }
}

/// Compiles one GLSL stage.
///
/// Compilation errors are caught in a validation error scope and returned
/// instead of reaching the device's uncaptured error handler.
pub async fn compile_shader(
    device: &wgpu::Device,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, DemoError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "Vertex Shader",
            ShaderStage::Fragment => "Fragment Shader",
        }),
        source: wgpu::ShaderSource::Glsl {
            shader: source.into(),
            stage: stage.into(),
            defines: &[],
        },
    });
    match scope.pop().await {
        Some(err) => Err(DemoError::ShaderCompile {
            stage: stage.name(),
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

/// Links a vertex and a fragment module into a render pipeline.
pub async fn link_program(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> Result<wgpu::RenderPipeline, DemoError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = mk_render_pipeline(
        device,
        layout,
        color_format,
        Some(wgpu::BlendState::REPLACE),
        Some(DepthTexture::DEPTH_FORMAT),
        vertex_layouts,
        vertex,
        fragment,
    );
    match scope.pop().await {
        Some(err) => Err(DemoError::ProgramLink(err.to_string())),
        None => Ok(pipeline),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            // GLSL entry points are always `main`
            entry_point: Some("main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the flat shapes spin and must stay visible from behind
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

/// The linked shader program plus the layouts of its per-object and
/// per-draw uniforms.
///
/// Bind groups: 0 camera (projection + view), 1 model matrix, 2 scene
/// (instance colours, offsets, time).
#[derive(Debug, Clone)]
pub struct Program {
    pub pipeline: wgpu::RenderPipeline,
    pub model_layout: wgpu::BindGroupLayout,
    pub scene_layout: wgpu::BindGroupLayout,
}

impl Program {
    pub async fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        sources: &ShaderSources,
    ) -> Result<Self, DemoError> {
        let vertex = compile_shader(device, &sources.vertex, ShaderStage::Vertex).await?;
        let fragment = compile_shader(device, &sources.fragment, ShaderStage::Fragment).await?;

        let model_layout = uniform_layout(device, "model_bind_group_layout");
        let scene_layout = uniform_layout(device, "scene_bind_group_layout");
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[Some(camera_layout), Some(&model_layout), Some(&scene_layout)],
            immediate_size: 0,
        });

        let pipeline = link_program(
            device,
            &layout,
            color_format,
            &[PositionVertex::desc(), ColourVertex::desc()],
            &vertex,
            &fragment,
        )
        .await?;
        log::info!("Shader program linked");

        Ok(Self {
            pipeline,
            model_layout,
            scene_layout,
        })
    }
}
