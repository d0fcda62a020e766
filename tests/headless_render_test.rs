//! GPU-backed tests. They need an adapter and only run with
//! `--features integration-tests`.
#![cfg(feature = "integration-tests")]

use futures::executor::block_on;
use shape_ngin::{
    Deg, DemoError,
    camera::{CameraUniform, Projection},
    context::InitContext,
    demos::cube::CubeDemo,
    flow::GraphicsFlow,
    pipelines::{
        basic::{Program, ShaderStage, compile_shader},
        uniforms::{UniformBinding, uniform_layout},
    },
    render::draw_all,
    resources::{DEFAULT_SHADER_DIR, FileSource, ShaderSources, load_shaders},
};

const SIZE: u32 = 256;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
    let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
        .expect("no adapter available");
    block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
        .expect("no device available")
}

fn bundled_sources() -> ShaderSources {
    block_on(load_shaders(&FileSource::default(), DEFAULT_SHADER_DIR)).unwrap()
}

#[test]
fn bundled_shaders_compile_and_link() {
    let (device, _) = device();
    let camera_layout = uniform_layout(&device, "camera");
    block_on(Program::new(&device, FORMAT, &camera_layout, &bundled_sources())).unwrap();
}

#[test]
fn broken_glsl_is_a_compile_error() {
    let (device, _) = device();
    let result = block_on(compile_shader(
        &device,
        "#version 450\nvoid main() { this is not glsl }",
        ShaderStage::Fragment,
    ));
    match result {
        Err(DemoError::ShaderCompile { stage, .. }) => assert_eq!(stage, "fragment"),
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn mismatched_stages_fail_to_link() {
    let (device, _) = device();
    let camera_layout = uniform_layout(&device, "camera");
    let sources = ShaderSources {
        vertex: "#version 450\n\
                 layout(location = 0) in vec3 position;\n\
                 void main() { gl_Position = vec4(position, 1.0); }"
            .to_string(),
        fragment: bundled_sources().fragment,
    };
    let result = block_on(Program::new(&device, FORMAT, &camera_layout, &sources));
    assert!(matches!(result, Err(DemoError::ProgramLink(_))), "{result:?}");
}

#[test]
fn cube_demo_draws_over_the_clear_colour() {
    let (device, queue) = device();

    let camera_layout = uniform_layout(&device, "camera");
    let mut camera = CameraUniform::new();
    camera.update_projection(&Projection::new(SIZE, SIZE, Deg(45.0), 0.1, 10.0));
    let camera = UniformBinding::new(&device, &camera_layout, &camera, "Camera");

    let program = block_on(Program::new(&device, FORMAT, &camera_layout, &bundled_sources())).unwrap();
    let init = InitContext {
        device: device.clone(),
        queue: queue.clone(),
        program: program.clone(),
    };
    let demo = CubeDemo::new(&init);

    let extent = wgpu::Extent3d {
        width: SIZE,
        height: SIZE,
        depth_or_array_layers: 1,
    };
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Output Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth = shape_ngin::data_structures::texture::DepthTexture::new(&device, [SIZE, SIZE], "depth");
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
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
        render_pass.set_pipeline(&program.pipeline);
        render_pass.set_bind_group(0, &camera.bind_group, &[]);
        draw_all(&mut render_pass, demo.on_render().into_draws());
    }

    let bytes_per_row = 4 * SIZE;
    let output = device.create_buffer(&wgpu::BufferDescriptor {
        label: None,
        size: (bytes_per_row * SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        extent,
    );
    queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = futures::channel::oneshot::channel();
    output.map_async(wgpu::MapMode::Read, .., move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
    block_on(rx).unwrap().unwrap();

    let pixels = output.get_mapped_range(..);
    let pixel = |x: u32, y: u32| {
        let i = ((y * SIZE + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    };
    // the middle instance covers the centre, nothing reaches the corner
    assert_ne!(pixel(SIZE / 2, SIZE / 2)[..3], [0, 0, 0]);
    assert_eq!(pixel(0, 0), [0, 0, 0, 255]);
}
