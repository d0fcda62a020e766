//! Uniform buffers and the bind groups that expose them to the shaders.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Layout of a single uniform buffer at binding 0, visible to the vertex
/// stage.
pub fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// A uniform buffer holding one `T` and its bind group.
#[derive(Debug)]
pub struct UniformBinding<T> {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformBinding<T> {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        value: &T,
        label: &str,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Buffer")),
            contents: bytemuck::cast_slice(std::slice::from_ref(value)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} Bind Group")),
        });
        Self {
            buffer,
            bind_group,
            _marker: PhantomData,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(std::slice::from_ref(value)));
    }
}

pub const INSTANCE_SLOTS: usize = 3;

/// Per-draw data shared by all instances: one colour and one x offset per
/// instance slot, how strongly the instance colour tints the vertex colour,
/// and the animation time.
///
/// Matches the std140 `Scene` block of the vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub colours: [[f32; 4]; INSTANCE_SLOTS],
    // xyz used, w is padding
    pub offsets: [f32; 4],
    pub time: f32,
    pub tint: f32,
    _padding: [f32; 2],
}

impl SceneUniform {
    pub fn new(
        colours: [[f32; 4]; INSTANCE_SLOTS],
        offsets: [f32; 3],
        time: f32,
        tint: f32,
    ) -> Self {
        Self {
            colours,
            offsets: [offsets[0], offsets[1], offsets[2], 0.0],
            time,
            tint,
            _padding: [0.0; 2],
        }
    }

    /// A single instance at the origin, untinted.
    pub fn single() -> Self {
        Self::new([[1.0; 4]; INSTANCE_SLOTS], [0.0; 3], 0.0, 0.0)
    }
}

impl Default for SceneUniform {
    /// Red, green and blue instances at x = -2, 0 and 2.
    fn default() -> Self {
        Self::new(
            [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]],
            [-2.0, 0.0, 2.0],
            0.1,
            0.5,
        )
    }
}
