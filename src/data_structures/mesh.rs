//! Static meshes: CPU-side geometry builders and their GPU buffers.
//!
//! Positions and colours live in two separate vertex buffers (slot 0 and
//! slot 1) so a mesh without per-vertex colours can still be drawn through
//! the same pipeline.

use std::ops::Range;

use wgpu::util::DeviceExt;

pub type Position = [f32; 3];
pub type Colour = [f32; 4];

pub const RED: Colour = [1.0, 0.0, 0.0, 1.0];
pub const GREEN: Colour = [0.0, 1.0, 0.0, 1.0];
pub const BLUE: Colour = [0.0, 0.0, 1.0, 1.0];
pub const YELLOW: Colour = [1.0, 1.0, 0.0, 1.0];
pub const CYAN: Colour = [0.0, 1.0, 1.0, 1.0];
pub const MAGENTA: Colour = [1.0, 0.0, 1.0, 1.0];
pub const WHITE: Colour = [1.0, 1.0, 1.0, 1.0];

/// Describes how the bytes of a vertex buffer map to shader inputs.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Marker for the position stream (`layout(location = 0) in vec3 position`).
pub struct PositionVertex;

impl Vertex for PositionVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Position>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Marker for the colour stream (`layout(location = 1) in vec4 color`).
pub struct ColourVertex;

impl Vertex for ColourVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Colour>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            }],
        }
    }
}

/// Geometry before upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Position>,
    pub colours: Option<Vec<Colour>>,
    pub indices: Option<Vec<u16>>,
}

impl MeshData {
    /// Two triangles spanning `[-1, 1]` in x and y, all red.
    pub fn rectangle() -> Self {
        Self {
            positions: vec![
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            colours: Some(vec![RED; 4]),
            indices: Some(vec![
                0, 1, 2, // first triangle
                0, 2, 3, // second triangle
            ]),
        }
    }

    pub fn triangle() -> Self {
        Self {
            positions: vec![[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]],
            colours: Some(vec![RED, GREEN, BLUE]),
            indices: None,
        }
    }

    /// Unit cube centred on the origin as 36 unindexed vertices with one
    /// colour per face.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let positions = vec![
            // front
            [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5],
            // back
            [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5],
            [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5],
            // left
            [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5],
            [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5],
            // right
            [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5],
            // bottom
            [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5],
            // top
            [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5],
            [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5],
        ];
        let face_colours = [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA];
        let colours = face_colours
            .iter()
            .flat_map(|colour| std::iter::repeat_n(*colour, 6))
            .collect();
        Self {
            positions,
            colours: Some(colours),
            indices: None,
        }
    }

    /// Number of vertices (unindexed) or indices (indexed) a draw consumes.
    pub fn element_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.positions.len() as u32,
        }
    }

    /// Colour stream for upload; missing colours are filled with white.
    fn colour_stream(&self) -> Vec<Colour> {
        match &self.colours {
            Some(colours) if colours.len() == self.positions.len() => colours.clone(),
            Some(colours) => {
                log::warn!(
                    "Mesh has {} colours for {} positions; padding with white.",
                    colours.len(),
                    self.positions.len()
                );
                colours
                    .iter()
                    .copied()
                    .chain(std::iter::repeat(WHITE))
                    .take(self.positions.len())
                    .collect()
            }
            None => vec![WHITE; self.positions.len()],
        }
    }
}

/// A mesh uploaded to the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub position_buffer: wgpu::Buffer,
    pub colour_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, data: &MeshData, name: &str) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Position Buffer")),
            contents: bytemuck::cast_slice(&data.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let colour_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Colour Buffer")),
            contents: bytemuck::cast_slice(&data.colour_stream()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = data.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Index Buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Self {
            name: name.to_string(),
            position_buffer,
            colour_buffer,
            index_buffer,
            num_elements: data.element_count(),
        }
    }
}

pub trait DrawMesh<'a> {
    /// Binds the vertex streams and issues an (instanced) draw.
    ///
    /// Indexed meshes go through `draw_indexed`, the others through `draw`.
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.position_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.colour_buffer.slice(..));
        match &mesh.index_buffer {
            Some(index_buffer) => {
                self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                self.draw_indexed(0..mesh.num_elements, 0, instances);
            }
            None => self.draw(0..mesh.num_elements, instances),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_is_two_indexed_triangles() {
        let rect = MeshData::rectangle();
        assert_eq!(rect.positions.len(), 4);
        assert_eq!(rect.element_count(), 6);
        assert!(rect.indices.unwrap().iter().all(|i| (*i as usize) < 4));
    }

    #[test]
    fn cube_has_one_colour_per_face() {
        let cube = MeshData::cube();
        assert_eq!(cube.element_count(), 36);
        let colours = cube.colours.unwrap();
        assert_eq!(colours.len(), 36);
        for (face, expected) in [RED, GREEN, BLUE, YELLOW, CYAN, MAGENTA].iter().enumerate() {
            assert!(colours[face * 6..face * 6 + 6].iter().all(|c| c == expected));
        }
    }

    #[test]
    fn cube_vertices_lie_on_the_unit_cube() {
        let cube = MeshData::cube();
        for p in cube.positions {
            assert!(p.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn missing_colours_are_filled_with_white() {
        let mut tri = MeshData::triangle();
        tri.colours = None;
        assert_eq!(tri.colour_stream(), vec![WHITE; 3]);

        tri.colours = Some(vec![RED]);
        assert_eq!(tri.colour_stream(), vec![RED, WHITE, WHITE]);
    }

    #[test]
    fn vertex_layouts_match_shader_locations() {
        assert_eq!(PositionVertex::desc().attributes[0].shader_location, 0);
        assert_eq!(PositionVertex::desc().array_stride, 12);
        assert_eq!(ColourVertex::desc().attributes[0].shader_location, 1);
        assert_eq!(ColourVertex::desc().array_stride, 16);
    }
}
