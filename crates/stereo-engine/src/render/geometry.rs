//! Static vertex data and the buffers that hold it.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::program::{ATTR_NORMAL, ATTR_POSITION};

// ── vertex formats ────────────────────────────────────────────────────────

/// Interleaved cube vertex: position followed by the face normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        ATTR_POSITION => Float32x3,
        ATTR_NORMAL => Float32x3
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Clip-space position of the full-screen triangle.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BlitVertex {
    pub position: [f32; 2],
}

impl BlitVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![ATTR_POSITION => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlitVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── static data ───────────────────────────────────────────────────────────

const fn v(position: [f32; 3], normal: [f32; 3]) -> CubeVertex {
    CubeVertex { position, normal }
}

const PZ: [f32; 3] = [0.0, 0.0, 1.0];
const NZ: [f32; 3] = [0.0, 0.0, -1.0];
const PX: [f32; 3] = [1.0, 0.0, 0.0];
const NX: [f32; 3] = [-1.0, 0.0, 0.0];
const PY: [f32; 3] = [0.0, 1.0, 0.0];
const NY: [f32; 3] = [0.0, -1.0, 0.0];

/// Unit cube (half-extent 1), 6 faces × 2 CCW triangles, flat normals.
pub const CUBE_VERTICES: [CubeVertex; 36] = [
    // +Z
    v([-1.0, 1.0, 1.0], PZ), v([-1.0, -1.0, 1.0], PZ), v([1.0, 1.0, 1.0], PZ),
    v([-1.0, -1.0, 1.0], PZ), v([1.0, -1.0, 1.0], PZ), v([1.0, 1.0, 1.0], PZ),
    // +X
    v([1.0, 1.0, 1.0], PX), v([1.0, -1.0, 1.0], PX), v([1.0, 1.0, -1.0], PX),
    v([1.0, -1.0, 1.0], PX), v([1.0, -1.0, -1.0], PX), v([1.0, 1.0, -1.0], PX),
    // -Z
    v([1.0, 1.0, -1.0], NZ), v([1.0, -1.0, -1.0], NZ), v([-1.0, 1.0, -1.0], NZ),
    v([1.0, -1.0, -1.0], NZ), v([-1.0, -1.0, -1.0], NZ), v([-1.0, 1.0, -1.0], NZ),
    // -X
    v([-1.0, 1.0, -1.0], NX), v([-1.0, -1.0, -1.0], NX), v([-1.0, 1.0, 1.0], NX),
    v([-1.0, -1.0, -1.0], NX), v([-1.0, -1.0, 1.0], NX), v([-1.0, 1.0, 1.0], NX),
    // +Y
    v([-1.0, 1.0, -1.0], PY), v([-1.0, 1.0, 1.0], PY), v([1.0, 1.0, -1.0], PY),
    v([-1.0, 1.0, 1.0], PY), v([1.0, 1.0, 1.0], PY), v([1.0, 1.0, -1.0], PY),
    // -Y
    v([1.0, -1.0, -1.0], NY), v([1.0, -1.0, 1.0], NY), v([-1.0, -1.0, -1.0], NY),
    v([1.0, -1.0, 1.0], NY), v([-1.0, -1.0, 1.0], NY), v([-1.0, -1.0, -1.0], NY),
];

/// One oversized triangle whose clipped extent is exactly the `[-1, 1]²` square.
pub const BLIT_VERTICES: [BlitVertex; 3] = [
    BlitVertex { position: [-1.0, -1.0] },
    BlitVertex { position: [3.0, -1.0] },
    BlitVertex { position: [-1.0, 3.0] },
];

// ── GPU buffers ───────────────────────────────────────────────────────────

/// Immutable vertex buffer plus the layout needed to draw it.
pub struct GeometryBuffer {
    buffer: wgpu::Buffer,
    layout: wgpu::VertexBufferLayout<'static>,
    vertex_count: u32,
}

impl GeometryBuffer {
    /// Uploads `vertices` once into a `VERTEX`-only buffer.
    pub fn upload_static<V: Pod>(
        device: &wgpu::Device,
        label: &str,
        vertices: &[V],
        layout: wgpu::VertexBufferLayout<'static>,
    ) -> Self {
        debug_assert_eq!(layout.array_stride, std::mem::size_of::<V>() as u64);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            layout,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        self.layout.clone()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Binds the buffer to slot 0 and draws every vertex as a triangle list.
    ///
    /// The pipeline set on `rpass` must have been built with [`layout`](Self::layout).
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.buffer.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}

/// The two static buffers used by a stereo frame.
pub struct GeometryStore {
    pub cube: GeometryBuffer,
    pub blit: GeometryBuffer,
}

impl GeometryStore {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            cube: GeometryBuffer::upload_static(
                device,
                "stereo cube vbo",
                &CUBE_VERTICES,
                CubeVertex::layout(),
            ),
            blit: GeometryBuffer::upload_static(
                device,
                "stereo blit vbo",
                &BLIT_VERTICES,
                BlitVertex::layout(),
            ),
        }
    }
}
