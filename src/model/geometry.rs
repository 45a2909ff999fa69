use bytemuck::NoUninit;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Horizontal ground plane centered on the origin, facing up and down
/// (two winding orders, so it stays visible from below).
pub fn plane(size: f32, color: [f32; 4]) -> Mesh {
    let h = size * 0.5;
    let mut vertices = Vec::with_capacity(8);
    for normal in [[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]] {
        vertices.push(Vertex { pos: [-h, 0.0, -h], normal, color, uv: [0.0, 0.0] });
        vertices.push(Vertex { pos: [h, 0.0, -h], normal, color, uv: [1.0, 0.0] });
        vertices.push(Vertex { pos: [h, 0.0, h], normal, color, uv: [1.0, 1.0] });
        vertices.push(Vertex { pos: [-h, 0.0, h], normal, color, uv: [0.0, 1.0] });
    }
    let indices = vec![
        0, 2, 1, 0, 3, 2, // top face, seen from above
        4, 5, 6, 4, 6, 7, // bottom face, seen from below
    ];
    Mesh { vertices, indices }
}

/// Axis-aligned box centered on the origin.
pub fn cuboid(size: f32, color: [f32; 4]) -> Mesh {
    let h = size * 0.5;
    // (normal, four corners counter-clockwise when viewed from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
        ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
        ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
        ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
        ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
        ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (pos, uv) in corners.into_iter().zip(uvs) {
            vertices.push(Vertex { pos, normal, color, uv });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Mesh { vertices, indices }
}

/// UV sphere centered on the origin.
pub fn uv_sphere(radius: f32, stacks: u32, sectors: u32, color: [f32; 4]) -> Mesh {
    let stacks = stacks.max(2);
    let sectors = sectors.max(3);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        let y = phi.cos();
        let ring = phi.sin();
        for sector in 0..=sectors {
            let theta = std::f32::consts::TAU * sector as f32 / sectors as f32;
            let normal = [ring * theta.cos(), y, ring * theta.sin()];
            vertices.push(Vertex {
                pos: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                color,
                uv: [sector as f32 / sectors as f32, stack as f32 / stacks as f32],
            });
        }
    }

    let row = sectors + 1;
    for stack in 0..stacks {
        for sector in 0..sectors {
            let a = stack * row + sector;
            let b = a + row;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    Mesh { vertices, indices }
}

/// Closed cylinder centered on the origin, axis along Y.
pub fn cylinder(radius: f32, height: f32, sectors: u32, color: [f32; 4]) -> Mesh {
    let sectors = sectors.max(3);
    let h = height * 0.5;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // side wall
    for sector in 0..=sectors {
        let theta = std::f32::consts::TAU * sector as f32 / sectors as f32;
        let (x, z) = (theta.cos(), theta.sin());
        let u = sector as f32 / sectors as f32;
        vertices.push(Vertex { pos: [x * radius, -h, z * radius], normal: [x, 0.0, z], color, uv: [u, 1.0] });
        vertices.push(Vertex { pos: [x * radius, h, z * radius], normal: [x, 0.0, z], color, uv: [u, 0.0] });
    }
    for sector in 0..sectors {
        let a = sector * 2;
        indices.extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
    }

    // caps
    for (y, normal) in [(h, [0.0, 1.0, 0.0]), (-h, [0.0, -1.0, 0.0])] {
        let center = vertices.len() as u32;
        vertices.push(Vertex { pos: [0.0, y, 0.0], normal, color, uv: [0.5, 0.5] });
        for sector in 0..=sectors {
            let theta = std::f32::consts::TAU * sector as f32 / sectors as f32;
            let (x, z) = (theta.cos(), theta.sin());
            vertices.push(Vertex {
                pos: [x * radius, y, z * radius],
                normal,
                color,
                uv: [x * 0.5 + 0.5, z * 0.5 + 0.5],
            });
        }
        for sector in 0..sectors {
            let a = center + 1 + sector;
            if y > 0.0 {
                indices.extend_from_slice(&[center, a + 1, a]);
            } else {
                indices.extend_from_slice(&[center, a, a + 1]);
            }
        }
    }
    Mesh { vertices, indices }
}

/// Integer hash to [0, 1), used for primitive scatter placement.
/// Deterministic: the same index always lands in the same spot.
fn hash01(i: i32, salt: i32) -> f32 {
    let mut n = i.wrapping_mul(374761393).wrapping_add(salt.wrapping_mul(668265263));
    n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    (n ^ (n >> 16)) as u32 as f32 / 4294967296.0
}

/// Ground-plane offset for the primitive at `index`, within a 10x10 patch
/// centered on the origin.
pub fn scatter_offset(index: usize) -> (f32, f32) {
    (
        (hash01(index as i32, 1) - 0.5) * 10.0,
        (hash01(index as i32, 2) - 0.5) * 10.0,
    )
}
