use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-vertex record: one position.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Indexed triangle mesh. Front faces wind counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Single triangle in the z = 0 plane, apex down.
    pub fn triangle() -> Self {
        Self::new(
            vec![
                Vertex::new(0.0, -0.5, 0.0),
                Vertex::new(0.5, 0.5, 0.0),
                Vertex::new(-0.5, 0.5, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    /// Axis-aligned unit cube centered on the origin.
    pub fn cube() -> Self {
        let vertices = vec![
            Vertex::new(-0.5, -0.5, -0.5),
            Vertex::new(0.5, -0.5, -0.5),
            Vertex::new(0.5, 0.5, -0.5),
            Vertex::new(-0.5, 0.5, -0.5),
            Vertex::new(-0.5, -0.5, 0.5),
            Vertex::new(0.5, -0.5, 0.5),
            Vertex::new(0.5, 0.5, 0.5),
            Vertex::new(-0.5, 0.5, 0.5),
        ];

        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +z
            1, 0, 3, 1, 3, 2, // -z
            5, 1, 2, 5, 2, 6, // +x
            0, 4, 7, 0, 7, 3, // -x
            7, 6, 2, 7, 2, 3, // +y
            0, 1, 5, 0, 5, 4, // -y
        ];

        Self::new(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_point_outward() {
        let cube = Mesh::cube();
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices[i as usize].position());
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward face {tri:?}");
        }
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 12);
    }
}
