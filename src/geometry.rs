//! Sphere meshes for the swarm and the invader.
//!
//! Spheres are icosahedra whose faces are split into a triangular grid and
//! pushed out onto the unit sphere. The renderer scales each instance by its
//! radius, so all meshes here have radius 1.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

/// Unit sphere mesh built from a subdivided icosahedron.
#[derive(Debug, Clone)]
pub struct Icosphere {
    /// Unique vertices on the unit sphere. Each doubles as its own normal.
    pub vertices: Vec<Vec3>,
    /// Triangle list into `vertices`.
    pub indices: Vec<u32>,
}

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    // Golden ratio
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ]
}

impl Icosphere {
    /// Build a sphere where every icosahedron edge is cut into `detail + 1`
    /// segments. Detail 0 is the plain icosahedron.
    pub fn new(detail: u32) -> Self {
        let base = icosahedron_vertices();
        let n = detail as usize + 1;

        let mut builder = MeshBuilder::default();
        for face in ICOSAHEDRON_FACES {
            let (a, b, c) = (base[face[0]], base[face[1]], base[face[2]]);

            // grid[i][j]: row i runs from the a-b edge (i = 0) to vertex c (i = n)
            let mut grid: Vec<Vec<u32>> = Vec::with_capacity(n + 1);
            for i in 0..=n {
                let t = i as f32 / n as f32;
                let aj = a.lerp(c, t);
                let bj = b.lerp(c, t);
                let rows = n - i;
                let row = (0..=rows)
                    .map(|j| {
                        let p = if rows == 0 {
                            aj
                        } else {
                            aj.lerp(bj, j as f32 / rows as f32)
                        };
                        builder.vertex(p)
                    })
                    .collect();
                grid.push(row);
            }

            for i in 0..n {
                for j in 0..(2 * (n - i) - 1) {
                    let k = j / 2;
                    if j % 2 == 0 {
                        builder.triangle(grid[i][k + 1], grid[i + 1][k], grid[i][k]);
                    } else {
                        builder.triangle(grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]);
                    }
                }
            }
        }

        Self {
            vertices: builder.vertices,
            indices: builder.indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Every distinct triangle edge, lowest index first.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let edge = [a.min(b), a.max(b)];
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Edge list flattened into a line-list index buffer.
    pub fn line_indices(&self) -> Vec<u32> {
        self.edges().into_iter().flatten().collect()
    }

    /// Vertices as flat `[x, y, z]` triples for a vertex buffer.
    pub fn vertex_data(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(|v| v.to_array()).collect()
    }
}

/// Welds vertices shared between neighbouring faces.
#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    lookup: HashMap<[i32; 3], u32>,
}

impl MeshBuilder {
    fn vertex(&mut self, p: Vec3) -> u32 {
        let p = p.normalize();
        let key = [
            (p.x * 1.0e4).round() as i32,
            (p.y * 1.0e4).round() as i32,
            (p.z * 1.0e4).round() as i32,
        ];
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(p);
            (self.vertices.len() - 1) as u32
        })
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_counts(detail: u32) -> (usize, usize, usize) {
        let n = (detail as usize + 1).pow(2);
        (10 * n + 2, 20 * n, 30 * n)
    }

    #[test]
    fn test_icosahedron_counts() {
        let sphere = Icosphere::new(0);
        assert_eq!(sphere.vertices.len(), 12);
        assert_eq!(sphere.triangle_count(), 20);
        assert_eq!(sphere.edges().len(), 30);
    }

    #[test]
    fn test_subdivided_counts() {
        for detail in [1, 2, 4] {
            let sphere = Icosphere::new(detail);
            let (v, t, e) = expected_counts(detail);
            assert_eq!(sphere.vertices.len(), v, "detail {}", detail);
            assert_eq!(sphere.triangle_count(), t, "detail {}", detail);
            assert_eq!(sphere.edges().len(), e, "detail {}", detail);
        }
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let sphere = Icosphere::new(4);
        for v in &sphere.vertices {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_line_indices_pair_up() {
        let sphere = Icosphere::new(1);
        let lines = sphere.line_indices();
        assert_eq!(lines.len(), 240);
        assert!(lines.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }
}
