use std::collections::BTreeSet;

/// Line-list wireframe of a subdivided box.
#[derive(Debug, Clone, Default)]
pub struct WireframeMesh {
    pub positions: Vec<[f32; 3]>,
    /// Pairs of indices into `positions`, one pair per line segment.
    pub indices: Vec<u32>,
}

impl WireframeMesh {
    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }
}

/// One face of the box: the two in-plane axes with their directions, and the
/// normal axis with the side of the box it sits on.
struct Face {
    u: usize,
    v: usize,
    w: usize,
    u_dir: f32,
    v_dir: f32,
    w_dir: f32,
}

#[rustfmt::skip]
const FACES: [Face; 6] = [
    Face { u: 2, v: 1, w: 0, u_dir: -1.0, v_dir: -1.0, w_dir:  1.0 }, // +X
    Face { u: 2, v: 1, w: 0, u_dir:  1.0, v_dir: -1.0, w_dir: -1.0 }, // -X
    Face { u: 0, v: 2, w: 1, u_dir:  1.0, v_dir:  1.0, w_dir:  1.0 }, // +Y
    Face { u: 0, v: 2, w: 1, u_dir:  1.0, v_dir: -1.0, w_dir: -1.0 }, // -Y
    Face { u: 0, v: 1, w: 2, u_dir:  1.0, v_dir: -1.0, w_dir:  1.0 }, // +Z
    Face { u: 0, v: 1, w: 2, u_dir: -1.0, v_dir: -1.0, w_dir: -1.0 }, // -Z
];

/// Wireframe of a cube with edge length `size`, each face split into
/// `segments` x `segments` quads.
///
/// Every quad is drawn as its two triangles' edges, so each cell shows a
/// diagonal. Edges shared by two triangles of the same face appear once.
pub fn wireframe_box(size: f32, segments: u32) -> WireframeMesh {
    let segments = segments.max(1);
    let half = size / 2.0;
    let step = size / segments as f32;
    let row = segments + 1;

    let mut mesh = WireframeMesh::default();
    let mut edges = BTreeSet::new();

    for face in &FACES {
        let base = mesh.positions.len() as u32;

        for iy in 0..=segments {
            let y = iy as f32 * step - half;
            for ix in 0..=segments {
                let x = ix as f32 * step - half;
                let mut p = [0.0; 3];
                p[face.u] = x * face.u_dir;
                p[face.v] = y * face.v_dir;
                p[face.w] = half * face.w_dir;
                mesh.positions.push(p);
            }
        }

        for iy in 0..segments {
            for ix in 0..segments {
                let a = base + ix + row * iy;
                let b = base + ix + row * (iy + 1);
                let c = base + (ix + 1) + row * (iy + 1);
                let d = base + (ix + 1) + row * iy;
                for (p, q) in [(a, b), (b, d), (d, a), (b, c), (c, d)] {
                    edges.insert((p.min(q), p.max(q)));
                }
            }
        }
    }

    mesh.indices = edges.into_iter().flat_map(|(p, q)| [p, q]).collect();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_segment_cube_counts() {
        let mesh = wireframe_box(1.0, 8);
        assert_eq!(mesh.positions.len(), 6 * 9 * 9);
        // Per face: 9 rows x 8 + 9 columns x 8 + 64 diagonals.
        assert_eq!(mesh.line_count(), 6 * (72 + 72 + 64));
    }

    #[test]
    fn vertices_lie_on_the_surface() {
        let mesh = wireframe_box(1.0, 8);
        for p in &mesh.positions {
            let max = p.iter().fold(0.0_f32, |m, c| m.max(c.abs()));
            assert!((max - 0.5).abs() < 1e-6, "{p:?} is not on the surface");
        }
    }

    #[test]
    fn indices_are_in_range() {
        let mesh = wireframe_box(2.0, 3);
        let n = mesh.positions.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 2, 0);
    }

    #[test]
    fn zero_segments_is_a_plain_box() {
        let mesh = wireframe_box(1.0, 0);
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.line_count(), 6 * 5);
    }
}
