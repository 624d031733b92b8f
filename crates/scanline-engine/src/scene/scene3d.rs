/// Mesh vertex in 24.8 fixed-point screen space.
///
/// `x`/`y` become pixels after `<< 8` into 16.16; `z` only orders faces.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Vertex3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// `0xRRGGBB`.
    pub color: u32,
}

/// How a 3D scene is rasterised.
///
/// Only the solid-colour modes produce geometry; the others are accepted and
/// drawn as nothing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DrawMode3D {
    Wireframe,
    #[default]
    SolidColor,
    WireframeShaded,
    SolidColorShaded,
    SolidColorShadedBlended,
    WireframeScreen,
    SolidColorScreen,
    WireframeShadedScreen,
    SolidColorShadedScreen,
    SolidColorShadedBlendedScreen,
}

impl DrawMode3D {
    #[inline]
    pub fn draws_solid_faces(self) -> bool {
        matches!(
            self,
            DrawMode3D::SolidColor | DrawMode3D::SolidColorShaded | DrawMode3D::SolidColorShadedBlended
        )
    }
}

/// A face ready for sorting: its depth and where its vertices start.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Face3D {
    pub depth: i32,
    pub first_vertex: u32,
    pub vertex_count: u8,
}

/// A flat list of faces sharing one vertex array.
///
/// Faces are stored as consecutive runs of vertices; `face_vertex_counts[i]`
/// is the length of face `i`'s run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene3D {
    pub vertices: Vec<Vertex3D>,
    pub face_vertex_counts: Vec<u8>,
    pub draw_mode: DrawMode3D,
}

impl Scene3D {
    pub fn new(draw_mode: DrawMode3D) -> Self {
        Self {
            draw_mode,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.face_vertex_counts.clear();
    }

    /// Appends one face. Faces of more than 255 vertices are truncated.
    pub fn add_face(&mut self, vertices: &[Vertex3D]) {
        let n = vertices.len().min(u8::MAX as usize);
        if n == 0 {
            return;
        }
        self.vertices.extend_from_slice(&vertices[..n]);
        self.face_vertex_counts.push(n as u8);
    }

    /// Faces in submission order with their depths.
    ///
    /// A face whose run would overrun the vertex array ends the list.
    pub fn faces(&self) -> Vec<Face3D> {
        let mut out = Vec::with_capacity(self.face_vertex_counts.len());
        let mut first = 0usize;

        for &count in &self.face_vertex_counts {
            let end = first + count as usize;
            let Some(run) = self.vertices.get(first..end) else { break };

            out.push(Face3D {
                depth: face_depth(run),
                first_vertex: first as u32,
                vertex_count: count,
            });
            first = end;
        }
        out
    }

    /// Faces ordered back to front (descending depth, ties keep submission order).
    pub fn sorted_faces(&self) -> Vec<Face3D> {
        let mut faces = self.faces();
        sort_back_to_front(&mut faces);
        faces
    }

    /// Index count of the triangle fans for `faces`.
    pub fn fan_index_count(faces: &[Face3D]) -> usize {
        faces
            .iter()
            .map(|f| 3 * (f.vertex_count as usize).saturating_sub(2))
            .sum()
    }

    /// Writes one triangle fan per face into `out` (indices relative to vertex 0).
    ///
    /// Returns the number of indices written. `out` must hold at least
    /// [`Scene3D::fan_index_count`] entries.
    pub fn write_fan_indices(faces: &[Face3D], out: &mut [u16]) -> usize {
        let mut i = 0;
        for face in faces {
            let base = face.first_vertex as u16;
            for v in 1..(face.vertex_count as u16).saturating_sub(1) {
                out[i] = base;
                out[i + 1] = base + v;
                out[i + 2] = base + v + 1;
                i += 3;
            }
        }
        i
    }
}

/// Depth of a face from its vertices, averaged with right shifts.
///
/// The shift order matters: it reproduces the rounding of the fixed-point
/// format exactly, including the uneven weighting of three-vertex faces.
pub fn face_depth(vertices: &[Vertex3D]) -> i32 {
    match vertices {
        [a, b] => (a.z >> 1) + (b.z >> 1),
        [a, b, c] => (((a.z >> 1) + (b.z >> 1)) >> 1) + (c.z >> 1),
        [a, b, c, d] => (a.z >> 2) + (b.z >> 2) + (c.z >> 2) + (d.z >> 2),
        [first, ..] => first.z,
        [] => 0,
    }
}

/// Stable insertion sort, descending depth.
pub fn sort_back_to_front(faces: &mut [Face3D]) {
    for i in 1..faces.len() {
        let item = faces[i];
        let mut j = i;
        while j > 0 && faces[j - 1].depth < item.depth {
            faces[j] = faces[j - 1];
            j -= 1;
        }
        faces[j] = item;
    }
}
