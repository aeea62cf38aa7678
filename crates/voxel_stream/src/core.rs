//! Core type definitions for the voxel stream mesher.

/// Number of equal-width tiles in the horizontal height-band atlas.
pub const ATLAS_TILES: u32 = 32;

/// Face direction indices, in the order of [`FACES`].
pub const FACE_NEG_X: usize = 0;
pub const FACE_POS_X: usize = 1;
pub const FACE_NEG_Y: usize = 2;
pub const FACE_POS_Y: usize = 3;
pub const FACE_NEG_Z: usize = 4;
pub const FACE_POS_Z: usize = 5;

/// Local index pattern for the two triangles of an emitted quad.
///
/// Both triangles share the `v1`-`v2` diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// One corner of a face: offset inside the unit cube plus its atlas corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceCorner {
    /// Corner offset in local cube coordinates, each component 0 or 1.
    pub pos: [u8; 3],
    /// Corner within a single atlas tile, each component 0 or 1.
    pub uv: [u8; 2],
}

/// Static description of one cube face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceDesc {
    /// Unit offset to the neighbor that hides this face.
    pub dir: [i8; 3],
    /// The four corners, ordered so [`QUAD_INDICES`] winds outward.
    pub corners: [FaceCorner; 4],
}

const fn corner(pos: [u8; 3], uv: [u8; 2]) -> FaceCorner {
    FaceCorner { pos, uv }
}

/// Face table indexed by `FACE_*` direction.
pub const FACES: [FaceDesc; 6] = [
    // -X
    FaceDesc {
        dir: [-1, 0, 0],
        corners: [
            corner([0, 1, 0], [0, 1]),
            corner([0, 0, 0], [1, 1]),
            corner([0, 1, 1], [0, 0]),
            corner([0, 0, 1], [1, 0]),
        ],
    },
    // +X
    FaceDesc {
        dir: [1, 0, 0],
        corners: [
            corner([1, 1, 1], [1, 0]),
            corner([1, 0, 1], [0, 0]),
            corner([1, 1, 0], [1, 1]),
            corner([1, 0, 0], [0, 1]),
        ],
    },
    // -Y
    FaceDesc {
        dir: [0, -1, 0],
        corners: [
            corner([1, 0, 1], [1, 0]),
            corner([0, 0, 1], [0, 0]),
            corner([1, 0, 0], [1, 1]),
            corner([0, 0, 0], [0, 1]),
        ],
    },
    // +Y
    FaceDesc {
        dir: [0, 1, 0],
        corners: [
            corner([0, 1, 1], [0, 0]),
            corner([1, 1, 1], [1, 0]),
            corner([0, 1, 0], [0, 1]),
            corner([1, 1, 0], [1, 1]),
        ],
    },
    // -Z
    FaceDesc {
        dir: [0, 0, -1],
        corners: [
            corner([1, 0, 0], [0, 0]),
            corner([0, 0, 0], [1, 0]),
            corner([1, 1, 0], [0, 1]),
            corner([0, 1, 0], [1, 1]),
        ],
    },
    // +Z
    FaceDesc {
        dir: [0, 0, 1],
        corners: [
            corner([0, 0, 1], [0, 0]),
            corner([1, 0, 1], [1, 0]),
            corner([0, 1, 1], [0, 1]),
            corner([1, 1, 1], [1, 1]),
        ],
    },
];

/// Renderable surface produced from one voxel frame.
///
/// Positions are in grid-local units (one unit per voxel edge); the renderer
/// applies the frame's resolution as scale and its origin as translation.
/// A mesh is built once by the mesher and never mutated afterwards.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct VoxelMesh {
    positions: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
    voxel_count: usize,
}

impl VoxelMesh {
    /// Append one quad: four vertices with their UVs and two triangles.
    pub(crate) fn push_quad(&mut self, corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4]) {
        let base_vertex = self.vertex_count() as u32;
        for (pos, uv) in corners.iter().zip(uvs.iter()) {
            self.positions.extend_from_slice(pos);
            self.uvs.extend_from_slice(uv);
        }
        self.indices
            .extend(QUAD_INDICES.iter().map(|&i| base_vertex + i));
    }

    pub(crate) fn set_voxel_count(&mut self, voxel_count: usize) {
        self.voxel_count = voxel_count;
    }

    /// Vertex positions (3 floats per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Atlas texture coordinates (2 floats per vertex).
    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// Triangle indices (3 per triangle).
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of occupied voxels in the source frame.
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of emitted quad faces.
    pub fn face_count(&self) -> usize {
        self.indices.len() / QUAD_INDICES.len()
    }

    /// Check if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw position bytes for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw UV bytes for GPU upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw index bytes for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Approximate heap usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.positions.len() * 4 + self.uvs.len() * 4 + self.indices.len() * 4
    }

    /// Consume the mesh, yielding `(positions, uvs, indices, voxel_count)`.
    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>, Vec<u32>, usize) {
        (self.positions, self.uvs, self.indices, self.voxel_count)
    }
}
