//! Main meshing pipeline.
//!
//! Scans every cell in ascending linear-index order and, for each occupied
//! voxel, emits one quad per visible face:
//! 1. Face culling against the six axis neighbors
//! 2. Height-band lookup for the voxel's atlas tile
//! 3. Quad emission from the static face table
//!
//! Vertices are not shared between faces, and the scan order fixes the
//! vertex order, so meshing the same grid twice gives identical output.

use crate::config::AtlasLayout;
use crate::core::{VoxelMesh, FACES};
use crate::cull::visible_faces;
use crate::grid::VoxelGrid;
use crate::palette::height_band;

/// Mesh an occupancy grid into a textured surface.
///
/// Only faces between a solid voxel and empty space are emitted, so the
/// result is the closed outer surface of the occupied set. Positions are in
/// grid units; `resolution` and `origin` only drive the height banding.
///
/// # Example
/// ```
/// use voxel_stream::config::AtlasLayout;
/// use voxel_stream::grid::{pack_dense, VoxelGrid};
/// use voxel_stream::mesh_grid;
///
/// let bits = pack_dense(&[true], [1, 1, 1]);
/// let grid = VoxelGrid::new(&bits, [1, 1, 1]);
///
/// let mesh = mesh_grid(&grid, 0.1, [0.0; 3], &AtlasLayout::default());
/// assert_eq!(mesh.triangle_count(), 12); // Cube = 6 faces x 2 triangles
/// ```
pub fn mesh_grid(
    grid: &VoxelGrid,
    resolution: f64,
    origin: [f64; 3],
    atlas: &AtlasLayout,
) -> VoxelMesh {
    build_mesh(grid, resolution, origin, atlas).0
}

/// Single culling pass producing the mesh and its per-direction face counts.
fn build_mesh(
    grid: &VoxelGrid,
    resolution: f64,
    origin: [f64; 3],
    atlas: &AtlasLayout,
) -> (VoxelMesh, [usize; 6]) {
    let mut output = VoxelMesh::default();
    let mut faces_per_direction = [0usize; 6];
    let mut voxel_count = 0;

    for index in grid.occupied_indices() {
        voxel_count += 1;
        let [x, y, z] = grid.coords(index);
        let mask = visible_faces(grid, x, y, z);
        if mask == 0 {
            continue;
        }

        let tile = height_band(z, resolution, origin[2]);
        let base = [x as f32, y as f32, z as f32];

        for (face, desc) in FACES.iter().enumerate() {
            if mask & (1 << face) == 0 {
                continue;
            }
            faces_per_direction[face] += 1;
            let corners = desc.corners.map(|c| {
                [
                    base[0] + c.pos[0] as f32,
                    base[1] + c.pos[1] as f32,
                    base[2] + c.pos[2] as f32,
                ]
            });
            let uvs = desc.corners.map(|c| atlas.uv(tile, c.uv));
            output.push_quad(corners, uvs);
        }
    }

    output.set_voxel_count(voxel_count);
    (output, faces_per_direction)
}

/// Statistics about a mesh result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshStats {
    /// Occupied voxels in the grid
    pub voxel_count: usize,
    /// Visible faces per direction, indexed like `FACES`
    pub faces_per_direction: [usize; 6],
    /// Total emitted faces
    pub face_count: usize,
    /// Faces removed because a solid neighbor covers them
    pub hidden_faces: usize,
    /// Total vertices
    pub vertex_count: usize,
    /// Total triangles
    pub triangle_count: usize,
    /// Share of all voxel faces that were culled (0.0 = none, 1.0 = all)
    pub cull_ratio: f32,
}

/// Mesh a grid and return statistics along with the mesh.
pub fn mesh_grid_with_stats(
    grid: &VoxelGrid,
    resolution: f64,
    origin: [f64; 3],
    atlas: &AtlasLayout,
) -> (VoxelMesh, MeshStats) {
    let (mesh, faces_per_direction) = build_mesh(grid, resolution, origin, atlas);
    let face_count: usize = faces_per_direction.iter().sum();

    let max_faces = mesh.voxel_count() * FACES.len();
    let hidden_faces = max_faces - face_count;
    let cull_ratio = if max_faces > 0 {
        hidden_faces as f32 / max_faces as f32
    } else {
        0.0
    };

    let stats = MeshStats {
        voxel_count: mesh.voxel_count(),
        faces_per_direction,
        face_count,
        hidden_faces,
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        cull_ratio,
    };

    (mesh, stats)
}
