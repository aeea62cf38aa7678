//! Hidden-face culling.
//!
//! A face is visible when the voxel is solid AND the neighbor across that
//! face is empty. Out-of-grid neighbors are empty, so edge voxels keep their
//! outward faces.

use crate::core::FACES;
use crate::grid::VoxelGrid;

/// Bitmask of visible faces, bit `n` set for `FACES[n]`.
pub type FaceMask = u8;

/// All six faces visible.
pub const ALL_FACES: FaceMask = 0b0011_1111;

/// Visible faces of the solid voxel at `(x, y, z)`.
#[inline]
pub fn visible_faces(grid: &VoxelGrid, x: usize, y: usize, z: usize) -> FaceMask {
    let (x, y, z) = (x as i64, y as i64, z as i64);
    let mut mask = 0;
    for (face, desc) in FACES.iter().enumerate() {
        let [dx, dy, dz] = desc.dir;
        if !grid.is_occupied(x + dx as i64, y + dy as i64, z + dz as i64) {
            mask |= 1 << face;
        }
    }
    mask
}

/// Count visible faces per direction over the whole grid.
/// Useful for statistics and debugging.
pub fn count_visible_faces(grid: &VoxelGrid) -> [usize; 6] {
    let mut counts = [0usize; 6];
    for index in grid.occupied_indices() {
        let [x, y, z] = grid.coords(index);
        let mask = visible_faces(grid, x, y, z);
        for (face, count) in counts.iter_mut().enumerate() {
            if mask & (1 << face) != 0 {
                *count += 1;
            }
        }
    }
    counts
}
