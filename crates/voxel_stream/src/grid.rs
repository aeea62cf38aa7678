//! Bit-addressable view over a packed occupancy buffer.
//!
//! Addressing law: cell `(x, y, z)` has linear index
//! `size_x * size_y * z + size_x * y + x`, stored in byte `index / 8` at bit
//! `index % 8`, counted from the most significant bit.
//!
//! Any query outside the grid, or past the end of the buffer, reads as
//! unoccupied. Truncated buffers and neighbor lookups at the edge never fail.

/// Read bit `offset` (0 = most significant) of `byte`.
#[inline]
pub fn bit_at(byte: u8, offset: u32) -> bool {
    (byte >> (7 - offset)) & 1 != 0
}

/// Read-only occupancy grid borrowed from a decoded frame.
#[derive(Clone, Copy, Debug)]
pub struct VoxelGrid<'a> {
    bits: &'a [u8],
    dims: [usize; 3],
}

impl<'a> VoxelGrid<'a> {
    /// Wrap `bits` as a grid of `dims = [size_x, size_y, size_z]` cells.
    ///
    /// The buffer may be shorter than the grid needs; missing cells are empty.
    pub fn new(bits: &'a [u8], dims: [usize; 3]) -> Self {
        Self { bits, dims }
    }

    /// Grid dimensions `[size_x, size_y, size_z]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// The underlying packed buffer.
    pub fn bits(&self) -> &'a [u8] {
        self.bits
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> u64 {
        self.dims.iter().fold(1u64, |acc, &d| acc.saturating_mul(d as u64))
    }

    /// Number of bytes needed to hold every cell.
    pub fn required_bytes(&self) -> u64 {
        self.cell_count().div_ceil(8)
    }

    /// Whether the buffer covers the full grid.
    pub fn is_complete(&self) -> bool {
        self.bits.len() as u64 >= self.required_bytes()
    }

    /// Linear index of an in-grid cell.
    #[inline]
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> u64 {
        let [sx, sy, _] = self.dims;
        let plane = sx as u64 * sy as u64;
        plane * z as u64 + sx as u64 * y as u64 + x as u64
    }

    /// Cell coordinates of a linear index.
    ///
    /// A grid with a zero X or Y extent has no cells; every index maps to the
    /// origin.
    #[inline]
    pub fn coords(&self, index: u64) -> [usize; 3] {
        let [sx, sy, _] = self.dims;
        let plane = sx as u64 * sy as u64;
        if plane == 0 {
            return [0, 0, 0];
        }
        let z = index / plane;
        let rem = index % plane;
        [(rem % sx as u64) as usize, (rem / sx as u64) as usize, z as usize]
    }

    /// Bit value at a linear index; out-of-buffer reads are empty.
    #[inline]
    pub fn is_set(&self, index: u64) -> bool {
        let byte = index / 8;
        if byte >= self.bits.len() as u64 {
            return false;
        }
        bit_at(self.bits[byte as usize], (index % 8) as u32)
    }

    /// Occupancy with the open-boundary policy applied.
    #[inline]
    pub fn is_occupied(&self, x: i64, y: i64, z: i64) -> bool {
        let [sx, sy, sz] = self.dims;
        if x < 0 || y < 0 || z < 0 {
            return false;
        }
        let (ux, uy, uz) = (x as u64, y as u64, z as u64);
        if ux >= sx as u64 || uy >= sy as u64 || uz >= sz as u64 {
            return false;
        }
        self.is_set(self.linear_index(ux as usize, uy as usize, uz as usize))
    }

    /// Linear indices of occupied cells in ascending order.
    pub fn occupied_indices(&self) -> impl Iterator<Item = u64> + 'a {
        let limit = self.cell_count();
        let bits = self.bits;
        bits.iter()
            .enumerate()
            .filter(|&(_, &byte)| byte != 0)
            .flat_map(move |(byte_idx, &byte)| {
                (0..8u32)
                    .filter(move |&offset| bit_at(byte, offset))
                    .map(move |offset| byte_idx as u64 * 8 + offset as u64)
            })
            .take_while(move |&index| index < limit)
    }

    /// Count occupied cells inside the grid.
    pub fn occupied_count(&self) -> usize {
        self.occupied_indices().count()
    }
}

/// Pack a dense occupancy volume into an MSB-first bit buffer.
///
/// `cells[x + y * size_x + z * size_x * size_y]` is the occupancy of `(x, y, z)`.
///
/// # Example
/// ```
/// use voxel_stream::grid::{pack_dense, VoxelGrid};
///
/// let cells = [true, false, false, true];
/// let bits = pack_dense(&cells, [2, 2, 1]);
/// assert_eq!(bits, vec![0b1001_0000]);
///
/// let grid = VoxelGrid::new(&bits, [2, 2, 1]);
/// assert!(grid.is_occupied(1, 1, 0));
/// ```
pub fn pack_dense(cells: &[bool], dims: [usize; 3]) -> Vec<u8> {
    let total = dims[0] * dims[1] * dims[2];
    let mut bits = vec![0u8; total.div_ceil(8)];
    for (index, _) in cells.iter().take(total).enumerate().filter(|&(_, &c)| c) {
        bits[index / 8] |= 0x80 >> (index % 8);
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_order_is_msb_first() {
        assert!(bit_at(0b1000_0000, 0));
        assert!(!bit_at(0b1000_0000, 1));
        assert!(bit_at(0b0000_0001, 7));
        assert!(bit_at(0b0010_0000, 2));
    }

    #[test]
    fn linear_index_layout() {
        let grid = VoxelGrid::new(&[], [4, 3, 2]);
        assert_eq!(grid.linear_index(0, 0, 0), 0);
        assert_eq!(grid.linear_index(1, 0, 0), 1);
        assert_eq!(grid.linear_index(0, 1, 0), 4);
        assert_eq!(grid.linear_index(0, 0, 1), 12);
        assert_eq!(grid.linear_index(3, 2, 1), 23);
        assert_eq!(grid.coords(23), [3, 2, 1]);
        assert_eq!(grid.coords(5), [1, 1, 0]);
    }

    #[test]
    fn reads_cell_from_bit_position() {
        // index 9 -> byte 1, bit 1
        let bits = [0u8, 0b0100_0000];
        let grid = VoxelGrid::new(&bits, [4, 4, 1]);
        assert!(grid.is_occupied(1, 2, 0));
        assert!(!grid.is_occupied(0, 2, 0));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn out_of_grid_is_empty() {
        let bits = [0xFFu8; 4];
        let grid = VoxelGrid::new(&bits, [2, 2, 2]);
        assert!(grid.is_occupied(0, 0, 0));
        assert!(grid.is_occupied(1, 1, 1));
        assert!(!grid.is_occupied(-1, 0, 0));
        assert!(!grid.is_occupied(0, -1, 0));
        assert!(!grid.is_occupied(0, 0, -1));
        assert!(!grid.is_occupied(2, 0, 0));
        assert!(!grid.is_occupied(0, 2, 0));
        assert!(!grid.is_occupied(0, 0, 2));
    }

    #[test]
    fn truncated_buffer_reads_empty() {
        let bits = [0xFFu8];
        let grid = VoxelGrid::new(&bits, [4, 4, 1]);
        assert!(!grid.is_complete());
        assert_eq!(grid.required_bytes(), 2);
        assert!(grid.is_occupied(3, 1, 0));
        assert!(!grid.is_occupied(0, 2, 0));
        assert_eq!(grid.occupied_count(), 8);
    }

    #[test]
    fn trailing_bits_past_grid_are_ignored() {
        // 3 cells declared, 8 bits set
        let bits = [0xFFu8];
        let grid = VoxelGrid::new(&bits, [3, 1, 1]);
        assert_eq!(grid.occupied_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn occupied_indices_ascend() {
        let bits = [0b0000_0001, 0, 0b1000_0001];
        let grid = VoxelGrid::new(&bits, [8, 3, 1]);
        assert_eq!(grid.occupied_indices().collect::<Vec<_>>(), vec![7, 16, 23]);
    }

    #[test]
    fn zero_sized_grid_is_empty() {
        let bits = [0xFFu8; 2];
        let grid = VoxelGrid::new(&bits, [0, 0, 30]);
        assert_eq!(grid.cell_count(), 0);
        assert_eq!(grid.occupied_count(), 0);
        assert!(!grid.is_occupied(0, 0, 0));
        assert_eq!(grid.coords(5), [0, 0, 0]);
        assert_eq!(VoxelGrid::new(&[], [0, 4, 4]).coords(0), [0, 0, 0]);
    }

    #[test]
    fn pack_dense_matches_grid_reads() {
        let dims = [3, 2, 2];
        let cells: Vec<bool> = (0..12).map(|i| i % 5 == 0).collect();
        let bits = pack_dense(&cells, dims);
        let grid = VoxelGrid::new(&bits, dims);

        for z in 0..2 {
            for y in 0..2 {
                for x in 0..3 {
                    let i = x + y * 3 + z * 6;
                    assert_eq!(grid.is_occupied(x as i64, y as i64, z as i64), cells[i]);
                }
            }
        }
    }
}
