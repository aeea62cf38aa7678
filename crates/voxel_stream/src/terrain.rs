//! Installed-terrain bookkeeping.
//!
//! Exactly one terrain mesh is current at a time. Installing a new one is a
//! single swap; the displaced mesh is handed back (or to the renderer) for
//! disposal in the same step, so two meshes are never current together.

use glam::Vec3;

use crate::core::VoxelMesh;
use crate::frame::FrameMetadata;

/// Scale used when a frame reports a zero or NaN resolution.
pub const DEFAULT_RESOLUTION: f32 = 0.1;

/// How the renderer places grid-local positions in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Uniform scale: meters per voxel edge.
    pub scale: f32,
    /// World position of grid cell `(0, 0, 0)`.
    pub translation: Vec3,
}

impl Placement {
    pub fn from_metadata(metadata: &FrameMetadata) -> Self {
        let resolution = metadata.resolution as f32;
        let scale = if resolution == 0.0 || resolution.is_nan() {
            DEFAULT_RESOLUTION
        } else {
            resolution
        };
        let [x, y, z] = metadata.origin;
        Self {
            scale,
            translation: Vec3::new(x as f32, y as f32, z as f32),
        }
    }

    /// World-space position of a grid-local point.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local * self.scale + self.translation
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            scale: DEFAULT_RESOLUTION,
            translation: Vec3::ZERO,
        }
    }
}

/// A finished mesh together with its placement.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    /// Sequence number of the frame this mesh was built from.
    pub generation: u64,
    pub mesh: VoxelMesh,
    pub placement: Placement,
}

/// Rendering collaborator that displays terrain meshes.
pub trait TerrainRenderer {
    /// Release every resource owned by a mesh that is no longer current.
    fn dispose(&mut self, mesh: TerrainMesh);

    /// Show `mesh` as the current terrain.
    fn present(&mut self, mesh: &TerrainMesh);
}

/// Statistics from mesh swap operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStats {
    /// Number of meshes installed.
    pub meshes_swapped: usize,
    /// Number of displaced meshes handed off for disposal.
    pub meshes_disposed: usize,
}

impl SwapStats {
    /// Check if any swaps occurred.
    pub fn any_swapped(&self) -> bool {
        self.meshes_swapped > 0
    }
}

/// Owner of the currently installed terrain mesh.
#[derive(Debug, Default)]
pub struct TerrainSlot {
    current: Option<TerrainMesh>,
    stats: SwapStats,
}

impl TerrainSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The installed mesh, if any.
    pub fn current(&self) -> Option<&TerrainMesh> {
        self.current.as_ref()
    }

    pub fn stats(&self) -> &SwapStats {
        &self.stats
    }

    /// Install `mesh`, returning the displaced mesh for disposal.
    pub fn install(&mut self, mesh: TerrainMesh) -> Option<TerrainMesh> {
        let previous = self.current.replace(mesh);
        self.stats.meshes_swapped += 1;
        if previous.is_some() {
            self.stats.meshes_disposed += 1;
        }
        previous
    }

    /// Install `mesh` and hand it to `renderer`, disposing the old one first.
    pub fn install_into<R: TerrainRenderer>(&mut self, mesh: TerrainMesh, renderer: &mut R) {
        if let Some(previous) = self.install(mesh) {
            renderer.dispose(previous);
        }
        if let Some(current) = self.current.as_ref() {
            renderer.present(current);
        }
    }

    /// Remove the installed mesh, e.g. when the stream disconnects.
    pub fn clear(&mut self) -> Option<TerrainMesh> {
        let previous = self.current.take();
        if previous.is_some() {
            self.stats.meshes_disposed += 1;
        }
        previous
    }
}
