//! Frame-to-terrain pipeline.
//!
//! One transport message in, at most one installed mesh out. A frame that
//! fails to decode is logged and dropped; the installed mesh stays current.

use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::error::FrameError;
use crate::frame::decode_frame;
use crate::mesh::{mesh_grid_with_stats, MeshStats};
use crate::terrain::{Placement, SwapStats, TerrainMesh, TerrainRenderer, TerrainSlot};

/// Decode and mesh one frame. Pure; installs nothing.
pub fn build_terrain(
    bytes: &[u8],
    config: &StreamConfig,
    generation: u64,
) -> Result<(TerrainMesh, MeshStats), FrameError> {
    let frame = decode_frame(bytes, &config.decoder)?;
    let grid = frame.grid();
    if !grid.is_complete() {
        debug!(
            have = frame.occupancy.len(),
            need = grid.required_bytes(),
            "occupancy buffer shorter than grid, missing cells read as empty"
        );
    }

    let metadata = &frame.metadata;
    let (mesh, stats) = mesh_grid_with_stats(&grid, metadata.resolution, metadata.origin, &config.atlas);
    let terrain = TerrainMesh {
        generation,
        mesh,
        placement: Placement::from_metadata(metadata),
    };
    Ok((terrain, stats))
}

/// Statistics for the lifetime of a stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamStats {
    /// Frames handed to the stream.
    pub frames_received: u64,
    /// Frames that produced an installed mesh.
    pub frames_meshed: u64,
    /// Frames dropped because they failed to decode.
    pub frames_rejected: u64,
    /// Statistics of the most recent mesh.
    pub last_mesh: Option<MeshStats>,
}

/// Single-threaded driver: decode, mesh and install each frame in turn.
#[derive(Debug)]
pub struct VoxelStream {
    config: StreamConfig,
    slot: TerrainSlot,
    stats: StreamStats,
}

impl VoxelStream {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            slot: TerrainSlot::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// The currently installed terrain, if any frame has succeeded yet.
    pub fn current(&self) -> Option<&TerrainMesh> {
        self.slot.current()
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn swap_stats(&self) -> &SwapStats {
        self.slot.stats()
    }

    /// Process one frame and install the result.
    ///
    /// Returns the displaced mesh so the caller can release its renderer
    /// resources. On error nothing is installed.
    pub fn push_frame(&mut self, bytes: &[u8]) -> Result<Option<TerrainMesh>, FrameError> {
        let terrain = self.build_frame(bytes)?;
        Ok(self.slot.install(terrain))
    }

    /// Process one frame and hand it to `renderer`, disposing the old mesh.
    pub fn push_frame_into<R: TerrainRenderer>(
        &mut self,
        bytes: &[u8],
        renderer: &mut R,
    ) -> Result<(), FrameError> {
        let terrain = self.build_frame(bytes)?;
        self.slot.install_into(terrain, renderer);
        Ok(())
    }

    /// Drop the installed mesh.
    pub fn reset(&mut self) -> Option<TerrainMesh> {
        self.slot.clear()
    }

    /// Decode and mesh one frame, counting it in the stream statistics, but
    /// hand the mesh to the caller instead of installing it.
    ///
    /// For hosts that keep the displayed mesh themselves.
    pub fn build_frame(&mut self, bytes: &[u8]) -> Result<TerrainMesh, FrameError> {
        self.stats.frames_received += 1;
        let generation = self.stats.frames_received;

        match build_terrain(bytes, &self.config, generation) {
            Ok((terrain, mesh_stats)) => {
                debug!(
                    generation,
                    voxels = mesh_stats.voxel_count,
                    faces = mesh_stats.face_count,
                    hidden = mesh_stats.hidden_faces,
                    "meshed voxel frame"
                );
                self.stats.frames_meshed += 1;
                self.stats.last_mesh = Some(mesh_stats);
                Ok(terrain)
            }
            Err(err) => {
                warn!(generation, error = %err, "dropping voxel frame");
                self.stats.frames_rejected += 1;
                Err(err)
            }
        }
    }
}

impl Default for VoxelStream {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderConfig;
    use crate::frame::{encode_frame, FrameMetadata};
    use crate::grid::pack_dense;

    fn frame(width: u32, cells: &[bool]) -> Vec<u8> {
        let metadata = FrameMetadata {
            resolution: 0.1,
            origin: [0.0; 3],
            width,
        };
        let dims = [width as usize, width as usize, 30];
        encode_frame(&metadata, &pack_dense(cells, dims), &DecoderConfig::default()).unwrap()
    }

    #[test]
    fn push_frame_installs_mesh() {
        let mut stream = VoxelStream::default();
        let bytes = frame(2, &[true]);

        assert!(stream.push_frame(&bytes).unwrap().is_none());
        let current = stream.current().unwrap();
        assert_eq!(current.generation, 1);
        assert_eq!(current.mesh.voxel_count(), 1);
        assert_eq!(current.mesh.face_count(), 6);
        assert_eq!(current.placement.scale, 0.1);
    }

    #[test]
    fn new_frame_supersedes_previous() {
        let mut stream = VoxelStream::default();
        stream.push_frame(&frame(2, &[true])).unwrap();
        let previous = stream.push_frame(&frame(2, &[true, true])).unwrap().unwrap();

        assert_eq!(previous.generation, 1);
        assert_eq!(stream.current().unwrap().mesh.face_count(), 10);
        assert_eq!(stream.swap_stats().meshes_disposed, 1);
    }

    #[test]
    fn malformed_frame_keeps_previous_mesh() {
        let mut stream = VoxelStream::default();
        stream.push_frame(&frame(2, &[true])).unwrap();

        let mut bad = vec![5u8, 0, 0, 0];
        bad.extend_from_slice(b"{oops");
        assert!(stream.push_frame(&bad).is_err());

        assert_eq!(stream.current().unwrap().generation, 1);
        assert_eq!(stream.stats().frames_received, 2);
        assert_eq!(stream.stats().frames_meshed, 1);
        assert_eq!(stream.stats().frames_rejected, 1);
    }

    #[test]
    fn build_terrain_reports_stats() {
        let (terrain, stats) = build_terrain(&frame(2, &[true, true]), &StreamConfig::default(), 9).unwrap();
        assert_eq!(terrain.generation, 9);
        assert_eq!(stats.voxel_count, 2);
        assert_eq!(stats.hidden_faces, 2);
    }

    #[test]
    fn build_frame_counts_without_installing() {
        let mut stream = VoxelStream::default();
        let terrain = stream.build_frame(&frame(2, &[true])).unwrap();
        assert_eq!(terrain.generation, 1);
        assert!(stream.build_frame(&[1, 0, 0, 0, b'x']).is_err());

        assert!(stream.current().is_none());
        assert_eq!(stream.stats().frames_meshed, 1);
        assert_eq!(stream.stats().frames_rejected, 1);
        assert_eq!(stream.swap_stats().meshes_swapped, 0);
    }

    #[test]
    fn reset_clears_current() {
        let mut stream = VoxelStream::default();
        stream.push_frame(&frame(1, &[true])).unwrap();
        assert!(stream.reset().is_some());
        assert!(stream.current().is_none());
    }
}
