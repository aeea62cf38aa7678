//! Voxel-stream decoding and terrain meshing.
//!
//! The robot publishes a bit-packed occupancy grid (128x128x30 by default)
//! several times a second. This crate parses each frame and turns it into a
//! face-culled triangle surface that replaces the previously displayed
//! terrain.
//!
//! # Example
//!
//! ```
//! use voxel_stream::{encode_frame, pack_dense, DecoderConfig, FrameMetadata, VoxelStream};
//!
//! let metadata = FrameMetadata { resolution: 0.1, origin: [0.0; 3], width: 2 };
//! let bits = pack_dense(&[true, true], [2, 2, 30]);
//! let bytes = encode_frame(&metadata, &bits, &DecoderConfig::default()).unwrap();
//!
//! let mut stream = VoxelStream::default();
//! stream.push_frame(&bytes).unwrap();
//!
//! let terrain = stream.current().unwrap();
//! assert_eq!(terrain.mesh.face_count(), 10); // 6 + 6 - 2 shared
//! ```

pub mod config;
pub mod core;
pub mod cull;
pub mod error;
pub mod frame;
pub mod grid;
pub mod mesh;
pub mod palette;
pub mod pipeline;
pub mod protocol;
pub mod terrain;
#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

// Re-export primary types
pub use crate::config::{AtlasLayout, DecoderConfig, StreamConfig, MAX_METADATA_OFFSET};
pub use crate::core::{
    FaceCorner, FaceDesc, VoxelMesh,
    // Constants
    ATLAS_TILES, FACES, QUAD_INDICES,
    FACE_NEG_X, FACE_POS_X, FACE_NEG_Y, FACE_POS_Y, FACE_NEG_Z, FACE_POS_Z,
};
pub use crate::error::{ConfigError, FrameError};
pub use crate::frame::{decode_frame, encode_frame, split_frame, FrameMetadata, RawFrame, VoxelFrame};
pub use crate::grid::{pack_dense, VoxelGrid};
pub use crate::palette::{height_band, tile_colors};
pub use crate::protocol::{ChannelRequest, IncomingKind, VOXEL_TOPIC};
pub use crate::terrain::{Placement, SwapStats, TerrainMesh, TerrainRenderer, TerrainSlot};

// Re-export main entry points
pub use crate::mesh::{mesh_grid, mesh_grid_with_stats, MeshStats};
pub use crate::pipeline::{build_terrain, StreamStats, VoxelStream};
#[cfg(not(target_arch = "wasm32"))]
pub use crate::worker::FrameWorker;
