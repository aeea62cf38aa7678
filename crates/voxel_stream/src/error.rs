//! Error types for frame decoding and stream configuration.

use thiserror::Error;

/// Invalid decoder or atlas configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("metadata offset must be >= 1 (byte 0 holds the metadata length)")]
    MetadataOffset,

    #[error("metadata offset {offset} exceeds the maximum of {max}")]
    MetadataOffsetTooLarge { offset: usize, max: usize },

    #[error("invalid config JSON: {0}")]
    Json(String),

    #[error("atlas {field} must be > 0")]
    ZeroAtlasSize { field: &'static str },

    #[error("atlas width {texture_width} must equal tile size {tile_size} x {tiles} tiles")]
    AtlasRatio {
        tile_size: u32,
        texture_width: u32,
        tiles: u32,
    },
}

/// A frame that cannot be turned into a mesh.
///
/// Every variant is local to one frame: the frame is dropped and the
/// previously installed mesh stays current.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame truncated: need {needed} bytes for header and metadata, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("metadata is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("metadata is {len} bytes, the length field holds at most 255")]
    MetadataTooLong { len: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
