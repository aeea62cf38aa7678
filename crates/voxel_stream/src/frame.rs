//! Voxel frame decoding.
//!
//! Wire layout of one frame:
//!
//! ```text
//! offset 0        1 byte    metadata length L (0..=255)
//! offset 1..4     3 bytes   reserved, ignored
//! offset 4        L bytes   metadata JSON
//! offset 4 + L    rest      occupancy bits, MSB-first
//! ```
//!
//! The single length byte caps metadata at 255 bytes. That is a ceiling of
//! the robot's wire format and is kept as-is.

use serde::{Deserialize, Serialize};

use crate::config::DecoderConfig;
use crate::error::FrameError;
use crate::grid::VoxelGrid;

/// Largest metadata text the length byte can describe.
pub const MAX_METADATA_LEN: usize = u8::MAX as usize;

/// Placement of the voxel grid in world space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Edge length of one voxel in meters.
    pub resolution: f64,
    /// World-space position of grid cell `(0, 0, 0)`.
    pub origin: [f64; 3],
    /// Grid edge length in voxels along X and Y.
    pub width: u32,
}

/// The robot wraps the record in `{"data": {...}}`; bare records are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataDocument {
    Envelope { data: FrameMetadata },
    Bare(FrameMetadata),
}

impl FrameMetadata {
    /// Parse metadata JSON text.
    pub fn from_json(text: &str) -> Result<Self, FrameError> {
        let doc: MetadataDocument = serde_json::from_str(text)?;
        Ok(match doc {
            MetadataDocument::Envelope { data } => data,
            MetadataDocument::Bare(metadata) => metadata,
        })
    }
}

/// A frame split into its two byte regions, nothing parsed yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub metadata_text: &'a [u8],
    pub occupancy: &'a [u8],
}

/// Split a frame at the declared metadata length.
pub fn split_frame<'a>(bytes: &'a [u8], config: &DecoderConfig) -> Result<RawFrame<'a>, FrameError> {
    config.validate()?;
    let offset = config.metadata_offset;
    let Some(&len) = bytes.first() else {
        return Err(FrameError::Truncated { needed: offset, actual: 0 });
    };
    let Some(end) = offset.checked_add(len as usize) else {
        return Err(FrameError::Truncated {
            needed: usize::MAX,
            actual: bytes.len(),
        });
    };
    if bytes.len() < end {
        return Err(FrameError::Truncated {
            needed: end,
            actual: bytes.len(),
        });
    }
    Ok(RawFrame {
        metadata_text: &bytes[offset..end],
        occupancy: &bytes[end..],
    })
}

/// A decoded frame: metadata plus the borrowed occupancy bits.
#[derive(Clone, Debug)]
pub struct VoxelFrame<'a> {
    pub metadata: FrameMetadata,
    pub occupancy: &'a [u8],
    grid_depth: usize,
}

impl<'a> VoxelFrame<'a> {
    /// Grid dimensions: `width x width x grid_depth`.
    pub fn dims(&self) -> [usize; 3] {
        let width = self.metadata.width as usize;
        [width, width, self.grid_depth]
    }

    /// Bit-addressable view of the occupancy buffer.
    pub fn grid(&self) -> VoxelGrid<'a> {
        VoxelGrid::new(self.occupancy, self.dims())
    }
}

/// Decode one complete frame.
///
/// Malformed or missing metadata fails the whole frame. An occupancy buffer
/// shorter than the grid is accepted; the missing cells read as empty.
///
/// # Example
/// ```
/// use voxel_stream::config::DecoderConfig;
/// use voxel_stream::frame::decode_frame;
///
/// let text = br#"{"resolution":0.1,"origin":[0,0,0],"width":2}"#;
/// let mut bytes = vec![text.len() as u8, 0, 0, 0];
/// bytes.extend_from_slice(text);
/// bytes.push(0b1100_0000);
///
/// let frame = decode_frame(&bytes, &DecoderConfig::default()).unwrap();
/// assert_eq!(frame.dims(), [2, 2, 30]);
/// assert_eq!(frame.grid().occupied_count(), 2);
/// ```
pub fn decode_frame<'a>(bytes: &'a [u8], config: &DecoderConfig) -> Result<VoxelFrame<'a>, FrameError> {
    let raw = split_frame(bytes, config)?;
    let text = std::str::from_utf8(raw.metadata_text)?;
    let metadata = FrameMetadata::from_json(text)?;
    Ok(VoxelFrame {
        metadata,
        occupancy: raw.occupancy,
        grid_depth: config.grid_depth,
    })
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    data: &'a FrameMetadata,
}

/// Build a wire frame from metadata and packed occupancy bits.
///
/// Used for replaying recorded grids; reserved header bytes are zeroed.
pub fn encode_frame(
    metadata: &FrameMetadata,
    occupancy: &[u8],
    config: &DecoderConfig,
) -> Result<Vec<u8>, FrameError> {
    let text = serde_json::to_vec(&EnvelopeRef { data: metadata })?;
    encode_raw_frame(&text, occupancy, config)
}

/// Build a wire frame from already-serialized metadata text.
pub fn encode_raw_frame(
    metadata_text: &[u8],
    occupancy: &[u8],
    config: &DecoderConfig,
) -> Result<Vec<u8>, FrameError> {
    config.validate()?;
    if metadata_text.len() > MAX_METADATA_LEN {
        return Err(FrameError::MetadataTooLong {
            len: metadata_text.len(),
        });
    }
    let offset = config.metadata_offset;
    let capacity = offset
        .saturating_add(metadata_text.len())
        .saturating_add(occupancy.len());
    let mut bytes = Vec::with_capacity(capacity);
    bytes.push(metadata_text.len() as u8);
    bytes.resize(offset, 0);
    bytes.extend_from_slice(metadata_text);
    bytes.extend_from_slice(occupancy);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_METADATA_OFFSET;
    use crate::error::ConfigError;

    fn raw_frame(text: &[u8], occupancy: &[u8]) -> Vec<u8> {
        let mut bytes = vec![text.len() as u8, 0xAA, 0xBB, 0xCC];
        bytes.extend_from_slice(text);
        bytes.extend_from_slice(occupancy);
        bytes
    }

    #[test]
    fn decodes_enveloped_metadata() {
        let text = br#"{"type":"msg","data":{"resolution":0.05,"origin":[-3.2,-3.2,-0.5],"width":128,"stamp":17.5}}"#;
        let bytes = raw_frame(text, &[0xFF, 0x00]);
        let frame = decode_frame(&bytes, &DecoderConfig::default()).unwrap();

        assert_eq!(frame.metadata.resolution, 0.05);
        assert_eq!(frame.metadata.origin, [-3.2, -3.2, -0.5]);
        assert_eq!(frame.metadata.width, 128);
        assert_eq!(frame.dims(), [128, 128, 30]);
        assert_eq!(frame.occupancy, &[0xFF, 0x00]);
    }

    #[test]
    fn decodes_bare_metadata() {
        let text = br#"{"resolution":0.1,"origin":[0,0,0],"width":4}"#;
        let bytes = raw_frame(text, &[1, 2, 3]);
        let frame = decode_frame(&bytes, &DecoderConfig::default()).unwrap();
        assert_eq!(frame.metadata.width, 4);
        assert_eq!(frame.occupancy, &[1, 2, 3]);
    }

    #[test]
    fn reserved_bytes_are_skipped() {
        let text = br#"{"resolution":1,"origin":[0,0,0],"width":1}"#;
        let mut bytes = raw_frame(text, &[0x80]);
        bytes[1] = b'{';
        bytes[2] = b'}';
        bytes[3] = 0xFF;
        let frame = decode_frame(&bytes, &DecoderConfig::default()).unwrap();
        assert_eq!(frame.metadata.resolution, 1.0);
    }

    #[test]
    fn zero_length_metadata_is_rejected() {
        let bytes = [0u8, 0, 0, 0, 0xFF, 0xFF];
        let raw = split_frame(&bytes, &DecoderConfig::default()).unwrap();
        assert!(raw.metadata_text.is_empty());
        assert_eq!(raw.occupancy, &[0xFF, 0xFF]);

        let err = decode_frame(&bytes, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Metadata(_)));
    }

    #[test]
    fn missing_field_is_rejected() {
        let text = br#"{"resolution":0.1,"origin":[0,0,0]}"#;
        let bytes = raw_frame(text, &[]);
        let err = decode_frame(&bytes, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Metadata(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let bytes = raw_frame(b"{resolution:", &[0xFF]);
        let err = decode_frame(&bytes, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Metadata(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = raw_frame(&[0xC3, 0x28], &[]);
        let err = decode_frame(&bytes, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Encoding(_)));
    }

    #[test]
    fn short_frames_are_truncated() {
        let err = decode_frame(&[], &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { needed: 4, actual: 0 }));

        let bytes = [20u8, 0, 0, 0, b'{'];
        let err = decode_frame(&bytes, &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { needed: 24, actual: 5 }));
    }

    #[test]
    fn custom_offset_and_depth() {
        let config = DecoderConfig {
            metadata_offset: 2,
            grid_depth: 8,
        };
        let text = br#"{"resolution":0.2,"origin":[1,2,3],"width":3}"#;
        let mut bytes = vec![text.len() as u8, 0];
        bytes.extend_from_slice(text);
        bytes.push(0x80);

        let frame = decode_frame(&bytes, &config).unwrap();
        assert_eq!(frame.dims(), [3, 3, 8]);
        assert!(frame.grid().is_occupied(0, 0, 0));
    }

    #[test]
    fn oversized_offset_is_an_error() {
        let bytes = [5u8, 0, 0, 0, 1, 2, 3, 4, 5, 6];
        let config = DecoderConfig {
            metadata_offset: usize::MAX,
            grid_depth: 30,
        };
        assert!(matches!(
            split_frame(&bytes, &config),
            Err(FrameError::Config(ConfigError::MetadataOffsetTooLarge { .. }))
        ));
        assert!(encode_raw_frame(b"{}", &[], &config).is_err());

        let config = DecoderConfig {
            metadata_offset: MAX_METADATA_OFFSET,
            grid_depth: 30,
        };
        let err = split_frame(&bytes, &config).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated { needed, actual: 10 } if needed == MAX_METADATA_OFFSET + 5
        ));
    }

    #[test]
    fn encode_then_decode_preserves_frame() {
        let metadata = FrameMetadata {
            resolution: 0.1,
            origin: [0.5, -1.0, 2.0],
            width: 2,
        };
        let bytes = encode_frame(&metadata, &[0b1010_0000], &DecoderConfig::default()).unwrap();
        assert_eq!(&bytes[1..4], &[0, 0, 0]);

        let frame = decode_frame(&bytes, &DecoderConfig::default()).unwrap();
        assert_eq!(frame.metadata, metadata);
        assert_eq!(frame.occupancy, &[0b1010_0000]);
    }

    #[test]
    fn oversized_metadata_cannot_be_encoded() {
        let text = vec![b' '; MAX_METADATA_LEN + 1];
        let err = encode_raw_frame(&text, &[], &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, FrameError::MetadataTooLong { len: 256 }));

        let text = vec![b' '; MAX_METADATA_LEN];
        let bytes = encode_raw_frame(&text, &[7], &DecoderConfig::default()).unwrap();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 4 + 255 + 1);
    }
}
