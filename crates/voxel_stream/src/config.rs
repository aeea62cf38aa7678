//! Stream configuration.
//!
//! The defaults match the quadruped's voxel-map topic: metadata text at byte
//! offset 4, a fixed 30-layer Z extent, and a 1024x32 atlas of 32 tiles.
//! These are protocol constants of that platform, so each one is
//! overridable.

use serde::Deserialize;

use crate::core::ATLAS_TILES;
use crate::error::ConfigError;
use crate::protocol::VOXEL_TOPIC;

/// Largest accepted metadata offset. Real headers are a handful of bytes.
pub const MAX_METADATA_OFFSET: usize = 4096;

/// Layout of the frame header and grid depth.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Byte offset where the metadata text begins.
    pub metadata_offset: usize,
    /// Number of Z layers in every frame.
    pub grid_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            metadata_offset: 4,
            grid_depth: 30,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata_offset == 0 {
            return Err(ConfigError::MetadataOffset);
        }
        if self.metadata_offset > MAX_METADATA_OFFSET {
            return Err(ConfigError::MetadataOffsetTooLarge {
                offset: self.metadata_offset,
                max: MAX_METADATA_OFFSET,
            });
        }
        Ok(())
    }
}

/// Horizontal height-band texture atlas supplied by the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AtlasLayout {
    /// Width and height of one tile in pixels.
    pub tile_size: u32,
    /// Atlas width in pixels (`tile_size * ATLAS_TILES`).
    pub texture_width: u32,
    /// Atlas height in pixels.
    pub texture_height: u32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            tile_size: 32,
            texture_width: 32 * ATLAS_TILES,
            texture_height: 32,
        }
    }
}

impl AtlasLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tile_size", self.tile_size),
            ("texture_width", self.texture_width),
            ("texture_height", self.texture_height),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroAtlasSize { field });
            }
        }
        if self.tile_size as u64 * ATLAS_TILES as u64 != self.texture_width as u64 {
            return Err(ConfigError::AtlasRatio {
                tile_size: self.tile_size,
                texture_width: self.texture_width,
                tiles: ATLAS_TILES,
            });
        }
        Ok(())
    }
}

/// Complete configuration for a voxel stream.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub decoder: DecoderConfig,
    pub atlas: AtlasLayout,
    /// Transport topic carrying voxel frames.
    pub topic: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            atlas: AtlasLayout::default(),
            topic: VOXEL_TOPIC.to_string(),
        }
    }
}

impl StreamConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Json(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decoder.validate()?;
        self.atlas.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol() {
        let config = StreamConfig::default();
        assert_eq!(config.decoder.metadata_offset, 4);
        assert_eq!(config.decoder.grid_depth, 30);
        assert_eq!(config.atlas.tile_size, 32);
        assert_eq!(config.atlas.texture_width, 1024);
        assert_eq!(config.atlas.texture_height, 32);
        assert_eq!(config.topic, VOXEL_TOPIC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StreamConfig::from_json(r#"{"decoder": {"grid_depth": 16}}"#).unwrap();
        assert_eq!(config.decoder.grid_depth, 16);
        assert_eq!(config.decoder.metadata_offset, 4);
        assert_eq!(config.atlas, AtlasLayout::default());
    }

    #[test]
    fn zero_offset_rejected() {
        let config = DecoderConfig {
            metadata_offset: 0,
            grid_depth: 30,
        };
        assert_eq!(config.validate(), Err(ConfigError::MetadataOffset));
    }

    #[test]
    fn atlas_ratio_enforced() {
        let atlas = AtlasLayout {
            tile_size: 16,
            texture_width: 1024,
            texture_height: 16,
        };
        assert!(matches!(atlas.validate(), Err(ConfigError::AtlasRatio { .. })));

        let atlas = AtlasLayout {
            tile_size: 16,
            texture_width: 512,
            texture_height: 16,
        };
        assert!(atlas.validate().is_ok());
    }

    #[test]
    fn zero_atlas_size_rejected() {
        let atlas = AtlasLayout {
            tile_size: 32,
            texture_width: 1024,
            texture_height: 0,
        };
        assert_eq!(
            atlas.validate(),
            Err(ConfigError::ZeroAtlasSize { field: "texture_height" })
        );
    }

    #[test]
    fn huge_offset_rejected() {
        let err = StreamConfig::from_json(r#"{"decoder":{"metadata_offset":1000000}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MetadataOffsetTooLarge { max: MAX_METADATA_OFFSET, .. }));

        let config = DecoderConfig {
            metadata_offset: MAX_METADATA_OFFSET,
            grid_depth: 30,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_json_config_errors() {
        assert!(matches!(
            StreamConfig::from_json(r#"{"atlas": {"tile_size": 7}}"#),
            Err(ConfigError::AtlasRatio { .. })
        ));
        let err = StreamConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid config JSON"));
    }
}
