//! Data-channel messages exchanged with the robot transport.
//!
//! The transport itself lives outside this crate; these helpers only build
//! the JSON requests it sends and route the envelopes it receives.

use serde::Serialize;

/// Topic on which the robot publishes compressed voxel maps.
pub const VOXEL_TOPIC: &str = "rt/utlidar/voxel_map_compressed";

/// Request sent over the data channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelRequest {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
}

impl ChannelRequest {
    pub fn subscribe(topic: impl Into<String>) -> Self {
        Self::Subscribe { topic: topic.into() }
    }

    pub fn unsubscribe(topic: impl Into<String>) -> Self {
        Self::Unsubscribe { topic: topic.into() }
    }

    /// Serialize to the wire JSON text.
    pub fn to_json(&self) -> String {
        // Both variants are plain string maps, which always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Routing decision for an incoming data-channel envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncomingKind {
    /// Handshake acknowledgement from the robot.
    Validation,
    /// A binary voxel frame for the decoder.
    VoxelFrame,
    /// Anything else; ignored by this crate.
    Other,
}

impl IncomingKind {
    /// Classify an envelope by its `type` and `topic` fields.
    pub fn classify(kind: &str, topic: &str, voxel_topic: &str) -> Self {
        match kind {
            "validation" => Self::Validation,
            "msg" if topic == voxel_topic => Self::VoxelFrame,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_wire_format() {
        let json = ChannelRequest::subscribe(VOXEL_TOPIC).to_json();
        assert_eq!(
            json,
            r#"{"type":"subscribe","topic":"rt/utlidar/voxel_map_compressed"}"#
        );
    }

    #[test]
    fn unsubscribe_wire_format() {
        let json = ChannelRequest::unsubscribe("a/b").to_json();
        assert_eq!(json, r#"{"type":"unsubscribe","topic":"a/b"}"#);
    }

    #[test]
    fn classify_envelopes() {
        assert_eq!(
            IncomingKind::classify("msg", VOXEL_TOPIC, VOXEL_TOPIC),
            IncomingKind::VoxelFrame
        );
        assert_eq!(
            IncomingKind::classify("validation", "", VOXEL_TOPIC),
            IncomingKind::Validation
        );
        assert_eq!(
            IncomingKind::classify("msg", "rt/lowstate", VOXEL_TOPIC),
            IncomingKind::Other
        );
        assert_eq!(
            IncomingKind::classify("heartbeat", VOXEL_TOPIC, VOXEL_TOPIC),
            IncomingKind::Other
        );
    }
}
