//! WASM bindings for the voxel stream.
//!
//! Provides JavaScript-accessible decoding and meshing of voxel frames. Hosts
//! should load this module inside a Web Worker so meshing never blocks the
//! page's input handling.

use wasm_bindgen::prelude::*;
use voxel_stream::{
    build_terrain, AtlasLayout, ChannelRequest, FrameError, IncomingKind, MeshStats,
    StreamConfig, TerrainMesh, VoxelStream,
};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Mesh result returned to JavaScript.
///
/// Contains vertex data ready for use with Three.js BufferGeometry. Positions
/// are in voxel units; apply `scale` and `translation` on the mesh object.
#[wasm_bindgen]
pub struct MeshResult {
    positions: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
    voxel_count: usize,
    scale: f32,
    translation: [f32; 3],
    generation: u64,
}

#[wasm_bindgen]
impl MeshResult {
    /// Get vertex positions (3 floats per vertex).
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> Vec<f32> {
        self.positions.clone()
    }

    /// Get atlas UV coordinates (2 floats per vertex).
    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> Vec<f32> {
        self.uvs.clone()
    }

    /// Get triangle indices.
    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> Vec<u32> {
        self.indices.clone()
    }

    /// Number of occupied voxels in the frame.
    #[wasm_bindgen(getter)]
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Number of vertices in the mesh.
    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the mesh.
    #[wasm_bindgen(getter)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Uniform mesh scale (meters per voxel).
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Mesh translation `[x, y, z]` in meters.
    #[wasm_bindgen(getter)]
    pub fn translation(&self) -> Vec<f32> {
        self.translation.to_vec()
    }

    /// Sequence number of the source frame.
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.generation as f64
    }

    /// Whether the mesh is empty (no geometry).
    #[wasm_bindgen(getter)]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<TerrainMesh> for MeshResult {
    fn from(terrain: TerrainMesh) -> Self {
        let (positions, uvs, indices, voxel_count) = terrain.mesh.into_parts();
        Self {
            positions,
            uvs,
            indices,
            voxel_count,
            scale: terrain.placement.scale,
            translation: terrain.placement.translation.to_array(),
            generation: terrain.generation,
        }
    }
}

/// Mesh statistics for debugging.
#[wasm_bindgen]
pub struct FrameStats {
    voxel_count: usize,
    face_count: usize,
    hidden_faces: usize,
    cull_ratio: f32,
    faces_per_direction: [usize; 6],
}

#[wasm_bindgen]
impl FrameStats {
    #[wasm_bindgen(getter)]
    pub fn voxel_count(&self) -> usize { self.voxel_count }

    #[wasm_bindgen(getter)]
    pub fn face_count(&self) -> usize { self.face_count }

    #[wasm_bindgen(getter)]
    pub fn hidden_faces(&self) -> usize { self.hidden_faces }

    #[wasm_bindgen(getter)]
    pub fn cull_ratio(&self) -> f32 { self.cull_ratio }

    /// Get per-direction face counts as [-X, +X, -Y, +Y, -Z, +Z].
    #[wasm_bindgen(getter)]
    pub fn faces_per_direction(&self) -> Vec<u32> {
        self.faces_per_direction.iter().map(|&n| n as u32).collect()
    }
}

impl From<MeshStats> for FrameStats {
    fn from(stats: MeshStats) -> Self {
        Self {
            voxel_count: stats.voxel_count,
            face_count: stats.face_count,
            hidden_faces: stats.hidden_faces,
            cull_ratio: stats.cull_ratio,
            faces_per_direction: stats.faces_per_direction,
        }
    }
}

fn mesh_frame(bytes: &[u8], config: &StreamConfig) -> Result<(MeshResult, FrameStats), FrameError> {
    let (terrain, stats) = build_terrain(bytes, config, 0)?;
    Ok((terrain.into(), stats.into()))
}

/// Decode and mesh one raw frame from the voxel topic.
///
/// # Example (JavaScript)
/// ```javascript
/// const result = mesh_voxel_frame(new Uint8Array(message.data));
/// geometry.setAttribute('position', new THREE.BufferAttribute(result.positions, 3));
/// mesh.scale.setScalar(result.scale);
/// ```
#[wasm_bindgen]
pub fn mesh_voxel_frame(bytes: &[u8]) -> Result<MeshResult, JsError> {
    let (mesh, _) = mesh_frame(bytes, &StreamConfig::default())?;
    Ok(mesh)
}

/// Mesh a frame and return statistics along with the mesh.
#[wasm_bindgen]
pub fn mesh_voxel_frame_with_stats(bytes: &[u8]) -> Result<js_sys::Array, JsError> {
    let (mesh, stats) = mesh_frame(bytes, &StreamConfig::default())?;

    let result = js_sys::Array::new();
    result.push(&JsValue::from(mesh));
    result.push(&JsValue::from(stats));
    Ok(result)
}

/// Stateful stream for one data-channel subscription.
///
/// Meshes are handed to JavaScript by value; the page owns the displayed
/// geometry and the handle only remembers which frame it came from.
#[wasm_bindgen]
pub struct VoxelStreamHandle {
    stream: VoxelStream,
    current_generation: Option<u64>,
}

#[wasm_bindgen]
impl VoxelStreamHandle {
    /// Create a stream, optionally from a JSON config (missing fields use defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<VoxelStreamHandle, JsError> {
        let config = match config_json {
            Some(text) => StreamConfig::from_json(&text)?,
            None => StreamConfig::default(),
        };
        tracing::info!(topic = %config.topic, "voxel stream handle ready");
        Ok(Self::with_config(config))
    }

    /// Process one frame.
    ///
    /// Returns the new mesh, or `undefined` when the frame was dropped; in
    /// that case the previously returned mesh stays current.
    pub fn push_frame(&mut self, bytes: &[u8]) -> Option<MeshResult> {
        match self.stream.build_frame(bytes) {
            Ok(terrain) => {
                tracing::trace!(generation = terrain.generation, "handing mesh to host");
                self.current_generation = Some(terrain.generation);
                Some(terrain.into())
            }
            Err(err) => {
                log(&format!("Dropped voxel frame: {err}"));
                None
            }
        }
    }

    /// Generation of the mesh the page should be showing, if any.
    #[wasm_bindgen(getter)]
    pub fn current_generation(&self) -> Option<f64> {
        self.current_generation.map(|generation| generation as f64)
    }

    /// Subscription request for this stream's topic.
    pub fn subscribe_message(&self) -> String {
        ChannelRequest::subscribe(self.stream.config().topic.as_str()).to_json()
    }

    /// Whether a data-channel envelope carries a frame for this stream.
    pub fn is_voxel_message(&self, kind: &str, topic: &str) -> bool {
        IncomingKind::classify(kind, topic, &self.stream.config().topic) == IncomingKind::VoxelFrame
    }

    /// Forget the current mesh (e.g. after disconnecting).
    pub fn reset(&mut self) {
        self.current_generation = None;
    }

    #[wasm_bindgen(getter)]
    pub fn frames_received(&self) -> f64 {
        self.stream.stats().frames_received as f64
    }

    #[wasm_bindgen(getter)]
    pub fn frames_meshed(&self) -> f64 {
        self.stream.stats().frames_meshed as f64
    }

    #[wasm_bindgen(getter)]
    pub fn frames_rejected(&self) -> f64 {
        self.stream.stats().frames_rejected as f64
    }

    /// RGBA pixels of this stream's palette atlas.
    pub fn atlas_pixels(&self) -> Vec<u8> {
        self.stream.config().atlas.atlas_pixels()
    }

    #[wasm_bindgen(getter)]
    pub fn atlas_width(&self) -> u32 {
        self.stream.config().atlas.texture_width
    }

    #[wasm_bindgen(getter)]
    pub fn atlas_height(&self) -> u32 {
        self.stream.config().atlas.texture_height
    }
}

impl VoxelStreamHandle {
    fn with_config(config: StreamConfig) -> Self {
        Self {
            stream: VoxelStream::new(config),
            current_generation: None,
        }
    }
}

/// RGBA pixels of the default 1024x32 height-band atlas.
///
/// # Example (JavaScript)
/// ```javascript
/// const texture = new THREE.DataTexture(atlas_pixels(), 1024, 32);
/// texture.magFilter = THREE.NearestFilter;
/// texture.needsUpdate = true;
/// ```
#[wasm_bindgen]
pub fn atlas_pixels() -> Vec<u8> {
    AtlasLayout::default().atlas_pixels()
}

/// Subscription request for the default voxel topic.
#[wasm_bindgen]
pub fn subscribe_message() -> String {
    ChannelRequest::subscribe(voxel_stream::VOXEL_TOPIC).to_json()
}

/// Whether a data-channel envelope carries a frame on the default voxel topic.
#[wasm_bindgen]
pub fn is_voxel_message(kind: &str, topic: &str) -> bool {
    IncomingKind::classify(kind, topic, voxel_stream::VOXEL_TOPIC) == IncomingKind::VoxelFrame
}

// Logging support

thread_local! {
    static LOG_ENABLED: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Enable or disable console logging.
#[wasm_bindgen]
pub fn set_log_enabled(enabled: bool) {
    LOG_ENABLED.with(|flag| flag.set(enabled));
}

fn log(message: &str) {
    if LOG_ENABLED.with(|enabled| enabled.get()) {
        web_sys::console::log_1(&message.into());
    }
}

/// Get the version of the mesher library.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
