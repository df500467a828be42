use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extension of pre-encoded clip files
pub const CLIP_EXTENSION: &str = "h264";

/// Integer selector for a camera feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(i32);

impl CameraId {
    /// Wrap a raw selector
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw selector value
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for CameraId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl FromStr for CameraId {
    type Err = Error;

    /// Parse a selector out of a text payload such as `"2"` or `" 5\n"`
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| Error::InvalidCamera(s.to_string()))
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from camera selectors to clip source directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraCatalog {
    /// Camera loaded when an engine starts
    pub default_camera: CameraId,

    /// Source directory per camera
    pub sources: BTreeMap<CameraId, PathBuf>,
}

impl Default for CameraCatalog {
    fn default() -> Self {
        let sources = [
            (1, "h264/flir_id8_image_resized_30fps"),
            (2, "h264/leopard_id1_image_resized_30fps"),
            (3, "h264/leopard_id3_image_resized_30fps"),
            (4, "h264/leopard_id4_image_resized_30fps"),
            (5, "h264/leopard_id5_image_resized_30fps"),
            (6, "h264/leopard_id6_image_resized_30fps"),
            (7, "h264/leopard_id7_image_resized_30fps"),
        ]
        .into_iter()
        .map(|(id, dir)| (CameraId::new(id), PathBuf::from(dir)))
        .collect();

        Self {
            default_camera: CameraId::new(1),
            sources,
        }
    }
}

impl CameraCatalog {
    /// Create an empty catalog with the given default camera
    pub fn new(default_camera: CameraId) -> Self {
        Self {
            default_camera,
            sources: BTreeMap::new(),
        }
    }

    /// Add or replace a camera source
    pub fn with_source(mut self, camera: CameraId, directory: impl Into<PathBuf>) -> Self {
        self.sources.insert(camera, directory.into());
        self
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read camera catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Check that the catalog is usable
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config("Camera catalog has no sources".to_string()));
        }
        if !self.sources.contains_key(&self.default_camera) {
            return Err(Error::Config(format!(
                "Default camera {} is not in the catalog",
                self.default_camera
            )));
        }
        Ok(())
    }

    /// Whether the catalog knows this camera
    pub fn contains(&self, camera: CameraId) -> bool {
        self.sources.contains_key(&camera)
    }

    /// Source directory of a camera
    pub fn source(&self, camera: CameraId) -> Result<&Path> {
        self.sources
            .get(&camera)
            .map(PathBuf::as_path)
            .ok_or(Error::UnknownCamera(camera))
    }

    /// Known camera selectors in ascending order
    pub fn cameras(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.sources.keys().copied()
    }
}

/// Clip number embedded in a file name like `sample-12.h264`
///
/// Names without a parsable number sort as 0.
pub fn clip_number(file_name: &str) -> u64 {
    file_name
        .split('-')
        .nth(1)
        .and_then(|part| part.strip_suffix(".h264").unwrap_or(part).parse().ok())
        .unwrap_or(0)
}

/// List the clip files of a camera source directory in playback order
pub fn list_clips(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut clips = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_clip = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(CLIP_EXTENSION));
        if is_clip {
            clips.push(path);
        }
    }

    if clips.is_empty() {
        return Err(Error::NoClips(directory.to_path_buf()));
    }

    clips.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (clip_number(&name), name)
    });

    debug!("Found {} clips in {}", clips.len(), directory.display());
    Ok(clips)
}
