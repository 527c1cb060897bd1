use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::info;

use crate::app::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u32);

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image asset `{name}` is not loaded")]
    Missing { name: String },
}

/// Decoded RGBA8 pixels, row-major.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl LoadedImage {
    /// Returns `None` when the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let texel = self.rgba.get(offset..offset + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }
}

/// Images keyed by the name they were loaded under (a path relative to the asset dir).
#[derive(Debug, Default)]
pub struct AssetStore {
    images: Vec<LoadedImage>,
    ids_by_name: HashMap<String, ImageId>,
}

impl AssetStore {
    pub fn load_from_dir<I, S>(dir: &Path, names: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::default();
        for name in names {
            store.load_file(dir, name.as_ref())?;
        }
        info!(
            dir = %dir.display(),
            image_count = store.len(),
            "assets_loaded"
        );
        Ok(store)
    }

    /// Loads `dir/name` unless an image is already registered under `name`.
    pub fn load_file(&mut self, dir: &Path, name: &str) -> Result<ImageId, AssetError> {
        if let Some(id) = self.id(name) {
            return Ok(id);
        }
        let image = decode_image(&dir.join(name))?;
        Ok(self.insert(name, image))
    }

    pub fn insert(&mut self, name: impl Into<String>, image: LoadedImage) -> ImageId {
        let name = name.into();
        if let Some(existing) = self.ids_by_name.get(&name).copied() {
            self.images[existing.0 as usize] = image;
            return existing;
        }
        let id = ImageId(self.images.len() as u32);
        self.images.push(image);
        self.ids_by_name.insert(name, id);
        id
    }

    pub fn id(&self, name: &str) -> Option<ImageId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<ImageId, AssetError> {
        self.id(name).ok_or_else(|| AssetError::Missing {
            name: name.to_string(),
        })
    }

    pub fn get(&self, id: ImageId) -> Option<&LoadedImage> {
        self.images.get(id.0 as usize)
    }

    pub fn size(&self, id: ImageId) -> Option<(u32, u32)> {
        self.get(id).map(|image| (image.width, image.height))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn decode_image(path: &Path) -> Result<LoadedImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
