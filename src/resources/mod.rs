//! Loading images from external files and compositing them offscreen.

use std::{collections::HashMap, path::Path};

use anyhow::Context;
use image::{ImageFormat, RgbaImage, load_from_memory_with_format};

pub mod texture;

pub use texture::RasterTarget;

pub fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    // TODO: let callers configure the asset root instead of ./assets
    let path = Path::new("./").join("assets").join(file_name);
    let data = std::fs::read(&path).with_context(|| format!("Could not read {:?}", path))?;
    Ok(data)
}

/// Decodes raw image file contents, optionally with a format hint such as `"png"`.
pub fn decode_image(bytes: &[u8], format: Option<&str>) -> anyhow::Result<RgbaImage> {
    let img = match format {
        None => image::load_from_memory(bytes)?,
        Some(fmt) => {
            let format = ImageFormat::from_extension(fmt)
                .with_context(|| format!("Unknown image format '{}'", fmt))?;
            load_from_memory_with_format(bytes, format)?
        }
    };
    Ok(img.to_rgba8())
}

/// Images addressed by the names used in [`ImageSource::Path`](crate::data_structures::instruction::ImageSource).
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<String, RgbaImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `assets/<file_name>` and registers it under `file_name`.
    pub fn load(&mut self, file_name: &str) -> anyhow::Result<()> {
        let bytes = load_binary(file_name)?;
        let format = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str());
        let img = decode_image(&bytes, format)
            .with_context(|| format!("Could not decode {}", file_name))?;
        self.insert(file_name, img);
        Ok(())
    }

    pub fn load_from_bytes(
        &mut self,
        name: &str,
        bytes: &[u8],
        format: Option<&str>,
    ) -> anyhow::Result<()> {
        let img = decode_image(bytes, format)?;
        self.insert(name, img);
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, img: RgbaImage) {
        self.images.insert(name.into(), img);
    }

    pub fn get(&self, name: &str) -> Option<&RgbaImage> {
        self.images.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
