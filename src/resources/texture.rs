//! Software offscreen render target.
//!
//! [`RasterTarget`] implements [`OffscreenTarget`] on top of an
//! [`image::RgbaImage`]: rectangles are composited by scaling the referenced image
//! from an [`ImageStore`] to the rectangle size and alpha-blending it into the
//! buffer. It is what a full-buffer tile map draws into when no GPU renderer is
//! involved, and the buffer can be read back for pixel checks.

use std::{
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use anyhow::{anyhow, bail};
use cgmath::Vector2;
use image::{Rgba, RgbaImage, imageops};

use crate::{
    data_structures::instruction::{ImageSource, TextureHandle},
    render::OffscreenTarget,
    resources::ImageStore,
};

static NEXT_TEXTURE: AtomicU32 = AtomicU32::new(1);

#[derive(Debug)]
pub struct RasterTarget {
    store: Rc<ImageStore>,
    buffer: RgbaImage,
    clear_colour: Rgba<u8>,
    texture: TextureHandle,
    released: bool,
}

impl RasterTarget {
    pub fn new(store: Rc<ImageStore>) -> Self {
        Self {
            store,
            buffer: RgbaImage::new(0, 0),
            clear_colour: Rgba([0, 0, 0, 0]),
            texture: TextureHandle(NEXT_TEXTURE.fetch_add(1, Ordering::Relaxed)),
            released: false,
        }
    }

    pub fn with_clear_colour(mut self, colour: [u8; 4]) -> Self {
        self.clear_colour = Rgba(colour);
        self
    }

    /// The composited pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl OffscreenTarget for RasterTarget {
    fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        if self.released {
            bail!("Render target {:?} was released", self.texture);
        }
        if self.buffer.dimensions() != (width, height) {
            self.buffer = RgbaImage::from_pixel(width, height, self.clear_colour);
        }
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn clear(&mut self) {
        let colour = self.clear_colour;
        self.buffer.pixels_mut().for_each(|pixel| *pixel = colour);
    }

    fn draw_rectangle(
        &mut self,
        position: Vector2<f32>,
        size: Vector2<f32>,
        image: &ImageSource,
    ) -> anyhow::Result<()> {
        if self.released {
            bail!("Render target {:?} was released", self.texture);
        }
        let name = match image {
            ImageSource::Path(name) => name,
            ImageSource::Texture(handle) => {
                bail!("Texture {:?} can't be composited offscreen", handle)
            }
        };
        let img = self
            .store
            .get(name)
            .ok_or_else(|| anyhow!("Unknown image '{}'", name))?;

        let width = size.x.round().max(0.0) as u32;
        let height = size.y.round().max(0.0) as u32;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let x = position.x.round() as i64;
        let y = position.y.round() as i64;
        if img.dimensions() == (width, height) {
            imageops::overlay(&mut self.buffer, img, x, y);
        } else {
            let scaled = imageops::resize(img, width, height, imageops::FilterType::Nearest);
            imageops::overlay(&mut self.buffer, &scaled, x, y);
        }
        Ok(())
    }

    fn texture(&self) -> TextureHandle {
        self.texture
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.buffer = RgbaImage::new(0, 0);
        self.released = true;
    }
}
