//! Render instructions for 2D transform nodes.
//!
//! Instructions are the primitives a [`TransformNode`](super::transform_node::TransformNode)
//! is composed of. They are interpreted in order by the render list: matrix
//! instructions change the current transform, `Color` changes the current tint and
//! `Rectangle` emits a draw call using both.

use cgmath::{Deg, Matrix3, Vector2, Zero};

/// Opaque handle to a texture owned by the renderer (or an offscreen target).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// The visual content of a rectangle.
///
/// A rectangle shows either an image referenced by name/path (a "source") or a
/// texture handle, never both. Both are resolved by the external renderer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Path(String),
    Texture(TextureHandle),
}

impl ImageSource {
    pub fn as_path(&self) -> Option<&str> {
        match self {
            ImageSource::Path(path) => Some(path),
            ImageSource::Texture(_) => None,
        }
    }

    pub fn as_texture(&self) -> Option<TextureHandle> {
        match self {
            ImageSource::Path(_) => None,
            ImageSource::Texture(handle) => Some(*handle),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(path.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::Path(path)
    }
}

impl From<TextureHandle> for ImageSource {
    fn from(handle: TextureHandle) -> Self {
        ImageSource::Texture(handle)
    }
}

/// RGBA colour with every channel in `[0, 1]`.
///
/// Channels are only set through [`Rgba::new`] and the `From` impls, which clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Create a colour, clamping each channel into `[0, 1]`. NaN becomes 0.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            r: unit(r),
            g: unit(g),
            b: unit(b),
            a: unit(a),
        }
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    pub fn a(&self) -> f32 {
        self.a
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let f_to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [f_to_u8(self.r), f_to_u8(self.g), f_to_u8(self.b), f_to_u8(self.a)]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(c: [f32; 4]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }
}

impl From<(f32, f32, f32, f32)> for Rgba {
    fn from((r, g, b, a): (f32, f32, f32, f32)) -> Self {
        Rgba::new(r, g, b, a)
    }
}

/// An axis-aligned rectangle in the local space of the current transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub position: Vector2<f32>,
    pub size: Vector2<f32>,
    pub image: Option<ImageSource>,
}

impl Rectangle {
    pub fn new(position: Vector2<f32>, size: Vector2<f32>) -> Self {
        Self {
            position,
            size,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImageSource>) -> Self {
        self.image = image;
        self
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(Vector2::zero(), Vector2::new(1.0, 1.0))
    }
}

/// A single step of a transform node.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    PushMatrix,
    PopMatrix,
    Translate(Vector2<f32>),
    /// Counter-clockwise rotation around the current origin.
    Rotate(Deg<f32>),
    Color(Rgba),
    Rectangle(Rectangle),
}

impl Instruction {
    /// The matrix this instruction multiplies onto the current transform, if any.
    pub fn to_matrix(&self) -> Option<Matrix3<f32>> {
        match self {
            Instruction::Translate(v) => Some(Matrix3::from_translation(*v)),
            Instruction::Rotate(angle) => Some(Matrix3::from_angle_z(*angle)),
            _ => None,
        }
    }
}
