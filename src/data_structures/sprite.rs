//! Sprites: positioned, parent-relative visual entities.
//!
//! A [`Sprite`] owns one transform node laid out as
//!
//! ```text
//! PushMatrix -> Translate(position) -> Rotate(rotation) -> Translate(-origin)
//!            -> Color(color) -> Rectangle(size, image) -> PopMatrix
//! ```
//!
//! All geometry lives in that node. The position is stored in absolute (surface)
//! coordinates and converted to and from parent-relative coordinates on every
//! access, using the parent's position at that moment.

use std::{fmt, ptr};

use cgmath::{Deg, Vector2, Zero};

use crate::{
    context::SharedSurface,
    data_structures::{
        attachment::Attachment,
        collision::{Bounds, CollisionMode},
        instruction::{ImageSource, Instruction, Rectangle, Rgba, TextureHandle},
        transform_node::{NodeRef, TransformNode},
    },
};

const POSITION: usize = 1;
const ROTATION: usize = 2;
const ORIGIN: usize = 3;
const COLOR: usize = 4;
const RECT: usize = 5;

const OWNER: &str = "Sprite";

/// Per-frame behaviour that replaces [`Sprite::update`]'s default motion.
///
/// Call [`Sprite::apply_velocity`] from the implementation to keep the default.
pub trait Behaviour {
    fn update(&mut self, sprite: &mut Sprite);
}

impl<F> Behaviour for F
where
    F: FnMut(&mut Sprite),
{
    fn update(&mut self, sprite: &mut Sprite) {
        self(sprite)
    }
}

pub struct Sprite {
    attachment: Attachment,
    node: NodeRef,
    velocity: Vector2<f32>,
    behaviour: Option<Box<dyn Behaviour>>,
}

impl Sprite {
    pub fn new() -> Self {
        let mut node = TransformNode::new();
        node.add(Instruction::PushMatrix);
        node.add(Instruction::Translate(Vector2::zero()));
        node.add(Instruction::Rotate(Deg(0.0)));
        node.add(Instruction::Translate(Vector2::zero()));
        node.add(Instruction::Color(Rgba::WHITE));
        node.add(Instruction::Rectangle(Rectangle::default()));
        node.add(Instruction::PopMatrix);

        Self {
            attachment: Attachment::new(),
            node: node.shared(),
            velocity: Vector2::zero(),
            behaviour: None,
        }
    }

    pub fn builder() -> SpriteBuilder {
        SpriteBuilder::default()
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn parent(&self) -> Option<SharedSurface> {
        self.attachment.parent()
    }

    /// Hides the sprite and assigns a new parent (or none).
    pub fn set_parent(&mut self, parent: Option<&SharedSurface>) {
        self.attachment.set_parent(parent, &self.node, OWNER);
    }

    pub fn visible(&self) -> bool {
        self.attachment.visible()
    }

    pub fn show(&mut self, do_show: bool) {
        self.attachment.show(do_show, &self.node, OWNER);
    }

    /// Position relative to the parent.
    pub fn position(&self) -> Vector2<f32> {
        let absolute = self.absolute_position();
        match self.attachment.parent_position() {
            Some(parent) => absolute - parent,
            None => absolute,
        }
    }

    pub fn set_position(&mut self, position: impl Into<Vector2<f32>>) {
        let mut position = position.into();
        if let Some(parent) = self.attachment.parent_position() {
            position += parent;
        }
        self.node.borrow_mut().set_translation(POSITION, position);
    }

    /// Position in surface coordinates, ignoring the parent.
    pub fn absolute_position(&self) -> Vector2<f32> {
        self.node.borrow().translation(POSITION)
    }

    pub fn size(&self) -> Vector2<f32> {
        self.node
            .borrow()
            .rectangle(RECT)
            .map(|rect| rect.size)
            .unwrap_or_else(Vector2::zero)
    }

    pub fn set_size(&mut self, size: impl Into<Vector2<f32>>) {
        let mut size = size.into();
        if size.x < 0.0 || size.y < 0.0 {
            log::warn!("{}: Negative size {:?} clamped to zero.", OWNER, size);
            size = Vector2::new(size.x.max(0.0), size.y.max(0.0));
        }
        if let Some(rect) = self.node.borrow_mut().rectangle_mut(RECT) {
            rect.size = size;
        }
    }

    pub fn width(&self) -> f32 {
        self.size().x
    }

    pub fn height(&self) -> f32 {
        self.size().y
    }

    /// The rotation/visual anchor, as an offset from the position.
    pub fn origin(&self) -> Vector2<f32> {
        -self.node.borrow().translation(ORIGIN)
    }

    pub fn set_origin(&mut self, origin: impl Into<Vector2<f32>>) {
        let origin = origin.into();
        self.node.borrow_mut().set_translation(ORIGIN, -origin);
    }

    pub fn center(&self) -> Vector2<f32> {
        self.position() - self.origin() + self.size() / 2.0
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            center: self.center(),
            size: self.size(),
        }
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f32 {
        self.node.borrow().rotation(ROTATION).0
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.node.borrow_mut().set_rotation(ROTATION, Deg(degrees));
    }

    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: impl Into<Vector2<f32>>) {
        self.velocity = velocity.into();
    }

    pub fn color(&self) -> Rgba {
        self.node.borrow().color(COLOR)
    }

    pub fn set_color(&mut self, color: impl Into<Rgba>) {
        self.node.borrow_mut().set_color(COLOR, color.into());
    }

    pub fn image(&self) -> Option<ImageSource> {
        self.node
            .borrow()
            .rectangle(RECT)
            .and_then(|rect| rect.image.clone())
    }

    pub fn set_image(&mut self, image: Option<ImageSource>) {
        if let Some(rect) = self.node.borrow_mut().rectangle_mut(RECT) {
            rect.image = image;
        }
    }

    /// The image path, if the sprite shows a path rather than a texture.
    pub fn source(&self) -> Option<String> {
        self.image()
            .and_then(|image| image.as_path().map(str::to_string))
    }

    /// Shows the image at `source`, replacing any texture.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.set_image(Some(ImageSource::Path(source.into())));
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.image().and_then(|image| image.as_texture())
    }

    /// Shows `texture`, replacing any image path.
    pub fn set_texture(&mut self, texture: TextureHandle) {
        self.set_image(Some(ImageSource::Texture(texture)));
    }

    pub fn set_behaviour(&mut self, behaviour: impl Behaviour + 'static) {
        self.behaviour = Some(Box::new(behaviour));
    }

    pub fn clear_behaviour(&mut self) {
        self.behaviour = None;
    }

    pub fn has_behaviour(&self) -> bool {
        self.behaviour.is_some()
    }

    /// Checks whether this sprite collides with `other`.
    ///
    /// A sprite never collides with itself.
    pub fn hit(&self, other: &Sprite, mode: CollisionMode) -> bool {
        if ptr::eq(self, other) {
            return false;
        }
        self.bounds().collides(&other.bounds(), mode)
    }

    /// Like [`hit`](Self::hit) but with the mode given by name (`"box"` or `"circle"`).
    ///
    /// Unknown names are logged and never collide.
    pub fn hit_named(&self, other: &Sprite, mode: &str) -> bool {
        if ptr::eq(self, other) {
            return false;
        }
        match mode.parse::<CollisionMode>() {
            Ok(mode) => self.hit(other, mode),
            Err(e) => {
                log::warn!("{}: {}", OWNER, e);
                false
            }
        }
    }

    /// Runs the behaviour, or moves the sprite by its velocity if there is none.
    pub fn update(&mut self) {
        match self.behaviour.take() {
            Some(mut behaviour) => {
                behaviour.update(self);
                // the behaviour may have installed a successor
                if self.behaviour.is_none() {
                    self.behaviour = Some(behaviour);
                }
            }
            None => self.apply_velocity(),
        }
    }

    /// Adds the velocity to the absolute position.
    pub fn apply_velocity(&mut self) {
        let velocity = self.velocity;
        let mut node = self.node.borrow_mut();
        let position = node.translation(POSITION);
        node.set_translation(POSITION, position + velocity);
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("node", &self.node.borrow().id())
            .field("position", &self.position())
            .field("size", &self.size())
            .field("velocity", &self.velocity)
            .field("visible", &self.visible())
            .finish()
    }
}

/// Detaches a visible sprite. If the parent is borrowed while the sprite drops,
/// its node stays in the parent's render list.
impl Drop for Sprite {
    fn drop(&mut self) {
        self.attachment.release(&self.node, OWNER);
    }
}

/// Keyword-style construction of a [`Sprite`].
///
/// The parent is always assigned before any geometry so positions are interpreted
/// relative to it, no matter in which order the builder methods were called.
#[derive(Default)]
pub struct SpriteBuilder {
    parent: Option<SharedSurface>,
    position: Option<Vector2<f32>>,
    size: Option<Vector2<f32>>,
    origin: Option<Vector2<f32>>,
    rotation: Option<f32>,
    velocity: Option<Vector2<f32>>,
    color: Option<Rgba>,
    image: Option<ImageSource>,
    behaviour: Option<Box<dyn Behaviour>>,
}

impl SpriteBuilder {
    pub fn parent(mut self, parent: &SharedSurface) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn position(mut self, position: impl Into<Vector2<f32>>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn size(mut self, size: impl Into<Vector2<f32>>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<Vector2<f32>>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn velocity(mut self, velocity: impl Into<Vector2<f32>>) -> Self {
        self.velocity = Some(velocity.into());
        self
    }

    pub fn color(mut self, color: impl Into<Rgba>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.image = Some(ImageSource::Path(source.into()));
        self
    }

    pub fn texture(mut self, texture: TextureHandle) -> Self {
        self.image = Some(ImageSource::Texture(texture));
        self
    }

    pub fn behaviour(mut self, behaviour: impl Behaviour + 'static) -> Self {
        self.behaviour = Some(Box::new(behaviour));
        self
    }

    pub fn build(self) -> Sprite {
        let mut sprite = Sprite::new();
        if let Some(parent) = &self.parent {
            sprite.set_parent(Some(parent));
        }
        if let Some(position) = self.position {
            sprite.set_position(position);
        }
        if let Some(size) = self.size {
            sprite.set_size(size);
        }
        if let Some(origin) = self.origin {
            sprite.set_origin(origin);
        }
        if let Some(rotation) = self.rotation {
            sprite.set_rotation(rotation);
        }
        if let Some(velocity) = self.velocity {
            sprite.set_velocity(velocity);
        }
        if let Some(color) = self.color {
            sprite.set_color(color);
        }
        if self.image.is_some() {
            sprite.set_image(self.image);
        }
        sprite.behaviour = self.behaviour;
        sprite
    }
}
