use std::{cell::RefCell, rc::Rc};

use cgmath::Vector2;

use crate::render::Canvas;

/// Edge length of one tile map cell in surface units.
pub const TILE_SIZE: f32 = 32.0;

/// Viewport assumed by tile pools that were not given one.
pub const DEFAULT_VIEWPORT: (f32, f32) = (800.0, 600.0);

/// Shared handle to a surface. Children only ever hold a `Weak` of it.
pub type SharedSurface = Rc<RefCell<Surface>>;

/**
 * A rectangular container that carries a render list.
 *
 * Sprites and tile maps use a surface as their parent: their coordinates are
 * expressed relative to `position` and their transform nodes are attached to
 * `canvas` while they are visible.
 */
#[derive(Debug)]
pub struct Surface {
    pub position: Vector2<f32>,
    pub size: Vector2<f32>,
    canvas: Canvas,
}

impl Surface {
    pub fn new(position: impl Into<Vector2<f32>>, size: impl Into<Vector2<f32>>) -> Self {
        Self {
            position: position.into(),
            size: size.into(),
            canvas: Canvas::default(),
        }
    }

    pub fn shared(position: impl Into<Vector2<f32>>, size: impl Into<Vector2<f32>>) -> SharedSurface {
        Rc::new(RefCell::new(Self::new(position, size)))
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}
