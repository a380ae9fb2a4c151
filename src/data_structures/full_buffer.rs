//! Full-map offscreen composite rendering for small, mostly static maps.

use cgmath::{Vector2, Zero};

use crate::{
    context::TILE_SIZE,
    data_structures::{
        instruction::{ImageSource, Instruction, Rectangle},
        tile_map::{Grid, Scroll, TileStrategy},
        transform_node::{NodeRef, TransformNode},
    },
    render::OffscreenTarget,
};

const TRANSLATE: usize = 1;
const RECT: usize = 2;

/**
 * Rasterises the entire map into an offscreen target once per data change.
 *
 * The map then renders as a single textured rectangle sized
 * `(columns * TILE_SIZE, rows * TILE_SIZE)`, and scrolling only moves its
 * translate. The target is owned exclusively and released exactly once.
 */
pub struct FullBuffer {
    node: NodeRef,
    target: Option<Box<dyn OffscreenTarget>>,
}

impl FullBuffer {
    pub fn new(target: Box<dyn OffscreenTarget>) -> Self {
        let texture = ImageSource::Texture(target.texture());
        let mut node = TransformNode::new();
        node.add(Instruction::PushMatrix);
        node.add(Instruction::Translate(Vector2::zero()));
        node.add(Instruction::Rectangle(
            Rectangle::new(Vector2::zero(), Vector2::new(TILE_SIZE, TILE_SIZE))
                .with_image(Some(texture)),
        ));
        node.add(Instruction::PopMatrix);

        Self {
            node: node.shared(),
            target: Some(target),
        }
    }

    pub fn is_released(&self) -> bool {
        self.target.is_none()
    }

    pub fn target(&self) -> Option<&dyn OffscreenTarget> {
        self.target.as_deref()
    }

    pub fn translation(&self) -> Vector2<f32> {
        self.node.borrow().translation(TRANSLATE)
    }
}

impl TileStrategy for FullBuffer {
    fn name(&self) -> &'static str {
        "FullBuffer"
    }

    fn node(&self) -> &NodeRef {
        &self.node
    }

    fn update(&mut self, grid: &Grid<'_>) {
        let Some(target) = self.target.as_mut() else {
            log::warn!("FullBuffer: Render target was already released.");
            return;
        };

        let width = grid.columns() as u32 * TILE_SIZE as u32;
        let height = grid.rows() as u32 * TILE_SIZE as u32;
        if let Err(e) = target.resize(width, height) {
            log::warn!("FullBuffer: Could not resize render target: {}", e);
            return;
        }
        target.clear();

        let tile = Vector2::new(TILE_SIZE, TILE_SIZE);
        let mut unknown = 0;
        let mut failed = 0;
        for (y, row) in grid.map_data.iter().enumerate() {
            for (x, &index) in row.iter().enumerate() {
                if !grid.has_tile(index) {
                    unknown += 1;
                }
                let Some(image) = grid.tile_image(Some(index)) else {
                    continue;
                };
                let position = Vector2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
                if let Err(e) = target.draw_rectangle(position, tile, image) {
                    log::debug!("FullBuffer: Tile ({}, {}) not drawn: {}", x, y, e);
                    failed += 1;
                }
            }
        }
        if unknown > 0 {
            log::warn!(
                "FullBuffer: {} cells use indices outside the tileset, drawing tile 0.",
                unknown
            );
        }
        if failed > 0 {
            log::warn!("FullBuffer: {} tiles could not be drawn.", failed);
        }

        let texture = target.texture();
        let mut node = self.node.borrow_mut();
        if let Some(rect) = node.rectangle_mut(RECT) {
            rect.size = Vector2::new(width as f32, height as f32);
            rect.image = Some(ImageSource::Texture(texture));
        }
        node.set_translation(TRANSLATE, grid.origin());
    }

    fn scroll(&mut self, offset: Vector2<f32>, anchor: Vector2<f32>) -> Scroll {
        self.node
            .borrow_mut()
            .set_translation(TRANSLATE, anchor - offset);
        Scroll::Moved
    }

    fn release(&mut self) {
        if let Some(mut target) = self.target.take() {
            target.release();
            log::debug!("FullBuffer: Released render target.");
        }
    }
}

impl Drop for FullBuffer {
    fn drop(&mut self) {
        self.release();
    }
}
