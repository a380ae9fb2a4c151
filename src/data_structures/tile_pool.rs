//! Viewport-sized tile pool rendering for large scrolling maps.

use cgmath::{Vector2, Zero};

use crate::{
    context::TILE_SIZE,
    data_structures::{
        instruction::{ImageSource, Instruction, Rectangle},
        tile_map::{Grid, Scroll, TileStrategy},
        transform_node::{NodeRef, TransformNode},
    },
};

const TRANSLATE: usize = 1;
const FIRST_TILE: usize = 2;

/**
 * Draws a tile map through a fixed pool of rectangles.
 *
 * The pool is `ceil(viewport / TILE_SIZE) + 1` rectangles in each direction: enough
 * to cover the viewport plus one spare column and row for partial scrolling. On
 * every update each pooled rectangle is pointed at the map cell it currently
 * covers, so the cost only depends on the viewport, never on the map size.
 */
#[derive(Debug)]
pub struct TilePool {
    node: NodeRef,
    viewport: Vector2<f32>,
    columns: usize,
    rows: usize,
}

impl TilePool {
    pub fn new(viewport: Vector2<f32>) -> Self {
        let mut pool = Self {
            node: TransformNode::new().shared(),
            viewport,
            columns: 0,
            rows: 0,
        };
        pool.rebuild();
        pool
    }

    /// Most rectangles the pool keeps along one edge.
    pub const MAX_EDGE: usize = 512;

    /// Pool dimensions for a viewport, at most [`MAX_EDGE`](Self::MAX_EDGE) per edge.
    ///
    /// Negative and NaN extents count as zero.
    pub fn pool_size_for(viewport: Vector2<f32>) -> (usize, usize) {
        let cells = |extent: f32| {
            let tiles = (extent.max(0.0) / TILE_SIZE).ceil();
            if tiles.is_finite() && tiles < Self::MAX_EDGE as f32 {
                tiles as usize + 1
            } else {
                log::warn!(
                    "TilePool: Viewport extent {} is too large, using {} tiles.",
                    extent,
                    Self::MAX_EDGE
                );
                Self::MAX_EDGE
            }
        };
        (cells(viewport.x), cells(viewport.y))
    }

    /// `(columns, rows)` of pooled rectangles.
    pub fn pool_size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// The image currently shown by the pooled rectangle at (`x`, `y`).
    pub fn pooled_tile(&self, x: usize, y: usize) -> Option<ImageSource> {
        if x >= self.columns || y >= self.rows {
            return None;
        }
        self.node
            .borrow()
            .rectangle(FIRST_TILE + y * self.columns + x)
            .and_then(|rect| rect.image.clone())
    }

    pub fn translation(&self) -> Vector2<f32> {
        self.node.borrow().translation(TRANSLATE)
    }
}

impl TileStrategy for TilePool {
    fn name(&self) -> &'static str {
        "TilePool"
    }

    fn node(&self) -> &NodeRef {
        &self.node
    }

    fn rebuild(&mut self) {
        let (columns, rows) = Self::pool_size_for(self.viewport);
        self.columns = columns;
        self.rows = rows;

        let mut node = self.node.borrow_mut();
        node.clear();
        node.add(Instruction::PushMatrix);
        node.add(Instruction::Translate(Vector2::zero()));
        for y in 0..rows {
            for x in 0..columns {
                let position = Vector2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
                node.add(Instruction::Rectangle(Rectangle::new(
                    position,
                    Vector2::new(TILE_SIZE, TILE_SIZE),
                )));
            }
        }
        node.add(Instruction::PopMatrix);
        log::debug!("TilePool: Rebuilt pool of {}x{} tiles.", columns, rows);
    }

    fn update(&mut self, grid: &Grid<'_>) {
        let start_col = (grid.offset.x / TILE_SIZE).floor() as i64;
        let start_row = (grid.offset.y / TILE_SIZE).floor() as i64;
        let remainder = Vector2::new(
            grid.offset.x.rem_euclid(TILE_SIZE),
            grid.offset.y.rem_euclid(TILE_SIZE),
        );

        let mut unknown = 0;
        let mut node = self.node.borrow_mut();
        node.set_translation(TRANSLATE, grid.anchor - remainder);
        for y in 0..self.rows {
            for x in 0..self.columns {
                let cell = grid.cell(start_col + x as i64, start_row + y as i64);
                if cell.is_some_and(|index| !grid.has_tile(index)) {
                    unknown += 1;
                }
                if let Some(rect) = node.rectangle_mut(FIRST_TILE + y * self.columns + x) {
                    rect.image = grid.tile_image(cell).cloned();
                }
            }
        }
        if unknown > 0 {
            log::warn!(
                "TilePool: {} visible cells use indices outside the tileset, showing tile 0.",
                unknown
            );
        }
    }

    fn scroll(&mut self, _offset: Vector2<f32>, _anchor: Vector2<f32>) -> Scroll {
        Scroll::NeedsUpdate
    }

    fn viewport(&self) -> Option<Vector2<f32>> {
        Some(self.viewport)
    }

    fn set_viewport(&mut self, viewport: Vector2<f32>) {
        self.viewport = viewport;
    }

    fn release(&mut self) {
        self.node.borrow_mut().clear();
        self.columns = 0;
        self.rows = 0;
    }
}
