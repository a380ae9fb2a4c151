//! Tile maps: scrollable grids of tile indices.
//!
//! A [`TileMap`] stores a tileset (index to image) and row-major map data, a scroll
//! offset and a weak parent. How the grid is turned into transform nodes is decided
//! by a [`TileStrategy`] chosen at construction:
//!
//! - [`FullBuffer`] composites the whole map into one offscreen texture; suited to
//!   small maps that rarely change. Scrolling is a single translate update.
//! - [`TilePool`] keeps a viewport-sized pool of tile rectangles and re-targets them
//!   whenever the offset changes; suited to large scrolling maps.
//!
//! Cells are [`TILE_SIZE`] units wide and high. Tile index 0 is the blank tile shown
//! for cells outside the map and for indices the tileset doesn't know.
//!
//! Like sprites, a map keeps its place on screen when its parent moves. The map is
//! drawn at `anchor - offset`, where the anchor is the parent's position as read by
//! the last `set_offset`, `set_parent` or build. Changing the tileset or map data
//! redraws at the same anchor.

use std::fmt;

use cgmath::{Vector2, Zero};

use crate::{
    context::{DEFAULT_VIEWPORT, SharedSurface, TILE_SIZE},
    data_structures::{
        attachment::Attachment,
        full_buffer::FullBuffer,
        instruction::ImageSource,
        sprite::Sprite,
        tile_pool::TilePool,
        transform_node::NodeRef,
    },
    render::OffscreenTarget,
};

const OWNER: &str = "TileMap";

/// Read-only view of everything a strategy needs to draw the map.
#[derive(Clone, Copy, Debug)]
pub struct Grid<'a> {
    pub tileset: &'a [ImageSource],
    pub map_data: &'a [Vec<u32>],
    pub offset: Vector2<f32>,
    /// Surface position the offset is measured from.
    pub anchor: Vector2<f32>,
}

impl<'a> Grid<'a> {
    pub fn columns(&self) -> usize {
        self.map_data.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> usize {
        self.map_data.len()
    }

    /// The stored index at (`col`, `row`) if the cell is inside `[0, columns) x [0, rows)`.
    pub fn cell(&self, col: i64, row: i64) -> Option<u32> {
        if col < 0 || row < 0 || col as usize >= self.columns() {
            return None;
        }
        self.map_data.get(row as usize)?.get(col as usize).copied()
    }

    pub fn has_tile(&self, index: u32) -> bool {
        (index as usize) < self.tileset.len()
    }

    /// The image for a tile index, falling back to the blank tile 0.
    pub fn tile_image(&self, index: Option<u32>) -> Option<&'a ImageSource> {
        index
            .and_then(|i| self.tileset.get(i as usize))
            .or_else(|| self.tileset.first())
    }

    /// Where the map's top-left cell is drawn in surface coordinates.
    pub fn origin(&self) -> Vector2<f32> {
        self.anchor - self.offset
    }
}

/// Result of moving a strategy's scroll position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scroll {
    /// The rendering already reflects the new offset.
    Moved,
    /// The tiles have to be recomputed with [`TileStrategy::update`].
    NeedsUpdate,
}

/// A way of turning a [`Grid`] into a transform node.
pub trait TileStrategy {
    fn name(&self) -> &'static str;

    /// The node attached to the parent while the map is visible.
    fn node(&self) -> &NodeRef;

    /// Rebuilds internal caches that depend on the viewport.
    fn rebuild(&mut self) {}

    /// Recomputes the displayed tiles.
    fn update(&mut self, grid: &Grid<'_>);

    fn scroll(&mut self, offset: Vector2<f32>, anchor: Vector2<f32>) -> Scroll;

    fn viewport(&self) -> Option<Vector2<f32>> {
        None
    }

    fn set_viewport(&mut self, viewport: Vector2<f32>) {
        log::debug!("{}: Viewport {:?} ignored.", self.name(), viewport);
    }

    /// Frees owned rendering resources. Safe to call more than once.
    fn release(&mut self) {}
}

pub struct TileMap {
    attachment: Attachment,
    tileset: Option<Vec<ImageSource>>,
    map_data: Option<Vec<Vec<u32>>>,
    offset: Vector2<f32>,
    anchor: Vector2<f32>,
    strategy: Box<dyn TileStrategy>,
}

impl TileMap {
    /// Numeric form of "no tile" for callers that store hit results as integers.
    pub const NO_TILE: i64 = -1;

    pub fn new(strategy: Box<dyn TileStrategy>) -> Self {
        Self {
            attachment: Attachment::new(),
            tileset: None,
            map_data: None,
            offset: Vector2::zero(),
            anchor: Vector2::zero(),
            strategy,
        }
    }

    /// A map composited into `target` whenever its data changes.
    pub fn full_buffer(target: Box<dyn OffscreenTarget>) -> TileMapBuilder {
        TileMapBuilder::new(Box::new(FullBuffer::new(target)))
    }

    /// A map drawn through a pool of rectangles covering `viewport`.
    pub fn tile_pool(viewport: impl Into<Vector2<f32>>) -> TileMapBuilder {
        TileMapBuilder::new(Box::new(TilePool::new(viewport.into())))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn node(&self) -> &NodeRef {
        self.strategy.node()
    }

    pub fn parent(&self) -> Option<SharedSurface> {
        self.attachment.parent()
    }

    /// Hides the map, assigns the new parent and re-anchors the rendering.
    pub fn set_parent(&mut self, parent: Option<&SharedSurface>) {
        self.attachment
            .set_parent(parent, self.strategy.node(), OWNER);
        self.reposition();
    }

    pub fn visible(&self) -> bool {
        self.attachment.visible()
    }

    pub fn show(&mut self, do_show: bool) {
        self.attachment
            .show(do_show, self.strategy.node(), OWNER);
    }

    pub fn tileset(&self) -> Option<&[ImageSource]> {
        self.tileset.as_deref()
    }

    pub fn set_tileset(&mut self, tileset: Vec<ImageSource>) {
        self.tileset = Some(tileset);
        self.update();
    }

    pub fn map_data(&self) -> Option<&[Vec<u32>]> {
        self.map_data.as_deref()
    }

    pub fn set_map_data(&mut self, map_data: Vec<Vec<u32>>) {
        self.map_data = Some(map_data);
        self.update();
    }

    /// `(columns, rows)`, `(0, 0)` without map data.
    pub fn size(&self) -> (usize, usize) {
        match &self.map_data {
            Some(rows) => (rows.first().map_or(0, Vec::len), rows.len()),
            None => (0, 0),
        }
    }

    pub fn offset(&self) -> Vector2<f32> {
        self.offset
    }

    /// Scrolls to `offset`, measured from the parent's current position.
    pub fn set_offset(&mut self, offset: impl Into<Vector2<f32>>) {
        self.offset = offset.into();
        self.reposition();
    }

    /// The surface position the map was last anchored to.
    pub fn anchor(&self) -> Vector2<f32> {
        self.anchor
    }

    pub fn viewport(&self) -> Option<Vector2<f32>> {
        self.strategy.viewport()
    }

    pub fn set_viewport(&mut self, viewport: impl Into<Vector2<f32>>) {
        self.strategy.set_viewport(viewport.into());
        self.refresh();
    }

    /// Rebuilds the strategy's caches and redraws.
    pub fn refresh(&mut self) {
        self.strategy.rebuild();
        self.update();
    }

    /// Resynchronises the rendering with the tileset, map data and offset.
    pub fn update(&mut self) {
        let Some(tileset) = &self.tileset else {
            log::warn!("{}: No tileset assigned to tilemap.", OWNER);
            return;
        };
        let Some(map_data) = &self.map_data else {
            log::warn!("{}: No map data assigned to tilemap.", OWNER);
            return;
        };
        let grid = Grid {
            tileset,
            map_data,
            offset: self.offset,
            anchor: self.anchor,
        };
        self.strategy.update(&grid);
    }

    /// The stored index at (`col`, `row`), if there is one.
    pub fn tile_at(&self, col: usize, row: usize) -> Option<u32> {
        self.map_data.as_ref()?.get(row)?.get(col).copied()
    }

    /**
     * Predicts which tile `sprite` will be over after its next move.
     *
     * The cell is computed from the sprite's position plus the scroll offset plus
     * the sprite's velocity. Column 0 and row 0 never count as a hit, neither does
     * anything at or beyond `columns`/`rows`.
     */
    pub fn hit(&self, sprite: &Sprite) -> Option<u32> {
        let next = sprite.position() + self.offset + sprite.velocity();
        let tx = (next.x / TILE_SIZE).floor() as i64;
        let ty = (next.y / TILE_SIZE).floor() as i64;
        let (columns, rows) = self.size();

        if tx > 0 && (tx as usize) < columns && ty > 0 && (ty as usize) < rows {
            let tile = self.tile_at(tx as usize, ty as usize);
            log::debug!("{}: Hit tile {:?} at ({}, {})", OWNER, tile, tx, ty);
            tile
        } else {
            None
        }
    }

    /// [`hit`](Self::hit) with misses reported as [`NO_TILE`](Self::NO_TILE).
    pub fn hit_index(&self, sprite: &Sprite) -> i64 {
        self.hit(sprite).map_or(Self::NO_TILE, i64::from)
    }

    fn has_data(&self) -> bool {
        self.tileset.is_some() && self.map_data.is_some()
    }

    fn take_anchor(&mut self) {
        self.anchor = self
            .attachment
            .parent_position()
            .unwrap_or_else(Vector2::zero);
    }

    /// Re-reads the parent position as anchor and moves the rendering there.
    ///
    /// Doesn't warn about missing data, there is just nothing to redraw yet.
    fn reposition(&mut self) {
        self.take_anchor();
        if self.strategy.scroll(self.offset, self.anchor) == Scroll::NeedsUpdate && self.has_data()
        {
            self.update();
        }
    }
}

impl fmt::Debug for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileMap")
            .field("strategy", &self.strategy.name())
            .field("size", &self.size())
            .field("offset", &self.offset)
            .field("visible", &self.visible())
            .finish()
    }
}

/// Detaches a visible map and frees its render resources. If the parent is
/// borrowed while the map drops, the node stays in the parent's render list.
impl Drop for TileMap {
    fn drop(&mut self) {
        self.attachment.release(self.strategy.node(), OWNER);
        self.strategy.release();
    }
}

/// Keyword-style construction of a [`TileMap`].
///
/// Attributes are applied in the order parent, viewport, tileset, map data, offset
/// and the map is drawn once at the end if it has both a tileset and map data.
pub struct TileMapBuilder {
    strategy: Box<dyn TileStrategy>,
    parent: Option<SharedSurface>,
    viewport: Option<Vector2<f32>>,
    tileset: Option<Vec<ImageSource>>,
    map_data: Option<Vec<Vec<u32>>>,
    offset: Option<Vector2<f32>>,
}

impl TileMapBuilder {
    pub fn new(strategy: Box<dyn TileStrategy>) -> Self {
        Self {
            strategy,
            parent: None,
            viewport: None,
            tileset: None,
            map_data: None,
            offset: None,
        }
    }

    pub fn parent(mut self, parent: &SharedSurface) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn viewport(mut self, viewport: impl Into<Vector2<f32>>) -> Self {
        self.viewport = Some(viewport.into());
        self
    }

    pub fn tileset<I, T>(mut self, tileset: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ImageSource>,
    {
        self.tileset = Some(tileset.into_iter().map(Into::into).collect());
        self
    }

    pub fn map_data(mut self, map_data: Vec<Vec<u32>>) -> Self {
        self.map_data = Some(map_data);
        self
    }

    pub fn offset(mut self, offset: impl Into<Vector2<f32>>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn build(self) -> TileMap {
        let mut map = TileMap::new(self.strategy);
        if let Some(parent) = &self.parent {
            map.attachment
                .set_parent(Some(parent), map.strategy.node(), OWNER);
        }
        if let Some(viewport) = self.viewport {
            map.strategy.set_viewport(viewport);
        }
        map.tileset = self.tileset;
        map.map_data = self.map_data;
        map.offset = self.offset.unwrap_or_else(Vector2::zero);

        map.strategy.rebuild();
        if map.has_data() {
            map.take_anchor();
            map.update();
        } else {
            map.reposition();
        }
        map
    }
}

impl Default for TileMapBuilder {
    fn default() -> Self {
        TileMap::tile_pool(DEFAULT_VIEWPORT)
    }
}
