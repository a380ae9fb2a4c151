//! Engine data structures: transform nodes, sprites, tile maps and collision.
//!
//! - `instruction` contains the render primitives nodes are composed of
//! - `transform_node` holds ordered instruction groups, one per drawable unit
//! - `attachment` implements the show/hide protocol towards a parent's render list
//! - `collision` provides box and circle tests
//! - `sprite` is the positioned, parent-relative entity
//! - `tile_map` is the scrollable tile grid and its strategy seam
//! - `full_buffer` and `tile_pool` are the two tile map rendering strategies

pub mod attachment;
pub mod collision;
pub mod full_buffer;
pub mod instruction;
pub mod sprite;
pub mod tile_map;
pub mod tile_pool;
pub mod transform_node;
