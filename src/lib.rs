//! sprite-ngin
//!
//! A small 2D core for sprite based games. Entities are positioned relative to a
//! parent surface, collide as boxes or circles, and are drawn through transform
//! nodes that are attached to and detached from the parent's render list. Tile maps
//! scroll over a grid of tile indices and can be rendered either by compositing the
//! whole map offscreen or by recycling a viewport sized pool of tiles.
//!
//! The crate owns no window, GPU or audio device. Those are supplied by the host
//! through the [`render::Renderer`], [`render::OffscreenTarget`] and
//! [`audio::SoundEffect`] traits.
//!
//! High-level modules
//! - `audio`: sound effect capability handed to entities
//! - `context`: the parent surface that owns a render list
//! - `data_structures`: sprites, tile maps, transform nodes and collision
//! - `flow`: frame and touch input adapter for host applications
//! - `joystick`: on-screen virtual joystick built from sprites
//! - `render`: render list flattening and renderer traits
//! - `resources`: image loading and a CPU side offscreen target
//!

pub mod audio;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod joystick;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use context::{SharedSurface, Surface, TILE_SIZE};
pub use data_structures::collision::CollisionMode;
pub use data_structures::sprite::Sprite;
pub use data_structures::tile_map::TileMap;
