//! Pairwise collision tests between sprites.
//!
//! Both tests are O(1) and work on [`Bounds`]: the center and size of a sprite in
//! parent-relative coordinates. Broad-phase iteration is left to the caller.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use cgmath::{InnerSpace, Vector2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CollisionMode {
    /// Axis-aligned bounding boxes. Touching edges don't collide.
    #[default]
    Box,
    /// Circles with a radius of half the larger dimension.
    Circle,
}

impl FromStr for CollisionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(CollisionMode::Box),
            "circle" => Ok(CollisionMode::Circle),
            other => Err(anyhow!("No such collision type '{}'", other)),
        }
    }
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionMode::Box => f.write_str("box"),
            CollisionMode::Circle => f.write_str("circle"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vector2<f32>,
    pub size: Vector2<f32>,
}

impl Bounds {
    pub fn new(center: impl Into<Vector2<f32>>, size: impl Into<Vector2<f32>>) -> Self {
        Self {
            center: center.into(),
            size: size.into(),
        }
    }

    /// Half of the larger dimension.
    pub fn radius(&self) -> f32 {
        self.size.x.max(self.size.y) / 2.0
    }

    pub fn overlaps_box(&self, other: &Bounds) -> bool {
        let dx = (other.center.x - self.center.x).abs();
        let dy = (other.center.y - self.center.y).abs();
        dx < (self.size.x + other.size.x) / 2.0 && dy < (self.size.y + other.size.y) / 2.0
    }

    pub fn overlaps_circle(&self, other: &Bounds) -> bool {
        let distance = (other.center - self.center).magnitude();
        distance < self.radius() + other.radius()
    }

    pub fn collides(&self, other: &Bounds, mode: CollisionMode) -> bool {
        match mode {
            CollisionMode::Box => self.overlaps_box(other),
            CollisionMode::Circle => self.overlaps_circle(other),
        }
    }
}
